#![allow(dead_code)]

use hapt_engine::{
    Arbiter, ArbiterHandle, ClipBuffer, Clock, Emitter, HapticClip, ManualClock, NativeRenderer, Priority,
    RendererError,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Native call as seen by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Detect,
    Acquire,
    Load(Vec<u8>),
    Play,
    Stop,
    Release,
}

#[derive(Default)]
pub struct Recorded {
    pub calls: Vec<Call>,
}

/// Renderer that records every call. Clip data is a little-endian `u32`
/// holding the clip duration in milliseconds.
pub struct RecordingRenderer {
    supported: bool,
    fail_acquire: bool,
    duration_secs: f32,
    log: Arc<Mutex<Recorded>>,
}

impl RecordingRenderer {
    pub fn new(supported: bool) -> (Self, Arc<Mutex<Recorded>>) {
        let log = Arc::new(Mutex::new(Recorded::default()));
        let renderer = Self {
            supported,
            fail_acquire: false,
            duration_secs: 0.0,
            log: log.clone(),
        };
        (renderer, log)
    }

    pub fn failing_acquire(mut self) -> Self {
        self.fail_acquire = true;
        self
    }

    fn record(&self, call: Call) {
        self.log.lock().calls.push(call);
    }
}

impl NativeRenderer for RecordingRenderer {
    fn detect_capability(&mut self) -> bool {
        self.record(Call::Detect);
        self.supported
    }

    fn acquire(&mut self) -> Result<(), RendererError> {
        self.record(Call::Acquire);
        if self.fail_acquire {
            Err(RendererError::Backend("no controller".into()))
        } else {
            Ok(())
        }
    }

    fn load(&mut self, data: &[u8]) -> Result<(), RendererError> {
        self.record(Call::Load(data.to_vec()));
        let bytes: [u8; 4] = data
            .try_into()
            .map_err(|_| RendererError::MalformedClip(data.len()))?;
        self.duration_secs = u32::from_le_bytes(bytes) as f32 / 1000.0;
        Ok(())
    }

    fn clip_duration(&self) -> f32 {
        self.duration_secs
    }

    fn play(&mut self) -> Result<(), RendererError> {
        self.record(Call::Play);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RendererError> {
        self.record(Call::Stop);
        Ok(())
    }

    fn release(&mut self) {
        self.record(Call::Release);
    }
}

pub fn clip_ms(name: &str, ms: u32) -> Arc<dyn HapticClip> {
    Arc::new(ClipBuffer::new(name, ms.to_le_bytes().to_vec()))
}

pub fn priority(value: i64) -> Priority {
    Priority::new(value).expect("test priority in range")
}

pub struct Rig {
    pub arbiter: ArbiterHandle,
    pub clock: ManualClock,
    pub log: Arc<Mutex<Recorded>>,
}

impl Rig {
    pub fn new(supported: bool) -> Self {
        let (renderer, log) = RecordingRenderer::new(supported);
        let clock = ManualClock::new();
        let arbiter = Arbiter::with_clock(Box::new(renderer), Arc::new(clock.clone())).into_handle();
        Self { arbiter, clock, log }
    }

    pub fn emitter(&self, name: &str, ms: u32, p: i64) -> Emitter {
        Emitter::new(self.arbiter.clone(), clip_ms(name, ms), priority(p))
    }

    pub fn advance_ms(&self, ms: u64) {
        self.clock.advance(Duration::from_millis(ms));
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.log.lock().calls.clear();
    }
}
