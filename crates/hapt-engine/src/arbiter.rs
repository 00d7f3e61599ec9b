use crate::clock::{Clock, SystemClock};
use crate::priority::Priority;
use crate::renderer::NativeRenderer;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Logical state of the playback slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Idle,
    Playing(Priority),
}

/// Owner of the single haptic playback slot.
///
/// The renderer gives no completion callback, so "is playing" is estimated
/// from the start time and the duration of the loaded clip. All bookkeeping
/// runs even when the platform has no haptics; only the native calls are
/// skipped.
pub struct Arbiter {
    renderer: Box<dyn NativeRenderer>,
    clock: Arc<dyn Clock>,
    capability_supported: bool,
    acquired: bool,
    active_priority: Priority,
    loaded_duration: Duration,
    playback_start: Instant,
    playback_end: Instant,
}

impl Arbiter {
    pub fn new(renderer: Box<dyn NativeRenderer>) -> Self {
        Self::with_clock(renderer, Arc::new(SystemClock))
    }

    /// Detects capability, acquires the native handle and resets the slot.
    pub fn with_clock(mut renderer: Box<dyn NativeRenderer>, clock: Arc<dyn Clock>) -> Self {
        let mut capability_supported = renderer.detect_capability();
        let mut acquired = false;
        if capability_supported {
            match renderer.acquire() {
                Ok(()) => acquired = true,
                Err(err) => {
                    warn!("haptic renderer unavailable, running without output: {err}");
                    capability_supported = false;
                }
            }
        }
        info!(capability_supported, "haptic arbiter initialized");

        let now = clock.now();
        Self {
            renderer,
            clock,
            capability_supported,
            acquired,
            active_priority: Priority::DEFAULT,
            loaded_duration: Duration::ZERO,
            playback_start: now,
            playback_end: now,
        }
    }

    /// Wraps the arbiter in a shareable handle for emitters.
    pub fn into_handle(self) -> ArbiterHandle {
        ArbiterHandle(Arc::new(Mutex::new(self)))
    }

    fn native_ready(&self) -> bool {
        self.capability_supported && self.acquired
    }

    /// Hands clip data to the renderer and records its duration.
    /// While the handle is released nothing is loaded, so the next window is
    /// empty.
    pub fn load(&mut self, data: &[u8]) {
        if !self.native_ready() {
            if self.capability_supported {
                self.loaded_duration = Duration::ZERO;
            }
            return;
        }
        if let Err(err) = self.renderer.load(data) {
            warn!("haptic clip load failed: {err}");
        }
        let secs = self.renderer.clip_duration();
        self.loaded_duration = Duration::try_from_secs_f32(secs).unwrap_or_else(|_| {
            warn!(secs, "renderer reported an invalid clip duration");
            Duration::ZERO
        });
    }

    /// Starts playback of the loaded clip and opens a new playback window.
    pub fn play(&mut self) {
        if self.native_ready() {
            if let Err(err) = self.renderer.play() {
                warn!("haptic play failed: {err}");
            }
        }
        self.playback_start = self.clock.now();
        self.playback_end = self.playback_start + self.loaded_duration;
    }

    /// Stops playback and closes the playback window immediately.
    pub fn stop(&mut self) {
        if self.native_ready() {
            if let Err(err) = self.renderer.stop() {
                warn!("haptic stop failed: {err}");
            }
        }
        self.playback_end = self.clock.now();
    }

    pub fn is_playing(&self) -> bool {
        self.clock.now() < self.playback_end
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.active_priority = priority;
    }

    pub fn priority(&self) -> Priority {
        self.active_priority
    }

    pub fn state(&self) -> SlotState {
        if self.is_playing() {
            SlotState::Playing(self.active_priority)
        } else {
            SlotState::Idle
        }
    }

    pub fn capability_supported(&self) -> bool {
        self.capability_supported
    }

    pub fn loaded_duration(&self) -> Duration {
        self.loaded_duration
    }

    /// Start and end of the current or most recent playback.
    pub fn playback_window(&self) -> (Instant, Instant) {
        (self.playback_start, self.playback_end)
    }

    /// Time left in the playback window; zero when idle.
    pub fn remaining(&self) -> Duration {
        self.playback_end.saturating_duration_since(self.clock.now())
    }

    /// Host focus hook. Losing focus stops playback and releases the native
    /// handle; regaining focus acquires it again.
    pub fn on_focus_changed(&mut self, has_focus: bool) {
        if has_focus {
            if self.capability_supported && !self.acquired {
                match self.renderer.acquire() {
                    Ok(()) => {
                        self.acquired = true;
                        debug!("haptic renderer re-acquired on focus");
                    }
                    Err(err) => warn!("haptic renderer re-acquire failed: {err}"),
                }
            }
        } else {
            self.stop();
            self.release();
        }
    }

    /// Releases the native handle. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.acquired {
            self.renderer.release();
            self.acquired = false;
            debug!("haptic renderer released");
        }
    }
}

impl Drop for Arbiter {
    fn drop(&mut self) {
        self.release();
    }
}

/// Cheap clonable reference to the process-wide arbiter.
#[derive(Clone)]
pub struct ArbiterHandle(Arc<Mutex<Arbiter>>);

impl ArbiterHandle {
    pub fn lock(&self) -> MutexGuard<'_, Arbiter> {
        self.0.lock()
    }

    pub fn ptr_eq(&self, other: &ArbiterHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for ArbiterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ArbiterHandle").field(&Arc::as_ptr(&self.0)).finish()
    }
}
