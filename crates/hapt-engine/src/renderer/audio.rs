use super::native::NativeRenderer;
use crate::devices::pick_output_device;
use crate::error::RendererError;
use cpal::traits::{DeviceTrait, StreamTrait};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct AudioRendererConfig {
    pub output_name: Option<String>,   // match by substring (case-insensitive)
    pub output_index: Option<usize>,   // explicit index from device list
    pub clip_sample_rate: u32,         // rate of the f32 samples in clip data
    pub gain_db: f32,
}

impl Default for AudioRendererConfig {
    fn default() -> Self {
        Self {
            output_name: None,
            output_index: None,
            clip_sample_rate: 8000,
            gain_db: 0.0,
        }
    }
}

/// Renders clips on an audio-coupled actuator through a cpal output device.
///
/// Clip data is little-endian `f32` mono at `clip_sample_rate`. The output
/// stream lives on its own thread between `acquire` and `release`; the
/// callback reads the current clip through shared state.
pub struct AudioRenderer {
    cfg: AudioRendererConfig,
    voice: Arc<Voice>,
    clip_len: usize,
    stream: Option<StreamThread>,
}

impl AudioRenderer {
    pub fn new(cfg: AudioRendererConfig) -> Self {
        Self {
            cfg,
            voice: Arc::new(Voice::default()),
            clip_len: 0,
            stream: None,
        }
    }
}

impl NativeRenderer for AudioRenderer {
    fn detect_capability(&mut self) -> bool {
        if self.cfg.clip_sample_rate == 0 {
            warn!("clip sample rate is zero; haptics disabled");
            return false;
        }
        let host = cpal::default_host();
        match pick_output_device(&host, self.cfg.output_name.as_deref(), self.cfg.output_index) {
            Ok(Some(dev)) => {
                info!(device = %dev.name().unwrap_or_default(), "haptic output device found");
                true
            }
            Ok(None) => false,
            Err(err) => {
                warn!("output device probe failed: {err:#}");
                false
            }
        }
    }

    fn acquire(&mut self) -> Result<(), RendererError> {
        if self.stream.is_some() {
            return Ok(());
        }
        self.stream = Some(StreamThread::spawn(self.cfg.clone(), self.voice.clone())?);
        debug!("haptic output stream acquired");
        Ok(())
    }

    fn load(&mut self, data: &[u8]) -> Result<(), RendererError> {
        let samples = decode_samples(data)?;
        self.voice.playing.store(false, Ordering::Release);
        self.clip_len = samples.len();
        *self.voice.samples.lock() = Arc::from(samples);
        Ok(())
    }

    fn clip_duration(&self) -> f32 {
        self.clip_len as f32 / self.cfg.clip_sample_rate as f32
    }

    fn play(&mut self) -> Result<(), RendererError> {
        if self.stream.is_none() {
            return Err(RendererError::NotAcquired);
        }
        self.voice.frame.store(0, Ordering::Relaxed);
        self.voice.playing.store(true, Ordering::Release);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RendererError> {
        self.voice.playing.store(false, Ordering::Release);
        Ok(())
    }

    fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.voice.playing.store(false, Ordering::Release);
            stream.shutdown();
            debug!("haptic output stream released");
        }
    }
}

impl Drop for AudioRenderer {
    fn drop(&mut self) {
        self.release();
    }
}

/// Splits clip bytes into little-endian `f32` samples.
pub fn decode_samples(data: &[u8]) -> Result<Vec<f32>, RendererError> {
    if data.len() % 4 != 0 {
        return Err(RendererError::MalformedClip(data.len()));
    }
    Ok(data
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn db_to_linear(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

fn backend(err: impl std::fmt::Display) -> RendererError {
    RendererError::Backend(err.to_string())
}

/* ---------- state shared with the output callback ---------- */

struct Voice {
    samples: Mutex<Arc<[f32]>>,
    frame: AtomicUsize,   // device frames since play()
    playing: AtomicBool,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            samples: Mutex::new(Arc::from(Vec::new())),
            frame: AtomicUsize::new(0),
            playing: AtomicBool::new(false),
        }
    }
}

impl Voice {
    /// Fills one interleaved output block. Never blocks: if the clip is
    /// being swapped, the block is silent.
    fn render<T>(&self, out: &mut [T], channels: usize, ratio: f64, gain: f32)
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        if !self.playing.load(Ordering::Acquire) {
            out.fill(T::EQUILIBRIUM);
            return;
        }
        let Some(samples) = self.samples.try_lock() else {
            out.fill(T::EQUILIBRIUM);
            return;
        };

        let mut frame = self.frame.load(Ordering::Relaxed);
        for chunk in out.chunks_mut(channels) {
            let idx = (frame as f64 * ratio) as usize;
            let v = match samples.get(idx) {
                Some(&s) => (s * gain).clamp(-1.0, 1.0),
                None => {
                    self.playing.store(false, Ordering::Release);
                    0.0
                }
            };
            chunk.fill(T::from_sample(v));
            frame += 1;
        }
        self.frame.store(frame, Ordering::Relaxed);
    }
}

/* ---------- stream ownership ---------- */

// cpal streams are not Send, so the stream is built and dropped on its own
// thread; the renderer only keeps the shutdown channel.
struct StreamThread {
    shutdown: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl StreamThread {
    fn spawn(cfg: AudioRendererConfig, voice: Arc<Voice>) -> Result<Self, RendererError> {
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), RendererError>>(1);
        let (shutdown, shutdown_rx) = mpsc::channel::<()>();

        let handle = std::thread::Builder::new()
            .name("hapt-output".into())
            .spawn(move || {
                let stream = match open_stream(&cfg, voice) {
                    Ok(stream) => stream,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                // Blocks until shutdown() or the sender is dropped.
                let _ = shutdown_rx.recv();
                drop(stream);
            })
            .map_err(backend)?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { shutdown, handle }),
            Ok(Err(err)) => {
                let _ = handle.join();
                Err(err)
            }
            Err(_) => {
                let _ = handle.join();
                Err(RendererError::Backend("output thread exited during setup".into()))
            }
        }
    }

    fn shutdown(self) {
        let _ = self.shutdown.send(());
        if self.handle.join().is_err() {
            warn!("haptic output thread panicked");
        }
    }
}

fn open_stream(cfg: &AudioRendererConfig, voice: Arc<Voice>) -> Result<cpal::Stream, RendererError> {
    let host = cpal::default_host();
    let device = pick_output_device(&host, cfg.output_name.as_deref(), cfg.output_index)
        .map_err(backend)?
        .ok_or(RendererError::NoDevice)?;

    let supported = device.default_output_config().map_err(backend)?;
    let config = supported.config();
    let channels = config.channels as usize;
    let ratio = cfg.clip_sample_rate as f64 / config.sample_rate.0 as f64;
    let gain = db_to_linear(cfg.gain_db);

    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => build::<f32>(&device, &config, voice, channels, ratio, gain)?,
        cpal::SampleFormat::I16 => build::<i16>(&device, &config, voice, channels, ratio, gain)?,
        cpal::SampleFormat::U16 => build::<u16>(&device, &config, voice, channels, ratio, gain)?,
        other => return Err(backend(format!("unsupported output format: {other:?}"))),
    };
    stream.play().map_err(backend)?;
    Ok(stream)
}

fn build<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    voice: Arc<Voice>,
    channels: usize,
    ratio: f64,
    gain: f32,
) -> Result<cpal::Stream, RendererError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    device
        .build_output_stream::<T, _, _>(
            config,
            move |out: &mut [T], _: &cpal::OutputCallbackInfo| {
                voice.render(out, channels, ratio, gain)
            },
            move |err| warn!("haptic output stream error: {err}"),
            None,
        )
        .map_err(backend)
}
