use anyhow::{bail, Context, Result};
use hapt_engine::renderer::audio::decode_samples;
use hapt_engine::{
    Arbiter, ClipBuffer, Clock, Emitter, HapticClip, ManualClock, NativeRenderer, PlayOutcome,
    Priority, RendererError, SystemClock,
};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(default, rename = "emitter")]
    emitters: Vec<EmitterSpec>,
    #[serde(default, rename = "event")]
    events: Vec<EventSpec>,
}

#[derive(Debug, Deserialize)]
struct EmitterSpec {
    name: String,
    #[serde(default = "default_priority")]
    priority: i64,
    clip: Option<PathBuf>,
    duration_ms: Option<u64>,
}

fn default_priority() -> i64 {
    Priority::DEFAULT.value() as i64
}

#[derive(Debug, Deserialize)]
struct EventSpec {
    at_ms: u64,
    emitter: String,
    action: Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Play,
    Stop,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Play => "play",
            Action::Stop => "stop",
        })
    }
}

/// A timeline of play/stop requests against named emitters.
#[derive(Debug)]
pub struct Scenario {
    base_dir: PathBuf,
    file: ScenarioFile,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&text, base_dir).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    /// Clip paths are resolved against `base_dir`.
    pub fn parse(text: &str, base_dir: PathBuf) -> Result<Self> {
        let file: ScenarioFile = toml::from_str(text)?;

        let mut seen = HashSet::new();
        for spec in &file.emitters {
            if !seen.insert(spec.name.as_str()) {
                bail!("duplicate emitter name {:?}", spec.name);
            }
            Priority::new(spec.priority)
                .with_context(|| format!("emitter {:?}", spec.name))?;
            if spec.clip.is_none() && spec.duration_ms.is_none() {
                bail!("emitter {:?} needs `clip` or `duration_ms`", spec.name);
            }
        }
        for event in &file.events {
            if !seen.contains(event.emitter.as_str()) {
                bail!("event at {} ms names unknown emitter {:?}", event.at_ms, event.emitter);
            }
        }
        Ok(Self { base_dir, file })
    }

    /// `duration_ms` stands in for a clip only in dry runs; real-time runs
    /// need real clip files.
    fn clip_for(
        &self,
        spec: &EmitterSpec,
        timing: Timing,
        sample_rate: u32,
    ) -> Result<Arc<dyn HapticClip>> {
        if let Some(path) = &spec.clip {
            return Ok(Arc::new(ClipBuffer::from_file(self.base_dir.join(path))?));
        }
        if timing == Timing::RealTime {
            bail!("emitter {:?} uses `duration_ms`, which needs --dry-run; give it a `clip`", spec.name);
        }
        // Checked in parse(): one of the two is present.
        let ms = spec.duration_ms.unwrap_or_default();
        let samples = (ms as u128 * sample_rate as u128 / 1000) as usize;
        Ok(Arc::new(ClipBuffer::new(spec.name.clone(), vec![0u8; samples * 4])))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    /// Sleep until each event is due.
    RealTime,
    /// Jump a manual clock to each event; finishes instantly.
    DryRun,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventReport {
    pub at_ms: u64,
    pub emitter: String,
    pub action: Action,
    /// `None` for stop events.
    pub outcome: Option<PlayOutcome>,
    pub holder: Priority,
    pub remaining: Duration,
}

impl fmt::Display for EventReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>7} ms  {:<16} {:<5} ", self.at_ms, self.emitter, self.action)?;
        match self.outcome {
            Some(PlayOutcome::Granted) => write!(
                f,
                "granted  (priority {}, {} ms left)",
                self.holder,
                self.remaining.as_millis()
            ),
            Some(PlayOutcome::Rejected) => write!(
                f,
                "rejected (held by priority {}, {} ms left)",
                self.holder,
                self.remaining.as_millis()
            ),
            None => f.write_str("stopped"),
        }
    }
}

/// Runs the scenario, handing each event report to `on_event` as it happens.
/// `sample_rate` sizes the synthetic clips of `duration_ms` emitters.
pub fn run(
    scenario: &Scenario,
    renderer: Box<dyn NativeRenderer>,
    timing: Timing,
    sample_rate: u32,
    mut on_event: impl FnMut(&EventReport),
) -> Result<Vec<EventReport>> {
    let manual = ManualClock::new();
    let clock: Arc<dyn Clock> = match timing {
        Timing::DryRun => Arc::new(manual.clone()),
        Timing::RealTime => Arc::new(SystemClock),
    };
    let arbiter = Arbiter::with_clock(renderer, clock.clone()).into_handle();

    let mut emitters = HashMap::new();
    for spec in &scenario.file.emitters {
        let clip = scenario.clip_for(spec, timing, sample_rate)?;
        let priority = Priority::new(spec.priority)?;
        emitters.insert(spec.name.as_str(), Emitter::new(arbiter.clone(), clip, priority));
    }

    let mut events: Vec<&EventSpec> = scenario.file.events.iter().collect();
    events.sort_by_key(|e| e.at_ms);

    let origin = clock.now();
    debug!(emitters = emitters.len(), events = events.len(), ?timing, "running scenario");
    let mut reports = Vec::with_capacity(events.len());
    for event in events {
        let due = Duration::from_millis(event.at_ms);
        match timing {
            Timing::DryRun => manual.advance_to(origin, due),
            Timing::RealTime => sleep_until(origin + due),
        }

        let Some(emitter) = emitters.get(event.emitter.as_str()) else {
            bail!("unknown emitter {:?}", event.emitter);
        };
        let outcome = match event.action {
            Action::Play => Some(emitter.play()),
            Action::Stop => {
                emitter.stop();
                None
            }
        };

        let arb = arbiter.lock();
        let report = EventReport {
            at_ms: event.at_ms,
            emitter: event.emitter.clone(),
            action: event.action,
            outcome,
            holder: arb.priority(),
            remaining: arb.remaining(),
        };
        drop(arb);
        on_event(&report);
        reports.push(report);
    }
    Ok(reports)
}

fn sleep_until(deadline: Instant) {
    let now = Instant::now();
    if deadline > now {
        std::thread::sleep(deadline - now);
    }
}

/// Renderer for dry runs: always capable, derives duration from clip size,
/// renders nothing.
pub struct DryRunRenderer {
    sample_rate: u32,
    samples: usize,
}

impl DryRunRenderer {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate, samples: 0 }
    }
}

impl NativeRenderer for DryRunRenderer {
    fn detect_capability(&mut self) -> bool {
        self.sample_rate > 0
    }
    fn acquire(&mut self) -> Result<(), RendererError> {
        Ok(())
    }
    fn load(&mut self, data: &[u8]) -> Result<(), RendererError> {
        self.samples = decode_samples(data)?.len();
        Ok(())
    }
    fn clip_duration(&self) -> f32 {
        self.samples as f32 / self.sample_rate as f32
    }
    fn play(&mut self) -> Result<(), RendererError> {
        Ok(())
    }
    fn stop(&mut self) -> Result<(), RendererError> {
        Ok(())
    }
    fn release(&mut self) {}
}
