mod scenario;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use hapt_engine::devices::list_output_devices;
use hapt_engine::{
    Arbiter, AudioRenderer, AudioRendererConfig, ClipBuffer, Emitter, NativeRenderer,
    NullRenderer, PlayOutcome, Priority,
};
use scenario::{DryRunRenderer, Scenario, Timing};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hapt", version, about = "Single-channel haptic playback arbiter")]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args)]
struct OutputArgs {
    /// Renderer backend
    #[arg(long, global = true, value_enum, default_value_t = Backend::Audio, env = "HAPT_BACKEND")]
    backend: Backend,

    /// Output device, matched by name substring (case-insensitive)
    #[arg(long, global = true, env = "HAPT_OUTPUT_NAME")]
    output_name: Option<String>,

    /// Output device index, as printed by `hapt devices`
    #[arg(long, global = true, env = "HAPT_OUTPUT_INDEX")]
    output_index: Option<usize>,

    /// Sample rate of clip data (little-endian f32 mono)
    #[arg(long, global = true, default_value_t = 8000, env = "HAPT_SAMPLE_RATE")]
    sample_rate: u32,

    /// Actuator gain in dB
    #[arg(long, global = true, default_value_t = 0.0, allow_hyphen_values = true, env = "HAPT_GAIN_DB")]
    gain_db: f32,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// Audio-coupled actuator on an output device
    Audio,
    /// No haptic output; arbitration only
    Null,
}

impl OutputArgs {
    fn renderer(&self) -> Box<dyn NativeRenderer> {
        match self.backend {
            Backend::Audio => Box::new(AudioRenderer::new(AudioRendererConfig {
                output_name: self.output_name.clone(),
                output_index: self.output_index,
                clip_sample_rate: self.sample_rate,
                gain_db: self.gain_db,
            })),
            Backend::Null => Box::new(NullRenderer),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List audio output devices
    Devices,
    /// Play one clip through an emitter
    Play {
        clip: PathBuf,
        /// 0 is the highest priority, 256 the lowest
        #[arg(short, long, default_value_t = 128)]
        priority: i64,
        /// Return as soon as playback starts
        #[arg(long)]
        no_wait: bool,
    },
    /// Run a timeline of play/stop events against named emitters
    Scenario {
        file: PathBuf,
        /// Simulate timing and output instead of playing in real time
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hapt=info,hapt_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Devices => print_devices(),
        Command::Play { clip, priority, no_wait } => play_clip(&cli.output, clip, priority, !no_wait),
        Command::Scenario { file, dry_run } => run_scenario(&cli.output, file, dry_run),
    }
}

fn print_devices() -> Result<()> {
    let list = list_output_devices()?;
    if list.is_empty() {
        println!("(no output devices found)");
        return Ok(());
    }
    for d in &list {
        let mark = if d.is_default { "[*] " } else { "    " };
        println!("{mark}{:>2}  {}", d.index, d.name);
    }
    Ok(())
}

fn play_clip(output: &OutputArgs, path: PathBuf, priority: i64, wait: bool) -> Result<()> {
    let priority = Priority::new(priority).context("Invalid --priority")?;
    let clip = ClipBuffer::from_file(&path)?;

    let arbiter = Arbiter::new(output.renderer()).into_handle();
    if !arbiter.lock().capability_supported() {
        info!("no haptic output available; arbitration only");
    }
    let emitter = Emitter::new(arbiter.clone(), Arc::new(clip), priority);

    match emitter.play() {
        PlayOutcome::Granted => {
            let remaining = arbiter.lock().remaining();
            println!("playing {} ({} ms)", emitter.clip().name(), remaining.as_millis());
        }
        PlayOutcome::Rejected => println!("rejected {}: slot is busy", emitter.clip().name()),
    }

    if wait {
        while arbiter.lock().is_playing() {
            let left = arbiter.lock().remaining();
            std::thread::sleep(left.min(Duration::from_millis(20)));
        }
    }
    arbiter.lock().shutdown();
    Ok(())
}

fn run_scenario(output: &OutputArgs, file: PathBuf, dry_run: bool) -> Result<()> {
    let scenario = Scenario::load(&file)?;
    let timing = if dry_run { Timing::DryRun } else { Timing::RealTime };
    let renderer: Box<dyn NativeRenderer> = match timing {
        Timing::DryRun => Box::new(DryRunRenderer::new(output.sample_rate)),
        Timing::RealTime => output.renderer(),
    };

    let reports = scenario::run(&scenario, renderer, timing, output.sample_rate, |r| println!("{r}"))?;

    let granted = reports
        .iter()
        .filter(|r| r.outcome == Some(PlayOutcome::Granted))
        .count();
    let rejected = reports
        .iter()
        .filter(|r| r.outcome == Some(PlayOutcome::Rejected))
        .count();
    println!("{} events: {granted} granted, {rejected} rejected", reports.len());
    Ok(())
}
