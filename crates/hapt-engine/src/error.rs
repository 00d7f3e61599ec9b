use std::path::PathBuf;
use thiserror::Error;

/// Configuration and setup errors. None of these are produced by playback
/// itself; a request that loses arbitration is an outcome, not an error.
#[derive(Debug, Error)]
pub enum HapticsError {
    #[error("unable to find a haptic arbiter in the scene")]
    NoArbiter,

    #[error("found {0} haptic arbiters in the scene; exactly one is required")]
    MultipleArbiters(usize),

    #[error("priority {0} is outside the range 0..=256")]
    PriorityOutOfRange(i64),

    #[error("failed to read haptic clip {path:?}: {source}")]
    ClipRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, HapticsError>;

/// Failures reported by a [`NativeRenderer`](crate::renderer::NativeRenderer).
/// The arbiter logs and swallows them.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("renderer handle is not acquired")]
    NotAcquired,

    #[error("no output device matched")]
    NoDevice,

    #[error("clip data is not a whole number of f32 samples ({0} bytes)")]
    MalformedClip(usize),

    #[error("backend error: {0}")]
    Backend(String),
}
