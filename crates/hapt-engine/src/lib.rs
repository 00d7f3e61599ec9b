pub mod arbiter;
pub mod clip;
pub mod clock;
pub mod devices;
pub mod emitter;
pub mod error;
pub mod priority;
pub mod renderer;
pub mod scene;

pub use arbiter::{Arbiter, ArbiterHandle, SlotState};
pub use clip::{ClipBuffer, HapticClip};
pub use clock::{Clock, ManualClock, SystemClock};
pub use emitter::{Emitter, PlayOutcome};
pub use error::{HapticsError, RendererError, Result};
pub use priority::Priority;
pub use renderer::{AudioRenderer, AudioRendererConfig, NativeRenderer, NullRenderer};
pub use scene::Scene;
