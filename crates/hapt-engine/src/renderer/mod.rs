pub mod audio;
pub mod native;
pub mod null;

pub use audio::{AudioRenderer, AudioRendererConfig};
pub use native::NativeRenderer;
pub use null::NullRenderer;
