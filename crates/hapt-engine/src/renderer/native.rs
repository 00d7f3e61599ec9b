use crate::error::RendererError;

/// Platform haptic renderer. Plays one clip at a time and never reports
/// completion, so callers track playback time themselves.
///
/// - `detect_capability` runs once, before `acquire`.
/// - `acquire`/`release` bracket the native handle and may repeat across
///   focus changes. `release` must tolerate an unacquired handle.
/// - `clip_duration` reports seconds for the most recent `load`.
pub trait NativeRenderer: Send {
    fn detect_capability(&mut self) -> bool;
    fn acquire(&mut self) -> Result<(), RendererError>;
    fn load(&mut self, data: &[u8]) -> Result<(), RendererError>;
    fn clip_duration(&self) -> f32;
    fn play(&mut self) -> Result<(), RendererError>;
    fn stop(&mut self) -> Result<(), RendererError>;
    fn release(&mut self);
}
