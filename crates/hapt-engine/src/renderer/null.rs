use super::native::NativeRenderer;
use crate::error::RendererError;

/// Renderer for platforms without haptics. Reports no capability, so the
/// arbiter never calls the other methods.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl NativeRenderer for NullRenderer {
    fn detect_capability(&mut self) -> bool {
        false
    }
    fn acquire(&mut self) -> Result<(), RendererError> {
        Err(RendererError::NoDevice)
    }
    fn load(&mut self, _data: &[u8]) -> Result<(), RendererError> {
        Ok(())
    }
    fn clip_duration(&self) -> f32 {
        0.0
    }
    fn play(&mut self) -> Result<(), RendererError> {
        Ok(())
    }
    fn stop(&mut self) -> Result<(), RendererError> {
        Ok(())
    }
    fn release(&mut self) {}
}
