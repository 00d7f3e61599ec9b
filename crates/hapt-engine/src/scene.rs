use crate::arbiter::ArbiterHandle;
use crate::error::{HapticsError, Result};

/// Arbiters registered for one session. Hosts that discover their arbiter
/// instead of passing it around use this to enforce that exactly one exists.
#[derive(Debug, Default, Clone)]
pub struct Scene {
    arbiters: Vec<ArbiterHandle>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_arbiter(&mut self, arbiter: ArbiterHandle) {
        self.arbiters.push(arbiter);
    }

    /// The single arbiter of the scene.
    pub fn arbiter(&self) -> Result<ArbiterHandle> {
        match self.arbiters.as_slice() {
            [] => Err(HapticsError::NoArbiter),
            [only] => Ok(only.clone()),
            many => Err(HapticsError::MultipleArbiters(many.len())),
        }
    }

    /// Whether the scene's arbiter found a haptics-capable renderer.
    pub fn device_meets_minimum_requirements(&self) -> Result<bool> {
        Ok(self.arbiter()?.lock().capability_supported())
    }
}
