use crate::arbiter::ArbiterHandle;
use crate::clip::HapticClip;
use crate::error::Result;
use crate::priority::Priority;
use crate::scene::Scene;
use std::sync::Arc;
use tracing::debug;

/// Result of an emitter's play request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Granted,
    /// A higher-priority clip holds the slot; nothing changed.
    Rejected,
}

impl PlayOutcome {
    pub fn is_granted(self) -> bool {
        self == PlayOutcome::Granted
    }
}

/// A source of haptic playback requests bound to one arbiter.
pub struct Emitter {
    arbiter: ArbiterHandle,
    clip: Arc<dyn HapticClip>,
    priority: Priority,
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("arbiter", &self.arbiter)
            .field("clip", &self.clip.name())
            .field("priority", &self.priority)
            .finish()
    }
}

impl Emitter {
    pub fn new(arbiter: ArbiterHandle, clip: Arc<dyn HapticClip>, priority: Priority) -> Self {
        Self { arbiter, clip, priority }
    }

    /// Binds to the scene's single arbiter. Fails when the scene holds none
    /// or more than one.
    pub fn discover(scene: &Scene, clip: Arc<dyn HapticClip>, priority: Priority) -> Result<Self> {
        Ok(Self::new(scene.arbiter()?, clip, priority))
    }

    /// Plays the clip if the slot is idle or held at an equal or lower
    /// priority. Load, priority and play happen under one lock, so no other
    /// emitter can interleave between the check and the takeover.
    pub fn play(&self) -> PlayOutcome {
        let mut arbiter = self.arbiter.lock();
        let can_play = !arbiter.is_playing() || self.priority.preempts(arbiter.priority());
        if !can_play {
            debug!(
                clip = self.clip.name(),
                priority = %self.priority,
                holder = %arbiter.priority(),
                "haptic request rejected"
            );
            return PlayOutcome::Rejected;
        }

        arbiter.load(self.clip.data());
        arbiter.set_priority(self.priority);
        arbiter.play();
        debug!(clip = self.clip.name(), priority = %self.priority, "haptic request granted");
        PlayOutcome::Granted
    }

    /// Stops whatever the arbiter is playing, even if another emitter
    /// started it.
    pub fn stop(&self) {
        self.arbiter.lock().stop();
    }

    pub fn clip(&self) -> &Arc<dyn HapticClip> {
        &self.clip
    }

    pub fn set_clip(&mut self, clip: Arc<dyn HapticClip>) {
        self.clip = clip;
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    pub fn arbiter(&self) -> &ArbiterHandle {
        &self.arbiter
    }
}
