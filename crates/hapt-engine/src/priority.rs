use crate::error::{HapticsError, Result};
use std::fmt;

/// Playback precedence of an emitter. Lower values win: 0 is the highest
/// priority and 256 the lowest.
///
/// `Ord` follows the raw value, so `a < b` means `a` takes precedence over `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u16);

impl Priority {
    pub const HIGHEST: Priority = Priority(0);
    pub const DEFAULT: Priority = Priority(128);
    pub const LOWEST: Priority = Priority(256);

    /// Validated constructor; rejects anything outside `0..=256`.
    pub fn new(value: i64) -> Result<Self> {
        if (0..=Self::LOWEST.0 as i64).contains(&value) {
            Ok(Self(value as u16))
        } else {
            Err(HapticsError::PriorityOutOfRange(value))
        }
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// True when a request at `self` may take the slot from `current`.
    /// Ties go to the incoming request.
    pub fn preempts(self, current: Priority) -> bool {
        self <= current
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
