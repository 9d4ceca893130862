//! Volume level as the media element sees it
//!
//! The media sink takes a linear level in `0.0..=1.0` plus a separate mute
//! flag. Text front ends work in whole percent, so conversions live here too.

use serde::{Deserialize, Serialize};

/// Volume level with mute state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f64,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create new volume, clamped to `0.0..=1.0`
    pub fn new(level: f64) -> Self {
        let mut volume = Self {
            level: 1.0,
            muted: false,
        };
        volume.set_level(level);
        volume
    }

    /// Create from a percentage (0-100)
    pub fn from_percent(percent: u8) -> Self {
        Self::new(f64::from(percent.min(100)) / 100.0)
    }

    /// Set volume level
    ///
    /// NaN is ignored so a bad reading from the sink never poisons the state.
    pub fn set_level(&mut self, level: f64) {
        if level.is_nan() {
            return;
        }
        self.level = level.clamp(0.0, 1.0);
    }

    /// Get current volume level (0.0-1.0)
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Volume as a rounded percentage
    pub fn percent(&self) -> u8 {
        (self.level * 100.0).round() as u8
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0)
    }
}
