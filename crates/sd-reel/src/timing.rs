//! Spin timing profiles
//!
//! Reel stops are staggered: `base + index × stagger`, all scaled by a speed
//! multiplier for fast/auto modes. The wheel settle duration lives here too
//! so one profile describes a whole spin presentation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing profile for one spin presentation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinTiming {
    /// Base duration the first reel spins before stopping (ms)
    pub base_spin_ms: u64,
    /// Extra delay per subsequent reel (ms)
    pub stagger_ms: u64,
    /// Rarity wheel settle duration (ms)
    pub wheel_settle_ms: u64,
    /// Speed multiplier; < 1.0 = faster (fast/auto modes)
    pub speed: f64,
}

impl SpinTiming {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            base_spin_ms: 2200,
            stagger_ms: 500,
            wheel_settle_ms: 2800,
            speed: 1.0,
        }
    }

    /// Fast mode used during auto-play
    pub fn fast() -> Self {
        Self::normal().scaled(0.5)
    }

    /// Scale every duration by `factor` (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            speed: self.speed * factor,
            ..*self
        }
    }

    /// Effective spin duration for one reel
    pub fn reel_duration(&self, reel_index: usize) -> Duration {
        let ms = (self.base_spin_ms + reel_index as u64 * self.stagger_ms) as f64 * self.speed;
        Duration::from_millis(ms.max(0.0) as u64)
    }

    /// Effective wheel settle duration
    pub fn wheel_settle(&self) -> Duration {
        Duration::from_millis((self.wheel_settle_ms as f64 * self.speed).max(0.0) as u64)
    }

    /// Time until the last reel stops
    pub fn total_spin_duration(&self, reel_count: usize) -> Duration {
        if reel_count == 0 {
            return Duration::ZERO;
        }
        self.reel_duration(reel_count - 1)
    }
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self::normal()
    }
}
