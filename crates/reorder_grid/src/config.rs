use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Gesture thresholds for a reorderable grid.
///
/// Times are stored in milliseconds so the struct reads naturally from a
/// config file; the accessors hand out [`Duration`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// How long a press must be held, without leaving the slop, before it
    /// becomes a drag.
    pub long_press_ms: u64,
    /// Movement on either axis, in pixels, that turns a pending press into
    /// a scroll.
    pub slop: f32,
    /// Fraction of the candidate card's area the dragged card must cover.
    pub swap_overlap: f32,
    /// Minimum time between two committed swaps.
    pub swap_debounce_ms: u64,
    /// Taps are ignored for this long after a drag is released.
    pub tap_suppression_ms: u64,
    /// Length of the slide that settles displaced cards.
    pub settle_ms: u64,
    pub columns: u16,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 400,
            slop: 8.0,
            swap_overlap: 0.4,
            swap_debounce_ms: 500,
            tap_suppression_ms: 300,
            settle_ms: 200,
            columns: 3,
        }
    }
}

impl GridConfig {
    pub const fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub const fn swap_debounce(&self) -> Duration {
        Duration::from_millis(self.swap_debounce_ms)
    }

    pub const fn tap_suppression(&self) -> Duration {
        Duration::from_millis(self.tap_suppression_ms)
    }

    pub const fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}
