//! Display value spans
//!
//! Each mode may describe up to three ranges (raw, percent, SI) the host
//! uses to scale readings in its UI. Absent spans are skipped during the
//! handshake broadcast and the host falls back to its defaults.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One display range of a mode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValueSpan {
    min: f32,
    max: f32,
    valid: bool,
    present: bool,
}

impl ValueSpan {
    /// A span from `min` to `max`.
    ///
    /// An inverted span is kept but never broadcast.
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            valid: min <= max,
            present: true,
        }
    }

    /// The absent span; its INFO frame is skipped during the handshake.
    pub const fn absent() -> Self {
        Self {
            min: 0.0,
            max: 0.0,
            valid: false,
            present: false,
        }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Whether this span goes out during the info broadcast.
    pub fn is_sendable(&self) -> bool {
        self.present && self.valid
    }
}
