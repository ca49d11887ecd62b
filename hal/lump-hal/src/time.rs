//! Millisecond time base

/// Monotonic millisecond clock.
///
/// The counter may wrap; consumers compare instants with
/// `wrapping_sub`, so a `u32` at millisecond resolution is sufficient
/// (wraps after ~49 days, far beyond any protocol timeout).
pub trait Clock {
    /// Milliseconds since an arbitrary epoch.
    fn millis(&self) -> u32;
}
