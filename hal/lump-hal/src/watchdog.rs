//! Optional watchdog callbacks
//!
//! Some boards brown out if the handshake stalls with the watchdog armed,
//! so the engine initializes, feeds and tears down the watchdog at
//! well-defined lifecycle points. Devices without one leave the hooks at
//! their no-op default.

/// Watchdog callback set.
///
/// Each hook is optional; `None` is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchdogHooks {
    /// Arm the watchdog.
    pub init: Option<fn()>,
    /// Reset the watchdog countdown.
    pub feed: Option<fn()>,
    /// Disarm the watchdog.
    pub deinit: Option<fn()>,
}

impl WatchdogHooks {
    /// Hooks that do nothing.
    pub const fn none() -> Self {
        Self {
            init: None,
            feed: None,
            deinit: None,
        }
    }

    /// A full callback set.
    pub const fn new(init: fn(), feed: fn(), deinit: fn()) -> Self {
        Self {
            init: Some(init),
            feed: Some(feed),
            deinit: Some(deinit),
        }
    }
}
