//! Host-side test doubles for the `lump-hal` capability traits
//!
//! Every mock hands out cheap clones sharing one interior state, so a
//! test can keep a handle while the device under test owns the
//! capability: script host bytes in, drain device bytes out, and step
//! time by hand for deterministic timeout coverage.

pub mod clock;
pub mod pin;
pub mod uart;

pub use clock::MockClock;
pub use pin::MockPin;
pub use uart::MockUart;
