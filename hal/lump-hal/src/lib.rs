//! LUMP Hardware Abstraction Layer
//!
//! This crate defines the capability traits the protocol engine consumes.
//! Chip-specific implementations (or host-side test doubles) provide the
//! actual UART, pin, clock and watchdog plumbing, so the same engine runs
//! unchanged on any microcontroller.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  lump-core (protocol engine)            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lump-hal (this crate - traits)         │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ chip-specific │       │ lump-hal-mock │
//! │ HAL crate     │       │ (host tests)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::Uart`] - Half-duplex serial link to the hub
//! - [`gpio::TxPin`] - Direct control of the TX line during auto-id
//! - [`time::Clock`] - Millisecond time base
//! - [`watchdog::WatchdogHooks`] - Optional watchdog callbacks

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod time;
pub mod uart;
pub mod watchdog;

pub use gpio::TxPin;
pub use time::Clock;
pub use uart::Uart;
pub use watchdog::WatchdogHooks;
