//! Device-side engine for the LEGO UART Message Protocol (LUMP)
//!
//! This crate lets a microcontroller present itself to a LEGO hub (SPIKE
//! Prime / SPIKE Essential / EV3 / Powered-Up) as a native sensor or
//! actuator: it negotiates the handshake, broadcasts the device's mode
//! catalog, switches the line to the working baud rate, then exchanges
//! DATA and CMD frames under the host's NACK heartbeat.
//!
//! Two cooperative state machines drive everything from a single
//! non-blocking tick: the device lifecycle machine
//! ([`state::DeviceState`]) and the frame receiver
//! ([`state::ReceiverState`]). Call [`LumpDevice::run`] from the firmware
//! loop at a rate comfortably above the UART byte rate; each call does a
//! bounded amount of work and never blocks.
//!
//! Hardware access goes through the `lump-hal` capability traits, so the
//! engine itself is board-agnostic and testable on the host.
//!
//! ```no_run
//! # fn main() { }
//! # fn demo<U: lump_hal::Uart, P: lump_hal::TxPin, C: lump_hal::Clock>(
//! #     uart: U, tx_pin: P, clock: C) {
//! use lump_core::{DataType, DeviceConfig, LumpDevice, Mode};
//!
//! let mut modes = [Mode::new("DIST", DataType::Data16, 1, 5, 0)];
//! let config = DeviceConfig::new(0x41, 115_200);
//! let mut device = LumpDevice::new(uart, tx_pin, clock, &mut modes, config);
//!
//! device.begin();
//! loop {
//!     device.run();
//!     if device.is_communicating() {
//!         device.send(&1234i16.to_le_bytes());
//!     }
//! }
//! # }
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod device;
pub mod mode;
mod receiver;
pub mod span;
pub mod state;

pub use device::{DeviceConfig, LumpDevice};
pub use mode::{DataType, Mode};
pub use span::ValueSpan;
pub use state::{DeviceState, ReceiverState};
