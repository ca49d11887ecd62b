//! LEGO UART Message Protocol (LUMP) wire definitions
//!
//! This crate defines the byte-level protocol spoken between a LEGO hub
//! (SPIKE Prime / SPIKE Essential / EV3 / Powered-Up) and a custom
//! peripheral over a single-pair UART link: constants, the framing codec,
//! and a typed view of host-originated messages.
//!
//! # Frame format
//!
//! Apart from the three single-byte system messages (SYNC, NACK, ACK),
//! every frame has the shape:
//!
//! ```text
//! ┌────────┬─────────────┬──────────┐
//! │ HEADER │ PAYLOAD     │ CHECKSUM │
//! │ 1B     │ 1–32B (2ⁿ)  │ 1B       │
//! └────────┴─────────────┴──────────┘
//! ```
//!
//! The header packs three fields: the message type in the top two bits,
//! `log2(payload size)` in bits 3–5, and a command or mode number in the
//! low three bits. The checksum is `0xFF` XOR-folded over all preceding
//! bytes. INFO frames additionally carry an info-type byte between the
//! header and the payload; the encoded size does not count it.

#![no_std]
#![deny(unsafe_code)]

pub mod consts;
pub mod frame;
pub mod messages;

pub use consts::*;
pub use frame::{
    ceil_pow2, checksum, encode_frame, encode_header, encode_msg, msg_cmd, msg_type,
    payload_size, size_log2, version_to_bcd,
};
pub use messages::HostMessage;
