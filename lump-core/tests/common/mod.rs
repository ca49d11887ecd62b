//! Shared harness for the end-to-end tests
//!
//! The device under test owns clones of the mock capabilities; the test
//! keeps the originals to script host traffic and step time.

#![allow(dead_code)]

use lump_core::{DeviceState, LumpDevice};
use lump_hal_mock::{MockClock, MockPin, MockUart};
use lump_protocol::{
    encode_msg, payload_size, CMD_SPEED, MSG_TYPE_CMD, MSG_TYPE_INFO, SPEED_LPF2, SYS_ACK,
    SYS_NACK, SYS_SYNC, UART_BUF_SIZE,
};

pub type TestDevice<'a> = LumpDevice<'a, MockUart, MockPin, MockClock>;

/// Builds a host-side frame with the payload bucketed to a power of two.
pub fn frame(msg_type: u8, cmd: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = [0u8; UART_BUF_SIZE];
    let len = encode_msg(msg_type, cmd, payload, &mut buf).unwrap();
    buf[..len].to_vec()
}

/// Ticks the device once per simulated millisecond.
pub fn run_ms(dev: &mut TestDevice<'_>, clock: &MockClock, ms: u32) {
    for _ in 0..ms {
        clock.advance(1);
        dev.run();
    }
}

/// Ticks until the device reaches `state`, panicking after `max_ms`.
pub fn run_until(dev: &mut TestDevice<'_>, clock: &MockClock, state: DeviceState, max_ms: u32) {
    for _ in 0..max_ms {
        if dev.state() == state {
            return;
        }
        clock.advance(1);
        dev.run();
    }
    panic!(
        "state {state:?} not reached within {max_ms} ms, stuck in {:?}",
        dev.state()
    );
}

/// Plays the host side of a full LPF2 handshake and discards everything
/// the device wrote, leaving it freshly `Communicating`.
pub fn lpf2_handshake(dev: &mut TestDevice<'_>, uart: &MockUart, clock: &MockClock) {
    dev.begin();
    run_ms(dev, clock, 3);
    uart.host_send(&frame(MSG_TYPE_CMD, CMD_SPEED, &SPEED_LPF2.to_le_bytes()));
    run_until(dev, clock, DeviceState::WaitingAckReply, 1_000);
    uart.host_send(&[SYS_ACK]);
    run_until(dev, clock, DeviceState::Communicating, 100);
    uart.take_written();
}

/// Splits a captured byte stream into frames using the wire framing:
/// lone system bytes, INFO frames (`size + 3` bytes), everything else
/// (`size + 2` bytes).
pub fn split_frames(mut bytes: &[u8]) -> Vec<Vec<u8>> {
    let mut frames = Vec::new();
    while !bytes.is_empty() {
        let header = bytes[0];
        let len = match header {
            SYS_SYNC | SYS_NACK | SYS_ACK => 1,
            h if h & 0xC0 == MSG_TYPE_INFO => payload_size(h) as usize + 3,
            h => payload_size(h) as usize + 2,
        };
        frames.push(bytes[..len].to_vec());
        bytes = &bytes[len..];
    }
    frames
}
