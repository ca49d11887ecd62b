//! Host-originated messages
//!
//! Typed view over a checksum-verified inbound frame. The receiver keeps
//! raw bytes; dispatch happens on the parsed variant.

use crate::consts::{
    CMD_EXT_MODE, CMD_SELECT, CMD_SPEED, CMD_WRITE, MSG_TYPE_CMD, MSG_TYPE_DATA, SYS_ACK,
    SYS_NACK, SYS_SYNC,
};
use crate::frame::{msg_cmd, msg_type, payload_size};

/// A message received from the hub.
///
/// Borrows its payload from the receive buffer it was parsed out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostMessage<'a> {
    /// Keep-alive sync byte. Ignored.
    Sync,
    /// The host's heartbeat, also requesting a data message.
    Nack,
    /// Handshake acknowledgement.
    Ack,
    /// LPF2 hosts announce themselves with this during auto-id.
    /// The payload value carries no information; presence is the signal.
    Speed,
    /// Switch the device to another mode.
    Select { mode: u8 },
    /// Freeform write to the device.
    Write { data: &'a [u8] },
    /// Mode offset (0 or 8) applied to subsequent DATA frames.
    ExtMode { offset: u8 },
    /// Host-to-device data for one mode.
    Data { mode: u8, payload: &'a [u8] },
}

impl<'a> HostMessage<'a> {
    /// Parses a verified frame: either a lone system byte or
    /// `[header, payload.., checksum]` with the checksum already checked.
    ///
    /// Returns `None` for message types and commands the device side does
    /// not react to; callers drop those silently.
    pub fn parse(frame: &'a [u8]) -> Option<Self> {
        if frame.len() == 1 {
            return match frame[0] {
                SYS_SYNC => Some(HostMessage::Sync),
                SYS_NACK => Some(HostMessage::Nack),
                SYS_ACK => Some(HostMessage::Ack),
                _ => None,
            };
        }

        let header = *frame.first()?;
        let size = payload_size(header) as usize;
        let payload = frame.get(1..1 + size)?;

        match msg_type(header) {
            MSG_TYPE_CMD => match msg_cmd(header) {
                CMD_SPEED => Some(HostMessage::Speed),
                CMD_SELECT => Some(HostMessage::Select { mode: payload[0] }),
                CMD_WRITE => Some(HostMessage::Write { data: payload }),
                CMD_EXT_MODE => Some(HostMessage::ExtMode { offset: payload[0] }),
                _ => None,
            },
            MSG_TYPE_DATA => Some(HostMessage::Data {
                mode: msg_cmd(header),
                payload,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::frame::{checksum, encode_msg};

    fn framed(msg_type: u8, cmd: u8, payload: &[u8]) -> heapless::Vec<u8, UART_BUF_SIZE> {
        let mut buf = [0u8; UART_BUF_SIZE];
        let len = encode_msg(msg_type, cmd, payload, &mut buf).unwrap();
        heapless::Vec::from_slice(&buf[..len]).unwrap()
    }

    #[test]
    fn test_system_bytes() {
        assert_eq!(HostMessage::parse(&[SYS_SYNC]), Some(HostMessage::Sync));
        assert_eq!(HostMessage::parse(&[SYS_NACK]), Some(HostMessage::Nack));
        assert_eq!(HostMessage::parse(&[SYS_ACK]), Some(HostMessage::Ack));
        assert_eq!(HostMessage::parse(&[0x06]), None);
    }

    #[test]
    fn test_speed_presence_is_the_signal() {
        let frame = framed(MSG_TYPE_CMD, CMD_SPEED, &[0x00, 0xC2, 0x01, 0x00]);
        assert_eq!(HostMessage::parse(&frame), Some(HostMessage::Speed));
    }

    #[test]
    fn test_select_carries_mode() {
        let frame = framed(MSG_TYPE_CMD, CMD_SELECT, &[0x03]);
        assert_eq!(
            HostMessage::parse(&frame),
            Some(HostMessage::Select { mode: 3 })
        );
    }

    #[test]
    fn test_write_borrows_padded_payload() {
        let frame = framed(MSG_TYPE_CMD, CMD_WRITE, &[0xAA, 0xBB, 0xCC]);
        match HostMessage::parse(&frame) {
            Some(HostMessage::Write { data }) => assert_eq!(data, &[0xAA, 0xBB, 0xCC, 0x00]),
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_ext_mode_offset() {
        let frame = framed(MSG_TYPE_CMD, CMD_EXT_MODE, &[EXT_MODE_8]);
        assert_eq!(
            HostMessage::parse(&frame),
            Some(HostMessage::ExtMode { offset: 8 })
        );
    }

    #[test]
    fn test_data_carries_low_mode_bits() {
        let frame = framed(MSG_TYPE_DATA, 0x02, &[0x5A]);
        match HostMessage::parse(&frame) {
            Some(HostMessage::Data { mode, payload }) => {
                assert_eq!(mode, 2);
                assert_eq!(payload, &[0x5A]);
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_cmds_and_types_ignored() {
        // CMD_TYPE and CMD_MODES never originate from the host
        let frame = framed(MSG_TYPE_CMD, CMD_TYPE, &[0x41]);
        assert_eq!(HostMessage::parse(&frame), None);
        let frame = framed(MSG_TYPE_CMD, CMD_MODES, &[0x00]);
        assert_eq!(HostMessage::parse(&frame), None);
        // INFO frames are device-to-host only
        let frame = framed(MSG_TYPE_INFO, 0, &[0x00, b'A', b'B', b'C']);
        assert_eq!(HostMessage::parse(&frame), None);
    }

    #[test]
    fn test_truncated_frame_rejected() {
        // header advertises 4 payload bytes but only 2 are present
        let mut short = [0u8; 4];
        short[0] = 0x52;
        short[3] = checksum(&short[..3]);
        assert_eq!(HostMessage::parse(&short), None);
    }
}
