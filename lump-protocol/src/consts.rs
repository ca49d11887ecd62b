//! Protocol constants
//!
//! Wire values are fixed by the hubs' firmware and must be used verbatim.

/// Message-type field: system message (also the value of a lone SYNC byte).
pub const MSG_TYPE_SYS: u8 = 0x00;
/// Message-type field: command message.
pub const MSG_TYPE_CMD: u8 = 0x40;
/// Message-type field: mode-information message (handshake only).
pub const MSG_TYPE_INFO: u8 = 0x80;
/// Message-type field: data message.
pub const MSG_TYPE_DATA: u8 = 0xC0;
/// Mask selecting the message-type bits of a header.
pub const MSG_TYPE_MASK: u8 = 0xC0;
/// Mask selecting the command / mode bits of a header.
pub const MSG_CMD_MASK: u8 = 0x07;
/// Bit position of the encoded payload size within a header.
pub const MSG_SIZE_SHIFT: u8 = 3;

// Single-byte system messages. No payload, no checksum.
pub const SYS_SYNC: u8 = 0x00;
pub const SYS_NACK: u8 = 0x02;
pub const SYS_ACK: u8 = 0x04;

// Command numbers (low three header bits of a CMD message).
pub const CMD_TYPE: u8 = 0x00;
pub const CMD_MODES: u8 = 0x01;
pub const CMD_SPEED: u8 = 0x02;
pub const CMD_SELECT: u8 = 0x03;
pub const CMD_WRITE: u8 = 0x04;
pub const CMD_EXT_MODE: u8 = 0x06;
pub const CMD_VERSION: u8 = 0x07;

// Info types (low bits of the info-type byte following an INFO header).
pub const INFO_NAME: u8 = 0x00;
pub const INFO_RAW: u8 = 0x01;
pub const INFO_PCT: u8 = 0x02;
pub const INFO_SI: u8 = 0x03;
pub const INFO_UNITS: u8 = 0x04;
pub const INFO_MAPPING: u8 = 0x05;
pub const INFO_FORMAT: u8 = 0x80;
/// Set in the info-type byte when the described mode is 8 or above.
pub const INFO_MODE_PLUS_8: u8 = 0x20;

// Mode mapping flags, shared by the input and output side.
pub const MAPPING_NONE: u8 = 0x00;
/// Unassigned bit 0 of the mapping byte.
pub const MAPPING_NA0: u8 = 0x01;
/// Unassigned bit 1 of the mapping byte.
pub const MAPPING_NA1: u8 = 0x02;
/// Discrete values (0, 1, 2, 3).
pub const MAPPING_DIS: u8 = 0x04;
/// Relative values (-1..1).
pub const MAPPING_REL: u8 = 0x08;
/// Absolute values (min..max).
pub const MAPPING_ABS: u8 = 0x10;
pub const MAPPING_SUPPORT_FUNCTIONAL_MAPPING_2: u8 = 0x40;
pub const MAPPING_SUPPORT_NULL: u8 = 0x80;

/// Name-frame flags0 bit asking the hub for constant power on pin 2.
pub const FLAGS0_NEEDS_SUPPLY_PIN2: u8 = 0x40;
/// Trailer byte SPIKE 3 firmware requires in a power-requesting name frame.
/// Provenance unknown; preserved byte-for-byte.
pub const NAME_FLAGS_SPIKE3_MAGIC: u8 = 0x84;

// Data type identifiers carried in INFO_FORMAT.
pub const DATA_TYPE_DATA8: u8 = 0x00;
pub const DATA_TYPE_DATA16: u8 = 0x01;
pub const DATA_TYPE_DATA32: u8 = 0x02;
pub const DATA_TYPE_DATAF: u8 = 0x03;

/// Maximum mode name length without a flag trailer.
pub const NAME_MAX: usize = 11;
/// Maximum mode name length when the name frame carries flags.
pub const SHORT_NAME_MAX: usize = 5;
/// Capacity of a mode name buffer: short name, NUL, six flag bytes, NUL.
pub const MODE_NAME_BUF: usize = SHORT_NAME_MAX + 8;
/// Maximum symbol (unit-of-measure) length.
pub const UOM_MAX: usize = 4;
/// Maximum message payload size in bytes.
pub const MAX_MSG_SIZE: usize = 32;
/// Highest mode number addressable without CMD_EXT_MODE.
pub const MAX_MODE: u8 = 7;
/// Highest mode number addressable at all.
pub const MAX_EXT_MODE: u8 = 15;
/// A UART buffer fits the largest frame: header, info byte, payload, checksum.
pub const UART_BUF_SIZE: usize = MAX_MSG_SIZE + 3;

// Line speeds in bits per second.
pub const SPEED_MIN: u32 = 2_400;
pub const SPEED_MID: u32 = 57_600;
pub const SPEED_LPF2: u32 = 115_200;
pub const SPEED_MAX: u32 = 460_800;

// Timing thresholds in milliseconds.
/// Window in which an LPF2 host announces itself with CMD_SPEED.
pub const AUTO_ID_DELAY_MS: u32 = 500;
/// Settle time after reopening the UART before the handshake starts.
pub const UART_INIT_DELAY_MS: u32 = 5;
/// Pause between the info broadcasts of two consecutive modes.
pub const INTER_MODE_PAUSE_MS: u32 = 10;
/// How long the host gets to acknowledge the handshake.
pub const ACK_TIMEOUT_MS: u32 = 80;
/// Longest tolerated silence of the host's NACK heartbeat.
pub const NACK_TIMEOUT_MS: u32 = 1_500;

/// `view` value showing every mode in the host's datalog.
pub const VIEW_ALL: u8 = 255;

// CMD_EXT_MODE payload values.
pub const EXT_MODE_0: u8 = 0x00;
pub const EXT_MODE_8: u8 = 0x08;

/// Info-type byte flag for the given mode number.
#[inline]
pub const fn info_mode_flag(mode: u8) -> u8 {
    if mode > MAX_MODE {
        INFO_MODE_PLUS_8
    } else {
        0x00
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_mode_flag() {
        assert_eq!(info_mode_flag(0), 0x00);
        assert_eq!(info_mode_flag(7), 0x00);
        assert_eq!(info_mode_flag(8), INFO_MODE_PLUS_8);
        assert_eq!(info_mode_flag(15), INFO_MODE_PLUS_8);
    }

    #[test]
    fn test_buffer_fits_largest_frame() {
        // header + info byte + 32-byte payload + checksum
        assert_eq!(UART_BUF_SIZE, 35);
    }
}
