//! Mode catalog
//!
//! A mode is one logical measurement or actuation channel of the device.
//! Everything the host learns about a mode during the handshake lives
//! here, together with the buffer for host-to-device data writes.
//!
//! Construction normalizes arguments instead of failing: an invalid name
//! falls back to `"null"`, overlong names and symbols are truncated, and
//! the data count is clamped to the 32-byte payload limit.

use heapless::Vec;
use lump_protocol::{MAPPING_NONE, MAX_MSG_SIZE, MODE_NAME_BUF, NAME_MAX, UOM_MAX};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Data type of one element of a mode's data message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataType {
    /// 8-bit signed integer.
    Data8 = 0,
    /// Little-endian 16-bit signed integer.
    Data16 = 1,
    /// Little-endian 32-bit signed integer.
    Data32 = 2,
    /// Little-endian 32-bit float.
    DataF = 3,
}

impl DataType {
    /// Size of one element in bytes.
    pub const fn size(self) -> u8 {
        match self {
            DataType::Data8 => 1,
            DataType::Data16 => 2,
            DataType::Data32 | DataType::DataF => 4,
        }
    }

    /// Wire identifier carried in INFO_FORMAT.
    pub const fn wire_id(self) -> u8 {
        self as u8
    }
}

/// One operating mode of a LUMP device.
#[derive(Debug, Clone)]
pub struct Mode {
    name: [u8; MODE_NAME_BUF],
    data_type: DataType,
    num_data: u8,
    figures: u8,
    decimals: u8,
    symbol: Vec<u8, UOM_MAX>,
    raw: crate::ValueSpan,
    pct: crate::ValueSpan,
    si: crate::ValueSpan,
    map_in: u8,
    map_out: u8,
    power: bool,
    flags_in_name: bool,
    /// Present iff `map_out != MAPPING_NONE`; holds the latest host write.
    data_msg: Option<Vec<u8, MAX_MSG_SIZE>>,
    has_data_msg: bool,
}

impl Mode {
    /// Creates a mode.
    ///
    /// `name` must be non-empty and start with an ASCII letter, else it
    /// is replaced by `"null"`; it is truncated to [`NAME_MAX`] bytes
    /// (shortened further on the wire when the mode requests power).
    /// `num_data` is clamped so the data message fits the 32-byte
    /// payload limit. `figures` and `decimals` are display hints in
    /// `0..=15`.
    pub fn new(name: &str, data_type: DataType, num_data: u8, figures: u8, decimals: u8) -> Self {
        let max_data = (MAX_MSG_SIZE as u8) / data_type.size();
        let mut mode = Self {
            name: [0; MODE_NAME_BUF],
            data_type,
            num_data: num_data.clamp(1, max_data),
            figures: figures.min(15),
            decimals: decimals.min(15),
            symbol: Vec::new(),
            raw: crate::ValueSpan::absent(),
            pct: crate::ValueSpan::absent(),
            si: crate::ValueSpan::absent(),
            map_in: MAPPING_NONE,
            map_out: MAPPING_NONE,
            power: false,
            flags_in_name: false,
            data_msg: None,
            has_data_msg: false,
        };

        let bytes = name.as_bytes();
        let valid = bytes.first().is_some_and(|b| b.is_ascii_alphabetic());
        let source: &[u8] = if valid { bytes } else { b"null" };
        let len = source.len().min(NAME_MAX);
        mode.name[..len].copy_from_slice(&source[..len]);
        mode
    }

    /// Sets the unit-of-measure symbol, truncated to [`UOM_MAX`] bytes.
    /// An empty symbol skips the INFO_UNITS frame.
    pub fn symbol(mut self, symbol: &str) -> Self {
        let bytes = symbol.as_bytes();
        let len = bytes.len().min(UOM_MAX);
        self.symbol = Vec::from_slice(&bytes[..len]).unwrap_or_default();
        self
    }

    /// Sets the raw display span.
    pub fn raw(mut self, span: crate::ValueSpan) -> Self {
        self.raw = span;
        self
    }

    /// Sets the percent display span.
    pub fn pct(mut self, span: crate::ValueSpan) -> Self {
        self.pct = span;
        self
    }

    /// Sets the SI display span.
    pub fn si(mut self, span: crate::ValueSpan) -> Self {
        self.si = span;
        self
    }

    /// Sets the input and output mapping flag bytes.
    ///
    /// A non-`MAPPING_NONE` output mapping means the host may write data
    /// messages to this mode, so the receive buffer is allocated here.
    pub fn mapping(mut self, map_in: u8, map_out: u8) -> Self {
        self.map_in = map_in;
        self.map_out = map_out;
        self.data_msg = if map_out != MAPPING_NONE {
            let mut buf = Vec::new();
            buf.resize_default(self.data_msg_size() as usize).ok();
            Some(buf)
        } else {
            None
        };
        self
    }

    /// Asks the hub for constant power on pin 2.
    ///
    /// Enabling this on any mode enables it device-wide and shortens the
    /// wire name of every mode to `SHORT_NAME_MAX` characters.
    pub fn power(mut self, power: bool) -> Self {
        self.power = power;
        self
    }

    /// Replaces the name with a raw name-plus-flags blob (short name,
    /// NUL, six flag bytes), sent verbatim in the name frame. `power`
    /// is ignored for a mode carrying its flags this way.
    pub fn flag_trailer(mut self, blob: &[u8]) -> Self {
        self.name = [0; MODE_NAME_BUF];
        let len = blob.len().min(MODE_NAME_BUF);
        self.name[..len].copy_from_slice(&blob[..len]);
        self.flags_in_name = true;
        self
    }

    /// Full name buffer, including any embedded flag trailer.
    pub fn name_bytes(&self) -> &[u8; MODE_NAME_BUF] {
        &self.name
    }

    /// Length of the NUL-terminated name.
    pub fn name_len(&self) -> usize {
        self.name.iter().position(|&b| b == 0).unwrap_or(MODE_NAME_BUF)
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn num_data(&self) -> u8 {
        self.num_data
    }

    pub fn figures(&self) -> u8 {
        self.figures
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn symbol_bytes(&self) -> &[u8] {
        &self.symbol
    }

    pub fn raw_span(&self) -> crate::ValueSpan {
        self.raw
    }

    pub fn pct_span(&self) -> crate::ValueSpan {
        self.pct
    }

    pub fn si_span(&self) -> crate::ValueSpan {
        self.si
    }

    pub fn map_in(&self) -> u8 {
        self.map_in
    }

    pub fn map_out(&self) -> u8 {
        self.map_out
    }

    pub fn needs_power(&self) -> bool {
        self.power
    }

    pub fn has_flag_trailer(&self) -> bool {
        self.flags_in_name
    }

    /// Size of one data message of this mode in bytes.
    pub fn data_msg_size(&self) -> u8 {
        self.num_data * self.data_type.size()
    }

    /// Latest host-written data message, if this mode accepts writes.
    pub fn data_msg(&self) -> Option<&[u8]> {
        self.data_msg.as_deref()
    }

    /// Copies an inbound payload into the data message buffer.
    ///
    /// Drops the write if the mode accepts none or the payload is
    /// shorter than one full data message.
    pub(crate) fn store_data_msg(&mut self, payload: &[u8]) -> bool {
        let Some(buf) = self.data_msg.as_mut() else {
            return false;
        };
        if payload.len() < buf.len() {
            return false;
        }
        let len = buf.len();
        buf.copy_from_slice(&payload[..len]);
        self.has_data_msg = true;
        true
    }

    /// Read-and-clear check for an unconsumed host write.
    pub(crate) fn take_has_data_msg(&mut self) -> bool {
        core::mem::take(&mut self.has_data_msg)
    }

    /// Zeroes the data message buffer and drops the unconsumed flag.
    pub(crate) fn clear_data_msg(&mut self) {
        if let Some(buf) = self.data_msg.as_mut() {
            buf.fill(0);
        }
        self.has_data_msg = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lump_protocol::{MAPPING_ABS, MAPPING_REL};

    #[test]
    fn test_data_type_sizes() {
        assert_eq!(DataType::Data8.size(), 1);
        assert_eq!(DataType::Data16.size(), 2);
        assert_eq!(DataType::Data32.size(), 4);
        assert_eq!(DataType::DataF.size(), 4);
    }

    #[test]
    fn test_valid_name_is_kept() {
        let mode = Mode::new("DIST", DataType::Data8, 1, 3, 0);
        assert_eq!(&mode.name_bytes()[..4], b"DIST");
        assert_eq!(mode.name_len(), 4);
    }

    #[test]
    fn test_invalid_names_fall_back_to_null() {
        for bad in ["", "9LIVES", "-DASH", " LEAD"] {
            let mode = Mode::new(bad, DataType::Data8, 1, 3, 0);
            assert_eq!(&mode.name_bytes()[..4], b"null", "name {bad:?}");
            assert_eq!(mode.name_len(), 4);
        }
    }

    #[test]
    fn test_overlong_name_is_truncated() {
        let mode = Mode::new("ABCDEFGHIJKLMNOP", DataType::Data8, 1, 3, 0);
        assert_eq!(mode.name_len(), NAME_MAX);
        assert_eq!(&mode.name_bytes()[..NAME_MAX], b"ABCDEFGHIJK");
    }

    #[test]
    fn test_num_data_clamped_to_payload_limit() {
        assert_eq!(Mode::new("A", DataType::Data8, 40, 1, 0).num_data(), 32);
        assert_eq!(Mode::new("A", DataType::Data16, 40, 1, 0).num_data(), 16);
        assert_eq!(Mode::new("A", DataType::DataF, 40, 1, 0).num_data(), 8);
        assert_eq!(Mode::new("A", DataType::Data8, 0, 1, 0).num_data(), 1);
    }

    #[test]
    fn test_display_hints_clamped() {
        let mode = Mode::new("A", DataType::Data8, 1, 200, 99);
        assert_eq!(mode.figures(), 15);
        assert_eq!(mode.decimals(), 15);
    }

    #[test]
    fn test_symbol_truncated() {
        let mode = Mode::new("A", DataType::Data8, 1, 1, 0).symbol("METERS");
        assert_eq!(mode.symbol_bytes(), b"METE");
    }

    #[test]
    fn test_data_msg_buffer_follows_map_out() {
        let mode = Mode::new("A", DataType::Data16, 2, 1, 0);
        assert!(mode.data_msg().is_none());

        let mode = mode.mapping(MAPPING_NONE, MAPPING_ABS);
        assert_eq!(mode.data_msg(), Some(&[0u8; 4][..]));

        let mode = mode.mapping(MAPPING_REL, MAPPING_NONE);
        assert!(mode.data_msg().is_none());
    }

    #[test]
    fn test_store_data_msg_requires_full_message() {
        let mut mode = Mode::new("A", DataType::Data16, 2, 1, 0).mapping(0, MAPPING_ABS);
        assert!(!mode.store_data_msg(&[1, 2, 3]));
        assert!(!mode.take_has_data_msg());

        assert!(mode.store_data_msg(&[1, 2, 3, 4, 5]));
        assert_eq!(mode.data_msg(), Some(&[1, 2, 3, 4][..]));
        assert!(mode.take_has_data_msg());
        assert!(!mode.take_has_data_msg());
    }

    #[test]
    fn test_store_without_buffer_is_dropped() {
        let mut mode = Mode::new("A", DataType::Data8, 1, 1, 0);
        assert!(!mode.store_data_msg(&[1]));
    }

    #[test]
    fn test_clear_data_msg_zeroes_buffer() {
        let mut mode = Mode::new("A", DataType::Data8, 2, 1, 0).mapping(0, MAPPING_ABS);
        assert!(mode.store_data_msg(&[7, 8]));
        mode.clear_data_msg();
        assert_eq!(mode.data_msg(), Some(&[0u8, 0][..]));
        assert!(!mode.take_has_data_msg());
    }

    #[test]
    fn test_flag_trailer_replaces_name() {
        let blob = *b"GYRO\0\0\x40\0\0\0\0\x84\0";
        let mode = Mode::new("IGNORED", DataType::Data8, 1, 1, 0).flag_trailer(&blob);
        assert!(mode.has_flag_trailer());
        assert_eq!(mode.name_bytes(), &blob);
    }

    #[test]
    fn test_clone_deep_copies_data_msg() {
        let mut mode = Mode::new("A", DataType::Data8, 2, 1, 0).mapping(0, MAPPING_ABS);
        assert!(mode.store_data_msg(&[1, 2]));

        let mut copy = mode.clone();
        assert!(copy.store_data_msg(&[9, 9]));
        assert_eq!(mode.data_msg(), Some(&[1, 2][..]));
        assert_eq!(copy.data_msg(), Some(&[9, 9][..]));
    }
}
