//! Device lifecycle engine
//!
//! [`LumpDevice`] walks a hub through the LUMP handshake and keeps the
//! session alive afterwards. One [`LumpDevice::run`] call advances the
//! lifecycle machine by at most one state and offers the receiver at most
//! one inbound byte, so the firmware loop stays in control of timing.
//!
//! The handshake broadcasts the mode catalog last-mode-first; within a
//! mode the order is fixed: name, value spans, symbol, mapping, format.

use lump_hal::{Clock, TxPin, Uart, WatchdogHooks};
use lump_protocol::{
    ceil_pow2, checksum, encode_frame, encode_header, encode_msg, info_mode_flag,
    version_to_bcd, ACK_TIMEOUT_MS, AUTO_ID_DELAY_MS, CMD_EXT_MODE, CMD_MODES, CMD_SPEED,
    CMD_TYPE, CMD_VERSION, EXT_MODE_0, EXT_MODE_8, FLAGS0_NEEDS_SUPPLY_PIN2, INFO_FORMAT,
    INFO_MAPPING, INFO_NAME, INFO_PCT, INFO_RAW, INFO_SI, INFO_UNITS, INTER_MODE_PAUSE_MS,
    MAX_EXT_MODE, MAX_MODE, MAX_MSG_SIZE, MODE_NAME_BUF, MSG_CMD_MASK, MSG_TYPE_CMD,
    MSG_TYPE_DATA, MSG_TYPE_INFO, NACK_TIMEOUT_MS, NAME_FLAGS_SPIKE3_MAGIC, SHORT_NAME_MAX,
    SPEED_LPF2, SPEED_MIN, SYS_ACK, SYS_NACK, UART_BUF_SIZE, UART_INIT_DELAY_MS, UOM_MAX,
    VIEW_ALL,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::mode::Mode;
use crate::state::{DeviceState, ReceiverState};

/// Static device description handed to [`LumpDevice::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    /// One-byte device type identifier.
    pub device_type: u8,
    /// Line speed after the handshake, in baud.
    pub speed: u32,
    /// How many modes the host's datalog shows; [`VIEW_ALL`] shows all.
    pub view: u8,
    /// Firmware version as eight decimal digits; `10000000` is v1.0.00.0000.
    pub fw_version: u32,
    /// Hardware version as eight decimal digits.
    pub hw_version: u32,
    /// Listen for an LPF2 host during auto-id. Disable on MCUs that
    /// cannot ground TX without closing the UART first.
    pub detect_host_type: bool,
}

impl DeviceConfig {
    /// A config with the given type and speed and defaults for the rest.
    pub fn new(device_type: u8, speed: u32) -> Self {
        Self {
            device_type,
            speed,
            ..Self::default()
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_type: 0,
            speed: SPEED_LPF2,
            view: VIEW_ALL,
            fw_version: 10_000_000,
            hw_version: 10_000_000,
            detect_host_type: true,
        }
    }
}

/// A LUMP device: the peripheral end of a hub's UART port.
///
/// Generic over the capabilities it consumes, so the same engine runs on
/// any board and against host-side test doubles.
pub struct LumpDevice<'a, U, P, C>
where
    U: Uart,
    P: TxPin,
    C: Clock,
{
    pub(crate) uart: U,
    tx_pin: P,
    clock: C,
    wdt: WatchdogHooks,
    config: DeviceConfig,

    pub(crate) modes: &'a mut [Mode],
    pub(crate) num_modes: u8,

    pub(crate) is_lpf2_host: bool,
    pub(crate) device_mode: u8,
    pub(crate) ext_mode: u8,
    /// Handshake countdown: modes broadcast from `num_modes - 1` down to 0.
    mode_idx: u8,

    pub(crate) device_state: DeviceState,
    pub(crate) prev_device_state: DeviceState,
    pub(crate) receiver_state: ReceiverState,

    pub(crate) current_ms: u32,
    prev_ms: u32,
    pub(crate) nack_ms: u32,

    tx_buf: [u8; UART_BUF_SIZE],
    pub(crate) rx_buf: [u8; UART_BUF_SIZE],
    pub(crate) rx_len: u8,
    pub(crate) rx_idx: u8,

    pub(crate) nack_seen: bool,
    pub(crate) cmd_write_data: [u8; MAX_MSG_SIZE],
    pub(crate) cmd_write_size: u8,
    pub(crate) cmd_write_pending: bool,
}

impl<'a, U, P, C> LumpDevice<'a, U, P, C>
where
    U: Uart,
    P: TxPin,
    C: Clock,
{
    /// Creates a device over the given capabilities and mode catalog.
    ///
    /// At most `MAX_EXT_MODE + 1` (16) modes are used; extra entries are
    /// ignored. The catalog must not be empty.
    pub fn new(uart: U, tx_pin: P, clock: C, modes: &'a mut [Mode], config: DeviceConfig) -> Self {
        debug_assert!(!modes.is_empty(), "a device needs at least one mode");
        let num_modes = modes.len().min(MAX_EXT_MODE as usize + 1) as u8;
        Self {
            uart,
            tx_pin,
            clock,
            wdt: WatchdogHooks::none(),
            config,
            modes,
            num_modes,
            is_lpf2_host: false,
            device_mode: 0,
            ext_mode: 0,
            mode_idx: 0,
            device_state: DeviceState::InitWdt,
            prev_device_state: DeviceState::InitWdt,
            receiver_state: ReceiverState::ReadByte,
            current_ms: 0,
            prev_ms: 0,
            nack_ms: 0,
            tx_buf: [0; UART_BUF_SIZE],
            rx_buf: [0; UART_BUF_SIZE],
            rx_len: 0,
            rx_idx: 0,
            nack_seen: false,
            cmd_write_data: [0; MAX_MSG_SIZE],
            cmd_write_size: 0,
            cmd_write_pending: false,
        }
    }

    /// Installs the optional watchdog callbacks.
    pub fn set_wdt_hooks(&mut self, hooks: WatchdogHooks) {
        self.wdt = hooks;
    }

    /// Resets both state machines; the next [`run`](Self::run) starts a
    /// fresh handshake.
    pub fn begin(&mut self) {
        self.device_state = DeviceState::InitWdt;
        self.prev_device_state = DeviceState::InitWdt;
        self.receiver_state = ReceiverState::ReadByte;
        self.rx_idx = 0;
        self.rx_len = 0;
    }

    /// Shuts the device down: disarms the watchdog and closes the UART.
    pub fn end(&mut self) {
        if let Some(deinit) = self.wdt.deinit {
            deinit();
        }
        self.uart.end();
    }

    /// One cooperative tick: a single lifecycle step, then at most one
    /// inbound byte. Never blocks. Call at a rate comfortably above the
    /// UART byte rate (every millisecond is plenty at 115200 baud).
    pub fn run(&mut self) {
        self.current_ms = self.clock.millis();
        self.step();
        self.poll_receiver();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DeviceState {
        self.device_state
    }

    /// Mode the host last selected (0-indexed).
    pub fn mode(&self) -> u8 {
        self.device_mode
    }

    /// Whether the handshake completed and the session is live.
    pub fn is_communicating(&self) -> bool {
        self.device_state.is_communicating()
    }

    /// Read-and-clear check for a heartbeat NACK since the last call.
    ///
    /// Hosts pace data requests with NACKs, so this is the cue to send.
    pub fn has_nack(&mut self) -> bool {
        core::mem::take(&mut self.nack_seen)
    }

    /// Read-and-clear check for a fresh CMD_WRITE payload.
    pub fn has_cmd_write_data(&mut self) -> bool {
        core::mem::take(&mut self.cmd_write_pending)
    }

    /// The latest CMD_WRITE payload.
    pub fn cmd_write_data(&self) -> &[u8] {
        &self.cmd_write_data[..self.cmd_write_size as usize]
    }

    /// Forgets the latest CMD_WRITE payload.
    pub fn clear_cmd_write_data(&mut self) {
        self.cmd_write_data.fill(0);
        self.cmd_write_size = 0;
        self.cmd_write_pending = false;
    }

    /// Read-and-clear check for a fresh host data write to `mode`.
    pub fn has_data_msg(&mut self, mode: u8) -> bool {
        if mode >= self.num_modes {
            return false;
        }
        self.modes[mode as usize].take_has_data_msg()
    }

    /// The latest host data write to `mode`, if that mode accepts writes.
    pub fn data_msg(&self, mode: u8) -> Option<&[u8]> {
        if mode >= self.num_modes {
            return None;
        }
        self.modes[mode as usize].data_msg()
    }

    /// Zeroes the data message buffer of `mode`.
    pub fn clear_data_msg(&mut self, mode: u8) {
        if let Some(m) = self.modes.get_mut(mode as usize) {
            m.clear_data_msg();
        }
    }

    /// Sends a data message for the currently selected mode.
    pub fn send(&mut self, payload: &[u8]) {
        let mode = self.device_mode;
        self.send_data_msg(payload, mode);
    }

    /// Sends a data message for a specific mode.
    pub fn send_to_mode(&mut self, payload: &[u8], mode: u8) {
        self.send_data_msg(payload, mode);
    }

    /// Executes exactly one lifecycle state and at most one transition.
    fn step(&mut self) {
        match self.device_state {
            DeviceState::InitWdt => {
                if let Some(init) = self.wdt.init {
                    if let Some(deinit) = self.wdt.deinit {
                        deinit();
                    }
                    init();
                }
                self.set_state(DeviceState::Reset);
            }
            DeviceState::Reset => {
                self.feed_wdt();
                self.device_mode = 0;
                self.ext_mode = 0;
                self.nack_seen = false;
                self.clear_cmd_write_data();
                for mode in self.modes.iter_mut() {
                    mode.clear_data_msg();
                }
                self.rx_idx = 0;
                self.rx_len = 0;
                self.receiver_state = ReceiverState::ReadByte;
                self.set_state(DeviceState::InitAutoId);
            }
            DeviceState::InitAutoId => {
                if self.config.detect_host_type {
                    self.uart.begin(SPEED_LPF2);
                } else {
                    self.uart.end();
                }
                // TX held low tells the host this port speaks UART.
                self.tx_pin.set_output();
                self.tx_pin.set_low();
                self.prev_ms = self.current_ms;
                self.set_state(DeviceState::WaitingAutoId);
            }
            DeviceState::WaitingAutoId => {
                // An LPF2 host interrupts this wait via CMD_SPEED; the
                // receiver promotes the state directly.
                if self.since(self.prev_ms) > AUTO_ID_DELAY_MS {
                    self.is_lpf2_host = false;
                    self.set_state(DeviceState::InitUart);
                }
            }
            DeviceState::InitUart => {
                self.feed_wdt();
                self.tx_pin.set_high();
                let baud = if self.is_lpf2_host { SPEED_LPF2 } else { SPEED_MIN };
                self.uart.begin(baud);
                self.prev_ms = self.current_ms;
                self.set_state(DeviceState::WaitingUartInit);
            }
            DeviceState::WaitingUartInit => {
                if self.since(self.prev_ms) > UART_INIT_DELAY_MS {
                    if self.is_lpf2_host {
                        self.uart.write_byte(SYS_ACK);
                    }
                    self.set_state(DeviceState::SendingType);
                }
            }
            DeviceState::SendingType => {
                let device_type = self.config.device_type;
                self.write_cmd(CMD_TYPE, &[device_type]);
                self.set_state(DeviceState::SendingModes);
            }
            DeviceState::SendingModes => {
                let lpf2_max_mode = self.num_modes - 1;
                let ev3_max_mode = lpf2_max_mode.min(MAX_MODE);
                let max_view = self.config.view.saturating_sub(1);
                let payload = [
                    ev3_max_mode,
                    max_view.min(ev3_max_mode),
                    lpf2_max_mode,
                    max_view.min(lpf2_max_mode),
                ];
                self.write_cmd(CMD_MODES, &payload);
                self.set_state(DeviceState::SendingSpeed);
            }
            DeviceState::SendingSpeed => {
                let payload = self.config.speed.to_le_bytes();
                self.write_cmd(CMD_SPEED, &payload);
                self.set_state(DeviceState::SendingVersion);
            }
            DeviceState::SendingVersion => {
                let mut payload = [0u8; 8];
                payload[..4]
                    .copy_from_slice(&version_to_bcd(self.config.fw_version).to_le_bytes());
                payload[4..]
                    .copy_from_slice(&version_to_bcd(self.config.hw_version).to_le_bytes());
                self.write_cmd(CMD_VERSION, &payload);
                self.mode_idx = self.num_modes - 1;
                self.set_state(DeviceState::SendingName);
            }
            DeviceState::SendingName => {
                self.send_name();
                self.set_state(DeviceState::SendingValueSpans);
            }
            DeviceState::SendingValueSpans => {
                let (raw, pct, si) = {
                    let m = &self.modes[self.mode_idx as usize];
                    (m.raw_span(), m.pct_span(), m.si_span())
                };
                for (info_type, span) in [(INFO_RAW, raw), (INFO_PCT, pct), (INFO_SI, si)] {
                    if span.is_sendable() {
                        let mut data = [0u8; 8];
                        data[..4].copy_from_slice(&span.min().to_le_bytes());
                        data[4..].copy_from_slice(&span.max().to_le_bytes());
                        self.write_info(info_type, &data, 8);
                    }
                }
                self.set_state(DeviceState::SendingSymbol);
            }
            DeviceState::SendingSymbol => {
                let (sym, len) = {
                    let m = &self.modes[self.mode_idx as usize];
                    let mut sym = [0u8; UOM_MAX];
                    let bytes = m.symbol_bytes();
                    sym[..bytes.len()].copy_from_slice(bytes);
                    (sym, bytes.len())
                };
                if len > 0 {
                    if let Some(size) = ceil_pow2(len as u8) {
                        self.write_info(INFO_UNITS, &sym[..len], size);
                    }
                }
                self.set_state(DeviceState::SendingMapping);
            }
            DeviceState::SendingMapping => {
                let (map_in, map_out) = {
                    let m = &self.modes[self.mode_idx as usize];
                    (m.map_in(), m.map_out())
                };
                self.write_info(INFO_MAPPING, &[map_in, map_out], 2);
                self.set_state(DeviceState::SendingFormat);
            }
            DeviceState::SendingFormat => {
                let data = {
                    let m = &self.modes[self.mode_idx as usize];
                    [m.num_data(), m.data_type().wire_id(), m.figures(), m.decimals()]
                };
                self.write_info(INFO_FORMAT, &data, 4);
                self.feed_wdt();
                if self.mode_idx == 0 {
                    self.set_state(DeviceState::SendingAck);
                } else {
                    self.prev_ms = self.current_ms;
                    self.set_state(DeviceState::InterModePause);
                }
            }
            DeviceState::InterModePause => {
                if self.since(self.prev_ms) > INTER_MODE_PAUSE_MS {
                    self.mode_idx -= 1;
                    self.set_state(DeviceState::SendingName);
                }
            }
            DeviceState::SendingAck => {
                self.uart.flush();
                self.uart.write_byte(SYS_ACK);
                self.prev_ms = self.current_ms;
                self.set_state(DeviceState::WaitingAckReply);
            }
            DeviceState::WaitingAckReply => {
                // The receiver promotes to SwitchingUartSpeed on ACK.
                if self.since(self.prev_ms) > ACK_TIMEOUT_MS {
                    self.set_state(DeviceState::Reset);
                }
            }
            DeviceState::SwitchingUartSpeed => {
                self.uart.begin(self.config.speed);
                self.set_state(DeviceState::InitMode);
            }
            DeviceState::InitMode => {
                self.nack_ms = self.current_ms;
                self.set_state(DeviceState::Communicating);
            }
            DeviceState::Communicating => {
                if self.since(self.nack_ms) > NACK_TIMEOUT_MS {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("host heartbeat lost, soft reset");
                    self.set_state(DeviceState::Reset);
                }
            }
            DeviceState::SendingNack => {
                self.uart.write_byte(SYS_NACK);
                // Detour over; resume where the receiver interrupted.
                self.set_state(self.prev_device_state);
            }
        }
    }

    /// Name frame of the mode currently being broadcast.
    ///
    /// Three layouts share the INFO_NAME frame: a plain name sized to the
    /// next power of two, a short name with the power-request flags, or a
    /// caller-supplied name-plus-flags blob.
    fn send_name(&mut self) {
        let (name, name_len, has_trailer, power) = {
            let m = &self.modes[self.mode_idx as usize];
            (*m.name_bytes(), m.name_len(), m.has_flag_trailer(), m.needs_power())
        };

        let mut data = [0u8; MODE_NAME_BUF];
        let (data_len, size) = if has_trailer {
            data.copy_from_slice(&name);
            (MODE_NAME_BUF, 16)
        } else if power {
            let len = name_len.min(SHORT_NAME_MAX);
            data[..len].copy_from_slice(&name[..len]);
            data[SHORT_NAME_MAX + 1] = FLAGS0_NEEDS_SUPPLY_PIN2;
            data[SHORT_NAME_MAX + 6] = NAME_FLAGS_SPIKE3_MAGIC;
            (SHORT_NAME_MAX + 7, 16)
        } else {
            let size = ceil_pow2(name_len as u8).unwrap_or(16);
            data[..name_len].copy_from_slice(&name[..name_len]);
            (name_len, size)
        };

        self.write_info(INFO_NAME, &data[..data_len], size);
    }

    /// Emits one INFO frame for the mode currently being broadcast:
    /// header, info-type byte, `data` zero-padded to `size`, checksum.
    fn write_info(&mut self, info_type: u8, data: &[u8], size: u8) {
        let mode = self.mode_idx;
        let size = size as usize;

        self.tx_buf[0] = encode_header(MSG_TYPE_INFO, size as u8, mode & MSG_CMD_MASK);
        self.tx_buf[1] = info_type | info_mode_flag(mode);
        self.tx_buf[2..2 + data.len()].copy_from_slice(data);
        self.tx_buf[2 + data.len()..2 + size].fill(0);
        self.tx_buf[2 + size] = checksum(&self.tx_buf[..2 + size]);
        self.uart.write(&self.tx_buf[..size + 3]);
    }

    /// Emits one CMD frame with the payload bucketed to a power of two.
    fn write_cmd(&mut self, cmd: u8, payload: &[u8]) {
        if let Some(len) = encode_msg(MSG_TYPE_CMD, cmd, payload, &mut self.tx_buf) {
            self.uart.write(&self.tx_buf[..len]);
        }
    }

    /// Outbound DATA path.
    ///
    /// Devices with more than eight modes prefix every data message with
    /// CMD_EXT_MODE, even for low modes, matching host expectations.
    fn send_data_msg(&mut self, payload: &[u8], mode: u8) {
        if payload.is_empty() || payload.len() > MAX_MSG_SIZE {
            return;
        }
        let Some(size) = ceil_pow2(payload.len() as u8) else {
            return;
        };

        if self.num_modes > 8 {
            let offset = if mode > MAX_MODE { EXT_MODE_8 } else { EXT_MODE_0 };
            self.write_cmd(CMD_EXT_MODE, &[offset]);
        }

        let len = encode_frame(
            MSG_TYPE_DATA,
            mode & MSG_CMD_MASK,
            payload,
            size,
            &mut self.tx_buf,
        );
        self.uart.write(&self.tx_buf[..len]);
    }

    pub(crate) fn set_state(&mut self, next: DeviceState) {
        #[cfg(feature = "defmt")]
        defmt::trace!("device state {:?} -> {:?}", self.device_state, next);
        self.device_state = next;
    }

    pub(crate) fn feed_wdt(&self) {
        if let Some(feed) = self.wdt.feed {
            feed();
        }
    }

    /// Milliseconds since a stored instant, wrap-safe.
    fn since(&self, instant_ms: u32) -> u32 {
        self.current_ms.wrapping_sub(instant_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = DeviceConfig::default();
        assert_eq!(config.speed, SPEED_LPF2);
        assert_eq!(config.view, VIEW_ALL);
        assert_eq!(config.fw_version, 10_000_000);
        assert_eq!(config.hw_version, 10_000_000);
        assert!(config.detect_host_type);
    }

    #[test]
    fn test_config_new_keeps_defaults_for_the_rest() {
        let config = DeviceConfig::new(0x41, 57_600);
        assert_eq!(config.device_type, 0x41);
        assert_eq!(config.speed, 57_600);
        assert_eq!(config.view, VIEW_ALL);
    }
}
