//! Frame receiver and message dispatch
//!
//! Byte-at-a-time reassembly of inbound frames. Each tick consumes at
//! most one byte; classification, checksum verification and dispatch of
//! a completed frame chain within the tick that read its last byte.
//!
//! The dispatcher may promote the lifecycle machine directly: CMD_SPEED
//! during auto-id identifies an LPF2 host, an ACK answers the handshake,
//! and a checksum mismatch detours the lifecycle machine through
//! `SendingNack`.

use lump_hal::{Clock, TxPin, Uart};
use lump_protocol::{checksum, payload_size, HostMessage, MAX_MSG_SIZE, SYS_ACK, SYS_NACK, SYS_SYNC};

use crate::device::LumpDevice;
use crate::state::{DeviceState, ReceiverState};

impl<'a, U, P, C> LumpDevice<'a, U, P, C>
where
    U: Uart,
    P: TxPin,
    C: Clock,
{
    /// Offers the receiver at most one inbound byte.
    pub(crate) fn poll_receiver(&mut self) {
        if self.receiver_state == ReceiverState::ReadByte {
            let Some(byte) = self.uart.read() else {
                return;
            };
            self.rx_buf[self.rx_idx as usize] = byte;
            if self.rx_idx == 0 {
                self.receiver_state = ReceiverState::ParseMsgType;
            } else if self.rx_idx + 1 == self.rx_len {
                self.receiver_state = ReceiverState::VerifyChecksum;
            }
            self.rx_idx += 1;
        }

        if self.receiver_state == ReceiverState::ParseMsgType {
            let header = self.rx_buf[0];
            match header {
                SYS_SYNC | SYS_NACK | SYS_ACK => {
                    self.rx_idx = 0;
                    self.rx_len = 1;
                    self.receiver_state = ReceiverState::ProcessMsg;
                }
                _ => {
                    let size = payload_size(header);
                    if size as usize <= MAX_MSG_SIZE {
                        // header + payload + checksum
                        self.rx_len = size + 2;
                    } else {
                        // Unrepresentable size: drop the byte, resync on
                        // the next one. No NACK for this.
                        self.rx_idx = 0;
                    }
                    self.receiver_state = ReceiverState::ReadByte;
                }
            }
        }

        if self.receiver_state == ReceiverState::VerifyChecksum {
            let len = self.rx_len as usize;
            if checksum(&self.rx_buf[..len - 1]) == self.rx_buf[len - 1] {
                self.receiver_state = ReceiverState::ProcessMsg;
            } else {
                #[cfg(feature = "defmt")]
                defmt::warn!("rx checksum mismatch, answering with NACK");
                self.prev_device_state = self.device_state;
                self.device_state = DeviceState::SendingNack;
                self.rx_idx = 0;
                self.receiver_state = ReceiverState::ReadByte;
            }
        }

        if self.receiver_state == ReceiverState::ProcessMsg {
            self.process_msg();
            self.rx_idx = 0;
            self.receiver_state = ReceiverState::ReadByte;
        }
    }

    /// Dispatches one verified frame.
    ///
    /// Every reaction is gated on the lifecycle state; anything that does
    /// not fit the current phase is dropped without comment, as are
    /// message types the device side never consumes.
    fn process_msg(&mut self) {
        let frame = self.rx_buf;
        let Some(msg) = HostMessage::parse(&frame[..self.rx_len as usize]) else {
            return;
        };

        match msg {
            HostMessage::Sync => {}
            HostMessage::Nack => {
                if self.device_state == DeviceState::Communicating {
                    self.nack_seen = true;
                    self.nack_ms = self.current_ms;
                    self.feed_wdt();
                }
            }
            HostMessage::Ack => {
                if self.device_state == DeviceState::WaitingAckReply {
                    self.set_state(DeviceState::SwitchingUartSpeed);
                }
            }
            HostMessage::Speed => {
                if self.device_state == DeviceState::WaitingAutoId {
                    self.is_lpf2_host = true;
                    self.set_state(DeviceState::InitUart);
                }
            }
            HostMessage::Select { mode } => {
                if self.device_state == DeviceState::Communicating {
                    self.device_mode = mode;
                    self.set_state(DeviceState::InitMode);
                }
            }
            HostMessage::Write { data } => {
                if self.device_state == DeviceState::Communicating && data.len() <= MAX_MSG_SIZE {
                    self.cmd_write_data[..data.len()].copy_from_slice(data);
                    self.cmd_write_size = data.len() as u8;
                    self.cmd_write_pending = true;
                }
            }
            HostMessage::ExtMode { offset } => {
                if self.device_state == DeviceState::Communicating {
                    self.ext_mode = offset;
                }
            }
            HostMessage::Data { mode, payload } => {
                if self.device_state == DeviceState::Communicating {
                    let mode = mode as usize + self.ext_mode as usize;
                    if mode < self.num_modes as usize {
                        self.modes[mode].store_data_msg(payload);
                    }
                }
            }
        }
    }
}
