//! State machine definitions
//!
//! Two cooperating machines share one tick: the device lifecycle machine
//! walks the handshake and communication phases, while the receiver
//! machine reassembles inbound frames byte by byte. The receiver may
//! promote the lifecycle machine directly (CMD_SPEED during auto-id, ACK
//! while waiting for the handshake reply).

/// Lifecycle states of a LUMP device.
///
/// Ordering is meaningful: every state from [`DeviceState::InitMode`]
/// onward belongs to the communication phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    // Initialization phase
    /// Arming the watchdog timer.
    InitWdt,
    /// Clearing session state before a (re-)handshake.
    Reset,

    // Handshake phase
    /// Grounding TX and opening the line for host detection.
    InitAutoId,
    /// Listening for an LPF2 host announcing itself.
    WaitingAutoId,
    /// Reopening the UART at the handshake baud rate.
    InitUart,
    /// Letting the line settle after reopening.
    WaitingUartInit,
    /// Sending the device type.
    SendingType,
    /// Sending mode and view counts.
    SendingModes,
    /// Sending the communication speed.
    SendingSpeed,
    /// Sending firmware and hardware versions.
    SendingVersion,
    /// Sending a mode's name (and flags).
    SendingName,
    /// Sending a mode's value spans.
    SendingValueSpans,
    /// Sending a mode's unit symbol.
    SendingSymbol,
    /// Sending a mode's mapping byte pair.
    SendingMapping,
    /// Sending a mode's data format.
    SendingFormat,
    /// Pacing between two modes' broadcasts.
    InterModePause,
    /// Closing the handshake with an ACK.
    SendingAck,
    /// Waiting for the host to acknowledge in turn.
    WaitingAckReply,
    /// Switching the line to the communication speed.
    SwitchingUartSpeed,

    // Communication phase
    /// (Re-)arming per-mode bookkeeping.
    InitMode,
    /// Steady state: exchanging data under the NACK heartbeat.
    Communicating,
    /// One-shot detour answering a mangled frame.
    SendingNack,
}

impl DeviceState {
    /// Whether the handshake has completed and the line runs at the
    /// communication speed.
    pub fn is_communicating(self) -> bool {
        self >= DeviceState::InitMode
    }
}

/// States of the frame receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiverState {
    /// Reads a byte.
    ReadByte,
    /// Classifies the first byte of a frame.
    ParseMsgType,
    /// Verifies the checksum of a completed frame.
    VerifyChecksum,
    /// Dispatches a verified frame.
    ProcessMsg,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_communication_phase_boundary() {
        assert!(!DeviceState::InitWdt.is_communicating());
        assert!(!DeviceState::WaitingAckReply.is_communicating());
        assert!(!DeviceState::SwitchingUartSpeed.is_communicating());
        assert!(DeviceState::InitMode.is_communicating());
        assert!(DeviceState::Communicating.is_communicating());
        assert!(DeviceState::SendingNack.is_communicating());
    }

    #[test]
    fn test_handshake_states_are_ordered() {
        assert!(DeviceState::InitAutoId < DeviceState::WaitingAutoId);
        assert!(DeviceState::SendingAck < DeviceState::WaitingAckReply);
        assert!(DeviceState::SwitchingUartSpeed < DeviceState::InitMode);
    }
}
