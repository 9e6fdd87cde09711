//! HDLC frame sequence numbers
//!
//! HDLC uses 3-bit sequence numbers (0-7), so both counters wrap at 8.

use crate::hdlc::frame::FrameType;
use dlms_core::DlmsResult;
use log::trace;

const MODULO: u8 = 8;
const POLL_FINAL: u8 = 0x10;

/// Send and receive sequence state of an HDLC link
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSequence {
    /// N(S) of the next I-frame to send
    send: u8,
    /// N(R): next sequence number expected from the peer
    receive: u8,
}

impl FrameSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart numbering, used after SNRM/UA and on disconnect
    pub fn reset(&mut self) {
        self.send = 0;
        self.receive = 0;
    }

    pub fn send_sequence(&self) -> u8 {
        self.send
    }

    pub fn receive_sequence(&self) -> u8 {
        self.receive
    }

    /// Control byte of the next I-frame, advancing N(S)
    pub fn next_information_control(&mut self) -> u8 {
        let control = (self.receive << 5) | POLL_FINAL | (self.send << 1);
        self.send = (self.send + 1) % MODULO;
        trace!("I-frame control 0x{:02X}", control);
        control
    }

    /// Control byte of a receiver-ready frame
    pub fn receiver_ready_control(&self) -> u8 {
        (self.receive << 5) | POLL_FINAL | 0x01
    }

    /// Track a frame received from the peer
    ///
    /// Only I-frames move N(R).
    pub fn on_frame_received(&mut self, control: u8) -> DlmsResult<()> {
        if FrameType::from_control_byte(control)? == FrameType::Information {
            let peer_send = (control >> 1) & 0x07;
            self.receive = (peer_send + 1) % MODULO;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_information_control() {
        let mut sequence = FrameSequence::new();
        assert_eq!(sequence.next_information_control(), 0x10);
        assert_eq!(sequence.next_information_control(), 0x12);
    }

    #[test]
    fn test_receive_moves_nr() {
        let mut sequence = FrameSequence::new();
        sequence.next_information_control();
        sequence.on_frame_received(0x30).unwrap();
        assert_eq!(sequence.receive_sequence(), 1);
        assert_eq!(sequence.next_information_control(), 0x32);
        assert_eq!(sequence.receiver_ready_control(), 0x31);
    }

    #[test]
    fn test_wraps_at_eight() {
        let mut sequence = FrameSequence::new();
        for _ in 0..8 {
            sequence.next_information_control();
        }
        assert_eq!(sequence.send_sequence(), 0);
        sequence.on_frame_received(0x1E).unwrap();
        assert_eq!(sequence.receive_sequence(), 0);
    }

    #[test]
    fn test_reset() {
        let mut sequence = FrameSequence::new();
        sequence.next_information_control();
        sequence.on_frame_received(0x10).unwrap();
        sequence.reset();
        assert_eq!(sequence, FrameSequence::new());
    }

    #[test]
    fn test_unnumbered_frame_keeps_nr() {
        let mut sequence = FrameSequence::new();
        sequence.on_frame_received(0x73).unwrap();
        assert_eq!(sequence.receive_sequence(), 0);
    }
}
