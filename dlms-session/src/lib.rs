//! Session layer module for DLMS/COSEM protocol
//!
//! This crate provides the framing used below the application layer:
//! HDLC (IEC 62056-46) and the TCP/UDP wrapper (IEC 62056-47).
//! Only byte-level encoding is done here, the caller owns the transport.

pub mod hdlc;
pub mod wrapper;

pub use dlms_core::{DlmsError, DlmsResult};
pub use hdlc::*;
pub use wrapper::{unwrap, wrap, WrapperHeader, WRAPPER_HEADER_LENGTH};

use serde::{Deserialize, Serialize};

/// Framing of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterfaceType {
    #[default]
    Hdlc,
    Wrapper,
}

/// Check whether a reply byte answers a request byte
///
/// For HDLC both are control bytes: unnumbered replies (UA, DM) answer
/// SNRM and DISC, and I-frames or RR answer I-frames. For the wrapper both
/// are the first APDU byte and any reply is accepted.
pub fn is_reply_to(interface: InterfaceType, request: u8, reply: u8) -> bool {
    match interface {
        InterfaceType::Wrapper => true,
        InterfaceType::Hdlc => {
            let request_type = FrameType::from_control_byte(request);
            let reply_type = FrameType::from_control_byte(reply);
            match (request_type, reply_type) {
                (
                    Ok(FrameType::SetNormalResponseMode | FrameType::Disconnect),
                    Ok(FrameType::UnnumberedAcknowledge | FrameType::DisconnectMode),
                ) => true,
                (
                    Ok(FrameType::Information | FrameType::ReceiveReady),
                    Ok(FrameType::Information | FrameType::ReceiveReady),
                ) => true,
                (_, Ok(FrameType::FrameReject)) => true,
                _ => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_reply_to() {
        assert!(is_reply_to(InterfaceType::Hdlc, control::SNRM, control::UA));
        assert!(is_reply_to(InterfaceType::Hdlc, control::DISC, control::DM));
        assert!(is_reply_to(InterfaceType::Hdlc, 0x10, 0x30));
        assert!(!is_reply_to(InterfaceType::Hdlc, control::SNRM, 0x30));
        assert!(is_reply_to(InterfaceType::Wrapper, 0xC0, 0xC4));
    }
}
