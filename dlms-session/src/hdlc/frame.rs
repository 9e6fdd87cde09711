//! HDLC frame structure and encoding/decoding

use crate::hdlc::address::{decode_address, encode_address};
use crate::hdlc::fcs::{check_fcs16, fcs16};
use dlms_core::{DlmsError, DlmsResult};

/// HDLC frame flag
pub const FLAG: u8 = 0x7E;

/// Logical Link Control (LLC) header of a request
pub const LLC_REQUEST: [u8; 3] = [0xE6, 0xE6, 0x00];

/// Logical Link Control (LLC) header of a response
pub const LLC_RESPONSE: [u8; 3] = [0xE6, 0xE7, 0x00];

/// Frame format type 3 marker
const FORMAT_TYPE: u8 = 0xA0;
/// Segmentation bit of the frame format field
const SEGMENTATION: u8 = 0x08;
/// Poll/final bit of the control field
const POLL_FINAL: u8 = 0x10;

/// HDLC control field values with the poll/final bit set
pub mod control {
    pub const SNRM: u8 = 0x93;
    pub const DISC: u8 = 0x53;
    pub const UA: u8 = 0x73;
    pub const DM: u8 = 0x1F;
    pub const FRMR: u8 = 0x97;
    pub const UI: u8 = 0x13;
}

/// HDLC frame type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Information,
    ReceiveReady,
    ReceiveNotReady,
    SetNormalResponseMode,
    Disconnect,
    UnnumberedAcknowledge,
    DisconnectMode,
    FrameReject,
    UnnumberedInformation,
}

impl FrameType {
    /// Get frame type from control byte
    pub fn from_control_byte(control_byte: u8) -> DlmsResult<Self> {
        let frame_type = match control_byte {
            x if (x & 0x01) == 0x00 => FrameType::Information,
            x if (x & 0x0F) == 0x01 => FrameType::ReceiveReady,
            x if (x & 0x0F) == 0x05 => FrameType::ReceiveNotReady,
            x if (x & !POLL_FINAL) == control::SNRM & !POLL_FINAL => {
                FrameType::SetNormalResponseMode
            }
            x if (x & !POLL_FINAL) == control::DISC & !POLL_FINAL => FrameType::Disconnect,
            x if (x & !POLL_FINAL) == control::UA & !POLL_FINAL => {
                FrameType::UnnumberedAcknowledge
            }
            x if (x & !POLL_FINAL) == control::DM & !POLL_FINAL => FrameType::DisconnectMode,
            x if (x & !POLL_FINAL) == control::FRMR & !POLL_FINAL => FrameType::FrameReject,
            x if (x & !POLL_FINAL) == control::UI & !POLL_FINAL => {
                FrameType::UnnumberedInformation
            }
            _ => {
                return Err(DlmsError::FrameInvalid(format!(
                    "Control field unknown: 0x{:02X}",
                    control_byte
                )))
            }
        };
        Ok(frame_type)
    }
}

/// HDLC frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdlcFrame {
    /// Destination address as a combined value
    pub destination: u32,
    /// Source address as a combined value
    pub source: u32,
    pub control: u8,
    pub segmented: bool,
    pub information: Vec<u8>,
}

impl HdlcFrame {
    pub fn new(destination: u32, source: u32, control: u8, information: Vec<u8>) -> Self {
        Self {
            destination,
            source,
            control,
            segmented: false,
            information,
        }
    }

    pub fn with_segmented(mut self, segmented: bool) -> Self {
        self.segmented = segmented;
        self
    }

    pub fn frame_type(&self) -> DlmsResult<FrameType> {
        FrameType::from_control_byte(self.control)
    }

    /// Encode frame to bytes, flags included
    ///
    /// Layout: `7E | format+length (2) | dest | src | control | [HCS | info] | FCS | 7E`
    pub fn encode(&self) -> DlmsResult<Vec<u8>> {
        let destination = encode_address(self.destination)?;
        let source = encode_address(self.source)?;

        let header_len = 2 + destination.len() + source.len() + 1;
        let length = if self.information.is_empty() {
            header_len + 2
        } else {
            header_len + 2 + self.information.len() + 2
        };
        if length > 0x07FF {
            return Err(DlmsError::FrameInvalid(format!(
                "HDLC frame too long: {} bytes",
                length
            )));
        }

        let mut format = FORMAT_TYPE | ((length >> 8) as u8 & 0x07);
        if self.segmented {
            format |= SEGMENTATION;
        }

        let mut result = Vec::with_capacity(length + 2);
        result.push(FLAG);
        result.push(format);
        result.push((length & 0xFF) as u8);
        result.extend_from_slice(&destination);
        result.extend_from_slice(&source);
        result.push(self.control);
        if !self.information.is_empty() {
            let hcs = fcs16(&result[1..]);
            result.extend_from_slice(&hcs);
            result.extend_from_slice(&self.information);
        }
        let fcs = fcs16(&result[1..]);
        result.extend_from_slice(&fcs);
        result.push(FLAG);
        Ok(result)
    }

    /// Decode one frame from the front of `data`
    ///
    /// Returns the frame and the number of bytes consumed, flags included.
    pub fn decode(data: &[u8]) -> DlmsResult<(Self, usize)> {
        let start = data
            .iter()
            .position(|b| *b == FLAG)
            .ok_or_else(|| DlmsError::FrameInvalid("No HDLC flag found".to_string()))?;
        let frame = &data[start..];
        if frame.len() < 3 {
            return Err(DlmsError::FrameInvalid("Frame too short".to_string()));
        }

        let format = frame[1];
        if format & 0xF0 != FORMAT_TYPE {
            return Err(DlmsError::FrameInvalid(format!(
                "Illegal frame format 0x{:02X}",
                format
            )));
        }
        let segmented = format & SEGMENTATION != 0;
        let length = (((format & 0x07) as usize) << 8) | frame[2] as usize;
        if frame.len() < length + 2 {
            return Err(DlmsError::FrameInvalid(format!(
                "Frame truncated: need {} bytes, have {}",
                length + 2,
                frame.len()
            )));
        }
        if frame[length + 1] != FLAG {
            return Err(DlmsError::FrameInvalid("Missing closing flag".to_string()));
        }
        let body = &frame[1..length + 1];

        let mut pos = 2;
        let (destination, dest_len) = decode_address(&body[pos..])?;
        pos += dest_len;
        let (source, src_len) = decode_address(&body[pos..])?;
        pos += src_len;
        let control = *body
            .get(pos)
            .ok_or_else(|| DlmsError::FrameInvalid("Frame too short for control field".to_string()))?;
        pos += 1;

        check_fcs16(body)?;
        let information = if body.len() > pos + 2 {
            check_fcs16(&body[..pos + 2])?;
            body[pos + 2..body.len() - 2].to_vec()
        } else if body.len() == pos + 2 {
            Vec::new()
        } else {
            return Err(DlmsError::FrameInvalid("Frame too short for FCS".to_string()));
        };

        let frame = Self {
            destination,
            source,
            control,
            segmented,
            information,
        };
        Ok((frame, start + length + 2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_snrm() {
        let frame = HdlcFrame::new(1, 16, control::SNRM, Vec::new());
        assert_eq!(
            frame.encode().unwrap(),
            hex::decode("7EA0070321930F017E").unwrap()
        );
    }

    #[test]
    fn test_information_frame_roundtrip() {
        let info = [LLC_REQUEST.as_slice(), &[0xC0, 0x01, 0xC1]].concat();
        let frame = HdlcFrame::new(1, 16, 0x10, info.clone());
        let bytes = frame.encode().unwrap();
        assert_eq!(bytes[1], 0xA0);
        assert_eq!(bytes[2] as usize, bytes.len() - 2);

        let (decoded, consumed) = HdlcFrame::decode(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded.information, info);
        assert_eq!(decoded.control, 0x10);
        assert_eq!(decoded.frame_type().unwrap(), FrameType::Information);
    }

    #[test]
    fn test_decode_rejects_bad_fcs() {
        let mut bytes = HdlcFrame::new(1, 16, 0x10, vec![1, 2, 3]).encode().unwrap();
        let index = bytes.len() - 4;
        bytes[index] ^= 0x55;
        assert!(HdlcFrame::decode(&bytes).is_err());
    }

    #[test]
    fn test_segmented_flag() {
        let bytes = HdlcFrame::new(1, 16, 0x10, vec![0; 4])
            .with_segmented(true)
            .encode()
            .unwrap();
        assert_eq!(bytes[1] & 0x08, 0x08);
        let (decoded, _) = HdlcFrame::decode(&bytes).unwrap();
        assert!(decoded.segmented);
    }

    #[test]
    fn test_frame_types() {
        assert_eq!(FrameType::from_control_byte(0x73).unwrap(), FrameType::UnnumberedAcknowledge);
        assert_eq!(FrameType::from_control_byte(0x1F).unwrap(), FrameType::DisconnectMode);
        assert_eq!(FrameType::from_control_byte(0x31).unwrap(), FrameType::ReceiveReady);
    }
}
