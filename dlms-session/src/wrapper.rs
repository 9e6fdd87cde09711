//! Wrapper session layer for DLMS/COSEM

use dlms_core::{DlmsError, DlmsResult};

/// Wrapper header length
pub const WRAPPER_HEADER_LENGTH: usize = 8;

const WRAPPER_VERSION: u16 = 1;

/// Wrapper header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapperHeader {
    source: u16,
    destination: u16,
    length: u16,
}

impl WrapperHeader {
    /// Create a new wrapper header
    pub fn new(source: u16, destination: u16, length: u16) -> Self {
        Self {
            source,
            destination,
            length,
        }
    }

    /// Encode header to bytes (big-endian)
    pub fn encode(&self) -> [u8; WRAPPER_HEADER_LENGTH] {
        let mut result = [0u8; WRAPPER_HEADER_LENGTH];
        result[0..2].copy_from_slice(&WRAPPER_VERSION.to_be_bytes());
        result[2..4].copy_from_slice(&self.source.to_be_bytes());
        result[4..6].copy_from_slice(&self.destination.to_be_bytes());
        result[6..8].copy_from_slice(&self.length.to_be_bytes());
        result
    }

    /// Decode header from bytes
    pub fn decode(data: &[u8]) -> DlmsResult<Self> {
        if data.len() < WRAPPER_HEADER_LENGTH {
            return Err(DlmsError::FrameInvalid(format!(
                "Wrapper header too short: expected {}, got {}",
                WRAPPER_HEADER_LENGTH,
                data.len()
            )));
        }

        let version = u16::from_be_bytes([data[0], data[1]]);
        if version != WRAPPER_VERSION {
            return Err(DlmsError::FrameInvalid(format!(
                "Header version was {}, this stack is only compatible to version 1",
                version
            )));
        }

        Ok(Self {
            source: u16::from_be_bytes([data[2], data[3]]),
            destination: u16::from_be_bytes([data[4], data[5]]),
            length: u16::from_be_bytes([data[6], data[7]]),
        })
    }

    /// Source wrapper port
    pub fn source(&self) -> u16 {
        self.source
    }

    /// Destination wrapper port
    pub fn destination(&self) -> u16 {
        self.destination
    }

    /// Get payload length
    pub fn payload_length(&self) -> u16 {
        self.length
    }
}

/// Prefix an APDU with a wrapper header
pub fn wrap(source: u16, destination: u16, apdu: &[u8]) -> DlmsResult<Vec<u8>> {
    let length = u16::try_from(apdu.len()).map_err(|_| {
        DlmsError::Argument(format!("APDU of {} bytes does not fit a wrapper frame", apdu.len()))
    })?;
    let header = WrapperHeader::new(source, destination, length);
    let mut result = Vec::with_capacity(WRAPPER_HEADER_LENGTH + apdu.len());
    result.extend_from_slice(&header.encode());
    result.extend_from_slice(apdu);
    Ok(result)
}

/// Split a wrapper frame into its header and payload
pub fn unwrap(data: &[u8]) -> DlmsResult<(WrapperHeader, &[u8])> {
    let header = WrapperHeader::decode(data)?;
    let end = WRAPPER_HEADER_LENGTH + header.payload_length() as usize;
    let payload = data.get(WRAPPER_HEADER_LENGTH..end).ok_or_else(|| {
        DlmsError::FrameInvalid(format!(
            "Wrapper payload truncated: expected {} bytes, got {}",
            header.payload_length(),
            data.len() - WRAPPER_HEADER_LENGTH
        ))
    })?;
    Ok((header, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_release_request() {
        let bytes = wrap(0x10, 0x01, &[0x62, 0x00]).unwrap();
        assert_eq!(
            bytes,
            vec![0x00, 0x01, 0x00, 0x10, 0x00, 0x01, 0x00, 0x02, 0x62, 0x00]
        );
    }

    #[test]
    fn test_unwrap() {
        let bytes = [0x00, 0x01, 0x00, 0x01, 0x00, 0x10, 0x00, 0x01, 0x61];
        let (header, payload) = unwrap(&bytes).unwrap();
        assert_eq!(header.source(), 1);
        assert_eq!(header.destination(), 0x10);
        assert_eq!(payload, &[0x61]);
    }

    #[test]
    fn test_unwrap_errors() {
        assert!(unwrap(&[0x00, 0x02, 0, 1, 0, 16, 0, 0]).is_err());
        assert!(unwrap(&[0x00, 0x01, 0, 1, 0, 16, 0, 5, 0x61]).is_err());
        assert!(unwrap(&[0x00, 0x01]).is_err());
    }
}
