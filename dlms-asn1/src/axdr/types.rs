//! A-XDR length/element-count encoding

use dlms_core::{DlmsError, DlmsResult};

/// Variable-length count as used for strings, arrays and structures
///
/// Counts below 0x80 take one byte. Larger counts are written as
/// `0x80 | n` followed by `n` big-endian bytes, with `n` being 1, 2 or 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthEncoding {
    /// Short form: count < 128, encoded in 1 byte
    Short(u8),
    /// Long form: count >= 128
    Long(usize),
}

impl LengthEncoding {
    pub fn new(count: usize) -> Self {
        if count < 0x80 {
            LengthEncoding::Short(count as u8)
        } else {
            LengthEncoding::Long(count)
        }
    }

    pub fn value(&self) -> usize {
        match self {
            LengthEncoding::Short(len) => *len as usize,
            LengthEncoding::Long(len) => *len,
        }
    }

    /// Encode count to bytes
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            LengthEncoding::Short(len) => vec![len],
            LengthEncoding::Long(len) if len <= 0xFF => vec![0x81, len as u8],
            LengthEncoding::Long(len) if len <= 0xFFFF => {
                let mut out = vec![0x82];
                out.extend_from_slice(&(len as u16).to_be_bytes());
                out
            }
            LengthEncoding::Long(len) => {
                let mut out = vec![0x84];
                out.extend_from_slice(&(len as u32).to_be_bytes());
                out
            }
        }
    }

    /// Decode a count, returning it with the number of bytes consumed
    pub fn decode(bytes: &[u8]) -> DlmsResult<(Self, usize)> {
        let first_byte = *bytes
            .first()
            .ok_or_else(|| DlmsError::ProtocolDecode("Not enough bytes for length".to_string()))?;
        if first_byte & 0x80 == 0 {
            return Ok((LengthEncoding::Short(first_byte), 1));
        }

        let length_of_length = (first_byte & 0x7F) as usize;
        if length_of_length == 0 || length_of_length > 4 {
            return Err(DlmsError::ProtocolDecode(format!(
                "Invalid length-of-length: {}",
                length_of_length
            )));
        }
        if bytes.len() < 1 + length_of_length {
            return Err(DlmsError::ProtocolDecode(
                "Not enough bytes for long length".to_string(),
            ));
        }

        let len = bytes[1..1 + length_of_length]
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | b as usize);
        Ok((LengthEncoding::Long(len), 1 + length_of_length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_encoding_short() {
        assert_eq!(LengthEncoding::new(10).encode(), vec![10]);
    }

    #[test]
    fn test_length_encoding_long() {
        assert_eq!(LengthEncoding::new(200).encode(), vec![0x81, 200]);
        let bytes = LengthEncoding::new(256).encode();
        assert_eq!(bytes, vec![0x82, 0x01, 0x00]);
        let (decoded, consumed) = LengthEncoding::decode(&bytes).unwrap();
        assert_eq!(decoded.value(), 256);
        assert_eq!(consumed, 3);
    }

    #[test]
    fn test_length_truncated() {
        assert!(LengthEncoding::decode(&[]).is_err());
        assert!(LengthEncoding::decode(&[0x82, 0x01]).is_err());
    }
}
