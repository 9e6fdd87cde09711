//! BER decoder for ASN.1 structures

use crate::ber::types::{BerLength, BerTag};
use dlms_core::{DlmsError, DlmsResult};

/// BER decoder reading TLV triplets from a borrowed buffer
pub struct BerDecoder<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> BerDecoder<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Get current position in buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Check if there is more data to decode
    pub fn has_remaining(&self) -> bool {
        self.position < self.buffer.len()
    }

    /// Tag of the next TLV without consuming it
    pub fn peek_tag(&self) -> DlmsResult<BerTag> {
        let byte = *self.buffer.get(self.position).ok_or_else(|| {
            DlmsError::ProtocolDecode("Buffer exhausted while reading tag".to_string())
        })?;
        BerTag::from_byte(byte)
    }

    /// Read the next TLV, returning its tag and value bytes
    pub fn decode_tlv(&mut self) -> DlmsResult<(BerTag, &'a [u8])> {
        let tag = self.peek_tag()?;
        let (length, consumed) = BerLength::decode(&self.buffer[self.position + 1..])?;
        let start = self.position + 1 + consumed;
        let end = start + length.value();
        if end > self.buffer.len() {
            return Err(DlmsError::ProtocolDecode(format!(
                "BER value of tag 0x{:02X} exceeds buffer: need {}, have {}",
                tag.to_byte(),
                length.value(),
                self.buffer.len() - start
            )));
        }
        self.position = end;
        Ok((tag, &self.buffer[start..end]))
    }

    /// Read the next TLV and check its tag
    pub fn expect_tlv(&mut self, expected: BerTag) -> DlmsResult<&'a [u8]> {
        let (tag, value) = self.decode_tlv()?;
        if tag != expected {
            return Err(DlmsError::ProtocolDecode(format!(
                "Unexpected BER tag 0x{:02X}, expected 0x{:02X}",
                tag.to_byte(),
                expected.to_byte()
            )));
        }
        Ok(value)
    }
}

/// Decode the content octets of a non-negative INTEGER
pub fn decode_unsigned(value: &[u8]) -> DlmsResult<u64> {
    if value.is_empty() || value.len() > 8 {
        return Err(DlmsError::ProtocolDecode(format!(
            "Invalid INTEGER length {}",
            value.len()
        )));
    }
    Ok(value.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
}

/// Decode the content octets of an OBJECT IDENTIFIER into arcs
pub fn decode_object_identifier(value: &[u8]) -> DlmsResult<Vec<u32>> {
    let mut arcs = Vec::new();
    let mut current = 0u32;
    for (i, &byte) in value.iter().enumerate() {
        current = current
            .checked_mul(128)
            .and_then(|v| v.checked_add((byte & 0x7F) as u32))
            .ok_or_else(|| DlmsError::ProtocolDecode("OID arc overflow".to_string()))?;
        if byte & 0x80 == 0 {
            if arcs.is_empty() {
                let first = (current / 40).min(2);
                arcs.push(first);
                arcs.push(current - first * 40);
            } else {
                arcs.push(current);
            }
            current = 0;
        } else if i == value.len() - 1 {
            return Err(DlmsError::ProtocolDecode(
                "Incomplete OID arc".to_string(),
            ));
        }
    }
    Ok(arcs)
}
