//! BER encoder for ASN.1 structures

use crate::ber::types::{BerLength, BerTag};

/// BER encoder accumulating TLV triplets
///
/// Constructed values are built in a separate encoder and appended with
/// [`BerEncoder::encode_constructed`], so lengths are always known up front.
#[derive(Debug, Default)]
pub struct BerEncoder {
    buffer: Vec<u8>,
}

impl BerEncoder {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Encode a TLV (Tag-Length-Value) triplet
    pub fn encode_tlv(&mut self, tag: BerTag, value: &[u8]) {
        self.buffer.push(tag.to_byte());
        self.buffer.extend_from_slice(&BerLength::new(value.len()).encode());
        self.buffer.extend_from_slice(value);
    }

    /// Wrap the contents of another encoder in a constructed tag
    pub fn encode_constructed(&mut self, tag: BerTag, inner: BerEncoder) {
        self.encode_tlv(tag, &inner.buffer);
    }

    /// Encode an INTEGER with minimal two's complement content
    pub fn encode_integer(&mut self, tag: BerTag, value: i64) {
        let bytes = value.to_be_bytes();
        let mut start = 0;
        while start < bytes.len() - 1 {
            let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
                || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
            if !redundant {
                break;
            }
            start += 1;
        }
        self.encode_tlv(tag, &bytes[start..]);
    }

    /// Encode an OBJECT IDENTIFIER from its arcs
    ///
    /// The first two arcs are folded into one octet (`40 * a + b`), the rest
    /// use base-128 with continuation bits.
    pub fn encode_object_identifier(&mut self, tag: BerTag, arcs: &[u32]) {
        self.encode_tlv(tag, &object_identifier_bytes(arcs));
    }

    /// Encode a BIT STRING from its bytes and the number of used bits
    pub fn encode_bit_string(&mut self, tag: BerTag, bytes: &[u8], num_bits: usize) {
        let unused = (bytes.len() * 8).saturating_sub(num_bits) as u8;
        let mut value = Vec::with_capacity(bytes.len() + 1);
        value.push(unused);
        value.extend_from_slice(bytes);
        self.encode_tlv(tag, &value);
    }

    /// Append already encoded bytes
    pub fn encode_raw(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

/// Content octets of an OBJECT IDENTIFIER
pub fn object_identifier_bytes(arcs: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    if arcs.len() >= 2 {
        push_base128(&mut out, arcs[0] * 40 + arcs[1]);
        for arc in &arcs[2..] {
            push_base128(&mut out, *arc);
        }
    } else if let Some(first) = arcs.first() {
        push_base128(&mut out, first * 40);
    }
    out
}

fn push_base128(out: &mut Vec<u8>, mut value: u32) {
    let mut groups = vec![(value & 0x7F) as u8];
    value >>= 7;
    while value > 0 {
        groups.push(((value & 0x7F) as u8) | 0x80);
        value >>= 7;
    }
    out.extend(groups.iter().rev());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_application_context_oid() {
        let mut encoder = BerEncoder::new();
        encoder.encode_object_identifier(BerTag::universal(false, 6), &[2, 16, 756, 5, 8, 1, 1]);
        assert_eq!(
            encoder.as_bytes(),
            &[0x06, 0x07, 0x60, 0x85, 0x74, 0x05, 0x08, 0x01, 0x01]
        );
    }

    #[test]
    fn test_encode_integer_minimal() {
        let mut encoder = BerEncoder::new();
        encoder.encode_integer(BerTag::universal(false, 2), 0);
        encoder.encode_integer(BerTag::universal(false, 2), 128);
        encoder.encode_integer(BerTag::universal(false, 2), -1);
        assert_eq!(
            encoder.as_bytes(),
            &[0x02, 0x01, 0x00, 0x02, 0x02, 0x00, 0x80, 0x02, 0x01, 0xFF]
        );
    }

    #[test]
    fn test_encode_constructed() {
        let mut inner = BerEncoder::new();
        inner.encode_integer(BerTag::universal(false, 2), 0);
        let mut outer = BerEncoder::new();
        outer.encode_constructed(BerTag::context_specific(true, 2), inner);
        assert_eq!(outer.as_bytes(), &[0xA2, 0x03, 0x02, 0x01, 0x00]);
    }

    #[test]
    fn test_encode_acse_requirements() {
        let mut encoder = BerEncoder::new();
        encoder.encode_bit_string(BerTag::context_specific(false, 10), &[0x80], 1);
        assert_eq!(encoder.as_bytes(), &[0x8A, 0x02, 0x07, 0x80]);
    }
}
