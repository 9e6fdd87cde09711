//! A-XDR decoder for DLMS/COSEM

use crate::axdr::types::LengthEncoding;
use dlms_core::datatypes::*;
use dlms_core::{DlmsError, DlmsResult};

/// Nesting limit for arrays and structures
const MAX_DEPTH: usize = 32;

/// A-XDR decoder for decoding DLMS/COSEM data types
///
/// The decoder walks a borrowed buffer and keeps its own cursor, so several
/// values can be read in sequence and the number of consumed bytes is always
/// available through [`AxdrDecoder::position`].
pub struct AxdrDecoder<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> AxdrDecoder<'a> {
    /// Create a new decoder
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Decode one tagged value
    pub fn decode_data_object(&mut self) -> DlmsResult<DataObject> {
        self.decode_nested(0)
    }

    fn decode_nested(&mut self, depth: usize) -> DlmsResult<DataObject> {
        if depth > MAX_DEPTH {
            return Err(DlmsError::ProtocolDecode(
                "Data nesting too deep".to_string(),
            ));
        }
        let data_type = DataType::from_tag(self.read_u8()?)?;
        match data_type {
            DataType::Array | DataType::Structure => self.decode_items(data_type, depth),
            _ => self.decode_value(data_type),
        }
    }

    /// Element count followed by tagged elements
    fn decode_items(&mut self, data_type: DataType, depth: usize) -> DlmsResult<DataObject> {
        let count = self.decode_length()?;
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(self.decode_nested(depth + 1)?);
        }
        Ok(if data_type == DataType::Array {
            DataObject::Array(items)
        } else {
            DataObject::Structure(items)
        })
    }

    /// Decode the value part of a value whose type is already known
    ///
    /// For arrays and structures the value part is the element count and
    /// the elements, each still carrying its own tag.
    ///
    /// # Errors
    ///
    /// Returns `DlmsError::ProtocolDecode` when the buffer ends early or the
    /// type cannot be decoded without a tag (compact arrays, `None`).
    pub fn decode_value(&mut self, data_type: DataType) -> DlmsResult<DataObject> {
        let value = match data_type {
            DataType::NullData => DataObject::Null,
            DataType::Boolean => DataObject::Boolean(self.read_u8()? != 0),
            DataType::Integer => DataObject::Integer8(self.read_u8()? as i8),
            DataType::Long => DataObject::Integer16(i16::from_be_bytes(self.read_array()?)),
            DataType::DoubleLong => DataObject::Integer32(i32::from_be_bytes(self.read_array()?)),
            DataType::Long64 => DataObject::Integer64(i64::from_be_bytes(self.read_array()?)),
            DataType::Unsigned => DataObject::Unsigned8(self.read_u8()?),
            DataType::LongUnsigned => DataObject::Unsigned16(self.read_u16()?),
            DataType::DoubleLongUnsigned => DataObject::Unsigned32(self.read_u32()?),
            DataType::Long64Unsigned => {
                DataObject::Unsigned64(u64::from_be_bytes(self.read_array()?))
            }
            DataType::Enum => DataObject::Enumerate(self.read_u8()?),
            DataType::Bcd => DataObject::Bcd(self.read_u8()?),
            DataType::Float32 => {
                DataObject::Float32(f32::from_bits(u32::from_be_bytes(self.read_array()?)))
            }
            DataType::Float64 => {
                DataObject::Float64(f64::from_bits(u64::from_be_bytes(self.read_array()?)))
            }
            DataType::OctetString => DataObject::OctetString(self.decode_octet_string()?),
            DataType::VisibleString => DataObject::VisibleString(self.decode_octet_string()?),
            DataType::Utf8String => DataObject::Utf8String(self.decode_octet_string()?),
            DataType::BitString => {
                let num_bits = self.decode_length()?;
                let bytes = self.read_bytes(num_bits.div_ceil(8))?.to_vec();
                DataObject::BitString(BitString::new(bytes, num_bits)?)
            }
            DataType::Date => DataObject::Date(CosemDate::decode(self.read_bytes(CosemDate::LENGTH)?)?),
            DataType::Time => DataObject::Time(CosemTime::decode(self.read_bytes(CosemTime::LENGTH)?)?),
            DataType::DateTime => {
                DataObject::DateTime(CosemDateTime::decode(self.read_bytes(CosemDateTime::LENGTH)?)?)
            }
            DataType::Array | DataType::Structure => return self.decode_items(data_type, 0),
            DataType::CompactArray | DataType::None => {
                return Err(DlmsError::ProtocolDecode(format!(
                    "Cannot decode {:?} without type description",
                    data_type
                )))
            }
        };
        Ok(value)
    }

    /// Decode an element count or byte length
    pub fn decode_length(&mut self) -> DlmsResult<usize> {
        let (length, consumed) = LengthEncoding::decode(&self.buffer[self.position..])?;
        self.position += consumed;
        Ok(length.value())
    }

    /// Decode a length-prefixed octet string
    pub fn decode_octet_string(&mut self) -> DlmsResult<Vec<u8>> {
        let len = self.decode_length()?;
        Ok(self.read_bytes(len)?.to_vec())
    }

    pub fn read_u8(&mut self) -> DlmsResult<u8> {
        let byte = *self.buffer.get(self.position).ok_or_else(|| {
            DlmsError::ProtocolDecode("Buffer exhausted while reading byte".to_string())
        })?;
        self.position += 1;
        Ok(byte)
    }

    pub fn read_u16(&mut self) -> DlmsResult<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> DlmsResult<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Read `len` raw bytes
    pub fn read_bytes(&mut self, len: usize) -> DlmsResult<&'a [u8]> {
        let end = self
            .position
            .checked_add(len)
            .filter(|end| *end <= self.buffer.len())
            .ok_or_else(|| {
                DlmsError::ProtocolDecode(format!(
                    "Not enough bytes: need {}, have {}",
                    len,
                    self.remaining()
                ))
            })?;
        let bytes = &self.buffer[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> DlmsResult<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get remaining bytes
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.buffer.len()
    }

    /// Unread part of the buffer
    pub fn rest(&self) -> &'a [u8] {
        &self.buffer[self.position..]
    }
}

/// Decode a single tagged value, returning it with the consumed byte count
pub fn decode_from_slice(bytes: &[u8]) -> DlmsResult<(DataObject, usize)> {
    let mut decoder = AxdrDecoder::new(bytes);
    let value = decoder.decode_data_object()?;
    Ok((value, decoder.position()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axdr::encoder::encode_to_vec;

    #[test]
    fn test_decode_boolean() {
        let (obj, consumed) = decode_from_slice(&[0x03, 0xFF]).unwrap();
        assert_eq!(obj, DataObject::Boolean(true));
        assert_eq!(consumed, 2);
    }

    #[test]
    fn test_decode_integer32() {
        let (obj, _) = decode_from_slice(&[0x05, 0x12, 0x34, 0x56, 0x78]).unwrap();
        assert_eq!(obj, DataObject::Integer32(0x12345678));
    }

    #[test]
    fn test_decode_nested_values() {
        let value = DataObject::Array(vec![
            DataObject::Structure(vec![
                DataObject::Unsigned16(3),
                DataObject::Unsigned8(0),
                DataObject::OctetString(vec![1, 0, 1, 8, 0, 255]),
            ]),
            DataObject::Integer64(-5),
            DataObject::new_text("meter"),
            DataObject::DateTime(CosemDateTime::from_parts(2024, 1, 2, 3, 4, 5).unwrap()),
        ]);
        let bytes = encode_to_vec(&value).unwrap();
        let (decoded, consumed) = decode_from_slice(&bytes).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn test_decode_truncated() {
        assert!(decode_from_slice(&[0x12, 0x00]).is_err());
        assert!(decode_from_slice(&[0x09, 0x05, 0x01]).is_err());
        assert!(decode_from_slice(&[0x01, 0x02, 0x11, 0x01]).is_err());
    }

    #[test]
    fn test_decode_untyped_value() {
        let mut decoder = AxdrDecoder::new(&[0x01, 0x2C]);
        assert_eq!(
            decoder.decode_value(DataType::LongUnsigned).unwrap(),
            DataObject::Unsigned16(300)
        );
        assert!(decoder.is_exhausted());
    }

    #[test]
    fn test_decode_untyped_structure() {
        let mut decoder = AxdrDecoder::new(&[0x02, 0x0F, 0xFD, 0x16, 0x1E]);
        assert_eq!(
            decoder.decode_value(DataType::Structure).unwrap(),
            DataObject::Structure(vec![DataObject::Integer8(-3), DataObject::Enumerate(30)])
        );
        assert!(decoder.is_exhausted());

        let mut decoder = AxdrDecoder::new(&[0x00]);
        assert_eq!(decoder.decode_value(DataType::Array).unwrap(), DataObject::Array(Vec::new()));
    }

    #[test]
    fn test_round_trip_every_type() {
        let values = vec![
            DataObject::Null,
            DataObject::Boolean(false),
            DataObject::Boolean(true),
            DataObject::Integer8(-128),
            DataObject::Integer16(-12345),
            DataObject::Integer32(i32::MIN),
            DataObject::Integer64(i64::MAX),
            DataObject::Unsigned8(255),
            DataObject::Unsigned16(0xBEEF),
            DataObject::Unsigned32(0xDEAD_BEEF),
            DataObject::Unsigned64(u64::MAX),
            DataObject::Float32(-1.5),
            DataObject::Float64(1234.0625),
            DataObject::Enumerate(30),
            DataObject::Bcd(0x42),
            DataObject::BitString(BitString::new(vec![0b1010_0000], 3).unwrap()),
            DataObject::BitString(BitString::new(vec![0xFF, 0x80], 9).unwrap()),
            DataObject::OctetString(Vec::new()),
            DataObject::OctetString(vec![0xAB; 200]),
            DataObject::new_text("meter"),
            DataObject::Utf8String("zähler".as_bytes().to_vec()),
            DataObject::Date(CosemDate::decode(&[0x07, 0xE8, 3, 15, 5]).unwrap()),
            DataObject::Time(CosemTime::decode(&[12, 30, 45, 0]).unwrap()),
            DataObject::DateTime(CosemDateTime::from_parts(2024, 1, 2, 3, 4, 5).unwrap()),
            DataObject::Array(Vec::new()),
            DataObject::Structure(vec![DataObject::Array(vec![DataObject::Unsigned8(1)])]),
        ];
        for value in values {
            let bytes = encode_to_vec(&value).unwrap();
            let (decoded, consumed) = decode_from_slice(&bytes).unwrap();
            assert_eq!(decoded, value, "{:02X?}", bytes);
            assert_eq!(consumed, bytes.len(), "{:?}", value);
        }
    }
}
