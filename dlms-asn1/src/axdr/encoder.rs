//! A-XDR encoder for DLMS/COSEM

use crate::axdr::types::LengthEncoding;
use dlms_core::datatypes::*;
use dlms_core::{DlmsError, DlmsResult};

/// A-XDR encoder for encoding DLMS/COSEM data types
#[derive(Debug, Default)]
pub struct AxdrEncoder {
    buffer: Vec<u8>,
}

impl AxdrEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Create a new encoder with initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Encode a value under a declared type
    ///
    /// The value is first converted to `data_type`; `DataType::None` keeps
    /// the value's own type.
    ///
    /// # Errors
    ///
    /// Returns `DlmsError::OutOfRange` or `DlmsError::InvalidData` when the
    /// value does not fit the declared type.
    pub fn encode_typed(&mut self, data_type: DataType, obj: &DataObject) -> DlmsResult<()> {
        let converted = obj.convert_to(data_type)?;
        self.encode_data_object(&converted)
    }

    /// Encode a DataObject with its tag
    pub fn encode_data_object(&mut self, obj: &DataObject) -> DlmsResult<()> {
        let tag = obj.data_type().tag().ok_or_else(|| {
            DlmsError::Argument("Cannot encode a value without data type".to_string())
        })?;
        self.encode_u8(tag);
        self.encode_untagged(obj)
    }

    /// Encode the value part of a DataObject without its tag
    pub fn encode_untagged(&mut self, obj: &DataObject) -> DlmsResult<()> {
        match obj {
            DataObject::Null => {}
            DataObject::Boolean(b) => self.encode_bool(*b),
            DataObject::Integer8(i) => self.encode_u8(*i as u8),
            DataObject::Integer16(i) => self.encode_bytes(&i.to_be_bytes()),
            DataObject::Integer32(i) => self.encode_bytes(&i.to_be_bytes()),
            DataObject::Integer64(i) => self.encode_bytes(&i.to_be_bytes()),
            DataObject::Unsigned8(u) | DataObject::Enumerate(u) | DataObject::Bcd(u) => {
                self.encode_u8(*u)
            }
            DataObject::Unsigned16(u) => self.encode_u16(*u),
            DataObject::Unsigned32(u) => self.encode_u32(*u),
            DataObject::Unsigned64(u) => self.encode_bytes(&u.to_be_bytes()),
            DataObject::Float32(f) => self.encode_bytes(&f.to_bits().to_be_bytes()),
            DataObject::Float64(f) => self.encode_bytes(&f.to_bits().to_be_bytes()),
            DataObject::OctetString(s)
            | DataObject::VisibleString(s)
            | DataObject::Utf8String(s) => self.encode_octet_string(s),
            DataObject::BitString(bs) => {
                self.encode_length(bs.num_bits());
                self.encode_bytes(bs.as_bytes());
            }
            DataObject::Array(items) | DataObject::Structure(items) => {
                self.encode_length(items.len());
                for item in items {
                    self.encode_data_object(item)?;
                }
            }
            DataObject::Date(d) => self.encode_bytes(&d.encode()),
            DataObject::Time(t) => self.encode_bytes(&t.encode()),
            DataObject::DateTime(dt) => self.encode_bytes(&dt.encode()),
        }
        Ok(())
    }

    /// Encode a boolean
    pub fn encode_bool(&mut self, value: bool) {
        self.buffer.push(if value { 0x01 } else { 0x00 });
    }

    pub fn encode_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Encode a u16 (big-endian)
    pub fn encode_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Encode a u32 (big-endian)
    pub fn encode_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Encode an element count or byte length
    pub fn encode_length(&mut self, len: usize) {
        self.buffer
            .extend_from_slice(&LengthEncoding::new(len).encode());
    }

    /// Encode an octet string (length prefixed)
    pub fn encode_octet_string(&mut self, value: &[u8]) {
        self.encode_length(value.len());
        self.buffer.extend_from_slice(value);
    }

    /// Encode raw bytes
    pub fn encode_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get a reference to the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

/// Encode a single tagged value
pub fn encode_to_vec(obj: &DataObject) -> DlmsResult<Vec<u8>> {
    let mut encoder = AxdrEncoder::new();
    encoder.encode_data_object(obj)?;
    Ok(encoder.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_boolean() {
        let bytes = encode_to_vec(&DataObject::Boolean(true)).unwrap();
        assert_eq!(bytes, vec![0x03, 0x01]);
    }

    #[test]
    fn test_encode_integer32() {
        let bytes = encode_to_vec(&DataObject::Integer32(0x12345678)).unwrap();
        assert_eq!(bytes, vec![0x05, 0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn test_encode_structure() {
        let value = DataObject::Structure(vec![
            DataObject::Unsigned16(8),
            DataObject::OctetString(vec![0, 0, 1, 0, 0, 255]),
        ]);
        let bytes = encode_to_vec(&value).unwrap();
        assert_eq!(
            bytes,
            vec![0x02, 0x02, 0x12, 0x00, 0x08, 0x09, 0x06, 0, 0, 1, 0, 0, 255]
        );
    }

    #[test]
    fn test_encode_typed_converts() {
        let mut encoder = AxdrEncoder::new();
        encoder
            .encode_typed(DataType::LongUnsigned, &DataObject::Integer32(5))
            .unwrap();
        assert_eq!(encoder.as_bytes(), &[0x12, 0x00, 0x05]);

        let mut encoder = AxdrEncoder::new();
        assert!(encoder
            .encode_typed(DataType::Unsigned, &DataObject::Integer32(-1))
            .is_err());
    }
}
