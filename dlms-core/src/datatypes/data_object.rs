//! Data object types for DLMS/COSEM protocol

use crate::datatypes::bit_string::BitString;
use crate::datatypes::cosem_date::CosemDate;
use crate::datatypes::cosem_date_time::CosemDateTime;
use crate::datatypes::cosem_time::CosemTime;
use crate::error::{DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared data type of an attribute or value
///
/// `None` means "not specified": it has no wire tag and is used when the
/// caller leaves the type to be inferred or when no UI type is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataType {
    #[default]
    None,
    NullData,
    Array,
    Structure,
    Boolean,
    BitString,
    /// Integer 32-bit
    DoubleLong,
    /// Unsigned integer 32-bit
    DoubleLongUnsigned,
    OctetString,
    VisibleString,
    Utf8String,
    Bcd,
    /// Integer 8-bit
    Integer,
    /// Integer 16-bit
    Long,
    /// Unsigned integer 8-bit
    Unsigned,
    /// Unsigned integer 16-bit
    LongUnsigned,
    CompactArray,
    Long64,
    Long64Unsigned,
    Enum,
    Float32,
    Float64,
    DateTime,
    Date,
    Time,
}

impl DataType {
    /// Resolve a wire tag
    pub fn from_tag(tag: u8) -> DlmsResult<Self> {
        let data_type = match tag {
            0x00 => DataType::NullData,
            0x01 => DataType::Array,
            0x02 => DataType::Structure,
            0x03 => DataType::Boolean,
            0x04 => DataType::BitString,
            0x05 => DataType::DoubleLong,
            0x06 => DataType::DoubleLongUnsigned,
            0x09 => DataType::OctetString,
            0x0A => DataType::VisibleString,
            0x0C => DataType::Utf8String,
            0x0D => DataType::Bcd,
            0x0F => DataType::Integer,
            0x10 => DataType::Long,
            0x11 => DataType::Unsigned,
            0x12 => DataType::LongUnsigned,
            0x13 => DataType::CompactArray,
            0x14 => DataType::Long64,
            0x15 => DataType::Long64Unsigned,
            0x16 => DataType::Enum,
            0x17 => DataType::Float32,
            0x18 => DataType::Float64,
            0x19 => DataType::DateTime,
            0x1A => DataType::Date,
            0x1B => DataType::Time,
            _ => {
                return Err(DlmsError::ProtocolDecode(format!(
                    "Unknown data type tag: 0x{:02X}",
                    tag
                )))
            }
        };
        Ok(data_type)
    }

    /// Wire tag, `None` for the unspecified type
    pub fn tag(self) -> Option<u8> {
        let tag = match self {
            DataType::None => return None,
            DataType::NullData => 0x00,
            DataType::Array => 0x01,
            DataType::Structure => 0x02,
            DataType::Boolean => 0x03,
            DataType::BitString => 0x04,
            DataType::DoubleLong => 0x05,
            DataType::DoubleLongUnsigned => 0x06,
            DataType::OctetString => 0x09,
            DataType::VisibleString => 0x0A,
            DataType::Utf8String => 0x0C,
            DataType::Bcd => 0x0D,
            DataType::Integer => 0x0F,
            DataType::Long => 0x10,
            DataType::Unsigned => 0x11,
            DataType::LongUnsigned => 0x12,
            DataType::CompactArray => 0x13,
            DataType::Long64 => 0x14,
            DataType::Long64Unsigned => 0x15,
            DataType::Enum => 0x16,
            DataType::Float32 => 0x17,
            DataType::Float64 => 0x18,
            DataType::DateTime => 0x19,
            DataType::Date => 0x1A,
            DataType::Time => 0x1B,
        };
        Some(tag)
    }

    /// Check if this type is a number type
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            DataType::DoubleLong
                | DataType::DoubleLongUnsigned
                | DataType::Integer
                | DataType::Long
                | DataType::Unsigned
                | DataType::LongUnsigned
                | DataType::Long64
                | DataType::Long64Unsigned
                | DataType::Enum
                | DataType::Bcd
                | DataType::Float32
                | DataType::Float64
        )
    }

    /// Text-like types that render an empty input as empty text
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            DataType::OctetString | DataType::VisibleString | DataType::Utf8String
        )
    }
}

/// Container holding data sent to or received from the meter
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum DataObject {
    #[default]
    Null,
    Boolean(bool),
    Integer8(i8),
    Integer16(i16),
    Integer32(i32),
    Integer64(i64),
    Unsigned8(u8),
    Unsigned16(u16),
    Unsigned32(u32),
    Unsigned64(u64),
    Float32(f32),
    Float64(f64),
    Enumerate(u8),
    Bcd(u8),
    OctetString(#[serde(with = "serde_bytes")] Vec<u8>),
    VisibleString(#[serde(with = "serde_bytes")] Vec<u8>),
    Utf8String(#[serde(with = "serde_bytes")] Vec<u8>),
    BitString(BitString),
    Array(Vec<DataObject>),
    Structure(Vec<DataObject>),
    Date(CosemDate),
    Time(CosemTime),
    DateTime(CosemDateTime),
}

impl DataObject {
    /// Get the data type of this DataObject
    pub fn data_type(&self) -> DataType {
        match self {
            DataObject::Null => DataType::NullData,
            DataObject::Boolean(_) => DataType::Boolean,
            DataObject::Integer8(_) => DataType::Integer,
            DataObject::Integer16(_) => DataType::Long,
            DataObject::Integer32(_) => DataType::DoubleLong,
            DataObject::Integer64(_) => DataType::Long64,
            DataObject::Unsigned8(_) => DataType::Unsigned,
            DataObject::Unsigned16(_) => DataType::LongUnsigned,
            DataObject::Unsigned32(_) => DataType::DoubleLongUnsigned,
            DataObject::Unsigned64(_) => DataType::Long64Unsigned,
            DataObject::Float32(_) => DataType::Float32,
            DataObject::Float64(_) => DataType::Float64,
            DataObject::Enumerate(_) => DataType::Enum,
            DataObject::Bcd(_) => DataType::Bcd,
            DataObject::OctetString(_) => DataType::OctetString,
            DataObject::VisibleString(_) => DataType::VisibleString,
            DataObject::Utf8String(_) => DataType::Utf8String,
            DataObject::BitString(_) => DataType::BitString,
            DataObject::Array(_) => DataType::Array,
            DataObject::Structure(_) => DataType::Structure,
            DataObject::Date(_) => DataType::Date,
            DataObject::Time(_) => DataType::Time,
            DataObject::DateTime(_) => DataType::DateTime,
        }
    }

    /// Visible string from text
    pub fn new_text(text: &str) -> Self {
        DataObject::VisibleString(text.as_bytes().to_vec())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataObject::Null)
    }

    /// Numeric value widened to i128, for integer-like variants and booleans
    pub fn to_i128(&self) -> DlmsResult<i128> {
        let value = match self {
            DataObject::Boolean(b) => i128::from(*b),
            DataObject::Integer8(v) => i128::from(*v),
            DataObject::Integer16(v) => i128::from(*v),
            DataObject::Integer32(v) => i128::from(*v),
            DataObject::Integer64(v) => i128::from(*v),
            DataObject::Unsigned8(v) | DataObject::Enumerate(v) | DataObject::Bcd(v) => {
                i128::from(*v)
            }
            DataObject::Unsigned16(v) => i128::from(*v),
            DataObject::Unsigned32(v) => i128::from(*v),
            DataObject::Unsigned64(v) => i128::from(*v),
            _ => {
                return Err(DlmsError::InvalidData(format!(
                    "Expected a number, got {:?}",
                    self.data_type()
                )))
            }
        };
        Ok(value)
    }

    /// Integer value as i64
    pub fn to_i64(&self) -> DlmsResult<i64> {
        let value = self.to_i128()?;
        i64::try_from(value)
            .map_err(|_| DlmsError::OutOfRange(format!("{} does not fit in i64", value)))
    }

    /// Integer value narrowed to the requested unsigned width
    pub fn to_u16(&self) -> DlmsResult<u16> {
        let value = self.to_i128()?;
        u16::try_from(value)
            .map_err(|_| DlmsError::OutOfRange(format!("{} does not fit in u16", value)))
    }

    pub fn to_u8(&self) -> DlmsResult<u8> {
        let value = self.to_i128()?;
        u8::try_from(value)
            .map_err(|_| DlmsError::OutOfRange(format!("{} does not fit in u8", value)))
    }

    pub fn to_u32(&self) -> DlmsResult<u32> {
        let value = self.to_i128()?;
        u32::try_from(value)
            .map_err(|_| DlmsError::OutOfRange(format!("{} does not fit in u32", value)))
    }

    /// Get the value as a boolean
    pub fn as_bool(&self) -> DlmsResult<bool> {
        match self {
            DataObject::Boolean(b) => Ok(*b),
            _ => Err(DlmsError::InvalidData(format!(
                "Expected Boolean, got {:?}",
                self.data_type()
            ))),
        }
    }

    /// Raw bytes of octet, visible and UTF-8 strings
    pub fn as_bytes(&self) -> DlmsResult<&[u8]> {
        match self {
            DataObject::OctetString(s)
            | DataObject::VisibleString(s)
            | DataObject::Utf8String(s) => Ok(s),
            _ => Err(DlmsError::InvalidData(format!(
                "Expected OctetString, got {:?}",
                self.data_type()
            ))),
        }
    }

    /// Text rendering of string-like values
    pub fn as_text(&self) -> DlmsResult<String> {
        Ok(String::from_utf8_lossy(self.as_bytes()?).into_owned())
    }

    /// Elements of an array or a structure
    pub fn as_list(&self) -> DlmsResult<&[DataObject]> {
        match self {
            DataObject::Array(items) | DataObject::Structure(items) => Ok(items),
            _ => Err(DlmsError::InvalidData(format!(
                "Expected Array or Structure, got {:?}",
                self.data_type()
            ))),
        }
    }

    /// Get the value as a structure
    pub fn as_structure(&self) -> DlmsResult<&[DataObject]> {
        match self {
            DataObject::Structure(s) => Ok(s),
            _ => Err(DlmsError::InvalidData(format!(
                "Expected Structure, got {:?}",
                self.data_type()
            ))),
        }
    }

    /// Convert this value to the declared type
    ///
    /// Integer values are range-checked into the target width. Strings move
    /// between the three string types. Any other mismatch is an error.
    pub fn convert_to(&self, target: DataType) -> DlmsResult<DataObject> {
        let current = self.data_type();
        if target == DataType::None || target == current {
            return Ok(self.clone());
        }
        let out_of_range =
            |v: i128| DlmsError::OutOfRange(format!("{} does not fit in {:?}", v, target));
        let converted = match target {
            DataType::Integer | DataType::Long | DataType::DoubleLong | DataType::Long64
            | DataType::Unsigned | DataType::LongUnsigned | DataType::DoubleLongUnsigned
            | DataType::Long64Unsigned | DataType::Enum | DataType::Bcd => {
                let v = self.to_i128()?;
                match target {
                    DataType::Integer => DataObject::Integer8(i8::try_from(v).map_err(|_| out_of_range(v))?),
                    DataType::Long => DataObject::Integer16(i16::try_from(v).map_err(|_| out_of_range(v))?),
                    DataType::DoubleLong => DataObject::Integer32(i32::try_from(v).map_err(|_| out_of_range(v))?),
                    DataType::Long64 => DataObject::Integer64(i64::try_from(v).map_err(|_| out_of_range(v))?),
                    DataType::Unsigned => DataObject::Unsigned8(u8::try_from(v).map_err(|_| out_of_range(v))?),
                    DataType::LongUnsigned => DataObject::Unsigned16(u16::try_from(v).map_err(|_| out_of_range(v))?),
                    DataType::DoubleLongUnsigned => DataObject::Unsigned32(u32::try_from(v).map_err(|_| out_of_range(v))?),
                    DataType::Long64Unsigned => DataObject::Unsigned64(u64::try_from(v).map_err(|_| out_of_range(v))?),
                    DataType::Enum => DataObject::Enumerate(u8::try_from(v).map_err(|_| out_of_range(v))?),
                    _ => DataObject::Bcd(u8::try_from(v).map_err(|_| out_of_range(v))?),
                }
            }
            DataType::Boolean => DataObject::Boolean(self.to_i128()? != 0),
            DataType::OctetString => DataObject::OctetString(self.as_bytes()?.to_vec()),
            DataType::VisibleString => DataObject::VisibleString(self.as_bytes()?.to_vec()),
            DataType::Utf8String => DataObject::Utf8String(self.as_bytes()?.to_vec()),
            DataType::Float32 => match self {
                DataObject::Float64(f) => DataObject::Float32(*f as f32),
                _ => DataObject::Float32(self.to_i128()? as f32),
            },
            DataType::Float64 => match self {
                DataObject::Float32(f) => DataObject::Float64(f64::from(*f)),
                _ => DataObject::Float64(self.to_i128()? as f64),
            },
            DataType::DateTime | DataType::Date | DataType::Time => match self {
                DataObject::OctetString(bytes) => match target {
                    DataType::DateTime => DataObject::DateTime(CosemDateTime::decode(bytes)?),
                    DataType::Date => DataObject::Date(CosemDate::decode(bytes)?),
                    _ => DataObject::Time(CosemTime::decode(bytes)?),
                },
                _ => {
                    return Err(DlmsError::InvalidData(format!(
                        "Cannot convert {:?} to {:?}",
                        current, target
                    )))
                }
            },
            _ => {
                return Err(DlmsError::InvalidData(format!(
                    "Cannot convert {:?} to {:?}",
                    current, target
                )))
            }
        };
        Ok(converted)
    }
}

impl fmt::Display for DataObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataObject::Null => write!(f, "NULL_DATA"),
            DataObject::Boolean(b) => write!(f, "{}", b),
            DataObject::Integer8(i) => write!(f, "{}", i),
            DataObject::Integer16(i) => write!(f, "{}", i),
            DataObject::Integer32(i) => write!(f, "{}", i),
            DataObject::Integer64(i) => write!(f, "{}", i),
            DataObject::Unsigned8(u) | DataObject::Enumerate(u) | DataObject::Bcd(u) => {
                write!(f, "{}", u)
            }
            DataObject::Unsigned16(u) => write!(f, "{}", u),
            DataObject::Unsigned32(u) => write!(f, "{}", u),
            DataObject::Unsigned64(u) => write!(f, "{}", u),
            DataObject::Float32(fl) => write!(f, "{}", fl),
            DataObject::Float64(fl) => write!(f, "{}", fl),
            DataObject::OctetString(s) => {
                for (i, byte) in s.iter().enumerate() {
                    if i != 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{:02X}", byte)?;
                }
                Ok(())
            }
            DataObject::VisibleString(s) | DataObject::Utf8String(s) => {
                write!(f, "{}", String::from_utf8_lossy(s))
            }
            DataObject::BitString(bs) => write!(f, "{}", bs),
            DataObject::Array(items) | DataObject::Structure(items) => {
                write!(f, "{{")?;
                for (i, elem) in items.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, "}}")
            }
            DataObject::Date(d) => write!(f, "{}", d),
            DataObject::Time(t) => write!(f, "{}", t),
            DataObject::DateTime(dt) => write!(f, "{}", dt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip() {
        for tag in [0x00u8, 0x01, 0x02, 0x09, 0x12, 0x16, 0x19, 0x1B] {
            assert_eq!(DataType::from_tag(tag).unwrap().tag(), Some(tag));
        }
        assert!(DataType::from_tag(0x07).is_err());
        assert_eq!(DataType::None.tag(), None);
    }

    #[test]
    fn test_convert_numbers() {
        let v = DataObject::Integer32(300);
        assert_eq!(v.convert_to(DataType::LongUnsigned).unwrap(), DataObject::Unsigned16(300));
        assert!(matches!(
            v.convert_to(DataType::Unsigned),
            Err(DlmsError::OutOfRange(_))
        ));
        assert_eq!(v.convert_to(DataType::None).unwrap(), v);
    }

    #[test]
    fn test_convert_strings() {
        let v = DataObject::new_text("abc");
        assert_eq!(
            v.convert_to(DataType::OctetString).unwrap(),
            DataObject::OctetString(b"abc".to_vec())
        );
        assert!(v.convert_to(DataType::Array).is_err());
    }

    #[test]
    fn test_to_u16_range() {
        assert_eq!(DataObject::Unsigned8(7).to_u16().unwrap(), 7);
        assert!(DataObject::Integer8(-1).to_u16().is_err());
        assert!(DataObject::Null.to_i64().is_err());
    }
}
