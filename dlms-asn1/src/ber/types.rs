//! BER encoding types (Tag, Length)

use dlms_core::{DlmsError, DlmsResult};

/// BER Tag Class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BerTagClass {
    /// Universal class (00)
    Universal = 0,
    /// Application class (01)
    Application = 1,
    /// Context-specific class (10)
    ContextSpecific = 2,
    /// Private class (11)
    Private = 3,
}

impl BerTagClass {
    /// Get tag class from bits 7-6 of the tag byte
    pub fn from_bits(bits: u8) -> Self {
        match (bits >> 6) & 0x03 {
            0 => BerTagClass::Universal,
            1 => BerTagClass::Application,
            2 => BerTagClass::ContextSpecific,
            _ => BerTagClass::Private,
        }
    }

    /// Convert tag class to bits (for encoding)
    pub fn to_bits(self) -> u8 {
        (self as u8) << 6
    }
}

/// Single-octet BER tag
///
/// ACSE APDUs only use tag numbers up to 30, so the extended tag form is
/// rejected on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BerTag {
    class: BerTagClass,
    constructed: bool,
    number: u8,
}

impl BerTag {
    pub const fn new(class: BerTagClass, constructed: bool, number: u8) -> Self {
        Self {
            class,
            constructed,
            number,
        }
    }

    pub const fn universal(constructed: bool, number: u8) -> Self {
        Self::new(BerTagClass::Universal, constructed, number)
    }

    pub const fn application(constructed: bool, number: u8) -> Self {
        Self::new(BerTagClass::Application, constructed, number)
    }

    pub const fn context_specific(constructed: bool, number: u8) -> Self {
        Self::new(BerTagClass::ContextSpecific, constructed, number)
    }

    pub fn class(&self) -> BerTagClass {
        self.class
    }

    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn to_byte(&self) -> u8 {
        let constructed_bit = if self.constructed { 0x20 } else { 0x00 };
        self.class.to_bits() | constructed_bit | (self.number & 0x1F)
    }

    pub fn from_byte(byte: u8) -> DlmsResult<Self> {
        if byte & 0x1F == 0x1F {
            return Err(DlmsError::ProtocolDecode(format!(
                "Extended BER tag 0x{:02X} not supported",
                byte
            )));
        }
        Ok(Self::new(
            BerTagClass::from_bits(byte),
            byte & 0x20 != 0,
            byte & 0x1F,
        ))
    }
}

/// BER definite length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BerLength {
    /// Short form: length < 128
    Short(u8),
    /// Long form: length >= 128
    Long(usize),
}

impl BerLength {
    pub fn new(length: usize) -> Self {
        if length < 128 {
            BerLength::Short(length as u8)
        } else {
            BerLength::Long(length)
        }
    }

    pub fn value(&self) -> usize {
        match self {
            BerLength::Short(l) => *l as usize,
            BerLength::Long(l) => *l,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match *self {
            BerLength::Short(length) => vec![length],
            BerLength::Long(length) => {
                let bytes = length.to_be_bytes();
                let skip = bytes.iter().take_while(|b| **b == 0).count();
                let mut result = vec![0x80 | (bytes.len() - skip) as u8];
                result.extend_from_slice(&bytes[skip..]);
                result
            }
        }
    }

    /// Decode a length, returning it with the number of bytes consumed
    pub fn decode(data: &[u8]) -> DlmsResult<(Self, usize)> {
        let first_byte = *data.first().ok_or_else(|| {
            DlmsError::ProtocolDecode("Empty buffer for length decoding".to_string())
        })?;
        if first_byte & 0x80 == 0 {
            return Ok((BerLength::Short(first_byte), 1));
        }

        let num_bytes = (first_byte & 0x7F) as usize;
        if num_bytes == 0 {
            return Err(DlmsError::ProtocolDecode(
                "Indefinite length encoding not supported".to_string(),
            ));
        }
        if num_bytes > 4 {
            return Err(DlmsError::ProtocolDecode(format!(
                "Length encoding too large: {} bytes (max 4)",
                num_bytes
            )));
        }
        if data.len() < 1 + num_bytes {
            return Err(DlmsError::ProtocolDecode(format!(
                "Buffer too short for long form length: need {} bytes, got {}",
                1 + num_bytes,
                data.len()
            )));
        }
        let length = data[1..1 + num_bytes]
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | b as usize);
        Ok((BerLength::Long(length), 1 + num_bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ber_tag_bytes() {
        assert_eq!(BerTag::application(true, 0).to_byte(), 0x60);
        assert_eq!(BerTag::context_specific(true, 30).to_byte(), 0xBE);
        assert_eq!(BerTag::context_specific(false, 10).to_byte(), 0x8A);
        let tag = BerTag::from_byte(0xA1).unwrap();
        assert_eq!(tag.class(), BerTagClass::ContextSpecific);
        assert!(tag.is_constructed());
        assert_eq!(tag.number(), 1);
        assert!(BerTag::from_byte(0x1F).is_err());
    }

    #[test]
    fn test_ber_length_long_form() {
        assert_eq!(BerLength::new(0x7F).encode(), vec![0x7F]);
        assert_eq!(BerLength::new(0x81).encode(), vec![0x81, 0x81]);
        assert_eq!(BerLength::new(0x0100).encode(), vec![0x82, 0x01, 0x00]);
        let (length, consumed) = BerLength::decode(&[0x82, 0x01, 0x00]).unwrap();
        assert_eq!(length.value(), 256);
        assert_eq!(consumed, 3);
        assert!(BerLength::decode(&[0x80]).is_err());
    }
}
