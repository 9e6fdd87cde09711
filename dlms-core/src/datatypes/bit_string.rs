//! Bit string type for DLMS/COSEM protocol

use crate::error::{DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arbitrary string of bits, most significant bit first. May be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitString {
    bytes: Vec<u8>,
    num_bits: usize,
}

impl BitString {
    /// Construct a new bit string object.
    ///
    /// # Errors
    ///
    /// Returns an error if `num_bits > bit_string.len() * 8`
    pub fn new(bit_string: Vec<u8>, num_bits: usize) -> DlmsResult<Self> {
        if num_bits > bit_string.len() * 8 {
            return Err(DlmsError::InvalidData(format!(
                "bit_string is too short to hold all bits. Need {} bytes for {} bits",
                num_bits.div_ceil(8),
                num_bits
            )));
        }
        Ok(Self {
            bytes: bit_string,
            num_bits,
        })
    }

    /// Parse a text of '0' and '1' characters, e.g. "10110"
    pub fn from_bits_text(text: &str) -> DlmsResult<Self> {
        let mut result = Self {
            bytes: vec![0u8; text.len().div_ceil(8)],
            num_bits: text.len(),
        };
        for (index, ch) in text.chars().enumerate() {
            match ch {
                '0' => {}
                '1' => result.set_bit(index, true)?,
                other => {
                    return Err(DlmsError::InvalidData(format!(
                        "Invalid bit character: {:?}",
                        other
                    )))
                }
            }
        }
        Ok(result)
    }

    /// Render as '0'/'1' text of exactly `num_bits` characters
    pub fn to_bits_text(&self) -> String {
        (0..self.num_bits)
            .map(|i| if self.bit(i) { '1' } else { '0' })
            .collect()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    fn bit(&self, index: usize) -> bool {
        (self.bytes[index / 8] >> (7 - (index % 8))) & 1 == 1
    }

    /// Get the bit at a specific position
    pub fn get_bit(&self, index: usize) -> DlmsResult<bool> {
        if index >= self.num_bits {
            return Err(DlmsError::InvalidData(format!(
                "Bit index {} out of bounds (num_bits: {})",
                index, self.num_bits
            )));
        }
        Ok(self.bit(index))
    }

    /// Set the bit at a specific position
    pub fn set_bit(&mut self, index: usize, value: bool) -> DlmsResult<()> {
        if index >= self.num_bits {
            return Err(DlmsError::InvalidData(format!(
                "Bit index {} out of bounds (num_bits: {})",
                index, self.num_bits
            )));
        }
        let mask = 1 << (7 - (index % 8));
        if value {
            self.bytes[index / 8] |= mask;
        } else {
            self.bytes[index / 8] &= !mask;
        }
        Ok(())
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bits_text())
    }
}
