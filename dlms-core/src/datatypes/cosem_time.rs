//! COSEM Time type for DLMS/COSEM protocol

use crate::datatypes::cosem_date::{field, NOT_SPECIFIED};
use crate::error::{DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// COSEM time: hour, minute, second, hundredths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CosemTime {
    octet_string: [u8; 4],
}

impl CosemTime {
    pub const LENGTH: usize = 4;

    /// Constructs a COSEM Time with hundredths not specified
    pub fn new(hour: u8, minute: u8, second: u8) -> DlmsResult<Self> {
        Self::new_with_hundredths(hour, minute, second, NOT_SPECIFIED)
    }

    /// Constructs a COSEM Time with hundredths
    ///
    /// # Arguments
    ///
    /// * `hour` - The hour from 0 to 23, or 0xff if not specified
    /// * `minute` - The minute from 0 to 59, or 0xff if not specified
    /// * `second` - The second from 0 to 59, or 0xff if not specified
    /// * `hundredths` - The hundredths seconds from 0 to 99, or 0xff if not specified
    pub fn new_with_hundredths(
        hour: u8,
        minute: u8,
        second: u8,
        hundredths: u8,
    ) -> DlmsResult<Self> {
        Self::verify(hour, "Hour", 23)?;
        Self::verify(minute, "Minute", 59)?;
        Self::verify(second, "Second", 59)?;
        Self::verify(hundredths, "Hundredths", 99)?;
        Ok(Self {
            octet_string: [hour, minute, second, hundredths],
        })
    }

    fn verify(value: u8, name: &str, max: u8) -> DlmsResult<()> {
        if value > max && value != NOT_SPECIFIED {
            return Err(DlmsError::InvalidData(format!(
                "{} out of range: {}",
                name, value
            )));
        }
        Ok(())
    }

    /// A time with every field not specified
    pub fn unspecified() -> Self {
        Self {
            octet_string: [NOT_SPECIFIED; 4],
        }
    }

    /// Decode a COSEM Time from a byte array
    pub fn decode(octet_string: &[u8]) -> DlmsResult<Self> {
        let octet_string: [u8; 4] = octet_string.try_into().map_err(|_| {
            DlmsError::InvalidData(format!(
                "Wrong size. Expected {}, got {}",
                Self::LENGTH,
                octet_string.len()
            ))
        })?;
        Ok(Self { octet_string })
    }

    pub fn encode(&self) -> [u8; 4] {
        self.octet_string
    }

    pub fn hour(&self) -> u8 {
        self.octet_string[0]
    }

    pub fn minute(&self) -> u8 {
        self.octet_string[1]
    }

    pub fn second(&self) -> u8 {
        self.octet_string[2]
    }

    pub fn hundredths(&self) -> u8 {
        self.octet_string[3]
    }
}

impl fmt::Display for CosemTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            field(self.hour()),
            field(self.minute()),
            field(self.second())
        )
    }
}
