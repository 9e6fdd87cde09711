//! COSEM date type for DLMS/COSEM protocol

use crate::error::{DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker for a field that is not specified
pub const NOT_SPECIFIED: u8 = 0xFF;
/// Year value meaning "not specified"
pub const YEAR_NOT_SPECIFIED: u16 = 0xFFFF;
/// Month value for end of daylight saving time
pub const DAYLIGHT_SAVINGS_END: u8 = 0xFD;
/// Month value for begin of daylight saving time
pub const DAYLIGHT_SAVINGS_BEGIN: u8 = 0xFE;
/// Day value for the last day of month
pub const LAST_DAY_OF_MONTH: u8 = 0xFE;
/// Day value for the second last day of month
pub const SECOND_LAST_DAY_OF_MONTH: u8 = 0xFD;

/// COSEM date: year (2 bytes), month, day of month, day of week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CosemDate {
    year: u16,
    month: u8,
    day_of_month: u8,
    day_of_week: u8,
}

impl CosemDate {
    pub const LENGTH: usize = 5;

    /// Constructs a COSEM date with day of week not specified
    ///
    /// # Arguments
    ///
    /// * `year` - The year, or 0xFFFF if not specified
    /// * `month` - 1..=12, 0xFD/0xFE for DST end/begin, or 0xFF
    /// * `day_of_month` - 1..=31, 0xFD/0xFE for second last/last day, or 0xFF
    pub fn new(year: u16, month: u8, day_of_month: u8) -> DlmsResult<Self> {
        Self::with_day_of_week(year, month, day_of_month, NOT_SPECIFIED)
    }

    /// Constructs a COSEM date including day of week (1 = Monday .. 7 = Sunday)
    pub fn with_day_of_week(
        year: u16,
        month: u8,
        day_of_month: u8,
        day_of_week: u8,
    ) -> DlmsResult<Self> {
        if !((1..=12).contains(&month)
            || month == DAYLIGHT_SAVINGS_END
            || month == DAYLIGHT_SAVINGS_BEGIN
            || month == NOT_SPECIFIED)
        {
            return Err(DlmsError::InvalidData(format!("Month out of range: {}", month)));
        }
        if !((1..=31).contains(&day_of_month) || day_of_month >= SECOND_LAST_DAY_OF_MONTH) {
            return Err(DlmsError::InvalidData(format!(
                "Day of month out of range: {}",
                day_of_month
            )));
        }
        if !((1..=7).contains(&day_of_week) || day_of_week == NOT_SPECIFIED) {
            return Err(DlmsError::InvalidData(format!(
                "Day of week out of range: {}",
                day_of_week
            )));
        }
        Ok(Self {
            year,
            month,
            day_of_month,
            day_of_week,
        })
    }

    /// A date with every field not specified
    pub fn unspecified() -> Self {
        Self {
            year: YEAR_NOT_SPECIFIED,
            month: NOT_SPECIFIED,
            day_of_month: NOT_SPECIFIED,
            day_of_week: NOT_SPECIFIED,
        }
    }

    /// Decode from the 5-byte wire form
    ///
    /// Field values are taken as-is; devices use vendor values in some fields.
    pub fn decode(bytes: &[u8]) -> DlmsResult<Self> {
        if bytes.len() != Self::LENGTH {
            return Err(DlmsError::InvalidData(format!(
                "Wrong size. Expected {}, got {}",
                Self::LENGTH,
                bytes.len()
            )));
        }
        Ok(Self {
            year: u16::from_be_bytes([bytes[0], bytes[1]]),
            month: bytes[2],
            day_of_month: bytes[3],
            day_of_week: bytes[4],
        })
    }

    pub fn encode(&self) -> [u8; 5] {
        let year = self.year.to_be_bytes();
        [year[0], year[1], self.month, self.day_of_month, self.day_of_week]
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day_of_month(&self) -> u8 {
        self.day_of_month
    }

    pub fn day_of_week(&self) -> u8 {
        self.day_of_week
    }
}

impl fmt::Display for CosemDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = if self.year == YEAR_NOT_SPECIFIED {
            "*".to_string()
        } else {
            self.year.to_string()
        };
        write!(f, "{}-{}-{}", year, field(self.month), field(self.day_of_month))
    }
}

pub(crate) fn field(value: u8) -> String {
    if value == NOT_SPECIFIED {
        "*".to_string()
    } else {
        format!("{:02}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_encode_decode() {
        let date = CosemDate::with_day_of_week(2024, 3, 15, 5).unwrap();
        let bytes = date.encode();
        assert_eq!(bytes, [0x07, 0xE8, 3, 15, 5]);
        assert_eq!(CosemDate::decode(&bytes).unwrap(), date);
    }

    #[test]
    fn test_date_rejects_bad_month() {
        assert!(CosemDate::new(2024, 13, 1).is_err());
        assert!(CosemDate::new(2024, DAYLIGHT_SAVINGS_BEGIN, 1).is_ok());
    }

    #[test]
    fn test_date_display_unspecified() {
        assert_eq!(CosemDate::unspecified().to_string(), "*-*-*");
    }
}
