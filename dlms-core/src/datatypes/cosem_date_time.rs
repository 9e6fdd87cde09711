//! COSEM DateTime type for DLMS/COSEM protocol

use crate::datatypes::cosem_date::CosemDate;
use crate::datatypes::cosem_time::CosemTime;
use crate::error::{DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deviation value meaning "not specified" (0x8000 on the wire)
pub const DEVIATION_NOT_SPECIFIED: i16 = i16::MIN;

/// Clock status flags for COSEM DateTime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStatus {
    InvalidValue = 0x01,
    DoubtfulValue = 0x02,
    DifferentClockBase = 0x04,
    InvalidClockStatus = 0x08,
    DaylightSavingActive = 0x80,
}

impl ClockStatus {
    const ALL: [ClockStatus; 5] = [
        ClockStatus::InvalidValue,
        ClockStatus::DoubtfulValue,
        ClockStatus::DifferentClockBase,
        ClockStatus::InvalidClockStatus,
        ClockStatus::DaylightSavingActive,
    ];

    /// Convert clock status flags to a byte
    pub fn to_byte(statuses: &[ClockStatus]) -> u8 {
        statuses.iter().fold(0u8, |acc, s| acc | *s as u8)
    }

    /// Parse clock status from a byte
    pub fn from_byte(byte: u8) -> Vec<ClockStatus> {
        Self::ALL
            .iter()
            .copied()
            .filter(|s| byte & *s as u8 != 0)
            .collect()
    }
}

/// COSEM date-time: date (5) + time (4) + deviation (2) + clock status (1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CosemDateTime {
    date: CosemDate,
    time: CosemTime,
    deviation: i16,
    clock_status: u8,
}

impl CosemDateTime {
    pub const LENGTH: usize = 12;

    /// Constructs a COSEM DateTime
    ///
    /// # Arguments
    ///
    /// * `deviation` - minutes from local time to UTC, or `DEVIATION_NOT_SPECIFIED`
    pub fn new(date: CosemDate, time: CosemTime, deviation: i16, clock_status: &[ClockStatus]) -> Self {
        Self {
            date,
            time,
            deviation,
            clock_status: ClockStatus::to_byte(clock_status),
        }
    }

    /// Convenience constructor from calendar fields, deviation not specified
    pub fn from_parts(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> DlmsResult<Self> {
        Ok(Self::new(
            CosemDate::new(year, month, day)?,
            CosemTime::new_with_hundredths(hour, minute, second, 0)?,
            DEVIATION_NOT_SPECIFIED,
            &[],
        ))
    }

    /// Decode from the 12-byte wire form
    pub fn decode(bytes: &[u8]) -> DlmsResult<Self> {
        if bytes.len() != Self::LENGTH {
            return Err(DlmsError::InvalidData(format!(
                "Wrong size. Expected {}, got {}",
                Self::LENGTH,
                bytes.len()
            )));
        }
        Ok(Self {
            date: CosemDate::decode(&bytes[0..5])?,
            time: CosemTime::decode(&bytes[5..9])?,
            deviation: i16::from_be_bytes([bytes[9], bytes[10]]),
            clock_status: bytes[11],
        })
    }

    pub fn encode(&self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[0..5].copy_from_slice(&self.date.encode());
        out[5..9].copy_from_slice(&self.time.encode());
        out[9..11].copy_from_slice(&self.deviation.to_be_bytes());
        out[11] = self.clock_status;
        out
    }

    pub fn date(&self) -> &CosemDate {
        &self.date
    }

    pub fn time(&self) -> &CosemTime {
        &self.time
    }

    pub fn deviation(&self) -> i16 {
        self.deviation
    }

    pub fn clock_status(&self) -> Vec<ClockStatus> {
        ClockStatus::from_byte(self.clock_status)
    }
}

impl fmt::Display for CosemDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_time_wire_form() {
        let dt = CosemDateTime::from_parts(2024, 1, 2, 3, 4, 5).unwrap();
        let bytes = dt.encode();
        assert_eq!(
            bytes,
            [0x07, 0xE8, 1, 2, 0xFF, 3, 4, 5, 0, 0x80, 0x00, 0x00]
        );
        assert_eq!(CosemDateTime::decode(&bytes).unwrap(), dt);
    }

    #[test]
    fn test_clock_status_flags() {
        let byte = ClockStatus::to_byte(&[ClockStatus::InvalidValue, ClockStatus::DaylightSavingActive]);
        assert_eq!(byte, 0x81);
        assert_eq!(ClockStatus::from_byte(byte).len(), 2);
    }
}
