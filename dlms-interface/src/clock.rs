//! Clock interface class (Class ID: 8)
//!
//! # Attributes
//!
//! - Attribute 2: time
//! - Attribute 3: time_zone (minutes from UTC)
//! - Attribute 4: status
//! - Attribute 5: daylight_savings_begin
//! - Attribute 6: daylight_savings_end
//! - Attribute 7: daylight_savings_deviation (minutes)
//! - Attribute 8: daylight_savings_enabled
//! - Attribute 9: clock_base
//!
//! # Methods
//!
//! - Method 1: adjust_to_quarter
//! - Method 2: adjust_to_measuring_period
//! - Method 3: adjust_to_minute
//! - Method 4: adjust_to_preset_time
//! - Method 5: preset_adjusting_time
//! - Method 6: shift_time

use crate::attributes::{CosemAttributes, no_attribute};
use dlms_core::{CosemDateTime, DataObject, DataType, DlmsError, DlmsResult};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Clock {
    pub time: Option<CosemDateTime>,
    pub time_zone: i16,
    pub status: u8,
    pub daylight_savings_begin: Option<CosemDateTime>,
    pub daylight_savings_end: Option<CosemDateTime>,
    pub daylight_savings_deviation: i8,
    pub daylight_savings_enabled: bool,
    pub clock_base: u8,
}

impl Clock {
    pub const CLASS_ID: u16 = 8;
    pub const ATTR_TIME: u8 = 2;
    pub const ATTR_TIME_ZONE: u8 = 3;
    pub const ATTR_STATUS: u8 = 4;
    pub const ATTR_DAYLIGHT_SAVINGS_BEGIN: u8 = 5;
    pub const ATTR_DAYLIGHT_SAVINGS_END: u8 = 6;
    pub const ATTR_DAYLIGHT_SAVINGS_DEVIATION: u8 = 7;
    pub const ATTR_DAYLIGHT_SAVINGS_ENABLED: u8 = 8;
    pub const ATTR_CLOCK_BASE: u8 = 9;
}

/// Date-time from either the 12-byte octet string or an already typed value
pub(crate) fn date_time_from(value: &DataObject) -> DlmsResult<Option<CosemDateTime>> {
    match value {
        DataObject::Null => Ok(None),
        DataObject::DateTime(date_time) => Ok(Some(*date_time)),
        DataObject::OctetString(bytes) if bytes.is_empty() => Ok(None),
        DataObject::OctetString(bytes) => Ok(Some(CosemDateTime::decode(bytes)?)),
        other => Err(DlmsError::InvalidData(format!(
            "Expected a date-time, got {:?}",
            other.data_type()
        ))),
    }
}

pub(crate) fn date_time_to(value: &Option<CosemDateTime>) -> DataObject {
    match value {
        Some(date_time) => DataObject::OctetString(date_time.encode().to_vec()),
        None => DataObject::Null,
    }
}

impl CosemAttributes for Clock {
    fn attribute_count(&self) -> u8 {
        9
    }

    fn method_count(&self) -> u8 {
        6
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataType> {
        match index {
            Self::ATTR_TIME | Self::ATTR_DAYLIGHT_SAVINGS_BEGIN | Self::ATTR_DAYLIGHT_SAVINGS_END => {
                Ok(DataType::OctetString)
            }
            Self::ATTR_TIME_ZONE => Ok(DataType::Long),
            Self::ATTR_STATUS => Ok(DataType::Unsigned),
            Self::ATTR_DAYLIGHT_SAVINGS_DEVIATION => Ok(DataType::Integer),
            Self::ATTR_DAYLIGHT_SAVINGS_ENABLED => Ok(DataType::Boolean),
            Self::ATTR_CLOCK_BASE => Ok(DataType::Enum),
            _ => Err(no_attribute("Clock", index)),
        }
    }

    fn get_value(&self, index: u8) -> DlmsResult<DataObject> {
        Ok(match index {
            Self::ATTR_TIME => date_time_to(&self.time),
            Self::ATTR_TIME_ZONE => DataObject::Integer16(self.time_zone),
            Self::ATTR_STATUS => DataObject::Unsigned8(self.status),
            Self::ATTR_DAYLIGHT_SAVINGS_BEGIN => date_time_to(&self.daylight_savings_begin),
            Self::ATTR_DAYLIGHT_SAVINGS_END => date_time_to(&self.daylight_savings_end),
            Self::ATTR_DAYLIGHT_SAVINGS_DEVIATION => {
                DataObject::Integer8(self.daylight_savings_deviation)
            }
            Self::ATTR_DAYLIGHT_SAVINGS_ENABLED => DataObject::Boolean(self.daylight_savings_enabled),
            Self::ATTR_CLOCK_BASE => DataObject::Enumerate(self.clock_base),
            _ => return Err(no_attribute("Clock", index)),
        })
    }

    fn set_value(&mut self, index: u8, value: DataObject) -> DlmsResult<()> {
        match index {
            Self::ATTR_TIME => self.time = date_time_from(&value)?,
            Self::ATTR_TIME_ZONE => {
                let minutes = value.to_i64()?;
                self.time_zone = i16::try_from(minutes).map_err(|_| {
                    DlmsError::OutOfRange(format!("Time zone {} does not fit in i16", minutes))
                })?;
            }
            Self::ATTR_STATUS => self.status = value.to_u8()?,
            Self::ATTR_DAYLIGHT_SAVINGS_BEGIN => self.daylight_savings_begin = date_time_from(&value)?,
            Self::ATTR_DAYLIGHT_SAVINGS_END => self.daylight_savings_end = date_time_from(&value)?,
            Self::ATTR_DAYLIGHT_SAVINGS_DEVIATION => {
                let minutes = value.to_i64()?;
                self.daylight_savings_deviation = i8::try_from(minutes).map_err(|_| {
                    DlmsError::OutOfRange(format!("Deviation {} does not fit in i8", minutes))
                })?;
            }
            Self::ATTR_DAYLIGHT_SAVINGS_ENABLED => self.daylight_savings_enabled = value.as_bool()?,
            Self::ATTR_CLOCK_BASE => self.clock_base = value.to_u8()?,
            _ => return Err(no_attribute("Clock", index)),
        }
        Ok(())
    }
}
