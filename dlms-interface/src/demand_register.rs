//! Demand Register interface class (Class ID: 5)
//!
//! # Attributes
//!
//! - Attribute 2: current_average_value
//! - Attribute 3: last_average_value
//! - Attribute 4: scaler_unit
//! - Attribute 5: status
//! - Attribute 6: capture_time
//! - Attribute 7: start_time_current
//! - Attribute 8: period (seconds)
//! - Attribute 9: number_of_periods
//!
//! # Methods
//!
//! - Method 1: reset
//! - Method 2: next_period

use crate::attributes::{CosemAttributes, no_attribute};
use crate::scaler_unit::ScalerUnit;
use dlms_core::{DataObject, DataType, DlmsResult};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DemandRegister {
    pub current_average_value: DataObject,
    pub last_average_value: DataObject,
    pub scaler_unit: ScalerUnit,
    pub status: DataObject,
    pub capture_time: DataObject,
    pub start_time_current: DataObject,
    pub period: u32,
    pub number_of_periods: u16,
}

impl DemandRegister {
    pub const CLASS_ID: u16 = 5;
    pub const ATTR_CURRENT_AVERAGE_VALUE: u8 = 2;
    pub const ATTR_LAST_AVERAGE_VALUE: u8 = 3;
    pub const ATTR_SCALER_UNIT: u8 = 4;
    pub const ATTR_STATUS: u8 = 5;
    pub const ATTR_CAPTURE_TIME: u8 = 6;
    pub const ATTR_START_TIME_CURRENT: u8 = 7;
    pub const ATTR_PERIOD: u8 = 8;
    pub const ATTR_NUMBER_OF_PERIODS: u8 = 9;
}

impl CosemAttributes for DemandRegister {
    fn attribute_count(&self) -> u8 {
        9
    }

    fn method_count(&self) -> u8 {
        2
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataType> {
        match index {
            Self::ATTR_CURRENT_AVERAGE_VALUE => Ok(self.current_average_value.data_type()),
            Self::ATTR_LAST_AVERAGE_VALUE => Ok(self.last_average_value.data_type()),
            Self::ATTR_SCALER_UNIT => Ok(DataType::Structure),
            Self::ATTR_STATUS => Ok(self.status.data_type()),
            Self::ATTR_CAPTURE_TIME | Self::ATTR_START_TIME_CURRENT => Ok(DataType::OctetString),
            Self::ATTR_PERIOD => Ok(DataType::DoubleLongUnsigned),
            Self::ATTR_NUMBER_OF_PERIODS => Ok(DataType::LongUnsigned),
            _ => Err(no_attribute("DemandRegister", index)),
        }
    }

    fn get_value(&self, index: u8) -> DlmsResult<DataObject> {
        Ok(match index {
            Self::ATTR_CURRENT_AVERAGE_VALUE => self.current_average_value.clone(),
            Self::ATTR_LAST_AVERAGE_VALUE => self.last_average_value.clone(),
            Self::ATTR_SCALER_UNIT => self.scaler_unit.to_data_object(),
            Self::ATTR_STATUS => self.status.clone(),
            Self::ATTR_CAPTURE_TIME => self.capture_time.clone(),
            Self::ATTR_START_TIME_CURRENT => self.start_time_current.clone(),
            Self::ATTR_PERIOD => DataObject::Unsigned32(self.period),
            Self::ATTR_NUMBER_OF_PERIODS => DataObject::Unsigned16(self.number_of_periods),
            _ => return Err(no_attribute("DemandRegister", index)),
        })
    }

    fn set_value(&mut self, index: u8, value: DataObject) -> DlmsResult<()> {
        match index {
            Self::ATTR_CURRENT_AVERAGE_VALUE => self.current_average_value = value,
            Self::ATTR_LAST_AVERAGE_VALUE => self.last_average_value = value,
            Self::ATTR_SCALER_UNIT => self.scaler_unit = ScalerUnit::from_data_object(&value)?,
            Self::ATTR_STATUS => self.status = value,
            Self::ATTR_CAPTURE_TIME => self.capture_time = value,
            Self::ATTR_START_TIME_CURRENT => self.start_time_current = value,
            Self::ATTR_PERIOD => self.period = value.to_u32()?,
            Self::ATTR_NUMBER_OF_PERIODS => self.number_of_periods = value.to_u16()?,
            _ => return Err(no_attribute("DemandRegister", index)),
        }
        Ok(())
    }
}
