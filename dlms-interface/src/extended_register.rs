//! Extended Register interface class (Class ID: 4)
//!
//! A register that also records a status and the time the value was
//! captured.

use crate::attributes::{CosemAttributes, no_attribute};
use crate::scaler_unit::ScalerUnit;
use dlms_core::{DataObject, DataType, DlmsResult};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtendedRegister {
    pub value: DataObject,
    pub scaler_unit: ScalerUnit,
    pub status: DataObject,
    /// Capture time, usually a 12-byte date-time octet string
    pub capture_time: DataObject,
}

impl ExtendedRegister {
    pub const CLASS_ID: u16 = 4;
    pub const ATTR_VALUE: u8 = 2;
    pub const ATTR_SCALER_UNIT: u8 = 3;
    pub const ATTR_STATUS: u8 = 4;
    pub const ATTR_CAPTURE_TIME: u8 = 5;

    pub fn scaled_value(&self) -> DlmsResult<f64> {
        self.scaler_unit.scale(&self.value)
    }
}

impl CosemAttributes for ExtendedRegister {
    fn attribute_count(&self) -> u8 {
        5
    }

    fn method_count(&self) -> u8 {
        1
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataType> {
        match index {
            Self::ATTR_VALUE => Ok(self.value.data_type()),
            Self::ATTR_SCALER_UNIT => Ok(DataType::Structure),
            Self::ATTR_STATUS => Ok(self.status.data_type()),
            Self::ATTR_CAPTURE_TIME => Ok(DataType::OctetString),
            _ => Err(no_attribute("ExtendedRegister", index)),
        }
    }

    fn get_value(&self, index: u8) -> DlmsResult<DataObject> {
        match index {
            Self::ATTR_VALUE => Ok(self.value.clone()),
            Self::ATTR_SCALER_UNIT => Ok(self.scaler_unit.to_data_object()),
            Self::ATTR_STATUS => Ok(self.status.clone()),
            Self::ATTR_CAPTURE_TIME => Ok(self.capture_time.clone()),
            _ => Err(no_attribute("ExtendedRegister", index)),
        }
    }

    fn set_value(&mut self, index: u8, value: DataObject) -> DlmsResult<()> {
        match index {
            Self::ATTR_VALUE => self.value = value,
            Self::ATTR_SCALER_UNIT => self.scaler_unit = ScalerUnit::from_data_object(&value)?,
            Self::ATTR_STATUS => self.status = value,
            Self::ATTR_CAPTURE_TIME => self.capture_time = value,
            _ => return Err(no_attribute("ExtendedRegister", index)),
        }
        Ok(())
    }
}
