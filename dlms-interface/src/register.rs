//! Register interface class (Class ID: 3)
//!
//! # Attributes
//!
//! - Attribute 1: logical_name
//! - Attribute 2: value
//! - Attribute 3: scaler_unit
//!
//! # Methods
//!
//! - Method 1: reset

use crate::attributes::{CosemAttributes, no_attribute};
use crate::scaler_unit::ScalerUnit;
use dlms_core::{DataObject, DataType, DlmsResult};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Register {
    pub value: DataObject,
    pub scaler_unit: ScalerUnit,
}

impl Register {
    pub const CLASS_ID: u16 = 3;
    pub const ATTR_VALUE: u8 = 2;
    pub const ATTR_SCALER_UNIT: u8 = 3;
    pub const METHOD_RESET: u8 = 1;

    pub fn new(value: DataObject, scaler_unit: ScalerUnit) -> Self {
        Self { value, scaler_unit }
    }

    /// Value with the scaler applied
    pub fn scaled_value(&self) -> DlmsResult<f64> {
        self.scaler_unit.scale(&self.value)
    }
}

impl CosemAttributes for Register {
    fn attribute_count(&self) -> u8 {
        3
    }

    fn method_count(&self) -> u8 {
        1
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataType> {
        match index {
            Self::ATTR_VALUE => Ok(self.value.data_type()),
            Self::ATTR_SCALER_UNIT => Ok(DataType::Structure),
            _ => Err(no_attribute("Register", index)),
        }
    }

    fn get_value(&self, index: u8) -> DlmsResult<DataObject> {
        match index {
            Self::ATTR_VALUE => Ok(self.value.clone()),
            Self::ATTR_SCALER_UNIT => Ok(self.scaler_unit.to_data_object()),
            _ => Err(no_attribute("Register", index)),
        }
    }

    fn set_value(&mut self, index: u8, value: DataObject) -> DlmsResult<()> {
        match index {
            Self::ATTR_VALUE => self.value = value,
            Self::ATTR_SCALER_UNIT => self.scaler_unit = ScalerUnit::from_data_object(&value)?,
            _ => return Err(no_attribute("Register", index)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaler_unit::units;

    #[test]
    fn test_register_attributes() {
        let mut register = Register::default();
        register.set_value(2, DataObject::Unsigned32(12345)).unwrap();
        register
            .set_value(3, ScalerUnit::new(-3, units::WATT_HOUR).to_data_object())
            .unwrap();
        assert_eq!(register.get_value(2).unwrap(), DataObject::Unsigned32(12345));
        assert!((register.scaled_value().unwrap() - 12.345).abs() < 1e-9);
        assert_eq!(register.data_type(3).unwrap(), DataType::Structure);
    }

    #[test]
    fn test_register_rejects_bad_scaler() {
        let mut register = Register::default();
        assert!(register.set_value(3, DataObject::Unsigned8(1)).is_err());
        assert!(register.set_value(4, DataObject::Null).is_err());
    }
}
