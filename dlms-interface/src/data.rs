//! Data interface class (Class ID: 1)
//!
//! The simplest COSEM class: a single value of any type.
//!
//! # Attributes
//!
//! - Attribute 1: logical_name
//! - Attribute 2: value

use crate::attributes::{CosemAttributes, no_attribute};
use dlms_core::{DataObject, DataType, DlmsResult};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Data {
    pub value: DataObject,
}

impl Data {
    pub const CLASS_ID: u16 = 1;
    pub const ATTR_VALUE: u8 = 2;

    pub fn new(value: DataObject) -> Self {
        Self { value }
    }
}

impl CosemAttributes for Data {
    fn attribute_count(&self) -> u8 {
        2
    }

    fn method_count(&self) -> u8 {
        0
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataType> {
        match index {
            Self::ATTR_VALUE => Ok(self.value.data_type()),
            _ => Err(no_attribute("Data", index)),
        }
    }

    fn get_value(&self, index: u8) -> DlmsResult<DataObject> {
        match index {
            Self::ATTR_VALUE => Ok(self.value.clone()),
            _ => Err(no_attribute("Data", index)),
        }
    }

    fn set_value(&mut self, index: u8, value: DataObject) -> DlmsResult<()> {
        match index {
            Self::ATTR_VALUE => {
                self.value = value;
                Ok(())
            }
            _ => Err(no_attribute("Data", index)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_attribute() {
        let mut data = Data::default();
        assert_eq!(data.data_type(2).unwrap(), DataType::NullData);
        data.set_value(2, DataObject::Unsigned32(7)).unwrap();
        assert_eq!(data.get_value(2).unwrap(), DataObject::Unsigned32(7));
        assert_eq!(data.data_type(2).unwrap(), DataType::DoubleLongUnsigned);
        assert!(data.get_value(3).is_err());
    }
}
