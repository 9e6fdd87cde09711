//! M-Bus Master Port Setup interface class (Class ID: 74)

use crate::attributes::{CosemAttributes, no_attribute};
use crate::iec_hdlc_setup::BaudRate;
use dlms_core::{DataObject, DataType, DlmsResult};

#[derive(Debug, Clone, PartialEq)]
pub struct MBusMasterPortSetup {
    pub communication_speed: BaudRate,
}

impl Default for MBusMasterPortSetup {
    fn default() -> Self {
        Self {
            communication_speed: BaudRate::Baud2400,
        }
    }
}

impl MBusMasterPortSetup {
    pub const CLASS_ID: u16 = 74;
    pub const ATTR_COMM_SPEED: u8 = 2;
}

impl CosemAttributes for MBusMasterPortSetup {
    fn attribute_count(&self) -> u8 {
        2
    }

    fn method_count(&self) -> u8 {
        0
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataType> {
        match index {
            Self::ATTR_COMM_SPEED => Ok(DataType::Enum),
            _ => Err(no_attribute("MBusMasterPortSetup", index)),
        }
    }

    fn get_value(&self, index: u8) -> DlmsResult<DataObject> {
        match index {
            Self::ATTR_COMM_SPEED => Ok(DataObject::Enumerate(self.communication_speed.code())),
            _ => Err(no_attribute("MBusMasterPortSetup", index)),
        }
    }

    fn set_value(&mut self, index: u8, value: DataObject) -> DlmsResult<()> {
        match index {
            Self::ATTR_COMM_SPEED => {
                self.communication_speed = BaudRate::from_code(value.to_u8()?)?;
                Ok(())
            }
            _ => Err(no_attribute("MBusMasterPortSetup", index)),
        }
    }
}
