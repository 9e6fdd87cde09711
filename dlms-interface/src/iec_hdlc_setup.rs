//! IEC HDLC Setup interface class (Class ID: 23)
//!
//! # Attributes
//!
//! - Attribute 2: comm_speed
//! - Attribute 3: window_size_transmit
//! - Attribute 4: window_size_receive
//! - Attribute 5: max_info_field_length_transmit
//! - Attribute 6: max_info_field_length_receive
//! - Attribute 7: inter_octet_time_out (ms)
//! - Attribute 8: inactivity_time_out (s)
//! - Attribute 9: device_address

use crate::attributes::{CosemAttributes, no_attribute};
use dlms_core::{DataObject, DataType, DlmsError, DlmsResult};

/// Serial communication speed, as its enum code on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaudRate {
    Baud300,
    Baud600,
    Baud1200,
    Baud2400,
    Baud4800,
    #[default]
    Baud9600,
    Baud19200,
    Baud38400,
    Baud57600,
    Baud115200,
}

impl BaudRate {
    pub fn from_code(code: u8) -> DlmsResult<Self> {
        Ok(match code {
            0 => BaudRate::Baud300,
            1 => BaudRate::Baud600,
            2 => BaudRate::Baud1200,
            3 => BaudRate::Baud2400,
            4 => BaudRate::Baud4800,
            5 => BaudRate::Baud9600,
            6 => BaudRate::Baud19200,
            7 => BaudRate::Baud38400,
            8 => BaudRate::Baud57600,
            9 => BaudRate::Baud115200,
            _ => return Err(DlmsError::InvalidData(format!("Invalid baud rate code {}", code))),
        })
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn bits_per_second(&self) -> u32 {
        match self {
            BaudRate::Baud300 => 300,
            BaudRate::Baud600 => 600,
            BaudRate::Baud1200 => 1200,
            BaudRate::Baud2400 => 2400,
            BaudRate::Baud4800 => 4800,
            BaudRate::Baud9600 => 9600,
            BaudRate::Baud19200 => 19200,
            BaudRate::Baud38400 => 38400,
            BaudRate::Baud57600 => 57600,
            BaudRate::Baud115200 => 115200,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IecHdlcSetup {
    pub communication_speed: BaudRate,
    pub window_size_transmit: u8,
    pub window_size_receive: u8,
    pub max_info_length_transmit: u16,
    pub max_info_length_receive: u16,
    pub inter_octet_time_out: u16,
    pub inactivity_time_out: u16,
    pub device_address: u16,
}

impl Default for IecHdlcSetup {
    fn default() -> Self {
        Self {
            communication_speed: BaudRate::Baud9600,
            window_size_transmit: 1,
            window_size_receive: 1,
            max_info_length_transmit: 128,
            max_info_length_receive: 128,
            inter_octet_time_out: 0,
            inactivity_time_out: 0,
            device_address: 0,
        }
    }
}

impl IecHdlcSetup {
    pub const CLASS_ID: u16 = 23;
    pub const ATTR_COMM_SPEED: u8 = 2;
    pub const ATTR_WINDOW_SIZE_TRANSMIT: u8 = 3;
    pub const ATTR_WINDOW_SIZE_RECEIVE: u8 = 4;
    pub const ATTR_MAX_INFO_LENGTH_TRANSMIT: u8 = 5;
    pub const ATTR_MAX_INFO_LENGTH_RECEIVE: u8 = 6;
    pub const ATTR_INTER_OCTET_TIME_OUT: u8 = 7;
    pub const ATTR_INACTIVITY_TIME_OUT: u8 = 8;
    pub const ATTR_DEVICE_ADDRESS: u8 = 9;
}

impl CosemAttributes for IecHdlcSetup {
    fn attribute_count(&self) -> u8 {
        9
    }

    fn method_count(&self) -> u8 {
        0
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataType> {
        match index {
            Self::ATTR_COMM_SPEED => Ok(DataType::Enum),
            Self::ATTR_WINDOW_SIZE_TRANSMIT | Self::ATTR_WINDOW_SIZE_RECEIVE => Ok(DataType::Unsigned),
            Self::ATTR_MAX_INFO_LENGTH_TRANSMIT
            | Self::ATTR_MAX_INFO_LENGTH_RECEIVE
            | Self::ATTR_INTER_OCTET_TIME_OUT
            | Self::ATTR_INACTIVITY_TIME_OUT
            | Self::ATTR_DEVICE_ADDRESS => Ok(DataType::LongUnsigned),
            _ => Err(no_attribute("IecHdlcSetup", index)),
        }
    }

    fn get_value(&self, index: u8) -> DlmsResult<DataObject> {
        Ok(match index {
            Self::ATTR_COMM_SPEED => DataObject::Enumerate(self.communication_speed.code()),
            Self::ATTR_WINDOW_SIZE_TRANSMIT => DataObject::Unsigned8(self.window_size_transmit),
            Self::ATTR_WINDOW_SIZE_RECEIVE => DataObject::Unsigned8(self.window_size_receive),
            Self::ATTR_MAX_INFO_LENGTH_TRANSMIT => DataObject::Unsigned16(self.max_info_length_transmit),
            Self::ATTR_MAX_INFO_LENGTH_RECEIVE => DataObject::Unsigned16(self.max_info_length_receive),
            Self::ATTR_INTER_OCTET_TIME_OUT => DataObject::Unsigned16(self.inter_octet_time_out),
            Self::ATTR_INACTIVITY_TIME_OUT => DataObject::Unsigned16(self.inactivity_time_out),
            Self::ATTR_DEVICE_ADDRESS => DataObject::Unsigned16(self.device_address),
            _ => return Err(no_attribute("IecHdlcSetup", index)),
        })
    }

    fn set_value(&mut self, index: u8, value: DataObject) -> DlmsResult<()> {
        match index {
            Self::ATTR_COMM_SPEED => self.communication_speed = BaudRate::from_code(value.to_u8()?)?,
            Self::ATTR_WINDOW_SIZE_TRANSMIT => self.window_size_transmit = value.to_u8()?,
            Self::ATTR_WINDOW_SIZE_RECEIVE => self.window_size_receive = value.to_u8()?,
            Self::ATTR_MAX_INFO_LENGTH_TRANSMIT => self.max_info_length_transmit = value.to_u16()?,
            Self::ATTR_MAX_INFO_LENGTH_RECEIVE => self.max_info_length_receive = value.to_u16()?,
            Self::ATTR_INTER_OCTET_TIME_OUT => self.inter_octet_time_out = value.to_u16()?,
            Self::ATTR_INACTIVITY_TIME_OUT => self.inactivity_time_out = value.to_u16()?,
            Self::ATTR_DEVICE_ADDRESS => self.device_address = value.to_u16()?,
            _ => return Err(no_attribute("IecHdlcSetup", index)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let setup = IecHdlcSetup::default();
        assert_eq!(setup.communication_speed.bits_per_second(), 9600);
        assert_eq!(setup.get_value(3).unwrap(), DataObject::Unsigned8(1));
        assert_eq!(setup.get_value(5).unwrap(), DataObject::Unsigned16(128));
    }

    #[test]
    fn test_set_values() {
        let mut setup = IecHdlcSetup::default();
        setup.set_value(2, DataObject::Enumerate(6)).unwrap();
        setup.set_value(6, DataObject::Unsigned16(256)).unwrap();
        assert_eq!(setup.communication_speed, BaudRate::Baud19200);
        assert_eq!(setup.max_info_length_receive, 256);
        assert!(setup.set_value(2, DataObject::Enumerate(10)).is_err());
        assert!(setup.set_value(3, DataObject::Unsigned16(300)).is_err());
    }
}
