//! Association SN interface class (Class ID: 12)
//!
//! Current association of a short-name server. Attribute 2 is the object
//! list the client reads to discover the device; it is kept raw here and
//! decoded by the client's directory parser.

use crate::attributes::{CosemAttributes, array_items, no_attribute, obis_from, obis_to};
use dlms_core::{DataObject, DataType, DlmsResult, ObisCode};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssociationShortName {
    pub object_list: Vec<DataObject>,
    pub access_rights_list: DataObject,
    pub security_setup_reference: Option<ObisCode>,
}

impl AssociationShortName {
    pub const CLASS_ID: u16 = 12;
    /// Base name every short-name server uses for its association object
    pub const BASE_NAME: u16 = 0xFA00;
    pub const ATTR_OBJECT_LIST: u8 = 2;
    pub const ATTR_ACCESS_RIGHTS_LIST: u8 = 3;
    pub const ATTR_SECURITY_SETUP_REFERENCE: u8 = 4;
    pub const METHOD_CHANGE_HLS_SECRET: u8 = 7;
    pub const METHOD_REPLY_TO_HLS_AUTHENTICATION: u8 = 8;
}

impl CosemAttributes for AssociationShortName {
    fn attribute_count(&self) -> u8 {
        4
    }

    fn method_count(&self) -> u8 {
        8
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataType> {
        match index {
            Self::ATTR_OBJECT_LIST | Self::ATTR_ACCESS_RIGHTS_LIST => Ok(DataType::Array),
            Self::ATTR_SECURITY_SETUP_REFERENCE => Ok(DataType::OctetString),
            _ => Err(no_attribute("AssociationShortName", index)),
        }
    }

    fn get_value(&self, index: u8) -> DlmsResult<DataObject> {
        Ok(match index {
            Self::ATTR_OBJECT_LIST => DataObject::Array(self.object_list.clone()),
            Self::ATTR_ACCESS_RIGHTS_LIST => self.access_rights_list.clone(),
            Self::ATTR_SECURITY_SETUP_REFERENCE => match &self.security_setup_reference {
                Some(name) => obis_to(name),
                None => DataObject::Null,
            },
            _ => return Err(no_attribute("AssociationShortName", index)),
        })
    }

    fn set_value(&mut self, index: u8, value: DataObject) -> DlmsResult<()> {
        match index {
            Self::ATTR_OBJECT_LIST => self.object_list = array_items(&value)?.to_vec(),
            Self::ATTR_ACCESS_RIGHTS_LIST => self.access_rights_list = value,
            Self::ATTR_SECURITY_SETUP_REFERENCE => {
                self.security_setup_reference = match value {
                    DataObject::Null => None,
                    other => Some(obis_from(&other)?),
                };
            }
            _ => return Err(no_attribute("AssociationShortName", index)),
        }
        Ok(())
    }
}
