//! Association LN interface class (Class ID: 15)
//!
//! # Attributes
//!
//! - Attribute 2: object_list
//! - Attribute 3: associated_partners_id
//! - Attribute 4: application_context_name
//! - Attribute 5: xdlms_context_info
//! - Attribute 6: authentication_mechanism_name
//! - Attribute 7: secret
//! - Attribute 8: association_status
//! - Attribute 9: security_setup_reference
//!
//! # Methods
//!
//! - Method 1: reply_to_HLS_authentication
//! - Method 2: change_HLS_secret
//! - Method 3: add_object
//! - Method 4: remove_object

use crate::attributes::{CosemAttributes, array_items, no_attribute, obis_from, obis_to, structure_of};
use dlms_core::{DataObject, DataType, DlmsError, DlmsResult, ObisCode};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssociationLogicalName {
    /// Raw object list entries, decoded by the client's directory parser
    pub object_list: Vec<DataObject>,
    pub client_sap: i8,
    pub server_sap: u16,
    pub application_context_name: DataObject,
    pub xdlms_context_info: DataObject,
    pub authentication_mechanism_name: DataObject,
    pub secret: Vec<u8>,
    pub association_status: u8,
    pub security_setup_reference: Option<ObisCode>,
}

impl AssociationLogicalName {
    pub const CLASS_ID: u16 = 15;
    /// Logical name of the current association
    pub const CURRENT: ObisCode = ObisCode::new(0, 0, 40, 0, 0, 255);
    pub const ATTR_OBJECT_LIST: u8 = 2;
    pub const ATTR_ASSOCIATED_PARTNERS_ID: u8 = 3;
    pub const ATTR_APPLICATION_CONTEXT_NAME: u8 = 4;
    pub const ATTR_XDLMS_CONTEXT_INFO: u8 = 5;
    pub const ATTR_AUTHENTICATION_MECHANISM_NAME: u8 = 6;
    pub const ATTR_SECRET: u8 = 7;
    pub const ATTR_ASSOCIATION_STATUS: u8 = 8;
    pub const ATTR_SECURITY_SETUP_REFERENCE: u8 = 9;
    pub const METHOD_REPLY_TO_HLS_AUTHENTICATION: u8 = 1;
    pub const METHOD_CHANGE_HLS_SECRET: u8 = 2;
}

impl CosemAttributes for AssociationLogicalName {
    fn attribute_count(&self) -> u8 {
        9
    }

    fn method_count(&self) -> u8 {
        4
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataType> {
        match index {
            Self::ATTR_OBJECT_LIST => Ok(DataType::Array),
            Self::ATTR_ASSOCIATED_PARTNERS_ID
            | Self::ATTR_APPLICATION_CONTEXT_NAME
            | Self::ATTR_XDLMS_CONTEXT_INFO
            | Self::ATTR_AUTHENTICATION_MECHANISM_NAME => Ok(DataType::Structure),
            Self::ATTR_SECRET | Self::ATTR_SECURITY_SETUP_REFERENCE => Ok(DataType::OctetString),
            Self::ATTR_ASSOCIATION_STATUS => Ok(DataType::Enum),
            _ => Err(no_attribute("AssociationLogicalName", index)),
        }
    }

    fn get_value(&self, index: u8) -> DlmsResult<DataObject> {
        Ok(match index {
            Self::ATTR_OBJECT_LIST => DataObject::Array(self.object_list.clone()),
            Self::ATTR_ASSOCIATED_PARTNERS_ID => DataObject::Structure(vec![
                DataObject::Integer8(self.client_sap),
                DataObject::Unsigned16(self.server_sap),
            ]),
            Self::ATTR_APPLICATION_CONTEXT_NAME => self.application_context_name.clone(),
            Self::ATTR_XDLMS_CONTEXT_INFO => self.xdlms_context_info.clone(),
            Self::ATTR_AUTHENTICATION_MECHANISM_NAME => self.authentication_mechanism_name.clone(),
            Self::ATTR_SECRET => DataObject::OctetString(self.secret.clone()),
            Self::ATTR_ASSOCIATION_STATUS => DataObject::Enumerate(self.association_status),
            Self::ATTR_SECURITY_SETUP_REFERENCE => match &self.security_setup_reference {
                Some(name) => obis_to(name),
                None => DataObject::Null,
            },
            _ => return Err(no_attribute("AssociationLogicalName", index)),
        })
    }

    fn set_value(&mut self, index: u8, value: DataObject) -> DlmsResult<()> {
        match index {
            Self::ATTR_OBJECT_LIST => self.object_list = array_items(&value)?.to_vec(),
            Self::ATTR_ASSOCIATED_PARTNERS_ID => {
                let fields = structure_of(&value, 2)?;
                let client = fields[0].to_i128()?;
                self.client_sap = i8::try_from(client).map_err(|_| {
                    DlmsError::OutOfRange(format!("Client SAP {} does not fit in i8", client))
                })?;
                self.server_sap = fields[1].to_u16()?;
            }
            Self::ATTR_APPLICATION_CONTEXT_NAME => self.application_context_name = value,
            Self::ATTR_XDLMS_CONTEXT_INFO => self.xdlms_context_info = value,
            Self::ATTR_AUTHENTICATION_MECHANISM_NAME => self.authentication_mechanism_name = value,
            Self::ATTR_SECRET => self.secret = value.as_bytes()?.to_vec(),
            Self::ATTR_ASSOCIATION_STATUS => self.association_status = value.to_u8()?,
            Self::ATTR_SECURITY_SETUP_REFERENCE => {
                self.security_setup_reference = match value {
                    DataObject::Null => None,
                    other => Some(obis_from(&other)?),
                };
            }
            _ => return Err(no_attribute("AssociationLogicalName", index)),
        }
        Ok(())
    }
}
