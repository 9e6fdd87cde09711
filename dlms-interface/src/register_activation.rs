//! Register Activation interface class (Class ID: 6)
//!
//! Selects which registers are active through named masks.

use crate::attributes::{CosemAttributes, array_items, no_attribute, obis_from, obis_to, structure_of};
use crate::object_type::ObjectType;
use dlms_core::{DataObject, DataType, DlmsResult, ObisCode};

/// Named mask: indexes into the register assignment list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterMask {
    pub name: Vec<u8>,
    pub indexes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegisterActivation {
    pub register_assignment: Vec<(ObjectType, ObisCode)>,
    pub mask_list: Vec<RegisterMask>,
    pub active_mask: Vec<u8>,
}

impl RegisterActivation {
    pub const CLASS_ID: u16 = 6;
    pub const ATTR_REGISTER_ASSIGNMENT: u8 = 2;
    pub const ATTR_MASK_LIST: u8 = 3;
    pub const ATTR_ACTIVE_MASK: u8 = 4;

    fn encode_assignment(&self) -> DataObject {
        DataObject::Array(
            self.register_assignment
                .iter()
                .map(|(object_type, name)| {
                    DataObject::Structure(vec![
                        DataObject::Unsigned16(object_type.class_id()),
                        obis_to(name),
                    ])
                })
                .collect(),
        )
    }

    fn encode_masks(&self) -> DataObject {
        DataObject::Array(
            self.mask_list
                .iter()
                .map(|mask| {
                    DataObject::Structure(vec![
                        DataObject::OctetString(mask.name.clone()),
                        DataObject::Array(
                            mask.indexes.iter().map(|i| DataObject::Unsigned8(*i)).collect(),
                        ),
                    ])
                })
                .collect(),
        )
    }
}

impl CosemAttributes for RegisterActivation {
    fn attribute_count(&self) -> u8 {
        4
    }

    fn method_count(&self) -> u8 {
        3
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataType> {
        match index {
            Self::ATTR_REGISTER_ASSIGNMENT | Self::ATTR_MASK_LIST => Ok(DataType::Array),
            Self::ATTR_ACTIVE_MASK => Ok(DataType::OctetString),
            _ => Err(no_attribute("RegisterActivation", index)),
        }
    }

    fn get_value(&self, index: u8) -> DlmsResult<DataObject> {
        match index {
            Self::ATTR_REGISTER_ASSIGNMENT => Ok(self.encode_assignment()),
            Self::ATTR_MASK_LIST => Ok(self.encode_masks()),
            Self::ATTR_ACTIVE_MASK => Ok(DataObject::OctetString(self.active_mask.clone())),
            _ => Err(no_attribute("RegisterActivation", index)),
        }
    }

    fn set_value(&mut self, index: u8, value: DataObject) -> DlmsResult<()> {
        match index {
            Self::ATTR_REGISTER_ASSIGNMENT => {
                self.register_assignment = array_items(&value)?
                    .iter()
                    .map(|item| {
                        let fields = structure_of(item, 2)?;
                        Ok((
                            ObjectType::from_class_id(fields[0].to_u16()?),
                            obis_from(&fields[1])?,
                        ))
                    })
                    .collect::<DlmsResult<_>>()?;
            }
            Self::ATTR_MASK_LIST => {
                self.mask_list = array_items(&value)?
                    .iter()
                    .map(|item| {
                        let fields = structure_of(item, 2)?;
                        Ok(RegisterMask {
                            name: fields[0].as_bytes()?.to_vec(),
                            indexes: array_items(&fields[1])?
                                .iter()
                                .map(DataObject::to_u8)
                                .collect::<DlmsResult<_>>()?,
                        })
                    })
                    .collect::<DlmsResult<_>>()?;
            }
            Self::ATTR_ACTIVE_MASK => {
                self.active_mask = match value {
                    DataObject::Null => Vec::new(),
                    other => other.as_bytes()?.to_vec(),
                };
            }
            _ => return Err(no_attribute("RegisterActivation", index)),
        }
        Ok(())
    }
}
