//! Push Setup interface class (Class ID: 40)
//!
//! Lists the objects a device pushes and where it sends them.

use crate::attributes::{CosemAttributes, array_items, no_attribute, structure_of};
use crate::profile_generic::CaptureObject;
use dlms_core::{DataObject, DataType, DlmsResult};

/// Transport, destination and message type of pushed data
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SendDestinationAndMethod {
    pub transport_service: u8,
    pub destination: Vec<u8>,
    pub message: u8,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PushSetup {
    pub push_object_list: Vec<CaptureObject>,
    pub send_destination_and_method: SendDestinationAndMethod,
    /// (start, end) date-time pairs
    pub communication_window: Vec<(DataObject, DataObject)>,
    pub randomisation_start_interval: u16,
    pub number_of_retries: u8,
    pub repetition_delay: u16,
}

impl PushSetup {
    pub const CLASS_ID: u16 = 40;
    pub const ATTR_PUSH_OBJECT_LIST: u8 = 2;
    pub const ATTR_SEND_DESTINATION_AND_METHOD: u8 = 3;
    pub const ATTR_COMMUNICATION_WINDOW: u8 = 4;
    pub const ATTR_RANDOMISATION_START_INTERVAL: u8 = 5;
    pub const ATTR_NUMBER_OF_RETRIES: u8 = 6;
    pub const ATTR_REPETITION_DELAY: u8 = 7;
    pub const METHOD_PUSH: u8 = 1;
}

impl CosemAttributes for PushSetup {
    fn attribute_count(&self) -> u8 {
        7
    }

    fn method_count(&self) -> u8 {
        1
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataType> {
        match index {
            Self::ATTR_PUSH_OBJECT_LIST | Self::ATTR_COMMUNICATION_WINDOW => Ok(DataType::Array),
            Self::ATTR_SEND_DESTINATION_AND_METHOD => Ok(DataType::Structure),
            Self::ATTR_RANDOMISATION_START_INTERVAL | Self::ATTR_REPETITION_DELAY => {
                Ok(DataType::LongUnsigned)
            }
            Self::ATTR_NUMBER_OF_RETRIES => Ok(DataType::Unsigned),
            _ => Err(no_attribute("PushSetup", index)),
        }
    }

    fn get_value(&self, index: u8) -> DlmsResult<DataObject> {
        Ok(match index {
            Self::ATTR_PUSH_OBJECT_LIST => DataObject::Array(
                self.push_object_list
                    .iter()
                    .map(CaptureObject::to_data_object)
                    .collect(),
            ),
            Self::ATTR_SEND_DESTINATION_AND_METHOD => {
                let target = &self.send_destination_and_method;
                DataObject::Structure(vec![
                    DataObject::Enumerate(target.transport_service),
                    DataObject::OctetString(target.destination.clone()),
                    DataObject::Enumerate(target.message),
                ])
            }
            Self::ATTR_COMMUNICATION_WINDOW => DataObject::Array(
                self.communication_window
                    .iter()
                    .map(|(start, end)| DataObject::Structure(vec![start.clone(), end.clone()]))
                    .collect(),
            ),
            Self::ATTR_RANDOMISATION_START_INTERVAL => {
                DataObject::Unsigned16(self.randomisation_start_interval)
            }
            Self::ATTR_NUMBER_OF_RETRIES => DataObject::Unsigned8(self.number_of_retries),
            Self::ATTR_REPETITION_DELAY => DataObject::Unsigned16(self.repetition_delay),
            _ => return Err(no_attribute("PushSetup", index)),
        })
    }

    fn set_value(&mut self, index: u8, value: DataObject) -> DlmsResult<()> {
        match index {
            Self::ATTR_PUSH_OBJECT_LIST => {
                self.push_object_list = array_items(&value)?
                    .iter()
                    .map(CaptureObject::from_data_object)
                    .collect::<DlmsResult<_>>()?;
            }
            Self::ATTR_SEND_DESTINATION_AND_METHOD => {
                let fields = structure_of(&value, 3)?;
                self.send_destination_and_method = SendDestinationAndMethod {
                    transport_service: fields[0].to_u8()?,
                    destination: fields[1].as_bytes()?.to_vec(),
                    message: fields[2].to_u8()?,
                };
            }
            Self::ATTR_COMMUNICATION_WINDOW => {
                self.communication_window = array_items(&value)?
                    .iter()
                    .map(|item| {
                        let fields = structure_of(item, 2)?;
                        Ok((fields[0].clone(), fields[1].clone()))
                    })
                    .collect::<DlmsResult<_>>()?;
            }
            Self::ATTR_RANDOMISATION_START_INTERVAL => {
                self.randomisation_start_interval = value.to_u16()?
            }
            Self::ATTR_NUMBER_OF_RETRIES => self.number_of_retries = value.to_u8()?,
            Self::ATTR_REPETITION_DELAY => self.repetition_delay = value.to_u16()?,
            _ => return Err(no_attribute("PushSetup", index)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_type::ObjectType;

    #[test]
    fn test_push_object_list() {
        let mut push = PushSetup::default();
        let list = DataObject::Array(vec![DataObject::Structure(vec![
            DataObject::Unsigned16(1),
            DataObject::OctetString(vec![0, 0, 96, 1, 0, 255]),
            DataObject::Integer8(2),
            DataObject::Unsigned16(0),
        ])]);
        push.set_value(2, list.clone()).unwrap();
        assert_eq!(push.push_object_list[0].object.object_type(), ObjectType::Data);
        assert_eq!(push.get_value(2).unwrap(), list);
    }

    #[test]
    fn test_destination() {
        let mut push = PushSetup::default();
        let destination = DataObject::Structure(vec![
            DataObject::Enumerate(0),
            DataObject::OctetString(b"10.0.0.1:4059".to_vec()),
            DataObject::Enumerate(0),
        ]);
        push.set_value(3, destination.clone()).unwrap();
        assert_eq!(push.send_destination_and_method.destination, b"10.0.0.1:4059".to_vec());
        assert_eq!(push.get_value(3).unwrap(), destination);
        assert!(push.set_value(3, DataObject::Structure(vec![])).is_err());
    }
}
