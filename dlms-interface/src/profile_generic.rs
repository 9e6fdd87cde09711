//! Profile Generic interface class (Class ID: 7)
//!
//! A history table. The capture objects define its columns and the buffer
//! holds the rows.
//!
//! # Attributes
//!
//! - Attribute 2: buffer
//! - Attribute 3: capture_objects
//! - Attribute 4: capture_period (seconds)
//! - Attribute 5: sort_method
//! - Attribute 6: sort_object
//! - Attribute 7: entries_in_use
//! - Attribute 8: profile_entries
//!
//! # Methods
//!
//! - Method 1: reset
//! - Method 2: capture

use crate::attributes::{CosemAttributes, array_items, no_attribute, obis_from, obis_to, structure_of};
use crate::object::CosemObject;
use crate::object_type::ObjectType;
use dlms_core::{DataObject, DataType, DlmsError, DlmsResult};

/// Column of a profile: which attribute (and element) of which object
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureObject {
    pub object: CosemObject,
    pub attribute_index: i8,
    /// 0 for the whole attribute, otherwise the element of a structure
    pub data_index: u16,
}

impl CaptureObject {
    pub fn new(object: CosemObject, attribute_index: i8, data_index: u16) -> Self {
        Self {
            object,
            attribute_index,
            data_index,
        }
    }

    /// Decode `structure { class_id, logical_name, attribute_index, data_index }`
    pub fn from_data_object(value: &DataObject) -> DlmsResult<Self> {
        let fields = structure_of(value, 4)?;
        let object = CosemObject::from_class_id(fields[0].to_u16()?, obis_from(&fields[1])?);
        let attribute_index = fields[2].to_i128()?;
        let attribute_index = i8::try_from(attribute_index).map_err(|_| {
            DlmsError::OutOfRange(format!("Attribute index {} does not fit in i8", attribute_index))
        })?;
        Ok(Self::new(object, attribute_index, fields[3].to_u16()?))
    }

    pub fn to_data_object(&self) -> DataObject {
        DataObject::Structure(vec![
            DataObject::Unsigned16(self.object.class_id()),
            obis_to(&self.object.logical_name()),
            DataObject::Integer8(self.attribute_index),
            DataObject::Unsigned16(self.data_index),
        ])
    }
}

/// Order of the buffer rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMethod {
    #[default]
    Fifo,
    Lifo,
    Largest,
    Smallest,
    NearestToZero,
    FarthestFromZero,
}

impl SortMethod {
    pub fn from_code(code: u8) -> DlmsResult<Self> {
        Ok(match code {
            1 => SortMethod::Fifo,
            2 => SortMethod::Lifo,
            3 => SortMethod::Largest,
            4 => SortMethod::Smallest,
            5 => SortMethod::NearestToZero,
            6 => SortMethod::FarthestFromZero,
            _ => {
                return Err(DlmsError::InvalidData(format!(
                    "Invalid sort method {}",
                    code
                )))
            }
        })
    }

    pub fn code(&self) -> u8 {
        match self {
            SortMethod::Fifo => 1,
            SortMethod::Lifo => 2,
            SortMethod::Largest => 3,
            SortMethod::Smallest => 4,
            SortMethod::NearestToZero => 5,
            SortMethod::FarthestFromZero => 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileGeneric {
    /// Rows, each usually a structure with one element per capture object
    pub buffer: Vec<DataObject>,
    pub capture_objects: Vec<CaptureObject>,
    pub capture_period: u32,
    pub sort_method: SortMethod,
    pub sort_object: Option<Box<CaptureObject>>,
    pub entries_in_use: u32,
    pub profile_entries: u32,
}

impl ProfileGeneric {
    pub const CLASS_ID: u16 = 7;
    pub const ATTR_BUFFER: u8 = 2;
    pub const ATTR_CAPTURE_OBJECTS: u8 = 3;
    pub const ATTR_CAPTURE_PERIOD: u8 = 4;
    pub const ATTR_SORT_METHOD: u8 = 5;
    pub const ATTR_SORT_OBJECT: u8 = 6;
    pub const ATTR_ENTRIES_IN_USE: u8 = 7;
    pub const ATTR_PROFILE_ENTRIES: u8 = 8;

    /// First capture object of the given class, used as the default sort
    /// column for range reads
    pub fn first_column_of(&self, object_type: ObjectType) -> Option<&CaptureObject> {
        self.capture_objects
            .iter()
            .find(|column| column.object.object_type() == object_type)
    }
}

impl CosemAttributes for ProfileGeneric {
    fn attribute_count(&self) -> u8 {
        8
    }

    fn method_count(&self) -> u8 {
        4
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataType> {
        match index {
            Self::ATTR_BUFFER | Self::ATTR_CAPTURE_OBJECTS => Ok(DataType::Array),
            Self::ATTR_CAPTURE_PERIOD | Self::ATTR_ENTRIES_IN_USE | Self::ATTR_PROFILE_ENTRIES => {
                Ok(DataType::DoubleLongUnsigned)
            }
            Self::ATTR_SORT_METHOD => Ok(DataType::Enum),
            Self::ATTR_SORT_OBJECT => Ok(DataType::Structure),
            _ => Err(no_attribute("ProfileGeneric", index)),
        }
    }

    fn get_value(&self, index: u8) -> DlmsResult<DataObject> {
        Ok(match index {
            Self::ATTR_BUFFER => DataObject::Array(self.buffer.clone()),
            Self::ATTR_CAPTURE_OBJECTS => DataObject::Array(
                self.capture_objects
                    .iter()
                    .map(CaptureObject::to_data_object)
                    .collect(),
            ),
            Self::ATTR_CAPTURE_PERIOD => DataObject::Unsigned32(self.capture_period),
            Self::ATTR_SORT_METHOD => DataObject::Enumerate(self.sort_method.code()),
            Self::ATTR_SORT_OBJECT => match &self.sort_object {
                Some(column) => column.to_data_object(),
                None => DataObject::Null,
            },
            Self::ATTR_ENTRIES_IN_USE => DataObject::Unsigned32(self.entries_in_use),
            Self::ATTR_PROFILE_ENTRIES => DataObject::Unsigned32(self.profile_entries),
            _ => return Err(no_attribute("ProfileGeneric", index)),
        })
    }

    fn set_value(&mut self, index: u8, value: DataObject) -> DlmsResult<()> {
        match index {
            Self::ATTR_BUFFER => self.buffer = array_items(&value)?.to_vec(),
            Self::ATTR_CAPTURE_OBJECTS => {
                self.capture_objects = array_items(&value)?
                    .iter()
                    .map(CaptureObject::from_data_object)
                    .collect::<DlmsResult<_>>()?;
            }
            Self::ATTR_CAPTURE_PERIOD => self.capture_period = value.to_u32()?,
            Self::ATTR_SORT_METHOD => self.sort_method = SortMethod::from_code(value.to_u8()?)?,
            Self::ATTR_SORT_OBJECT => {
                self.sort_object = match value {
                    DataObject::Null => None,
                    other => {
                        let column = CaptureObject::from_data_object(&other)?;
                        (column.object.class_id() != 0).then(|| Box::new(column))
                    }
                };
            }
            Self::ATTR_ENTRIES_IN_USE => self.entries_in_use = value.to_u32()?,
            Self::ATTR_PROFILE_ENTRIES => self.profile_entries = value.to_u32()?,
            _ => return Err(no_attribute("ProfileGeneric", index)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlms_core::ObisCode;

    fn column(class_id: u16, ln: [u8; 6], attribute: i8) -> DataObject {
        DataObject::Structure(vec![
            DataObject::Unsigned16(class_id),
            DataObject::OctetString(ln.to_vec()),
            DataObject::Integer8(attribute),
            DataObject::Unsigned16(0),
        ])
    }

    #[test]
    fn test_capture_objects() {
        let mut profile = ProfileGeneric::default();
        let columns = DataObject::Array(vec![
            column(8, [0, 0, 1, 0, 0, 255], 2),
            column(3, [1, 0, 1, 8, 0, 255], 2),
        ]);
        profile.set_value(3, columns.clone()).unwrap();
        assert_eq!(profile.capture_objects.len(), 2);
        assert_eq!(profile.capture_objects[1].object.object_type(), ObjectType::Register);
        assert_eq!(profile.get_value(3).unwrap(), columns);
        assert_eq!(
            profile.first_column_of(ObjectType::Clock).unwrap().object.logical_name(),
            ObisCode::new(0, 0, 1, 0, 0, 255)
        );
    }

    #[test]
    fn test_sort_object_and_method() {
        let mut profile = ProfileGeneric::default();
        profile.set_value(5, DataObject::Enumerate(2)).unwrap();
        assert_eq!(profile.sort_method, SortMethod::Lifo);
        profile.set_value(6, column(0, [0; 6], 0)).unwrap();
        assert!(profile.sort_object.is_none());
        profile.set_value(6, column(8, [0, 0, 1, 0, 0, 255], 2)).unwrap();
        let sort = profile.sort_object.as_deref().unwrap();
        assert_eq!(sort.object.class_id(), 8);
        assert_eq!(profile.get_value(6).unwrap(), column(8, [0, 0, 1, 0, 0, 255], 2));
        assert!(profile.set_value(5, DataObject::Enumerate(9)).is_err());
    }

    #[test]
    fn test_buffer_and_counters() {
        let mut profile = ProfileGeneric::default();
        let rows = DataObject::Array(vec![DataObject::Structure(vec![DataObject::Unsigned32(1)])]);
        profile.set_value(2, rows.clone()).unwrap();
        profile.set_value(7, DataObject::Unsigned32(1)).unwrap();
        profile.set_value(8, DataObject::Unsigned32(1000)).unwrap();
        assert_eq!(profile.get_value(2).unwrap(), rows);
        assert_eq!(profile.get_value(8).unwrap(), DataObject::Unsigned32(1000));
        assert!(profile.set_value(2, DataObject::Unsigned8(0)).is_err());
    }
}
