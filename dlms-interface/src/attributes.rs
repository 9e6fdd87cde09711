//! Uniform attribute access shared by every object kind

use dlms_core::{DataObject, DataType, DlmsError, DlmsResult, ObisCode};

/// Get/set of typed attribute values by index
///
/// Attribute 1 (the logical name) is owned by [`crate::CosemObject`];
/// implementors only see indexes from 2 upwards.
pub trait CosemAttributes {
    /// Number of attributes, logical name included
    fn attribute_count(&self) -> u8;

    fn method_count(&self) -> u8;

    /// Wire type of an attribute, [`DataType::None`] when it varies
    fn data_type(&self, index: u8) -> DlmsResult<DataType>;

    fn get_value(&self, index: u8) -> DlmsResult<DataObject>;

    fn set_value(&mut self, index: u8, value: DataObject) -> DlmsResult<()>;
}

pub(crate) fn no_attribute(kind: &str, index: u8) -> DlmsError {
    DlmsError::Argument(format!("{} has no attribute {}", kind, index))
}

/// Six-byte logical name carried in an octet string
pub(crate) fn obis_from(value: &DataObject) -> DlmsResult<ObisCode> {
    ObisCode::from_bytes(value.as_bytes()?)
}

pub(crate) fn obis_to(code: &ObisCode) -> DataObject {
    DataObject::OctetString(code.to_bytes().to_vec())
}

/// Elements of an array, with `Null` read as an empty array
pub(crate) fn array_items(value: &DataObject) -> DlmsResult<&[DataObject]> {
    match value {
        DataObject::Null => Ok(&[]),
        DataObject::Array(items) => Ok(items),
        other => Err(DlmsError::InvalidData(format!(
            "Expected Array, got {:?}",
            other.data_type()
        ))),
    }
}

/// Fields of a structure with exactly `count` elements
pub(crate) fn structure_of(value: &DataObject, count: usize) -> DlmsResult<&[DataObject]> {
    let fields = value.as_structure()?;
    if fields.len() != count {
        return Err(DlmsError::InvalidData(format!(
            "Expected a structure of {} elements, got {}",
            count,
            fields.len()
        )));
    }
    Ok(fields)
}
