//! Fallback for classes without typed behaviour

use crate::attributes::{CosemAttributes, no_attribute};
use dlms_core::{DataObject, DataType, DlmsResult};
use std::collections::BTreeMap;

/// Raw attribute values by index
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenericObject {
    values: BTreeMap<u8, DataObject>,
}

impl GenericObject {
    pub fn values(&self) -> impl Iterator<Item = (u8, &DataObject)> {
        self.values.iter().map(|(index, value)| (*index, value))
    }
}

impl CosemAttributes for GenericObject {
    /// Highest index seen so far (at least the logical name)
    fn attribute_count(&self) -> u8 {
        self.values.keys().next_back().copied().unwrap_or(1).max(1)
    }

    fn method_count(&self) -> u8 {
        0
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataType> {
        Ok(self
            .values
            .get(&index)
            .map(DataObject::data_type)
            .unwrap_or_default())
    }

    fn get_value(&self, index: u8) -> DlmsResult<DataObject> {
        self.values
            .get(&index)
            .cloned()
            .ok_or_else(|| no_attribute("Generic object", index))
    }

    fn set_value(&mut self, index: u8, value: DataObject) -> DlmsResult<()> {
        self.values.insert(index, value);
        Ok(())
    }
}
