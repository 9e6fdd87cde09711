//! Ordered collection of the objects known in a session

use crate::object::CosemObject;
use crate::object_type::ObjectType;
use dlms_core::ObisCode;
use log::debug;

/// Objects in discovery order, unique on (type, logical name)
#[derive(Debug, Clone, Default)]
pub struct ObjectRegistry {
    objects: Vec<CosemObject>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object unless one with the same type and logical name is
    /// already present; the existing object is kept untouched
    ///
    /// Returns whether the object was added.
    pub fn add(&mut self, object: CosemObject) -> bool {
        if self
            .find_by_ln(object.object_type(), &object.logical_name())
            .is_some()
        {
            debug!("Ignoring duplicate object {}", object);
            return false;
        }
        self.objects.push(object);
        true
    }

    /// Add every object, returning how many were new
    pub fn extend<I: IntoIterator<Item = CosemObject>>(&mut self, objects: I) -> usize {
        let mut added = 0;
        for object in objects {
            if self.add(object) {
                added += 1;
            }
        }
        added
    }

    pub fn find_by_ln(&self, object_type: ObjectType, logical_name: &ObisCode) -> Option<&CosemObject> {
        self.objects
            .iter()
            .find(|o| o.object_type() == object_type && o.logical_name() == *logical_name)
    }

    pub fn find_by_ln_mut(
        &mut self,
        object_type: ObjectType,
        logical_name: &ObisCode,
    ) -> Option<&mut CosemObject> {
        self.objects
            .iter_mut()
            .find(|o| o.object_type() == object_type && o.logical_name() == *logical_name)
    }

    pub fn find_by_sn(&self, short_name: u16) -> Option<&CosemObject> {
        self.objects.iter().find(|o| o.short_name() == short_name)
    }

    pub fn find_by_type(&self, object_type: ObjectType) -> impl Iterator<Item = &CosemObject> {
        self.objects
            .iter()
            .filter(move |o| o.object_type() == object_type)
    }

    pub fn get(&self, index: usize) -> Option<&CosemObject> {
        self.objects.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CosemObject> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, CosemObject> {
        self.objects.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

impl<'a> IntoIterator for &'a ObjectRegistry {
    type Item = &'a CosemObject;
    type IntoIter = std::slice::Iter<'a, CosemObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlms_core::DataObject;

    fn register(c: u8) -> CosemObject {
        CosemObject::new(ObjectType::Register, ObisCode::new(1, 0, c, 8, 0, 255))
    }

    #[test]
    fn test_duplicates_are_ignored_not_merged() {
        let mut registry = ObjectRegistry::new();
        let mut first = register(1);
        first.set_value(2, DataObject::Unsigned32(1)).unwrap();
        assert!(registry.add(first));

        let mut duplicate = register(1);
        duplicate.set_value(2, DataObject::Unsigned32(2)).unwrap();
        assert!(!registry.add(duplicate));

        assert_eq!(registry.len(), 1);
        let kept = registry
            .find_by_ln(ObjectType::Register, &ObisCode::new(1, 0, 1, 8, 0, 255))
            .unwrap();
        assert_eq!(kept.get_value(2).unwrap(), DataObject::Unsigned32(1));
    }

    #[test]
    fn test_same_name_different_type() {
        let mut registry = ObjectRegistry::new();
        registry.add(register(1));
        registry.add(CosemObject::new(ObjectType::Data, ObisCode::new(1, 0, 1, 8, 0, 255)));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find_by_type(ObjectType::Data).count(), 1);
    }

    #[test]
    fn test_extend_and_find_by_sn() {
        let mut registry = ObjectRegistry::new();
        let objects = vec![
            CosemObject::with_short_name(ObjectType::Clock, ObisCode::new(0, 0, 1, 0, 0, 255), 0x2BC0),
            register(1),
            register(1),
        ];
        assert_eq!(registry.extend(objects), 2);
        assert_eq!(registry.find_by_sn(0x2BC0).unwrap().object_type(), ObjectType::Clock);
        assert!(registry.find_by_sn(0x1000).is_none());
        assert_eq!(registry.iter().count(), 2);
    }
}
