//! Association view and capture column parsing
//!
//! The object list of an association (attribute 2 of Association LN or
//! Association SN) is an array of structures:
//!
//! ```text
//! LN: { class_id, version, logical_name, access_rights }
//! SN: { base_name, class_id, version, logical_name }
//! access_rights: { array { attribute, access_mode, selectors },
//!                  array { method, access_mode | boolean } }
//! ```
//!
//! Every entry becomes a [`CosemObject`], is annotated from the OBIS
//! catalogue and is added to the session registry.

use crate::obis_catalog::ObisCatalog;
use crate::session::Session;
use dlms_asn1::AxdrDecoder;
use dlms_core::{DataObject, DataType, DlmsError, DlmsResult, ObisCode};
use dlms_interface::{AccessMode, AccessRights, CaptureObject, CosemObject, MethodAccessMode, ObjectType};
use log::{debug, warn};

const ARRAY_TAG: u8 = 0x01;

/// Attribute read for a capture column that reports index 0
const DEFAULT_VALUE_ATTRIBUTE: u8 = 2;

/// Read the array header and return the declared element count
fn array_header(decoder: &mut AxdrDecoder<'_>) -> DlmsResult<usize> {
    let tag = decoder.read_u8()?;
    if tag != ARRAY_TAG {
        return Err(DlmsError::ProtocolDecode(format!(
            "Expected an array, got tag 0x{:02X}",
            tag
        )));
    }
    decoder.decode_length()
}

/// Decode up to `count` structures of `fields` elements
///
/// A buffer that ends before `count` entries is accepted; some meters
/// report a wrong element count.
fn structures(data: &[u8], fields: usize) -> DlmsResult<Vec<Vec<DataObject>>> {
    let mut decoder = AxdrDecoder::new(data);
    let count = array_header(&mut decoder)?;
    let mut entries = Vec::with_capacity(count.min(256));
    for position in 0..count {
        if decoder.is_exhausted() {
            warn!("Array declares {} entries but ends after {}", count, position);
            break;
        }
        match decoder.decode_data_object()? {
            DataObject::Structure(items) if items.len() == fields => entries.push(items),
            other => {
                return Err(DlmsError::ProtocolDecode(format!(
                    "Invalid structure format at entry {}: {:?}",
                    position, other
                )))
            }
        }
    }
    Ok(entries)
}

/// 16-bit field; signed encodings are reinterpreted
fn word(value: &DataObject) -> DlmsResult<u16> {
    Ok((value.to_i128()? & 0xFFFF) as u16)
}

fn logical_name(value: &DataObject) -> DlmsResult<ObisCode> {
    ObisCode::from_bytes(value.as_bytes()?)
}

fn items(value: &DataObject) -> DlmsResult<&[DataObject]> {
    match value {
        DataObject::Null => Ok(&[]),
        other => other.as_list(),
    }
}

/// Decode `{ attribute_access, method_access }`
fn access_rights(value: &DataObject) -> DlmsResult<AccessRights> {
    let mut rights = AccessRights::new();
    if value.is_null() {
        return Ok(rights);
    }
    let lists = value.as_structure()?;
    if let Some(attributes) = lists.first() {
        for item in items(attributes)? {
            let fields = item.as_structure()?;
            if fields.len() < 2 {
                return Err(DlmsError::ProtocolDecode(format!(
                    "Attribute access item has {} fields",
                    fields.len()
                )));
            }
            rights.set_attribute(fields[0].to_u8()?, AccessMode::from_code(fields[1].to_u8()?)?);
        }
    }
    if let Some(methods) = lists.get(1) {
        for item in items(methods)? {
            let fields = item.as_structure()?;
            if fields.len() < 2 {
                return Err(DlmsError::ProtocolDecode(format!(
                    "Method access item has {} fields",
                    fields.len()
                )));
            }
            rights.set_method(fields[0].to_u8()?, MethodAccessMode::from_data_object(&fields[1])?);
        }
    }
    Ok(rights)
}

fn short_name_entry(fields: &[DataObject]) -> DlmsResult<Option<CosemObject>> {
    let base_name = word(&fields[0])?;
    if base_name == 0 {
        return Ok(None);
    }
    let class_id = word(&fields[1])?;
    let mut object = match &fields[3] {
        DataObject::OctetString(_) => CosemObject::with_short_name(
            ObjectType::from_class_id(class_id),
            logical_name(&fields[3])?,
            base_name,
        ),
        rights => {
            let mut object =
                CosemObject::with_short_name(ObjectType::from_class_id(class_id), ObisCode::default(), base_name);
            object.access_rights = access_rights(rights)?;
            object
        }
    };
    object.version = fields[2].to_u8()?;
    Ok(Some(object))
}

fn logical_name_entry(fields: &[DataObject]) -> DlmsResult<Option<CosemObject>> {
    let class_id = word(&fields[0])?;
    if class_id == 0 {
        return Ok(None);
    }
    let mut object = CosemObject::from_class_id(class_id, logical_name(&fields[2])?);
    object.version = fields[1].to_u8()?;
    object.access_rights = access_rights(&fields[3])?;
    Ok(Some(object))
}

impl Session {
    /// Decode an association object list into the registry
    ///
    /// With `only_known` set, classes without typed behaviour are dropped.
    /// Returns the parsed objects; objects already in the registry keep
    /// their state.
    ///
    /// # Errors
    ///
    /// `DlmsError::ProtocolDecode` when the data is not an array of
    /// four-element structures.
    pub fn parse_objects(&mut self, data: &[u8], only_known: bool) -> DlmsResult<Vec<CosemObject>> {
        let logical = self.is_logical_name();
        let catalog = ObisCatalog::standard();
        let mut objects = Vec::new();
        for fields in structures(data, 4)? {
            let object = if logical {
                logical_name_entry(&fields)?
            } else {
                short_name_entry(&fields)?
            };
            let Some(mut object) = object else {
                continue;
            };
            if only_known && !object.is_known() {
                warn!("Unknown object: class {} {}", object.class_id(), object);
                continue;
            }
            catalog.annotate(&mut object);
            objects.push(object);
        }
        let added = self.objects_mut().extend(objects.iter().cloned());
        debug!("Parsed {} object(s), {} new", objects.len(), added);
        Ok(objects)
    }

    /// Decode the capture objects of a profile
    ///
    /// Columns referring to a register already in the registry inherit
    /// its scaler, unit and presentation type.
    pub fn parse_capture_columns(&self, data: &[u8]) -> DlmsResult<Vec<CaptureObject>> {
        let catalog = ObisCatalog::standard();
        let mut columns = Vec::new();
        for fields in structures(data, 4)? {
            let mut column = CaptureObject::from_data_object(&DataObject::Structure(fields))?;
            catalog.annotate(&mut column.object);
            let index = match column.attribute_index {
                0 => DEFAULT_VALUE_ATTRIBUTE,
                index => u8::try_from(index).unwrap_or(DEFAULT_VALUE_ATTRIBUTE),
            };
            let known = self
                .objects()
                .find_by_ln(column.object.object_type(), &column.object.logical_name());
            if let Some(known) = known {
                if let Some(scaler_unit) = known.kind().scaler_unit() {
                    column.object.kind_mut().set_scaler_unit(scaler_unit);
                    let ui_type = known.ui_data_type(index);
                    if ui_type != DataType::None {
                        column.object.set_ui_data_type(index, ui_type);
                    }
                }
            }
            columns.push(column);
        }
        debug!("Parsed {} capture column(s)", columns.len());
        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use dlms_application::AddressingMethod;
    use dlms_asn1::encode_to_vec;
    use dlms_interface::ScalerUnit;

    fn ln(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8) -> DataObject {
        DataObject::OctetString(vec![a, b, c, d, e, f])
    }

    fn rights(attributes: &[(i8, u8)], methods: Vec<(i8, DataObject)>) -> DataObject {
        DataObject::Structure(vec![
            DataObject::Array(
                attributes
                    .iter()
                    .map(|(index, mode)| {
                        DataObject::Structure(vec![
                            DataObject::Integer8(*index),
                            DataObject::Enumerate(*mode),
                            DataObject::Null,
                        ])
                    })
                    .collect(),
            ),
            DataObject::Array(
                methods
                    .into_iter()
                    .map(|(index, mode)| DataObject::Structure(vec![DataObject::Integer8(index), mode]))
                    .collect(),
            ),
        ])
    }

    fn ln_entry(class_id: u16, version: u8, name: DataObject, access: DataObject) -> DataObject {
        DataObject::Structure(vec![
            DataObject::Unsigned16(class_id),
            DataObject::Unsigned8(version),
            name,
            access,
        ])
    }

    fn sn_entry(base_name: i16, class_id: u16, version: u8, name: DataObject) -> DataObject {
        DataObject::Structure(vec![
            DataObject::Integer16(base_name),
            DataObject::Unsigned16(class_id),
            DataObject::Unsigned8(version),
            name,
        ])
    }

    fn column(class_id: u16, name: DataObject, attribute: i8, data_index: u16) -> DataObject {
        DataObject::Structure(vec![
            DataObject::Unsigned16(class_id),
            name,
            DataObject::Integer8(attribute),
            DataObject::Unsigned16(data_index),
        ])
    }

    fn encode(entries: Vec<DataObject>) -> Vec<u8> {
        encode_to_vec(&DataObject::Array(entries)).unwrap()
    }

    fn ln_session() -> Session {
        Session::new(SessionConfig::default())
    }

    fn sn_session() -> Session {
        Session::new(SessionConfig::default().with_addressing(AddressingMethod::ShortName))
    }

    #[test]
    fn test_logical_name_view() {
        let data = encode(vec![
            ln_entry(
                8,
                0,
                ln(0, 0, 1, 0, 0, 255),
                rights(&[(1, 1), (2, 3)], vec![(1, DataObject::Enumerate(2))]),
            ),
            ln_entry(3, 0, ln(1, 0, 1, 8, 0, 255), rights(&[(2, 1)], Vec::new())),
            ln_entry(0, 0, ln(0, 0, 0, 0, 0, 0), DataObject::Null),
        ]);
        let mut session = ln_session();
        let objects = session.parse_objects(&data, false).unwrap();
        assert_eq!(objects.len(), 2);

        let clock = &objects[0];
        assert_eq!(clock.object_type(), ObjectType::Clock);
        assert_eq!(clock.logical_name(), ObisCode::new(0, 0, 1, 0, 0, 255));
        assert_eq!(clock.access_rights.attribute(1), AccessMode::Read);
        assert_eq!(clock.access_rights.attribute(2), AccessMode::ReadWrite);
        assert_eq!(clock.access_rights.method(1), MethodAccessMode::AuthenticatedAccess);
        assert_eq!(clock.description.as_deref(), Some("Clock"));

        assert_eq!(objects[1].description.as_deref(), Some("Energy register"));
        assert_eq!(session.objects().len(), 2);
    }

    #[test]
    fn test_legacy_method_access() {
        let data = encode(vec![ln_entry(
            70,
            0,
            ln(0, 0, 96, 3, 10, 255),
            rights(
                &[],
                vec![(1, DataObject::Boolean(true)), (2, DataObject::Boolean(false))],
            ),
        )]);
        let mut session = ln_session();
        let objects = session.parse_objects(&data, false).unwrap();
        assert_eq!(objects[0].access_rights.method(1), MethodAccessMode::Access);
        assert_eq!(objects[0].access_rights.method(2), MethodAccessMode::NoAccess);
    }

    #[test]
    fn test_short_name_view() {
        let data = encode(vec![
            sn_entry(0xFA00u16 as i16, 12, 0, ln(0, 0, 40, 0, 0, 255)),
            sn_entry(0x2000, 3, 0, ln(1, 0, 1, 8, 0, 255)),
            sn_entry(0, 1, 0, ln(0, 0, 96, 1, 0, 255)),
        ]);
        let mut session = sn_session();
        let objects = session.parse_objects(&data, false).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].short_name(), 0xFA00);
        assert_eq!(objects[0].object_type(), ObjectType::AssociationShortName);
        assert_eq!(objects[1].short_name(), 0x2000);
        assert_eq!(session.objects().find_by_sn(0x2000).unwrap().class_id(), 3);
    }

    #[test]
    fn test_short_name_view_with_access_rights() {
        let data = encode(vec![sn_entry(0x3000, 1, 0, rights(&[(2, 1)], Vec::new()))]);
        let mut session = sn_session();
        let objects = session.parse_objects(&data, false).unwrap();
        assert_eq!(objects[0].logical_name(), ObisCode::default());
        assert_eq!(objects[0].access_rights.attribute(2), AccessMode::Read);
    }

    #[test]
    fn test_only_known_objects() {
        let data = encode(vec![
            ln_entry(1, 0, ln(0, 0, 96, 1, 0, 255), DataObject::Null),
            ln_entry(9, 0, ln(0, 0, 10, 0, 0, 255), DataObject::Null),
        ]);
        let mut session = ln_session();
        assert_eq!(session.parse_objects(&data, true).unwrap().len(), 1);

        let mut session = ln_session();
        let objects = session.parse_objects(&data, false).unwrap();
        assert_eq!(objects.len(), 2);
        assert!(!objects[1].is_known());
    }

    #[test]
    fn test_truncated_count_is_tolerated() {
        let mut data = encode(vec![ln_entry(1, 0, ln(0, 0, 96, 1, 0, 255), DataObject::Null)]);
        data[1] = 3;
        let mut session = ln_session();
        assert_eq!(session.parse_objects(&data, false).unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_entries_fail() {
        let mut session = ln_session();
        let wrong_shape = encode(vec![DataObject::Structure(vec![
            DataObject::Unsigned16(1),
            DataObject::Unsigned8(0),
            ln(0, 0, 96, 1, 0, 255),
        ])]);
        assert!(matches!(
            session.parse_objects(&wrong_shape, false),
            Err(DlmsError::ProtocolDecode(_))
        ));
        let not_array = encode_to_vec(&DataObject::Unsigned8(1)).unwrap();
        assert!(matches!(
            session.parse_objects(&not_array, false),
            Err(DlmsError::ProtocolDecode(_))
        ));
        assert!(session.objects().is_empty());
    }

    #[test]
    fn test_existing_objects_are_kept() {
        let mut session = ln_session();
        let mut manual = CosemObject::new(ObjectType::Data, ObisCode::new(0, 0, 96, 1, 0, 255));
        manual.description = Some("Serial".to_string());
        session.objects_mut().add(manual);
        let data = encode(vec![ln_entry(1, 0, ln(0, 0, 96, 1, 0, 255), DataObject::Null)]);
        session.parse_objects(&data, false).unwrap();
        assert_eq!(session.objects().len(), 1);
        assert_eq!(
            session.objects().get(0).unwrap().description.as_deref(),
            Some("Serial")
        );
    }

    #[test]
    fn test_capture_columns() {
        let mut session = ln_session();
        let mut energy = CosemObject::new(ObjectType::Register, ObisCode::new(1, 0, 1, 8, 0, 255));
        energy.kind_mut().set_scaler_unit(ScalerUnit::new(-3, 30));
        energy.set_ui_data_type(2, DataType::Float64);
        session.objects_mut().add(energy);

        let data = encode(vec![
            column(8, ln(0, 0, 1, 0, 0, 255), 2, 0),
            column(3, ln(1, 0, 1, 8, 0, 255), 0, 0),
            column(3, ln(1, 0, 2, 8, 0, 255), 2, 0),
        ]);
        let columns = session.parse_capture_columns(&data).unwrap();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].object.object_type(), ObjectType::Clock);
        assert_eq!(columns[0].attribute_index, 2);

        assert_eq!(columns[1].attribute_index, 0);
        assert_eq!(columns[1].object.kind().scaler_unit(), Some(ScalerUnit::new(-3, 30)));
        assert_eq!(columns[1].object.ui_data_type(2), DataType::Float64);

        assert_eq!(columns[2].object.kind().scaler_unit(), Some(ScalerUnit::default()));
        assert_eq!(columns[2].object.ui_data_type(2), DataType::None);
        assert_eq!(session.objects().len(), 1);
    }
}
