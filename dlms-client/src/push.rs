//! Push notification decoding
//!
//! A push carries one value shaped as
//! `{ array of { class_id, logical_name [, attribute] }, array of values }`.
//! The Nth identity receives the Nth value.

use crate::coercion::{get_value, update_value};
use crate::session::Session;
use dlms_core::{DataObject, DlmsError, DlmsResult, ObisCode};
use dlms_interface::CosemObject;
use log::{debug, warn};

/// Attribute updated when an identity does not name one
const DEFAULT_PUSH_ATTRIBUTE: u8 = 2;

fn identity(value: &DataObject) -> DlmsResult<(u16, ObisCode, u8)> {
    let fields = value.as_list()?;
    if fields.len() < 2 {
        return Err(DlmsError::ProtocolDecode(format!(
            "Push object identity has {} fields",
            fields.len()
        )));
    }
    let class_id = (fields[0].to_i128()? & 0xFFFF) as u16;
    let logical_name = ObisCode::from_bytes(fields[1].as_bytes()?)?;
    let attribute = match fields.get(2) {
        Some(index) => index.to_u8()?,
        None => DEFAULT_PUSH_ATTRIBUTE,
    };
    Ok((class_id, logical_name, attribute))
}

impl Session {
    /// Decode a push notification body and apply its values
    ///
    /// Objects already in the registry are updated in place, others are
    /// added. Returns each pushed object with the attribute it received.
    ///
    /// # Errors
    ///
    /// `DlmsError::ProtocolDecode` when the identity and value lists
    /// differ in length or have the wrong shape.
    pub fn parse_push(&mut self, data: &[u8], only_known: bool) -> DlmsResult<Vec<(CosemObject, u8)>> {
        let value = get_value(data)?;
        let parts = value.as_list()?;
        if parts.len() != 2 {
            return Err(DlmsError::ProtocolDecode(format!(
                "Push data has {} parts, expected identities and values",
                parts.len()
            )));
        }
        let identities = parts[0].as_list()?;
        let values = parts[1].as_list()?;
        if identities.len() != values.len() {
            return Err(DlmsError::ProtocolDecode(format!(
                "{} push identities for {} values",
                identities.len(),
                values.len()
            )));
        }

        let mut pushed = Vec::with_capacity(identities.len());
        for (identity_value, value) in identities.iter().zip(values) {
            let (class_id, logical_name, attribute) = identity(identity_value)?;
            if class_id == 0 {
                continue;
            }
            let mut object = CosemObject::from_class_id(class_id, logical_name);
            if only_known && !object.is_known() {
                warn!("Unknown push object: class {} {}", class_id, logical_name);
                continue;
            }
            let object_type = object.object_type();
            let object = match self.objects_mut().find_by_ln_mut(object_type, &logical_name) {
                Some(known) => {
                    update_value(known, attribute, value.clone())?;
                    known.clone()
                }
                None => {
                    update_value(&mut object, attribute, value.clone())?;
                    self.objects_mut().add(object.clone());
                    object
                }
            };
            pushed.push((object, attribute));
        }
        debug!("Push notification updated {} object(s)", pushed.len());
        Ok(pushed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use dlms_asn1::encode_to_vec;
    use dlms_core::DataType;
    use dlms_interface::ObjectType;

    fn ln(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8) -> DataObject {
        DataObject::OctetString(vec![a, b, c, d, e, f])
    }

    fn push(identities: Vec<DataObject>, values: Vec<DataObject>) -> Vec<u8> {
        encode_to_vec(&DataObject::Structure(vec![
            DataObject::Array(identities),
            DataObject::Array(values),
        ]))
        .unwrap()
    }

    fn id(class_id: u16, name: DataObject, attribute: Option<i8>) -> DataObject {
        let mut fields = vec![DataObject::Unsigned16(class_id), name];
        if let Some(attribute) = attribute {
            fields.push(DataObject::Integer8(attribute));
        }
        DataObject::Structure(fields)
    }

    #[test]
    fn test_values_zip_positionally() {
        let data = push(
            vec![
                id(1, ln(0, 0, 96, 1, 0, 255), None),
                id(3, ln(1, 0, 1, 8, 0, 255), Some(2)),
            ],
            vec![
                DataObject::OctetString(b"LGZ1".to_vec()),
                DataObject::Unsigned32(1200),
            ],
        );
        let mut session = Session::new(SessionConfig::default());
        let pushed = session.parse_push(&data, false).unwrap();
        assert_eq!(pushed.len(), 2);
        assert_eq!(pushed[0].0.object_type(), ObjectType::Data);
        assert_eq!(pushed[0].1, 2);
        assert_eq!(pushed[0].0.get_value(2).unwrap(), DataObject::OctetString(b"LGZ1".to_vec()));
        assert_eq!(pushed[1].0.get_value(2).unwrap(), DataObject::Unsigned32(1200));
        assert_eq!(session.objects().len(), 2);
    }

    #[test]
    fn test_registered_object_is_updated() {
        let mut session = Session::new(SessionConfig::default());
        let mut serial = CosemObject::new(ObjectType::Data, ObisCode::new(0, 0, 96, 1, 0, 255));
        serial.set_ui_data_type(2, DataType::VisibleString);
        session.objects_mut().add(serial);

        let data = push(
            vec![id(1, ln(0, 0, 96, 1, 0, 255), Some(2))],
            vec![DataObject::OctetString(b"LGZ1".to_vec())],
        );
        let pushed = session.parse_push(&data, false).unwrap();
        assert_eq!(pushed[0].0.get_value(2).unwrap(), DataObject::new_text("LGZ1"));
        assert_eq!(session.objects().len(), 1);
        assert_eq!(
            session.objects().get(0).unwrap().get_value(2).unwrap(),
            DataObject::new_text("LGZ1")
        );
    }

    #[test]
    fn test_unknown_and_empty_classes() {
        let data = push(
            vec![
                id(0, ln(0, 0, 0, 0, 0, 0), None),
                id(9, ln(0, 0, 10, 0, 0, 255), Some(1)),
                id(1, ln(0, 0, 96, 1, 0, 255), None),
            ],
            vec![
                DataObject::Null,
                ln(0, 0, 10, 0, 0, 255),
                DataObject::Unsigned8(1),
            ],
        );
        let mut session = Session::new(SessionConfig::default());
        let pushed = session.parse_push(&data, true).unwrap();
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].0.object_type(), ObjectType::Data);

        let mut session = Session::new(SessionConfig::default());
        assert_eq!(session.parse_push(&data, false).unwrap().len(), 2);
    }

    #[test]
    fn test_count_mismatch() {
        let data = push(
            vec![id(1, ln(0, 0, 96, 1, 0, 255), None)],
            vec![DataObject::Unsigned8(1), DataObject::Unsigned8(2)],
        );
        let mut session = Session::new(SessionConfig::default());
        assert!(matches!(
            session.parse_push(&data, false),
            Err(DlmsError::ProtocolDecode(_))
        ));
        assert!(session.objects().is_empty());
    }

    #[test]
    fn test_wrong_shape() {
        let data = encode_to_vec(&DataObject::Array(vec![DataObject::Array(Vec::new())])).unwrap();
        let mut session = Session::new(SessionConfig::default());
        assert!(matches!(
            session.parse_push(&data, false),
            Err(DlmsError::ProtocolDecode(_))
        ));
    }
}
