//! Value coercion
//!
//! Received values are decoded with their own tags. Devices often send
//! dates, times and identifiers as plain octet strings; when an attribute
//! declares a presentation type, [`change_type`] reinterprets the bytes.

use dlms_asn1::{AxdrDecoder, decode_from_slice};
use dlms_core::{DataObject, DataType, DlmsError, DlmsResult};
use dlms_interface::CosemObject;
use log::trace;

fn is_text(data_type: DataType) -> bool {
    matches!(
        data_type,
        DataType::OctetString | DataType::VisibleString | DataType::Utf8String
    )
}

/// Reinterpret raw bytes as `data_type`
///
/// - [`DataType::None`] renders the bytes as upper-case hex text.
/// - Empty input for a text type gives an empty visible string.
/// - [`DataType::OctetString`] renders the bytes as dotted decimals,
///   the way logical names are written.
///
/// # Errors
///
/// Returns `DlmsError::OutOfRange` when the bytes hold more than one
/// value of the requested type.
pub fn change_type(value: &[u8], data_type: DataType) -> DlmsResult<DataObject> {
    if data_type == DataType::None {
        return Ok(DataObject::VisibleString(hex::encode_upper(value).into_bytes()));
    }
    if value.is_empty() && is_text(data_type) {
        return Ok(DataObject::VisibleString(Vec::new()));
    }
    match data_type {
        DataType::OctetString => {
            let dotted = value
                .iter()
                .map(|b| b.to_string())
                .collect::<Vec<_>>()
                .join(".");
            Ok(DataObject::VisibleString(dotted.into_bytes()))
        }
        DataType::VisibleString => Ok(DataObject::VisibleString(value.to_vec())),
        DataType::Utf8String => Ok(DataObject::Utf8String(value.to_vec())),
        _ => {
            let mut decoder = AxdrDecoder::new(value);
            let decoded = decoder.decode_value(data_type)?;
            if !decoder.is_exhausted() {
                return Err(DlmsError::OutOfRange(format!(
                    "{} bytes left after decoding {:?}",
                    decoder.remaining(),
                    data_type
                )));
            }
            Ok(decoded)
        }
    }
}

/// Decode one tagged value; empty data is null
pub fn get_value(data: &[u8]) -> DlmsResult<DataObject> {
    if data.is_empty() {
        return Ok(DataObject::Null);
    }
    Ok(decode_from_slice(data)?.0)
}

/// Store a received value in an object
///
/// Octet strings are first converted to the attribute's UI data type
/// when one is declared. Returns the stored value.
pub fn update_value(object: &mut CosemObject, index: u8, value: DataObject) -> DlmsResult<DataObject> {
    let ui_type = object.ui_data_type(index);
    let value = match value {
        DataObject::OctetString(bytes) if ui_type != DataType::None => change_type(&bytes, ui_type)?,
        other => other,
    };
    trace!("{} attribute {} = {}", object, index, value);
    object.set_value(index, value.clone())?;
    Ok(value)
}

/// Decode one value per `(object, attribute)` pair from a list reply
///
/// `data` holds the values back to back, as in
/// [`ReplyData::data`](crate::ReplyData) of a with-list reply.
pub fn update_values<'a, I>(targets: I, data: &[u8]) -> DlmsResult<Vec<DataObject>>
where
    I: IntoIterator<Item = (&'a mut CosemObject, u8)>,
{
    let mut decoder = AxdrDecoder::new(data);
    let mut values = Vec::new();
    for (object, index) in targets {
        let value = decoder.decode_data_object()?;
        values.push(update_value(object, index, value)?);
    }
    Ok(values)
}
