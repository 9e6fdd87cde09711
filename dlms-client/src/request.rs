//! Request PDU builder
//!
//! Every builder returns the frames of one request, ready for the
//! transport. LN requests address objects by class id and OBIS code, SN
//! requests by the 16-bit short name of the attribute or method.
//!
//! # LN layouts
//!
//! ```text
//! GET     C0 01 invoke | class(2) ln(6) attribute | 00 or 01 selector
//! SET     C1 01 invoke | class(2) ln(6) attribute 00 | value
//! ACTION  C3 01 invoke | class(2) ln(6) method | 00 or 01 value
//! ```
//!
//! # SN layouts
//!
//! ```text
//! READ    05 count | 02 sn(2)  or  04 sn(2) selector
//! WRITE   06 count | 02 sn(2) | count value
//! method  05 01 04 sn(2) | 00 or 01 value
//! ```

use crate::reply::MoreData;
use crate::session::Session;
use dlms_application::command::{request_type, tag, variable_access};
use dlms_application::{PduContext, ServiceRequest, attribute_short_name, method_short_name, parse_logical_name, split_pdu};
use dlms_asn1::{AxdrEncoder, encode_to_vec};
use dlms_core::{CosemDateTime, DataObject, DataType, DlmsError, DlmsResult, ObisCode};
use dlms_interface::{CosemObject, ImageTransfer, ObjectKind, ObjectType};
use dlms_session::InterfaceType;
use log::debug;

/// Buffer attribute of Profile Generic
const ATTR_BUFFER: u8 = 2;
const SELECTOR_RANGE: u8 = 1;
const SELECTOR_ENTRY: u8 = 2;

/// Clock used as the range column when the profile names none
const DEFAULT_CLOCK: ObisCode = ObisCode::new(0, 0, 1, 0, 0, 255);

/// Addressing identity of a request target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub object_type: ObjectType,
    pub logical_name: ObisCode,
    /// Base name; only used under SN addressing
    pub short_name: u16,
}

impl Target {
    pub fn new(object_type: ObjectType, logical_name: ObisCode, short_name: u16) -> Self {
        Self {
            object_type,
            logical_name,
            short_name,
        }
    }

    /// Target named by a dotted logical name such as `"0.0.1.0.0.255"`
    ///
    /// # Errors
    ///
    /// Returns `DlmsError::Argument` unless the name has six parts.
    pub fn logical(object_type: ObjectType, logical_name: &str) -> DlmsResult<Self> {
        Ok(Self::new(object_type, parse_logical_name(logical_name)?, 0))
    }

    pub fn short(object_type: ObjectType, short_name: u16) -> Self {
        Self::new(object_type, ObisCode::default(), short_name)
    }
}

impl From<&CosemObject> for Target {
    fn from(object: &CosemObject) -> Self {
        Self::new(object.object_type(), object.logical_name(), object.short_name())
    }
}

/// Selective access: selector and its parameters
#[derive(Debug, Clone, PartialEq)]
pub struct AccessSelector {
    pub selector: u8,
    pub parameters: DataObject,
}

impl AccessSelector {
    pub fn new(selector: u8, parameters: DataObject) -> Self {
        Self {
            selector,
            parameters,
        }
    }

    fn encode(&self) -> DlmsResult<Vec<u8>> {
        let mut bytes = vec![self.selector];
        bytes.extend(encode_to_vec(&self.parameters)?);
        Ok(bytes)
    }
}

/// One entry of a read list
#[derive(Debug, Clone, PartialEq)]
pub struct ReadItem {
    pub target: Target,
    pub attribute_index: u8,
    pub selector: Option<AccessSelector>,
}

impl ReadItem {
    pub fn new(target: impl Into<Target>, attribute_index: u8) -> Self {
        Self {
            target: target.into(),
            attribute_index,
            selector: None,
        }
    }

    pub fn with_selector(mut self, selector: AccessSelector) -> Self {
        self.selector = Some(selector);
        self
    }
}

/// One entry of a write list
#[derive(Debug, Clone, PartialEq)]
pub struct WriteItem {
    pub target: Target,
    pub attribute_index: u8,
    pub value: DataObject,
    /// [`DataType::None`] infers the type from the value
    pub data_type: DataType,
}

impl WriteItem {
    pub fn new(target: impl Into<Target>, attribute_index: u8, value: DataObject) -> Self {
        Self {
            target: target.into(),
            attribute_index,
            value,
            data_type: DataType::None,
        }
    }

    pub fn with_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }
}

fn check_attribute_index(index: u8) -> DlmsResult<()> {
    if index < 1 {
        return Err(DlmsError::Argument(
            "Attribute index must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Encode a value with its declared type, or the type of its shape
///
/// # Errors
///
/// Returns `DlmsError::Argument` for a null value without a declared type.
fn encode_value(value: &DataObject, data_type: DataType) -> DlmsResult<Vec<u8>> {
    let data_type = match data_type {
        DataType::None if value.is_null() => {
            return Err(DlmsError::Argument(
                "Cannot infer the type of a null value, declare it explicitly".to_string(),
            ))
        }
        DataType::None => value.data_type(),
        declared => declared,
    };
    let mut encoder = AxdrEncoder::new();
    encoder.encode_typed(data_type, value)?;
    Ok(encoder.into_bytes())
}

fn encode_ln_descriptor(encoder: &mut AxdrEncoder, target: &Target, index: u8) {
    encoder.encode_u16(target.object_type.class_id());
    encoder.encode_bytes(target.logical_name.as_bytes());
    encoder.encode_u8(index);
}

fn encode_selection(encoder: &mut AxdrEncoder, selector: Option<&AccessSelector>) -> DlmsResult<()> {
    match selector {
        Some(selector) => {
            encoder.encode_u8(0x01);
            encoder.encode_bytes(&selector.encode()?);
        }
        None => encoder.encode_u8(0x00),
    }
    Ok(())
}

fn encode_sn_read(encoder: &mut AxdrEncoder, target: &Target, index: u8, selector: Option<&AccessSelector>) -> DlmsResult<()> {
    let short_name = attribute_short_name(target.short_name, index)?;
    match selector {
        Some(selector) => {
            encoder.encode_u8(variable_access::PARAMETERIZED_ACCESS);
            encoder.encode_u16(short_name);
            encoder.encode_bytes(&selector.encode()?);
        }
        None => {
            encoder.encode_u8(variable_access::VARIABLE_NAME);
            encoder.encode_u16(short_name);
        }
    }
    Ok(())
}

fn image_transfer(object: &CosemObject) -> DlmsResult<&ImageTransfer> {
    match object.kind() {
        ObjectKind::ImageTransfer(image) => Ok(image),
        _ => Err(DlmsError::Argument(format!(
            "{} is not an image transfer object",
            object
        ))),
    }
}

impl Session {
    /// Read one attribute
    ///
    /// # Errors
    ///
    /// Returns `DlmsError::Argument` for attribute index 0.
    pub fn read(
        &mut self,
        target: impl Into<Target>,
        attribute_index: u8,
        selector: Option<&AccessSelector>,
    ) -> DlmsResult<Vec<Vec<u8>>> {
        check_attribute_index(attribute_index)?;
        let target = target.into();
        let mut descriptor = AxdrEncoder::new();
        let request = if self.is_logical_name() {
            encode_ln_descriptor(&mut descriptor, &target, attribute_index);
            encode_selection(&mut descriptor, selector)?;
            ServiceRequest::new(tag::GET_REQUEST, request_type::NORMAL, descriptor.into_bytes(), Vec::new())
        } else {
            descriptor.encode_u8(1);
            encode_sn_read(&mut descriptor, &target, attribute_index, selector)?;
            ServiceRequest::short_name(tag::READ_REQUEST, descriptor.into_bytes(), Vec::new())
        };
        debug!(
            "Read {} {} attribute {}",
            target.object_type, target.logical_name, attribute_index
        );
        self.send(request)
    }

    /// Read several attributes in one request
    pub fn read_list(&mut self, items: &[ReadItem]) -> DlmsResult<Vec<Vec<u8>>> {
        if items.is_empty() {
            return Err(DlmsError::Argument("Read list is empty".to_string()));
        }
        let mut descriptor = AxdrEncoder::new();
        descriptor.encode_length(items.len());
        for item in items {
            check_attribute_index(item.attribute_index)?;
            if self.is_logical_name() {
                encode_ln_descriptor(&mut descriptor, &item.target, item.attribute_index);
                encode_selection(&mut descriptor, item.selector.as_ref())?;
            } else {
                encode_sn_read(&mut descriptor, &item.target, item.attribute_index, item.selector.as_ref())?;
            }
        }
        let request = if self.is_logical_name() {
            ServiceRequest::new(tag::GET_REQUEST, request_type::WITH_LIST, descriptor.into_bytes(), Vec::new())
        } else {
            ServiceRequest::short_name(tag::READ_REQUEST, descriptor.into_bytes(), Vec::new())
        };
        self.send(request)
    }

    /// Write one attribute
    ///
    /// `data_type` of [`DataType::None`] takes the type from the value.
    /// LN writes larger than the negotiated PDU size go out in data blocks.
    pub fn write(
        &mut self,
        target: impl Into<Target>,
        attribute_index: u8,
        value: &DataObject,
        data_type: DataType,
    ) -> DlmsResult<Vec<Vec<u8>>> {
        check_attribute_index(attribute_index)?;
        let target = target.into();
        let encoded = encode_value(value, data_type)?;
        let mut descriptor = AxdrEncoder::new();
        let request = if self.is_logical_name() {
            encode_ln_descriptor(&mut descriptor, &target, attribute_index);
            descriptor.encode_u8(0x00);
            ServiceRequest::new(tag::SET_REQUEST, request_type::NORMAL, descriptor.into_bytes(), encoded)
        } else {
            descriptor.encode_u8(1);
            descriptor.encode_u8(variable_access::VARIABLE_NAME);
            descriptor.encode_u16(attribute_short_name(target.short_name, attribute_index)?);
            let mut data = vec![1];
            data.extend(encoded);
            ServiceRequest::short_name(tag::WRITE_REQUEST, descriptor.into_bytes(), data)
        };
        self.send(request)
    }

    /// Write several attributes in one request
    pub fn write_list(&mut self, items: &[WriteItem]) -> DlmsResult<Vec<Vec<u8>>> {
        if items.is_empty() {
            return Err(DlmsError::Argument("Write list is empty".to_string()));
        }
        let mut descriptor = AxdrEncoder::new();
        let mut data = AxdrEncoder::new();
        descriptor.encode_length(items.len());
        data.encode_length(items.len());
        for item in items {
            check_attribute_index(item.attribute_index)?;
            if self.is_logical_name() {
                encode_ln_descriptor(&mut descriptor, &item.target, item.attribute_index);
                descriptor.encode_u8(0x00);
            } else {
                descriptor.encode_u8(variable_access::VARIABLE_NAME);
                descriptor.encode_u16(attribute_short_name(item.target.short_name, item.attribute_index)?);
            }
            data.encode_bytes(&encode_value(&item.value, item.data_type)?);
        }
        let request = if self.is_logical_name() {
            ServiceRequest::new(
                tag::SET_REQUEST,
                request_type::SET_WITH_LIST,
                descriptor.into_bytes(),
                data.into_bytes(),
            )
        } else {
            ServiceRequest::short_name(tag::WRITE_REQUEST, descriptor.into_bytes(), data.into_bytes())
        };
        self.send(request)
    }

    /// Invoke a method
    ///
    /// Under SN addressing the method short name comes from the class
    /// method table; an index beyond the class's method count is an
    /// argument error.
    pub fn method(
        &mut self,
        target: impl Into<Target>,
        method_index: u8,
        value: Option<&DataObject>,
        data_type: DataType,
    ) -> DlmsResult<Vec<Vec<u8>>> {
        if method_index < 1 {
            return Err(DlmsError::Argument(
                "Method index must be at least 1".to_string(),
            ));
        }
        let target = target.into();
        let encoded = match value {
            Some(value) => encode_value(value, data_type)?,
            None => Vec::new(),
        };
        let mut descriptor = AxdrEncoder::new();
        let request = if self.is_logical_name() {
            encode_ln_descriptor(&mut descriptor, &target, method_index);
            ServiceRequest::new(tag::ACTION_REQUEST, request_type::NORMAL, descriptor.into_bytes(), encoded)
        } else {
            let (first_method, count) = target.object_type.short_name_methods();
            let short_name = method_short_name(target.short_name, first_method, count, method_index)?;
            descriptor.encode_u8(1);
            descriptor.encode_u8(variable_access::PARAMETERIZED_ACCESS);
            descriptor.encode_u16(short_name);
            let mut data = Vec::with_capacity(encoded.len() + 1);
            data.push(u8::from(!encoded.is_empty()));
            data.extend(encoded);
            ServiceRequest::short_name(tag::READ_REQUEST, descriptor.into_bytes(), data)
        };
        debug!(
            "Method {} of {} {}",
            method_index, target.object_type, target.logical_name
        );
        self.send(request)
    }

    /// Read `count` rows of a profile buffer starting at entry `start`
    ///
    /// Entries are numbered from 1; a count of 0 reads to the end.
    pub fn rows_by_entry(&mut self, profile: &CosemObject, start: u32, count: u32) -> DlmsResult<Vec<Vec<u8>>> {
        let first_column = u16::from(self.is_logical_name());
        let selector = AccessSelector::new(
            SELECTOR_ENTRY,
            DataObject::Structure(vec![
                DataObject::Unsigned32(start),
                DataObject::Unsigned32(count),
                DataObject::Unsigned16(first_column),
                DataObject::Unsigned16(0),
            ]),
        );
        self.read(profile, ATTR_BUFFER, Some(&selector))
    }

    /// Read the profile rows whose sort column lies between `start` and `end`
    ///
    /// The restricting column is `sort` when given, otherwise the
    /// profile's sort object, its first clock column, or the standard
    /// clock `0.0.1.0.0.255`.
    pub fn rows_by_range(
        &mut self,
        profile: &CosemObject,
        sort: Option<&CosemObject>,
        start: &CosemDateTime,
        end: &CosemDateTime,
    ) -> DlmsResult<Vec<Vec<u8>>> {
        let ObjectKind::ProfileGeneric(generic) = profile.kind() else {
            return Err(DlmsError::Argument(format!(
                "Range reads need a profile generic, got {}",
                profile.object_type()
            )));
        };
        let (class_id, logical_name, attribute, data_index) = match sort {
            Some(object) => (object.class_id(), object.logical_name(), 2, 0),
            None => match generic
                .sort_object
                .as_deref()
                .or_else(|| generic.first_column_of(ObjectType::Clock))
            {
                Some(column) => (
                    column.object.class_id(),
                    column.object.logical_name(),
                    column.attribute_index,
                    column.data_index,
                ),
                None => (ObjectType::Clock.class_id(), DEFAULT_CLOCK, 2, 0),
            },
        };
        let selector = AccessSelector::new(
            SELECTOR_RANGE,
            DataObject::Structure(vec![
                DataObject::Structure(vec![
                    DataObject::Unsigned16(class_id),
                    DataObject::OctetString(logical_name.to_bytes().to_vec()),
                    DataObject::Integer8(attribute),
                    DataObject::Unsigned16(data_index),
                ]),
                DataObject::OctetString(start.encode().to_vec()),
                DataObject::OctetString(end.encode().to_vec()),
                DataObject::Array(Vec::new()),
            ]),
        );
        self.read(profile, ATTR_BUFFER, Some(&selector))
    }

    /// Read the object list of the current association
    pub fn get_objects_request(&mut self) -> DlmsResult<Vec<Vec<u8>>> {
        let target = self.association_target();
        self.read(target, 2, None)
    }

    /// Frame that keeps an idle HDLC link alive
    ///
    /// Empty under the wrapper.
    pub fn keep_alive(&self) -> DlmsResult<Vec<u8>> {
        match self.config().interface_type {
            InterfaceType::Wrapper => Ok(Vec::new()),
            InterfaceType::Hdlc => self.control_frame(self.frame_sequence().receiver_ready_control(), Vec::new()),
        }
    }

    /// Ask for the rest of a reply
    ///
    /// [`MoreData::Frame`] sends an RR for the next HDLC segment,
    /// [`MoreData::Block`] asks for the block after the last one received.
    pub fn receiver_ready(&mut self, more: MoreData) -> DlmsResult<Vec<Vec<u8>>> {
        match more {
            MoreData::None => Ok(Vec::new()),
            MoreData::Frame => {
                let frame = self.keep_alive()?;
                Ok(if frame.is_empty() { Vec::new() } else { vec![frame] })
            }
            MoreData::Block => {
                let block = self.block_index();
                let request = if self.is_logical_name() {
                    ServiceRequest::new(tag::GET_REQUEST, request_type::NEXT, block.to_be_bytes().to_vec(), Vec::new())
                } else {
                    let block = u16::try_from(block).map_err(|_| {
                        DlmsError::OutOfRange(format!("Block number {} does not fit a READ request", block))
                    })?;
                    let mut descriptor = AxdrEncoder::new();
                    descriptor.encode_u8(1);
                    descriptor.encode_u8(variable_access::BLOCK_NUMBER_ACCESS);
                    descriptor.encode_u16(block);
                    ServiceRequest::short_name(tag::READ_REQUEST, descriptor.into_bytes(), Vec::new())
                };
                let context = PduContext {
                    logical_name: self.is_logical_name(),
                    max_pdu_size: self.max_pdu_size(),
                    invoke: self.invoke(self.last_invoke_id())?,
                };
                let pdus = split_pdu(&context, &request, self.cipher_mut())?;
                self.frame_pdus(pdus)
            }
        }
    }

    /// `image_transfer_initiate`
    ///
    /// # Errors
    ///
    /// Returns `DlmsError::Argument` when the image block size is 0; read
    /// attribute 2 first.
    pub fn image_transfer_initiate(
        &mut self,
        object: &CosemObject,
        identifier: &[u8],
        image_size: u32,
    ) -> DlmsResult<Vec<Vec<u8>>> {
        let parameters = image_transfer(object)?.initiate_parameters(identifier, image_size)?;
        self.method(object, ImageTransfer::METHOD_INITIATE, Some(&parameters), DataType::Structure)
    }

    /// `image_block_transfer` for every block of the image
    ///
    /// Returns one request per block, each as its list of frames.
    pub fn image_block_transfer(&mut self, object: &CosemObject, image: &[u8]) -> DlmsResult<Vec<Vec<Vec<u8>>>> {
        let blocks = image_transfer(object)?.block_parameters(image)?;
        blocks
            .iter()
            .map(|block| {
                self.method(object, ImageTransfer::METHOD_BLOCK_TRANSFER, Some(block), DataType::Structure)
            })
            .collect()
    }

    pub fn image_verify(&mut self, object: &CosemObject) -> DlmsResult<Vec<Vec<u8>>> {
        self.method(object, ImageTransfer::METHOD_VERIFY, Some(&DataObject::Integer8(0)), DataType::Integer)
    }

    pub fn image_activate(&mut self, object: &CosemObject) -> DlmsResult<Vec<Vec<u8>>> {
        self.method(object, ImageTransfer::METHOD_ACTIVATE, Some(&DataObject::Integer8(0)), DataType::Integer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use dlms_application::{AddressingMethod, InvokeIdAndPriority, Priority, ServiceClass, get_request_next};
    use dlms_interface::CaptureObject;
    use dlms_session::{HdlcFrame, strip_llc};

    fn ln_session() -> Session {
        Session::new(SessionConfig::default())
    }

    fn sn_session() -> Session {
        Session::new(SessionConfig::default().with_addressing(AddressingMethod::ShortName))
    }

    fn apdu(frame: &[u8]) -> Vec<u8> {
        let (frame, _) = HdlcFrame::decode(frame).unwrap();
        strip_llc(&frame.information).to_vec()
    }

    fn clock() -> Target {
        Target::logical(ObjectType::Clock, "0.0.1.0.0.255").unwrap()
    }

    #[test]
    fn test_ln_read() {
        let mut session = ln_session();
        let frames = session.read(clock(), 2, None).unwrap();
        assert_eq!(
            apdu(&frames[0]),
            vec![0xC0, 0x01, 0xC1, 0x00, 0x08, 0, 0, 1, 0, 0, 255, 0x02, 0x00]
        );
        let frames = session.read(clock(), 3, None).unwrap();
        assert_eq!(apdu(&frames[0])[2], 0xC2);
    }

    #[test]
    fn test_ln_read_rejects_attribute_zero() {
        let mut session = ln_session();
        assert!(matches!(session.read(clock(), 0, None), Err(DlmsError::Argument(_))));
    }

    #[test]
    fn test_logical_name_needs_six_parts() {
        assert!(matches!(
            Target::logical(ObjectType::Clock, "0.0.1.0.255"),
            Err(DlmsError::Argument(_))
        ));
        assert!(matches!(
            Target::logical(ObjectType::Data, "1.0.0.1.0.0.255"),
            Err(DlmsError::Argument(_))
        ));
    }

    #[test]
    fn test_sn_read_offsets() {
        let mut session = sn_session();
        let association = Target::short(ObjectType::AssociationShortName, 0xFA00);
        let frames = session.read(association, 2, None).unwrap();
        assert_eq!(apdu(&frames[0]), vec![0x05, 0x01, 0x02, 0xFA, 0x08]);
        let frames = session.read(association, 1, None).unwrap();
        assert_eq!(apdu(&frames[0]), vec![0x05, 0x01, 0x02, 0xFA, 0x00]);
    }

    #[test]
    fn test_sn_read_with_selector() {
        let mut session = sn_session();
        let profile = Target::short(ObjectType::ProfileGeneric, 0x3000);
        let selector = AccessSelector::new(2, DataObject::Unsigned8(1));
        let frames = session.read(profile, 2, Some(&selector)).unwrap();
        assert_eq!(
            apdu(&frames[0]),
            vec![0x05, 0x01, 0x04, 0x30, 0x08, 0x02, 0x11, 0x01]
        );
    }

    #[test]
    fn test_read_list() {
        let mut session = ln_session();
        assert!(matches!(session.read_list(&[]), Err(DlmsError::Argument(_))));

        let register = Target::logical(ObjectType::Register, "1.0.1.8.0.255").unwrap();
        let items = [ReadItem::new(clock(), 2), ReadItem::new(register, 3)];
        let frames = session.read_list(&items).unwrap();
        let bytes = apdu(&frames[0]);
        assert_eq!(&bytes[..4], &[0xC0, 0x03, 0xC1, 0x02]);
        assert_eq!(&bytes[4..14], &[0x00, 0x08, 0, 0, 1, 0, 0, 255, 0x02, 0x00]);
        assert_eq!(&bytes[14..], &[0x00, 0x03, 1, 0, 1, 8, 0, 255, 0x03, 0x00]);

        let mut session = sn_session();
        let items = [
            ReadItem::new(Target::short(ObjectType::Data, 0x1000), 2),
            ReadItem::new(Target::short(ObjectType::Register, 0x2000), 3),
        ];
        let frames = session.read_list(&items).unwrap();
        assert_eq!(
            apdu(&frames[0]),
            vec![0x05, 0x02, 0x02, 0x10, 0x08, 0x02, 0x20, 0x10]
        );
    }

    #[test]
    fn test_ln_write_infers_type() {
        let mut session = ln_session();
        let target = Target::logical(ObjectType::Data, "0.0.96.1.0.255").unwrap();
        let frames = session
            .write(target, 2, &DataObject::Unsigned16(0x1234), DataType::None)
            .unwrap();
        assert_eq!(
            apdu(&frames[0]),
            vec![0xC1, 0x01, 0xC1, 0x00, 0x01, 0, 0, 96, 1, 0, 255, 0x02, 0x00, 0x12, 0x12, 0x34]
        );
    }

    #[test]
    fn test_write_declared_type_and_null_inference() {
        let mut session = ln_session();
        let target = Target::logical(ObjectType::Data, "0.0.96.1.0.255").unwrap();
        let frames = session
            .write(target, 2, &DataObject::Unsigned8(5), DataType::LongUnsigned)
            .unwrap();
        assert!(apdu(&frames[0]).ends_with(&[0x12, 0x00, 0x05]));
        assert!(matches!(
            session.write(target, 2, &DataObject::Null, DataType::None),
            Err(DlmsError::Argument(_))
        ));
        session.write(target, 2, &DataObject::Null, DataType::NullData).unwrap();
    }

    #[test]
    fn test_sn_write() {
        let mut session = sn_session();
        let frames = session
            .write(Target::short(ObjectType::Data, 0x1000), 2, &DataObject::Boolean(true), DataType::None)
            .unwrap();
        assert_eq!(
            apdu(&frames[0]),
            vec![0x06, 0x01, 0x02, 0x10, 0x08, 0x01, 0x03, 0x01]
        );
    }

    #[test]
    fn test_write_list() {
        let mut session = ln_session();
        assert!(matches!(session.write_list(&[]), Err(DlmsError::Argument(_))));
        let target = Target::logical(ObjectType::Data, "0.0.96.1.0.255").unwrap();
        let items = [
            WriteItem::new(target, 2, DataObject::Unsigned8(1)),
            WriteItem::new(clock(), 3, DataObject::Integer16(-60)).with_type(DataType::Long),
        ];
        let frames = session.write_list(&items).unwrap();
        let bytes = apdu(&frames[0]);
        assert_eq!(&bytes[..4], &[0xC1, 0x04, 0xC1, 0x02]);
        assert!(bytes.ends_with(&[0x02, 0x11, 0x01, 0x10, 0xFF, 0xC4]));

        let mut session = sn_session();
        let items = [WriteItem::new(Target::short(ObjectType::Data, 0x1000), 2, DataObject::Unsigned8(7))];
        let frames = session.write_list(&items).unwrap();
        assert_eq!(
            apdu(&frames[0]),
            vec![0x06, 0x01, 0x02, 0x10, 0x08, 0x01, 0x11, 0x07]
        );
    }

    #[test]
    fn test_ln_method() {
        let mut session = ln_session();
        let target = Target::logical(ObjectType::Register, "1.0.1.8.0.255").unwrap();
        let frames = session
            .method(target, 1, Some(&DataObject::Integer8(0)), DataType::None)
            .unwrap();
        assert_eq!(
            apdu(&frames[0]),
            vec![0xC3, 0x01, 0xC1, 0x00, 0x03, 1, 0, 1, 8, 0, 255, 0x01, 0x01, 0x0F, 0x00]
        );
        let frames = session.method(target, 1, None, DataType::None).unwrap();
        assert!(apdu(&frames[0]).ends_with(&[0x01, 0x00]));
        assert!(session.method(target, 0, None, DataType::None).is_err());
    }

    #[test]
    fn test_sn_method_uses_class_table() {
        let mut session = sn_session();
        let register = Target::short(ObjectType::Register, 0x2000);
        let frames = session
            .method(register, 1, Some(&DataObject::Integer8(0)), DataType::None)
            .unwrap();
        assert_eq!(
            apdu(&frames[0]),
            vec![0x05, 0x01, 0x04, 0x20, 0x28, 0x01, 0x0F, 0x00]
        );
        assert!(matches!(
            session.method(register, 2, None, DataType::None),
            Err(DlmsError::Argument(_))
        ));
        let data = Target::short(ObjectType::Data, 0x1000);
        assert!(matches!(
            session.method(data, 1, None, DataType::None),
            Err(DlmsError::Argument(_))
        ));
    }

    #[test]
    fn test_rows_by_entry() {
        let mut session = ln_session();
        let profile = CosemObject::new(ObjectType::ProfileGeneric, ObisCode::new(1, 0, 99, 1, 0, 255));
        let frames = session.rows_by_entry(&profile, 1, 10).unwrap();
        let bytes = apdu(&frames[0]);
        assert_eq!(&bytes[3..12], &[0x00, 0x07, 1, 0, 99, 1, 0, 255, 0x02]);
        assert_eq!(
            &bytes[12..],
            &[
                0x01, 0x02, 0x02, 0x04, 0x06, 0, 0, 0, 1, 0x06, 0, 0, 0, 10, 0x12, 0x00, 0x01,
                0x12, 0x00, 0x00
            ]
        );
    }

    #[test]
    fn test_rows_by_range_default_clock() {
        let mut session = ln_session();
        let profile = CosemObject::new(ObjectType::ProfileGeneric, ObisCode::new(1, 0, 99, 1, 0, 255));
        let start = CosemDateTime::decode(&[0x07, 0xE8, 1, 1, 0xFF, 0, 0, 0, 0, 0x80, 0, 0]).unwrap();
        let end = CosemDateTime::decode(&[0x07, 0xE8, 1, 2, 0xFF, 0, 0, 0, 0, 0x80, 0, 0]).unwrap();
        let frames = session.rows_by_range(&profile, None, &start, &end).unwrap();
        let bytes = apdu(&frames[0]);
        let selector = &bytes[12..];
        assert_eq!(&selector[..4], &[0x01, 0x01, 0x02, 0x04]);
        assert_eq!(
            &selector[4..22],
            &[0x02, 0x04, 0x12, 0x00, 0x08, 0x09, 0x06, 0, 0, 1, 0, 0, 255, 0x0F, 0x02, 0x12, 0x00, 0x00]
        );
        assert_eq!(&selector[22..24], &[0x09, 0x0C]);
        assert_eq!(&selector[24..36], &start.encode());
        assert!(selector.ends_with(&[0x01, 0x00]));

        let register = CosemObject::new(ObjectType::Register, ObisCode::new(1, 0, 1, 8, 0, 255));
        assert!(matches!(
            session.rows_by_range(&register, None, &start, &end),
            Err(DlmsError::Argument(_))
        ));
    }

    #[test]
    fn test_rows_by_range_uses_profile_sort_object() {
        let mut session = ln_session();
        let mut profile = CosemObject::new(ObjectType::ProfileGeneric, ObisCode::new(1, 0, 99, 1, 0, 255));
        if let ObjectKind::ProfileGeneric(generic) = profile.kind_mut() {
            generic.sort_object = Some(Box::new(CaptureObject::new(
                CosemObject::new(ObjectType::Data, ObisCode::new(0, 0, 96, 1, 0, 255)),
                2,
                0,
            )));
        }
        let start = CosemDateTime::decode(&[0x07, 0xE8, 1, 1, 0xFF, 0, 0, 0, 0, 0x80, 0, 0]).unwrap();
        let frames = session.rows_by_range(&profile, None, &start, &start).unwrap();
        let bytes = apdu(&frames[0]);
        assert_eq!(&bytes[18..29], &[0x12, 0x00, 0x01, 0x09, 0x06, 0, 0, 96, 1, 0, 255]);
    }

    #[test]
    fn test_get_objects_request() {
        let mut session = ln_session();
        let frames = session.get_objects_request().unwrap();
        assert_eq!(
            apdu(&frames[0]),
            vec![0xC0, 0x01, 0xC1, 0x00, 0x0F, 0, 0, 40, 0, 0, 255, 0x02, 0x00]
        );
        let mut session = sn_session();
        let frames = session.get_objects_request().unwrap();
        assert_eq!(apdu(&frames[0]), vec![0x05, 0x01, 0x02, 0xFA, 0x08]);
    }

    #[test]
    fn test_keep_alive_and_receiver_ready() {
        let session = ln_session();
        let rr = session.keep_alive().unwrap();
        assert_eq!(HdlcFrame::decode(&rr).unwrap().0.control, 0x11);

        let wrapper = Session::new(
            SessionConfig::default().with_interface_type(InterfaceType::Wrapper),
        );
        assert!(wrapper.keep_alive().unwrap().is_empty());

        let mut session = ln_session();
        assert_eq!(session.receiver_ready(MoreData::Frame).unwrap().len(), 1);
        assert!(session.receiver_ready(MoreData::None).unwrap().is_empty());
    }

    #[test]
    fn test_receiver_ready_block() {
        let mut session = ln_session();
        session.read(clock(), 2, None).unwrap();
        session.set_block_index(1);
        let frames = session.receiver_ready(MoreData::Block).unwrap();
        let invoke = InvokeIdAndPriority::new(1, Priority::High, ServiceClass::Confirmed).unwrap();
        assert_eq!(apdu(&frames[0]), get_request_next(invoke, 1));

        let mut session = sn_session();
        session.set_block_index(3);
        let frames = session.receiver_ready(MoreData::Block).unwrap();
        assert_eq!(apdu(&frames[0]), vec![0x05, 0x01, 0x05, 0x00, 0x03]);
    }

    #[test]
    fn test_image_transfer_helpers() {
        let mut session = ln_session();
        let mut object = CosemObject::new(ObjectType::ImageTransfer, ObisCode::new(0, 0, 44, 0, 0, 255));
        object.set_value(2, DataObject::Unsigned32(0)).unwrap();
        assert!(matches!(
            session.image_transfer_initiate(&object, b"FW1", 10),
            Err(DlmsError::Argument(_))
        ));
        object.set_value(2, DataObject::Unsigned32(4)).unwrap();

        let frames = session.image_transfer_initiate(&object, b"FW1", 10).unwrap();
        assert!(apdu(&frames[0]).ends_with(&[
            0x01, 0x01, 0x02, 0x02, 0x09, 0x03, b'F', b'W', b'1', 0x06, 0, 0, 0, 10
        ]));

        let requests = session.image_block_transfer(&object, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(requests.len(), 2);
        assert!(apdu(&requests[1][0]).ends_with(&[0x06, 0, 0, 0, 1, 0x09, 0x02, 5, 6]));

        let frames = session.image_verify(&object).unwrap();
        assert!(apdu(&frames[0]).ends_with(&[0x03, 0x01, 0x0F, 0x00]));
        let frames = session.image_activate(&object).unwrap();
        assert!(apdu(&frames[0]).ends_with(&[0x04, 0x01, 0x0F, 0x00]));
    }

    #[test]
    fn test_large_write_goes_out_in_blocks() {
        let mut session = ln_session();
        session.set_max_pdu_size(64);
        let target = Target::logical(ObjectType::Data, "0.0.96.1.0.255").unwrap();
        let frames = session
            .write(target, 2, &DataObject::OctetString(vec![0xAA; 150]), DataType::None)
            .unwrap();
        let first = apdu(&frames[0]);
        assert_eq!(&first[..2], &[0xC1, 0x02]);
        assert!(frames.len() > 1);
    }
}
