//! Reply parsing
//!
//! [`Session::get_data`] unframes one received frame and decodes the APDU
//! it carries. HDLC segments are collected in a caller-owned buffer and the
//! APDU is decoded once the last segment arrives. Data blocks of a longer
//! value are flagged in [`ReplyData::more`]; joining those is left to the
//! caller.

use crate::session::Session;
use bytes::{Bytes, BytesMut};
use dlms_application::command::{is_glo_response, response_type, tag};
use dlms_asn1::{AxdrDecoder, AxdrEncoder, decode_from_slice};
use dlms_core::{CosemDateTime, DataObject, DlmsError, DlmsResult};
use dlms_session::{FrameType, HdlcFrame, InterfaceType, strip_llc, unwrap};
use log::{debug, trace, warn};

/// What the caller must fetch before the reply is complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoreData {
    #[default]
    None,
    /// HDLC segment; send [`Session::receiver_ready`] and pass the next
    /// frame with the same segment buffer
    Frame,
    /// Data block; ask for the next block and append its raw data
    Block,
}

/// Decoded content of one received frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReplyData {
    /// First APDU byte, `None` for frames that carry no APDU
    pub command: Option<u8>,
    pub frame_type: Option<FrameType>,
    pub invoke_id: Option<u8>,
    /// Tagged value, raw block data, or the whole APDU for AARE/RLRE
    pub data: Bytes,
    pub more: MoreData,
    pub block_number: Option<u32>,
    /// (position, data-access-result) of failed list entries
    pub list_errors: Vec<(usize, u8)>,
    /// Time stamp of a data notification
    pub time: Option<CosemDateTime>,
}

impl ReplyData {
    /// Decode `data` as one tagged value; null when empty
    pub fn value(&self) -> DlmsResult<DataObject> {
        if self.data.is_empty() {
            return Ok(DataObject::Null);
        }
        Ok(decode_from_slice(&self.data)?.0)
    }

    pub fn is_complete(&self) -> bool {
        self.more == MoreData::None
    }
}

fn data_access_error(code: u8) -> DlmsError {
    warn!("Device returned data access result {}", code);
    DlmsError::DataAccess { code }
}

/// Copy one tagged value from the decoder and return its bytes
fn take_value<'a>(decoder: &mut AxdrDecoder<'a>, apdu: &'a [u8]) -> DlmsResult<&'a [u8]> {
    let start = decoder.position();
    decoder.decode_data_object()?;
    Ok(&apdu[start..decoder.position()])
}

impl Session {
    /// Unframe and decode one received frame
    ///
    /// `segments` holds the APDU bytes of earlier HDLC segments. A
    /// segmented frame appends to it and returns [`MoreData::Frame`]; the
    /// final frame appends its bytes and the joined APDU is decoded. The
    /// buffer is empty again once a reply has been decoded or has failed.
    ///
    /// # Errors
    ///
    /// - `DlmsError::FrameInvalid` for a bad FCS or foreign addresses
    /// - `DlmsError::Protocol` when the server rejected the frame (FRMR)
    /// - `DlmsError::DataAccess` or `DlmsError::ServiceError` when the
    ///   device answered with an error
    pub fn get_data(&mut self, frame: &[u8], segments: &mut BytesMut) -> DlmsResult<ReplyData> {
        trace!("Received {}", hex::encode_upper(frame));
        match self.config().interface_type {
            InterfaceType::Wrapper => {
                let (header, apdu) = unwrap(frame)?;
                let (client, server) = self.wrapper_addresses()?;
                if header.destination() != client || header.source() != server {
                    return Err(DlmsError::FrameInvalid(format!(
                        "Wrapper frame from {} to {} does not belong to this session",
                        header.source(),
                        header.destination()
                    )));
                }
                self.parse_apdu(apdu)
            }
            InterfaceType::Hdlc => {
                let (hdlc, _) = HdlcFrame::decode(frame)?;
                self.check_addresses(&hdlc)?;
                self.on_frame_received(hdlc.control)?;
                let frame_type = hdlc.frame_type()?;
                match frame_type {
                    FrameType::FrameReject => {
                        return Err(DlmsError::Protocol(
                            "Server rejected the frame (FRMR)".to_string(),
                        ))
                    }
                    FrameType::Information => {}
                    _ => {
                        return Ok(ReplyData {
                            frame_type: Some(frame_type),
                            data: Bytes::from(hdlc.information),
                            ..ReplyData::default()
                        })
                    }
                }
                // Only the first segment carries the LLC header
                let piece = if segments.is_empty() {
                    strip_llc(&hdlc.information)
                } else {
                    &hdlc.information[..]
                };
                if hdlc.segmented {
                    segments.extend_from_slice(piece);
                    debug!("Segmented frame, {} of {} bytes", piece.len(), segments.len());
                    return Ok(ReplyData {
                        frame_type: Some(frame_type),
                        data: Bytes::copy_from_slice(piece),
                        more: MoreData::Frame,
                        ..ReplyData::default()
                    });
                }
                let mut reply = if segments.is_empty() {
                    self.parse_apdu(piece)?
                } else {
                    segments.extend_from_slice(piece);
                    let apdu = segments.split().freeze();
                    debug!("Reassembled {} byte APDU", apdu.len());
                    self.parse_apdu(&apdu)?
                };
                reply.frame_type = Some(frame_type);
                Ok(reply)
            }
        }
    }

    /// Decode a complete APDU
    pub fn parse_apdu(&mut self, apdu: &[u8]) -> DlmsResult<ReplyData> {
        let command = *apdu
            .first()
            .ok_or_else(|| DlmsError::ProtocolDecode("Empty APDU".to_string()))?;
        if is_glo_response(command) {
            let plain = self.decrypt_apdu(apdu)?;
            if plain.first().is_some_and(|c| is_glo_response(*c)) {
                return Err(DlmsError::ProtocolDecode(
                    "Ciphered APDU wraps another ciphered APDU".to_string(),
                ));
            }
            return self.parse_apdu(&plain);
        }

        let mut reply = ReplyData {
            command: Some(command),
            ..ReplyData::default()
        };
        let mut decoder = AxdrDecoder::new(apdu);
        decoder.read_u8()?;
        match command {
            tag::GET_RESPONSE => self.parse_get_response(&mut decoder, apdu, &mut reply)?,
            tag::SET_RESPONSE => parse_set_response(&mut decoder, &mut reply)?,
            tag::ACTION_RESPONSE => parse_action_response(&mut decoder, apdu, &mut reply)?,
            tag::READ_RESPONSE => self.parse_read_response(&mut decoder, apdu, &mut reply)?,
            tag::WRITE_RESPONSE => parse_write_response(&mut decoder, &mut reply)?,
            tag::AARE | tag::RLRE => reply.data = Bytes::copy_from_slice(apdu),
            tag::DATA_NOTIFICATION => {
                let invoke = decoder.read_u32()?;
                reply.invoke_id = Some((invoke & 0x0F) as u8);
                let time = decoder.decode_octet_string()?;
                if !time.is_empty() {
                    reply.time = Some(CosemDateTime::decode(&time)?);
                }
                reply.data = Bytes::copy_from_slice(decoder.rest());
            }
            tag::EXCEPTION_RESPONSE => {
                let state_error = decoder.read_u8()?;
                let service_error = decoder.read_u8()?;
                return Err(DlmsError::ServiceError(format!(
                    "exception response, state error {}, service error {}",
                    state_error, service_error
                )));
            }
            tag::CONFIRMED_SERVICE_ERROR => {
                let service = decoder.read_u8()?;
                let kind = decoder.read_u8()?;
                let code = decoder.read_u8()?;
                return Err(DlmsError::ServiceError(format!(
                    "confirmed service error, service {}, error {}:{}",
                    service, kind, code
                )));
            }
            other => {
                return Err(DlmsError::ProtocolDecode(format!(
                    "Unexpected APDU 0x{:02X}",
                    other
                )))
            }
        }
        debug!(
            "Reply 0x{:02X}: {} data bytes, more {:?}",
            command,
            reply.data.len(),
            reply.more
        );
        Ok(reply)
    }

    /// Decipher a glo APDU from the server
    pub(crate) fn decrypt_apdu(&self, apdu: &[u8]) -> DlmsResult<Vec<u8>> {
        let cipher = self.cipher().ok_or_else(|| {
            DlmsError::Security("Received a ciphered APDU but no cipher is set".to_string())
        })?;
        let title = self.server_system_title().ok_or_else(|| {
            DlmsError::Security("Server system title is unknown".to_string())
        })?;
        cipher.decrypt(title, apdu)
    }

    fn parse_get_response<'a>(
        &mut self,
        decoder: &mut AxdrDecoder<'a>,
        apdu: &'a [u8],
        reply: &mut ReplyData,
    ) -> DlmsResult<()> {
        let kind = decoder.read_u8()?;
        reply.invoke_id = Some(decoder.read_u8()? & 0x0F);
        match kind {
            response_type::NORMAL => match decoder.read_u8()? {
                0 => reply.data = Bytes::copy_from_slice(decoder.rest()),
                _ => return Err(data_access_error(decoder.read_u8()?)),
            },
            response_type::WITH_DATABLOCK => {
                let last = decoder.read_u8()? != 0;
                let block = decoder.read_u32()?;
                if decoder.read_u8()? != 0 {
                    return Err(data_access_error(decoder.read_u8()?));
                }
                reply.data = Bytes::from(decoder.decode_octet_string()?);
                reply.block_number = Some(block);
                self.set_block_index(block);
                if !last {
                    reply.more = MoreData::Block;
                }
            }
            response_type::WITH_LIST => {
                reply.data = parse_result_list(decoder, apdu, &mut reply.list_errors)?;
            }
            other => {
                return Err(DlmsError::ProtocolDecode(format!(
                    "Unknown GET response type {}",
                    other
                )))
            }
        }
        Ok(())
    }

    fn parse_read_response<'a>(
        &mut self,
        decoder: &mut AxdrDecoder<'a>,
        apdu: &'a [u8],
        reply: &mut ReplyData,
    ) -> DlmsResult<()> {
        let count = decoder.decode_length()?;
        let mut values = AxdrEncoder::new();
        for position in 0..count {
            match decoder.read_u8()? {
                0 => values.encode_bytes(take_value(decoder, apdu)?),
                1 => {
                    let code = decoder.read_u8()?;
                    if count == 1 {
                        return Err(data_access_error(code));
                    }
                    reply.list_errors.push((position, code));
                    values.encode_u8(0x00);
                }
                2 => {
                    let last = decoder.read_u8()? != 0;
                    let block = u32::from(decoder.read_u16()?);
                    reply.data = Bytes::from(decoder.decode_octet_string()?);
                    reply.block_number = Some(block);
                    self.set_block_index(block);
                    if !last {
                        reply.more = MoreData::Block;
                    }
                    return Ok(());
                }
                other => {
                    return Err(DlmsError::ProtocolDecode(format!(
                        "Unknown READ response choice {}",
                        other
                    )))
                }
            }
        }
        reply.data = Bytes::from(values.into_bytes());
        Ok(())
    }
}

/// Results of a with-list reply; failed entries become null values
fn parse_result_list<'a>(
    decoder: &mut AxdrDecoder<'a>,
    apdu: &'a [u8],
    errors: &mut Vec<(usize, u8)>,
) -> DlmsResult<Bytes> {
    let count = decoder.decode_length()?;
    let mut values = AxdrEncoder::new();
    for position in 0..count {
        if decoder.read_u8()? == 0 {
            values.encode_bytes(take_value(decoder, apdu)?);
        } else {
            let code = decoder.read_u8()?;
            warn!("List entry {} failed with data access result {}", position, code);
            errors.push((position, code));
            values.encode_u8(0x00);
        }
    }
    Ok(Bytes::from(values.into_bytes()))
}

fn parse_set_response(decoder: &mut AxdrDecoder<'_>, reply: &mut ReplyData) -> DlmsResult<()> {
    let kind = decoder.read_u8()?;
    reply.invoke_id = Some(decoder.read_u8()? & 0x0F);
    match kind {
        response_type::NORMAL => {
            let result = decoder.read_u8()?;
            if result != 0 {
                return Err(data_access_error(result));
            }
        }
        response_type::ACK_BLOCK => reply.block_number = Some(decoder.read_u32()?),
        response_type::LAST_DATABLOCK => {
            let result = decoder.read_u8()?;
            if result != 0 {
                return Err(data_access_error(result));
            }
            reply.block_number = Some(decoder.read_u32()?);
        }
        response_type::LAST_DATABLOCK_WITH_LIST | SET_RESPONSE_WITH_LIST => {
            let count = decoder.decode_length()?;
            for position in 0..count {
                let result = decoder.read_u8()?;
                if result != 0 {
                    reply.list_errors.push((position, result));
                }
            }
            if kind == response_type::LAST_DATABLOCK_WITH_LIST {
                reply.block_number = Some(decoder.read_u32()?);
            }
        }
        other => {
            return Err(DlmsError::ProtocolDecode(format!(
                "Unknown SET response type {}",
                other
            )))
        }
    }
    Ok(())
}

/// SET-Response-With-List
const SET_RESPONSE_WITH_LIST: u8 = 0x05;

fn parse_action_response<'a>(
    decoder: &mut AxdrDecoder<'a>,
    apdu: &'a [u8],
    reply: &mut ReplyData,
) -> DlmsResult<()> {
    let kind = decoder.read_u8()?;
    reply.invoke_id = Some(decoder.read_u8()? & 0x0F);
    match kind {
        response_type::NORMAL => {
            let result = decoder.read_u8()?;
            if result != 0 {
                return Err(data_access_error(result));
            }
            if decoder.is_exhausted() || decoder.read_u8()? == 0 {
                return Ok(());
            }
            match decoder.read_u8()? {
                0 => reply.data = Bytes::copy_from_slice(take_value(decoder, apdu)?),
                _ => return Err(data_access_error(decoder.read_u8()?)),
            }
        }
        response_type::WITH_PBLOCK => {
            let last = decoder.read_u8()? != 0;
            let block = decoder.read_u32()?;
            reply.data = Bytes::from(decoder.decode_octet_string()?);
            reply.block_number = Some(block);
            if !last {
                reply.more = MoreData::Block;
            }
        }
        response_type::NEXT_PBLOCK => reply.block_number = Some(decoder.read_u32()?),
        other => {
            return Err(DlmsError::ProtocolDecode(format!(
                "Unknown ACTION response type {}",
                other
            )))
        }
    }
    Ok(())
}

fn parse_write_response(decoder: &mut AxdrDecoder<'_>, reply: &mut ReplyData) -> DlmsResult<()> {
    let count = decoder.decode_length()?;
    for position in 0..count {
        if decoder.read_u8()? != 0 {
            let code = decoder.read_u8()?;
            if count == 1 {
                return Err(data_access_error(code));
            }
            reply.list_errors.push((position, code));
        }
    }
    Ok(())
}
