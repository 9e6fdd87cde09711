//! Service PDU assembly
//!
//! A [`ServiceRequest`] holds the service-specific body of a request. The
//! splitter prefixes it with the command and invoke bytes, splits LN
//! SET/ACTION bodies that exceed the negotiated PDU size into data blocks,
//! and finally ciphers every PDU when a cipher is active.

use crate::command::{InvokeIdAndPriority, glo_tag, request_type, tag};
use dlms_asn1::AxdrEncoder;
use dlms_core::{DlmsError, DlmsResult};
use dlms_security::Cipher;
use log::{debug, trace};

/// Bytes added by glo ciphering: tag, length, SC, IC and the GCM tag
const CIPHER_OVERHEAD: usize = 1 + 3 + 5 + 12;

/// Request body before framing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequest {
    pub command: u8,
    /// Request type byte (LN only)
    pub request_type: u8,
    /// Descriptor part, kept whole in the first block
    pub descriptor: Vec<u8>,
    /// Data part, split across blocks when too large
    pub data: Vec<u8>,
}

impl ServiceRequest {
    pub fn new(command: u8, request_type: u8, descriptor: Vec<u8>, data: Vec<u8>) -> Self {
        Self {
            command,
            request_type,
            descriptor,
            data,
        }
    }

    /// Short name request: no request type and no invoke byte
    pub fn short_name(command: u8, descriptor: Vec<u8>, data: Vec<u8>) -> Self {
        Self::new(command, 0, descriptor, data)
    }

    fn is_action(&self) -> bool {
        self.command == tag::ACTION_REQUEST
    }

    fn can_split(&self) -> bool {
        matches!(self.command, tag::SET_REQUEST | tag::ACTION_REQUEST)
            && self.request_type == request_type::NORMAL
    }

    /// Normal (unsplit) PDU
    fn encode_normal(&self, logical_name: bool, invoke: InvokeIdAndPriority) -> Vec<u8> {
        let mut pdu = Vec::with_capacity(4 + self.descriptor.len() + self.data.len());
        pdu.push(self.command);
        if logical_name {
            pdu.push(self.request_type);
            pdu.push(invoke.to_byte());
        }
        pdu.extend_from_slice(&self.descriptor);
        if logical_name && self.is_action() && self.request_type == request_type::NORMAL {
            if self.data.is_empty() {
                pdu.push(0x00);
            } else {
                pdu.push(0x01);
                pdu.extend_from_slice(&self.data);
            }
        } else {
            pdu.extend_from_slice(&self.data);
        }
        pdu
    }
}

/// Session values read when a request is assembled
#[derive(Debug, Clone, Copy)]
pub struct PduContext {
    pub logical_name: bool,
    pub max_pdu_size: u16,
    pub invoke: InvokeIdAndPriority,
}

/// Assemble, split and cipher one service request
///
/// Returns one APDU per block; a request that fits yields a single APDU.
pub fn split_pdu(
    context: &PduContext,
    request: &ServiceRequest,
    mut cipher: Option<&mut (dyn Cipher + '_)>,
) -> DlmsResult<Vec<Vec<u8>>> {
    let ciphered = cipher.as_deref().is_some_and(|c| c.is_ciphered());
    let normal = request.encode_normal(context.logical_name, context.invoke);
    let mut limit = usize::from(context.max_pdu_size);
    if ciphered {
        limit = limit.saturating_sub(CIPHER_OVERHEAD);
    }

    let pdus = if context.logical_name && request.can_split() && normal.len() > limit {
        split_into_blocks(context.invoke, request, limit)?
    } else {
        vec![normal]
    };
    debug!(
        "Service 0x{:02X} assembled into {} PDU(s)",
        request.command,
        pdus.len()
    );

    match cipher.as_deref_mut() {
        Some(cipher) if ciphered => pdus
            .into_iter()
            .map(|pdu| cipher_pdu(cipher, &pdu))
            .collect(),
        _ => {
            for pdu in &pdus {
                trace!("PDU {}", hex::encode_upper(pdu));
            }
            Ok(pdus)
        }
    }
}

fn cipher_pdu(cipher: &mut dyn Cipher, pdu: &[u8]) -> DlmsResult<Vec<u8>> {
    let command = pdu
        .first()
        .copied()
        .ok_or_else(|| DlmsError::Argument("Cannot cipher an empty PDU".to_string()))?;
    let glo = glo_tag(command).ok_or_else(|| {
        DlmsError::Security(format!("No glo-ciphered form of command 0x{:02X}", command))
    })?;
    let ciphered = cipher.encrypt(glo, pdu)?;
    trace!("Ciphered PDU {}", hex::encode_upper(&ciphered));
    Ok(ciphered)
}

fn split_into_blocks(
    invoke: InvokeIdAndPriority,
    request: &ServiceRequest,
    limit: usize,
) -> DlmsResult<Vec<Vec<u8>>> {
    let (first_type, next_type) = if request.is_action() {
        (
            request_type::ACTION_WITH_FIRST_PBLOCK,
            request_type::ACTION_WITH_PBLOCK,
        )
    } else {
        (
            request_type::SET_WITH_FIRST_DATABLOCK,
            request_type::SET_WITH_DATABLOCK,
        )
    };

    // tag, type, invoke, last-block, block number, up to 3 length bytes
    let block_header = 3 + 1 + 4 + 3;
    let first_room = limit
        .checked_sub(block_header + request.descriptor.len())
        .filter(|room| *room > 0)
        .ok_or_else(|| {
            DlmsError::Argument(format!(
                "Max PDU size {} is too small for block transfer",
                limit
            ))
        })?;
    let next_room = limit - block_header;

    let mut pdus = Vec::new();
    let mut offset = 0;
    let mut block_number = 1u32;
    while offset < request.data.len() {
        let room = if block_number == 1 { first_room } else { next_room };
        let end = (offset + room).min(request.data.len());
        let last = end == request.data.len();

        let mut encoder = AxdrEncoder::with_capacity(limit);
        encoder.encode_u8(request.command);
        encoder.encode_u8(if block_number == 1 { first_type } else { next_type });
        encoder.encode_u8(invoke.to_byte());
        if block_number == 1 {
            encoder.encode_bytes(&request.descriptor);
        }
        encoder.encode_bool(last);
        encoder.encode_u32(block_number);
        encoder.encode_octet_string(&request.data[offset..end]);
        pdus.push(encoder.into_bytes());

        offset = end;
        block_number += 1;
    }
    Ok(pdus)
}

/// GET-Request-Next asking for `block_number`
pub fn get_request_next(invoke: InvokeIdAndPriority, block_number: u32) -> Vec<u8> {
    let mut encoder = AxdrEncoder::with_capacity(7);
    encoder.encode_u8(tag::GET_REQUEST);
    encoder.encode_u8(request_type::NEXT);
    encoder.encode_u8(invoke.to_byte());
    encoder.encode_u32(block_number);
    encoder.into_bytes()
}
