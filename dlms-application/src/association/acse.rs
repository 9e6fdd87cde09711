//! ACSE APDUs: AARQ, AARE and RLRQ
//!
//! These are BER encoded, with the xDLMS Initiate PDUs carried as an octet
//! string in the user-information field.

use crate::association::state::AssociationResult;
use crate::command::tag;
use dlms_asn1::ber::decoder::{decode_object_identifier, decode_unsigned};
use dlms_asn1::{BerDecoder, BerEncoder, BerTag};
use dlms_core::{DlmsError, DlmsResult};
use dlms_security::constants::{
    APPLICATION_CONTEXT_PREFIX, MECHANISM_NAME_PREFIX, application_context_name, mechanism_name,
};
use dlms_security::Authentication;

const AARQ_TAG: BerTag = BerTag::application(true, 0);
const AARE_TAG: BerTag = BerTag::application(true, 1);
const RLRQ_TAG: BerTag = BerTag::application(true, 2);

const APPLICATION_CONTEXT_NAME: BerTag = BerTag::context_specific(true, 1);
const RESULT: BerTag = BerTag::context_specific(true, 2);
const RESULT_SOURCE_DIAGNOSTIC: BerTag = BerTag::context_specific(true, 3);
const RESPONDING_AP_TITLE: BerTag = BerTag::context_specific(true, 4);
const CALLING_AP_TITLE: BerTag = BerTag::context_specific(true, 6);
const RESPONDER_ACSE_REQUIREMENTS: BerTag = BerTag::context_specific(false, 8);
const RESPONDING_MECHANISM_NAME: BerTag = BerTag::context_specific(false, 9);
const SENDER_ACSE_REQUIREMENTS: BerTag = BerTag::context_specific(false, 10);
const CALLING_MECHANISM_NAME: BerTag = BerTag::context_specific(false, 11);
const CALLING_AUTHENTICATION_VALUE: BerTag = BerTag::context_specific(true, 12);
const RESPONDING_AUTHENTICATION_VALUE: BerTag = BerTag::context_specific(true, 10);
const USER_INFORMATION: BerTag = BerTag::context_specific(true, 30);

const OBJECT_IDENTIFIER: BerTag = BerTag::universal(false, 6);
const INTEGER: BerTag = BerTag::universal(false, 2);
const OCTET_STRING: BerTag = BerTag::universal(false, 4);
const CHARSTRING: BerTag = BerTag::context_specific(false, 0);
const ACSE_SERVICE_USER: BerTag = BerTag::context_specific(true, 1);

/// Content of an AARQ
#[derive(Debug, Clone, PartialEq)]
pub struct AarqRequest {
    pub logical_name: bool,
    pub ciphered: bool,
    pub authentication: Authentication,
    /// Password for low level, client challenge for HLS
    pub calling_authentication_value: Option<Vec<u8>>,
    /// Client system title, sent when ciphered
    pub calling_ap_title: Option<Vec<u8>>,
    /// Encoded (and possibly ciphered) InitiateRequest
    pub user_information: Vec<u8>,
}

impl AarqRequest {
    pub fn encode(&self) -> Vec<u8> {
        let mut body = BerEncoder::new();

        let mut context = BerEncoder::new();
        context.encode_object_identifier(
            OBJECT_IDENTIFIER,
            &application_context_name(self.logical_name, self.ciphered),
        );
        body.encode_constructed(APPLICATION_CONTEXT_NAME, context);

        if let Some(title) = &self.calling_ap_title {
            let mut inner = BerEncoder::new();
            inner.encode_tlv(OCTET_STRING, title);
            body.encode_constructed(CALLING_AP_TITLE, inner);
        }

        if self.authentication != Authentication::None {
            body.encode_bit_string(SENDER_ACSE_REQUIREMENTS, &[0x80], 1);
            body.encode_object_identifier(
                CALLING_MECHANISM_NAME,
                &mechanism_name(self.authentication),
            );
            let mut value = BerEncoder::new();
            value.encode_tlv(
                CHARSTRING,
                self.calling_authentication_value.as_deref().unwrap_or(&[]),
            );
            body.encode_constructed(CALLING_AUTHENTICATION_VALUE, value);
        }

        let mut user_information = BerEncoder::new();
        user_information.encode_tlv(OCTET_STRING, &self.user_information);
        body.encode_constructed(USER_INFORMATION, user_information);

        let mut apdu = BerEncoder::new();
        apdu.encode_constructed(AARQ_TAG, body);
        apdu.into_bytes()
    }
}

/// Decoded AARE
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aare {
    /// Last arc of the application context name
    pub application_context_id: u8,
    pub result: u8,
    pub diagnostic: u8,
    /// Diagnostic came from the acse-service-user choice
    pub diagnostic_from_user: bool,
    pub responding_ap_title: Option<Vec<u8>>,
    pub mechanism: Option<Authentication>,
    /// Server to client challenge
    pub responding_authentication_value: Option<Vec<u8>>,
    /// Encoded (and possibly ciphered) InitiateResponse
    pub user_information: Option<Vec<u8>>,
}

impl Aare {
    pub fn decode(data: &[u8]) -> DlmsResult<Self> {
        let mut outer = BerDecoder::new(data);
        let body = outer.expect_tlv(AARE_TAG)?;

        let mut aare = Aare::default();
        let mut has_result = false;
        let mut decoder = BerDecoder::new(body);
        while decoder.has_remaining() {
            let (element, value) = decoder.decode_tlv()?;
            match element {
                APPLICATION_CONTEXT_NAME => {
                    let oid = BerDecoder::new(value).expect_tlv(OBJECT_IDENTIFIER)?;
                    aare.application_context_id =
                        last_arc(oid, APPLICATION_CONTEXT_PREFIX, "application context")?;
                }
                RESULT => {
                    let raw = BerDecoder::new(value).expect_tlv(INTEGER)?;
                    aare.result = decode_unsigned(raw)? as u8;
                    has_result = true;
                }
                RESULT_SOURCE_DIAGNOSTIC => {
                    let (source, inner) = BerDecoder::new(value).decode_tlv()?;
                    let raw = BerDecoder::new(inner).expect_tlv(INTEGER)?;
                    aare.diagnostic = decode_unsigned(raw)? as u8;
                    aare.diagnostic_from_user = source == ACSE_SERVICE_USER;
                }
                RESPONDING_AP_TITLE => {
                    let title = BerDecoder::new(value).expect_tlv(OCTET_STRING)?;
                    aare.responding_ap_title = Some(title.to_vec());
                }
                RESPONDER_ACSE_REQUIREMENTS => {}
                RESPONDING_MECHANISM_NAME => {
                    let id = last_arc(value, MECHANISM_NAME_PREFIX, "mechanism")?;
                    aare.mechanism = Some(Authentication::from_id(id)?);
                }
                RESPONDING_AUTHENTICATION_VALUE => {
                    let challenge = BerDecoder::new(value).expect_tlv(CHARSTRING)?;
                    aare.responding_authentication_value = Some(challenge.to_vec());
                }
                USER_INFORMATION => {
                    let info = BerDecoder::new(value).expect_tlv(OCTET_STRING)?;
                    aare.user_information = Some(info.to_vec());
                }
                _ => {}
            }
        }

        if !has_result {
            return Err(DlmsError::ProtocolDecode(
                "AARE has no result field".to_string(),
            ));
        }
        Ok(aare)
    }

    pub fn association_result(&self) -> Option<AssociationResult> {
        AssociationResult::from_u8(self.result)
    }

    pub fn is_logical_name(&self) -> bool {
        matches!(self.application_context_id, 1 | 3)
    }

    pub fn is_ciphered(&self) -> bool {
        matches!(self.application_context_id, 3 | 4)
    }
}

fn last_arc(oid: &[u8], prefix: &[u32], what: &str) -> DlmsResult<u8> {
    let arcs = decode_object_identifier(oid)?;
    match arcs.split_last() {
        Some((last, head)) if head == prefix && *last <= u8::MAX as u32 => Ok(*last as u8),
        _ => Err(DlmsError::ProtocolDecode(format!(
            "Unknown {} name {:?}",
            what, arcs
        ))),
    }
}

/// RLRQ with release reason "normal"
pub fn encode_release_request() -> Vec<u8> {
    let mut body = BerEncoder::new();
    body.encode_integer(CHARSTRING, 0);
    let mut apdu = BerEncoder::new();
    apdu.encode_constructed(RLRQ_TAG, body);
    apdu.into_bytes()
}

/// Whether an APDU starts with an ACSE tag the client passes through
pub fn is_acse_apdu(first_byte: u8) -> bool {
    matches!(first_byte, tag::AARE | tag::RLRE)
}
