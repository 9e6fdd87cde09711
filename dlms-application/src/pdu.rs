//! xDLMS Initiate PDUs carried in the AARQ/AARE user-information field
//!
//! Both PDUs are A-XDR encoded. Optional fields are preceded by a usage
//! flag byte, and the conformance block is a BER-style `[APPLICATION 31]`
//! bit string (`5F 1F 04 00 xx xx xx`).

use crate::command::tag;
use dlms_asn1::{AxdrDecoder, AxdrEncoder};
use dlms_core::{DlmsError, DlmsResult};

/// DLMS protocol version number
pub const DLMS_VERSION_6: u8 = 6;

/// Maximum PDU size for DLMS/COSEM communication
pub const MAX_PDU_SIZE: u16 = 65535;

/// VAA name of a logical name association
pub const VAA_NAME_LN: u16 = 0x0007;
/// VAA name of a short name association (base of the association object)
pub const VAA_NAME_SN: u16 = 0xFA00;

const CONFORMANCE_TAG: [u8; 2] = [0x5F, 0x1F];

/// Conformance bits for DLMS/COSEM protocol negotiation
///
/// A 24-bit block, held in its wire order (first byte most significant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Conformance {
    bits: u32,
}

impl Conformance {
    pub const READ: u32 = 0x10_0000;
    pub const WRITE: u32 = 0x08_0000;
    pub const UNCONFIRMED_WRITE: u32 = 0x04_0000;
    pub const ATTRIBUTE0_SUPPORTED_WITH_SET: u32 = 0x00_8000;
    pub const PRIORITY_MGMT_SUPPORTED: u32 = 0x00_4000;
    pub const ATTRIBUTE0_SUPPORTED_WITH_GET: u32 = 0x00_2000;
    pub const BLOCK_TRANSFER_WITH_GET_OR_READ: u32 = 0x00_1000;
    pub const BLOCK_TRANSFER_WITH_SET_OR_WRITE: u32 = 0x00_0800;
    pub const BLOCK_TRANSFER_WITH_ACTION: u32 = 0x00_0400;
    pub const MULTIPLE_REFERENCES: u32 = 0x00_0200;
    pub const INFORMATION_REPORT: u32 = 0x00_0100;
    pub const PARAMETERIZED_ACCESS: u32 = 0x00_0020;
    pub const GET: u32 = 0x00_0010;
    pub const SET: u32 = 0x00_0008;
    pub const SELECTIVE_ACCESS: u32 = 0x00_0004;
    pub const EVENT_NOTIFICATION: u32 = 0x00_0002;
    pub const ACTION: u32 = 0x00_0001;

    pub const fn new(bits: u32) -> Self {
        Self {
            bits: bits & 0x00FF_FFFF,
        }
    }

    /// Conformance proposed for logical name associations (`00 7E 1F`)
    pub const fn logical_name_default() -> Self {
        Self::new(0x00_7E1F)
    }

    /// Conformance proposed for short name associations (`1C 03 20`)
    pub const fn short_name_default() -> Self {
        Self::new(0x1C_0320)
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn contains(&self, flag: u32) -> bool {
        self.bits & flag == flag
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        let bytes = self.bits.to_be_bytes();
        [bytes[1], bytes[2], bytes[3]]
    }

    fn encode(&self, encoder: &mut AxdrEncoder) {
        encoder.encode_bytes(&CONFORMANCE_TAG);
        encoder.encode_u8(0x04);
        encoder.encode_u8(0x00);
        encoder.encode_bytes(&self.to_bytes());
    }

    fn decode(decoder: &mut AxdrDecoder<'_>) -> DlmsResult<Self> {
        let header = decoder.read_bytes(4)?;
        if header[..2] != CONFORMANCE_TAG || header[2] != 0x04 {
            return Err(DlmsError::ProtocolDecode(format!(
                "Invalid conformance block header {:02X?}",
                header
            )));
        }
        let bytes = decoder.read_bytes(3)?;
        Ok(Self::new(
            (bytes[0] as u32) << 16 | (bytes[1] as u32) << 8 | bytes[2] as u32,
        ))
    }
}

/// Initiate Request PDU
#[derive(Debug, Clone, PartialEq)]
pub struct InitiateRequest {
    pub dedicated_key: Option<Vec<u8>>,
    pub proposed_dlms_version_number: u8,
    pub proposed_conformance: Conformance,
    pub client_max_receive_pdu_size: u16,
}

impl InitiateRequest {
    pub fn new(proposed_conformance: Conformance, client_max_receive_pdu_size: u16) -> Self {
        Self {
            dedicated_key: None,
            proposed_dlms_version_number: DLMS_VERSION_6,
            proposed_conformance,
            client_max_receive_pdu_size,
        }
    }

    /// Encode to `01 | key? | 00 | 00 | 06 | conformance | max PDU`
    ///
    /// response-allowed keeps its default and quality of service is absent.
    pub fn encode(&self) -> Vec<u8> {
        let mut encoder = AxdrEncoder::with_capacity(16);
        encoder.encode_u8(tag::INITIATE_REQUEST);
        match &self.dedicated_key {
            Some(key) => {
                encoder.encode_u8(0x01);
                encoder.encode_octet_string(key);
            }
            None => encoder.encode_u8(0x00),
        }
        encoder.encode_u8(0x00);
        encoder.encode_u8(0x00);
        encoder.encode_u8(self.proposed_dlms_version_number);
        self.proposed_conformance.encode(&mut encoder);
        encoder.encode_u16(self.client_max_receive_pdu_size);
        encoder.into_bytes()
    }
}

/// Initiate Response PDU
#[derive(Debug, Clone, PartialEq)]
pub struct InitiateResponse {
    pub negotiated_quality_of_service: Option<u8>,
    pub negotiated_dlms_version_number: u8,
    pub negotiated_conformance: Conformance,
    pub server_max_receive_pdu_size: u16,
    pub vaa_name: u16,
}

impl InitiateResponse {
    /// Decode an InitiateResponse
    ///
    /// A confirmed-service-error in its place is reported as
    /// `DlmsError::ServiceError`.
    pub fn decode(data: &[u8]) -> DlmsResult<Self> {
        let mut decoder = AxdrDecoder::new(data);
        let pdu_tag = decoder.read_u8()?;
        if pdu_tag == tag::CONFIRMED_SERVICE_ERROR {
            let service = decoder.read_u8().unwrap_or(0);
            let kind = decoder.read_u8().unwrap_or(0);
            let code = decoder.read_u8().unwrap_or(0);
            return Err(DlmsError::ServiceError(format!(
                "InitiateRequest rejected: service {}, error type {}, code {}",
                service, kind, code
            )));
        }
        if pdu_tag != tag::INITIATE_RESPONSE {
            return Err(DlmsError::ProtocolDecode(format!(
                "Expected InitiateResponse, got tag 0x{:02X}",
                pdu_tag
            )));
        }

        let negotiated_quality_of_service = if decoder.read_u8()? != 0 {
            Some(decoder.read_u8()?)
        } else {
            None
        };
        let negotiated_dlms_version_number = decoder.read_u8()?;
        let negotiated_conformance = Conformance::decode(&mut decoder)?;
        let server_max_receive_pdu_size = decoder.read_u16()?;
        let vaa_name = decoder.read_u16()?;

        Ok(Self {
            negotiated_quality_of_service,
            negotiated_dlms_version_number,
            negotiated_conformance,
            server_max_receive_pdu_size,
            vaa_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_initiate_request_ln() {
        let request = InitiateRequest::new(Conformance::logical_name_default(), 0xFFFF);
        assert_eq!(
            request.encode(),
            vec![0x01, 0x00, 0x00, 0x00, 0x06, 0x5F, 0x1F, 0x04, 0x00, 0x00, 0x7E, 0x1F, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_encode_initiate_request_sn() {
        let request = InitiateRequest::new(Conformance::short_name_default(), 0x0400);
        let bytes = request.encode();
        assert_eq!(&bytes[9..12], &[0x1C, 0x03, 0x20]);
        assert_eq!(&bytes[12..], &[0x04, 0x00]);
    }

    #[test]
    fn test_decode_initiate_response() {
        let data = [
            0x08, 0x00, 0x06, 0x5F, 0x1F, 0x04, 0x00, 0x00, 0x10, 0x1D, 0x00, 0xC8, 0x00, 0x07,
        ];
        let response = InitiateResponse::decode(&data).unwrap();
        assert_eq!(response.negotiated_dlms_version_number, 6);
        assert_eq!(response.server_max_receive_pdu_size, 200);
        assert_eq!(response.vaa_name, VAA_NAME_LN);
        assert!(response.negotiated_conformance.contains(Conformance::GET));
        assert!(response.negotiated_conformance.contains(Conformance::BLOCK_TRANSFER_WITH_GET_OR_READ));
        assert_eq!(response.negotiated_quality_of_service, None);
    }

    #[test]
    fn test_decode_service_error() {
        let result = InitiateResponse::decode(&[0x0E, 0x01, 0x06, 0x01]);
        assert!(matches!(result, Err(DlmsError::ServiceError(_))));
    }

    #[test]
    fn test_decode_truncated() {
        assert!(InitiateResponse::decode(&[0x08, 0x00, 0x06, 0x5F]).is_err());
    }
}
