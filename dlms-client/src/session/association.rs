//! Association state machine
//!
//! ```text
//! begin_physical_connect      SNRM (HDLC) or nothing (wrapper)
//! complete_physical_connect   UA, link limits
//! build_association_request   AARQ
//! parse_association_reply     AARE
//! build_authentication_challenge / verify_authentication_reply   HLS pass 3 and 4
//! release_request, build_disconnect, complete_disconnect
//! ```
//!
//! Any rejection or authentication mismatch returns the session to
//! [`AssociationState::Idle`]; the caller then starts over from the
//! physical connect.

use super::Session;
use crate::request::Target;
use dlms_application::association::{encode_release_request, source_diagnostic};
use dlms_application::command::tag;
use dlms_application::pdu::{DLMS_VERSION_6, MAX_PDU_SIZE};
use dlms_application::{
    Aare, AarqRequest, AssociationResult, AssociationState, Conformance, InitiateRequest,
    InitiateResponse,
};
use dlms_asn1::decode_from_slice;
use dlms_core::{DataObject, DataType, DlmsError, DlmsResult, ObisCode};
use dlms_interface::ObjectType;
use dlms_security::{Authentication, constant_time_eq, generate_challenge, secure};
use dlms_session::{FrameType, HdlcFrame, InterfaceType, control, wrap};
use log::{debug, warn};

/// Current association object under LN addressing
pub const ASSOCIATION_LOGICAL_NAME: ObisCode = ObisCode::new(0, 0, 40, 0, 0, 255);
/// Base name of the current association object under SN addressing
pub const ASSOCIATION_SHORT_NAME: u16 = 0xFA00;

/// `reply_to_HLS_authentication` of Association LN
const LN_REPLY_TO_HLS: u8 = 1;
/// `reply_to_HLS_authentication` of Association SN
const SN_REPLY_TO_HLS: u8 = 8;

impl Session {
    /// Target of the current association object for the configured addressing
    pub(crate) fn association_target(&self) -> Target {
        if self.is_logical_name() {
            Target::new(ObjectType::AssociationLogicalName, ASSOCIATION_LOGICAL_NAME, 0)
        } else {
            Target::new(
                ObjectType::AssociationShortName,
                ASSOCIATION_LOGICAL_NAME,
                ASSOCIATION_SHORT_NAME,
            )
        }
    }

    /// Build the physical connect request
    ///
    /// Returns the SNRM frame for HDLC. The wrapper has no link setup and
    /// an empty vector is returned; the caller skips sending it.
    pub fn begin_physical_connect(&mut self) -> DlmsResult<Vec<u8>> {
        self.authentication_required = false;
        self.max_pdu_size = MAX_PDU_SIZE;
        self.limits = self.config.hdlc_limits;
        self.state = AssociationState::AwaitingConnect;
        match self.config.interface_type {
            InterfaceType::Wrapper => {
                self.link_established = true;
                Ok(Vec::new())
            }
            InterfaceType::Hdlc => {
                self.link_established = false;
                self.sequence.reset();
                let frame = self.control_frame(control::SNRM, self.limits.encode_snrm_info())?;
                debug!("SNRM built for server 0x{:X}", self.config.server_address);
                Ok(frame)
            }
        }
    }

    /// Handle the reply to the SNRM
    ///
    /// A UA updates the link limits it carries. A DM means the server
    /// refused the link and the session goes back to idle.
    pub fn complete_physical_connect(&mut self, reply: &[u8]) -> DlmsResult<()> {
        if self.config.interface_type == InterfaceType::Wrapper {
            return Ok(());
        }
        let (frame, _) = HdlcFrame::decode(reply)?;
        self.check_addresses(&frame)?;
        match frame.frame_type()? {
            FrameType::UnnumberedAcknowledge => {
                self.limits.apply_ua_info(&frame.information)?;
                self.sequence.reset();
                self.link_established = true;
                debug!("HDLC link established: {:?}", self.limits);
                Ok(())
            }
            FrameType::DisconnectMode => {
                self.state = AssociationState::Idle;
                Err(DlmsError::Protocol(
                    "Server refused the connection with DM".to_string(),
                ))
            }
            other => Err(DlmsError::ProtocolDecode(format!(
                "Expected UA in reply to SNRM, got {:?}",
                other
            ))),
        }
    }

    /// Build the AARQ
    ///
    /// A fresh client challenge is generated only for levels above `High`.
    /// When ciphering is active the InitiateRequest travels as a
    /// glo-initiateRequest together with the client system title.
    pub fn build_association_request(&mut self) -> DlmsResult<Vec<Vec<u8>>> {
        let logical_name = self.is_logical_name();
        let conformance = if logical_name {
            Conformance::logical_name_default()
        } else {
            Conformance::short_name_default()
        };
        self.proposed_conformance = Some(conformance);
        self.stoc_challenge = None;
        self.server_system_title = None;
        self.authentication_required = false;

        let level = self.config.authentication;
        self.ctos_challenge = if level.uses_challenge() {
            Some(generate_challenge()?)
        } else {
            None
        };
        let calling_authentication_value = match level {
            Authentication::None => None,
            Authentication::Low | Authentication::High => Some(self.config.password.clone()),
            _ => self.ctos_challenge.clone(),
        };

        let initiate = InitiateRequest::new(conformance, self.config.max_receive_pdu_size).encode();
        let ciphered = self.is_ciphered();
        let (user_information, calling_ap_title) = match self.cipher.as_deref_mut() {
            Some(cipher) if cipher.is_ciphered() => {
                let info = cipher.encrypt(tag::GLO_INITIATE_REQUEST, &initiate)?;
                (info, Some(cipher.system_title()))
            }
            Some(cipher) if level == Authentication::HighGmac => {
                (initiate, Some(cipher.system_title()))
            }
            _ => (initiate, None),
        };

        let aarq = AarqRequest {
            logical_name,
            ciphered,
            authentication: level,
            calling_authentication_value,
            calling_ap_title,
            user_information,
        }
        .encode();

        self.sequence.reset();
        let frames = self.frame_apdu(&aarq)?;
        self.association_generated = true;
        self.state = AssociationState::AwaitingAssociationReply;
        debug!(
            "AARQ built: {} addressing, authentication {:?}, ciphered {}",
            if logical_name { "LN" } else { "SN" },
            level,
            ciphered
        );
        Ok(frames)
    }

    /// Handle the AARE
    ///
    /// # Errors
    ///
    /// - `DlmsError::AssociationRejected` when the result is not accepted
    /// - `DlmsError::Protocol` when the server negotiated a DLMS version
    ///   other than 6 or the other addressing method
    pub fn parse_association_reply(&mut self, apdu: &[u8]) -> DlmsResult<()> {
        let aare = Aare::decode(apdu)?;
        if aare.association_result() != Some(AssociationResult::Accepted) {
            warn!(
                "Association rejected: result {}, diagnostic {}",
                aare.result, aare.diagnostic
            );
            self.reset_association();
            return Err(DlmsError::AssociationRejected {
                result: aare.result,
                diagnostic: aare.diagnostic,
            });
        }
        if aare.is_logical_name() != self.is_logical_name() {
            self.reset_association();
            return Err(DlmsError::Protocol(format!(
                "Server accepted application context {}, which does not match the configured addressing",
                aare.application_context_id
            )));
        }

        self.authentication_required = aare.diagnostic_from_user
            && aare.diagnostic == source_diagnostic::AUTHENTICATION_REQUIRED;
        self.server_system_title = aare.responding_ap_title.clone();
        self.stoc_challenge = aare.responding_authentication_value.clone();

        let info = aare.user_information.as_deref().ok_or_else(|| {
            DlmsError::ProtocolDecode("AARE carries no InitiateResponse".to_string())
        })?;
        let response = match self.initiate_response(info) {
            Ok(response) => response,
            Err(e) => {
                self.reset_association();
                return Err(e);
            }
        };
        if response.negotiated_dlms_version_number != DLMS_VERSION_6 {
            self.reset_association();
            return Err(DlmsError::Protocol(format!(
                "Unsupported DLMS version {}",
                response.negotiated_dlms_version_number
            )));
        }

        self.dlms_version = response.negotiated_dlms_version_number;
        self.max_pdu_size = response.server_max_receive_pdu_size;
        self.negotiated_conformance = response.negotiated_conformance;
        self.state = if self.authentication_required {
            AssociationState::AwaitingAuthenticationReply
        } else {
            AssociationState::Associated
        };
        debug!(
            "Association accepted: max PDU {}, conformance 0x{:06X}, authentication required {}",
            self.max_pdu_size,
            self.negotiated_conformance.bits(),
            self.authentication_required
        );
        Ok(())
    }

    fn initiate_response(&self, info: &[u8]) -> DlmsResult<InitiateResponse> {
        if info.first() == Some(&tag::GLO_INITIATE_RESPONSE) {
            let plain = self.decrypt_apdu(info)?;
            InitiateResponse::decode(&plain)
        } else {
            InitiateResponse::decode(info)
        }
    }

    /// Build the `reply_to_HLS_authentication` method call
    ///
    /// The server challenge is transformed with the configured level and
    /// secret; GMAC uses the cipher keys instead of a password.
    pub fn build_authentication_challenge(&mut self) -> DlmsResult<Vec<Vec<u8>>> {
        let level = self.config.authentication;
        if level != Authentication::HighGmac && self.config.password.is_empty() {
            return Err(DlmsError::Argument("Password is not set".to_string()));
        }
        let stoc = self.stoc_challenge.clone().ok_or_else(|| {
            DlmsError::Protocol("Server did not send a challenge".to_string())
        })?;

        let value = if level == Authentication::HighGmac {
            let cipher = self.cipher.as_deref().ok_or_else(|| {
                DlmsError::Security("GMAC authentication requires a cipher".to_string())
            })?;
            cipher.gmac(&cipher.system_title(), cipher.invocation_counter(), &stoc)?
        } else {
            secure(level, &stoc, &self.config.password)?
        };

        let target = self.association_target();
        let index = if self.is_logical_name() {
            LN_REPLY_TO_HLS
        } else {
            SN_REPLY_TO_HLS
        };
        let frames = self.method(
            target,
            index,
            Some(&DataObject::OctetString(value)),
            DataType::OctetString,
        )?;
        self.state = AssociationState::AwaitingAuthenticationReply;
        Ok(frames)
    }

    /// Check the server's answer to our challenge
    ///
    /// `data` is the encoded return value of the method call, an octet
    /// string. The expected value is recomputed from the client challenge
    /// and compared in constant time.
    pub fn verify_authentication_reply(&mut self, data: &[u8]) -> DlmsResult<()> {
        let (value, _) = decode_from_slice(data)?;
        let received = match value {
            DataObject::OctetString(bytes) => bytes,
            other => {
                self.reset_association();
                return Err(DlmsError::ProtocolDecode(format!(
                    "Authentication reply is not an octet string but {:?}",
                    other.data_type()
                )));
            }
        };

        let expected = match self.expected_authentication_reply(&received) {
            Ok(expected) => expected,
            Err(e) => {
                self.reset_association();
                return Err(e);
            }
        };
        if !constant_time_eq(&received, &expected) {
            warn!("Server authentication reply does not match");
            self.reset_association();
            return Err(DlmsError::AuthenticationMismatch);
        }
        self.state = AssociationState::Associated;
        debug!("Server authenticated");
        Ok(())
    }

    fn expected_authentication_reply(&self, received: &[u8]) -> DlmsResult<Vec<u8>> {
        let level = self.config.authentication;
        let ctos = match (&self.ctos_challenge, level.uses_challenge()) {
            (Some(challenge), _) => challenge.as_slice(),
            (None, false) => &[],
            (None, true) => {
                return Err(DlmsError::Protocol(
                    "No client challenge was sent".to_string(),
                ))
            }
        };
        if level == Authentication::HighGmac {
            let cipher = self.cipher.as_deref().ok_or_else(|| {
                DlmsError::Security("GMAC authentication requires a cipher".to_string())
            })?;
            let title = self.server_system_title.as_deref().ok_or_else(|| {
                DlmsError::Security("Server system title is unknown".to_string())
            })?;
            let counter = received.get(1..5).ok_or_else(|| {
                DlmsError::ProtocolDecode("GMAC reply is too short".to_string())
            })?;
            let counter = u32::from_be_bytes([counter[0], counter[1], counter[2], counter[3]]);
            cipher.gmac(title, counter, ctos)
        } else {
            secure(level, ctos, &self.config.password)
        }
    }

    /// Build the disconnect request
    ///
    /// HDLC sends DISC; the wrapper sends a bare release request.
    pub fn build_disconnect(&mut self) -> DlmsResult<Vec<u8>> {
        let frame = match self.config.interface_type {
            InterfaceType::Hdlc => self.control_frame(control::DISC, Vec::new())?,
            InterfaceType::Wrapper => {
                let (client, server) = self.wrapper_addresses()?;
                wrap(client, server, &[tag::RLRQ, 0x00])?
            }
        };
        self.state = AssociationState::Disconnecting;
        Ok(frame)
    }

    /// Build a DM frame
    ///
    /// Empty for the wrapper and when no association was ever requested.
    pub fn build_disconnected_mode(&self) -> DlmsResult<Vec<u8>> {
        if self.config.interface_type == InterfaceType::Wrapper || !self.association_generated {
            return Ok(Vec::new());
        }
        self.control_frame(control::DM, Vec::new())
    }

    /// Build the RLRQ, reason "normal"
    ///
    /// Empty when no association was requested.
    pub fn release_request(&mut self) -> DlmsResult<Vec<Vec<u8>>> {
        if !self.association_generated {
            return Ok(Vec::new());
        }
        let frames = self.frame_apdu(&encode_release_request())?;
        self.state = AssociationState::Disconnecting;
        Ok(frames)
    }

    /// Return to idle after the disconnect or release was answered
    pub fn complete_disconnect(&mut self) {
        self.reset_association();
        self.sequence.reset();
        self.link_established = false;
        self.association_generated = false;
        debug!("Session disconnected");
    }

    fn reset_association(&mut self) {
        self.state = AssociationState::Idle;
        self.proposed_conformance = None;
        self.negotiated_conformance = Conformance::default();
        self.authentication_required = false;
        self.ctos_challenge = None;
        self.stoc_challenge = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use dlms_application::AddressingMethod;
    use dlms_security::Cipher;
    use dlms_session::{HdlcLimits, strip_llc};
    use mockall::mock;

    mock! {
        pub TestCipher {}
        impl Cipher for TestCipher {
            fn is_ciphered(&self) -> bool;
            fn system_title(&self) -> Vec<u8>;
            fn invocation_counter(&self) -> u32;
            fn encrypt(&mut self, tag: u8, apdu: &[u8]) -> DlmsResult<Vec<u8>>;
            fn decrypt(&self, system_title: &[u8], apdu: &[u8]) -> DlmsResult<Vec<u8>>;
            fn gmac(&self, system_title: &[u8], invocation_counter: u32, challenge: &[u8]) -> DlmsResult<Vec<u8>>;
        }
    }

    /// Accepted, LN, no authentication, version 6, max PDU 200
    const ACCEPTED_AARE: &str =
        "6129A109060760857405080101A203020100A305A103020100BE10040E0800065F1F040000101D00C80007";

    fn hex_bytes(text: &str) -> Vec<u8> {
        hex::decode(text).unwrap()
    }

    /// AARE requesting HLS with the given server challenge
    fn hls_aare(mechanism: u8, challenge: &[u8]) -> Vec<u8> {
        let mut body = hex_bytes("A109060760857405080101A203020100A305A10302010E");
        body.extend_from_slice(&[0x88, 0x02, 0x07, 0x80]);
        body.extend_from_slice(&[0x89, 0x07, 0x60, 0x85, 0x74, 0x05, 0x08, 0x02, mechanism]);
        body.push(0xAA);
        body.push(challenge.len() as u8 + 2);
        body.push(0x80);
        body.push(challenge.len() as u8);
        body.extend_from_slice(challenge);
        body.extend_from_slice(&hex_bytes("BE10040E0800065F1F040000101D00C80007"));
        let mut apdu = vec![0x61, body.len() as u8];
        apdu.extend_from_slice(&body);
        apdu
    }

    fn associated_hls(level: Authentication) -> Session {
        let config = SessionConfig::default().with_authentication(level, b"secret12");
        let mut session = Session::new(config);
        session.build_association_request().unwrap();
        session.parse_association_reply(&hls_aare(level.id(), b"P6wRJ21F")).unwrap();
        session
    }

    #[test]
    fn test_end_to_end_association_without_authentication() {
        let mut session = Session::new(SessionConfig::default());
        let frames = session.build_association_request().unwrap();
        assert_eq!(frames.len(), 1);

        let (frame, _) = HdlcFrame::decode(&frames[0]).unwrap();
        assert_eq!(frame.destination, 1);
        assert_eq!(frame.source, 16);
        assert_eq!(strip_llc(&frame.information)[0], tag::AARQ);
        assert_eq!(session.state(), AssociationState::AwaitingAssociationReply);

        session.parse_association_reply(&hex_bytes(ACCEPTED_AARE)).unwrap();
        assert!(session.is_associated());
        assert_eq!(session.max_pdu_size(), 200);
        assert!(!session.is_authentication_required());
        assert_eq!(session.dlms_version(), 6);
    }

    #[test]
    fn test_physical_connect_hdlc() {
        let limits = HdlcLimits {
            max_info_tx: 512,
            ..HdlcLimits::default()
        };
        let mut session = Session::new(SessionConfig::default().with_hdlc_limits(limits));
        let snrm = session.begin_physical_connect().unwrap();
        let (frame, _) = HdlcFrame::decode(&snrm).unwrap();
        assert_eq!(frame.control, control::SNRM);
        assert_eq!(frame.information, limits.encode_snrm_info());
        assert_eq!(session.state(), AssociationState::AwaitingConnect);

        let ua_info = vec![0x81, 0x80, 0x04, 0x05, 0x02, 0x00, 0xF8];
        let ua = HdlcFrame::new(16, 1, control::UA, ua_info).encode().unwrap();
        session.complete_physical_connect(&ua).unwrap();
        assert_eq!(session.hdlc_limits().max_info_tx, 0xF8);
        assert_eq!(session.hdlc_limits().max_info_rx, 128);
    }

    #[test]
    fn test_physical_connect_refused() {
        let mut session = Session::new(SessionConfig::default());
        session.begin_physical_connect().unwrap();
        let dm = HdlcFrame::new(16, 1, control::DM, Vec::new()).encode().unwrap();
        assert!(matches!(
            session.complete_physical_connect(&dm),
            Err(DlmsError::Protocol(_))
        ));
        assert_eq!(session.state(), AssociationState::Idle);
    }

    #[test]
    fn test_wrapper_needs_no_physical_connect() {
        let config = SessionConfig::default().with_interface_type(InterfaceType::Wrapper);
        let mut session = Session::new(config);
        assert!(session.begin_physical_connect().unwrap().is_empty());
        let frames = session.build_association_request().unwrap();
        assert_eq!(&frames[0][..4], &[0x00, 0x01, 0x00, 0x10]);
        assert_eq!(frames[0][8], tag::AARQ);
    }

    #[test]
    fn test_rejected_association_clears_state() {
        let mut session = Session::new(SessionConfig::default());
        session.build_association_request().unwrap();
        let rejected = hex_bytes(
            "6129A109060760857405080101A203020101A305A10302010DBE10040E0800065F1F040000101D00C80007",
        );
        assert!(matches!(
            session.parse_association_reply(&rejected),
            Err(DlmsError::AssociationRejected {
                result: 1,
                diagnostic: 13
            })
        ));
        assert_eq!(session.state(), AssociationState::Idle);
        assert!(session.proposed_conformance().is_none());
    }

    #[test]
    fn test_wrong_version_fails() {
        let mut session = Session::new(SessionConfig::default());
        session.build_association_request().unwrap();
        let v5 = hex_bytes(
            "6129A109060760857405080101A203020100A305A103020100BE10040E0800055F1F040000101D00C80007",
        );
        assert!(matches!(
            session.parse_association_reply(&v5),
            Err(DlmsError::Protocol(_))
        ));
        assert_eq!(session.state(), AssociationState::Idle);
    }

    #[test]
    fn test_low_level_sends_password_without_challenge() {
        let config = SessionConfig::default().with_authentication(Authentication::Low, b"12345678");
        let mut session = Session::new(config);
        let frames = session.build_association_request().unwrap();
        assert!(session.ctos_challenge().is_none());
        let (frame, _) = HdlcFrame::decode(&frames[0]).unwrap();
        let aarq = strip_llc(&frame.information);
        assert!(aarq.windows(8).any(|w| w == b"12345678"));
    }

    #[test]
    fn test_hls_challenge_generated_above_high() {
        let config = SessionConfig::default().with_authentication(Authentication::HighSha256, b"secret12");
        let mut session = Session::new(config);
        session.build_association_request().unwrap();
        assert_eq!(session.ctos_challenge().unwrap().len(), 16);

        let config = SessionConfig::default().with_authentication(Authentication::High, b"secret12");
        let mut session = Session::new(config);
        session.build_association_request().unwrap();
        assert!(session.ctos_challenge().is_none());
    }

    #[test]
    fn test_hls_reply_requires_authentication() {
        let session = associated_hls(Authentication::HighMd5);
        assert!(session.is_authentication_required());
        assert_eq!(session.state(), AssociationState::AwaitingAuthenticationReply);
        assert_eq!(session.stoc_challenge(), Some(&b"P6wRJ21F"[..]));
    }

    #[test]
    fn test_authentication_challenge_ln() {
        let mut session = associated_hls(Authentication::HighMd5);
        let frames = session.build_authentication_challenge().unwrap();
        let (frame, _) = HdlcFrame::decode(&frames[0]).unwrap();
        let apdu = strip_llc(&frame.information);
        assert_eq!(&apdu[..3], &[tag::ACTION_REQUEST, 0x01, 0xC1]);
        assert_eq!(&apdu[3..5], &[0x00, 0x0F]);
        assert_eq!(&apdu[5..11], &[0, 0, 40, 0, 0, 255]);
        assert_eq!(apdu[11], 1);
        assert_eq!(apdu[12], 0x01);
        let expected = secure(Authentication::HighMd5, b"P6wRJ21F", b"secret12").unwrap();
        assert_eq!(apdu[13], 0x09);
        assert_eq!(apdu[14] as usize, expected.len());
        assert_eq!(&apdu[15..], expected.as_slice());
    }

    #[test]
    fn test_authentication_challenge_sn() {
        let config = SessionConfig::default()
            .with_addressing(AddressingMethod::ShortName)
            .with_authentication(Authentication::HighSha1, b"secret12");
        let mut session = Session::new(config);
        session.stoc_challenge = Some(b"ABCDEFGH".to_vec());
        let frames = session.build_authentication_challenge().unwrap();
        let (frame, _) = HdlcFrame::decode(&frames[0]).unwrap();
        let apdu = strip_llc(&frame.information);
        assert_eq!(&apdu[..5], &[tag::READ_REQUEST, 0x01, 0x04, 0xFA, 0x58]);
    }

    #[test]
    fn test_authentication_challenge_requires_password() {
        let config = SessionConfig::default().with_authentication(Authentication::HighMd5, b"");
        let mut session = Session::new(config);
        session.stoc_challenge = Some(b"ABCDEFGH".to_vec());
        assert!(matches!(
            session.build_authentication_challenge(),
            Err(DlmsError::Argument(_))
        ));
    }

    #[test]
    fn test_verify_accepts_exactly_the_secured_challenge() {
        for level in [
            Authentication::Low,
            Authentication::High,
            Authentication::HighMd5,
            Authentication::HighSha1,
            Authentication::HighSha256,
        ] {
            let mut session = associated_hls(level);
            let ctos = session.ctos_challenge().map(<[u8]>::to_vec).unwrap_or_default();
            let expected = secure(level, &ctos, b"secret12").unwrap();

            let mut wrong = expected.clone();
            wrong[0] ^= 0xFF;
            let mut reply = vec![0x09, wrong.len() as u8];
            reply.extend_from_slice(&wrong);
            assert!(matches!(
                session.verify_authentication_reply(&reply),
                Err(DlmsError::AuthenticationMismatch)
            ));
            assert_eq!(session.state(), AssociationState::Idle);

            let mut session = associated_hls(level);
            let ctos = session.ctos_challenge().map(<[u8]>::to_vec).unwrap_or_default();
            let expected = secure(level, &ctos, b"secret12").unwrap();
            let mut reply = vec![0x09, expected.len() as u8];
            reply.extend_from_slice(&expected);
            session.verify_authentication_reply(&reply).unwrap();
            assert!(session.is_associated());
        }
    }

    #[test]
    fn test_gmac_goes_through_cipher() {
        let mut cipher = MockTestCipher::new();
        cipher.expect_is_ciphered().return_const(false);
        cipher.expect_system_title().return_const(b"CLIENT01".to_vec());
        cipher.expect_invocation_counter().return_const(7u32);
        cipher
            .expect_gmac()
            .withf(|title, counter, challenge| {
                title == b"CLIENT01" && *counter == 7 && challenge == b"P6wRJ21F"
            })
            .returning(|_, _, _| Ok(vec![0x10, 0, 0, 0, 7, 0xAA]));

        let config = SessionConfig::default().with_authentication(Authentication::HighGmac, b"");
        let mut session = Session::new(config).with_cipher(Box::new(cipher));
        session.stoc_challenge = Some(b"P6wRJ21F".to_vec());
        let frames = session.build_authentication_challenge().unwrap();
        let (frame, _) = HdlcFrame::decode(&frames[0]).unwrap();
        let apdu = strip_llc(&frame.information);
        assert!(apdu.ends_with(&[0x09, 0x06, 0x10, 0, 0, 0, 7, 0xAA]));
    }

    #[test]
    fn test_ciphered_aarq_carries_title_and_glo_initiate() {
        let mut cipher = MockTestCipher::new();
        cipher.expect_is_ciphered().return_const(true);
        cipher.expect_system_title().return_const(b"CLIENT01".to_vec());
        cipher
            .expect_encrypt()
            .withf(|glo, _| *glo == tag::GLO_INITIATE_REQUEST)
            .times(1)
            .returning(|glo, _| Ok(vec![glo, 0x02, 0xAB, 0xCD]));

        let mut session = Session::new(SessionConfig::default()).with_cipher(Box::new(cipher));
        let frames = session.build_association_request().unwrap();
        let (frame, _) = HdlcFrame::decode(&frames[0]).unwrap();
        let aarq = strip_llc(&frame.information);
        assert!(aarq.windows(8).any(|w| w == b"CLIENT01"));
        assert!(aarq.windows(4).any(|w| w == [0x21, 0x02, 0xAB, 0xCD]));
    }

    #[test]
    fn test_disconnect_and_disconnected_mode() {
        let mut session = Session::new(SessionConfig::default());
        assert!(session.build_disconnected_mode().unwrap().is_empty());
        assert!(session.release_request().unwrap().is_empty());

        session.build_association_request().unwrap();
        let dm = session.build_disconnected_mode().unwrap();
        assert_eq!(HdlcFrame::decode(&dm).unwrap().0.control, control::DM);

        let disc = session.build_disconnect().unwrap();
        assert_eq!(HdlcFrame::decode(&disc).unwrap().0.control, control::DISC);
        assert_eq!(session.state(), AssociationState::Disconnecting);
        session.complete_disconnect();
        assert_eq!(session.state(), AssociationState::Idle);
        assert_eq!(session.frame_sequence().send_sequence(), 0);
    }

    #[test]
    fn test_wrapper_disconnect() {
        let config = SessionConfig::default().with_interface_type(InterfaceType::Wrapper);
        let mut session = Session::new(config);
        session.build_association_request().unwrap();
        assert_eq!(
            session.build_disconnect().unwrap(),
            vec![0x00, 0x01, 0x00, 0x10, 0x00, 0x01, 0x00, 0x02, 0x62, 0x00]
        );
        assert!(session.build_disconnected_mode().unwrap().is_empty());
    }

    #[test]
    fn test_release_request() {
        let mut session = Session::new(SessionConfig::default());
        session.build_association_request().unwrap();
        session.parse_association_reply(&hex_bytes(ACCEPTED_AARE)).unwrap();
        let frames = session.release_request().unwrap();
        let (frame, _) = HdlcFrame::decode(&frames[0]).unwrap();
        assert_eq!(strip_llc(&frame.information), &[0x62, 0x03, 0x80, 0x01, 0x00]);
    }
}
