//! Client session
//!
//! A [`Session`] holds everything one logical connection needs between
//! calls: addressing, negotiated limits, the association state, challenges,
//! the invoke id and the HDLC sequence numbers. It is owned by the caller
//! and threaded explicitly through every builder and parser call.
//!
//! A session is not meant to be shared between threads without external
//! serialization; later calls read back state written by earlier ones
//! (authentication verification reads the challenge generated for the AARQ).

pub mod association;
pub mod config;

pub use config::SessionConfig;

use dlms_application::pdu::{DLMS_VERSION_6, MAX_PDU_SIZE};
use dlms_application::{AssociationState, Conformance, InvokeIdAndPriority, PduContext, ServiceRequest, split_pdu};
use dlms_core::{DlmsError, DlmsResult};
use dlms_interface::ObjectRegistry;
use dlms_security::Cipher;
use dlms_session::{FrameSequence, HdlcFrame, HdlcLimits, InterfaceType, split_to_hdlc_frames, wrap};
use log::{debug, trace};
use std::fmt;

/// Invoke id of the first request of a session
const FIRST_INVOKE_ID: u8 = 1;

pub struct Session {
    config: SessionConfig,
    cipher: Option<Box<dyn Cipher>>,
    state: AssociationState,
    invoke_id: u8,
    last_invoke_id: u8,
    sequence: FrameSequence,
    limits: HdlcLimits,
    max_pdu_size: u16,
    dlms_version: u8,
    negotiated_conformance: Conformance,
    proposed_conformance: Option<Conformance>,
    authentication_required: bool,
    ctos_challenge: Option<Vec<u8>>,
    stoc_challenge: Option<Vec<u8>>,
    server_system_title: Option<Vec<u8>>,
    link_established: bool,
    association_generated: bool,
    /// Number of the last data block received
    block_index: u32,
    objects: ObjectRegistry,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let limits = config.hdlc_limits;
        Self {
            config,
            cipher: None,
            state: AssociationState::Idle,
            invoke_id: FIRST_INVOKE_ID,
            last_invoke_id: FIRST_INVOKE_ID,
            sequence: FrameSequence::new(),
            limits,
            max_pdu_size: MAX_PDU_SIZE,
            dlms_version: DLMS_VERSION_6,
            negotiated_conformance: Conformance::default(),
            proposed_conformance: None,
            authentication_required: false,
            ctos_challenge: None,
            stoc_challenge: None,
            server_system_title: None,
            link_established: false,
            association_generated: false,
            block_index: 0,
            objects: ObjectRegistry::new(),
        }
    }

    /// Cipher every service PDU and the AARQ user information
    pub fn with_cipher(mut self, cipher: Box<dyn Cipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    pub fn set_cipher(&mut self, cipher: Option<Box<dyn Cipher>>) {
        self.cipher = cipher;
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> AssociationState {
        self.state
    }

    pub fn is_associated(&self) -> bool {
        self.state == AssociationState::Associated
    }

    pub fn is_logical_name(&self) -> bool {
        self.config.addressing.is_logical_name()
    }

    /// Max PDU size, the server's value once the association is accepted
    pub fn max_pdu_size(&self) -> u16 {
        self.max_pdu_size
    }

    pub fn dlms_version(&self) -> u8 {
        self.dlms_version
    }

    pub fn negotiated_conformance(&self) -> Conformance {
        self.negotiated_conformance
    }

    /// Conformance proposed in the last AARQ, cleared when rejected
    pub fn proposed_conformance(&self) -> Option<Conformance> {
        self.proposed_conformance
    }

    /// The AARE asked for the HLS challenge exchange
    pub fn is_authentication_required(&self) -> bool {
        self.authentication_required
    }

    pub fn ctos_challenge(&self) -> Option<&[u8]> {
        self.ctos_challenge.as_deref()
    }

    pub fn stoc_challenge(&self) -> Option<&[u8]> {
        self.stoc_challenge.as_deref()
    }

    pub fn server_system_title(&self) -> Option<&[u8]> {
        self.server_system_title.as_deref()
    }

    pub fn hdlc_limits(&self) -> &HdlcLimits {
        &self.limits
    }

    pub fn frame_sequence(&self) -> &FrameSequence {
        &self.sequence
    }

    /// Invoke id the next LN request will carry
    pub fn invoke_id(&self) -> u8 {
        self.invoke_id
    }

    pub fn is_ciphered(&self) -> bool {
        self.cipher.as_ref().is_some_and(|c| c.is_ciphered())
    }

    pub fn objects(&self) -> &ObjectRegistry {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.objects
    }

    /// Number of the last data block received
    pub fn block_index(&self) -> u32 {
        self.block_index
    }

    pub(crate) fn set_block_index(&mut self, block_index: u32) {
        self.block_index = block_index;
    }

    pub(crate) fn last_invoke_id(&self) -> u8 {
        self.last_invoke_id
    }

    pub(crate) fn set_max_pdu_size(&mut self, size: u16) {
        self.max_pdu_size = size;
    }

    pub(crate) fn on_frame_received(&mut self, control: u8) -> DlmsResult<()> {
        self.sequence.on_frame_received(control)
    }

    pub(crate) fn cipher(&self) -> Option<&dyn Cipher> {
        self.cipher.as_deref()
    }

    pub(crate) fn cipher_mut(&mut self) -> Option<&mut (dyn Cipher + 'static)> {
        self.cipher.as_deref_mut()
    }

    pub(crate) fn invoke(&self, invoke_id: u8) -> DlmsResult<InvokeIdAndPriority> {
        InvokeIdAndPriority::new(invoke_id, self.config.priority, self.config.service_class)
    }

    fn pdu_context(&self) -> DlmsResult<PduContext> {
        Ok(PduContext {
            logical_name: self.is_logical_name(),
            max_pdu_size: self.max_pdu_size,
            invoke: self.invoke(self.invoke_id)?,
        })
    }

    /// Split, cipher and frame a service request
    ///
    /// Consumes one invoke id under LN addressing.
    pub(crate) fn send(&mut self, request: ServiceRequest) -> DlmsResult<Vec<Vec<u8>>> {
        let context = self.pdu_context()?;
        let pdus = split_pdu(&context, &request, self.cipher.as_deref_mut())?;
        if context.logical_name {
            self.last_invoke_id = self.invoke_id;
            self.invoke_id = (self.invoke_id + 1) & InvokeIdAndPriority::MAX_INVOKE_ID;
        }
        self.frame_pdus(pdus)
    }

    pub(crate) fn frame_pdus(&mut self, pdus: Vec<Vec<u8>>) -> DlmsResult<Vec<Vec<u8>>> {
        let mut frames = Vec::new();
        for pdu in pdus {
            frames.extend(self.frame_apdu(&pdu)?);
        }
        debug!("{} frame(s) ready to send", frames.len());
        Ok(frames)
    }

    /// Frame one APDU for the configured interface
    pub(crate) fn frame_apdu(&mut self, apdu: &[u8]) -> DlmsResult<Vec<Vec<u8>>> {
        match self.config.interface_type {
            InterfaceType::Hdlc => split_to_hdlc_frames(
                self.config.server_address,
                self.config.client_address,
                self.limits.max_info_tx,
                &mut self.sequence,
                apdu,
            ),
            InterfaceType::Wrapper => {
                let (client, server) = self.wrapper_addresses()?;
                Ok(vec![wrap(client, server, apdu)?])
            }
        }
    }

    /// Unnumbered or supervisory HDLC frame with the session addresses
    pub(crate) fn control_frame(&self, control: u8, information: Vec<u8>) -> DlmsResult<Vec<u8>> {
        let frame = HdlcFrame::new(
            self.config.server_address,
            self.config.client_address,
            control,
            information,
        )
        .encode()?;
        trace!("Control frame 0x{:02X}: {}", control, hex::encode_upper(&frame));
        Ok(frame)
    }

    /// Reject frames that are not from our server to us
    pub(crate) fn check_addresses(&self, frame: &HdlcFrame) -> DlmsResult<()> {
        if frame.destination != self.config.client_address || frame.source != self.config.server_address {
            return Err(DlmsError::FrameInvalid(format!(
                "Frame from 0x{:X} to 0x{:X} does not belong to this session",
                frame.source, frame.destination
            )));
        }
        Ok(())
    }

    pub(crate) fn wrapper_addresses(&self) -> DlmsResult<(u16, u16)> {
        let client = u16::try_from(self.config.client_address).map_err(|_| {
            DlmsError::Argument(format!(
                "Client address {} does not fit a wrapper header",
                self.config.client_address
            ))
        })?;
        let server = u16::try_from(self.config.server_address).map_err(|_| {
            DlmsError::Argument(format!(
                "Server address {} does not fit a wrapper header",
                self.config.server_address
            ))
        })?;
        Ok((client, server))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("ciphered", &self.is_ciphered())
            .field("state", &self.state)
            .field("invoke_id", &self.invoke_id)
            .field("sequence", &self.sequence)
            .field("limits", &self.limits)
            .field("max_pdu_size", &self.max_pdu_size)
            .field("authentication_required", &self.authentication_required)
            .field("objects", &self.objects.len())
            .finish()
    }
}
