//! Association module for DLMS/COSEM connections
//!
//! Encoding and decoding of the ACSE APDUs and the association state enum.
//! The client drives the state transitions.

pub mod acse;
pub mod state;

pub use acse::{Aare, AarqRequest, encode_release_request, is_acse_apdu};
pub use state::{AssociationResult, AssociationState, source_diagnostic};
