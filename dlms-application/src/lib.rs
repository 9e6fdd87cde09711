//! Application layer module for DLMS/COSEM protocol
//!
//! This crate provides the xDLMS and ACSE encodings the client builds its
//! requests from:
//!
//! - [`command`]: APDU tags and the invoke-id-and-priority byte
//! - [`pdu`]: InitiateRequest / InitiateResponse and conformance
//! - [`association`]: AARQ, AARE, RLRQ and the association state
//! - [`addressing`]: logical and short name helpers
//! - [`splitter`]: block transfer and ciphering of service requests

pub mod addressing;
pub mod association;
pub mod command;
pub mod pdu;
pub mod splitter;

pub use addressing::{AddressingMethod, attribute_short_name, method_short_name, parse_logical_name};
pub use association::{Aare, AarqRequest, AssociationResult, AssociationState};
pub use command::{InvokeIdAndPriority, Priority, ServiceClass};
pub use pdu::{Conformance, InitiateRequest, InitiateResponse};
pub use splitter::{PduContext, ServiceRequest, get_request_next, split_pdu};
