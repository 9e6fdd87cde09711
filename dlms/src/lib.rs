//! DLMS/COSEM client engine
//!
//! Builds the frames a client sends to a meter and decodes what comes
//! back. The engine performs no I/O; the caller moves bytes between a
//! [`client::Session`] and its transport.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `dlms-core`: Core types, error handling, OBIS codes and date/time
//! - `dlms-asn1`: A-XDR encoding/decoding
//! - `dlms-session`: HDLC and wrapper framing
//! - `dlms-security`: Authentication digests and ciphering
//! - `dlms-application`: APDUs, association PDUs and the PDU splitter
//! - `dlms-interface`: COSEM interface classes and the object registry
//! - `dlms-client`: Session, association, requests, replies, object
//!   directory and push decoding
//!
//! # Usage
//!
//! ```no_run
//! use dlms::client::{Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default());
//! let snrm = session.begin_physical_connect();
//! # let _ = snrm;
//! ```

// Re-export core types
pub use dlms_core::{DlmsError, DlmsResult, ObisCode};
pub use dlms_core::datatypes::*;

// Re-export client API
pub mod client {
    pub use dlms_client::*;
}

// Re-export interface classes
pub mod interface {
    pub use dlms_interface::*;
}

pub mod asn1 {
    pub use dlms_asn1::*;
}

pub mod session {
    pub use dlms_session::*;
}

pub mod security {
    pub use dlms_security::*;
}

pub mod application {
    pub use dlms_application::*;
}
