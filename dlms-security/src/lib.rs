//! Security module for DLMS/COSEM protocol
//!
//! Authentication levels with the HLS challenge transform, and the optional
//! ciphering collaborator used to wrap xDLMS APDUs.

pub mod authentication;
pub mod cipher;
pub mod constants;

pub use authentication::{constant_time_eq, generate_challenge, secure, Authentication};
pub use cipher::{Cipher, GcmCipher, SecurityControl};
pub use dlms_core::{DlmsError, DlmsResult};
