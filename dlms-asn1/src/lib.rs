//! Encoding layers for DLMS/COSEM
//!
//! - [`axdr`]: the A-XDR data codec used for attribute values and xDLMS PDUs
//! - [`ber`]: the BER subset needed by the ACSE association APDUs

pub mod axdr;
pub mod ber;

pub use axdr::decoder::decode_from_slice;
pub use axdr::encoder::encode_to_vec;
pub use axdr::{AxdrDecoder, AxdrEncoder, LengthEncoding};
pub use ber::{BerDecoder, BerEncoder, BerLength, BerTag, BerTagClass};
pub use dlms_core::{DlmsError, DlmsResult};
