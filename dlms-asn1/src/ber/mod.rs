//! BER (Basic Encoding Rules) support for the ACSE APDUs
//!
//! Each value is a TLV triplet `[Tag] [Length] [Value]`. Only definite
//! lengths and single-octet tags are handled; that covers AARQ, AARE, RLRQ
//! and RLRE as used by DLMS/COSEM.

pub mod decoder;
pub mod encoder;
pub mod types;

pub use decoder::BerDecoder;
pub use encoder::BerEncoder;
pub use types::{BerLength, BerTag, BerTagClass};
