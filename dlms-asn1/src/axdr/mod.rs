//! A-XDR encoding/decoding module

pub mod decoder;
pub mod encoder;
pub mod types;

pub use decoder::AxdrDecoder;
pub use encoder::AxdrEncoder;
pub use types::LengthEncoding;
