//! HDLC link parameters
//!
//! The parameters are proposed in the SNRM information field and answered
//! by the server in the UA frame. Both use the same layout:
//!
//! - Format identifier: `0x81`
//! - Group identifier: `0x80`
//! - Group length
//! - Parameters: `id | size | value (big-endian)`

use dlms_core::{DlmsError, DlmsResult};
use log::debug;
use serde::{Deserialize, Serialize};

const FORMAT_IDENTIFIER: u8 = 0x81;
const GROUP_IDENTIFIER: u8 = 0x80;

/// Parameter identifiers
pub mod parameter {
    pub const MAX_INFO_TX: u8 = 0x05;
    pub const MAX_INFO_RX: u8 = 0x06;
    pub const WINDOW_SIZE_TX: u8 = 0x07;
    pub const WINDOW_SIZE_RX: u8 = 0x08;
}

pub const DEFAULT_MAX_INFO_LENGTH: u16 = 128;
pub const DEFAULT_WINDOW_SIZE: u8 = 1;

/// Negotiated HDLC link limits
///
/// The `tx` direction is client to server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HdlcLimits {
    pub max_info_tx: u16,
    pub max_info_rx: u16,
    pub window_size_tx: u8,
    pub window_size_rx: u8,
}

impl Default for HdlcLimits {
    fn default() -> Self {
        Self {
            max_info_tx: DEFAULT_MAX_INFO_LENGTH,
            max_info_rx: DEFAULT_MAX_INFO_LENGTH,
            window_size_tx: DEFAULT_WINDOW_SIZE,
            window_size_rx: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl HdlcLimits {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// SNRM information field
    ///
    /// Only values that differ from the defaults are sent. An empty vector
    /// means the SNRM frame carries no information field.
    pub fn encode_snrm_info(&self) -> Vec<u8> {
        if self.is_default() {
            return Vec::new();
        }

        let mut group = Vec::new();
        if self.max_info_tx != DEFAULT_MAX_INFO_LENGTH {
            push_parameter(&mut group, parameter::MAX_INFO_TX, self.max_info_tx as u32);
        }
        if self.max_info_rx != DEFAULT_MAX_INFO_LENGTH {
            push_parameter(&mut group, parameter::MAX_INFO_RX, self.max_info_rx as u32);
        }
        if self.window_size_tx != DEFAULT_WINDOW_SIZE {
            push_parameter(&mut group, parameter::WINDOW_SIZE_TX, self.window_size_tx as u32);
        }
        if self.window_size_rx != DEFAULT_WINDOW_SIZE {
            push_parameter(&mut group, parameter::WINDOW_SIZE_RX, self.window_size_rx as u32);
        }

        let mut result = Vec::with_capacity(group.len() + 3);
        result.push(FORMAT_IDENTIFIER);
        result.push(GROUP_IDENTIFIER);
        result.push(group.len() as u8);
        result.extend_from_slice(&group);
        result
    }

    /// Apply the parameters returned in a UA information field
    ///
    /// An empty field leaves the limits unchanged. The server's view is
    /// written as seen from the client, so its "transmit" values land on
    /// the same fields they name.
    ///
    /// # Errors
    ///
    /// Returns `DlmsError::ProtocolDecode` for a value width other than 1, 2
    /// or 4 bytes, an unknown parameter identifier or a truncated field.
    pub fn apply_ua_info(&mut self, info: &[u8]) -> DlmsResult<()> {
        if info.is_empty() {
            return Ok(());
        }
        if info.len() < 3 {
            return Err(DlmsError::ProtocolDecode(
                "UA information field too short".to_string(),
            ));
        }

        let mut pos = 3;
        while pos < info.len() {
            let id = info[pos];
            let size = *info.get(pos + 1).ok_or_else(|| {
                DlmsError::ProtocolDecode("UA parameter without size".to_string())
            })? as usize;
            pos += 2;
            let bytes = info.get(pos..pos + size).ok_or_else(|| {
                DlmsError::ProtocolDecode(format!(
                    "UA parameter 0x{:02X} truncated",
                    id
                ))
            })?;
            let value = match size {
                1 => bytes[0] as u32,
                2 => u16::from_be_bytes([bytes[0], bytes[1]]) as u32,
                4 => u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
                _ => {
                    return Err(DlmsError::ProtocolDecode(format!(
                        "Invalid UA parameter size {}",
                        size
                    )))
                }
            };
            pos += size;

            match id {
                parameter::MAX_INFO_TX => self.max_info_tx = value as u16,
                parameter::MAX_INFO_RX => self.max_info_rx = value as u16,
                parameter::WINDOW_SIZE_TX => self.window_size_tx = value as u8,
                parameter::WINDOW_SIZE_RX => self.window_size_rx = value as u8,
                _ => {
                    return Err(DlmsError::ProtocolDecode(format!(
                        "Unknown UA parameter 0x{:02X}",
                        id
                    )))
                }
            }
        }
        debug!("Negotiated HDLC limits: {:?}", self);
        Ok(())
    }
}

fn push_parameter(group: &mut Vec<u8>, id: u8, value: u32) {
    group.push(id);
    if value < 0x100 {
        group.push(1);
        group.push(value as u8);
    } else {
        group.push(2);
        group.extend_from_slice(&(value as u16).to_be_bytes());
    }
}
