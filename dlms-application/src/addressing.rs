//! Addressing module for DLMS/COSEM application layer
//!
//! - Logical Name (LN) addressing names an object by class id and a 6-byte
//!   OBIS code.
//! - Short Name (SN) addressing names every attribute and method by a
//!   16-bit offset from the object's base name.

use dlms_core::{DlmsError, DlmsResult, ObisCode};
use serde::{Deserialize, Serialize};

/// Distance between consecutive attribute or method short names
pub const SHORT_NAME_STEP: u16 = 8;

/// Addressing method for DLMS/COSEM objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AddressingMethod {
    #[default]
    LogicalName,
    ShortName,
}

impl AddressingMethod {
    pub fn is_logical_name(&self) -> bool {
        *self == AddressingMethod::LogicalName
    }
}

/// Parse a logical name written as six dot-separated decimal octets
///
/// # Errors
///
/// Returns `DlmsError::Argument` unless the text splits into exactly six
/// components that each fit in a byte.
pub fn parse_logical_name(name: &str) -> DlmsResult<ObisCode> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() != 6 {
        return Err(DlmsError::Argument(format!(
            "Logical name '{}' must have 6 dot-separated parts, got {}",
            name,
            parts.len()
        )));
    }
    let mut bytes = [0u8; 6];
    for (byte, part) in bytes.iter_mut().zip(&parts) {
        *byte = part.trim().parse().map_err(|_| {
            DlmsError::Argument(format!("Invalid logical name part '{}' in '{}'", part, name))
        })?;
    }
    Ok(ObisCode::new(
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5],
    ))
}

/// Short name of attribute `index` of the object at `base`
///
/// # Errors
///
/// Returns `DlmsError::Argument` for index 0 or when the result overflows.
pub fn attribute_short_name(base: u16, index: u8) -> DlmsResult<u16> {
    if index < 1 {
        return Err(DlmsError::Argument(
            "Attribute index must be at least 1".to_string(),
        ));
    }
    base.checked_add((index as u16 - 1) * SHORT_NAME_STEP)
        .ok_or_else(|| {
            DlmsError::Argument(format!(
                "Short name of attribute {} overflows base 0x{:04X}",
                index, base
            ))
        })
}

/// Short name of method `index`, given the class's first method offset
/// and method count
pub fn method_short_name(
    base: u16,
    first_method_offset: u16,
    method_count: u8,
    index: u8,
) -> DlmsResult<u16> {
    if index < 1 || index > method_count {
        return Err(DlmsError::Argument(format!(
            "Method index {} is out of range, class has {} methods",
            index, method_count
        )));
    }
    base.checked_add(first_method_offset)
        .and_then(|v| v.checked_add((index as u16 - 1) * SHORT_NAME_STEP))
        .ok_or_else(|| {
            DlmsError::Argument(format!(
                "Short name of method {} overflows base 0x{:04X}",
                index, base
            ))
        })
}
