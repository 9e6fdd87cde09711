//! DLMS/COSEM security constants
//!
//! Application context names and authentication mechanism names as carried
//! in the AARQ/AARE object identifiers.

use crate::authentication::Authentication;

/// Common prefix of application context names: {2, 16, 756, 5, 8, 1}
pub const APPLICATION_CONTEXT_PREFIX: &[u32] = &[2, 16, 756, 5, 8, 1];

/// Common prefix of mechanism names: {2, 16, 756, 5, 8, 2}
pub const MECHANISM_NAME_PREFIX: &[u32] = &[2, 16, 756, 5, 8, 2];

/// Application Context Name for Logical Name Referencing without ciphering
pub const CONTEXT_LN_NO_CIPHER: &[u32] = &[2, 16, 756, 5, 8, 1, 1];

/// Application Context Name for Short Name Referencing without ciphering
pub const CONTEXT_SN_NO_CIPHER: &[u32] = &[2, 16, 756, 5, 8, 1, 2];

/// Application Context Name for Logical Name Referencing with ciphering
pub const CONTEXT_LN_CIPHER: &[u32] = &[2, 16, 756, 5, 8, 1, 3];

/// Application Context Name for Short Name Referencing with ciphering
pub const CONTEXT_SN_CIPHER: &[u32] = &[2, 16, 756, 5, 8, 1, 4];

/// Length of the client to server challenge
pub const CHALLENGE_LENGTH: usize = 16;

/// Last arc of the application context name
pub fn application_context_id(logical_name: bool, ciphered: bool) -> u8 {
    match (logical_name, ciphered) {
        (true, false) => 1,
        (false, false) => 2,
        (true, true) => 3,
        (false, true) => 4,
    }
}

/// Full application context name OID
pub fn application_context_name(logical_name: bool, ciphered: bool) -> Vec<u32> {
    let mut oid = APPLICATION_CONTEXT_PREFIX.to_vec();
    oid.push(application_context_id(logical_name, ciphered) as u32);
    oid
}

/// Full mechanism name OID for an authentication level
pub fn mechanism_name(level: Authentication) -> Vec<u32> {
    let mut oid = MECHANISM_NAME_PREFIX.to_vec();
    oid.push(level.id() as u32);
    oid
}

/// Check if an OID matches a known application context name
///
/// Returns `Some(true)` for a ciphering context, `Some(false)` for a plain
/// one, or `None` when the OID is not an application context name.
pub fn is_ciphering_context(oid: &[u32]) -> Option<bool> {
    match oid {
        oid if oid == CONTEXT_LN_CIPHER || oid == CONTEXT_SN_CIPHER => Some(true),
        oid if oid == CONTEXT_LN_NO_CIPHER || oid == CONTEXT_SN_NO_CIPHER => Some(false),
        _ => None,
    }
}

/// Check if an OID uses Logical Name (LN) addressing
pub fn is_logical_name_addressing(oid: &[u32]) -> bool {
    oid == CONTEXT_LN_NO_CIPHER || oid == CONTEXT_LN_CIPHER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_names() {
        assert_eq!(application_context_name(true, false), CONTEXT_LN_NO_CIPHER);
        assert_eq!(application_context_name(false, true), CONTEXT_SN_CIPHER);
        assert_eq!(is_ciphering_context(CONTEXT_LN_CIPHER), Some(true));
        assert_eq!(is_ciphering_context(&[1, 2, 3]), None);
        assert!(!is_logical_name_addressing(CONTEXT_SN_NO_CIPHER));
    }

    #[test]
    fn test_mechanism_name() {
        assert_eq!(
            mechanism_name(Authentication::HighGmac),
            vec![2, 16, 756, 5, 8, 2, 5]
        );
    }
}
