//! Authentication levels and the HLS challenge transform

use crate::constants::CHALLENGE_LENGTH;
use dlms_core::{DlmsError, DlmsResult};
use md5::Md5;
use ring::digest;
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Authentication level, ordered from weakest to strongest
///
/// The discriminant is the last arc of the mechanism name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Authentication {
    /// No authentication used
    #[default]
    None = 0,
    /// Authentication of the client by sending a shared password as secret
    Low = 1,
    /// Manufacturer specific high level authentication
    High = 2,
    HighMd5 = 3,
    HighSha1 = 4,
    /// Both sides prove the shared key with a GMAC over the peer's challenge
    HighGmac = 5,
    HighSha256 = 6,
    HighEcdsa = 7,
}

impl Authentication {
    /// Get mechanism ID
    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// Get level from mechanism ID
    pub fn from_id(id: u8) -> DlmsResult<Self> {
        let level = match id {
            0 => Authentication::None,
            1 => Authentication::Low,
            2 => Authentication::High,
            3 => Authentication::HighMd5,
            4 => Authentication::HighSha1,
            5 => Authentication::HighGmac,
            6 => Authentication::HighSha256,
            7 => Authentication::HighEcdsa,
            _ => {
                return Err(DlmsError::Security(format!(
                    "Invalid authentication mechanism ID: {}",
                    id
                )))
            }
        };
        Ok(level)
    }

    /// Levels above `High` run the challenge-response exchange
    pub fn uses_challenge(&self) -> bool {
        *self > Authentication::High
    }
}

/// Transform a challenge with the shared secret for the given level
///
/// - `Low` and `High` return the secret unchanged
/// - `HighMd5`, `HighSha1` and `HighSha256` return the digest of
///   `challenge || secret`
///
/// `HighGmac` is keyed by the cipher and goes through
/// [`Cipher::gmac`](crate::cipher::Cipher::gmac) instead.
///
/// # Errors
///
/// Returns `DlmsError::Security` for `HighGmac`, `HighEcdsa` and `None`.
pub fn secure(level: Authentication, challenge: &[u8], secret: &[u8]) -> DlmsResult<Vec<u8>> {
    match level {
        Authentication::Low | Authentication::High => Ok(secret.to_vec()),
        Authentication::HighMd5 => {
            let mut hasher = Md5::new();
            hasher.update(challenge);
            hasher.update(secret);
            Ok(hasher.finalize().to_vec())
        }
        Authentication::HighSha1 => {
            let mut context = digest::Context::new(&digest::SHA1_FOR_LEGACY_USE_ONLY);
            context.update(challenge);
            context.update(secret);
            Ok(context.finish().as_ref().to_vec())
        }
        Authentication::HighSha256 => {
            let mut hasher = Sha256::new();
            hasher.update(challenge);
            hasher.update(secret);
            Ok(hasher.finalize().to_vec())
        }
        Authentication::HighGmac => Err(DlmsError::Security(
            "GMAC authentication requires a cipher".to_string(),
        )),
        Authentication::HighEcdsa => Err(DlmsError::Security(
            "ECDSA authentication is not supported".to_string(),
        )),
        Authentication::None => Err(DlmsError::Security(
            "No secret is used without authentication".to_string(),
        )),
    }
}

/// Generate a fresh client to server challenge from the OS CSPRNG
pub fn generate_challenge() -> DlmsResult<Vec<u8>> {
    let rng = SystemRandom::new();
    let mut challenge = vec![0u8; CHALLENGE_LENGTH];
    rng.fill(&mut challenge)
        .map_err(|_| DlmsError::Security("Failed to generate challenge".to_string()))?;
    Ok(challenge)
}

/// Compare two byte strings in constant time
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_digest_vectors() {
        let md5 = secure(Authentication::HighMd5, b"ab", b"c").unwrap();
        assert_eq!(hex::encode(md5), "900150983cd24fb0d6963f7d28e17f72");

        let sha1 = secure(Authentication::HighSha1, b"a", b"bc").unwrap();
        assert_eq!(hex::encode(sha1), "a9993e364706816aba3e25717850c26c9cd0d89d");

        let sha256 = secure(Authentication::HighSha256, b"", b"abc").unwrap();
        assert_eq!(
            hex::encode(sha256),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_secure_low_returns_secret() {
        assert_eq!(
            secure(Authentication::Low, b"ignored", b"12345678").unwrap(),
            b"12345678".to_vec()
        );
        assert_eq!(
            secure(Authentication::High, b"ignored", b"secret").unwrap(),
            b"secret".to_vec()
        );
    }

    #[test]
    fn test_secure_unsupported_levels() {
        assert!(secure(Authentication::HighEcdsa, b"c", b"s").is_err());
        assert!(secure(Authentication::HighGmac, b"c", b"s").is_err());
    }

    #[test]
    fn test_generate_challenge() {
        let first = generate_challenge().unwrap();
        let second = generate_challenge().unwrap();
        assert_eq!(first.len(), CHALLENGE_LENGTH);
        assert_ne!(first, second);
    }

    #[test]
    fn test_level_ordering() {
        assert!(!Authentication::High.uses_challenge());
        assert!(Authentication::HighMd5.uses_challenge());
        assert_eq!(Authentication::from_id(6).unwrap(), Authentication::HighSha256);
        assert!(Authentication::from_id(8).is_err());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
    }
}
