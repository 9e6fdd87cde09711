//! Ciphering of xDLMS APDUs with AES-128-GCM

use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::aes::Aes128;
use aes_gcm::{AesGcm, Nonce};
use dlms_asn1::LengthEncoding;
use dlms_core::{DlmsError, DlmsResult};

/// AES-128-GCM with the 12-byte authentication tag used by DLMS
type DlmsGcm = AesGcm<Aes128, U12, U12>;

/// Length of the truncated GCM tag
pub const TAG_LENGTH: usize = 12;

/// Length of a system title
pub const SYSTEM_TITLE_LENGTH: usize = 8;

/// Security control byte for DLMS APDU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityControl {
    byte: u8,
}

impl SecurityControl {
    pub const AUTHENTICATION: SecurityControl = SecurityControl { byte: 0x10 };
    pub const ENCRYPTION: SecurityControl = SecurityControl { byte: 0x20 };
    pub const AUTHENTICATION_ENCRYPTION: SecurityControl = SecurityControl { byte: 0x30 };

    /// Decode from byte
    pub fn from_byte(byte: u8) -> Self {
        Self { byte }
    }

    /// Get the byte value
    pub fn to_byte(&self) -> u8 {
        self.byte
    }

    /// Get security suite ID
    pub fn security_suite_id(&self) -> u8 {
        self.byte & 0x0F
    }

    pub fn is_authenticated(&self) -> bool {
        (self.byte & 0x10) != 0
    }

    pub fn is_encrypted(&self) -> bool {
        (self.byte & 0x20) != 0
    }
}

/// Optional ciphering collaborator of a session
///
/// The client hands fully built plaintext APDUs to [`Cipher::encrypt`] and
/// received glo-ciphered APDUs to [`Cipher::decrypt`]. HLS-GMAC
/// authentication is computed through [`Cipher::gmac`].
pub trait Cipher: Send {
    /// Whether APDUs are ciphered at all
    fn is_ciphered(&self) -> bool;

    /// Client system title (8 bytes)
    fn system_title(&self) -> Vec<u8>;

    /// Current invocation counter, used by the next encryption
    fn invocation_counter(&self) -> u32;

    /// Cipher `apdu` and frame it as `tag | length | SC | IC | data`
    ///
    /// Increments the invocation counter.
    fn encrypt(&mut self, tag: u8, apdu: &[u8]) -> DlmsResult<Vec<u8>>;

    /// Decipher a framed glo APDU sent by the peer with `system_title`
    fn decrypt(&self, system_title: &[u8], apdu: &[u8]) -> DlmsResult<Vec<u8>>;

    /// HLS-GMAC proof over `challenge`, returned as `SC | IC | tag`
    fn gmac(&self, system_title: &[u8], invocation_counter: u32, challenge: &[u8]) -> DlmsResult<Vec<u8>>;
}

/// AES-128-GCM implementation of [`Cipher`]
pub struct GcmCipher {
    system_title: Vec<u8>,
    block_cipher_key: Vec<u8>,
    authentication_key: Vec<u8>,
    invocation_counter: u32,
    security: SecurityControl,
}

impl GcmCipher {
    /// Create a cipher with authenticated encryption (security control 0x30)
    ///
    /// # Errors
    ///
    /// Returns `DlmsError::Security` if the system title is not 8 bytes or
    /// the block cipher key is not 16 bytes.
    pub fn new(
        system_title: &[u8],
        block_cipher_key: &[u8],
        authentication_key: &[u8],
    ) -> DlmsResult<Self> {
        if system_title.len() != SYSTEM_TITLE_LENGTH {
            return Err(DlmsError::Security(format!(
                "Invalid system title length: expected {} bytes, got {}",
                SYSTEM_TITLE_LENGTH,
                system_title.len()
            )));
        }
        if block_cipher_key.len() != 16 {
            return Err(DlmsError::Security(format!(
                "Invalid AES-128 key length: expected 16 bytes, got {}",
                block_cipher_key.len()
            )));
        }
        Ok(Self {
            system_title: system_title.to_vec(),
            block_cipher_key: block_cipher_key.to_vec(),
            authentication_key: authentication_key.to_vec(),
            invocation_counter: 0,
            security: SecurityControl::AUTHENTICATION_ENCRYPTION,
        })
    }

    pub fn with_security(mut self, security: SecurityControl) -> Self {
        self.security = security;
        self
    }

    pub fn with_invocation_counter(mut self, invocation_counter: u32) -> Self {
        self.invocation_counter = invocation_counter;
        self
    }

    fn gcm(&self) -> DlmsResult<DlmsGcm> {
        DlmsGcm::new_from_slice(&self.block_cipher_key)
            .map_err(|e| DlmsError::Security(format!("Invalid key: {}", e)))
    }

    fn nonce(system_title: &[u8], invocation_counter: u32) -> DlmsResult<[u8; 12]> {
        if system_title.len() != SYSTEM_TITLE_LENGTH {
            return Err(DlmsError::Security(format!(
                "Invalid system title length: {}",
                system_title.len()
            )));
        }
        let mut iv = [0u8; 12];
        iv[..8].copy_from_slice(system_title);
        iv[8..].copy_from_slice(&invocation_counter.to_be_bytes());
        Ok(iv)
    }

    fn aad(&self, security: SecurityControl, extra: &[u8]) -> Vec<u8> {
        let mut aad = Vec::with_capacity(1 + self.authentication_key.len() + extra.len());
        aad.push(security.to_byte());
        aad.extend_from_slice(&self.authentication_key);
        aad.extend_from_slice(extra);
        aad
    }

    fn transform(
        &self,
        security: SecurityControl,
        system_title: &[u8],
        invocation_counter: u32,
        data: &[u8],
        encrypt: bool,
    ) -> DlmsResult<Vec<u8>> {
        let gcm = self.gcm()?;
        let iv = Self::nonce(system_title, invocation_counter)?;
        let nonce = Nonce::<U12>::from_slice(&iv);
        match (security.is_authenticated(), security.is_encrypted()) {
            (true, true) => {
                let aad = self.aad(security, &[]);
                let payload = Payload { msg: data, aad: &aad };
                let result = if encrypt {
                    gcm.encrypt(nonce, payload)
                } else {
                    gcm.decrypt(nonce, payload)
                };
                result.map_err(|_| DlmsError::Security("AES-GCM operation failed".to_string()))
            }
            (false, true) => {
                let payload = Payload { msg: data, aad: &[] };
                if encrypt {
                    let mut out = gcm
                        .encrypt(nonce, payload)
                        .map_err(|_| DlmsError::Security("AES-GCM encryption failed".to_string()))?;
                    out.truncate(data.len());
                    Ok(out)
                } else {
                    let zeros = vec![0u8; data.len()];
                    let keystream = gcm
                        .encrypt(nonce, Payload { msg: &zeros, aad: &[] })
                        .map_err(|_| DlmsError::Security("AES-GCM decryption failed".to_string()))?;
                    Ok(data.iter().zip(keystream).map(|(d, k)| d ^ k).collect())
                }
            }
            (true, false) => {
                if encrypt {
                    let aad = self.aad(security, data);
                    let tag = gcm
                        .encrypt(nonce, Payload { msg: &[], aad: &aad })
                        .map_err(|_| DlmsError::Security("GMAC failed".to_string()))?;
                    let mut out = data.to_vec();
                    out.extend_from_slice(&tag);
                    Ok(out)
                } else {
                    if data.len() < TAG_LENGTH {
                        return Err(DlmsError::Security("Missing authentication tag".to_string()));
                    }
                    let (plain, tag) = data.split_at(data.len() - TAG_LENGTH);
                    let aad = self.aad(security, plain);
                    let expected = gcm
                        .encrypt(nonce, Payload { msg: &[], aad: &aad })
                        .map_err(|_| DlmsError::Security("GMAC failed".to_string()))?;
                    if !crate::authentication::constant_time_eq(&expected, tag) {
                        return Err(DlmsError::Security("Authentication tag mismatch".to_string()));
                    }
                    Ok(plain.to_vec())
                }
            }
            (false, false) => Ok(data.to_vec()),
        }
    }
}

impl Cipher for GcmCipher {
    fn is_ciphered(&self) -> bool {
        self.security.is_authenticated() || self.security.is_encrypted()
    }

    fn system_title(&self) -> Vec<u8> {
        self.system_title.clone()
    }

    fn invocation_counter(&self) -> u32 {
        self.invocation_counter
    }

    fn encrypt(&mut self, tag: u8, apdu: &[u8]) -> DlmsResult<Vec<u8>> {
        let counter = self.invocation_counter;
        let data = self.transform(self.security, &self.system_title, counter, apdu, true)?;
        self.invocation_counter = counter.wrapping_add(1);

        let mut out = vec![tag];
        out.extend_from_slice(&LengthEncoding::new(5 + data.len()).encode());
        out.push(self.security.to_byte());
        out.extend_from_slice(&counter.to_be_bytes());
        out.extend_from_slice(&data);
        Ok(out)
    }

    fn decrypt(&self, system_title: &[u8], apdu: &[u8]) -> DlmsResult<Vec<u8>> {
        let body = apdu
            .get(1..)
            .ok_or_else(|| DlmsError::ProtocolDecode("Empty ciphered APDU".to_string()))?;
        let (length, consumed) = LengthEncoding::decode(body)?;
        let content = body
            .get(consumed..consumed + length.value())
            .ok_or_else(|| DlmsError::ProtocolDecode("Ciphered APDU truncated".to_string()))?;
        if content.len() < 5 {
            return Err(DlmsError::ProtocolDecode(
                "Ciphered APDU lacks security header".to_string(),
            ));
        }
        let security = SecurityControl::from_byte(content[0]);
        let counter = u32::from_be_bytes([content[1], content[2], content[3], content[4]]);
        self.transform(security, system_title, counter, &content[5..], false)
    }

    fn gmac(&self, system_title: &[u8], invocation_counter: u32, challenge: &[u8]) -> DlmsResult<Vec<u8>> {
        let gcm = self.gcm()?;
        let iv = Self::nonce(system_title, invocation_counter)?;
        let aad = self.aad(SecurityControl::AUTHENTICATION, challenge);
        let tag = gcm
            .encrypt(Nonce::<U12>::from_slice(&iv), Payload { msg: &[], aad: &aad })
            .map_err(|_| DlmsError::Security("GMAC failed".to_string()))?;

        let mut out = Vec::with_capacity(5 + TAG_LENGTH);
        out.push(SecurityControl::AUTHENTICATION.to_byte());
        out.extend_from_slice(&invocation_counter.to_be_bytes());
        out.extend_from_slice(&tag);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TITLE: [u8; 8] = *b"MMM00001";
    const KEY: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
        0x0F,
    ];

    fn cipher() -> GcmCipher {
        GcmCipher::new(&TITLE, &KEY, &[0xD0; 16]).unwrap()
    }

    #[test]
    fn test_encrypt_frames_and_counts() {
        let mut cipher = cipher();
        let framed = cipher.encrypt(0xC8, &[0xC0, 0x01, 0xC1]).unwrap();
        assert_eq!(framed[0], 0xC8);
        assert_eq!(framed[1] as usize, framed.len() - 2);
        assert_eq!(framed[2], 0x30);
        assert_eq!(&framed[3..7], &[0, 0, 0, 0]);
        assert_eq!(framed.len(), 2 + 5 + 3 + TAG_LENGTH);
        assert_eq!(cipher.invocation_counter(), 1);

        let plain = cipher.decrypt(&TITLE, &framed).unwrap();
        assert_eq!(plain, vec![0xC0, 0x01, 0xC1]);
    }

    #[test]
    fn test_decrypt_rejects_tampering() {
        let mut cipher = cipher();
        let mut framed = cipher.encrypt(0xC8, b"payload").unwrap();
        let last = framed.len() - 1;
        framed[last] ^= 0x01;
        assert!(cipher.decrypt(&TITLE, &framed).is_err());
    }

    #[test]
    fn test_encryption_only_roundtrip() {
        let mut cipher = cipher().with_security(SecurityControl::ENCRYPTION);
        let framed = cipher.encrypt(0xC8, b"hello").unwrap();
        assert_eq!(framed.len(), 2 + 5 + 5);
        assert_eq!(cipher.decrypt(&TITLE, &framed).unwrap(), b"hello".to_vec());
    }

    #[test]
    fn test_gmac_layout() {
        let cipher = cipher();
        let proof = cipher.gmac(&TITLE, 7, b"challenge").unwrap();
        assert_eq!(proof.len(), 5 + TAG_LENGTH);
        assert_eq!(proof[0], 0x10);
        assert_eq!(&proof[1..5], &[0, 0, 0, 7]);
        assert_eq!(proof, cipher.gmac(&TITLE, 7, b"challenge").unwrap());
        assert_ne!(proof, cipher.gmac(&TITLE, 8, b"challenge").unwrap());
    }

    #[test]
    fn test_invalid_title() {
        assert!(GcmCipher::new(b"short", &KEY, &[]).is_err());
    }
}
