use thiserror::Error;

/// Main error type for DLMS/COSEM client operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DlmsError {
    /// Caller misuse: invalid index, empty list, missing password
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Malformed tag/length/value, wrong structure arity, unsupported width
    #[error("Protocol decode error: {0}")]
    ProtocolDecode(String),

    #[error("Association rejected: result {result}, diagnostic {diagnostic}")]
    AssociationRejected { result: u8, diagnostic: u8 },

    #[error("Authentication failed: server to client challenge does not match")]
    AuthenticationMismatch,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Security error: {0}")]
    Security(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Value out of range: {0}")]
    OutOfRange(String),

    #[error("Frame invalid: {0}")]
    FrameInvalid(String),

    /// Data-access-result returned by the device
    #[error("Device returned data access error {code}")]
    DataAccess { code: u8 },

    /// Confirmed-service-error or exception-response returned by the device
    #[error("Device returned service error: {0}")]
    ServiceError(String),
}

/// Result type alias for DLMS/COSEM client operations
pub type DlmsResult<T> = Result<T, DlmsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_association_rejected_display() {
        let err = DlmsError::AssociationRejected {
            result: 1,
            diagnostic: 13,
        };
        assert_eq!(
            err.to_string(),
            "Association rejected: result 1, diagnostic 13"
        );
    }
}
