//! Association state machine for DLMS/COSEM connections

use std::fmt::{self, Display};

/// Association state of a client session
///
/// ```text
/// Idle -> AwaitingConnect -> AwaitingAssociationReply -> AwaitingAuthenticationReply
///                                      |                            |
///                                      v                            v
///                                  Associated  <--------------------+
///                                      |
///                                      v
///                                Disconnecting -> Idle
/// ```
///
/// Any failure (rejection, authentication mismatch) returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssociationState {
    /// No association, physical link not requested
    #[default]
    Idle,
    /// SNRM sent (HDLC) or about to associate (wrapper)
    AwaitingConnect,
    /// AARQ sent, waiting for AARE
    AwaitingAssociationReply,
    /// HLS reply-to-challenge sent, waiting for the server's proof
    AwaitingAuthenticationReply,
    Associated,
    /// DISC or RLRQ sent
    Disconnecting,
}

impl AssociationState {
    /// Normal DLMS operations can be performed
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Associated)
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::AwaitingConnect
                | Self::AwaitingAssociationReply
                | Self::AwaitingAuthenticationReply
                | Self::Disconnecting
        )
    }
}

impl Display for AssociationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::AwaitingConnect => write!(f, "AwaitingConnect"),
            Self::AwaitingAssociationReply => write!(f, "AwaitingAssociationReply"),
            Self::AwaitingAuthenticationReply => write!(f, "AwaitingAuthenticationReply"),
            Self::Associated => write!(f, "Associated"),
            Self::Disconnecting => write!(f, "Disconnecting"),
        }
    }
}

/// Result field of an AARE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationResult {
    Accepted,
    PermanentRejected,
    TransientRejected,
}

impl AssociationResult {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Accepted),
            1 => Some(Self::PermanentRejected),
            2 => Some(Self::TransientRejected),
            _ => None,
        }
    }
}

/// acse-service-user diagnostics of an AARE
pub mod source_diagnostic {
    pub const NONE: u8 = 0;
    pub const NO_REASON_GIVEN: u8 = 1;
    pub const APPLICATION_CONTEXT_NAME_NOT_SUPPORTED: u8 = 2;
    pub const AUTHENTICATION_MECHANISM_NAME_NOT_RECOGNISED: u8 = 11;
    pub const AUTHENTICATION_MECHANISM_NAME_REQUIRED: u8 = 12;
    pub const AUTHENTICATION_FAILURE: u8 = 13;
    pub const AUTHENTICATION_REQUIRED: u8 = 14;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        assert_eq!(AssociationState::default(), AssociationState::Idle);
        assert!(!AssociationState::Idle.is_active());
        assert!(AssociationState::Associated.is_active());
        assert!(AssociationState::AwaitingAuthenticationReply.is_pending());
    }

    #[test]
    fn test_display_state() {
        assert_eq!(AssociationState::Disconnecting.to_string(), "Disconnecting");
    }

    #[test]
    fn test_association_result() {
        assert_eq!(AssociationResult::from_u8(0), Some(AssociationResult::Accepted));
        assert_eq!(AssociationResult::from_u8(1), Some(AssociationResult::PermanentRejected));
        assert_eq!(AssociationResult::from_u8(7), None);
    }
}
