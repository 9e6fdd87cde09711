//! Session configuration
//!
//! Everything the caller decides before the first frame is built. The
//! optional cipher is not part of the configuration, it is handed to
//! [`Session::with_cipher`](super::Session::with_cipher).

use dlms_application::{AddressingMethod, Priority, ServiceClass};
use dlms_application::pdu::MAX_PDU_SIZE;
use dlms_security::Authentication;
use dlms_session::{HdlcLimits, InterfaceType};
use serde::{Deserialize, Serialize};

/// Public client address
pub const DEFAULT_CLIENT_ADDRESS: u32 = 0x10;
/// Management logical device
pub const DEFAULT_SERVER_ADDRESS: u32 = 0x01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub addressing: AddressingMethod,
    pub client_address: u32,
    /// Server address as put on the wire, see
    /// [`count_server_address`](dlms_session::count_server_address)
    pub server_address: u32,
    pub interface_type: InterfaceType,
    pub authentication: Authentication,
    /// Password for low level authentication, shared secret for HLS
    #[serde(with = "serde_bytes")]
    pub password: Vec<u8>,
    /// Proposed in the InitiateRequest
    pub max_receive_pdu_size: u16,
    pub hdlc_limits: HdlcLimits,
    pub priority: Priority,
    pub service_class: ServiceClass,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            addressing: AddressingMethod::default(),
            client_address: DEFAULT_CLIENT_ADDRESS,
            server_address: DEFAULT_SERVER_ADDRESS,
            interface_type: InterfaceType::default(),
            authentication: Authentication::None,
            password: Vec::new(),
            max_receive_pdu_size: MAX_PDU_SIZE,
            hdlc_limits: HdlcLimits::default(),
            priority: Priority::default(),
            service_class: ServiceClass::default(),
        }
    }
}

impl SessionConfig {
    pub fn with_addressing(mut self, addressing: AddressingMethod) -> Self {
        self.addressing = addressing;
        self
    }

    pub fn with_client_address(mut self, address: u32) -> Self {
        self.client_address = address;
        self
    }

    pub fn with_server_address(mut self, address: u32) -> Self {
        self.server_address = address;
        self
    }

    pub fn with_interface_type(mut self, interface_type: InterfaceType) -> Self {
        self.interface_type = interface_type;
        self
    }

    /// Set the authentication level and its secret
    ///
    /// # Arguments
    ///
    /// * `authentication` - Level proposed in the AARQ
    /// * `password` - Password (low, high) or shared secret (MD5, SHA-1,
    ///   SHA-256); ignored for GMAC, which uses the cipher keys
    pub fn with_authentication(mut self, authentication: Authentication, password: &[u8]) -> Self {
        self.authentication = authentication;
        self.password = password.to_vec();
        self
    }

    pub fn with_max_receive_pdu_size(mut self, size: u16) -> Self {
        self.max_receive_pdu_size = size;
        self
    }

    pub fn with_hdlc_limits(mut self, limits: HdlcLimits) -> Self {
        self.hdlc_limits = limits;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_service_class(mut self, service_class: ServiceClass) -> Self {
        self.service_class = service_class;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.client_address, 16);
        assert_eq!(config.server_address, 1);
        assert_eq!(config.max_receive_pdu_size, 0xFFFF);
        assert_eq!(config.addressing, AddressingMethod::LogicalName);
        assert_eq!(config.interface_type, InterfaceType::Hdlc);
        assert_eq!(config.priority, Priority::High);
        assert_eq!(config.service_class, ServiceClass::Confirmed);
    }

    #[test]
    fn test_builders() {
        let config = SessionConfig::default()
            .with_addressing(AddressingMethod::ShortName)
            .with_client_address(0x20)
            .with_server_address(0x4001)
            .with_interface_type(InterfaceType::Wrapper)
            .with_authentication(Authentication::Low, b"00000000")
            .with_max_receive_pdu_size(512);
        assert_eq!(config.addressing, AddressingMethod::ShortName);
        assert_eq!(config.client_address, 0x20);
        assert_eq!(config.server_address, 0x4001);
        assert_eq!(config.interface_type, InterfaceType::Wrapper);
        assert_eq!(config.authentication, Authentication::Low);
        assert_eq!(config.password, b"00000000".to_vec());
        assert_eq!(config.max_receive_pdu_size, 512);
    }
}
