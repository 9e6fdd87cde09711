//! xDLMS APDU tags and the invoke-id-and-priority byte

use dlms_core::{DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};

/// APDU tags used by the client
pub mod tag {
    pub const INITIATE_REQUEST: u8 = 0x01;
    pub const READ_REQUEST: u8 = 0x05;
    pub const WRITE_REQUEST: u8 = 0x06;
    pub const INITIATE_RESPONSE: u8 = 0x08;
    pub const READ_RESPONSE: u8 = 0x0C;
    pub const WRITE_RESPONSE: u8 = 0x0D;
    pub const CONFIRMED_SERVICE_ERROR: u8 = 0x0E;
    pub const DATA_NOTIFICATION: u8 = 0x0F;
    pub const GLO_INITIATE_REQUEST: u8 = 0x21;
    pub const GLO_READ_REQUEST: u8 = 0x25;
    pub const GLO_WRITE_REQUEST: u8 = 0x26;
    pub const GLO_INITIATE_RESPONSE: u8 = 0x28;
    pub const GLO_READ_RESPONSE: u8 = 0x2C;
    pub const GLO_WRITE_RESPONSE: u8 = 0x2D;
    pub const GLO_CONFIRMED_SERVICE_ERROR: u8 = 0x2E;
    pub const AARQ: u8 = 0x60;
    pub const AARE: u8 = 0x61;
    pub const RLRQ: u8 = 0x62;
    pub const RLRE: u8 = 0x63;
    pub const GET_REQUEST: u8 = 0xC0;
    pub const SET_REQUEST: u8 = 0xC1;
    pub const EVENT_NOTIFICATION: u8 = 0xC2;
    pub const ACTION_REQUEST: u8 = 0xC3;
    pub const GET_RESPONSE: u8 = 0xC4;
    pub const SET_RESPONSE: u8 = 0xC5;
    pub const ACTION_RESPONSE: u8 = 0xC7;
    pub const GLO_GET_REQUEST: u8 = 0xC8;
    pub const GLO_SET_REQUEST: u8 = 0xC9;
    pub const GLO_ACTION_REQUEST: u8 = 0xCB;
    pub const GLO_GET_RESPONSE: u8 = 0xCC;
    pub const GLO_SET_RESPONSE: u8 = 0xCD;
    pub const GLO_ACTION_RESPONSE: u8 = 0xCF;
    pub const EXCEPTION_RESPONSE: u8 = 0xD8;
}

/// Request type byte following GET/SET/ACTION tags
pub mod request_type {
    pub const NORMAL: u8 = 0x01;
    pub const NEXT: u8 = 0x02;
    pub const WITH_LIST: u8 = 0x03;

    /// SET-Request-With-First-Datablock
    pub const SET_WITH_FIRST_DATABLOCK: u8 = 0x02;
    /// SET-Request-With-Datablock
    pub const SET_WITH_DATABLOCK: u8 = 0x03;
    pub const SET_WITH_LIST: u8 = 0x04;

    /// ACTION-Request-With-First-Pblock
    pub const ACTION_WITH_FIRST_PBLOCK: u8 = 0x04;
    pub const ACTION_WITH_LIST: u8 = 0x03;
    /// ACTION-Request-With-Pblock
    pub const ACTION_WITH_PBLOCK: u8 = 0x06;
}

/// Response type byte following GET/SET/ACTION response tags
pub mod response_type {
    pub const NORMAL: u8 = 0x01;
    pub const WITH_DATABLOCK: u8 = 0x02;
    pub const WITH_LIST: u8 = 0x03;
    pub const ACK_BLOCK: u8 = 0x02;
    pub const LAST_DATABLOCK: u8 = 0x03;
    pub const LAST_DATABLOCK_WITH_LIST: u8 = 0x04;
    pub const WITH_PBLOCK: u8 = 0x02;
    pub const NEXT_PBLOCK: u8 = 0x04;
}

/// Variable-access-specification choices of SN READ/WRITE requests
pub mod variable_access {
    pub const VARIABLE_NAME: u8 = 0x02;
    pub const PARAMETERIZED_ACCESS: u8 = 0x04;
    /// Next data block of a READ answered in blocks
    pub const BLOCK_NUMBER_ACCESS: u8 = 0x05;
}

/// Glo-ciphered counterpart of a plaintext APDU tag
pub fn glo_tag(tag: u8) -> Option<u8> {
    match tag {
        tag::INITIATE_REQUEST => Some(tag::GLO_INITIATE_REQUEST),
        tag::READ_REQUEST => Some(tag::GLO_READ_REQUEST),
        tag::WRITE_REQUEST => Some(tag::GLO_WRITE_REQUEST),
        tag::GET_REQUEST => Some(tag::GLO_GET_REQUEST),
        tag::SET_REQUEST => Some(tag::GLO_SET_REQUEST),
        tag::ACTION_REQUEST => Some(tag::GLO_ACTION_REQUEST),
        _ => None,
    }
}

/// Whether `tag` is a glo-ciphered APDU sent by a server
pub fn is_glo_response(tag: u8) -> bool {
    matches!(
        tag,
        tag::GLO_INITIATE_RESPONSE
            | tag::GLO_READ_RESPONSE
            | tag::GLO_WRITE_RESPONSE
            | tag::GLO_CONFIRMED_SERVICE_ERROR
            | tag::GLO_GET_RESPONSE
            | tag::GLO_SET_RESPONSE
            | tag::GLO_ACTION_RESPONSE
    )
}

/// Service priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    Normal,
    #[default]
    High,
}

/// Service class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ServiceClass {
    Unconfirmed,
    #[default]
    Confirmed,
}

/// Invoke-Id-And-Priority byte
///
/// Bit 7 is the priority, bit 6 the service class and bits 0-3 the invoke id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvokeIdAndPriority {
    invoke_id: u8,
    priority: Priority,
    service_class: ServiceClass,
}

impl InvokeIdAndPriority {
    pub const MAX_INVOKE_ID: u8 = 0x0F;

    pub fn new(invoke_id: u8, priority: Priority, service_class: ServiceClass) -> DlmsResult<Self> {
        if invoke_id > Self::MAX_INVOKE_ID {
            return Err(DlmsError::Argument(format!(
                "Invoke ID must be 0-15, got {}",
                invoke_id
            )));
        }
        Ok(Self {
            invoke_id,
            priority,
            service_class,
        })
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            invoke_id: byte & Self::MAX_INVOKE_ID,
            priority: if byte & 0x80 != 0 {
                Priority::High
            } else {
                Priority::Normal
            },
            service_class: if byte & 0x40 != 0 {
                ServiceClass::Confirmed
            } else {
                ServiceClass::Unconfirmed
            },
        }
    }

    pub fn to_byte(&self) -> u8 {
        let mut byte = self.invoke_id;
        if self.priority == Priority::High {
            byte |= 0x80;
        }
        if self.service_class == ServiceClass::Confirmed {
            byte |= 0x40;
        }
        byte
    }

    pub fn invoke_id(&self) -> u8 {
        self.invoke_id
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn service_class(&self) -> ServiceClass {
        self.service_class
    }
}
