//! Attribute and method access rights of a COSEM object

use dlms_core::{DataObject, DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Access to one attribute, as listed in an association view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccessMode {
    NoAccess,
    Read,
    Write,
    #[default]
    ReadWrite,
    AuthenticatedRead,
    AuthenticatedWrite,
    AuthenticatedReadWrite,
}

impl AccessMode {
    pub fn from_code(code: u8) -> DlmsResult<Self> {
        Ok(match code {
            0 => AccessMode::NoAccess,
            1 => AccessMode::Read,
            2 => AccessMode::Write,
            3 => AccessMode::ReadWrite,
            4 => AccessMode::AuthenticatedRead,
            5 => AccessMode::AuthenticatedWrite,
            6 => AccessMode::AuthenticatedReadWrite,
            _ => {
                return Err(DlmsError::ProtocolDecode(format!(
                    "Invalid attribute access mode {}",
                    code
                )))
            }
        })
    }

    pub fn code(&self) -> u8 {
        match self {
            AccessMode::NoAccess => 0,
            AccessMode::Read => 1,
            AccessMode::Write => 2,
            AccessMode::ReadWrite => 3,
            AccessMode::AuthenticatedRead => 4,
            AccessMode::AuthenticatedWrite => 5,
            AccessMode::AuthenticatedReadWrite => 6,
        }
    }

    pub fn can_read(&self) -> bool {
        matches!(
            self,
            AccessMode::Read
                | AccessMode::ReadWrite
                | AccessMode::AuthenticatedRead
                | AccessMode::AuthenticatedReadWrite
        )
    }

    pub fn can_write(&self) -> bool {
        matches!(
            self,
            AccessMode::Write
                | AccessMode::ReadWrite
                | AccessMode::AuthenticatedWrite
                | AccessMode::AuthenticatedReadWrite
        )
    }
}

/// Access to one method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MethodAccessMode {
    NoAccess,
    #[default]
    Access,
    AuthenticatedAccess,
}

impl MethodAccessMode {
    pub fn from_code(code: u8) -> DlmsResult<Self> {
        match code {
            0 => Ok(MethodAccessMode::NoAccess),
            1 => Ok(MethodAccessMode::Access),
            2 => Ok(MethodAccessMode::AuthenticatedAccess),
            _ => Err(DlmsError::ProtocolDecode(format!(
                "Invalid method access mode {}",
                code
            ))),
        }
    }

    /// Version 0 association views send a boolean instead of a code
    pub fn from_legacy(accessible: bool) -> Self {
        if accessible {
            MethodAccessMode::Access
        } else {
            MethodAccessMode::NoAccess
        }
    }

    /// Decode either encoding, deciding by the value's shape
    ///
    /// Some meters report version 0 and still send codes (or the other way
    /// round), so the object version is not consulted.
    pub fn from_data_object(value: &DataObject) -> DlmsResult<Self> {
        match value {
            DataObject::Boolean(accessible) => Ok(Self::from_legacy(*accessible)),
            other => Self::from_code(other.to_u8()?),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            MethodAccessMode::NoAccess => 0,
            MethodAccessMode::Access => 1,
            MethodAccessMode::AuthenticatedAccess => 2,
        }
    }
}

/// Per-index access rights; indexes never listed fall back to the defaults
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessRights {
    attributes: BTreeMap<u8, AccessMode>,
    methods: BTreeMap<u8, MethodAccessMode>,
}

impl AccessRights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(&self, index: u8) -> AccessMode {
        self.attributes.get(&index).copied().unwrap_or_default()
    }

    pub fn set_attribute(&mut self, index: u8, mode: AccessMode) {
        self.attributes.insert(index, mode);
    }

    pub fn method(&self, index: u8) -> MethodAccessMode {
        self.methods.get(&index).copied().unwrap_or_default()
    }

    pub fn set_method(&mut self, index: u8, mode: MethodAccessMode) {
        self.methods.insert(index, mode);
    }

    pub fn attributes(&self) -> impl Iterator<Item = (u8, AccessMode)> + '_ {
        self.attributes.iter().map(|(index, mode)| (*index, *mode))
    }

    pub fn methods(&self) -> impl Iterator<Item = (u8, MethodAccessMode)> + '_ {
        self.methods.iter().map(|(index, mode)| (*index, *mode))
    }
}
