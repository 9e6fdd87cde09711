//! COSEM object: identity, access rights and the typed kind
//!
//! Identity (class, logical name, short name) is fixed at construction.
//! Everything else may change as replies are applied.

use crate::access::AccessRights;
use crate::association_ln::AssociationLogicalName;
use crate::association_sn::AssociationShortName;
use crate::attributes::{CosemAttributes, no_attribute, obis_from, obis_to};
use crate::clock::Clock;
use crate::data::Data;
use crate::demand_register::DemandRegister;
use crate::extended_register::ExtendedRegister;
use crate::generic::GenericObject;
use crate::iec_hdlc_setup::IecHdlcSetup;
use crate::image_transfer::ImageTransfer;
use crate::mbus_master_port_setup::MBusMasterPortSetup;
use crate::object_type::ObjectType;
use crate::profile_generic::ProfileGeneric;
use crate::push_setup::PushSetup;
use crate::register::Register;
use crate::register_activation::RegisterActivation;
use crate::scaler_unit::ScalerUnit;
use dlms_core::{DataObject, DataType, DlmsError, DlmsResult, ObisCode};
use std::collections::BTreeMap;
use std::fmt;

/// Index of the logical name attribute, common to every class
pub const ATTR_LOGICAL_NAME: u8 = 1;

/// Typed behaviour of an object, chosen by class id
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Data(Data),
    Register(Register),
    ExtendedRegister(ExtendedRegister),
    DemandRegister(DemandRegister),
    RegisterActivation(RegisterActivation),
    ProfileGeneric(ProfileGeneric),
    Clock(Clock),
    AssociationShortName(AssociationShortName),
    AssociationLogicalName(AssociationLogicalName),
    ImageTransfer(ImageTransfer),
    IecHdlcSetup(IecHdlcSetup),
    PushSetup(PushSetup),
    MBusMasterPortSetup(MBusMasterPortSetup),
    /// Any other class; keeps raw values by index
    Generic(GenericObject),
}

impl ObjectKind {
    pub fn for_type(object_type: ObjectType) -> Self {
        match object_type {
            ObjectType::Data => ObjectKind::Data(Data::default()),
            ObjectType::Register => ObjectKind::Register(Register::default()),
            ObjectType::ExtendedRegister => ObjectKind::ExtendedRegister(ExtendedRegister::default()),
            ObjectType::DemandRegister => ObjectKind::DemandRegister(DemandRegister::default()),
            ObjectType::RegisterActivation => {
                ObjectKind::RegisterActivation(RegisterActivation::default())
            }
            ObjectType::ProfileGeneric => ObjectKind::ProfileGeneric(ProfileGeneric::default()),
            ObjectType::Clock => ObjectKind::Clock(Clock::default()),
            ObjectType::AssociationShortName => {
                ObjectKind::AssociationShortName(AssociationShortName::default())
            }
            ObjectType::AssociationLogicalName => {
                ObjectKind::AssociationLogicalName(AssociationLogicalName::default())
            }
            ObjectType::ImageTransfer => ObjectKind::ImageTransfer(ImageTransfer::default()),
            ObjectType::IecHdlcSetup => ObjectKind::IecHdlcSetup(IecHdlcSetup::default()),
            ObjectType::PushSetup => ObjectKind::PushSetup(PushSetup::default()),
            ObjectType::MBusMasterPortSetup => {
                ObjectKind::MBusMasterPortSetup(MBusMasterPortSetup::default())
            }
            _ => ObjectKind::Generic(GenericObject::default()),
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, ObjectKind::Generic(_))
    }

    fn attributes(&self) -> &dyn CosemAttributes {
        match self {
            ObjectKind::Data(o) => o,
            ObjectKind::Register(o) => o,
            ObjectKind::ExtendedRegister(o) => o,
            ObjectKind::DemandRegister(o) => o,
            ObjectKind::RegisterActivation(o) => o,
            ObjectKind::ProfileGeneric(o) => o,
            ObjectKind::Clock(o) => o,
            ObjectKind::AssociationShortName(o) => o,
            ObjectKind::AssociationLogicalName(o) => o,
            ObjectKind::ImageTransfer(o) => o,
            ObjectKind::IecHdlcSetup(o) => o,
            ObjectKind::PushSetup(o) => o,
            ObjectKind::MBusMasterPortSetup(o) => o,
            ObjectKind::Generic(o) => o,
        }
    }

    fn attributes_mut(&mut self) -> &mut dyn CosemAttributes {
        match self {
            ObjectKind::Data(o) => o,
            ObjectKind::Register(o) => o,
            ObjectKind::ExtendedRegister(o) => o,
            ObjectKind::DemandRegister(o) => o,
            ObjectKind::RegisterActivation(o) => o,
            ObjectKind::ProfileGeneric(o) => o,
            ObjectKind::Clock(o) => o,
            ObjectKind::AssociationShortName(o) => o,
            ObjectKind::AssociationLogicalName(o) => o,
            ObjectKind::ImageTransfer(o) => o,
            ObjectKind::IecHdlcSetup(o) => o,
            ObjectKind::PushSetup(o) => o,
            ObjectKind::MBusMasterPortSetup(o) => o,
            ObjectKind::Generic(o) => o,
        }
    }

    /// Scaler and unit of register-family kinds
    pub fn scaler_unit(&self) -> Option<ScalerUnit> {
        match self {
            ObjectKind::Register(o) => Some(o.scaler_unit),
            ObjectKind::ExtendedRegister(o) => Some(o.scaler_unit),
            ObjectKind::DemandRegister(o) => Some(o.scaler_unit),
            _ => None,
        }
    }

    /// Returns false when the kind has no scaler
    pub fn set_scaler_unit(&mut self, scaler_unit: ScalerUnit) -> bool {
        match self {
            ObjectKind::Register(o) => o.scaler_unit = scaler_unit,
            ObjectKind::ExtendedRegister(o) => o.scaler_unit = scaler_unit,
            ObjectKind::DemandRegister(o) => o.scaler_unit = scaler_unit,
            _ => return false,
        }
        true
    }
}

/// One object of a logical device
#[derive(Debug, Clone, PartialEq)]
pub struct CosemObject {
    object_type: ObjectType,
    logical_name: ObisCode,
    short_name: u16,
    pub version: u8,
    /// Human readable text attached by OBIS annotation
    pub description: Option<String>,
    pub access_rights: AccessRights,
    ui_data_types: BTreeMap<u8, DataType>,
    kind: ObjectKind,
}

impl CosemObject {
    pub fn new(object_type: ObjectType, logical_name: ObisCode) -> Self {
        Self::with_short_name(object_type, logical_name, 0)
    }

    /// Object addressed by short name; the logical name may be all zeros
    /// when the device does not report it
    pub fn with_short_name(object_type: ObjectType, logical_name: ObisCode, short_name: u16) -> Self {
        Self {
            object_type,
            logical_name,
            short_name,
            version: 0,
            description: None,
            access_rights: AccessRights::default(),
            ui_data_types: BTreeMap::new(),
            kind: ObjectKind::for_type(object_type),
        }
    }

    pub fn from_class_id(class_id: u16, logical_name: ObisCode) -> Self {
        Self::new(ObjectType::from_class_id(class_id), logical_name)
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    pub fn class_id(&self) -> u16 {
        self.object_type.class_id()
    }

    pub fn logical_name(&self) -> ObisCode {
        self.logical_name
    }

    pub fn short_name(&self) -> u16 {
        self.short_name
    }

    /// Whether the class has typed behaviour (not the generic fallback)
    pub fn is_known(&self) -> bool {
        !self.kind.is_generic()
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ObjectKind {
        &mut self.kind
    }

    pub fn attribute_count(&self) -> u8 {
        self.kind.attributes().attribute_count()
    }

    pub fn method_count(&self) -> u8 {
        self.kind.attributes().method_count()
    }

    pub fn data_type(&self, index: u8) -> DlmsResult<DataType> {
        match index {
            0 => Err(no_attribute(&self.object_type.to_string(), index)),
            ATTR_LOGICAL_NAME => Ok(DataType::OctetString),
            _ => self.kind.attributes().data_type(index),
        }
    }

    /// Type the value of an attribute should be presented as
    ///
    /// [`DataType::None`] when nothing was declared.
    pub fn ui_data_type(&self, index: u8) -> DataType {
        self.ui_data_types.get(&index).copied().unwrap_or_default()
    }

    pub fn set_ui_data_type(&mut self, index: u8, data_type: DataType) {
        if data_type == DataType::None {
            self.ui_data_types.remove(&index);
        } else {
            self.ui_data_types.insert(index, data_type);
        }
    }

    pub fn get_value(&self, index: u8) -> DlmsResult<DataObject> {
        match index {
            0 => Err(no_attribute(&self.object_type.to_string(), index)),
            ATTR_LOGICAL_NAME => Ok(obis_to(&self.logical_name)),
            _ => self.kind.attributes().get_value(index),
        }
    }

    /// Store a received value
    ///
    /// Writing the logical name is accepted only when it repeats the
    /// current one.
    pub fn set_value(&mut self, index: u8, value: DataObject) -> DlmsResult<()> {
        match index {
            0 => Err(no_attribute(&self.object_type.to_string(), index)),
            ATTR_LOGICAL_NAME => {
                let name = obis_from(&value)?;
                if name != self.logical_name {
                    return Err(DlmsError::InvalidData(format!(
                        "Logical name of {} cannot change to {}",
                        self.logical_name, name
                    )));
                }
                Ok(())
            }
            _ => self.kind.attributes_mut().set_value(index, value),
        }
    }
}

impl fmt::Display for CosemObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.object_type, self.logical_name)?;
        if self.short_name != 0 {
            write!(f, " (0x{:04X})", self.short_name)?;
        }
        if let Some(description) = &self.description {
            write!(f, " {}", description)?;
        }
        Ok(())
    }
}
