//! COSEM interface classes for the DLMS/COSEM client
//!
//! The catalogue is closed: the classes a client works with directly have
//! a typed [`ObjectKind`], every other class id becomes a generic object
//! that keeps raw attribute values. All kinds share the
//! [`CosemAttributes`] capability.

pub mod access;
pub mod association_ln;
pub mod association_sn;
pub mod attributes;
pub mod clock;
pub mod data;
pub mod demand_register;
pub mod extended_register;
pub mod generic;
pub mod iec_hdlc_setup;
pub mod image_transfer;
pub mod mbus_master_port_setup;
pub mod object;
pub mod object_type;
pub mod profile_generic;
pub mod push_setup;
pub mod register;
pub mod register_activation;
pub mod registry;
pub mod scaler_unit;

pub use access::{AccessMode, AccessRights, MethodAccessMode};
pub use association_ln::AssociationLogicalName;
pub use association_sn::AssociationShortName;
pub use attributes::CosemAttributes;
pub use clock::Clock;
pub use data::Data;
pub use demand_register::DemandRegister;
pub use extended_register::ExtendedRegister;
pub use generic::GenericObject;
pub use iec_hdlc_setup::{BaudRate, IecHdlcSetup};
pub use image_transfer::{ImageActivateInfo, ImageTransfer, ImageTransferStatus};
pub use mbus_master_port_setup::MBusMasterPortSetup;
pub use object::{CosemObject, ObjectKind, ATTR_LOGICAL_NAME};
pub use object_type::ObjectType;
pub use profile_generic::{CaptureObject, ProfileGeneric, SortMethod};
pub use push_setup::{PushSetup, SendDestinationAndMethod};
pub use register::Register;
pub use register_activation::{RegisterActivation, RegisterMask};
pub use registry::ObjectRegistry;
pub use scaler_unit::ScalerUnit;

pub use dlms_core::{DlmsError, DlmsResult};
