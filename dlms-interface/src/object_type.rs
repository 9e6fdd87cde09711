//! COSEM interface class identifiers
//!
//! Every class id the client may meet in an association view has a variant
//! here. Ids that are not listed are kept as [`ObjectType::Unknown`] so the
//! object still carries its identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Interface class of a COSEM object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    Data,
    Register,
    ExtendedRegister,
    DemandRegister,
    RegisterActivation,
    ProfileGeneric,
    Clock,
    ScriptTable,
    Schedule,
    SpecialDaysTable,
    AssociationShortName,
    AssociationLogicalName,
    SapAssignment,
    ImageTransfer,
    IecLocalPortSetup,
    ActivityCalendar,
    RegisterMonitor,
    ActionSchedule,
    IecHdlcSetup,
    IecTwistedPairSetup,
    MBusSlavePortSetup,
    UtilityTables,
    ModemConfiguration,
    AutoAnswer,
    AutoConnect,
    PushSetup,
    TcpUdpSetup,
    Ip4Setup,
    MacAddressSetup,
    PppSetup,
    GprsSetup,
    SmtpSetup,
    Ip6Setup,
    RegisterTable,
    CompactData,
    StatusMapping,
    SecuritySetup,
    ParameterMonitor,
    SensorManager,
    Arbitrator,
    DisconnectControl,
    Limiter,
    MBusClient,
    MBusMasterPortSetup,
    Account,
    Credit,
    Charge,
    TokenGateway,
    /// Class id without a catalogue entry
    Unknown(u16),
}

impl ObjectType {
    /// Resolve a class id
    pub fn from_class_id(class_id: u16) -> Self {
        match class_id {
            1 => ObjectType::Data,
            3 => ObjectType::Register,
            4 => ObjectType::ExtendedRegister,
            5 => ObjectType::DemandRegister,
            6 => ObjectType::RegisterActivation,
            7 => ObjectType::ProfileGeneric,
            8 => ObjectType::Clock,
            9 => ObjectType::ScriptTable,
            10 => ObjectType::Schedule,
            11 => ObjectType::SpecialDaysTable,
            12 => ObjectType::AssociationShortName,
            15 => ObjectType::AssociationLogicalName,
            17 => ObjectType::SapAssignment,
            18 => ObjectType::ImageTransfer,
            19 => ObjectType::IecLocalPortSetup,
            20 => ObjectType::ActivityCalendar,
            21 => ObjectType::RegisterMonitor,
            22 => ObjectType::ActionSchedule,
            23 => ObjectType::IecHdlcSetup,
            24 => ObjectType::IecTwistedPairSetup,
            25 => ObjectType::MBusSlavePortSetup,
            26 => ObjectType::UtilityTables,
            27 => ObjectType::ModemConfiguration,
            28 => ObjectType::AutoAnswer,
            29 => ObjectType::AutoConnect,
            40 => ObjectType::PushSetup,
            41 => ObjectType::TcpUdpSetup,
            42 => ObjectType::Ip4Setup,
            43 => ObjectType::MacAddressSetup,
            44 => ObjectType::PppSetup,
            45 => ObjectType::GprsSetup,
            46 => ObjectType::SmtpSetup,
            48 => ObjectType::Ip6Setup,
            61 => ObjectType::RegisterTable,
            62 => ObjectType::CompactData,
            63 => ObjectType::StatusMapping,
            64 => ObjectType::SecuritySetup,
            65 => ObjectType::ParameterMonitor,
            67 => ObjectType::SensorManager,
            68 => ObjectType::Arbitrator,
            70 => ObjectType::DisconnectControl,
            71 => ObjectType::Limiter,
            72 => ObjectType::MBusClient,
            74 => ObjectType::MBusMasterPortSetup,
            111 => ObjectType::Account,
            112 => ObjectType::Credit,
            113 => ObjectType::Charge,
            115 => ObjectType::TokenGateway,
            other => ObjectType::Unknown(other),
        }
    }

    pub fn class_id(&self) -> u16 {
        match self {
            ObjectType::Data => 1,
            ObjectType::Register => 3,
            ObjectType::ExtendedRegister => 4,
            ObjectType::DemandRegister => 5,
            ObjectType::RegisterActivation => 6,
            ObjectType::ProfileGeneric => 7,
            ObjectType::Clock => 8,
            ObjectType::ScriptTable => 9,
            ObjectType::Schedule => 10,
            ObjectType::SpecialDaysTable => 11,
            ObjectType::AssociationShortName => 12,
            ObjectType::AssociationLogicalName => 15,
            ObjectType::SapAssignment => 17,
            ObjectType::ImageTransfer => 18,
            ObjectType::IecLocalPortSetup => 19,
            ObjectType::ActivityCalendar => 20,
            ObjectType::RegisterMonitor => 21,
            ObjectType::ActionSchedule => 22,
            ObjectType::IecHdlcSetup => 23,
            ObjectType::IecTwistedPairSetup => 24,
            ObjectType::MBusSlavePortSetup => 25,
            ObjectType::UtilityTables => 26,
            ObjectType::ModemConfiguration => 27,
            ObjectType::AutoAnswer => 28,
            ObjectType::AutoConnect => 29,
            ObjectType::PushSetup => 40,
            ObjectType::TcpUdpSetup => 41,
            ObjectType::Ip4Setup => 42,
            ObjectType::MacAddressSetup => 43,
            ObjectType::PppSetup => 44,
            ObjectType::GprsSetup => 45,
            ObjectType::SmtpSetup => 46,
            ObjectType::Ip6Setup => 48,
            ObjectType::RegisterTable => 61,
            ObjectType::CompactData => 62,
            ObjectType::StatusMapping => 63,
            ObjectType::SecuritySetup => 64,
            ObjectType::ParameterMonitor => 65,
            ObjectType::SensorManager => 67,
            ObjectType::Arbitrator => 68,
            ObjectType::DisconnectControl => 70,
            ObjectType::Limiter => 71,
            ObjectType::MBusClient => 72,
            ObjectType::MBusMasterPortSetup => 74,
            ObjectType::Account => 111,
            ObjectType::Credit => 112,
            ObjectType::Charge => 113,
            ObjectType::TokenGateway => 115,
            ObjectType::Unknown(class_id) => *class_id,
        }
    }

    /// Short name layout of the class methods: (offset of the first
    /// method from the object base, number of methods)
    ///
    /// Classes without methods, and unknown classes, give `(0, 0)`.
    pub fn short_name_methods(&self) -> (u16, u8) {
        match self {
            ObjectType::Register => (0x28, 1),
            ObjectType::ExtendedRegister => (0x38, 1),
            ObjectType::DemandRegister => (0x48, 2),
            ObjectType::RegisterActivation => (0x30, 3),
            ObjectType::ProfileGeneric => (0x58, 4),
            ObjectType::Clock => (0x60, 6),
            ObjectType::AssociationShortName => (0x20, 8),
            ObjectType::AssociationLogicalName => (0x60, 4),
            ObjectType::ImageTransfer => (0x40, 4),
            ObjectType::PushSetup => (0x38, 1),
            ObjectType::ActivityCalendar => (0x50, 1),
            ObjectType::ScriptTable => (0x20, 1),
            ObjectType::Schedule => (0x20, 3),
            ObjectType::SpecialDaysTable => (0x10, 2),
            ObjectType::DisconnectControl => (0x20, 2),
            ObjectType::Ip4Setup => (0x60, 3),
            ObjectType::MBusSlavePortSetup => (0x60, 8),
            ObjectType::RegisterTable => (0x28, 2),
            _ => (0, 0),
        }
    }

    /// Register-family classes carrying a scaler and unit
    pub fn has_scaler_unit(&self) -> bool {
        matches!(
            self,
            ObjectType::Register | ObjectType::ExtendedRegister | ObjectType::DemandRegister
        )
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectType::Unknown(class_id) => write!(f, "Unknown({})", class_id),
            other => write!(f, "{:?}", other),
        }
    }
}
