//! Standard OBIS code catalogue
//!
//! Maps OBIS masks to the classes that use them, the data types the
//! standard allows and a description. The annotation pass attaches the
//! description to parsed objects and, for value-holding classes, picks the
//! UI data type of attribute 2.
//!
//! A mask has six dot-separated groups. Each group is `*`, a number, a
//! range `a-b`, or a comma list of those, e.g. `1.0-64.1-80.8.0-63.255`.
//! Data types are A-XDR tag numbers, again possibly a comma list.

use dlms_core::{DataType, ObisCode};
use dlms_interface::{CosemObject, ObjectType};
use log::{debug, warn};

/// One catalogue row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObisEntry {
    pub mask: &'static str,
    /// Class ids allowed for the code; empty means any
    pub classes: &'static [u16],
    /// `*` for any type
    pub data_type: &'static str,
    pub description: &'static str,
}

impl ObisEntry {
    pub const fn new(
        mask: &'static str,
        classes: &'static [u16],
        data_type: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            mask,
            classes,
            data_type,
            description,
        }
    }

    pub fn matches(&self, logical_name: &ObisCode, class_id: u16) -> bool {
        (self.classes.is_empty() || self.classes.contains(&class_id))
            && matches_mask(self.mask, logical_name)
    }

    /// UI data type of attribute 2 for an object named `logical_name`
    ///
    /// `None` when the catalogue allows several types or any type.
    pub fn ui_data_type(&self, logical_name: &ObisCode) -> Option<DataType> {
        let declared = self.data_type;
        let resolved = if declared.contains("10") {
            "10"
        } else if declared.contains("25") || declared.contains("26") {
            "25"
        } else if declared.contains('9') {
            if BILLING_TIME_STAMPS.iter().any(|mask| matches_mask(mask, logical_name)) {
                "25"
            } else if matches_mask(LOCAL_TIME, logical_name) {
                "27"
            } else if matches_mask(LOCAL_DATE, logical_name) {
                "26"
            } else {
                declared
            }
        } else {
            declared
        };
        if resolved == "*" || resolved.is_empty() || resolved.contains(',') {
            return None;
        }
        let tag = resolved.trim().parse::<u8>().ok()?;
        DataType::from_tag(tag).ok()
    }
}

/// Octet-string codes that hold a full date-time
const BILLING_TIME_STAMPS: [&str; 11] = [
    "0.0-64.96.7.10-14.255",
    "0.0-64.0.1.5.0-99,255",
    "0.0-64.0.1.2.0-99,255",
    "1.0-64.0.1.2.0-99,255",
    "1.0-64.0.1.5.0-99,255",
    "1.0-64.0.9.0.255",
    "1.0-64.0.9.6.255",
    "1.0-64.0.9.7.255",
    "1.0-64.0.9.13.255",
    "1.0-64.0.9.14.255",
    "1.0-64.0.9.15.255",
];
const LOCAL_TIME: &str = "1.0-64.0.9.1.255";
const LOCAL_DATE: &str = "1.0-64.0.9.2.255";

/// Whether `logical_name` falls under `mask`
pub fn matches_mask(mask: &str, logical_name: &ObisCode) -> bool {
    let groups: Vec<&str> = mask.split('.').collect();
    groups.len() == 6
        && groups
            .iter()
            .zip(logical_name.as_bytes())
            .all(|(group, value)| matches_group(group, *value))
}

fn matches_group(group: &str, value: u8) -> bool {
    group.split(',').any(|item| {
        let item = item.trim();
        if item == "*" {
            return true;
        }
        match item.split_once('-') {
            Some((low, high)) => match (low.parse::<u8>(), high.parse::<u8>()) {
                (Ok(low), Ok(high)) => (low..=high).contains(&value),
                _ => false,
            },
            None => item.parse::<u8>() == Ok(value),
        }
    })
}

const VALUE_CLASSES: [ObjectType; 4] = [
    ObjectType::Data,
    ObjectType::Register,
    ObjectType::RegisterActivation,
    ObjectType::ExtendedRegister,
];

/// Searchable OBIS catalogue
#[derive(Debug, Clone)]
pub struct ObisCatalog {
    entries: Vec<ObisEntry>,
}

impl ObisCatalog {
    pub fn new(entries: Vec<ObisEntry>) -> Self {
        Self { entries }
    }

    /// Built-in catalogue of common metering codes
    pub fn standard() -> Self {
        Self::new(STANDARD_ENTRIES.to_vec())
    }

    pub fn entries(&self) -> &[ObisEntry] {
        &self.entries
    }

    /// First entry matching the code and class
    pub fn find(&self, logical_name: &ObisCode, object_type: ObjectType) -> Option<&ObisEntry> {
        let class_id = object_type.class_id();
        self.entries
            .iter()
            .find(|entry| entry.matches(logical_name, class_id))
    }

    /// Attach the catalogue description and UI data type to an object
    ///
    /// Objects that already carry a description are left alone. Returns
    /// whether the object was annotated.
    pub fn annotate(&self, object: &mut CosemObject) -> bool {
        if object.description.as_deref().is_some_and(|d| !d.is_empty()) {
            return false;
        }
        let logical_name = object.logical_name();
        let Some(entry) = self.find(&logical_name, object.object_type()) else {
            warn!(
                "Unknown OBIS code {} for {}",
                logical_name,
                object.object_type()
            );
            return false;
        };
        object.description = Some(entry.description.to_string());
        if VALUE_CLASSES.contains(&object.object_type()) {
            if let Some(data_type) = entry.ui_data_type(&logical_name) {
                debug!("{} presents attribute 2 as {:?}", logical_name, data_type);
                object.set_ui_data_type(2, data_type);
            }
        }
        true
    }

    /// Annotate every object, returning how many were annotated
    pub fn annotate_all<'a, I>(&self, objects: I) -> usize
    where
        I: IntoIterator<Item = &'a mut CosemObject>,
    {
        objects
            .into_iter()
            .filter_map(|object| self.annotate(object).then_some(()))
            .count()
    }
}

impl Default for ObisCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

const DATA: u16 = 1;
const REGISTER: u16 = 3;
const EXTENDED_REGISTER: u16 = 4;
const DEMAND_REGISTER: u16 = 5;
const PROFILE_GENERIC: u16 = 7;

/// Specific masks come before the general ones they overlap
static STANDARD_ENTRIES: &[ObisEntry] = &[
    // Abstract objects
    ObisEntry::new("0.0.1.0.0.255", &[8], "*", "Clock"),
    ObisEntry::new("0.0.40.0.0-127.255", &[12, 15], "*", "Association"),
    ObisEntry::new("0.0.41.0.0.255", &[17], "*", "SAP assignment"),
    ObisEntry::new("0.0.42.0.0.255", &[DATA], "9", "COSEM logical device name"),
    ObisEntry::new("0.0.43.0.0-127.255", &[64], "*", "Security setup"),
    ObisEntry::new("0.0.44.0.0-127.255", &[18], "*", "Image transfer"),
    ObisEntry::new("0.0.25.9.0-127.255", &[40], "*", "Push setup"),
    ObisEntry::new("0.0.25.0.0.255", &[41], "*", "TCP-UDP setup"),
    ObisEntry::new("0.0.25.1.0.255", &[42], "*", "IPv4 setup"),
    ObisEntry::new("0.0.22.0.0.255", &[23], "*", "IEC HDLC setup"),
    ObisEntry::new("0.0.20.0.0.255", &[19], "*", "IEC optical port setup"),
    ObisEntry::new("0.0-64.24.6.0.255", &[74], "*", "M-Bus master port setup"),
    ObisEntry::new("0.0.13.0.0.255", &[20], "*", "Activity calendar"),
    ObisEntry::new("0.0.11.0.0.255", &[11], "*", "Special days table"),
    ObisEntry::new("0.0.15.0.0-127.255", &[22], "*", "Single action schedule"),
    ObisEntry::new("0.0-64.10.0.0-127.255", &[9], "*", "Script table"),
    ObisEntry::new("0.0.17.0.0-127.255", &[71], "*", "Limiter"),
    ObisEntry::new("0.0-64.96.3.10.255", &[70], "*", "Disconnect control"),
    ObisEntry::new("0.0-64.96.1.0-9.255", &[DATA, REGISTER], "6, 9, 10, 17, 18", "Device ID"),
    ObisEntry::new("0.0-64.96.5.0-4.255", &[DATA, REGISTER, 63], "4, 17, 18", "Internal operating status"),
    ObisEntry::new("0.0-64.96.7.10-14.255", &[DATA, REGISTER, EXTENDED_REGISTER], "9", "Time stamp of power failure"),
    ObisEntry::new("0.0-64.96.7.0-21.255", &[DATA, REGISTER, EXTENDED_REGISTER], "17, 18, 5, 6", "Number of power failures"),
    ObisEntry::new("0.0-64.96.11.0-4.255", &[DATA], "17, 18, 22", "Event code"),
    ObisEntry::new("0.0-64.96.14.0-15.255", &[DATA, REGISTER, EXTENDED_REGISTER], "17, 22, 9", "Currently active tariff"),
    ObisEntry::new("0.0-64.0.1.2.0-99,255", &[DATA, REGISTER, EXTENDED_REGISTER], "9", "Time stamp of the billing period"),
    ObisEntry::new("0.0-64.0.1.5.0-99,255", &[DATA, REGISTER, EXTENDED_REGISTER], "9", "Time stamp of the billing period (second scheme)"),
    ObisEntry::new("0.0-64.99.98.0-127.255", &[PROFILE_GENERIC], "*", "Event log"),
    // Electricity
    ObisEntry::new("1.0-64.0.0.0-9.255", &[DATA, REGISTER], "9, 10", "Electricity ID"),
    ObisEntry::new("1.0-64.0.2.0.255", &[DATA], "9, 10", "Active firmware identifier"),
    ObisEntry::new("1.0-64.0.1.0.255", &[DATA, REGISTER, EXTENDED_REGISTER], "17, 18, 5, 6", "Billing period counter"),
    ObisEntry::new("1.0-64.0.1.2.0-99,255", &[DATA, REGISTER, EXTENDED_REGISTER], "9", "Time stamp of the billing period"),
    ObisEntry::new("1.0-64.0.1.5.0-99,255", &[DATA, REGISTER, EXTENDED_REGISTER], "9", "Time stamp of the billing period (second scheme)"),
    ObisEntry::new("1.0-64.0.9.0.255", &[DATA, REGISTER], "9, 17, 18", "Time expired since last end of billing period"),
    ObisEntry::new("1.0-64.0.9.1.255", &[DATA, REGISTER], "9", "Local time"),
    ObisEntry::new("1.0-64.0.9.2.255", &[DATA, REGISTER], "9", "Local date"),
    ObisEntry::new("1.0-64.0.9.6.255", &[DATA], "9", "Time of last reset"),
    ObisEntry::new("1.0-64.0.9.7.255", &[DATA], "9", "Date of last reset"),
    ObisEntry::new("1.0-64.13.7.0.255", &[REGISTER], "16, 18, 15, 17", "Instantaneous power factor"),
    ObisEntry::new("1.0-64.14.7.0.255", &[REGISTER], "16, 18, 6, 5", "Supply frequency"),
    ObisEntry::new("1.0-64.32,52,72.7.0.255", &[REGISTER], "16, 18, 6, 5", "Instantaneous voltage"),
    ObisEntry::new("1.0-64.31,51,71.7.0.255", &[REGISTER], "16, 18, 6, 5", "Instantaneous current"),
    ObisEntry::new("1.0-64.1-80.7.0.255", &[REGISTER], "16, 18, 6, 5, 20, 21", "Instantaneous value"),
    ObisEntry::new("1.0-64.1-80.4.0.255", &[REGISTER, DEMAND_REGISTER], "16, 18, 6, 5", "Current average demand"),
    ObisEntry::new("1.0-64.1-80.6.0-63.255", &[EXTENDED_REGISTER], "16, 18, 6, 5", "Maximum demand"),
    ObisEntry::new("1.0-64.1-80.8.0-63.255", &[REGISTER, EXTENDED_REGISTER], "16, 18, 6, 5, 20, 21", "Energy register"),
    ObisEntry::new("1.0-64.99.1.0-127.255", &[PROFILE_GENERIC], "*", "Load profile with recording period 1"),
    ObisEntry::new("1.0-64.99.2.0-127.255", &[PROFILE_GENERIC], "*", "Load profile with recording period 2"),
    ObisEntry::new("1.0-64.98.1.0-127.255", &[PROFILE_GENERIC], "*", "Data of billing period"),
    ObisEntry::new("1.0-64.99.97.0-127.255", &[PROFILE_GENERIC], "*", "Power failure event log"),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn obis(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8) -> ObisCode {
        ObisCode::new(a, b, c, d, e, f)
    }

    fn annotated(object_type: ObjectType, logical_name: ObisCode) -> CosemObject {
        let mut object = CosemObject::new(object_type, logical_name);
        ObisCatalog::standard().annotate(&mut object);
        object
    }

    #[test]
    fn test_mask_groups() {
        let name = obis(1, 0, 1, 8, 0, 255);
        assert!(matches_mask("1.0-64.1-80.8.0-63.255", &name));
        assert!(matches_mask("*.*.*.*.*.*", &name));
        assert!(matches_mask("1.0.1.8.0-99,255.255", &name));
        assert!(!matches_mask("1.0.2.8.0.255", &name));
        assert!(!matches_mask("1.0.1.8.0", &name));
        assert!(!matches_mask("1.0.x.8.0.255", &name));
    }

    #[test]
    fn test_find_checks_class() {
        let catalog = ObisCatalog::standard();
        let clock = obis(0, 0, 1, 0, 0, 255);
        assert_eq!(
            catalog.find(&clock, ObjectType::Clock).map(|e| e.description),
            Some("Clock")
        );
        assert!(catalog.find(&clock, ObjectType::Data).is_none());
    }

    #[test]
    fn test_specific_before_general() {
        let catalog = ObisCatalog::standard();
        let voltage = catalog.find(&obis(1, 0, 32, 7, 0, 255), ObjectType::Register).unwrap();
        assert_eq!(voltage.description, "Instantaneous voltage");
        let other = catalog.find(&obis(1, 0, 21, 7, 0, 255), ObjectType::Register).unwrap();
        assert_eq!(other.description, "Instantaneous value");
    }

    #[test]
    fn test_date_and_time_heuristics() {
        let local_time = annotated(ObjectType::Data, obis(1, 0, 0, 9, 1, 255));
        assert_eq!(local_time.ui_data_type(2), DataType::Time);
        let local_date = annotated(ObjectType::Data, obis(1, 0, 0, 9, 2, 255));
        assert_eq!(local_date.ui_data_type(2), DataType::Date);
        let billing = annotated(ObjectType::Data, obis(1, 0, 0, 1, 2, 3));
        assert_eq!(billing.ui_data_type(2), DataType::DateTime);
        let reset = annotated(ObjectType::Data, obis(1, 0, 0, 9, 6, 255));
        assert_eq!(reset.ui_data_type(2), DataType::DateTime);
    }

    #[test]
    fn test_text_and_plain_octet_strings() {
        let device_id = annotated(ObjectType::Data, obis(0, 0, 96, 1, 0, 255));
        assert_eq!(device_id.description.as_deref(), Some("Device ID"));
        assert_eq!(device_id.ui_data_type(2), DataType::VisibleString);

        let name = annotated(ObjectType::Data, obis(0, 0, 42, 0, 0, 255));
        assert_eq!(name.ui_data_type(2), DataType::OctetString);
    }

    #[test]
    fn test_type_lists_leave_ui_type_unset() {
        let energy = annotated(ObjectType::Register, obis(1, 0, 1, 8, 0, 255));
        assert_eq!(energy.description.as_deref(), Some("Energy register"));
        assert_eq!(energy.ui_data_type(2), DataType::None);
    }

    #[test]
    fn test_only_value_classes_get_ui_type() {
        let catalog = ObisCatalog::new(vec![ObisEntry::new("0.0.96.1.0.255", &[], "10", "Any")]);
        let mut profile = CosemObject::new(ObjectType::ProfileGeneric, obis(0, 0, 96, 1, 0, 255));
        assert!(catalog.annotate(&mut profile));
        assert_eq!(profile.ui_data_type(2), DataType::None);
        assert_eq!(profile.description.as_deref(), Some("Any"));
    }

    #[test]
    fn test_described_and_unknown_objects_are_skipped() {
        let catalog = ObisCatalog::standard();
        let mut described = CosemObject::new(ObjectType::Data, obis(0, 0, 96, 1, 0, 255));
        described.description = Some("Serial".to_string());
        assert!(!catalog.annotate(&mut described));
        assert_eq!(described.description.as_deref(), Some("Serial"));
        assert_eq!(described.ui_data_type(2), DataType::None);

        let mut unknown = CosemObject::new(ObjectType::Data, obis(7, 7, 7, 7, 7, 7));
        assert!(!catalog.annotate(&mut unknown));
        assert!(unknown.description.is_none());

        let mut objects = vec![
            CosemObject::new(ObjectType::Clock, obis(0, 0, 1, 0, 0, 255)),
            CosemObject::new(ObjectType::Data, obis(7, 7, 7, 7, 7, 7)),
        ];
        assert_eq!(catalog.annotate_all(objects.iter_mut()), 1);
    }
}
