//! Scaler and unit of register values
//!
//! Register, Extended Register and Demand Register carry a
//! `structure { scaler: integer, unit: enum }`. The physical value is
//! `raw * 10^scaler`.

use dlms_core::{DataObject, DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScalerUnit {
    /// Power of ten applied to the raw value
    pub scaler: i8,
    /// Unit code (0x1B = W, 0x1E = Wh, ...)
    pub unit: u8,
}

impl ScalerUnit {
    pub fn new(scaler: i8, unit: u8) -> Self {
        Self { scaler, unit }
    }

    pub fn scale_value(&self, value: f64) -> f64 {
        value * 10_f64.powi(self.scaler as i32)
    }

    pub fn unscale_value(&self, scaled_value: f64) -> f64 {
        scaled_value / 10_f64.powi(self.scaler as i32)
    }

    /// Scaled physical value of a raw register value
    pub fn scale(&self, raw: &DataObject) -> DlmsResult<f64> {
        let value = match raw {
            DataObject::Float32(v) => f64::from(*v),
            DataObject::Float64(v) => *v,
            other => other.to_i128()? as f64,
        };
        Ok(self.scale_value(value))
    }

    pub fn to_data_object(&self) -> DataObject {
        DataObject::Structure(vec![
            DataObject::Integer8(self.scaler),
            DataObject::Enumerate(self.unit),
        ])
    }

    /// Read the two-element structure
    ///
    /// Meters disagree on the exact integer types, so any integer that fits
    /// is accepted for either field.
    pub fn from_data_object(obj: &DataObject) -> DlmsResult<Self> {
        let elements = obj.as_structure()?;
        if elements.len() != 2 {
            return Err(DlmsError::InvalidData(format!(
                "ScalerUnit structure must have 2 elements, got {}",
                elements.len()
            )));
        }
        let scaler = elements[0].to_i128()?;
        let scaler = i8::try_from(scaler)
            .map_err(|_| DlmsError::OutOfRange(format!("Scaler {} does not fit in i8", scaler)))?;
        Ok(Self::new(scaler, elements[1].to_u8()?))
    }
}

/// Common unit codes
pub mod units {
    pub const NO_UNIT: u8 = 0x00;
    pub const WATT: u8 = 0x1B;
    pub const WATT_HOUR: u8 = 0x1E;
    pub const VOLT: u8 = 0x23;
    pub const AMPERE: u8 = 0x21;
    pub const HERTZ: u8 = 0x2C;
    pub const CUBIC_METRE: u8 = 0x0D;
    /// Count of something; used when the value has no physical unit
    pub const COUNT: u8 = 0xFF;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_value() {
        let su = ScalerUnit::new(-2, units::WATT_HOUR);
        assert!((su.scale_value(12345.0) - 123.45).abs() < 1e-9);
        assert!((su.unscale_value(123.45) - 12345.0).abs() < 1e-6);
    }

    #[test]
    fn test_scale_data_object() {
        let su = ScalerUnit::new(1, units::WATT);
        assert!((su.scale(&DataObject::Unsigned16(42)).unwrap() - 420.0).abs() < 1e-9);
        assert!((su.scale(&DataObject::Float32(1.5)).unwrap() - 15.0).abs() < 1e-9);
        assert!(su.scale(&DataObject::OctetString(vec![1])).is_err());
    }

    #[test]
    fn test_to_from_data_object() {
        let su = ScalerUnit::new(3, units::WATT);
        let obj = su.to_data_object();
        assert_eq!(ScalerUnit::from_data_object(&obj).unwrap(), su);
    }

    #[test]
    fn test_from_loose_types() {
        let obj = DataObject::Structure(vec![DataObject::Integer16(-1), DataObject::Unsigned8(0x23)]);
        assert_eq!(
            ScalerUnit::from_data_object(&obj).unwrap(),
            ScalerUnit::new(-1, units::VOLT)
        );
    }

    #[test]
    fn test_from_bad_structure() {
        let obj = DataObject::Structure(vec![DataObject::Integer8(0)]);
        assert!(ScalerUnit::from_data_object(&obj).is_err());
        assert!(ScalerUnit::from_data_object(&DataObject::Unsigned8(1)).is_err());
    }
}
