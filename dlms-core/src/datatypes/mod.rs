//! Data types used in DLMS/COSEM protocol

pub mod bit_string;
pub mod cosem_date;
pub mod cosem_date_time;
pub mod cosem_time;
pub mod data_object;

pub use bit_string::BitString;
pub use cosem_date::CosemDate;
pub use cosem_date_time::{ClockStatus, CosemDateTime};
pub use cosem_time::CosemTime;
pub use data_object::{DataObject, DataType};
