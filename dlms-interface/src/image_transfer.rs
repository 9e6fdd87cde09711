//! Image Transfer interface class (Class ID: 18)
//!
//! Firmware upgrade: the image is sent in blocks of `image_block_size`
//! bytes, then verified and activated.
//!
//! # Attributes
//!
//! - Attribute 2: image_block_size
//! - Attribute 3: image_transferred_blocks_status
//! - Attribute 4: image_first_not_transferred_block_number
//! - Attribute 5: image_transfer_enabled
//! - Attribute 6: image_transfer_status
//! - Attribute 7: image_to_activate_info
//!
//! # Methods
//!
//! - Method 1: image_transfer_initiate
//! - Method 2: image_block_transfer
//! - Method 3: image_verify
//! - Method 4: image_activate

use crate::attributes::{CosemAttributes, array_items, no_attribute, structure_of};
use dlms_core::{BitString, DataObject, DataType, DlmsError, DlmsResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageTransferStatus {
    #[default]
    NotInitiated,
    Initiated,
    VerificationInitiated,
    VerificationSuccessful,
    VerificationFailed,
    ActivationInitiated,
    ActivationSuccessful,
    ActivationFailed,
}

impl ImageTransferStatus {
    pub fn from_code(code: u8) -> DlmsResult<Self> {
        Ok(match code {
            0 => ImageTransferStatus::NotInitiated,
            1 => ImageTransferStatus::Initiated,
            2 => ImageTransferStatus::VerificationInitiated,
            3 => ImageTransferStatus::VerificationSuccessful,
            4 => ImageTransferStatus::VerificationFailed,
            5 => ImageTransferStatus::ActivationInitiated,
            6 => ImageTransferStatus::ActivationSuccessful,
            7 => ImageTransferStatus::ActivationFailed,
            _ => {
                return Err(DlmsError::InvalidData(format!(
                    "Invalid image transfer status {}",
                    code
                )))
            }
        })
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// One entry of `image_to_activate_info`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageActivateInfo {
    pub size: u32,
    pub identification: Vec<u8>,
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageTransfer {
    pub image_block_size: u32,
    pub transferred_blocks_status: Option<BitString>,
    pub first_not_transferred_block_number: u32,
    pub image_transfer_enabled: bool,
    pub image_transfer_status: ImageTransferStatus,
    pub image_activate_info: Vec<ImageActivateInfo>,
}

impl Default for ImageTransfer {
    fn default() -> Self {
        Self {
            image_block_size: 200,
            transferred_blocks_status: None,
            first_not_transferred_block_number: 0,
            image_transfer_enabled: false,
            image_transfer_status: ImageTransferStatus::default(),
            image_activate_info: Vec::new(),
        }
    }
}

impl ImageTransfer {
    pub const CLASS_ID: u16 = 18;
    pub const ATTR_IMAGE_BLOCK_SIZE: u8 = 2;
    pub const ATTR_TRANSFERRED_BLOCKS_STATUS: u8 = 3;
    pub const ATTR_FIRST_NOT_TRANSFERRED_BLOCK_NUMBER: u8 = 4;
    pub const ATTR_IMAGE_TRANSFER_ENABLED: u8 = 5;
    pub const ATTR_IMAGE_TRANSFER_STATUS: u8 = 6;
    pub const ATTR_IMAGE_TO_ACTIVATE_INFO: u8 = 7;
    pub const METHOD_INITIATE: u8 = 1;
    pub const METHOD_BLOCK_TRANSFER: u8 = 2;
    pub const METHOD_VERIFY: u8 = 3;
    pub const METHOD_ACTIVATE: u8 = 4;

    fn check_block_size(&self) -> DlmsResult<usize> {
        if self.image_block_size == 0 {
            return Err(DlmsError::Argument("Invalid image block size 0".to_string()));
        }
        Ok(self.image_block_size as usize)
    }

    /// Parameter of `image_transfer_initiate`
    pub fn initiate_parameters(&self, identifier: &[u8], image_size: u32) -> DlmsResult<DataObject> {
        self.check_block_size()?;
        Ok(DataObject::Structure(vec![
            DataObject::OctetString(identifier.to_vec()),
            DataObject::Unsigned32(image_size),
        ]))
    }

    /// Parameters of `image_block_transfer`, one per block, numbered from 0
    pub fn block_parameters(&self, image: &[u8]) -> DlmsResult<Vec<DataObject>> {
        let block_size = self.check_block_size()?;
        image
            .chunks(block_size)
            .enumerate()
            .map(|(number, block)| {
                let number = u32::try_from(number).map_err(|_| {
                    DlmsError::OutOfRange("Image has too many blocks".to_string())
                })?;
                Ok(DataObject::Structure(vec![
                    DataObject::Unsigned32(number),
                    DataObject::OctetString(block.to_vec()),
                ]))
            })
            .collect()
    }
}

impl CosemAttributes for ImageTransfer {
    fn attribute_count(&self) -> u8 {
        7
    }

    fn method_count(&self) -> u8 {
        4
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataType> {
        match index {
            Self::ATTR_IMAGE_BLOCK_SIZE | Self::ATTR_FIRST_NOT_TRANSFERRED_BLOCK_NUMBER => {
                Ok(DataType::DoubleLongUnsigned)
            }
            Self::ATTR_TRANSFERRED_BLOCKS_STATUS => Ok(DataType::BitString),
            Self::ATTR_IMAGE_TRANSFER_ENABLED => Ok(DataType::Boolean),
            Self::ATTR_IMAGE_TRANSFER_STATUS => Ok(DataType::Enum),
            Self::ATTR_IMAGE_TO_ACTIVATE_INFO => Ok(DataType::Array),
            _ => Err(no_attribute("ImageTransfer", index)),
        }
    }

    fn get_value(&self, index: u8) -> DlmsResult<DataObject> {
        Ok(match index {
            Self::ATTR_IMAGE_BLOCK_SIZE => DataObject::Unsigned32(self.image_block_size),
            Self::ATTR_TRANSFERRED_BLOCKS_STATUS => match &self.transferred_blocks_status {
                Some(bits) => DataObject::BitString(bits.clone()),
                None => DataObject::Null,
            },
            Self::ATTR_FIRST_NOT_TRANSFERRED_BLOCK_NUMBER => {
                DataObject::Unsigned32(self.first_not_transferred_block_number)
            }
            Self::ATTR_IMAGE_TRANSFER_ENABLED => DataObject::Boolean(self.image_transfer_enabled),
            Self::ATTR_IMAGE_TRANSFER_STATUS => DataObject::Enumerate(self.image_transfer_status.code()),
            Self::ATTR_IMAGE_TO_ACTIVATE_INFO => DataObject::Array(
                self.image_activate_info
                    .iter()
                    .map(|info| {
                        DataObject::Structure(vec![
                            DataObject::Unsigned32(info.size),
                            DataObject::OctetString(info.identification.clone()),
                            DataObject::OctetString(info.signature.clone()),
                        ])
                    })
                    .collect(),
            ),
            _ => return Err(no_attribute("ImageTransfer", index)),
        })
    }

    fn set_value(&mut self, index: u8, value: DataObject) -> DlmsResult<()> {
        match index {
            Self::ATTR_IMAGE_BLOCK_SIZE => self.image_block_size = value.to_u32()?,
            Self::ATTR_TRANSFERRED_BLOCKS_STATUS => {
                self.transferred_blocks_status = match value {
                    DataObject::BitString(bits) => Some(bits),
                    DataObject::Null => None,
                    other => {
                        return Err(DlmsError::InvalidData(format!(
                            "Expected BitString, got {:?}",
                            other.data_type()
                        )))
                    }
                };
            }
            Self::ATTR_FIRST_NOT_TRANSFERRED_BLOCK_NUMBER => {
                self.first_not_transferred_block_number = value.to_u32()?
            }
            Self::ATTR_IMAGE_TRANSFER_ENABLED => self.image_transfer_enabled = value.as_bool()?,
            Self::ATTR_IMAGE_TRANSFER_STATUS => {
                self.image_transfer_status = ImageTransferStatus::from_code(value.to_u8()?)?
            }
            Self::ATTR_IMAGE_TO_ACTIVATE_INFO => {
                self.image_activate_info = array_items(&value)?
                    .iter()
                    .map(|item| {
                        let fields = structure_of(item, 3)?;
                        Ok(ImageActivateInfo {
                            size: fields[0].to_u32()?,
                            identification: fields[1].as_bytes()?.to_vec(),
                            signature: fields[2].as_bytes()?.to_vec(),
                        })
                    })
                    .collect::<DlmsResult<_>>()?;
            }
            _ => return Err(no_attribute("ImageTransfer", index)),
        }
        Ok(())
    }
}
