//! HDLC address encoding
//!
//! Every address byte carries seven address bits and an extension bit in
//! the least significant position; the extension bit is set on the last
//! byte of an address.

use dlms_core::{DlmsError, DlmsResult};

/// Reserved HDLC addresses
pub mod reserved {
    /// Client management process
    pub const CLIENT_MANAGEMENT_PROCESS: u16 = 0x01;

    /// Client public client
    pub const CLIENT_PUBLIC_CLIENT: u16 = 0x10;

    /// Server upper management logical device
    pub const SERVER_UPPER_MANAGEMENT_LOGICAL_DEVICE: u16 = 0x01;
}

const ONE_BYTE_UPPER_BOUND: u32 = 0x7F;
const TWO_BYTE_UPPER_BOUND: u32 = 0x3FFF;
const FOUR_BYTE_UPPER_BOUND: u32 = 0x0FFF_FFFF;

/// Encode an address using 1, 2 or 4 bytes, whichever is smallest
pub fn encode_address(address: u32) -> DlmsResult<Vec<u8>> {
    let size = if address <= ONE_BYTE_UPPER_BOUND {
        1
    } else if address <= TWO_BYTE_UPPER_BOUND {
        2
    } else if address <= FOUR_BYTE_UPPER_BOUND {
        4
    } else {
        return Err(DlmsError::InvalidData(format!(
            "Address 0x{:X} is out of upper bound 0x{:X}",
            address, FOUR_BYTE_UPPER_BOUND
        )));
    };

    let mut result = vec![0u8; size];
    for (i, byte) in result.iter_mut().enumerate() {
        let shift = 7 * (size - i - 1);
        *byte = (((address >> shift) & 0x7F) as u8) << 1;
    }
    result[size - 1] |= 0x01;
    Ok(result)
}

/// Decode an address from the front of `data`
///
/// Returns the address and the number of bytes it occupied.
pub fn decode_address(data: &[u8]) -> DlmsResult<(u32, usize)> {
    let mut address = 0u32;
    for (i, &byte) in data.iter().take(4).enumerate() {
        address = (address << 7) | (byte >> 1) as u32;
        if byte & 0x01 == 0x01 {
            let length = i + 1;
            if length == 3 {
                return Err(DlmsError::FrameInvalid(
                    "HDLC address of 3 bytes is invalid".to_string(),
                ));
            }
            return Ok((address, length));
        }
    }
    Err(DlmsError::FrameInvalid(
        "HDLC address has no end marker".to_string(),
    ))
}

/// Combine a physical and logical address into one server address
///
/// The logical part is shifted above the physical part by 4, 8 or 16 bits
/// depending on the size of the physical address.
pub fn count_server_address(physical_address: u32, logical_address: u32) -> u32 {
    if physical_address < 0x10 {
        logical_address << 4 | physical_address
    } else if physical_address < 0x100 {
        logical_address << 8 | physical_address
    } else {
        logical_address << 16 | physical_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_byte_addresses() {
        assert_eq!(encode_address(1).unwrap(), vec![0x03]);
        assert_eq!(encode_address(16).unwrap(), vec![0x21]);
        assert_eq!(decode_address(&[0x21, 0x93]).unwrap(), (16, 1));
    }

    #[test]
    fn test_two_and_four_byte_addresses() {
        let bytes = encode_address(0x0111).unwrap();
        assert_eq!(bytes, vec![0x04, 0x23]);
        assert_eq!(decode_address(&bytes).unwrap(), (0x0111, 2));

        let bytes = encode_address(0x0001_4000).unwrap();
        assert_eq!(bytes.len(), 4);
        assert_eq!(decode_address(&bytes).unwrap(), (0x0001_4000, 4));
    }

    #[test]
    fn test_address_errors() {
        assert!(encode_address(0x1000_0000).is_err());
        assert!(decode_address(&[0x02, 0x04, 0x06, 0x08]).is_err());
        assert!(decode_address(&[0x02, 0x04, 0x07]).is_err());
    }

    #[test]
    fn test_count_server_address() {
        assert_eq!(count_server_address(5, 1), 0x15);
        assert_eq!(count_server_address(0x11, 1), 0x0111);
        assert_eq!(count_server_address(0x1234, 1), 0x0001_1234);
    }
}
