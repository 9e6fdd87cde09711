//! Frame Check Sequence (FCS) calculation for HDLC
//!
//! CRC-16/X.25: reflected polynomial 0x8408, initial value 0xFFFF, final
//! complement, transmitted least significant byte first.

use dlms_core::{DlmsError, DlmsResult};

const INITIAL_FCS: u16 = 0xFFFF;
const GOOD_FCS: u16 = 0xF0B8;
/// Bit-reversed 0x1021
const KEY: u16 = 0x8408;

const FCS_TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut b = 0;
    while b < 256 {
        let mut v = b as u16;
        let mut bit = 0;
        while bit < 8 {
            v = if v & 1 == 1 { (v >> 1) ^ KEY } else { v >> 1 };
            bit += 1;
        }
        table[b] = v;
        b += 1;
    }
    table
}

/// Frame Check Sequence calculator
#[derive(Debug, Clone, Copy)]
pub struct FcsCalc {
    fcs_value: u16,
}

impl FcsCalc {
    pub fn new() -> Self {
        Self {
            fcs_value: INITIAL_FCS,
        }
    }

    /// Update the FCS value with a single byte
    pub fn update(&mut self, data: u8) {
        self.fcs_value =
            (self.fcs_value >> 8) ^ FCS_TABLE[((self.fcs_value ^ data as u16) & 0xFF) as usize];
    }

    pub fn update_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            self.update(byte);
        }
    }

    /// FCS bytes as appended to a frame (little-endian, complemented)
    pub fn fcs_value_bytes(&self) -> [u8; 2] {
        (self.fcs_value ^ 0xFFFF).to_le_bytes()
    }

    /// Validate a run that included its trailing FCS bytes
    pub fn validate(&self) -> DlmsResult<()> {
        if self.fcs_value != GOOD_FCS {
            return Err(DlmsError::FrameInvalid(format!(
                "FCS has wrong value: 0x{:04X}, expected 0x{:04X}",
                self.fcs_value, GOOD_FCS
            )));
        }
        Ok(())
    }
}

impl Default for FcsCalc {
    fn default() -> Self {
        Self::new()
    }
}

/// FCS bytes of `data`
pub fn fcs16(data: &[u8]) -> [u8; 2] {
    let mut calc = FcsCalc::new();
    calc.update_bytes(data);
    calc.fcs_value_bytes()
}

/// Check `data` followed by its two FCS bytes
pub fn check_fcs16(data_with_fcs: &[u8]) -> DlmsResult<()> {
    let mut calc = FcsCalc::new();
    calc.update_bytes(data_with_fcs);
    calc.validate()
}
