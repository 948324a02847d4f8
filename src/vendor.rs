//! Manufacturer ids carried in trunking blocks, packet headers, and explicit link
//! control words.

use std::fmt;

#[cfg(feature = "ser")]
use serde::{Deserialize, Serialize};

/// Manufacturer that defined a message's layout.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "ser", derive(Serialize, Deserialize))]
pub enum Vendor {
    /// Layout defined by the standard, ids 0x00 and 0x01.
    Standard,
    Motorola,
    Harris,
    Tait,
    Other(u8),
}

impl Vendor {
    pub fn from_bits(bits: u8) -> Vendor {
        use self::Vendor::*;

        match bits {
            0x00 | 0x01 => Standard,
            0x90 => Motorola,
            0xA4 => Harris,
            0xD8 => Tait,
            b => Other(b),
        }
    }

    pub fn to_bits(&self) -> u8 {
        use self::Vendor::*;

        match *self {
            Standard => 0x00,
            Motorola => 0x90,
            Harris => 0xA4,
            Tait => 0xD8,
            Other(b) => b,
        }
    }

    pub fn is_standard(&self) -> bool { *self == Vendor::Standard }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Vendor::*;

        match *self {
            Standard => f.write_str("STANDARD"),
            Motorola => f.write_str("MOTOROLA"),
            Harris => f.write_str("HARRIS"),
            Tait => f.write_str("TAIT"),
            Other(b) => write!(f, "VENDOR:{:02X}", b),
        }
    }
}
