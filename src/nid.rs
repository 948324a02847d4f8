//! Network identifier: the access code and data unit tag that lead every frame.

use std::fmt;

#[cfg(feature = "ser")]
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Result};

/// 12-bit network access code, the system id of a frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "ser", derive(Serialize, Deserialize))]
pub enum NetworkAccessCode {
    Default,
    ReceiveAny,
    RepeatAny,
    Other(u16),
}

impl NetworkAccessCode {
    /// Interpret the given bits, which must fit in 12 bits.
    pub fn new(bits: u16) -> Result<NetworkAccessCode> {
        if bits >> 12 != 0 {
            return Err(DecodeError::AccessCode(bits));
        }

        Ok(NetworkAccessCode::from_bits(bits))
    }

    /// Interpret the 12 LSBs of the given bits.
    pub fn from_bits(bits: u16) -> NetworkAccessCode {
        use self::NetworkAccessCode::*;

        match bits & 0xFFF {
            0x293 => Default,
            0xF7E => ReceiveAny,
            0xF7F => RepeatAny,
            other => Other(other),
        }
    }

    pub fn to_bits(&self) -> u16 {
        use self::NetworkAccessCode::*;

        match *self {
            Default => 0x293,
            ReceiveAny => 0xF7E,
            RepeatAny => 0xF7F,
            Other(bits) => bits,
        }
    }
}

impl fmt::Display for NetworkAccessCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:03X}", self.to_bits())
    }
}

/// Data unit (frame type) tags.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "ser", derive(Serialize, Deserialize))]
pub enum DataUnit {
    /// HDU
    VoiceHeader,
    /// TDU
    VoiceSimpleTerminator,
    /// TDULC
    VoiceLcTerminator,
    /// LDU1
    VoiceLcFrameGroup,
    /// LDU2
    VoiceCcFrameGroup,
    /// PDU
    DataPacket,
    /// TSBK
    TrunkingSignaling,
}

impl DataUnit {
    pub fn from_bits(bits: u8) -> Option<DataUnit> {
        use self::DataUnit::*;

        match bits & 0b1111 {
            0b0000 => Some(VoiceHeader),
            0b0011 => Some(VoiceSimpleTerminator),
            0b1111 => Some(VoiceLcTerminator),
            0b0101 => Some(VoiceLcFrameGroup),
            0b1010 => Some(VoiceCcFrameGroup),
            0b1100 => Some(DataPacket),
            0b0111 => Some(TrunkingSignaling),
            _ => None,
        }
    }

    pub fn to_bits(&self) -> u8 {
        use self::DataUnit::*;

        match *self {
            VoiceHeader => 0b0000,
            VoiceSimpleTerminator => 0b0011,
            VoiceLcTerminator => 0b1111,
            VoiceLcFrameGroup => 0b0101,
            VoiceCcFrameGroup => 0b1010,
            DataPacket => 0b1100,
            TrunkingSignaling => 0b0111,
        }
    }

    /// Short label used in message summaries.
    pub fn label(&self) -> &'static str {
        use self::DataUnit::*;

        match *self {
            VoiceHeader => "HDU",
            VoiceSimpleTerminator => "TDU",
            VoiceLcTerminator => "TDULC",
            VoiceLcFrameGroup => "LDU1",
            VoiceCcFrameGroup => "LDU2",
            DataPacket => "PDU",
            TrunkingSignaling => "TSBK",
        }
    }

    /// Number of payload bits following the NID, with status symbols removed, or the
    /// minimum for units whose length depends on their content.
    pub fn payload_bits(&self) -> usize {
        use self::DataUnit::*;

        match *self {
            VoiceHeader => 648,
            VoiceSimpleTerminator => 0,
            VoiceLcTerminator => 288,
            VoiceLcFrameGroup | VoiceCcFrameGroup => 1568,
            DataPacket | TrunkingSignaling => 96,
        }
    }
}

/// 16-bit network identifier: access code followed by the 4-bit data unit tag.
///
/// The tag is kept raw so reserved values still reach the classifier.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct NetworkId {
    access_code: NetworkAccessCode,
    duid: u8,
}

impl NetworkId {
    pub fn new(access_code: NetworkAccessCode, data_unit: DataUnit) -> NetworkId {
        NetworkId {
            access_code,
            duid: data_unit.to_bits(),
        }
    }

    pub fn from_bits(bits: u16) -> NetworkId {
        NetworkId {
            access_code: NetworkAccessCode::from_bits(bits >> 4),
            duid: bits as u8 & 0b1111,
        }
    }

    pub fn to_bits(&self) -> u16 {
        self.access_code.to_bits() << 4 | self.duid as u16
    }

    pub fn access_code(&self) -> NetworkAccessCode { self.access_code }

    /// Raw 4-bit data unit tag.
    pub fn duid(&self) -> u8 { self.duid }

    /// Data unit, if the tag is a defined one.
    pub fn data_unit(&self) -> Option<DataUnit> { DataUnit::from_bits(self.duid) }
}
