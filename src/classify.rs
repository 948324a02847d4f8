//! Frame classification: the plain tag values that select a message family and, within
//! a family, the specific message.
//!
//! Opcode fields sit inside FEC-protected regions, so the secondary classifiers are
//! run on the corrected words.

use crate::buffer::BitView;
use crate::data::fields::{PacketFormat, ServiceAccessPoint};
use crate::nid::{DataUnit, NetworkAccessCode, NetworkId};
use crate::vendor::Vendor;

/// Primary classification of a frame, read from its NID.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Classification {
    pub nac: NetworkAccessCode,
    /// Raw 4-bit data unit tag.
    pub duid: u8,
    /// Data unit, if the tag is a defined one.
    pub data_unit: Option<DataUnit>,
}

impl Classification {
    pub fn new(nid: NetworkId) -> Classification {
        Classification {
            nac: nid.access_code(),
            duid: nid.duid(),
            data_unit: nid.data_unit(),
        }
    }
}

/// Secondary classification within a message family.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Opcode {
    /// 6-bit opcode.
    pub opcode: u8,
    /// Vendor that defines the opcode. Implicit-format words are always standard.
    pub vendor: Vendor,
}

impl Opcode {
    /// Whether dispatch ignores the vendor.
    pub fn is_standard(&self) -> bool { self.vendor.is_standard() }
}

/// Classify a trunking block from its first two bytes: last-block flag, protected
/// flag, opcode, then MFID.
pub fn tsbk(block: &[u8]) -> Opcode {
    Opcode {
        opcode: block[0] & 0x3F,
        vendor: Vendor::from_bits(block[1]),
    }
}

/// Classify a link control word from its first two bytes: protected flag, explicit
/// flag, opcode, then MFID when explicit.
pub fn link_control(lc: &[u8]) -> Opcode {
    let explicit = lc[0] >> 6 & 1 == 1;

    Opcode {
        opcode: lc[0] & 0x3F,
        vendor: if explicit { Vendor::from_bits(lc[1]) } else { Vendor::Standard },
    }
}

/// Classification of a packet data header block.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PacketClass {
    pub format: PacketFormat,
    pub sap: ServiceAccessPoint,
    pub vendor: Vendor,
    /// Trunking opcode, carried in the header only for the alternate trunking
    /// format.
    pub opcode: Option<u8>,
}

/// Classify a 96-bit packet header block.
pub fn packet(header: BitView) -> PacketClass {
    let format = PacketFormat::from_bits(header.int(3..8) as u8);

    PacketClass {
        format,
        sap: ServiceAccessPoint::from_bits(header.int(10..16) as u8),
        vendor: Vendor::from_bits(header.int(16..24) as u8),
        opcode: match format {
            PacketFormat::Trunking => Some(header.int(58..64) as u8),
            _ => None,
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::buffer::BitBuffer;

    #[test]
    fn test_classification() {
        let c = Classification::new(NetworkId::from_bits(0x2937));

        assert_eq!(c.nac, NetworkAccessCode::Default);
        assert_eq!(c.duid, 0b0111);
        assert_eq!(c.data_unit, Some(DataUnit::TrunkingSignaling));

        let c = Classification::new(NetworkId::from_bits(0x1231));
        assert_eq!(c.data_unit, None);
        assert_eq!(c.duid, 1);
    }

    #[test]
    fn test_tsbk() {
        let o = tsbk(&[0b10111100, 0x00]);
        assert_eq!(o, Opcode { opcode: 0x3C, vendor: Vendor::Standard });
        assert!(o.is_standard());

        let o = tsbk(&[0b00000010, 0x90]);
        assert_eq!(o, Opcode { opcode: 0x02, vendor: Vendor::Motorola });
        assert!(!o.is_standard());
    }

    #[test]
    fn test_link_control() {
        // Implicit format: byte 1 is payload, not a vendor.
        let o = link_control(&[0b10100010, 0x90]);
        assert_eq!(o, Opcode { opcode: 0x22, vendor: Vendor::Standard });

        let o = link_control(&[0b01000001, 0x90]);
        assert_eq!(o, Opcode { opcode: 0x01, vendor: Vendor::Motorola });
    }

    #[test]
    fn test_packet() {
        let mut b = BitBuffer::new(96);
        b.store(3, 5, 0b10111);
        b.store(10, 6, 0x3D);
        b.store(16, 8, 0x00);
        b.store(58, 6, 0x3C);

        let c = packet(b.view(0..96));
        assert_eq!(c.format, PacketFormat::Trunking);
        assert_eq!(c.sap, ServiceAccessPoint::TrunkingControl);
        assert_eq!(c.vendor, Vendor::Standard);
        assert_eq!(c.opcode, Some(0x3C));

        b.store(3, 5, 0b10110);
        let c = packet(b.view(0..96));
        assert_eq!(c.format, PacketFormat::Confirmed);
        assert_eq!(c.opcode, None);
    }
}
