//! Packet header block, which describes the data blocks that follow it.
//!
//! A header has several fields followed by a 16-bit checksum over those fields.

use std::fmt;

use crate::buffer::BitBuffer;
use crate::classify::{self, PacketClass};
use crate::coding::crc::{self, Crc16Params};
use crate::coding::Verdict;
use crate::data::fields::{PacketFormat, ResponseKind, ServiceAccessPoint};
use crate::vendor::Vendor;

/// Number of bits in a header block.
pub const HEADER_BITS: usize = 96;

/// Decoded packet header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PduHeader(BitBuffer);

impl PduHeader {
    /// Interpret the given 96 bits as a header without checking them.
    pub fn new(bits: BitBuffer) -> PduHeader {
        assert_eq!(bits.len(), HEADER_BITS);
        PduHeader(bits)
    }

    /// Check the CRC of the given header block, correcting up to two bits in place
    /// when `search` is set.
    pub fn decode(buf: &mut BitBuffer, search: bool) -> (PduHeader, Verdict) {
        let verdict = crc::correct::<Crc16Params>(buf, 0..80, 80..96, search);
        (PduHeader::new(buf.sub_range(0..HEADER_BITS)), verdict)
    }

    /// Format, SAP, vendor, and trunking opcode of the packet.
    pub fn class(&self) -> PacketClass { classify::packet(self.0.view(0..HEADER_BITS)) }

    /// Whether the receiver must confirm the packet.
    pub fn confirm(&self) -> bool { self.0.bit(1) }
    /// Whether the packet is outbound (from the site).
    pub fn outbound(&self) -> bool { self.0.bit(2) }
    pub fn format(&self) -> PacketFormat { PacketFormat::from_bits(self.0.int(3..8) as u8) }
    pub fn sap(&self) -> ServiceAccessPoint {
        ServiceAccessPoint::from_bits(self.0.int(10..16) as u8)
    }
    pub fn mfg(&self) -> u8 { self.0.int(16..24) as u8 }
    pub fn vendor(&self) -> Vendor { Vendor::from_bits(self.mfg()) }
    /// Logical link ID: the destination (outbound) or source (inbound) unit.
    pub fn logical_link(&self) -> u32 { self.0.int(24..48) as u32 }
    /// Whether this is a complete packet rather than a selective retry.
    pub fn full_message(&self) -> bool { self.0.bit(48) }
    /// Number of data blocks after the header.
    pub fn blocks_to_follow(&self) -> usize { self.0.int(49..56) as usize }
    /// Number of pad bytes between the user data and the packet CRC.
    pub fn pad_octets(&self) -> usize { self.0.int(59..64) as usize }
    /// Whether the receiver should resynchronize its sequence numbers.
    pub fn resync(&self) -> bool { self.0.bit(64) }
    /// Packet sequence number, N(S).
    pub fn sequence(&self) -> u8 { self.0.int(65..68) as u8 }
    /// Fragment sequence number, FSNF.
    pub fn fragment(&self) -> u8 { self.0.int(68..72) as u8 }
    /// Byte offset where the data header stops and the user data begins.
    pub fn data_offset(&self) -> u8 { self.0.int(74..80) as u8 }

    /// Trunking opcode of an alternate trunking packet.
    pub fn opcode(&self) -> u8 { self.0.int(58..64) as u8 }
    /// Two opcode-specific bytes of an alternate trunking packet.
    pub fn opcode_args(&self) -> [u8; 2] {
        [self.0.int(64..72) as u8, self.0.int(72..80) as u8]
    }

    /// Outcome of a response packet.
    pub fn response(&self) -> ResponseKind {
        ResponseKind::from_bits(self.0.int(8..10) as u8, self.0.int(10..13) as u8)
    }
    /// Response status, such as the sequence number being acknowledged.
    pub fn response_status(&self) -> u8 { self.0.int(13..16) as u8 }
    /// Unit that sent the packet being responded to.
    pub fn response_source(&self) -> u32 { self.0.int(56..80) as u32 }

    /// Raw header bits.
    pub fn bits(&self) -> &BitBuffer { &self.0 }
}

impl fmt::Display for PduHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LLID:{} {} {} BLOCKS:{}", self.logical_link(), self.sap(),
               if self.outbound() { "OUT" } else { "IN" }, self.blocks_to_follow())
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::coding::crc::Crc16;

    /// Build a header block from its 10 field bytes, appending a valid CRC.
    pub(crate) fn header(fields: [u8; 10]) -> BitBuffer {
        let crc = Crc16::new().feed_bytes(fields.iter().cloned()).finish() as u16;

        let mut bytes = [0; 12];
        bytes[..10].copy_from_slice(&fields);
        bytes[10] = (crc >> 8) as u8;
        bytes[11] = crc as u8;

        BitBuffer::from_bytes(&bytes)
    }

    #[test]
    fn test_confirmed() {
        let mut buf = header([
            0b01110110,
            0b11000100,
            0x12,
            0x34, 0x21, 0x34,
            0b10000011,
            0b00000011,
            0b01010010,
            0b00001011,
        ]);

        let (h, v) = PduHeader::decode(&mut buf, true);

        assert_eq!(v, Verdict::Passed);
        assert!(h.confirm());
        assert!(h.outbound());
        assert_eq!(h.format(), PacketFormat::Confirmed);
        assert_eq!(h.sap(), ServiceAccessPoint::PacketData);
        assert_eq!(h.mfg(), 0x12);
        assert_eq!(h.logical_link(), 0x342134);
        assert!(h.full_message());
        assert_eq!(h.blocks_to_follow(), 3);
        assert_eq!(h.pad_octets(), 3);
        assert!(!h.resync());
        assert_eq!(h.sequence(), 5);
        assert_eq!(h.fragment(), 2);
        assert_eq!(h.data_offset(), 11);
        assert_eq!(h.class().opcode, None);
        assert_eq!(h.to_string(), "LLID:3416372 PACKET DATA OUT BLOCKS:3");
    }

    #[test]
    fn test_trunking() {
        let mut buf = header([
            0b00110111,
            0b11111101,
            0x00,
            0x00, 0x00, 0x2A,
            0b10000001,
            0b00111100,
            0x12,
            0x70,
        ]);

        let (h, v) = PduHeader::decode(&mut buf, false);

        assert_eq!(v, Verdict::Passed);
        assert_eq!(h.format(), PacketFormat::Trunking);
        assert!(h.sap().is_trunking());
        assert_eq!(h.opcode(), 0x3C);
        assert_eq!(h.class().opcode, Some(0x3C));
        assert_eq!(h.opcode_args(), [0x12, 0x70]);
        assert_eq!(h.blocks_to_follow(), 1);
    }

    #[test]
    fn test_response() {
        let mut buf = header([
            0b00100011,
            0b00001101,
            0x00,
            0x00, 0x00, 0x07,
            0x80,
            0x00,
            0x00, 0x2A,
        ]);

        let (h, _) = PduHeader::decode(&mut buf, false);

        assert_eq!(h.format(), PacketFormat::Response);
        assert_eq!(h.response(), ResponseKind::Ack);
        assert_eq!(h.response_status(), 0b101);
        assert_eq!(h.response_source(), 0x2A);
    }

    #[test]
    fn test_corrupt() {
        let mut buf = header([0b01110110, 0b11000100, 0, 0, 0, 1, 0x81, 0, 0, 0]);
        buf.set(40, !buf.bit(40));

        let (h, v) = PduHeader::decode(&mut buf.clone(), false);
        assert_eq!(v, Verdict::Failed);
        assert_eq!(h.logical_link(), 1 | 1 << 7);

        let (h, v) = PduHeader::decode(&mut buf, true);
        assert_eq!(v, Verdict::Corrected);
        assert_eq!(h.logical_link(), 1);
        assert_eq!(buf.corrected(), 1);
    }
}
