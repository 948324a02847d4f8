//! Data blocks that follow a packet header.

use crate::buffer::BitBuffer;
use crate::coding::crc::{Crc, Crc9Params};
use crate::coding::Verdict;
use crate::data::fields::PacketFormat;

/// Number of bits in a confirmed data block.
pub const CONFIRMED_BLOCK_BITS: usize = 144;
/// Number of bits in an unconfirmed or trunking data block.
pub const UNCONFIRMED_BLOCK_BITS: usize = 96;

/// One data block of a packet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DataBlock {
    /// 7-bit serial number, carried only by confirmed blocks.
    serial: Option<u8>,
    data: Vec<u8>,
    verdict: Verdict,
}

impl DataBlock {
    /// Extract a block of the given packet format from the given bits.
    pub fn decode(format: PacketFormat, buf: &BitBuffer) -> DataBlock {
        match format {
            PacketFormat::Confirmed => Self::confirmed(buf),
            _ => Self::unconfirmed(buf),
        }
    }

    /// Extract a confirmed block, checking its CRC-9 over the serial number and data.
    pub fn confirmed(buf: &BitBuffer) -> DataBlock {
        assert_eq!(buf.len(), CONFIRMED_BLOCK_BITS);

        let serial = buf.int(0..7) as u8;
        let sum = buf.int(7..16);
        let data = buf.bytes(16..CONFIRMED_BLOCK_BITS);

        let calc = Crc::<Crc9Params>::new()
            .feed_bits(serial, 7)
            .feed_bytes(data.iter().cloned())
            .finish();

        DataBlock {
            serial: Some(serial),
            data,
            verdict: if calc == sum { Verdict::Passed } else { Verdict::Failed },
        }
    }

    /// Extract an unconfirmed block, which has no per-block check.
    pub fn unconfirmed(buf: &BitBuffer) -> DataBlock {
        assert_eq!(buf.len(), UNCONFIRMED_BLOCK_BITS);

        DataBlock {
            serial: None,
            data: buf.bytes(0..UNCONFIRMED_BLOCK_BITS),
            verdict: Verdict::Passed,
        }
    }

    pub fn serial(&self) -> Option<u8> { self.serial }
    /// Data bytes, 16 for confirmed blocks and 12 otherwise.
    pub fn data(&self) -> &[u8] { &self.data }
    pub fn verdict(&self) -> Verdict { self.verdict }
    pub fn is_valid(&self) -> bool { !self.verdict.is_failed() }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// Build a confirmed block with a valid CRC-9.
    pub(crate) fn confirmed(serial: u8, data: [u8; 16]) -> BitBuffer {
        let crc = Crc::<Crc9Params>::new()
            .feed_bits(serial, 7)
            .feed_bytes(data.iter().cloned())
            .finish();

        let mut buf = BitBuffer::new(CONFIRMED_BLOCK_BITS);
        buf.store(0, 7, serial as u64);
        buf.store(7, 9, crc);

        for (i, &b) in data.iter().enumerate() {
            buf.store(16 + 8 * i, 8, b as u64);
        }

        buf
    }

    #[test]
    fn test_confirmed() {
        let data = [0xA5; 16];
        let buf = confirmed(3, data);

        let b = DataBlock::decode(PacketFormat::Confirmed, &buf);
        assert_eq!(b.serial(), Some(3));
        assert_eq!(b.data(), &data);
        assert!(b.is_valid());

        let mut bad = buf.clone();
        bad.set(100, !bad.bit(100));

        let b = DataBlock::confirmed(&bad);
        assert_eq!(b.verdict(), Verdict::Failed);
        assert_eq!(bad.corrected(), 0);
    }

    #[test]
    fn test_unconfirmed() {
        let bytes = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let b = DataBlock::decode(PacketFormat::Unconfirmed,
                                  &BitBuffer::from_bytes(&bytes));

        assert_eq!(b.serial(), None);
        assert_eq!(b.data(), &bytes);
        assert_eq!(b.verdict(), Verdict::Passed);
    }

    #[test]
    #[should_panic]
    fn test_length() {
        DataBlock::confirmed(&BitBuffer::new(96));
    }
}
