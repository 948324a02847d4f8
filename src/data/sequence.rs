//! Reassembly of a packet from its header block and the data blocks that follow.
//!
//! Blocks are handed over in transmission order, each already checked on its own. A
//! block that never arrived, or arrived with a failed CRC, is treated as absent:
//! fields read from it come back as `None` while fields from the header and the other
//! blocks stay available.

use std::sync::OnceLock;

use tracing::debug;

use crate::buffer::BitBuffer;
use crate::coding::crc::{Crc, Crc32Params};
use crate::coding::{Checks, Stage, Verdict};
use crate::data::block::DataBlock;
use crate::data::header::{PduHeader, HEADER_BITS};
use crate::data::fields::PacketFormat;
use crate::error::{DecodeError, Result};
use crate::util::slice_u32;

/// Number of trailing bytes in the last block that hold the packet CRC.
const PACKET_CRC_BYTES: usize = 4;

/// How the serial numbers of confirmed blocks relate to their positions.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BlockOrder {
    /// Every serial number matches its block position.
    InOrder,
    /// No block carries a serial number.
    Unnumbered,
    /// Some serial number doesn't match its position.
    OutOfOrder,
    /// Some serial number appears twice.
    Duplicate,
}

impl BlockOrder {
    fn scan<'a, T: Iterator<Item = (usize, &'a DataBlock)>>(blocks: T) -> BlockOrder {
        let mut seen = [false; 128];
        let mut numbered = false;
        let mut order = BlockOrder::InOrder;

        for (idx, block) in blocks {
            let serial = match block.serial() {
                Some(s) => s as usize,
                None => continue,
            };

            numbered = true;

            if seen[serial] {
                return BlockOrder::Duplicate;
            }

            seen[serial] = true;

            if serial != idx & 0x7F {
                order = BlockOrder::OutOfOrder;
            }
        }

        if numbered { order } else { BlockOrder::Unnumbered }
    }
}

/// Header plus data blocks of one packet.
#[derive(Debug)]
pub struct PduSequence {
    header: PduHeader,
    /// CRC verdict of the header block.
    header_verdict: Verdict,
    /// One entry per block the header announces.
    blocks: Vec<Option<DataBlock>>,
    order: BlockOrder,
    /// Bits corrected across the header and data blocks.
    corrected: usize,
    user_data: OnceLock<Option<Vec<u8>>>,
}

impl PduSequence {
    /// Assemble a sequence from an already decoded header and its blocks. Blocks past
    /// the count announced by the header are dropped and missing ones are left
    /// absent.
    pub fn new(header: PduHeader, header_verdict: Verdict, mut blocks: Vec<Option<DataBlock>>,
               corrected: usize) -> PduSequence
    {
        let expected = header.blocks_to_follow();

        if blocks.len() > expected {
            debug!(expected, received = blocks.len(), "dropping extra packet blocks");
        }

        blocks.resize(expected, None);

        let order = BlockOrder::scan(blocks.iter().enumerate()
            .filter_map(|(i, b)| b.as_ref().map(|b| (i, b))));

        PduSequence {
            header,
            header_verdict,
            blocks,
            order,
            corrected,
            user_data: OnceLock::new(),
        }
    }

    /// Check the given header block, correcting it in place when `search` is set, then
    /// extract each received data block in the format the header announces.
    pub fn decode(bits: &mut BitBuffer, blocks: &[Option<BitBuffer>], search: bool)
        -> Result<PduSequence>
    {
        if bits.len() != HEADER_BITS {
            return Err(DecodeError::ShortFrame {
                kind: "PDU header",
                expected: HEADER_BITS,
                found: bits.len(),
            });
        }

        let (header, verdict) = PduHeader::decode(bits, search);
        let format = header.format();
        let mut corrected = bits.corrected();

        let blocks = blocks.iter().enumerate().map(|(index, b)| {
            let b = match b {
                Some(b) => b,
                None => return Ok(None),
            };

            if b.len() != format.block_bits() {
                return Err(DecodeError::BlockLength {
                    index,
                    expected: format.block_bits(),
                    found: b.len(),
                });
            }

            corrected += b.corrected();
            Ok(Some(DataBlock::decode(format, b)))
        }).collect::<Result<Vec<_>>>()?;

        Ok(PduSequence::new(header, verdict, blocks, corrected))
    }

    pub fn header(&self) -> &PduHeader { &self.header }
    pub fn header_verdict(&self) -> Verdict { self.header_verdict }

    /// Number of data blocks announced by the header.
    pub fn expected_blocks(&self) -> usize { self.blocks.len() }

    /// Number of data blocks received, valid or not.
    pub fn received_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }

    /// Whether the block at the given position was received with a passing check.
    pub fn has_data_block(&self, idx: usize) -> bool {
        self.data_block(idx).is_some()
    }

    /// Block at the given position, if it was received with a passing check.
    pub fn data_block(&self, idx: usize) -> Option<&DataBlock> {
        self.blocks.get(idx)
            .and_then(|b| b.as_ref())
            .filter(|b| b.is_valid())
    }

    /// Whether every announced block was received with a passing check.
    pub fn is_complete(&self) -> bool {
        (0..self.blocks.len()).all(|i| self.has_data_block(i))
    }

    pub fn block_order(&self) -> BlockOrder { self.order }

    pub fn corrected_bits(&self) -> usize { self.corrected }

    /// Data bytes of every block, including pad and packet CRC, if complete.
    fn payload(&self) -> Option<Vec<u8>> {
        if !self.is_complete() {
            return None;
        }

        Some(self.blocks.iter()
            .flatten()
            .flat_map(|b| b.data().iter().cloned())
            .collect())
    }

    /// Result of checking the packet CRC carried in the last block, or `None` if the
    /// packet has no data blocks.
    pub fn packet_crc(&self) -> Option<Verdict> {
        if self.blocks.is_empty() {
            return None;
        }

        let payload = match self.payload() {
            Some(p) if p.len() >= PACKET_CRC_BYTES => p,
            _ => return Some(Verdict::Failed),
        };

        let (data, sum) = payload.split_at(payload.len() - PACKET_CRC_BYTES);
        let calc = Crc::<Crc32Params>::new().feed_bytes(data.iter().cloned()).finish();

        Some(if calc == slice_u32(sum) as u64 {
            Verdict::Passed
        } else {
            Verdict::Failed
        })
    }

    /// User data with the pad bytes and packet CRC removed, if every block arrived.
    pub fn user_data(&self) -> Option<&[u8]> {
        self.user_data.get_or_init(|| {
            let mut data = self.payload()?;
            let end = data.len().checked_sub(PACKET_CRC_BYTES + self.header.pad_octets())?;

            data.truncate(end);
            Some(data)
        }).as_deref()
    }

    /// Record the verdict of every check applied to the packet.
    pub fn push_checks(&self, checks: &mut Checks) {
        checks.push(Stage::Crc16, self.header_verdict);

        if self.header.format() == PacketFormat::Confirmed {
            let failed = self.blocks.iter().flatten().any(|b| !b.is_valid());
            checks.push(Stage::Crc9, if failed { Verdict::Failed } else { Verdict::Passed });
        }

        if let Some(v) = self.packet_crc() {
            checks.push(Stage::Crc32, v);
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::coding::crc::Crc32;
    use crate::coding::StagePolicy;
    use crate::data::block::test::confirmed;
    use crate::data::header::test::header;

    /// Unconfirmed blocks holding the given user data, padded out and followed by the
    /// packet CRC. Returns the blocks and the pad count.
    pub(crate) fn unconfirmed(user: &[u8]) -> (Vec<BitBuffer>, usize) {
        let blocks = (user.len() + PACKET_CRC_BYTES).div_ceil(12);
        let pad = blocks * 12 - PACKET_CRC_BYTES - user.len();

        let mut data = user.to_vec();
        data.resize(user.len() + pad, 0);

        let crc = Crc32::new().feed_bytes(data.iter().cloned()).finish() as u32;
        data.extend_from_slice(&crc.to_be_bytes());

        (data.chunks(12).map(BitBuffer::from_bytes).collect(), pad)
    }

    fn unconfirmed_header(blocks: usize, pad: usize) -> BitBuffer {
        header([
            0b00110101,
            0b11000100,
            0x00,
            0x00, 0x00, 0x2A,
            0x80 | blocks as u8,
            pad as u8,
            0x00,
            0x00,
        ])
    }

    #[test]
    fn test_unconfirmed() {
        let user = b"HELLO, WORLD! P25";
        let (blocks, pad) = unconfirmed(user);
        assert_eq!(blocks.len(), 2);
        assert_eq!(pad, 3);

        let mut h = unconfirmed_header(blocks.len(), pad);
        let blocks: Vec<_> = blocks.into_iter().map(Some).collect();

        let seq = PduSequence::decode(&mut h, &blocks, true).expect("sequence");

        assert!(seq.is_complete());
        assert_eq!(seq.block_order(), BlockOrder::Unnumbered);
        assert_eq!(seq.packet_crc(), Some(Verdict::Passed));
        assert_eq!(seq.user_data(), Some(&user[..]));
        assert_eq!(seq.corrected_bits(), 0);

        let mut checks = Checks::new(StagePolicy::PACKET);
        seq.push_checks(&mut checks);
        assert_eq!(checks.stages(), &[(Stage::Crc16, Verdict::Passed),
                                      (Stage::Crc32, Verdict::Passed)]);
        assert!(checks.is_valid());
    }

    #[test]
    fn test_missing_block() {
        let (blocks, pad) = unconfirmed(b"HELLO, WORLD! P25");
        let mut h = unconfirmed_header(blocks.len(), pad);

        let seq = PduSequence::decode(&mut h, &[Some(blocks[0].clone()), None], false)
            .expect("sequence");

        assert!(seq.has_data_block(0));
        assert!(!seq.has_data_block(1));
        assert!(!seq.has_data_block(2));
        assert!(!seq.is_complete());
        assert_eq!(seq.received_blocks(), 1);
        assert_eq!(seq.user_data(), None);
        assert_eq!(seq.packet_crc(), Some(Verdict::Failed));
        assert_eq!(seq.header().logical_link(), 42);

        // The packet CRC is advisory.
        let mut checks = Checks::new(StagePolicy::PACKET);
        seq.push_checks(&mut checks);
        assert!(checks.is_valid());
    }

    #[test]
    fn test_padding() {
        let (blocks, _) = unconfirmed(b"HI");
        let mut h = unconfirmed_header(1, 0);

        // Too few blocks given.
        let seq = PduSequence::decode(&mut h.clone(), &[], false).expect("sequence");
        assert_eq!(seq.expected_blocks(), 1);
        assert!(!seq.is_complete());

        // Extra blocks are dropped.
        let extra = vec![Some(blocks[0].clone()), Some(blocks[0].clone())];
        let seq = PduSequence::decode(&mut h, &extra, false).expect("sequence");
        assert_eq!(seq.expected_blocks(), 1);
        assert_eq!(seq.received_blocks(), 1);
    }

    #[test]
    fn test_block_length() {
        let mut h = unconfirmed_header(1, 0);
        let err = PduSequence::decode(&mut h, &[Some(BitBuffer::new(144))], false);

        assert_eq!(err.unwrap_err(), DecodeError::BlockLength {
            index: 0,
            expected: 96,
            found: 144,
        });

        let err = PduSequence::decode(&mut BitBuffer::new(80), &[], false);
        assert!(matches!(err, Err(DecodeError::ShortFrame { .. })));
    }

    fn confirmed_header(blocks: usize) -> BitBuffer {
        header([
            0b01110110,
            0b11000100,
            0x00,
            0x00, 0x00, 0x07,
            0x80 | blocks as u8,
            0x00,
            0x00,
            0x00,
        ])
    }

    #[test]
    fn test_confirmed_order() {
        let mut h = confirmed_header(3);
        let blocks = vec![
            Some(confirmed(0, [1; 16])),
            Some(confirmed(2, [2; 16])),
            Some(confirmed(1, [3; 16])),
        ];

        let seq = PduSequence::decode(&mut h, &blocks, false).expect("sequence");
        assert_eq!(seq.block_order(), BlockOrder::OutOfOrder);
        assert_eq!(seq.data_block(1).map(|b| b.data()[0]), Some(2));

        let mut h = confirmed_header(2);
        let blocks = vec![Some(confirmed(0, [1; 16])), Some(confirmed(0, [2; 16]))];

        let seq = PduSequence::decode(&mut h, &blocks, false).expect("sequence");
        assert_eq!(seq.block_order(), BlockOrder::Duplicate);

        let mut h = confirmed_header(2);
        let blocks = vec![Some(confirmed(0, [1; 16])), Some(confirmed(1, [2; 16]))];

        let seq = PduSequence::decode(&mut h, &blocks, false).expect("sequence");
        assert_eq!(seq.block_order(), BlockOrder::InOrder);
    }

    #[test]
    fn test_confirmed_failed_block() {
        let mut bad = confirmed(1, [9; 16]);
        bad.set(50, !bad.bit(50));

        let mut h = confirmed_header(2);
        let blocks = vec![Some(confirmed(0, [1; 16])), Some(bad)];

        let seq = PduSequence::decode(&mut h, &blocks, false).expect("sequence");

        assert!(seq.has_data_block(0));
        assert!(!seq.has_data_block(1));
        assert_eq!(seq.received_blocks(), 2);

        let mut checks = Checks::new(StagePolicy::PACKET);
        seq.push_checks(&mut checks);
        assert_eq!(checks.verdict(Stage::Crc9), Some(Verdict::Failed));
        assert!(!checks.is_valid());
    }

    #[test]
    fn test_header_correction_counted() {
        let mut h = unconfirmed_header(0, 0);
        h.set(30, !h.bit(30));

        let seq = PduSequence::decode(&mut h, &[], true).expect("sequence");

        assert_eq!(seq.header_verdict(), Verdict::Corrected);
        assert_eq!(seq.corrected_bits(), 1);
        assert_eq!(seq.packet_crc(), None);
        assert!(seq.is_complete());
    }
}
