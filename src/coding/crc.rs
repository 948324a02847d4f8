//! The 9, 16, and 32-bit CRCs P25 uses for block and packet checksums, with a
//! bit-flip search for short blocks.
//!
//! Checksums are computed by long division in a 64-bit word, which all three
//! generators fit into with a byte of headroom.
//!
//! Every checksum here is affine in the message bits: the remainder is linear and the
//! final inversion is a constant. The syndrome (computed XOR received checksum) of a
//! corrupted block is therefore the XOR of the syndromes of each flipped bit alone,
//! which lets the search test a single or double flip with one comparison.

use std::marker::PhantomData;
use std::ops::Range;

use tracing::debug;

use crate::buffer::BitBuffer;
use crate::coding::Verdict;

/// 9-bit CRC over a confirmed data block's serial number and payload.
pub type Crc9 = Crc<Crc9Params>;

/// 16-bit CRC-CCITT over header and trunking blocks.
pub type Crc16 = Crc<Crc16Params>;

/// 32-bit CRC over the user data of a packet.
pub type Crc32 = Crc<Crc32Params>;

/// Parameters of a CRC.
pub trait CrcParams {
    /// Generator polynomial, MSB first.
    fn gen() -> u64;

    /// Mask XORed into the final remainder.
    fn inv() -> u64;

    /// Number of checksum bits, which is also the degree of the generator.
    fn width() -> usize;
}

pub struct Crc9Params;

impl CrcParams for Crc9Params {
    fn gen() -> u64 { 0b10_0101_1001 }
    fn inv() -> u64 { 0x1FF }
    fn width() -> usize { 9 }
}

pub struct Crc16Params;

impl CrcParams for Crc16Params {
    fn gen() -> u64 { 0x1_1021 }
    fn inv() -> u64 { 0xFFFF }
    fn width() -> usize { 16 }
}

pub struct Crc32Params;

impl CrcParams for Crc32Params {
    fn gen() -> u64 { 0x1_04C1_1DB7 }
    fn inv() -> u64 { 0xFFFF_FFFF }
    fn width() -> usize { 32 }
}

/// Long-division CRC calculator.
pub struct Crc<P: CrcParams> {
    params: PhantomData<P>,
    /// Running remainder.
    word: u64,
}

impl<P: CrcParams> Default for Crc<P> {
    fn default() -> Self { Self::new() }
}

impl<P: CrcParams> Crc<P> {
    pub fn new() -> Crc<P> {
        Crc {
            params: PhantomData,
            word: 0,
        }
    }

    /// Feed in the `num` LSBs of the given value, MSB first.
    pub fn feed_bits(&mut self, bits: u8, num: usize) -> &mut Self {
        assert!(num <= 8);
        assert!((bits as u16) >> num == 0);

        self.word = self.word << num | bits as u64;
        self.div();
        self
    }

    /// Feed in the given bytes.
    pub fn feed_bytes<T: IntoIterator<Item = u8>>(&mut self, bytes: T) -> &mut Self {
        for byte in bytes {
            self.feed_bits(byte, 8);
        }

        self
    }

    /// Feed in the bits of the given buffer range.
    pub fn feed_range(&mut self, buf: &BitBuffer, range: Range<usize>) -> &mut Self {
        for idx in range {
            self.feed_bits(buf.bit(idx) as u8, 1);
        }

        self
    }

    /// Finish the calculation and return the checksum.
    pub fn finish(&mut self) -> u64 {
        self.remainder() ^ P::inv()
    }

    /// Finish the calculation without the final inversion.
    fn remainder(&mut self) -> u64 {
        for _ in 0..P::width() {
            self.word <<= 1;
            self.div();
        }

        self.word
    }

    fn div(&mut self) {
        let gen = degree(P::gen());

        while self.word != 0 && degree(self.word) >= gen {
            self.word ^= P::gen() << (degree(self.word) - gen);
        }
    }
}

/// Degree of the polynomial represented by x > 0.
fn degree(x: u64) -> u32 {
    63 - x.leading_zeros()
}

/// Check the checksum of `data` stored at `sum`.
pub fn check<P: CrcParams>(buf: &BitBuffer, data: Range<usize>, sum: Range<usize>) -> bool {
    syndrome::<P>(buf, data, sum) == 0
}

/// Check the checksum of `data` stored at `sum` and, if `search` is set and the check
/// fails, try every single and double bit flip over both ranges.
///
/// A flip that makes the check pass is applied to the buffer in place and counted as
/// corrected bits. The first matching single flip wins over any double flip.
pub fn correct<P: CrcParams>(buf: &mut BitBuffer, data: Range<usize>, sum: Range<usize>,
                             search: bool)
    -> Verdict
{
    assert_eq!(sum.len(), P::width());

    let syn = syndrome::<P>(buf, data.clone(), sum.clone());

    if syn == 0 {
        return Verdict::Passed;
    }

    if !search {
        return Verdict::Failed;
    }

    let (positions, effects) = flip_effects::<P>(data, sum);

    let found = effects.iter().position(|&e| e == syn).map(|i| vec![i]).or_else(|| {
        (0..effects.len()).find_map(|i| {
            (i + 1..effects.len())
                .find(|&j| effects[i] ^ effects[j] == syn)
                .map(|j| vec![i, j])
        })
    });

    match found {
        Some(flips) => {
            for &i in &flips {
                buf.flip(positions[i]);
            }

            debug!(bits = flips.len(), "crc-{} bit search corrected block", P::width());
            Verdict::Corrected
        },
        None => Verdict::Failed,
    }
}

/// Computed checksum XOR stored checksum.
fn syndrome<P: CrcParams>(buf: &BitBuffer, data: Range<usize>, sum: Range<usize>) -> u64 {
    Crc::<P>::new().feed_range(buf, data).finish() ^ buf.int(sum)
}

/// Buffer position of every searchable bit and the syndrome a flip of that bit alone
/// produces.
fn flip_effects<P: CrcParams>(data: Range<usize>, sum: Range<usize>)
    -> (Vec<usize>, Vec<u64>)
{
    let len = data.len();

    let data_effects = (0..len).map(|i| {
        let mut crc = Crc::<P>::new();

        // The unit message x^(len - 1 - i): a single one followed by zeros.
        crc.feed_bits(1, 1);

        for _ in 0..len - 1 - i {
            crc.feed_bits(0, 1);
        }

        crc.remainder()
    });

    let width = P::width();
    let sum_effects = (0..width).map(|i| 1 << (width - 1 - i));

    (data.chain(sum).collect(), data_effects.chain(sum_effects).collect())
}
