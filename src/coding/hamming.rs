//! Encoding and decoding of the (10, 6, 3) shortened Hamming code protecting the
//! link control and encryption sync words of voice frames.
//!
//! The code corrects 1 error per word. With distance 3 a double error is either
//! detected (syndrome with no single-bit location) or miscorrected to a neighboring
//! codeword, never decoded back to the original data. The Reed-Solomon code layered
//! over the same bits resolves those words.
//!
//! Matrices are sourced from *Coding Theory and Cryptography: The Essentials*,
//! Hankerson, Hoffman, et al, 2000.

use binfield_matrix::{matrix_mul, matrix_mul_systematic};
use num::PrimInt;

use crate::bits::Hexbit;
use crate::buffer::BitBuffer;
use crate::coding::Tally;

/// Parity part of the generator, one row per parity bit.
const GEN: &[u8] = &[
    0b111001,
    0b110101,
    0b101110,
    0b011110,
];

/// Parity-check matrix `[Pᵀ | I]`.
const PAR: &[u16] = &[
    0b1110011000,
    0b1101010100,
    0b1011100010,
    0b0111100001,
];

/// Single-bit error pattern for each syndrome, or 0 where no single error produces
/// that syndrome.
const LOCATIONS: &[u16] = &[
    0,
    0b0000000001,
    0b0000000010,
    0b0000100000,
    0b0000000100,
    0,
    0,
    0b0001000000,
    0b0000001000,
    0,
    0,
    0b0010000000,
    0b0000010000,
    0b0100000000,
    0b1000000000,
    0,
];

/// Encode the given 6 data bits into a 10-bit codeword.
pub fn encode(data: u8) -> u16 {
    assert!(data >> 6 == 0);
    matrix_mul_systematic(data, GEN)
}

/// Try to decode the given 10-bit word, correcting up to 1 error.
///
/// Return `Some((data, err))` with the 6 data bits and the number of corrected bits, or
/// `None` if the error is detected but can't be located.
pub fn decode(word: u16) -> Option<(u8, usize)> {
    assert!(word >> 10 == 0);
    syndrome_decode(word, PAR, LOCATIONS).map(|(w, n)| ((w >> 4) as u8, n))
}

fn syndrome_decode<T: PrimInt>(word: T, par: &[T], locs: &[T]) -> Option<(T, usize)> {
    let s: usize = matrix_mul(word, par);

    match locs.get(s) {
        _ if s == 0 => Some((word, 0)),
        Some(&loc) if loc != T::zero() => Some((word ^ loc, 1)),
        _ => None,
    }
}

/// Decode the 10-bit words starting at each of the given positions, writing corrected
/// bits back into the buffer and each word's data bits into `out`.
///
/// Undecodable words are left as received and their leading 6 bits are passed through.
pub fn correct_words(buf: &mut BitBuffer, starts: &[usize], out: &mut [Hexbit]) -> Tally {
    assert_eq!(starts.len(), out.len());

    starts.iter().zip(out.iter_mut()).fold(Tally::default(), |mut tally, (&start, hex)| {
        let word = buf.int(start..start + 10) as u16;

        match decode(word) {
            Some((data, 0)) => *hex = Hexbit::new(data),
            Some((data, _)) => {
                tally.corrected += buf.load(start, 10, encode(data) as u64);
                *hex = Hexbit::new(data);
            },
            None => {
                tally.failed += 1;
                *hex = Hexbit::new((word >> 4) as u8);
            },
        }

        tally
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode(0), 0);
        assert_eq!(encode(0b100000), 0b100000_1110);
        assert_eq!(encode(0b000001), 0b000001_1100);
        assert_eq!(encode(0b111111), 0b111111_0000);
    }

    #[test]
    fn test_decode() {
        let w = 0b101010;
        let e = encode(w);

        assert_eq!(decode(e), Some((w, 0)));

        for bit in 0..10 {
            assert_eq!(decode(e ^ 1 << bit), Some((w, 1)));
        }
    }

    #[test]
    fn test_correct_words() {
        let mut buf = BitBuffer::new(40);
        buf.store(0, 10, encode(0b000111) as u64);
        buf.store(10, 10, encode(0b111000) as u64 ^ 0b0000100000);
        buf.store(20, 10, encode(0b110011) as u64 ^ 0b0000000101);

        let mut out = [Hexbit::default(); 3];
        let tally = correct_words(&mut buf, &[0, 10, 20], &mut out);

        assert_eq!(tally.corrected, 1);
        assert_eq!(tally.failed, 1);
        assert_eq!(buf.corrected(), 1);
        assert_eq!(out[0].bits(), 0b000111);
        assert_eq!(out[1].bits(), 0b111000);
        assert_eq!(buf.int(10..20) as u16, encode(0b111000));
    }

    proptest! {
        #[test]
        fn prop_single_error(data in 0u8..64, bit in 0usize..10) {
            prop_assert_eq!(decode(encode(data) ^ 1 << bit), Some((data, 1)));
        }

        #[test]
        fn prop_double_error(data in 0u8..64, a in 0usize..10, b in 0usize..10) {
            prop_assume!(a != b);

            match decode(encode(data) ^ 1 << a ^ 1 << b) {
                Some((d, _)) => prop_assert_ne!(d, data),
                None => {},
            }
        }
    }
}
