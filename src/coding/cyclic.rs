//! Encoding and decoding of the (16, 8, 5) shortened cyclic code protecting low-speed
//! data bytes.
//!
//! The code is shortened from a (17, 8, 5) code ("Standard APCO25 Physical Layer of the
//! Radio Transmission Chain", Simon, 2014.)

use crate::buffer::BitBuffer;
use crate::coding::Tally;

/// Encode the given 8 data bits into a 16-bit codeword.
pub fn encode(data: u8) -> u16 {
    cai_cyclic::encode(data as u16) as u16
}

/// Try to decode the given 16-bit word, correcting up to 2 errors.
///
/// Return `Some((data, err))` with the 8 data bits and the number of corrected bits, or
/// `None` if the word is unrecoverable.
pub fn decode(word: u16) -> Option<(u8, usize)> {
    match cai_cyclic::decode(word as u32) {
        Some((data, err)) if data >> 8 == 0 => Some((data as u8, err)),
        _ => None,
    }
}

/// Decode the 16-bit words starting at each of the given positions into `out`,
/// writing corrections back into the buffer.
pub fn correct_words(buf: &mut BitBuffer, starts: &[usize], out: &mut [u8]) -> Tally {
    assert_eq!(starts.len(), out.len());

    let mut tally = Tally::default();

    for (&start, byte) in starts.iter().zip(out.iter_mut()) {
        let word = buf.int(start..start + 16) as u16;

        *byte = match decode(word) {
            Some((data, 0)) => data,
            Some((data, _)) => {
                tally.corrected += buf.load(start, 16, encode(data) as u64);
                data
            },
            None => {
                tally.failed += 1;
                (word >> 8) as u8
            },
        };
    }

    tally
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_decode() {
        let w = 0b10101011;
        let e = encode(w);
        assert_eq!(e, 0b10101011_01111011);

        assert_eq!(decode(e), Some((w, 0)));
        assert_eq!(decode(e ^ 0b1000000000000001), Some((w, 2)));
        assert_eq!(decode(e ^ 0b0001000000000000), Some((w, 1)));
        assert_eq!(decode(e ^ 0b0000000011000000), Some((w, 2)));
        assert_eq!(decode(e ^ 0b0000010000000001), Some((w, 2)));

        for w in 0..=u8::MAX {
            assert_eq!(decode(encode(w)), Some((w, 0)));
        }
    }

    #[test]
    fn test_correct_words() {
        let mut buf = BitBuffer::new(32);
        buf.store(0, 16, encode(0x5A) as u64 ^ 0b1000);
        buf.store(16, 16, encode(0xC3) as u64);

        let mut out = [0; 2];
        let tally = correct_words(&mut buf, &[0, 16], &mut out);

        assert_eq!(out, [0x5A, 0xC3]);
        assert_eq!(tally.corrected, 1);
        assert_eq!(buf.corrected(), 1);
    }
}
