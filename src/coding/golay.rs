//! Encoding and decoding of the (24, 12, 8) extended and (18, 6, 8) shortened Golay
//! codes protecting terminator link control and voice header hexbits.

pub use cai_golay::extended;

use crate::bits::Hexbit;
use crate::buffer::BitBuffer;
use crate::coding::Tally;

/// Encoding and decoding of the (18, 6, 8) code, the extended code with its 6 leading
/// data bits fixed at zero.
pub mod shortened {
    use super::*;

    /// Encode the given 6 data bits to an 18-bit codeword.
    pub fn encode(data: u8) -> u32 {
        assert_eq!(data >> 6, 0);
        extended::encode(data as u16)
    }

    /// Try to decode the given 18-bit word, correcting up to 3 errors.
    ///
    /// Return `Some((data, err))` with the 6 data bits and the number of corrected bits,
    /// or `None` if the word is unrecoverable.
    pub fn decode(word: u32) -> Option<(u8, usize)> {
        assert_eq!(word >> 18, 0);

        match extended::decode(word) {
            Some((data, err)) if data >> 6 == 0 => Some((data as u8, err)),
            _ => None,
        }
    }

    /// Decode the 18-bit words starting at each of the given positions into one hexbit
    /// each, writing corrections back into the buffer.
    pub fn correct_words(buf: &mut BitBuffer, starts: &[usize], out: &mut [Hexbit])
        -> Tally
    {
        assert_eq!(starts.len(), out.len());

        starts.iter().zip(out.iter_mut()).fold(Tally::default(), |tally, (&start, hex)| {
            let word = buf.int(start..start + 18) as u32;

            let (data, tally) = correct(buf, start, 18, tally, decode(word).map(|(d, n)| {
                (d, n, encode(d))
            }), (word >> 12) as u8);

            *hex = Hexbit::new(data);
            tally
        })
    }
}

/// Decode the 24-bit extended words starting at each of the given positions into two
/// hexbits each, writing corrections back into the buffer.
pub fn correct_extended(buf: &mut BitBuffer, starts: &[usize], out: &mut [Hexbit])
    -> Tally
{
    assert_eq!(starts.len() * 2, out.len());

    starts.iter().zip(out.chunks_mut(2)).fold(Tally::default(), |tally, (&start, pair)| {
        let word = buf.int(start..start + 24) as u32;

        let (data, tally) = correct(buf, start, 24, tally, extended::decode(word).map(|(d, n)| {
            (d, n, extended::encode(d))
        }), (word >> 12) as u16);

        pair[0] = Hexbit::new((data >> 6) as u8 & 0x3F);
        pair[1] = Hexbit::new(data as u8 & 0x3F);
        tally
    })
}

/// Apply one word's decode result: load the re-encoded word on success or count a
/// failure and fall back to the received data bits.
fn correct<T>(buf: &mut BitBuffer, start: usize, width: usize, mut tally: Tally,
              decoded: Option<(T, usize, u32)>, received: T)
    -> (T, Tally)
{
    match decoded {
        Some((data, 0, _)) => (data, tally),
        Some((data, _, word)) => {
            tally.corrected += buf.load(start, width, word as u64);
            (data, tally)
        },
        None => {
            tally.failed += 1;
            (received, tally)
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shortened() {
        assert_eq!(shortened::encode(0), 0);
        assert_eq!(shortened::encode(0b111111), 0b111111_001100101110);
        assert_eq!(shortened::encode(0b000111), 0b000111_101101000010);

        let w = 0b101010;
        let e = shortened::encode(w);
        assert_eq!(e, 0b101010_001000110101);

        assert_eq!(shortened::decode(e), Some((w, 0)));
        assert_eq!(shortened::decode(e ^ 0b100000000000000001), Some((w, 2)));
        assert_eq!(shortened::decode(e ^ 0b000000001100000000), Some((w, 2)));
        assert_eq!(shortened::decode(e ^ 0b000111000000000000), Some((w, 3)));
        assert_eq!(shortened::decode(e ^ 0b001000000000000110), Some((w, 3)));
    }

    #[test]
    fn test_correct_words() {
        let mut buf = BitBuffer::new(36);
        buf.store(0, 18, shortened::encode(0b110011) as u64 ^ 0b101);
        buf.store(18, 18, shortened::encode(0b001100) as u64);

        let mut out = [Hexbit::default(); 2];
        let tally = shortened::correct_words(&mut buf, &[0, 18], &mut out);

        assert_eq!(tally.corrected, 2);
        assert_eq!(tally.failed, 0);
        assert_eq!(buf.corrected(), 2);
        assert_eq!(out, [Hexbit::new(0b110011), Hexbit::new(0b001100)]);
    }

    #[test]
    fn test_correct_extended() {
        let mut buf = BitBuffer::new(24);
        buf.store(0, 24, extended::encode(0b101010_010101) as u64 ^ 1 << 20);

        let mut out = [Hexbit::default(); 2];
        let tally = correct_extended(&mut buf, &[0], &mut out);

        assert_eq!(tally.corrected, 1);
        assert_eq!(out, [Hexbit::new(0b101010), Hexbit::new(0b010101)]);
    }
}
