//! Decoding of voice-related data units.

pub mod control;
pub mod crypto;
pub mod frame;
pub mod header;
pub mod term;

use crate::bits::Hexbit;
use crate::buffer::BitBuffer;

/// Write Reed-Solomon corrected data hexbits back over the coded words they were
/// read from, counting every changed bit as corrected.
fn store_hexbits(buf: &mut BitBuffer, starts: &[usize], hexbits: &[Hexbit]) -> usize {
    starts.iter().zip(hexbits.iter()).map(|(&start, h)| {
        buf.load(start, 6, h.bits() as u64)
    }).sum()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_store_hexbits() {
        let mut buf = BitBuffer::new(20);

        let n = store_hexbits(&mut buf, &[0, 10], &[Hexbit::new(0b100001),
                                                    Hexbit::new(0b000011)]);

        assert_eq!(n, 4);
        assert_eq!(buf.int(0..6), 0b100001);
        assert_eq!(buf.int(10..16), 0b000011);
        assert_eq!(buf.corrected(), 4);
    }
}
