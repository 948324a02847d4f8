//! Fixed-length bit buffers addressed by explicit bit positions.
//!
//! Most P25 fields are not byte aligned and many are spread over several
//! non-contiguous positions (every coded word carries a few data bits followed by
//! parity), so fields are described by lists of absolute bit indices, packed MSB
//! first.

use std::fmt;
use std::ops::Range;

/// Fixed-length sequence of bits plus a count of bits corrected in place.
///
/// The length is fixed at construction. The correction count is cumulative across
/// every correction pass applied to the buffer and never decreases.
#[derive(Clone, PartialEq, Eq)]
pub struct BitBuffer {
    /// Packed bits, MSB first. Bits past `len` are always zero.
    bytes: Vec<u8>,
    /// Number of bits in the buffer.
    len: usize,
    /// Number of bits flipped by error correction.
    corrected: usize,
}

impl BitBuffer {
    /// Construct a new all-zero `BitBuffer` with the given number of bits.
    pub fn new(len: usize) -> BitBuffer {
        BitBuffer {
            bytes: vec![0; (len + 7) / 8],
            len,
            corrected: 0,
        }
    }

    /// Construct a `BitBuffer` holding every bit of the given bytes.
    pub fn from_bytes(bytes: &[u8]) -> BitBuffer {
        BitBuffer {
            bytes: bytes.to_vec(),
            len: bytes.len() * 8,
            corrected: 0,
        }
    }

    /// Construct a `BitBuffer` from the given bits, first bit first.
    pub fn from_bits<T: IntoIterator<Item = bool>>(bits: T) -> BitBuffer {
        let mut buf = BitBuffer::new(0);

        for bit in bits {
            if buf.len % 8 == 0 {
                buf.bytes.push(0);
            }

            buf.len += 1;
            buf.set(buf.len - 1, bit);
        }

        buf
    }

    /// Number of bits in the buffer.
    pub fn len(&self) -> usize { self.len }

    /// Whether the buffer holds no bits.
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Number of bits corrected so far.
    pub fn corrected(&self) -> usize { self.corrected }

    /// Retrieve the bit at the given index. Panic if the index is past the end.
    pub fn bit(&self, idx: usize) -> bool {
        self.check(idx);
        self.bytes[idx / 8] >> (7 - idx % 8) & 1 == 1
    }

    /// Overwrite the bit at the given index without counting it as a correction.
    ///
    /// This is for building frames; corrections go through `flip` or `load`.
    pub fn set(&mut self, idx: usize, bit: bool) {
        self.check(idx);

        let mask = 1 << (7 - idx % 8);

        if bit {
            self.bytes[idx / 8] |= mask;
        } else {
            self.bytes[idx / 8] &= !mask;
        }
    }

    /// Invert the bit at the given index and count it as a corrected bit.
    pub fn flip(&mut self, idx: usize) {
        self.check(idx);
        self.bytes[idx / 8] ^= 1 << (7 - idx % 8);
        self.corrected += 1;
    }

    /// Pack the bits at the given positions MSB first.
    pub fn get(&self, indices: &[usize]) -> u64 {
        assert!(indices.len() <= 64);
        indices.iter().fold(0, |word, &idx| word << 1 | self.bit(idx) as u64)
    }

    /// Pack the contiguous bits in the given range MSB first.
    pub fn int(&self, range: Range<usize>) -> u64 {
        assert!(range.len() <= 64);
        range.fold(0, |word, idx| word << 1 | self.bit(idx) as u64)
    }

    /// Format the bits at the given positions as an uppercase hex string of exactly
    /// `nibbles` digits.
    pub fn hex(&self, indices: &[usize], nibbles: usize) -> String {
        format!("{:01$X}", self.get(indices), nibbles)
    }

    /// Format the contiguous bits in the given range as an uppercase hex string of
    /// exactly `nibbles` digits.
    pub fn hex_range(&self, range: Range<usize>, nibbles: usize) -> String {
        format!("{:01$X}", self.int(range), nibbles)
    }

    /// Write the `width` LSBs of `value` starting at the given index, flipping every
    /// bit that differs and counting each flip as a correction.
    ///
    /// Return the number of flipped bits.
    pub fn load(&mut self, start: usize, width: usize, value: u64) -> usize {
        assert!(width <= 64);

        (0..width).filter(|&i| {
            let bit = value >> (width - 1 - i) & 1 == 1;

            if self.bit(start + i) != bit {
                self.flip(start + i);
                true
            } else {
                false
            }
        }).count()
    }

    /// Write the `width` LSBs of `value` starting at the given index without counting
    /// corrections.
    pub fn store(&mut self, start: usize, width: usize, value: u64) {
        assert!(width <= 64);

        for i in 0..width {
            self.set(start + i, value >> (width - 1 - i) & 1 == 1);
        }
    }

    /// Copy the bits in the given range into a new buffer with its own, initially
    /// zero, correction count.
    pub fn sub_range(&self, range: Range<usize>) -> BitBuffer {
        assert!(range.end <= self.len, "range {:?} past end {}", range, self.len);
        BitBuffer::from_bits(range.map(|idx| self.bit(idx)))
    }

    /// Borrow a read-only view of the bits in the given range.
    pub fn view(&self, range: Range<usize>) -> BitView<'_> {
        assert!(range.start <= range.end && range.end <= self.len,
                "range {:?} past end {}", range, self.len);

        BitView {
            buf: self,
            start: range.start,
            len: range.len(),
        }
    }

    /// Pack the bits of the given byte-multiple range into bytes.
    pub fn bytes(&self, range: Range<usize>) -> Vec<u8> {
        assert!(range.len() % 8 == 0);

        range.step_by(8).map(|start| self.int(start..start + 8) as u8).collect()
    }

    fn check(&self, idx: usize) {
        assert!(idx < self.len, "bit {} past end {}", idx, self.len);
    }
}

impl fmt::Debug for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "BitBuffer({} bits, {} corrected, ", self.len, self.corrected)?;

        for b in &self.bytes {
            write!(f, "{:02X}", b)?;
        }

        write!(f, ")")
    }
}

/// Read-only window into a `BitBuffer`, addressed relative to the window start.
#[derive(Copy, Clone)]
pub struct BitView<'a> {
    buf: &'a BitBuffer,
    start: usize,
    len: usize,
}

impl<'a> BitView<'a> {
    /// Number of bits in the view.
    pub fn len(&self) -> usize { self.len }

    /// Whether the view holds no bits.
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Retrieve the bit at the given view-relative index.
    pub fn bit(&self, idx: usize) -> bool {
        assert!(idx < self.len, "bit {} past end of view {}", idx, self.len);
        self.buf.bit(self.start + idx)
    }

    /// Pack the view-relative bits at the given positions MSB first.
    pub fn get(&self, indices: &[usize]) -> u64 {
        assert!(indices.len() <= 64);
        indices.iter().fold(0, |word, &idx| word << 1 | self.bit(idx) as u64)
    }

    /// Pack the contiguous view-relative bits in the given range MSB first.
    pub fn int(&self, range: Range<usize>) -> u64 {
        assert!(range.end <= self.len);
        self.buf.int(self.start + range.start..self.start + range.end)
    }

    /// Pack the whole view into bytes. The view must be a multiple of 8 bits.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.bytes(self.start..self.start + self.len)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get() {
        let b = BitBuffer::from_bytes(&[0b10110000, 0b00001111]);

        assert_eq!(b.len(), 16);
        assert_eq!(b.get(&[0, 1, 2, 3]), 0b1011);
        assert_eq!(b.get(&[0, 15]), 0b11);
        assert_eq!(b.get(&[14, 2, 1]), 0b110);
        assert_eq!(b.int(4..12), 0);
        assert_eq!(b.int(0..16), 0b10110000_00001111);
        assert_eq!(b.hex(&[12, 13, 14, 15], 1), "F");
        assert_eq!(b.hex_range(0..16, 6), "00B00F");
    }

    #[test]
    #[should_panic]
    fn test_past_end() {
        BitBuffer::new(12).bit(12);
    }

    #[test]
    fn test_flip_counts() {
        let mut b = BitBuffer::new(10);

        b.set(3, true);
        assert_eq!(b.corrected(), 0);

        b.flip(3);
        b.flip(9);
        assert!(!b.bit(3));
        assert!(b.bit(9));
        assert_eq!(b.corrected(), 2);

        assert_eq!(b.load(0, 4, 0b0110), 2);
        assert_eq!(b.int(0..4), 0b0110);
        assert_eq!(b.corrected(), 4);

        assert_eq!(b.load(0, 4, 0b0110), 0);
        assert_eq!(b.corrected(), 4);
    }

    #[test]
    fn test_sub_range() {
        let mut b = BitBuffer::from_bytes(&[0xDE, 0xAD, 0xBE, 0xEF]);
        b.flip(0);

        let mut s = b.sub_range(8..24);
        assert_eq!(s.len(), 16);
        assert_eq!(s.int(0..16), 0xADBE);
        assert_eq!(s.corrected(), 0);

        s.flip(0);
        assert_eq!(s.corrected(), 1);
        assert_eq!(b.corrected(), 1);
        assert_eq!(b.int(8..16), 0xAD);
    }

    #[test]
    fn test_view() {
        let b = BitBuffer::from_bytes(&[0x12, 0x34, 0x56]);
        let v = b.view(4..20);

        assert_eq!(v.len(), 16);
        assert_eq!(v.int(0..16), 0x2345);
        assert_eq!(v.get(&[0, 1, 2, 3]), 0x2);
        assert_eq!(v.to_bytes(), vec![0x23, 0x45]);
    }

    #[test]
    fn test_from_bits() {
        let b = BitBuffer::from_bits([true, false, true, true, false, false, false, true,
                                      true]);
        assert_eq!(b.len(), 9);
        assert_eq!(b.int(0..9), 0b101100011);
        assert_eq!(b.bytes(0..8), vec![0b10110001]);
    }
}
