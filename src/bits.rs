//! Sub-byte symbols.

use crate::buffer::BitBuffer;

/// Six bits, the symbol size of the Reed-Solomon codes.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct Hexbit(u8);

impl Hexbit {
    /// Construct a new `Hexbit` with the six given bits in the LSB position.
    pub fn new(bits: u8) -> Hexbit {
        assert!(bits >> 6 == 0);
        Hexbit(bits)
    }

    /// Get the wrapped hexbit, which is guaranteed to have only 6 LSBs.
    pub fn bits(&self) -> u8 { self.0 }
}

/// Read the hexbit whose 6 bits start at each of the given offsets.
pub fn read_hexbits(buf: &BitBuffer, starts: &[usize], out: &mut [Hexbit]) {
    assert_eq!(starts.len(), out.len());

    for (h, &start) in out.iter_mut().zip(starts.iter()) {
        *h = Hexbit::new(buf.int(start..start + 6) as u8);
    }
}

/// Pack the given hexbits MSB first into bytes. The number of hexbits must be a
/// multiple of 4.
pub fn hexbit_bytes(hexbits: &[Hexbit]) -> Vec<u8> {
    assert!(hexbits.len() % 4 == 0);

    hexbits.chunks(4).flat_map(|c| {
        let word = c.iter().fold(0u32, |w, h| w << 6 | h.bits() as u32);
        [(word >> 16) as u8, (word >> 8) as u8, word as u8]
    }).collect()
}

/// Split the given bytes MSB first into hexbits. The number of bytes must be a
/// multiple of 3.
pub fn bytes_hexbits(bytes: &[u8]) -> Vec<Hexbit> {
    assert!(bytes.len() % 3 == 0);

    bytes.chunks(3).flat_map(|c| {
        let word = (c[0] as u32) << 16 | (c[1] as u32) << 8 | c[2] as u32;
        [18, 12, 6, 0].map(|s| Hexbit::new((word >> s) as u8 & 0x3F))
    }).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_hexbit_bytes() {
        let h = [
            Hexbit::new(0b111111),
            Hexbit::new(0b000000),
            Hexbit::new(0b101010),
            Hexbit::new(0b010101),
        ];

        assert_eq!(hexbit_bytes(&h), vec![0b11111100, 0b00001010, 0b10010101]);
        assert_eq!(bytes_hexbits(&[0b11111100, 0b00001010, 0b10010101]), h.to_vec());
    }

    #[test]
    fn test_read_hexbits() {
        let b = BitBuffer::from_bytes(&[0b10101100, 0b11110000]);
        let mut h = [Hexbit::default(); 2];

        read_hexbits(&b, &[0, 8], &mut h);
        assert_eq!(h, [Hexbit::new(0b101011), Hexbit::new(0b111100)]);
    }

    #[test]
    #[should_panic]
    fn test_validate() {
        Hexbit::new(0b1000000);
    }
}
