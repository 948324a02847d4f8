//! Big-endian integers from byte slices.

pub fn slice_u16(bytes: &[u8]) -> u16 {
    (bytes[0] as u16) << 8 | bytes[1] as u16
}

pub fn slice_u24(bytes: &[u8]) -> u32 {
    (slice_u16(bytes) as u32) << 8 | bytes[2] as u32
}

pub fn slice_u32(bytes: &[u8]) -> u32 {
    (slice_u16(bytes) as u32) << 16 | slice_u16(&bytes[2..]) as u32
}

/// 20-bit WACN followed by 12-bit system id, packed into the 4 given bytes.
pub fn wacn_system(bytes: &[u8]) -> (u32, u16) {
    let w = slice_u32(bytes);
    (w >> 12, w as u16 & 0xFFF)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_slice_u16() {
        assert_eq!(slice_u16(&[0xDE, 0xAD]), 0xDEAD);
        assert_eq!(slice_u16(&[0xAB, 0xCD, 0xEF]), 0xABCD);
    }

    #[test]
    fn test_slice_u24() {
        assert_eq!(slice_u24(&[0xDE, 0xAD, 0xBE]), 0xDEADBE);
        assert_eq!(slice_u24(&[0xAB, 0xCD, 0xEF, 0x12]), 0xABCDEF);
    }

    #[test]
    fn test_slice_u32() {
        assert_eq!(slice_u32(&[0xDE, 0xAD, 0xBE, 0xEF]), 0xDEADBEEF);
    }

    #[test]
    fn test_wacn_system() {
        assert_eq!(wacn_system(&[0xBE, 0xE0, 0x01, 0x23]), (0xBEE00, 0x123));
    }
}
