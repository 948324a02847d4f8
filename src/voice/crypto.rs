//! Encryption sync fields carried by voice headers and LDU2 frame groups.

use std::fmt;

use crate::util::slice_u16;

/// Number of bytes in an encryption sync word.
pub const CRYPTO_CONTROL_BYTES: usize = 12;

/// Message indicator, algorithm, and key of the current transmission.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CryptoControlFields([u8; CRYPTO_CONTROL_BYTES]);

impl CryptoControlFields {
    pub fn new(buf: [u8; CRYPTO_CONTROL_BYTES]) -> Self { CryptoControlFields(buf) }

    /// 72-bit message indicator, the cipher initialization vector.
    pub fn crypto_init(&self) -> &[u8] { &self.0[..9] }

    pub fn crypto_alg(&self) -> CryptoAlgorithm {
        CryptoAlgorithm::from_bits(self.0[9])
    }

    pub fn crypto_key(&self) -> u16 { slice_u16(&self.0[10..]) }

    pub fn is_encrypted(&self) -> bool {
        self.crypto_alg() != CryptoAlgorithm::Unencrypted
    }
}

impl fmt::Display for CryptoControlFields {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ALGID:{} KEY:{:04X} MI:", self.crypto_alg(), self.crypto_key())?;

        for b in self.crypto_init() {
            write!(f, "{:02X}", b)?;
        }

        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CryptoAlgorithm {
    Accordion,
    BatonEven,
    Firefly,
    Mayfly,
    Saville,
    BatonOdd,
    Unencrypted,
    DES,
    TripleDES,
    AES,
    Other(u8),
}

impl CryptoAlgorithm {
    pub fn from_bits(bits: u8) -> CryptoAlgorithm {
        use self::CryptoAlgorithm::*;

        match bits {
            0x00 => Accordion,
            0x01 => BatonEven,
            0x02 => Firefly,
            0x03 => Mayfly,
            0x04 => Saville,
            0x41 => BatonOdd,
            0x80 => Unencrypted,
            0x81 => DES,
            0x83 => TripleDES,
            0x84 => AES,
            b => Other(b),
        }
    }
}

impl fmt::Display for CryptoAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::CryptoAlgorithm::*;

        match *self {
            Unencrypted => f.write_str("CLEAR"),
            DES => f.write_str("DES-OFB"),
            TripleDES => f.write_str("3DES"),
            AES => f.write_str("AES-256"),
            Other(b) => write!(f, "{:02X}", b),
            other => write!(f, "{:?}", other),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use super::CryptoAlgorithm::*;

    #[test]
    fn test_crypto() {
        let c = CryptoControlFields::new([
            0, 0, 0, 1, 0, 0, 0, 2, 0,
            0b10000100,
            0xDE, 0xAD,
        ]);

        assert_eq!(c.crypto_init(), &[0,0,0,1,0,0,0,2,0]);
        assert_eq!(c.crypto_alg(), AES);
        assert_eq!(c.crypto_key(), 0xDEAD);
        assert!(c.is_encrypted());
        assert_eq!(c.to_string(), "ALGID:AES-256 KEY:DEAD MI:000000010000000200");
    }

    #[test]
    fn test_alg() {
        assert_eq!(CryptoAlgorithm::from_bits(0x80), Unencrypted);
        assert_eq!(CryptoAlgorithm::from_bits(0x99), Other(0x99));
        assert_eq!(Other(0x99).to_string(), "99");
        assert_eq!(Saville.to_string(), "Saville");
    }
}
