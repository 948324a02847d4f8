//! Voice header (HDU): the encryption and talkgroup parameters sent before a voice
//! transmission.

use std::fmt;

use collect_slice::CollectSlice;

use crate::bits::{hexbit_bytes, Hexbit};
use crate::buffer::BitBuffer;
use crate::coding::{golay, reed_solomon, Checks, Stage, Verdict};
use crate::trunking::fields::TalkGroup;
use crate::util::slice_u16;
use crate::voice::crypto::CryptoAlgorithm;
use crate::voice::store_hexbits;

/// Number of payload bits in a header.
pub const HEADER_BITS: usize = 648;
/// Number of bytes in a decoded header.
pub const HEADER_BYTES: usize = 15;

const HEADER_HEXBITS: usize = 36;
const DATA_HEXBITS: usize = 20;
const WORD_BITS: usize = 18;

/// Bit positions of the manufacturer id, spread over two Golay words.
pub const MFID: [usize; 8] = [216, 217, 218, 219, 220, 221, 234, 235];
/// Bit positions of the algorithm id.
pub const ALGID: [usize; 8] = [236, 237, 238, 239, 252, 253, 254, 255];
/// Bit positions of the key id.
pub const KID: [usize; 16] = [
    256, 257,
    270, 271, 272, 273, 274, 275,
    288, 289, 290, 291, 292, 293,
    306, 307,
];
/// Bit positions of the talkgroup.
pub const TGID: [usize; 16] = [
    308, 309, 310, 311,
    324, 325, 326, 327, 328, 329,
    342, 343, 344, 345, 346, 347,
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VoiceHeaderFields([u8; HEADER_BYTES]);

impl VoiceHeaderFields {
    pub fn new(buf: [u8; HEADER_BYTES]) -> Self { VoiceHeaderFields(buf) }

    /// Correct the given header in place and extract its fields, recording the Golay
    /// and Reed-Solomon stages.
    pub fn decode(buf: &mut BitBuffer, checks: &mut Checks) -> VoiceHeaderFields {
        let starts: [usize; HEADER_HEXBITS] = std::array::from_fn(|i| WORD_BITS * i);
        let mut hexbits = [Hexbit::default(); HEADER_HEXBITS];

        let tally = golay::shortened::correct_words(buf, &starts, &mut hexbits);
        checks.push(Stage::Golay, tally.verdict());

        let errs = reed_solomon::long::decode(&mut hexbits);

        if errs.is_some() {
            store_hexbits(buf, &starts[..DATA_HEXBITS], &hexbits[..DATA_HEXBITS]);
        }

        checks.push(Stage::RsLong, Verdict::from_errors(errs))
              .upgrade(Stage::Golay, Stage::RsLong);

        let mut bytes = [0; HEADER_BYTES];
        hexbit_bytes(&hexbits[..DATA_HEXBITS]).into_iter()
            .collect_slice_checked(&mut bytes[..]);

        VoiceHeaderFields(bytes)
    }

    pub fn crypto_init(&self) -> &[u8] { &self.0[..9] }
    pub fn mfg(&self) -> u8 { self.0[9] }

    pub fn crypto_alg(&self) -> CryptoAlgorithm {
        CryptoAlgorithm::from_bits(self.0[10])
    }

    pub fn crypto_key(&self) -> u16 { slice_u16(&self.0[11..]) }

    pub fn talk_group(&self) -> TalkGroup {
        TalkGroup::from_bits(slice_u16(&self.0[13..]))
    }
}

impl fmt::Display for VoiceHeaderFields {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TG:{} MFID:{:02X} ALGID:{} KEY:{:04X}", self.talk_group(), self.mfg(),
               self.crypto_alg(), self.crypto_key())
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::bits::bytes_hexbits;
    use crate::coding::StagePolicy;
    use crate::voice::crypto::CryptoAlgorithm::*;

    const FIELDS: [u8; HEADER_BYTES] = [
        1, 2, 3, 4, 5, 6, 7, 8, 9,
        0x90,
        0x84,
        0xBE, 0xEF,
        0x12, 0x34,
    ];

    pub(crate) fn encode(bytes: &[u8; HEADER_BYTES]) -> BitBuffer {
        let mut hexbits = [Hexbit::default(); HEADER_HEXBITS];
        hexbits[..DATA_HEXBITS].copy_from_slice(&bytes_hexbits(bytes));
        reed_solomon::long::encode(&mut hexbits);

        let mut buf = BitBuffer::new(HEADER_BITS);

        for (i, h) in hexbits.iter().enumerate() {
            buf.store(WORD_BITS * i, WORD_BITS, golay::shortened::encode(h.bits()) as u64);
        }

        buf
    }

    #[test]
    fn test_header() {
        let h = VoiceHeaderFields::new([
            1, 2, 3, 4, 5, 6, 7, 8, 9,
            0b00000000,
            0b10000000,
            0b00000000,
            0b00000000,
            0b11111111,
            0b11111111,
        ]);

        assert_eq!(h.crypto_init(), &[1,2,3,4,5,6,7,8,9]);
        assert_eq!(h.mfg(), 0);
        assert_eq!(h.crypto_alg(), Unencrypted);
        assert_eq!(h.crypto_key(), 0);
        assert_eq!(h.talk_group(), TalkGroup::Everybody);
    }

    #[test]
    fn test_decode_clean() {
        let mut buf = encode(&FIELDS);
        let mut checks = Checks::new(StagePolicy::HEADER);

        let h = VoiceHeaderFields::decode(&mut buf, &mut checks);

        assert_eq!(h, VoiceHeaderFields::new(FIELDS));
        assert_eq!(checks.stages(), &[(Stage::Golay, Verdict::Passed),
                                      (Stage::RsLong, Verdict::Passed)]);
        assert_eq!(buf.corrected(), 0);

        assert_eq!(buf.get(&MFID), 0x90);
        assert_eq!(buf.get(&ALGID), 0x84);
        assert_eq!(buf.get(&KID), 0xBEEF);
        assert_eq!(buf.get(&TGID), 0x1234);
        assert_eq!(h.talk_group(), TalkGroup::Other(0x1234));
        assert_eq!(h.crypto_alg(), AES);
    }

    #[test]
    fn test_decode_golay() {
        let mut buf = encode(&FIELDS);
        buf.set(3 * WORD_BITS + 2, !buf.bit(3 * WORD_BITS + 2));
        buf.set(30 * WORD_BITS + 17, !buf.bit(30 * WORD_BITS + 17));

        let mut checks = Checks::new(StagePolicy::HEADER);
        let h = VoiceHeaderFields::decode(&mut buf, &mut checks);

        assert_eq!(h, VoiceHeaderFields::new(FIELDS));
        assert_eq!(checks.verdict(Stage::Golay), Some(Verdict::Corrected));
        assert_eq!(checks.verdict(Stage::RsLong), Some(Verdict::Passed));
        assert_eq!(buf.corrected(), 2);
        assert!(checks.is_valid());
    }

    #[test]
    fn test_decode_rs_rescue() {
        let mut buf = encode(&FIELDS);

        // Four errors in the data bits of the word carrying the MFID: beyond Golay.
        for i in 0..4 {
            let idx = 12 * WORD_BITS + i;
            buf.set(idx, !buf.bit(idx));
        }

        let mut checks = Checks::new(StagePolicy::HEADER);
        let h = VoiceHeaderFields::decode(&mut buf, &mut checks);

        assert_eq!(h.mfg(), 0x90);
        assert_eq!(buf.get(&MFID), 0x90);
        assert_eq!(checks.verdict(Stage::Golay), Some(Verdict::Corrected));
        assert_eq!(checks.verdict(Stage::RsLong), Some(Verdict::Corrected));
        assert_eq!(buf.corrected(), 4);
        assert!(checks.is_valid());
    }
}
