//! Terminator with link control (TDULC).

use collect_slice::CollectSlice;

use crate::bits::{hexbit_bytes, Hexbit};
use crate::buffer::BitBuffer;
use crate::coding::{golay, reed_solomon, Checks, Stage, Verdict};
use crate::voice::control::{LinkControlFields, LINK_CONTROL_BYTES};
use crate::voice::store_hexbits;

/// Number of payload bits in a TDULC.
pub const TERMINATOR_LC_BITS: usize = 288;

const WORDS: usize = 12;
const HEXBITS: usize = 24;
const DATA_HEXBITS: usize = 12;

/// Correct the given terminator in place and extract its link control word.
pub fn decode(buf: &mut BitBuffer, checks: &mut Checks) -> LinkControlFields {
    let words: [usize; WORDS] = std::array::from_fn(|k| 24 * k);
    let mut hexbits = [Hexbit::default(); HEXBITS];

    let tally = golay::correct_extended(buf, &words, &mut hexbits);
    checks.push(Stage::Golay, tally.verdict());

    let errs = reed_solomon::short::decode(&mut hexbits);

    if errs.is_some() {
        // Each Golay word carries two hexbits in its 12 data bits.
        let starts: [usize; DATA_HEXBITS] = std::array::from_fn(|i| 24 * (i / 2) + 6 * (i % 2));
        store_hexbits(buf, &starts, &hexbits[..DATA_HEXBITS]);
    }

    checks.push(Stage::RsShort, Verdict::from_errors(errs))
          .upgrade(Stage::Golay, Stage::RsShort);

    let mut bytes = [0; LINK_CONTROL_BYTES];
    hexbit_bytes(&hexbits[..DATA_HEXBITS]).into_iter().collect_slice_checked(&mut bytes[..]);

    LinkControlFields::new(bytes)
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::bits::bytes_hexbits;
    use crate::coding::StagePolicy;

    /// Build a clean terminator carrying the given link control word.
    pub(crate) fn encode(lc: &[u8; LINK_CONTROL_BYTES]) -> BitBuffer {
        let mut hexbits = [Hexbit::default(); HEXBITS];
        hexbits[..DATA_HEXBITS].copy_from_slice(&bytes_hexbits(lc));
        reed_solomon::short::encode(&mut hexbits);

        let mut buf = BitBuffer::new(TERMINATOR_LC_BITS);

        for (k, pair) in hexbits.chunks(2).enumerate() {
            let data = (pair[0].bits() as u16) << 6 | pair[1].bits() as u16;
            buf.store(24 * k, 24, golay::extended::encode(data) as u64);
        }

        buf
    }

    fn toggle(buf: &mut BitBuffer, idx: usize) {
        let bit = buf.bit(idx);
        buf.set(idx, !bit);
    }

    const LC: [u8; LINK_CONTROL_BYTES] = [0x0F, 0x00, 0x00, 0x00, 0x00, 0x00, 0x12, 0x34, 0x56];

    #[test]
    fn test_clean() {
        let mut buf = encode(&LC);
        let mut checks = Checks::new(StagePolicy::TERMINATOR);

        let lc = decode(&mut buf, &mut checks);

        assert_eq!(lc.bytes(), &LC);
        assert_eq!(lc.opcode().opcode, 0x0F);
        assert_eq!(checks.stages(), &[(Stage::Golay, Verdict::Passed),
                                      (Stage::RsShort, Verdict::Passed)]);
    }

    #[test]
    fn test_golay_corrected() {
        let mut buf = encode(&LC);
        toggle(&mut buf, 5);
        toggle(&mut buf, 100);
        toggle(&mut buf, 287);

        let mut checks = Checks::new(StagePolicy::TERMINATOR);
        let lc = decode(&mut buf, &mut checks);

        assert_eq!(lc.bytes(), &LC);
        assert_eq!(checks.verdict(Stage::Golay), Some(Verdict::Corrected));
        assert_eq!(buf.corrected(), 3);
        assert!(checks.is_valid());
    }

    #[test]
    fn test_rs_rescue() {
        let mut buf = encode(&LC);

        // Four errors in the second hexbit of word 3: beyond Golay.
        for i in 0..4 {
            toggle(&mut buf, 24 * 3 + 6 + i);
        }

        let mut checks = Checks::new(StagePolicy::TERMINATOR);
        let lc = decode(&mut buf, &mut checks);

        assert_eq!(lc.bytes(), &LC);
        assert_eq!(checks.verdict(Stage::Golay), Some(Verdict::Corrected));
        assert_eq!(checks.verdict(Stage::RsShort), Some(Verdict::Corrected));
        assert_eq!(buf.corrected(), 4);
        assert!(checks.is_valid());
    }

    #[test]
    fn test_unrecoverable() {
        let mut buf = encode(&LC);

        // Beyond Golay in seven words, each corrupting both hexbits.
        for k in 0..7 {
            for i in 4..8 {
                toggle(&mut buf, 24 * k + i);
            }
        }

        let mut checks = Checks::new(StagePolicy::TERMINATOR);
        decode(&mut buf, &mut checks);

        assert_eq!(checks.verdict(Stage::Golay), Some(Verdict::Failed));
        assert!(!checks.is_valid());
    }
}
