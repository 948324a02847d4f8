//! LDU1 and LDU2 frame groups: nine IMBE voice frames interleaved with an extra word
//! (link control or encryption sync) and two bytes of low-speed data.

use collect_slice::CollectSlice;

use crate::bits::{hexbit_bytes, Hexbit};
use crate::buffer::BitBuffer;
use crate::coding::{cyclic, hamming, reed_solomon, Checks, Stage, Verdict};
use crate::voice::control::{LinkControlFields, LINK_CONTROL_BYTES};
use crate::voice::crypto::{CryptoControlFields, CRYPTO_CONTROL_BYTES};
use crate::voice::store_hexbits;

/// Number of payload bits in a frame group.
pub const FRAME_GROUP_BITS: usize = 1568;
/// Number of bits in a coded IMBE voice frame.
pub const VOICE_FRAME_BITS: usize = 144;
/// Number of voice frames in a frame group.
pub const VOICE_FRAMES: usize = 9;

/// Start of each voice frame.
pub const VOICE_FRAME_STARTS: [usize; VOICE_FRAMES] =
    [0, 144, 328, 512, 696, 880, 1064, 1248, 1424];

/// Start of each group of four Hamming words carrying the extra word.
const EXTRA_GROUP_STARTS: [usize; 6] = [288, 472, 656, 840, 1024, 1208];
/// Start of the two cyclic words carrying low-speed data.
const LSD_STARTS: [usize; 2] = [1392, 1408];

const EXTRA_HEXBITS: usize = 24;

/// Coded voice frames and low-speed data shared by LDU1 and LDU2.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrameGroup {
    frames: [[u8; VOICE_FRAME_BITS / 8]; VOICE_FRAMES],
    lsd: [u8; 2],
}

impl FrameGroup {
    /// Coded IMBE voice frames, still interleaved and scrambled.
    pub fn voice_frames(&self) -> &[[u8; VOICE_FRAME_BITS / 8]; VOICE_FRAMES] {
        &self.frames
    }

    /// Two low-speed data bytes.
    pub fn low_speed_data(&self) -> [u8; 2] { self.lsd }

    fn extract(buf: &mut BitBuffer, checks: &mut Checks) -> FrameGroup {
        let mut frames = [[0; VOICE_FRAME_BITS / 8]; VOICE_FRAMES];

        for (frame, &start) in frames.iter_mut().zip(VOICE_FRAME_STARTS.iter()) {
            buf.bytes(start..start + VOICE_FRAME_BITS).into_iter()
                .collect_slice_checked(&mut frame[..]);
        }

        let mut lsd = [0; 2];
        let tally = cyclic::correct_words(buf, &LSD_STARTS, &mut lsd);
        checks.push(Stage::Cyclic, tally.verdict());

        FrameGroup { frames, lsd }
    }
}

/// Start of each Hamming word, whose first 6 bits carry one hexbit of the extra word.
fn extra_starts() -> [usize; EXTRA_HEXBITS] {
    std::array::from_fn(|j| EXTRA_GROUP_STARTS[j / 4] + 10 * (j % 4))
}

/// Correct the Hamming words and then the given Reed-Solomon code over the extra
/// word, returning its `data` data hexbits.
fn correct_extra<F>(buf: &mut BitBuffer, checks: &mut Checks, stage: Stage, data: usize,
                    decode: F)
    -> [Hexbit; EXTRA_HEXBITS]
    where F: FnOnce(&mut [Hexbit; EXTRA_HEXBITS]) -> Option<usize>
{
    let starts = extra_starts();
    let mut hexbits = [Hexbit::default(); EXTRA_HEXBITS];

    let tally = hamming::correct_words(buf, &starts, &mut hexbits);
    checks.push(Stage::Hamming, tally.verdict());

    let errs = decode(&mut hexbits);

    if errs.is_some() {
        store_hexbits(buf, &starts[..data], &hexbits[..data]);
    }

    checks.push(stage, Verdict::from_errors(errs)).upgrade(Stage::Hamming, stage);

    hexbits
}

/// Correct an LDU1 in place, returning its voice frames and link control word.
pub fn decode_lc_group(buf: &mut BitBuffer, checks: &mut Checks)
    -> (FrameGroup, LinkControlFields)
{
    let hexbits = correct_extra(buf, checks, Stage::RsShort, 12, reed_solomon::short::decode);

    let mut bytes = [0; LINK_CONTROL_BYTES];
    hexbit_bytes(&hexbits[..12]).into_iter().collect_slice_checked(&mut bytes[..]);

    (FrameGroup::extract(buf, checks), LinkControlFields::new(bytes))
}

/// Correct an LDU2 in place, returning its voice frames and encryption sync word.
pub fn decode_cc_group(buf: &mut BitBuffer, checks: &mut Checks)
    -> (FrameGroup, CryptoControlFields)
{
    let hexbits = correct_extra(buf, checks, Stage::RsMedium, 16,
                                reed_solomon::medium::decode);

    let mut bytes = [0; CRYPTO_CONTROL_BYTES];
    hexbit_bytes(&hexbits[..16]).into_iter().collect_slice_checked(&mut bytes[..]);

    (FrameGroup::extract(buf, checks), CryptoControlFields::new(bytes))
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::bits::bytes_hexbits;
    use crate::coding::StagePolicy;
    use crate::voice::crypto::CryptoAlgorithm;

    /// Build a clean LDU carrying the given extra word hexbits (already RS encoded)
    /// and low-speed data.
    fn encode(hexbits: &[Hexbit; EXTRA_HEXBITS], lsd: [u8; 2]) -> BitBuffer {
        let mut buf = BitBuffer::new(FRAME_GROUP_BITS);

        for (i, &start) in VOICE_FRAME_STARTS.iter().enumerate() {
            for b in 0..VOICE_FRAME_BITS / 8 {
                buf.store(start + b * 8, 8, (i * 16 + b) as u64);
            }
        }

        for (h, &start) in hexbits.iter().zip(extra_starts().iter()) {
            buf.store(start, 10, hamming::encode(h.bits()) as u64);
        }

        for (&b, &start) in lsd.iter().zip(LSD_STARTS.iter()) {
            buf.store(start, 16, cyclic::encode(b) as u64);
        }

        buf
    }

    /// Build a clean LDU1 carrying the given link control word.
    pub(crate) fn encode_lc_group(lc: &[u8; LINK_CONTROL_BYTES]) -> BitBuffer {
        let mut hexbits = [Hexbit::default(); EXTRA_HEXBITS];
        hexbits[..12].copy_from_slice(&bytes_hexbits(lc));
        reed_solomon::short::encode(&mut hexbits);

        encode(&hexbits, [0xAB, 0xCD])
    }

    fn encode_cc_group(cc: &[u8; CRYPTO_CONTROL_BYTES]) -> BitBuffer {
        let mut hexbits = [Hexbit::default(); EXTRA_HEXBITS];
        hexbits[..16].copy_from_slice(&bytes_hexbits(cc));
        reed_solomon::medium::encode(&mut hexbits);

        encode(&hexbits, [0x12, 0x34])
    }

    const LC: [u8; LINK_CONTROL_BYTES] = [0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x2A, 0x00];

    #[test]
    fn test_extra_starts() {
        let s = extra_starts();

        assert_eq!(s[0], 288);
        assert_eq!(s[3], 318);
        assert_eq!(s[4], 472);
        assert_eq!(s[23], 1238);
    }

    #[test]
    fn test_lc_group_clean() {
        let mut buf = encode_lc_group(&LC);
        let mut checks = Checks::new(StagePolicy::VOICE);

        let (group, lc) = decode_lc_group(&mut buf, &mut checks);

        assert_eq!(lc.bytes(), &LC);
        assert_eq!(group.low_speed_data(), [0xAB, 0xCD]);
        assert_eq!(group.voice_frames()[0][0], 0);
        assert_eq!(group.voice_frames()[2][5], 37);
        assert_eq!(group.voice_frames()[8][17], 145);
        assert_eq!(checks.stages(), &[
            (Stage::Hamming, Verdict::Passed),
            (Stage::RsShort, Verdict::Passed),
            (Stage::Cyclic, Verdict::Passed),
        ]);
        assert_eq!(buf.corrected(), 0);
    }

    #[test]
    fn test_lc_group_rs_rescue() {
        let mut buf = encode_lc_group(&LC);

        // Two errors in one Hamming word: detected but not located.
        let start = extra_starts()[7];
        buf.set(start, !buf.bit(start));
        buf.set(start + 2, !buf.bit(start + 2));

        // One located error in another.
        let start = extra_starts()[1];
        buf.set(start + 9, !buf.bit(start + 9));

        let mut checks = Checks::new(StagePolicy::VOICE);
        let (_, lc) = decode_lc_group(&mut buf, &mut checks);

        assert_eq!(lc.bytes(), &LC);
        assert_eq!(checks.verdict(Stage::Hamming), Some(Verdict::Corrected));
        assert_eq!(checks.verdict(Stage::RsShort), Some(Verdict::Corrected));
        assert!(checks.is_valid());
    }

    #[test]
    fn test_lc_group_lsd_advisory() {
        let mut buf = encode_lc_group(&LC);

        for i in 0..3 {
            let idx = LSD_STARTS[0] + i;
            buf.set(idx, !buf.bit(idx));
        }

        let mut checks = Checks::new(StagePolicy::VOICE);
        let (_, lc) = decode_lc_group(&mut buf, &mut checks);

        assert_ne!(checks.verdict(Stage::Cyclic), Some(Verdict::Passed));
        assert_eq!(lc.bytes(), &LC);
        assert!(checks.is_valid());
    }

    #[test]
    fn test_cc_group() {
        let cc = [0, 0, 0, 0, 0, 0, 0, 0, 7, 0x81, 0x00, 0x10];
        let mut buf = encode_cc_group(&cc);

        let idx = extra_starts()[20] + 3;
        buf.set(idx, !buf.bit(idx));

        let mut checks = Checks::new(StagePolicy::VOICE);
        let (group, es) = decode_cc_group(&mut buf, &mut checks);

        assert_eq!(es.crypto_alg(), CryptoAlgorithm::DES);
        assert_eq!(es.crypto_key(), 0x0010);
        assert_eq!(es.crypto_init()[8], 7);
        assert_eq!(group.low_speed_data(), [0x12, 0x34]);
        assert_eq!(checks.verdict(Stage::Hamming), Some(Verdict::Corrected));
        assert_eq!(checks.verdict(Stage::RsMedium), Some(Verdict::Passed));
        assert_eq!(buf.corrected(), 1);
    }
}
