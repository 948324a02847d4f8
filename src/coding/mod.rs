//! Encoding and decoding for the several error correction coding schemes used in P25,
//! and the bookkeeping of their per-frame results.

#[macro_use]
pub mod galois;

mod bmcf;

pub mod crc;
pub mod cyclic;
pub mod golay;
pub mod hamming;
pub mod reed_solomon;

#[cfg(feature = "ser")]
use serde::{Deserialize, Serialize};

/// Result of one correction stage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ser", derive(Serialize, Deserialize))]
pub enum Verdict {
    /// No errors were found.
    Passed,
    /// Errors were found and corrected in place.
    Corrected,
    /// Errors were found that couldn't be corrected.
    Failed,
}

impl Verdict {
    /// Verdict of a decoder that returns the number of corrected symbols or `None`
    /// when the word is unrecoverable.
    pub fn from_errors(errs: Option<usize>) -> Verdict {
        match errs {
            Some(0) => Verdict::Passed,
            Some(_) => Verdict::Corrected,
            None => Verdict::Failed,
        }
    }

    pub fn is_failed(&self) -> bool { *self == Verdict::Failed }
}

/// Correction stages, one per code and protected region.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ser", derive(Serialize, Deserialize))]
pub enum Stage {
    /// Golay words carrying header or terminator hexbits.
    Golay,
    /// Hamming words carrying voice frame hexbits.
    Hamming,
    /// RS (24, 12, 13) over a link control word.
    RsShort,
    /// RS (24, 16, 9) over an encryption sync word.
    RsMedium,
    /// RS (36, 20, 17) over a voice header.
    RsLong,
    /// Cyclic words carrying low-speed data.
    Cyclic,
    /// CRC-CCITT over a trunking or packet header block.
    Crc16,
    /// CRC-9 over a confirmed data block.
    Crc9,
    /// CRC-32 over packet user data.
    Crc32,
}

impl Stage {
    /// Whether the stage is a Reed-Solomon code.
    pub fn is_reed_solomon(&self) -> bool {
        matches!(*self, Stage::RsShort | Stage::RsMedium | Stage::RsLong)
    }
}

/// Corrected bits and failed words accumulated over a run of code words.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub corrected: usize,
    pub failed: usize,
}

impl Tally {
    pub fn verdict(&self) -> Verdict {
        if self.failed > 0 {
            Verdict::Failed
        } else if self.corrected > 0 {
            Verdict::Corrected
        } else {
            Verdict::Passed
        }
    }
}

/// Which stages of a message kind are advisory, i.e. don't affect validity when they
/// fail.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StagePolicy {
    advisory: &'static [Stage],
}

impl StagePolicy {
    /// Every stage counts.
    pub const STRICT: StagePolicy = StagePolicy::new(&[]);
    /// Voice header: the long RS code has the final say.
    pub const HEADER: StagePolicy = StagePolicy::new(&[Stage::Golay]);
    /// LDU1/LDU2: RS decides, low-speed data is informational.
    pub const VOICE: StagePolicy = StagePolicy::new(&[Stage::Hamming, Stage::Cyclic]);
    /// Terminator with link control.
    pub const TERMINATOR: StagePolicy = StagePolicy::new(&[Stage::Golay]);
    /// Packet data: a bad packet checksum is reported but the blocks stand.
    pub const PACKET: StagePolicy = StagePolicy::new(&[Stage::Crc32]);

    pub const fn new(advisory: &'static [Stage]) -> StagePolicy {
        StagePolicy { advisory }
    }

    pub fn is_advisory(&self, stage: Stage) -> bool {
        self.advisory.contains(&stage)
    }
}

/// Ordered record of the stages applied to one message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checks {
    policy: StagePolicy,
    stages: Vec<(Stage, Verdict)>,
}

impl Checks {
    pub fn new(policy: StagePolicy) -> Checks {
        Checks {
            policy,
            stages: Vec::new(),
        }
    }

    /// Record the result of the next stage.
    pub fn push(&mut self, stage: Stage, verdict: Verdict) -> &mut Self {
        self.stages.push((stage, verdict));
        self
    }

    /// Append every stage of another record, keeping this record's policy.
    pub fn extend(&mut self, other: &Checks) -> &mut Self {
        self.stages.extend_from_slice(&other.stages);
        self
    }

    /// Recorded stages in the order they ran.
    pub fn stages(&self) -> &[(Stage, Verdict)] { &self.stages }

    pub fn policy(&self) -> StagePolicy { self.policy }

    /// Most recent verdict recorded for the given stage.
    pub fn verdict(&self, stage: Stage) -> Option<Verdict> {
        self.stages.iter().rev().find(|&&(s, _)| s == stage).map(|&(_, v)| v)
    }

    /// Upgrade a failed `inner` stage to corrected when the `outer` stage covering the
    /// same bits succeeded, since the outer code fixed whatever the inner code couldn't
    /// locate.
    pub fn upgrade(&mut self, inner: Stage, outer: Stage) -> &mut Self {
        let rescued = self.verdict(outer).map_or(false, |v| !v.is_failed());

        if rescued {
            for (s, v) in self.stages.iter_mut() {
                if *s == inner && v.is_failed() {
                    *v = Verdict::Corrected;
                }
            }
        }

        self
    }

    /// Whether no non-advisory stage failed.
    pub fn is_valid(&self) -> bool {
        self.stages.iter().fold(true, |valid, &(stage, verdict)| {
            valid && !(verdict.is_failed() && !self.policy.is_advisory(stage))
        })
    }

    /// Whether any stage, advisory or not, failed.
    pub fn any_failed(&self) -> bool {
        self.stages.iter().any(|&(_, v)| v.is_failed())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tally() {
        assert_eq!(Tally::default().verdict(), Verdict::Passed);
        assert_eq!(Tally { corrected: 3, failed: 0 }.verdict(), Verdict::Corrected);
        assert_eq!(Tally { corrected: 3, failed: 1 }.verdict(), Verdict::Failed);
    }

    #[test]
    fn test_policy() {
        let mut c = Checks::new(StagePolicy::VOICE);
        c.push(Stage::Hamming, Verdict::Failed)
         .push(Stage::RsShort, Verdict::Corrected)
         .push(Stage::Cyclic, Verdict::Failed);

        assert!(c.is_valid());
        assert!(c.any_failed());

        c.push(Stage::RsShort, Verdict::Failed);
        assert!(!c.is_valid());

        let mut c = Checks::new(StagePolicy::STRICT);
        c.push(Stage::Hamming, Verdict::Failed);
        assert!(!c.is_valid());
    }

    #[test]
    fn test_upgrade() {
        let mut c = Checks::new(StagePolicy::STRICT);
        c.push(Stage::Hamming, Verdict::Failed)
         .push(Stage::RsMedium, Verdict::Corrected)
         .upgrade(Stage::Hamming, Stage::RsMedium);

        assert_eq!(c.verdict(Stage::Hamming), Some(Verdict::Corrected));
        assert!(c.is_valid());

        let mut c = Checks::new(StagePolicy::STRICT);
        c.push(Stage::Golay, Verdict::Failed)
         .push(Stage::RsLong, Verdict::Failed)
         .upgrade(Stage::Golay, Stage::RsLong);

        assert_eq!(c.verdict(Stage::Golay), Some(Verdict::Failed));
        assert!(!c.is_valid());
    }
}
