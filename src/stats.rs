//! Runtime statistics.

use crate::coding::{Checks, Stage, Verdict};

/// Tracks the results of one correction stage across many messages.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeStats {
    /// Number of times the stage ran.
    pub runs: usize,
    /// Number of runs that corrected errors.
    pub fixed: usize,
    /// Number of runs with unrecoverable errors.
    pub err: usize,
}

impl CodeStats {
    /// Record the outcome of one run.
    pub fn record(&mut self, verdict: Verdict) {
        self.runs += 1;

        match verdict {
            Verdict::Passed => {},
            Verdict::Corrected => self.fixed += 1,
            Verdict::Failed => self.err += 1,
        }
    }

    /// Merge in the stats from the given object and clear the other stats.
    fn merge(&mut self, other: &mut CodeStats) {
        self.runs += other.runs;
        self.fixed += other.fixed;
        self.err += other.err;

        *other = CodeStats::default();
    }
}

/// Records per-stage statistics plus message counts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub golay: CodeStats,
    pub hamming: CodeStats,
    pub cyclic: CodeStats,
    pub rs_short: CodeStats,
    pub rs_med: CodeStats,
    pub rs_long: CodeStats,
    pub crc16: CodeStats,
    pub crc9: CodeStats,
    pub crc32: CodeStats,
    /// Number of messages decoded.
    pub messages: usize,
    /// Number of messages that failed validation.
    pub invalid: usize,
    /// Total corrected bits.
    pub corrected_bits: usize,
}

impl Stats {
    /// Stats for the given stage.
    pub fn code(&self, stage: Stage) -> &CodeStats {
        match stage {
            Stage::Golay => &self.golay,
            Stage::Hamming => &self.hamming,
            Stage::Cyclic => &self.cyclic,
            Stage::RsShort => &self.rs_short,
            Stage::RsMedium => &self.rs_med,
            Stage::RsLong => &self.rs_long,
            Stage::Crc16 => &self.crc16,
            Stage::Crc9 => &self.crc9,
            Stage::Crc32 => &self.crc32,
        }
    }

    fn code_mut(&mut self, stage: Stage) -> &mut CodeStats {
        match stage {
            Stage::Golay => &mut self.golay,
            Stage::Hamming => &mut self.hamming,
            Stage::Cyclic => &mut self.cyclic,
            Stage::RsShort => &mut self.rs_short,
            Stage::RsMedium => &mut self.rs_med,
            Stage::RsLong => &mut self.rs_long,
            Stage::Crc16 => &mut self.crc16,
            Stage::Crc9 => &mut self.crc9,
            Stage::Crc32 => &mut self.crc32,
        }
    }

    /// Record every stage of a decoded message.
    pub fn record(&mut self, checks: &Checks, corrected_bits: usize) {
        self.messages += 1;
        self.corrected_bits += corrected_bits;

        if !checks.is_valid() {
            self.invalid += 1;
        }

        for &(stage, verdict) in checks.stages() {
            self.code_mut(stage).record(verdict);
        }
    }

    /// Merge in the stats from the given object and reset the other stats back to
    /// default.
    pub fn merge(&mut self, other: &mut Stats) {
        self.golay.merge(&mut other.golay);
        self.hamming.merge(&mut other.hamming);
        self.cyclic.merge(&mut other.cyclic);
        self.rs_short.merge(&mut other.rs_short);
        self.rs_med.merge(&mut other.rs_med);
        self.rs_long.merge(&mut other.rs_long);
        self.crc16.merge(&mut other.crc16);
        self.crc9.merge(&mut other.crc9);
        self.crc32.merge(&mut other.crc32);

        self.messages += other.messages;
        self.invalid += other.invalid;
        self.corrected_bits += other.corrected_bits;

        *other = Stats::default();
    }

    /// Clear all stats.
    pub fn clear(&mut self) {
        *self = Stats::default();
    }
}
