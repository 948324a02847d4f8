//! Hard failures. Transmission errors are never reported here; they're recorded as
//! stage verdicts on the decoded message.

use thiserror::Error;

/// Frame construction failures caused by input that should never have made it past
/// framing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{kind} frame needs {expected} bits, got {found}")]
    ShortFrame {
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("packet data block {index} has {found} bits, expected {expected}")]
    BlockLength {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("network access code {0:#x} doesn't fit in 12 bits")]
    AccessCode(u16),
}

/// Rejected frequency band bindings.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandError {
    #[error("message isn't waiting on band identifier {0}")]
    NotAwaited(u8),

    #[error("band identifier {0} is already bound to a different band")]
    AlreadyBound(u8),
}

/// Result of building a message.
pub type Result<T, E = DecodeError> = std::result::Result<T, E>;
