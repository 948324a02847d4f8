//! Validation, classification, and decoding of P25 phase 1 frames.
//!
//! Frames arrive already synchronized, with the NID split off and status symbols
//! removed. Each is run through its data unit's error correction stages, classified by
//! data unit, opcode, and vendor, and turned into a typed `Message`. Channel
//! references in messages resolve to frequencies once the channel's band has been
//! announced.

pub mod band;
pub mod bits;
pub mod buffer;
pub mod classify;
pub mod coding;
pub mod data;
pub mod decoder;
pub mod error;
pub mod message;
pub mod nid;
pub mod stats;
pub mod trunking;
pub mod util;
pub mod vendor;
pub mod voice;

pub use crate::decoder::{Decoder, DecoderConfig, MessageHandler};
pub use crate::error::{BandError, DecodeError};
pub use crate::message::{Frame, Message, MessageKind};
