//! Decoding of trunking control messages.

pub mod fields;
pub mod motorola;
pub mod tsbk;
