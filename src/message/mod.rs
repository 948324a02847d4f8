//! Decoded messages.
//!
//! Every frame becomes one `Message`: the envelope fields shared by all frames (access
//! code, data unit, timestamp, FEC results) around a `MessageKind` holding the fields
//! of the particular frame family.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::band::{ChannelRef, FrequencyBand};
use crate::buffer::BitBuffer;
use crate::classify::Classification;
use crate::coding::Checks;
use crate::data::Packet;
use crate::error::BandError;
use crate::nid::{DataUnit, NetworkAccessCode, NetworkId};
use crate::trunking::tsbk::{Tsbk, TsbkFields};
use crate::voice::control::{LinkControl, LinkControlFields};
use crate::voice::crypto::CryptoControlFields;
use crate::voice::frame::FrameGroup;
use crate::voice::header::VoiceHeaderFields;

pub mod factory;

/// Synchronized frame handed over by the demodulator: NID, payload bits with status
/// symbols removed, and reception time.
#[derive(Clone, Debug)]
pub struct Frame {
    pub nid: NetworkId,
    pub bits: BitBuffer,
    /// Reception time, in whatever unit the caller uses.
    pub timestamp: u64,
}

impl Frame {
    pub fn new(nid: NetworkId, bits: BitBuffer, timestamp: u64) -> Frame {
        Frame { nid, bits, timestamp }
    }
}

/// Fields of a decoded frame, by frame family.
#[derive(Debug)]
pub enum MessageKind {
    /// HDU.
    Header(VoiceHeaderFields),
    /// LDU1.
    VoiceLinkControl {
        frames: FrameGroup,
        fields: LinkControlFields,
        lc: LinkControl,
    },
    /// LDU2.
    VoiceCrypto {
        frames: FrameGroup,
        crypto: CryptoControlFields,
    },
    /// TDU.
    Terminator,
    /// TDULC.
    TerminatorLinkControl {
        fields: LinkControlFields,
        lc: LinkControl,
    },
    /// One block of a TSBK frame.
    Trunking {
        fields: TsbkFields,
        tsbk: Tsbk,
    },
    /// PDU.
    Packet(Packet),
    /// Frame with a reserved data unit tag.
    Unknown(BitBuffer),
}

impl MessageKind {
    pub fn label(&self) -> &'static str {
        use self::MessageKind::*;

        match *self {
            Header(_) => "VOICE HEADER",
            VoiceLinkControl { ref lc, .. } | TerminatorLinkControl { ref lc, .. } => lc.label(),
            VoiceCrypto { .. } => "ENCRYPTION SYNC",
            Terminator => "TERMINATOR",
            Trunking { ref tsbk, .. } => tsbk.label(),
            Packet(ref p) => p.label(),
            Unknown(_) => "UNKNOWN",
        }
    }

    /// Channels referenced by the message.
    pub fn channels(&self) -> Vec<&ChannelRef> {
        use self::MessageKind::*;

        match *self {
            VoiceLinkControl { ref lc, .. } | TerminatorLinkControl { ref lc, .. } =>
                lc.channels(),
            Trunking { ref tsbk, .. } => tsbk.channels(),
            Packet(ref p) => p.channels(),
            _ => vec![],
        }
    }

    /// Band announced by the message.
    pub fn frequency_band(&self) -> Option<FrequencyBand> {
        use self::MessageKind::*;

        match *self {
            VoiceLinkControl { ref lc, .. } | TerminatorLinkControl { ref lc, .. } =>
                lc.frequency_band(),
            Trunking { ref tsbk, .. } => tsbk.frequency_band(),
            _ => None,
        }
    }

    /// Downlink and uplink channel of the message's primary channel. These are the
    /// same channel unless the message names the uplink separately.
    fn channel_pair(&self) -> Option<(&ChannelRef, &ChannelRef)> {
        use crate::data::Packet as P;
        use crate::voice::control::LinkControl as L;
        use self::MessageKind::*;

        let explicit = match *self {
            VoiceLinkControl { lc: L::GroupVoiceUpdateExplicit(ref u), .. } |
            TerminatorLinkControl { lc: L::GroupVoiceUpdateExplicit(ref u), .. } =>
                Some((u.downlink(), u.uplink())),
            Trunking { ref tsbk, .. } => tsbk.channel_pair(),
            Packet(P::GroupVoiceGrant(ref g)) => g.downlink().zip(g.uplink()),
            Packet(P::UnitVoiceGrant(ref g)) => g.downlink().zip(g.uplink()),
            Packet(P::AdjacentSiteStatus(ref s)) =>
                s.site().map(|s| s.channel()).zip(s.uplink()),
            Packet(P::NetworkStatus(ref s)) =>
                s.status().map(|s| s.channel()).zip(s.uplink()),
            _ => None,
        };

        explicit.or_else(|| self.channels().first().map(|&c| (c, c)))
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::MessageKind::*;

        match *self {
            Header(ref h) => write!(f, "VOICE HEADER {}", h),
            VoiceLinkControl { ref frames, ref lc, .. } => {
                let lsd = frames.low_speed_data();
                write!(f, "{} LSD:{:02X}{:02X}", lc, lsd[0], lsd[1])
            },
            VoiceCrypto { ref frames, ref crypto } => {
                let lsd = frames.low_speed_data();
                write!(f, "ENCRYPTION SYNC {} LSD:{:02X}{:02X}", crypto, lsd[0], lsd[1])
            },
            Terminator => Ok(()),
            TerminatorLinkControl { ref lc, .. } => write!(f, "{}", lc),
            Trunking { ref tsbk, .. } => write!(f, "{}", tsbk),
            Packet(ref p) => write!(f, "{}", p),
            Unknown(ref bits) => write!(f, "UNKNOWN BITS:{}", bits.len()),
        }
    }
}

/// Decoded frame.
#[derive(Debug)]
pub struct Message {
    class: Classification,
    timestamp: u64,
    checks: Checks,
    /// Bits corrected by every stage.
    corrected: usize,
    kind: MessageKind,
    summary: OnceLock<String>,
}

impl Message {
    pub(crate) fn new(class: Classification, timestamp: u64, checks: Checks,
                      corrected: usize, kind: MessageKind) -> Message
    {
        Message {
            class,
            timestamp,
            checks,
            corrected,
            kind,
            summary: OnceLock::new(),
        }
    }

    /// Whether every non-advisory stage passed or corrected its errors.
    pub fn is_valid(&self) -> bool { self.checks.is_valid() }
    pub fn nac(&self) -> NetworkAccessCode { self.class.nac }
    /// Raw 4-bit data unit tag.
    pub fn duid(&self) -> u8 { self.class.duid }
    pub fn data_unit(&self) -> Option<DataUnit> { self.class.data_unit }
    pub fn timestamp(&self) -> u64 { self.timestamp }
    pub fn corrected_bits(&self) -> usize { self.corrected }
    /// Verdict of each FEC stage, in the order applied.
    pub fn checks(&self) -> &Checks { &self.checks }
    pub fn kind(&self) -> &MessageKind { &self.kind }
    pub fn label(&self) -> &'static str { self.kind.label() }

    /// Single-line description. Computed once, so frequencies resolved later aren't
    /// part of it.
    pub fn summary(&self) -> &str {
        self.summary.get_or_init(|| self.to_string())
    }

    /// Channels referenced by the message.
    pub fn channels(&self) -> Vec<&ChannelRef> { self.kind.channels() }

    /// Distinct band identifiers the message's channels need.
    pub fn frequency_band_identifiers(&self) -> Vec<u8> {
        let mut ids: Vec<u8> = self.channels().iter().map(|c| c.identifier()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Bind every channel waiting on the given band's identifier.
    ///
    /// Fails with `NotAwaited` if no channel references that identifier, and with
    /// `AlreadyBound` if any such channel is already bound to a different band. On
    /// failure no channel is bound.
    pub fn set_frequency_band(&self, band: FrequencyBand) -> Result<(), BandError> {
        let waiting: Vec<&ChannelRef> = self.channels().into_iter()
            .filter(|c| c.identifier() == band.identifier())
            .collect();

        if waiting.is_empty() {
            return Err(BandError::NotAwaited(band.identifier()));
        }

        if waiting.iter().any(|c| c.band().is_some_and(|b| *b != band)) {
            return Err(BandError::AlreadyBound(band.identifier()));
        }

        let band = Arc::new(band);

        waiting.iter().try_for_each(|c| c.bind(&band))
    }

    /// Bands announced by the message.
    pub fn frequency_bands(&self) -> Vec<FrequencyBand> {
        self.kind.frequency_band().into_iter().collect()
    }

    /// Downlink frequency in Hz of the primary channel, or 0 if there's no channel or
    /// its band is unknown.
    pub fn downlink_frequency(&self) -> u64 {
        self.kind.channel_pair().map_or(0, |(down, _)| down.downlink())
    }

    /// Uplink frequency in Hz of the primary channel, or 0 if there's no channel or its
    /// band is unknown.
    pub fn uplink_frequency(&self) -> u64 {
        self.kind.channel_pair().map_or(0, |(_, up)| up.uplink())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NAC:{}", self.class.nac)?;

        match self.class.data_unit {
            Some(du) => write!(f, " {}", du.label())?,
            None => write!(f, " DUID:{:X}", self.class.duid)?,
        }

        let kind = self.kind.to_string();

        if !kind.is_empty() {
            write!(f, " {}", kind)?;
        }

        if !self.is_valid() {
            f.write_str(" **CRC FAILED**")?;
        }

        Ok(())
    }
}
