//! Packet data units: a header block followed by zero or more data blocks.

use std::fmt;

use crate::band::ChannelRef;

pub mod ambtc;
pub mod block;
pub mod fields;
pub mod header;
pub mod sequence;

pub use self::block::DataBlock;
pub use self::header::PduHeader;
pub use self::sequence::{BlockOrder, PduSequence};

/// Decoded packet.
#[derive(Debug)]
pub enum Packet {
    /// User data that the receiver must acknowledge.
    Confirmed(PduSequence),
    /// User data sent without acknowledgement.
    Unconfirmed(PduSequence),
    /// Acknowledgement of an earlier confirmed packet.
    Response(PduSequence),
    GroupVoiceGrant(ambtc::GroupVoiceGrant),
    UnitVoiceGrant(ambtc::UnitVoiceGrant),
    AdjacentSiteStatus(ambtc::AdjacentSiteStatus),
    NetworkStatus(ambtc::NetworkStatusBroadcast),
    RoamingAddressUpdate(ambtc::RoamingAddressUpdate),
    Umbtc(ambtc::Umbtc),
    /// Packet of an unrecognized format, SAP, or opcode.
    Sequence(PduSequence),
}

impl Packet {
    /// Underlying header and blocks.
    pub fn sequence(&self) -> &PduSequence {
        use self::Packet::*;

        match *self {
            Confirmed(ref s) | Unconfirmed(ref s) | Response(ref s) | Sequence(ref s) => s,
            GroupVoiceGrant(ref p) => p.sequence(),
            UnitVoiceGrant(ref p) => p.sequence(),
            AdjacentSiteStatus(ref p) => p.sequence(),
            NetworkStatus(ref p) => p.sequence(),
            RoamingAddressUpdate(ref p) => p.sequence(),
            Umbtc(ref p) => p.sequence(),
        }
    }

    pub fn label(&self) -> &'static str {
        use self::Packet::*;

        match *self {
            Confirmed(_) => "CONFIRMED DATA",
            Unconfirmed(_) => "UNCONFIRMED DATA",
            Response(_) => "RESPONSE",
            GroupVoiceGrant(_) => "AMBTC GROUP VOICE GRANT",
            UnitVoiceGrant(_) => "AMBTC UNIT VOICE GRANT",
            AdjacentSiteStatus(_) => "AMBTC ADJACENT SITE STATUS",
            NetworkStatus(_) => "AMBTC NETWORK STATUS",
            RoamingAddressUpdate(_) => "AMBTC ROAMING ADDRESS UPDATE",
            Umbtc(_) => "UMBTC",
            Sequence(_) => "PACKET",
        }
    }

    /// Channels named by the packet, only those whose blocks arrived.
    pub fn channels(&self) -> Vec<&ChannelRef> {
        use self::Packet::*;

        match *self {
            GroupVoiceGrant(ref p) => p.downlink().into_iter().chain(p.uplink()).collect(),
            UnitVoiceGrant(ref p) => p.downlink().into_iter().chain(p.uplink()).collect(),
            AdjacentSiteStatus(ref p) =>
                p.site().map(|s| s.channel()).into_iter().chain(p.uplink()).collect(),
            NetworkStatus(ref p) =>
                p.status().map(|s| s.channel()).into_iter().chain(p.uplink()).collect(),
            _ => vec![],
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Packet::*;

        f.write_str(self.label())?;

        match *self {
            Confirmed(ref s) | Unconfirmed(ref s) | Sequence(ref s) => {
                write!(f, " {}", s.header())?;

                if let Some(data) = s.user_data() {
                    write!(f, " BYTES:{}", data.len())?;
                } else {
                    write!(f, " RECEIVED:{}/{}", s.received_blocks(), s.expected_blocks())?;
                }

                Ok(())
            },
            Response(ref s) => {
                let h = s.header();
                write!(f, " {} FROM:{} TO:{}", h.response(), h.response_source(),
                       h.logical_link())
            },
            GroupVoiceGrant(ref p) => {
                write!(f, " SRC:{}", p.src_unit())?;

                if let Some(tg) = p.talkgroup() {
                    write!(f, " TG:{}", tg)?;
                }

                if let (Some(dn), Some(up)) = (p.downlink(), p.uplink()) {
                    write!(f, " DN:{} UP:{}", dn, up)?;
                }

                write!(f, " {}", p.opts())
            },
            UnitVoiceGrant(ref p) => {
                if let Some(src) = p.src_unit() {
                    write!(f, " FROM:{}", src)?;
                }

                write!(f, " TO:{}", p.dest_unit())?;

                if let (Some(dn), Some(up)) = (p.downlink(), p.uplink()) {
                    write!(f, " DN:{} UP:{}", dn, up)?;
                }

                Ok(())
            },
            AdjacentSiteStatus(ref p) => match (p.site(), p.uplink()) {
                (Some(s), Some(up)) => write!(f, " {} UP:{}", s, up),
                _ => Ok(()),
            },
            NetworkStatus(ref p) => match (p.status(), p.uplink()) {
                (Some(s), Some(up)) => write!(f, " {} UP:{}", s, up),
                _ => Ok(()),
            },
            RoamingAddressUpdate(ref p) => write!(f, " {}", p),
            Umbtc(ref p) => match p.opcode() {
                Some(op) => write!(f, " OPCODE:{:02X}", op),
                None => Ok(()),
            },
        }
    }
}
