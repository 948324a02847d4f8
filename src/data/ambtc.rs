//! Alternate and unconfirmed multi-block trunking control (AMBTC, UMBTC) packets.
//!
//! These carry the same messages as trunking blocks, with the header holding the
//! opcode and a couple of argument bytes and the data blocks holding the rest. Fields
//! read from a data block are `None` when that block is missing.

use std::fmt;
use std::sync::OnceLock;

use crate::band::ChannelRef;
use crate::data::block::DataBlock;
use crate::data::sequence::PduSequence;
use crate::trunking::fields::{NetworkStatus, ServiceOptions, SiteStatus, TalkGroup};
use crate::util::slice_u24;

/// Rearrange the header arguments and first 6 bytes of block 0 into the 8-byte layout
/// shared with the single-block status broadcasts.
fn status_payload(seq: &PduSequence, block: &DataBlock) -> [u8; 8] {
    let [area, services] = seq.header().opcode_args();
    let b = block.data();

    [area, b[0], b[1], b[2], b[3], b[4], b[5], services]
}

/// Downlink and uplink channels at the start of block 0.
fn channel_pair(seq: &PduSequence) -> Option<(ChannelRef, ChannelRef)> {
    seq.data_block(0).map(|b| {
        let b = b.data();
        (ChannelRef::from_bytes(&b[0..=1]), ChannelRef::from_bytes(&b[2..=3]))
    })
}

/// Talkgroup call on a separate downlink/uplink channel pair.
#[derive(Debug)]
pub struct GroupVoiceGrant {
    seq: PduSequence,
    channels: OnceLock<Option<(ChannelRef, ChannelRef)>>,
}

impl GroupVoiceGrant {
    pub fn new(seq: PduSequence) -> Self {
        GroupVoiceGrant { seq, channels: OnceLock::new() }
    }

    fn channels(&self) -> Option<&(ChannelRef, ChannelRef)> {
        self.channels.get_or_init(|| channel_pair(&self.seq)).as_ref()
    }

    pub fn sequence(&self) -> &PduSequence { &self.seq }
    pub fn opts(&self) -> ServiceOptions {
        ServiceOptions::new(self.seq.header().opcode_args()[0])
    }
    /// Unit that started the call.
    pub fn src_unit(&self) -> u32 { self.seq.header().logical_link() }
    pub fn downlink(&self) -> Option<&ChannelRef> { self.channels().map(|c| &c.0) }
    pub fn uplink(&self) -> Option<&ChannelRef> { self.channels().map(|c| &c.1) }

    pub fn talkgroup(&self) -> Option<TalkGroup> {
        self.seq.data_block(0).map(|b| TalkGroup::new(&b.data()[4..=5]))
    }
}

/// Unit-to-unit call on a separate downlink/uplink channel pair.
#[derive(Debug)]
pub struct UnitVoiceGrant {
    seq: PduSequence,
    channels: OnceLock<Option<(ChannelRef, ChannelRef)>>,
}

impl UnitVoiceGrant {
    pub fn new(seq: PduSequence) -> Self {
        UnitVoiceGrant { seq, channels: OnceLock::new() }
    }

    fn channels(&self) -> Option<&(ChannelRef, ChannelRef)> {
        self.channels.get_or_init(|| channel_pair(&self.seq)).as_ref()
    }

    pub fn sequence(&self) -> &PduSequence { &self.seq }
    pub fn dest_unit(&self) -> u32 { self.seq.header().logical_link() }

    pub fn src_unit(&self) -> Option<u32> {
        self.seq.data_block(0).map(|b| slice_u24(&b.data()[4..=6]))
    }

    pub fn downlink(&self) -> Option<&ChannelRef> { self.channels().map(|c| &c.0) }
    pub fn uplink(&self) -> Option<&ChannelRef> { self.channels().map(|c| &c.1) }
}

/// Adjacent site broadcast with an explicit uplink channel.
#[derive(Debug)]
pub struct AdjacentSiteStatus {
    seq: PduSequence,
    site: OnceLock<Option<(SiteStatus, ChannelRef)>>,
}

impl AdjacentSiteStatus {
    pub fn new(seq: PduSequence) -> Self {
        AdjacentSiteStatus { seq, site: OnceLock::new() }
    }

    fn fields(&self) -> Option<&(SiteStatus, ChannelRef)> {
        self.site.get_or_init(|| {
            self.seq.data_block(0).map(|b| {
                (SiteStatus::new(&status_payload(&self.seq, b)),
                 ChannelRef::from_bytes(&b.data()[6..=7]))
            })
        }).as_ref()
    }

    pub fn sequence(&self) -> &PduSequence { &self.seq }
    /// Area, system, site, downlink channel, and services of the site.
    pub fn site(&self) -> Option<&SiteStatus> { self.fields().map(|s| &s.0) }
    pub fn uplink(&self) -> Option<&ChannelRef> { self.fields().map(|s| &s.1) }
}

/// Network broadcast with an explicit uplink channel.
#[derive(Debug)]
pub struct NetworkStatusBroadcast {
    seq: PduSequence,
    status: OnceLock<Option<(NetworkStatus, ChannelRef)>>,
}

impl NetworkStatusBroadcast {
    pub fn new(seq: PduSequence) -> Self {
        NetworkStatusBroadcast { seq, status: OnceLock::new() }
    }

    fn fields(&self) -> Option<&(NetworkStatus, ChannelRef)> {
        self.status.get_or_init(|| {
            self.seq.data_block(0).map(|b| {
                (NetworkStatus::new(&status_payload(&self.seq, b)),
                 ChannelRef::from_bytes(&b.data()[6..=7]))
            })
        }).as_ref()
    }

    pub fn sequence(&self) -> &PduSequence { &self.seq }
    pub fn status(&self) -> Option<&NetworkStatus> { self.fields().map(|s| &s.0) }
    pub fn uplink(&self) -> Option<&ChannelRef> { self.fields().map(|s| &s.1) }
}

/// Most roaming addresses a single update can carry.
pub const MAX_ROAMING_ADDRESSES: usize = 7;

/// Bits of the first address carried in the header.
const ROAMING_HEADER_BITS: usize = 8;
/// Bits per address: 20-bit WACN and 12-bit system.
const ROAMING_ENTRY_BITS: usize = 32;

/// List of WACN/system pairs a unit may roam to.
///
/// Addresses run back to back starting in the last header byte and continuing through
/// the data blocks; the last block holds the tail of the final address followed by
/// the source unit.
#[derive(Debug)]
pub struct RoamingAddressUpdate {
    seq: PduSequence,
    addresses: OnceLock<Vec<Option<(u32, u16)>>>,
}

impl RoamingAddressUpdate {
    pub fn new(seq: PduSequence) -> Self {
        RoamingAddressUpdate { seq, addresses: OnceLock::new() }
    }

    pub fn sequence(&self) -> &PduSequence { &self.seq }
    pub fn dest_unit(&self) -> u32 { self.seq.header().logical_link() }
    /// Whether this is the last update of the series.
    pub fn last(&self) -> bool { self.seq.header().bits().bit(64) }
    /// Message sequence number within the series.
    pub fn sequence_number(&self) -> u8 { self.seq.header().bits().int(68..72) as u8 }

    /// WACN and system of each address, `None` where a block it spans is missing.
    pub fn addresses(&self) -> &[Option<(u32, u16)>] {
        self.addresses.get_or_init(|| {
            let blocks = self.seq.expected_blocks();
            let count = if blocks == 0 {
                0
            } else {
                (1 + 3 * (blocks - 1)).min(MAX_ROAMING_ADDRESSES)
            };

            (0..count).map(|k| {
                let bits = roaming_bits(&self.seq, k * ROAMING_ENTRY_BITS, ROAMING_ENTRY_BITS)?;
                Some(((bits >> 12) as u32, (bits & 0xFFF) as u16))
            }).collect()
        })
    }

    /// Source unit, from the last block.
    pub fn src_unit(&self) -> Option<u32> {
        self.seq.expected_blocks().checked_sub(1)
            .and_then(|last| self.seq.data_block(last))
            .map(|b| slice_u24(&b.data()[3..=5]))
    }
}

/// Read `width` bits starting at `start` of the address stream.
fn roaming_bits(seq: &PduSequence, start: usize, width: usize) -> Option<u64> {
    (start..start + width).try_fold(0, |word, pos| {
        let bit = if pos < ROAMING_HEADER_BITS {
            seq.header().bits().bit(72 + pos)
        } else {
            let pos = pos - ROAMING_HEADER_BITS;
            let data = seq.data_block(pos / 96)?.data();
            let off = pos % 96;

            data[off / 8] >> (7 - off % 8) & 1 == 1
        };

        Some(word << 1 | bit as u64)
    })
}

/// Unconfirmed multi-block trunking packet, classified by the opcode in its first
/// block.
#[derive(Debug)]
pub struct Umbtc {
    seq: PduSequence,
}

impl Umbtc {
    pub fn new(seq: PduSequence) -> Self { Umbtc { seq } }

    pub fn sequence(&self) -> &PduSequence { &self.seq }
    /// Opcode from block 0, if it arrived.
    pub fn opcode(&self) -> Option<u8> {
        self.seq.data_block(0).map(|b| b.data()[0] & 0x3F)
    }
}

impl fmt::Display for RoamingAddressUpdate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TO:{}", self.dest_unit())?;

        for (i, a) in self.addresses().iter().enumerate() {
            if let Some((wacn, sys)) = a {
                write!(f, " {}:{:05X}-{:03X}", (b'A' + i as u8) as char, wacn, sys)?;
            }
        }

        write!(f, " MSN:{}", self.sequence_number())?;

        if self.last() {
            f.write_str(" FINAL")?;
        }

        Ok(())
    }
}
