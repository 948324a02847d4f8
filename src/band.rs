//! Channel to frequency resolution.
//!
//! Grants and status broadcasts name channels by a 4-bit band identifier and a
//! 12-bit channel number. The parameters needed to turn that into a frequency arrive
//! separately in identifier update messages, possibly before, after, or never. Each
//! `ChannelRef` owns a write-once `BandSlot`, and a per-channel `BandResolver` caches
//! announced bands and binds slots as their bands become known.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

#[cfg(feature = "ser")]
use serde::{Deserialize, Serialize};

use tracing::{debug, warn};

use crate::error::BandError;
use crate::message::Message;
use crate::util::{slice_u16, slice_u32};

/// Parameters used to compute frequencies for the channels of one band identifier.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "ser", derive(Serialize, Deserialize))]
pub struct FrequencyBand {
    identifier: u8,
    /// Base downlink frequency in Hz.
    base: u64,
    /// Spacing between channel numbers in Hz.
    spacing: u64,
    /// Channel bandwidth in Hz.
    bandwidth: u64,
    /// Uplink offset from downlink in Hz.
    transmit_offset: i64,
    /// TDMA slots per physical channel, 1 for FDMA.
    timeslots: u8,
}

impl FrequencyBand {
    pub fn new(identifier: u8, base: u64, spacing: u64, bandwidth: u64,
               transmit_offset: i64, timeslots: u8) -> FrequencyBand
    {
        assert!(identifier >> 4 == 0);
        assert!(timeslots > 0);

        FrequencyBand {
            identifier,
            base,
            spacing,
            bandwidth,
            transmit_offset,
            timeslots,
        }
    }

    /// Parse the 8-byte payload of a plain identifier update: identifier (4 bits),
    /// bandwidth (9 bits, 125Hz steps), offset (9 bits, 250kHz steps), spacing (10
    /// bits, 125Hz steps), base frequency (32 bits, 5Hz steps.)
    pub fn from_update(p: &[u8]) -> FrequencyBand {
        let bandwidth = (p[0] as u16 & 0xF) << 5 | (p[1] >> 3) as u16;
        let offset = (p[1] as u16 & 0x7) << 6 | (p[2] >> 2) as u16;

        // The MSB denotes the sign and the lower byte is the actual offset.
        let off = (offset as i64 & 0xFF) * 250_000;

        FrequencyBand::new(
            p[0] >> 4,
            slice_u32(&p[4..=7]) as u64 * 5,
            spacing(p) * 125,
            bandwidth as u64 * 125,
            if offset >> 8 == 0 { -off } else { off },
            1,
        )
    }

    /// Parse the 8-byte payload of a VHF/UHF identifier update, which trades
    /// bandwidth bits for a wider offset field.
    pub fn from_vuhf_update(p: &[u8]) -> FrequencyBand {
        let bandwidth = match p[0] & 0xF {
            0x4 => 6_250,
            0x5 => 12_500,
            _ => 0,
        };

        FrequencyBand::new(p[0] >> 4, slice_u32(&p[4..=7]) as u64 * 5, spacing(p) * 125,
                           bandwidth, wide_offset(p), 1)
    }

    /// Parse the 8-byte payload of a TDMA identifier update, whose 4-bit channel type
    /// gives both bandwidth and slot count.
    pub fn from_tdma_update(p: &[u8]) -> FrequencyBand {
        let (bandwidth, timeslots) = match p[0] & 0xF {
            0 => (6_250, 1),
            1 | 2 => (12_500, 1),
            3 | 5 => (12_500, 2),
            4 => (25_000, 4),
            _ => (0, 1),
        };

        FrequencyBand::new(p[0] >> 4, slice_u32(&p[4..=7]) as u64 * 5, spacing(p) * 125,
                           bandwidth, wide_offset(p), timeslots)
    }

    pub fn identifier(&self) -> u8 { self.identifier }
    pub fn base(&self) -> u64 { self.base }
    pub fn spacing(&self) -> u64 { self.spacing }
    pub fn bandwidth(&self) -> u64 { self.bandwidth }
    pub fn transmit_offset(&self) -> i64 { self.transmit_offset }
    pub fn timeslots(&self) -> u8 { self.timeslots }
    pub fn is_tdma(&self) -> bool { self.timeslots > 1 }

    /// Downlink frequency in Hz of the given channel number.
    pub fn downlink(&self, number: u16) -> u64 {
        self.base + self.spacing * (number as u64 / self.timeslots as u64)
    }

    /// Uplink frequency in Hz of the given channel number.
    pub fn uplink(&self, number: u16) -> u64 {
        (self.downlink(number) as i64 + self.transmit_offset).max(0) as u64
    }
}

impl fmt::Display for FrequencyBand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ID:{} BASE:{} SPACING:{} OFFSET:{} BW:{}", self.identifier, self.base,
               self.spacing, self.transmit_offset, self.bandwidth)?;

        if self.is_tdma() {
            write!(f, " SLOTS:{}", self.timeslots)?;
        }

        Ok(())
    }
}

fn spacing(p: &[u8]) -> u64 {
    (p[2] as u64 & 0x3) << 8 | p[3] as u64
}

/// Sign bit plus 13-bit magnitude in 250kHz steps.
fn wide_offset(p: &[u8]) -> i64 {
    let bits = slice_u16(&p[1..=2]) >> 2;
    let off = (bits & 0x1FFF) as i64 * 250_000;

    if bits >> 13 == 0 { -off } else { off }
}

/// Write-once holder for the band a channel reference resolves against.
#[derive(Debug)]
pub struct BandSlot {
    identifier: u8,
    band: OnceLock<Arc<FrequencyBand>>,
}

impl BandSlot {
    fn new(identifier: u8) -> BandSlot {
        BandSlot {
            identifier,
            band: OnceLock::new(),
        }
    }

    pub fn identifier(&self) -> u8 { self.identifier }

    pub fn band(&self) -> Option<&FrequencyBand> { self.band.get().map(|b| &**b) }

    pub fn is_bound(&self) -> bool { self.band.get().is_some() }

    /// Bind the slot to the given band. Rebinding to an equal band is accepted and
    /// changes nothing.
    pub fn bind(&self, band: &Arc<FrequencyBand>) -> Result<(), BandError> {
        if band.identifier() != self.identifier {
            return Err(BandError::NotAwaited(band.identifier()));
        }

        let bound = self.band.get_or_init(|| band.clone());

        if **bound == **band {
            Ok(())
        } else {
            Err(BandError::AlreadyBound(self.identifier))
        }
    }
}

/// Channel named by band identifier and channel number.
///
/// Clones share the same slot, so binding through one binds them all.
#[derive(Clone, Debug)]
pub struct ChannelRef {
    number: u16,
    slot: Arc<BandSlot>,
}

impl ChannelRef {
    pub fn new(identifier: u8, number: u16) -> ChannelRef {
        assert!(identifier >> 4 == 0);
        assert!(number >> 12 == 0);

        ChannelRef {
            number,
            slot: Arc::new(BandSlot::new(identifier)),
        }
    }

    /// Parse the common 16-bit layout: 4-bit identifier, 12-bit channel number.
    pub fn from_bits(bits: u16) -> ChannelRef {
        ChannelRef::new((bits >> 12) as u8, bits & 0xFFF)
    }

    /// Parse a channel from the two given bytes.
    pub fn from_bytes(bytes: &[u8]) -> ChannelRef {
        ChannelRef::from_bits(slice_u16(bytes))
    }

    pub fn identifier(&self) -> u8 { self.slot.identifier() }
    pub fn number(&self) -> u16 { self.number }
    pub fn band(&self) -> Option<&FrequencyBand> { self.slot.band() }
    pub fn is_resolved(&self) -> bool { self.slot.is_bound() }

    /// Downlink frequency in Hz, or 0 while the band is unknown.
    pub fn downlink(&self) -> u64 {
        self.band().map_or(0, |b| b.downlink(self.number))
    }

    /// Uplink frequency in Hz, or 0 while the band is unknown.
    pub fn uplink(&self) -> u64 {
        self.band().map_or(0, |b| b.uplink(self.number))
    }

    /// Bandwidth in Hz, or 0 while the band is unknown.
    pub fn bandwidth(&self) -> u64 {
        self.band().map_or(0, |b| b.bandwidth())
    }

    pub fn bind(&self, band: &Arc<FrequencyBand>) -> Result<(), BandError> {
        self.slot.bind(band)
    }

    fn handle(&self) -> Weak<BandSlot> { Arc::downgrade(&self.slot) }
}

impl PartialEq for ChannelRef {
    fn eq(&self, other: &ChannelRef) -> bool {
        self.identifier() == other.identifier() && self.number == other.number
    }
}

impl Eq for ChannelRef {}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.identifier(), self.number)
    }
}

/// Per-channel cache of announced bands plus the slots still waiting on one.
#[derive(Debug, Default)]
pub struct BandResolver {
    bands: HashMap<u8, Arc<FrequencyBand>>,
    /// Unbound slots, dropped once bound or once their message is gone.
    pending: Vec<Weak<BandSlot>>,
}

impl BandResolver {
    pub fn new() -> BandResolver { BandResolver::default() }

    /// Cached band for the given identifier.
    pub fn band(&self, identifier: u8) -> Option<&FrequencyBand> {
        self.bands.get(&identifier).map(|b| &**b)
    }

    /// Number of cached bands.
    pub fn len(&self) -> usize { self.bands.len() }

    pub fn is_empty(&self) -> bool { self.bands.is_empty() }

    /// Number of live slots waiting on a band.
    pub fn pending(&self) -> usize {
        self.pending.iter().filter(|w| is_waiting(w)).count()
    }

    /// Learn the bands announced by the given message if it's valid, then bind or park
    /// every channel it references.
    pub fn process(&mut self, msg: &Message) {
        if msg.is_valid() {
            for band in msg.frequency_bands() {
                self.insert(band);
            }
        }

        for ch in msg.channels() {
            self.resolve(ch);
        }
    }

    /// Cache the given band. The first band seen for an identifier wins; a conflicting
    /// later one is ignored. Return whether the band was new.
    pub fn insert(&mut self, band: FrequencyBand) -> bool {
        match self.bands.entry(band.identifier()) {
            Entry::Vacant(e) => {
                debug!(band = %band, "learned frequency band");
                e.insert(Arc::new(band));
            },
            Entry::Occupied(e) => {
                if **e.get() != band {
                    warn!(cached = %e.get(), announced = %band,
                          "ignoring conflicting frequency band");
                }

                return false;
            },
        }

        self.bind_pending();
        true
    }

    /// Bind the given channel if its band is known, otherwise park it until the band
    /// arrives.
    pub fn resolve(&mut self, ch: &ChannelRef) {
        if ch.is_resolved() {
            return;
        }

        match self.bands.get(&ch.identifier()) {
            Some(band) => {
                if let Err(e) = ch.bind(band) {
                    debug!(channel = %ch, error = %e, "channel bind rejected");
                }
            },
            None => {
                self.prune();
                self.pending.push(ch.handle());
            },
        }
    }

    /// Drop handles whose message is gone or whose slot is already bound, so the
    /// pending list only holds live waiters.
    fn prune(&mut self) {
        self.pending.retain(is_waiting);
    }

    fn bind_pending(&mut self) {
        let bands = &self.bands;

        self.pending.retain(|w| {
            let slot = match w.upgrade() {
                Some(slot) => slot,
                None => return false,
            };

            if slot.is_bound() {
                return false;
            }

            match bands.get(&slot.identifier()) {
                Some(band) => {
                    slot.bind(band).is_err()
                },
                None => true,
            }
        });
    }
}

fn is_waiting(slot: &Weak<BandSlot>) -> bool {
    slot.upgrade().is_some_and(|s| !s.is_bound())
}

#[cfg(test)]
mod test {
    use super::*;

    fn band_3() -> Arc<FrequencyBand> {
        Arc::new(FrequencyBand::new(3, 851_006_250, 6_250, 12_500, -45_000_000, 1))
    }

    #[test]
    fn test_from_update() {
        // Example from the standard.
        let b = FrequencyBand::from_update(&[0x33, 0x22, 0xD0, 0x32,
                                             0x0A, 0x25, 0x10, 0xA2]);

        assert_eq!(b.identifier(), 3);
        assert_eq!(b.base(), 851_006_250);
        assert_eq!(b.spacing(), 6_250);
        assert_eq!(b.transmit_offset(), -45_000_000);
        assert_eq!(b.bandwidth(), 12_500);
        assert_eq!(b.timeslots(), 1);
        assert_eq!(b.downlink(0b1001), 851_062_500);
        assert_eq!(b.uplink(0b1001), 806_062_500);
    }

    #[test]
    fn test_from_vuhf_update() {
        let b = FrequencyBand::from_vuhf_update(&[0x25, 0x80, 0x50, 0x64,
                                                  0x05, 0x5D, 0x4A, 0x80]);

        assert_eq!(b.identifier(), 2);
        assert_eq!(b.bandwidth(), 12_500);
        assert_eq!(b.base(), 450_000_000);
        assert_eq!(b.spacing(), 12_500);
        assert_eq!(b.transmit_offset(), 5_000_000);
        assert_eq!(b.downlink(8), 450_100_000);
        assert_eq!(b.uplink(8), 455_100_000);
    }

    #[test]
    fn test_from_tdma_update() {
        let b = FrequencyBand::from_tdma_update(&[0x43, 0x02, 0xD0, 0x32,
                                                  0x0A, 0x25, 0x10, 0xA2]);

        assert_eq!(b.identifier(), 4);
        assert_eq!(b.timeslots(), 2);
        assert!(b.is_tdma());
        assert_eq!(b.bandwidth(), 12_500);
        assert_eq!(b.transmit_offset(), -45_000_000);
        assert_eq!(b.downlink(10), 851_037_500);
        assert_eq!(b.downlink(11), 851_037_500);
        assert_eq!(b.uplink(10), 806_037_500);
    }

    #[test]
    fn test_channel_ref() {
        let ch = ChannelRef::from_bits(0x3064);

        assert_eq!(ch.identifier(), 3);
        assert_eq!(ch.number(), 100);
        assert_eq!(ch.to_string(), "3-100");
        assert_eq!(ch.downlink(), 0);
        assert_eq!(ch.uplink(), 0);

        let other = Arc::new(FrequencyBand::new(4, 1, 1, 1, 0, 1));
        assert_eq!(ch.bind(&other), Err(BandError::NotAwaited(4)));
        assert!(!ch.is_resolved());

        assert_eq!(ch.bind(&band_3()), Ok(()));
        assert_eq!(ch.downlink(), 851_006_250 + 6_250 * 100);
        assert_eq!(ch.uplink(), 851_006_250 + 6_250 * 100 - 45_000_000);
        assert_eq!(ch.bandwidth(), 12_500);

        // Same parameters again is fine.
        assert_eq!(ch.bind(&band_3()), Ok(()));

        let moved = Arc::new(FrequencyBand::new(3, 770_000_000, 12_500, 12_500, 0, 1));
        assert_eq!(ch.bind(&moved), Err(BandError::AlreadyBound(3)));
        assert_eq!(ch.downlink(), 851_631_250);

        // Clones share the binding.
        assert!(ch.clone().is_resolved());
    }

    #[test]
    fn test_resolver_late_band() {
        let mut r = BandResolver::new();
        let ch = ChannelRef::new(3, 100);

        r.resolve(&ch);
        assert_eq!(r.pending(), 1);
        assert_eq!(ch.downlink(), 0);

        assert!(r.insert(*band_3()));
        assert!(ch.is_resolved());
        assert_eq!(ch.downlink(), 851_631_250);
        assert_eq!(r.pending(), 0);
    }

    #[test]
    fn test_resolver_early_band() {
        let mut r = BandResolver::new();
        r.insert(*band_3());

        let ch = ChannelRef::new(3, 1);
        r.resolve(&ch);

        assert_eq!(ch.downlink(), 851_012_500);
        assert_eq!(r.pending(), 0);
    }

    #[test]
    fn test_resolver_conflict() {
        let mut r = BandResolver::new();

        assert!(r.insert(*band_3()));
        assert!(!r.insert(*band_3()));
        assert!(!r.insert(FrequencyBand::new(3, 770_000_000, 12_500, 12_500, 0, 1)));

        assert_eq!(r.len(), 1);
        assert_eq!(r.band(3).map(|b| b.base()), Some(851_006_250));
    }

    #[test]
    fn test_resolver_dropped() {
        let mut r = BandResolver::new();

        {
            let ch = ChannelRef::new(5, 7);
            r.resolve(&ch);
            assert_eq!(r.pending(), 1);
        }

        assert_eq!(r.pending(), 0);

        r.insert(FrequencyBand::new(5, 1000, 10, 10, 0, 1));
        assert!(r.pending.is_empty());
    }

    #[test]
    fn test_resolver_unannounced_bounded() {
        let mut r = BandResolver::new();
        let kept = ChannelRef::new(7, 1);
        r.resolve(&kept);

        for _ in 0..10_000 {
            r.resolve(&ChannelRef::new(7, 100));
        }

        assert_eq!(r.pending(), 1);
        assert!(r.pending.len() <= 2);

        // Slots bound behind the resolver's back are dropped too.
        let other = ChannelRef::new(7, 2);
        r.resolve(&other);
        other.bind(&Arc::new(FrequencyBand::new(7, 1000, 10, 10, 0, 1))).expect("bind");
        assert_eq!(r.pending(), 1);

        let last = ChannelRef::new(7, 3);
        r.resolve(&last);

        assert_eq!(r.pending.len(), 2);
        assert_eq!(r.pending(), 2);
    }

    #[test]
    fn test_resolver_independent_ids() {
        let mut r = BandResolver::new();
        let down = ChannelRef::new(3, 10);
        let up = ChannelRef::new(4, 10);

        r.resolve(&down);
        r.resolve(&up);

        r.insert(*band_3());
        assert!(down.is_resolved());
        assert!(!up.is_resolved());

        r.insert(FrequencyBand::new(4, 806_000_000, 12_500, 12_500, 0, 1));
        assert_eq!(up.downlink(), 806_125_000);
    }
}
