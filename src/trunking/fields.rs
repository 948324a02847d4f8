//! Field types shared by trunking blocks, link control words, and trunking packets.
//!
//! Most site and channel broadcasts have the same 8-byte layout whether they're
//! carried in a TSBK (bytes 2..=9) or a link control word (bytes 1..=8), so the
//! parsers here take that 8-byte payload.

use std::fmt;

use crate::band::{ChannelRef, FrequencyBand};
use crate::util::{slice_u16, slice_u24, wacn_system};

/// Options requested/granted for a traffic channel.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ServiceOptions(u8);

impl ServiceOptions {
    pub fn new(opts: u8) -> ServiceOptions { ServiceOptions(opts) }

    pub fn emergency(&self) -> bool { self.0 >> 7 == 1 }
    pub fn protected(&self) -> bool { self.0 >> 6 & 1 == 1 }
    pub fn duplex(&self) -> bool { self.0 >> 5 & 1 == 1 }
    pub fn packet_switched(&self) -> bool { self.0 >> 4 & 1 == 1 }
    pub fn prio(&self) -> u8 { self.0 & 0x7 }
}

impl fmt::Display for ServiceOptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.emergency() {
            f.write_str("EMERGENCY ")?;
        }

        if self.protected() {
            f.write_str("ENCRYPTED ")?;
        }

        if self.duplex() {
            f.write_str("DUPLEX ")?;
        }

        if self.packet_switched() {
            f.write_str("PACKET ")?;
        }

        write!(f, "PRI:{}", self.prio())
    }
}

/// Identifies which group a message belongs to.
///
/// In a production P25 system, users can set their radios to receive one or more
/// talkgroups, and the radio will only unsquelch if one of those talkgroups is seen.
/// Additionally, the user directs each transmission to a talkgroup selected on the
/// radio.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TalkGroup {
    /// Includes nobody.
    Nobody,
    /// Default talkgroup when no other is selected.
    Default,
    /// Includes everybody.
    Everybody,
    /// Specific group of users.
    Other(u16),
}

impl TalkGroup {
    /// Parse a talkgroup from the given 16 bit slice.
    pub fn new(bytes: &[u8]) -> TalkGroup {
        Self::from_bits(slice_u16(bytes))
    }

    /// Parse a talkgroup from the given 16 bits.
    pub fn from_bits(bits: u16) -> TalkGroup {
        use self::TalkGroup::*;

        match bits {
            0x0000 => Nobody,
            0x0001 => Default,
            0xFFFF => Everybody,
            _ => Other(bits),
        }
    }

    pub fn to_bits(&self) -> u16 {
        use self::TalkGroup::*;

        match *self {
            Nobody => 0x0000,
            Default => 0x0001,
            Everybody => 0xFFFF,
            Other(bits) => bits,
        }
    }
}

impl fmt::Display for TalkGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::TalkGroup::*;

        match *self {
            Nobody => f.write_str("NONE"),
            Default => f.write_str("DEFAULT"),
            Everybody => f.write_str("ALL"),
            Other(bits) => write!(f, "{}", bits),
        }
    }
}

/// Services offered by a site.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SystemServices(u8);

impl SystemServices {
    pub fn new(ssc: u8) -> Self { SystemServices(ssc) }

    pub fn bits(&self) -> u8 { self.0 }

    pub fn is_composite(&self) -> bool { self.0 & 0x01 != 0 }
    pub fn has_updates(&self) -> bool { self.0 & 0x02 != 0 }
    pub fn is_backup(&self) -> bool { self.0 & 0x04 != 0 }
    pub fn has_data(&self) -> bool { self.0 & 0x10 != 0 }
    pub fn has_voice(&self) -> bool { self.0 & 0x20 != 0 }
    pub fn has_registration(&self) -> bool { self.0 & 0x40 != 0 }
    pub fn has_auth(&self) -> bool { self.0 & 0x80 != 0 }
}

impl fmt::Display for SystemServices {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02X}", self.0)
    }
}

/// Options for a P25 site.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SiteOptions(u8);

impl SiteOptions {
    /// Create a new `SiteOptions` from the given 4-bit word.
    pub fn new(opts: u8) -> SiteOptions {
        assert!(opts >> 4 == 0);
        SiteOptions(opts)
    }

    /// Whether site is "conventional", with no trunking.
    pub fn conventional(&self) -> bool { self.0 & 0b1000 != 0 }
    /// Whether site is in a failure state.
    pub fn failing(&self) -> bool { self.0 & 0b100 != 0 }
    /// Whether this information is up-to-date (whether broadcasting site is in
    /// communication with adjacent site.)
    pub fn current(&self) -> bool { self.0 & 0b10 != 0 }
    /// Whether site has active network connection with RFSS controller and can
    /// communicate with other sites.
    pub fn networked(&self) -> bool { self.0 & 1 != 0 }
}

/// Represents the channel updates seen in a group voice update or group data
/// announcement.
pub type ChannelUpdates = [(ChannelRef, TalkGroup); 2];

/// Parse out the pair of channels/talkgroups found in a channel update.
pub fn parse_updates(buf: &[u8]) -> ChannelUpdates {
    [
        (ChannelRef::from_bytes(&buf[0..=1]), TalkGroup::new(&buf[2..=3])),
        (ChannelRef::from_bytes(&buf[4..=5]), TalkGroup::new(&buf[6..=7])),
    ]
}

/// Advertisement of a site within the same WACN (Wide Area Communication Network),
/// either an adjacent one or the broadcasting one.
#[derive(Clone, Debug)]
pub struct SiteStatus {
    area: u8,
    opts: SiteOptions,
    system: u16,
    rfss: u8,
    site: u8,
    channel: ChannelRef,
    services: SystemServices,
}

impl SiteStatus {
    /// Parse the 8-byte payload.
    pub fn new(p: &[u8]) -> SiteStatus {
        SiteStatus {
            area: p[0],
            opts: SiteOptions::new(p[1] >> 4),
            system: slice_u16(&p[1..=2]) & 0xFFF,
            rfss: p[3],
            site: p[4],
            channel: ChannelRef::from_bytes(&p[5..=6]),
            services: SystemServices::new(p[7]),
        }
    }

    /// Location registration area of site, which determines whether a subscriber must
    /// update the network before roaming to the site.
    pub fn area(&self) -> u8 { self.area }
    /// Description of site.
    pub fn opts(&self) -> SiteOptions { self.opts }
    /// System ID of site within WACN.
    pub fn system(&self) -> u16 { self.system }
    /// RF Subsystem ID of site within the System.
    pub fn rfss(&self) -> u8 { self.rfss }
    /// Site ID of site within the RFSS.
    pub fn site(&self) -> u8 { self.site }
    /// Control channel of the site.
    pub fn channel(&self) -> &ChannelRef { &self.channel }
    /// Services supported by the site.
    pub fn services(&self) -> SystemServices { self.services }
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LRA:{:02X} SYS:{:03X} SITE:{:02X}-{:02X} CHAN:{} SVC:{}",
               self.area, self.system, self.rfss, self.site, self.channel, self.services)
    }
}

/// Advertisement of the WACN and system a site belongs to.
#[derive(Clone, Debug)]
pub struct NetworkStatus {
    area: u8,
    wacn: u32,
    system: u16,
    channel: ChannelRef,
    services: SystemServices,
}

impl NetworkStatus {
    /// Parse the 8-byte payload.
    pub fn new(p: &[u8]) -> NetworkStatus {
        let (wacn, system) = wacn_system(&p[1..=4]);

        NetworkStatus {
            area: p[0],
            wacn,
            system,
            channel: ChannelRef::from_bytes(&p[5..=6]),
            services: SystemServices::new(p[7]),
        }
    }

    pub fn area(&self) -> u8 { self.area }
    /// 20-bit wide area network id.
    pub fn wacn(&self) -> u32 { self.wacn }
    pub fn system(&self) -> u16 { self.system }
    pub fn channel(&self) -> &ChannelRef { &self.channel }
    pub fn services(&self) -> SystemServices { self.services }
}

impl fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "WACN:{:05X} SYS:{:03X} CHAN:{} SVC:{}",
               self.wacn, self.system, self.channel, self.services)
    }
}

/// Advertisement of up to two backup control channels at the current site.
#[derive(Clone, Debug)]
pub struct SecondaryControl {
    rfss: u8,
    site: u8,
    channels: [(ChannelRef, SystemServices); 2],
}

impl SecondaryControl {
    /// Parse the 8-byte payload.
    pub fn new(p: &[u8]) -> SecondaryControl {
        SecondaryControl {
            rfss: p[0],
            site: p[1],
            channels: [
                (ChannelRef::from_bytes(&p[2..=3]), SystemServices::new(p[4])),
                (ChannelRef::from_bytes(&p[5..=6]), SystemServices::new(p[7])),
            ],
        }
    }

    pub fn rfss(&self) -> u8 { self.rfss }
    pub fn site(&self) -> u8 { self.site }
    pub fn channels(&self) -> &[(ChannelRef, SystemServices); 2] { &self.channels }
}

impl fmt::Display for SecondaryControl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SITE:{:02X}-{:02X} CHAN A:{} SVC:{} CHAN B:{} SVC:{}",
               self.rfss, self.site, self.channels[0].0, self.channels[0].1,
               self.channels[1].0, self.channels[1].1)
    }
}

/// Services available and supported system wide.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ServiceBroadcast {
    priority: u8,
    available: u32,
    supported: u32,
}

impl ServiceBroadcast {
    /// Parse the 8-byte payload.
    pub fn new(p: &[u8]) -> ServiceBroadcast {
        ServiceBroadcast {
            priority: p[1] & 0xF,
            available: slice_u24(&p[2..=4]),
            supported: slice_u24(&p[5..=7]),
        }
    }

    /// Minimum priority level for requests.
    pub fn priority(&self) -> u8 { self.priority }
    pub fn available(&self) -> u32 { self.available }
    pub fn supported(&self) -> u32 { self.supported }
}

impl fmt::Display for ServiceBroadcast {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AVAIL:{:06X} SUPPORT:{:06X} PRI:{}",
               self.available, self.supported, self.priority)
    }
}

/// Flavor of identifier update, which determines the payload layout.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UpdateLayout {
    Plain,
    VhfUhf,
    Tdma,
}

/// Parse an identifier update payload in the given layout.
pub fn parse_band(layout: UpdateLayout, p: &[u8]) -> FrequencyBand {
    match layout {
        UpdateLayout::Plain => FrequencyBand::from_update(p),
        UpdateLayout::VhfUhf => FrequencyBand::from_vuhf_update(p),
        UpdateLayout::Tdma => FrequencyBand::from_tdma_update(p),
    }
}
