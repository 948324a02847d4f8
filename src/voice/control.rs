//! Decode Link Control (LC) words and payloads, carried by LDU1 frame groups and
//! TDULC terminators.

use std::fmt;

use crate::band::{ChannelRef, FrequencyBand};
use crate::classify::{self, Opcode};
use crate::trunking::fields::{
    ChannelUpdates,
    NetworkStatus,
    SecondaryControl,
    ServiceBroadcast,
    ServiceOptions,
    SiteStatus,
    TalkGroup,
};
use crate::util::{slice_u16, slice_u24, wacn_system};

/// Number of bytes in a link control word.
pub const LINK_CONTROL_BYTES: usize = 9;

/// Buffer of bytes that represents a link control word.
pub type Buf = [u8; LINK_CONTROL_BYTES];

/// Base link control decoder, common to all words.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LinkControlFields(Buf);

impl LinkControlFields {
    /// Interpret the given bytes as a link control word.
    pub fn new(buf: Buf) -> Self { LinkControlFields(buf) }

    /// Whether the word is encrypted.
    pub fn protected(&self) -> bool { self.0[0] >> 7 == 1 }

    /// Whether byte 1 names the vendor.
    pub fn explicit(&self) -> bool { self.0[0] >> 6 & 1 == 1 }

    /// Opcode and vendor of the payload.
    pub fn opcode(&self) -> Opcode { classify::link_control(&self.0) }

    /// Bytes that make up the payload.
    pub fn payload(&self) -> &[u8] { &self.0[1..=8] }

    /// Full word, including the opcode byte.
    pub fn bytes(&self) -> &Buf { &self.0 }
}

/// Identity of unit transmitting on the current talkgroup traffic channel.
#[derive(Copy, Clone, Debug)]
pub struct GroupVoiceUser(Buf);

impl GroupVoiceUser {
    pub fn new(lc: LinkControlFields) -> Self { GroupVoiceUser(lc.0) }

    /// Manufacturer ID of current word.
    pub fn mfg(&self) -> u8 { self.0[1] }
    /// Service options provided by current traffic channel.
    pub fn opts(&self) -> ServiceOptions { ServiceOptions::new(self.0[2]) }
    /// Current resident talkgroup of traffic channel.
    pub fn talkgroup(&self) -> TalkGroup { TalkGroup::new(&self.0[4..]) }
    /// Address of user currently transmitting.
    pub fn src_unit(&self) -> u32 { slice_u24(&self.0[6..]) }
}

/// Identity of units transmitting on current unit-to-unit traffic channel.
#[derive(Copy, Clone, Debug)]
pub struct UnitVoiceUser(Buf);

impl UnitVoiceUser {
    pub fn new(lc: LinkControlFields) -> Self { UnitVoiceUser(lc.0) }

    pub fn mfg(&self) -> u8 { self.0[1] }
    pub fn opts(&self) -> ServiceOptions { ServiceOptions::new(self.0[2]) }
    /// Destination user address for current transmission.
    pub fn dest_unit(&self) -> u32 { slice_u24(&self.0[3..]) }
    /// Source user address for current transmission.
    pub fn src_unit(&self) -> u32 { slice_u24(&self.0[6..]) }
}

/// Talkgroup traffic on one channel pair, named explicitly.
#[derive(Clone, Debug)]
pub struct GroupVoiceUpdateExplicit {
    opts: ServiceOptions,
    talkgroup: TalkGroup,
    downlink: ChannelRef,
    uplink: ChannelRef,
}

impl GroupVoiceUpdateExplicit {
    pub fn new(lc: LinkControlFields) -> Self {
        let b = lc.0;

        GroupVoiceUpdateExplicit {
            opts: ServiceOptions::new(b[2]),
            talkgroup: TalkGroup::new(&b[3..=4]),
            downlink: ChannelRef::from_bytes(&b[5..=6]),
            uplink: ChannelRef::from_bytes(&b[7..=8]),
        }
    }

    pub fn opts(&self) -> ServiceOptions { self.opts }
    pub fn talkgroup(&self) -> TalkGroup { self.talkgroup }
    pub fn downlink(&self) -> &ChannelRef { &self.downlink }
    pub fn uplink(&self) -> &ChannelRef { &self.uplink }
}

/// Request for the target unit to answer a unit-to-unit call.
#[derive(Copy, Clone, Debug)]
pub struct UnitAnswerRequest(Buf);

impl UnitAnswerRequest {
    pub fn new(lc: LinkControlFields) -> Self { UnitAnswerRequest(lc.0) }

    pub fn opts(&self) -> ServiceOptions { ServiceOptions::new(self.0[2]) }
    pub fn dest_unit(&self) -> u32 { slice_u24(&self.0[3..]) }
    pub fn src_unit(&self) -> u32 { slice_u24(&self.0[6..]) }
}

/// Identity of unit participating in current phone call.
#[derive(Copy, Clone, Debug)]
pub struct PhoneUser(Buf);

impl PhoneUser {
    pub fn new(lc: LinkControlFields) -> Self { PhoneUser(lc.0) }

    /// Options requested/granted for the traffic channel.
    pub fn opts(&self) -> ServiceOptions { ServiceOptions::new(self.0[2]) }
    /// Maximum amount of time (in units of 100ms) that the phone call can occupy the
    /// traffic channel.
    pub fn call_timer(&self) -> u16 { slice_u16(&self.0[4..=5]) }
    /// Unit participating in call.
    pub fn unit(&self) -> u32 { slice_u24(&self.0[6..=8]) }
}

/// End of the call to the given unit.
#[derive(Copy, Clone, Debug)]
pub struct CallTermination(Buf);

impl CallTermination {
    pub fn new(lc: LinkControlFields) -> Self { CallTermination(lc.0) }

    pub fn dest_unit(&self) -> u32 { slice_u24(&self.0[6..=8]) }
}

/// Fully qualified identity of the transmitting unit.
#[derive(Copy, Clone, Debug)]
pub struct SourceIdExtension(Buf);

impl SourceIdExtension {
    pub fn new(lc: LinkControlFields) -> Self { SourceIdExtension(lc.0) }

    pub fn wacn(&self) -> u32 { wacn_system(&self.0[2..=5]).0 }
    pub fn system(&self) -> u16 { wacn_system(&self.0[2..=5]).1 }
    pub fn src_unit(&self) -> u32 { slice_u24(&self.0[6..=8]) }
}

/// Voice call on a patch (supergroup) of talkgroups.
#[derive(Copy, Clone, Debug)]
pub struct PatchGroupUser(Buf);

impl PatchGroupUser {
    pub fn new(lc: LinkControlFields) -> Self { PatchGroupUser(lc.0) }

    pub fn opts(&self) -> ServiceOptions { ServiceOptions::new(self.0[2]) }
    pub fn patch_group(&self) -> TalkGroup { TalkGroup::new(&self.0[3..=4]) }
    pub fn src_unit(&self) -> u32 { slice_u24(&self.0[6..=8]) }
}

/// Patch groups active on the traffic channel.
#[derive(Copy, Clone, Debug)]
pub struct PatchGroupUpdate(Buf);

impl PatchGroupUpdate {
    pub fn new(lc: LinkControlFields) -> Self { PatchGroupUpdate(lc.0) }

    pub fn patch_groups(&self) -> [TalkGroup; 3] {
        [
            TalkGroup::new(&self.0[2..=3]),
            TalkGroup::new(&self.0[4..=5]),
            TalkGroup::new(&self.0[6..=7]),
        ]
    }
}

/// Decoded link control word.
#[derive(Clone, Debug)]
pub enum LinkControl {
    GroupVoiceUser(GroupVoiceUser),
    GroupVoiceUpdate(ChannelUpdates),
    GroupVoiceUpdateExplicit(GroupVoiceUpdateExplicit),
    UnitVoiceUser(UnitVoiceUser),
    UnitAnswerRequest(UnitAnswerRequest),
    PhoneUser(PhoneUser),
    CallTermination(CallTermination),
    SourceIdExtension(SourceIdExtension),
    SystemServiceBroadcast(ServiceBroadcast),
    SecondaryControlChannel(SecondaryControl),
    AdjacentSiteStatus(SiteStatus),
    RfssStatus(SiteStatus),
    NetworkStatus(NetworkStatus),
    IdentifierUpdate(FrequencyBand),
    IdentifierUpdateExplicit(FrequencyBand),
    PatchGroupUser(PatchGroupUser),
    PatchGroupUpdate(PatchGroupUpdate),
    Unknown(LinkControlFields),
}

impl LinkControl {
    /// Short name used in summaries.
    pub fn label(&self) -> &'static str {
        use self::LinkControl::*;

        match *self {
            GroupVoiceUser(_) => "GROUP VOICE USER",
            GroupVoiceUpdate(_) => "GROUP VOICE UPDATE",
            GroupVoiceUpdateExplicit(_) => "GROUP VOICE UPDATE EXPLICIT",
            UnitVoiceUser(_) => "UNIT VOICE USER",
            UnitAnswerRequest(_) => "UNIT ANSWER REQUEST",
            PhoneUser(_) => "TELEPHONE USER",
            CallTermination(_) => "CALL TERMINATION",
            SourceIdExtension(_) => "SOURCE ID EXTENSION",
            SystemServiceBroadcast(_) => "SYSTEM SERVICE BROADCAST",
            SecondaryControlChannel(_) => "SECONDARY CONTROL CHANNEL",
            AdjacentSiteStatus(_) => "ADJACENT SITE STATUS",
            RfssStatus(_) => "RFSS STATUS",
            NetworkStatus(_) => "NETWORK STATUS",
            IdentifierUpdate(_) => "IDENTIFIER UPDATE",
            IdentifierUpdateExplicit(_) => "IDENTIFIER UPDATE EXPLICIT",
            PatchGroupUser(_) => "MOTOROLA PATCH GROUP USER",
            PatchGroupUpdate(_) => "MOTOROLA PATCH GROUP UPDATE",
            Unknown(_) => "UNKNOWN LC",
        }
    }

    /// Channels named by the word.
    pub fn channels(&self) -> Vec<&ChannelRef> {
        use self::LinkControl::*;

        match *self {
            GroupVoiceUpdate(ref u) => vec![&u[0].0, &u[1].0],
            GroupVoiceUpdateExplicit(ref u) => vec![u.downlink(), u.uplink()],
            SecondaryControlChannel(ref s) => vec![&s.channels()[0].0, &s.channels()[1].0],
            AdjacentSiteStatus(ref s) | RfssStatus(ref s) => vec![s.channel()],
            NetworkStatus(ref s) => vec![s.channel()],
            _ => vec![],
        }
    }

    /// Band announced by the word.
    pub fn frequency_band(&self) -> Option<FrequencyBand> {
        match *self {
            LinkControl::IdentifierUpdate(b) |
            LinkControl::IdentifierUpdateExplicit(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for LinkControl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::LinkControl::*;

        f.write_str(self.label())?;

        match *self {
            GroupVoiceUser(ref l) =>
                write!(f, " TG:{} SRC:{} {}", l.talkgroup(), l.src_unit(), l.opts()),
            GroupVoiceUpdate(ref u) =>
                write!(f, " CHAN:{} TG:{} CHAN:{} TG:{}", u[0].0, u[0].1, u[1].0, u[1].1),
            GroupVoiceUpdateExplicit(ref u) =>
                write!(f, " TG:{} DN:{} UP:{}", u.talkgroup(), u.downlink(), u.uplink()),
            UnitVoiceUser(ref l) =>
                write!(f, " FROM:{} TO:{} {}", l.src_unit(), l.dest_unit(), l.opts()),
            UnitAnswerRequest(ref l) =>
                write!(f, " FROM:{} TO:{}", l.src_unit(), l.dest_unit()),
            PhoneUser(ref l) =>
                write!(f, " UNIT:{} TIMER:{}", l.unit(), l.call_timer()),
            CallTermination(ref l) => write!(f, " TO:{}", l.dest_unit()),
            SourceIdExtension(ref l) =>
                write!(f, " WACN:{:05X} SYS:{:03X} SRC:{}", l.wacn(), l.system(), l.src_unit()),
            SystemServiceBroadcast(ref s) => write!(f, " {}", s),
            SecondaryControlChannel(ref s) => write!(f, " {}", s),
            AdjacentSiteStatus(ref s) | RfssStatus(ref s) => write!(f, " {}", s),
            NetworkStatus(ref s) => write!(f, " {}", s),
            IdentifierUpdate(ref b) | IdentifierUpdateExplicit(ref b) => write!(f, " {}", b),
            PatchGroupUser(ref l) =>
                write!(f, " PATCH:{} SRC:{}", l.patch_group(), l.src_unit()),
            PatchGroupUpdate(ref l) => {
                let g = l.patch_groups();
                write!(f, " PATCH:{},{},{}", g[0], g[1], g[2])
            },
            Unknown(ref l) => {
                let op = l.opcode();
                write!(f, " OPCODE:{:02X} VENDOR:{}", op.opcode, op.vendor)
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::vendor::Vendor;

    #[test]
    fn test_lc() {
        let lc = LinkControlFields::new([
            0b00000000,
            0b00000000,
            0b10110101, 0b00000000,
            0b00000000, 0b00000001,
            0xDE, 0xAD, 0xBE,
        ]);

        assert_eq!(lc.opcode(), Opcode { opcode: 0, vendor: Vendor::Standard });
        assert!(!lc.protected());
        assert!(!lc.explicit());

        assert_eq!(lc.payload(), &[
            0b00000000,
            0b10110101, 0b00000000,
            0b00000000, 0b00000001,
            0xDE, 0xAD, 0xBE,
        ]);

        let g = GroupVoiceUser::new(lc);
        assert_eq!(g.talkgroup(), TalkGroup::Default);
        assert_eq!(g.src_unit(), 0xDEADBE);
        assert!(g.opts().emergency());
        assert_eq!(g.opts().prio(), 0b101);
    }

    #[test]
    fn test_adjacent_site() {
        let lc = LinkControlFields::new([
            0b10100010,
            0b11001100,
            0b00001111,
            0b01010101,
            0b11100011,
            0b00011000,
            0b11000001,
            0b11111111,
            0b01010001,
        ]);

        assert_eq!(lc.opcode().opcode, 0b100010);
        assert!(lc.protected());

        let a = SiteStatus::new(lc.payload());
        assert_eq!(a.area(), 0b11001100);
        assert_eq!(a.system(), 0b111101010101);
        assert_eq!(a.rfss(), 0b11100011);
        assert_eq!(a.site(), 0b00011000);
        assert_eq!(a.channel().identifier(), 0b1100);
        assert_eq!(a.channel().number(), 0b000111111111);

        let l = LinkControl::AdjacentSiteStatus(a);
        assert_eq!(l.channels().len(), 1);
        assert!(l.frequency_band().is_none());
    }

    #[test]
    fn test_unit_voice_user() {
        let l = UnitVoiceUser::new(LinkControlFields::new([
            0x03, 0x00, 0x00,
            0x00, 0x01, 0x02,
            0x0A, 0x0B, 0x0C,
        ]));

        assert_eq!(l.dest_unit(), 0x000102);
        assert_eq!(l.src_unit(), 0x0A0B0C);
        assert_eq!(LinkControl::UnitVoiceUser(l).to_string(),
                   "UNIT VOICE USER FROM:658188 TO:258 PRI:0");
    }

    #[test]
    fn test_phone_user() {
        let l = PhoneUser::new(LinkControlFields::new([
            0x06, 0x00, 0x00, 0x00,
            0x01, 0x2C,
            0x00, 0x00, 0x2A,
        ]));

        assert_eq!(l.call_timer(), 300);
        assert_eq!(l.unit(), 42);
    }

    #[test]
    fn test_source_id_extension() {
        let l = SourceIdExtension::new(LinkControlFields::new([
            0x09, 0x00,
            0xBE, 0xE0, 0x01, 0x23,
            0x00, 0x10, 0x00,
        ]));

        assert_eq!(l.wacn(), 0xBEE00);
        assert_eq!(l.system(), 0x123);
        assert_eq!(l.src_unit(), 0x1000);
    }

    #[test]
    fn test_update_explicit() {
        let l = GroupVoiceUpdateExplicit::new(LinkControlFields::new([
            0x04, 0x00, 0x00,
            0x12, 0x34,
            0x10, 0x05,
            0x20, 0x05,
        ]));

        assert_eq!(l.talkgroup(), TalkGroup::Other(0x1234));
        assert_eq!(*l.downlink(), ChannelRef::new(1, 5));
        assert_eq!(*l.uplink(), ChannelRef::new(2, 5));

        let lc = LinkControl::GroupVoiceUpdateExplicit(l);
        let ids: Vec<u8> = lc.channels().iter().map(|c| c.identifier()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_patch() {
        let lc = LinkControlFields::new([
            0x40, 0x90, 0x00,
            0x00, 0x64,
            0x00,
            0x00, 0x00, 0x07,
        ]);

        assert!(lc.explicit());
        assert_eq!(lc.opcode().vendor, Vendor::Motorola);

        let p = PatchGroupUser::new(lc);
        assert_eq!(p.patch_group(), TalkGroup::Other(100));
        assert_eq!(p.src_unit(), 7);
    }
}
