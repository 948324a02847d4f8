//! Motorola trunking blocks (MFID 0x90).

use std::fmt;

use crate::band::ChannelRef;
use crate::bits::bytes_hexbits;
use crate::trunking::fields::{ChannelUpdates, ServiceOptions, TalkGroup};
use crate::trunking::tsbk::TsbkFields;
use crate::util::slice_u24;

/// Patch (supergroup) and up to three of its member talkgroups.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PatchGroup {
    patch: TalkGroup,
    groups: [TalkGroup; 3],
}

impl PatchGroup {
    pub fn new(tsbk: &TsbkFields) -> Self {
        let b = tsbk.bytes();

        PatchGroup {
            patch: TalkGroup::new(&b[2..=3]),
            groups: [
                TalkGroup::new(&b[4..=5]),
                TalkGroup::new(&b[6..=7]),
                TalkGroup::new(&b[8..=9]),
            ],
        }
    }

    pub fn patch_group(&self) -> TalkGroup { self.patch }
    pub fn groups(&self) -> &[TalkGroup; 3] { &self.groups }
}

/// Grant of a traffic channel to a patch group.
#[derive(Clone, Debug)]
pub struct PatchGroupGrant {
    opts: ServiceOptions,
    channel: ChannelRef,
    patch: TalkGroup,
    src_unit: u32,
}

impl PatchGroupGrant {
    pub fn new(tsbk: &TsbkFields) -> Self {
        let b = tsbk.bytes();

        PatchGroupGrant {
            opts: ServiceOptions::new(b[2]),
            channel: ChannelRef::from_bytes(&b[3..=4]),
            patch: TalkGroup::new(&b[5..=6]),
            src_unit: slice_u24(&b[7..=9]),
        }
    }

    pub fn opts(&self) -> ServiceOptions { self.opts }
    pub fn channel(&self) -> &ChannelRef { &self.channel }
    pub fn patch_group(&self) -> TalkGroup { self.patch }
    pub fn src_unit(&self) -> u32 { self.src_unit }
}

/// Morse station identifier and control channel of the transmitting site.
#[derive(Clone, Debug)]
pub struct BaseStationId {
    cwid: String,
    channel: ChannelRef,
}

impl BaseStationId {
    pub fn new(tsbk: &TsbkFields) -> Self {
        let b = tsbk.bytes();

        BaseStationId {
            // Eight 6-bit characters, offset from '+'.
            cwid: bytes_hexbits(&b[2..8]).iter()
                .map(|h| (h.bits() + b'+') as char)
                .collect(),
            channel: ChannelRef::from_bytes(&b[8..=9]),
        }
    }

    pub fn cwid(&self) -> &str { &self.cwid }
    pub fn channel(&self) -> &ChannelRef { &self.channel }
}

/// Decoded Motorola trunking block.
#[derive(Clone, Debug)]
pub enum MotorolaTsbk {
    PatchGroupAdd(PatchGroup),
    PatchGroupDelete(PatchGroup),
    PatchGroupGrant(PatchGroupGrant),
    PatchGroupGrantUpdate(ChannelUpdates),
    SystemLoading(TsbkFields),
    BaseStationId(BaseStationId),
    PlannedShutdown(TsbkFields),
}

impl MotorolaTsbk {
    pub fn label(&self) -> &'static str {
        use self::MotorolaTsbk::*;

        match *self {
            PatchGroupAdd(_) => "MOTOROLA PATCH GROUP ADD",
            PatchGroupDelete(_) => "MOTOROLA PATCH GROUP DELETE",
            PatchGroupGrant(_) => "MOTOROLA PATCH GROUP GRANT",
            PatchGroupGrantUpdate(_) => "MOTOROLA PATCH GROUP UPDATE",
            SystemLoading(_) => "MOTOROLA SYSTEM LOADING",
            BaseStationId(_) => "MOTOROLA BASE STATION ID",
            PlannedShutdown(_) => "MOTOROLA PLANNED SHUTDOWN",
        }
    }

    pub fn channels(&self) -> Vec<&ChannelRef> {
        use self::MotorolaTsbk::*;

        match *self {
            PatchGroupGrant(ref g) => vec![g.channel()],
            PatchGroupGrantUpdate(ref u) => vec![&u[0].0, &u[1].0],
            BaseStationId(ref b) => vec![b.channel()],
            _ => vec![],
        }
    }
}

impl fmt::Display for MotorolaTsbk {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::MotorolaTsbk::*;

        f.write_str(self.label())?;

        match *self {
            PatchGroupAdd(ref p) | PatchGroupDelete(ref p) => {
                let g = p.groups();
                write!(f, " PATCH:{} GROUPS:{},{},{}", p.patch_group(), g[0], g[1], g[2])
            },
            PatchGroupGrant(ref g) =>
                write!(f, " PATCH:{} SRC:{} CHAN:{} {}", g.patch_group(), g.src_unit(),
                       g.channel(), g.opts()),
            PatchGroupGrantUpdate(ref u) =>
                write!(f, " CHAN:{} PATCH:{} CHAN:{} PATCH:{}", u[0].0, u[0].1, u[1].0, u[1].1),
            BaseStationId(ref b) => write!(f, " CWID:{} CHAN:{}", b.cwid(), b.channel()),
            SystemLoading(_) | PlannedShutdown(_) => Ok(()),
        }
    }
}
