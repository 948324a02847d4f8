//! Trunking signaling blocks (TSBK): the outbound control channel messages.

use std::fmt;

use collect_slice::CollectSlice;

use crate::band::{ChannelRef, FrequencyBand};
use crate::buffer::BitBuffer;
use crate::classify::{self, Opcode};
use crate::coding::crc::{self, Crc16Params};
use crate::coding::Verdict;
use crate::trunking::fields::{
    ChannelUpdates,
    NetworkStatus,
    SecondaryControl,
    ServiceBroadcast,
    ServiceOptions,
    SiteStatus,
    SystemServices,
    TalkGroup,
};
use crate::trunking::motorola::MotorolaTsbk;
use crate::util::{slice_u16, slice_u24, wacn_system};

/// Number of bits in a coded block.
pub const TSBK_BITS: usize = 96;
/// Number of bytes in a block, including the CRC.
pub const TSBK_BYTES: usize = 12;

/// Buffer of bytes that represents a TSBK.
pub type Buf = [u8; TSBK_BYTES];

/// Base TSBK decoder, common to all blocks.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TsbkFields(Buf);

impl TsbkFields {
    /// Interpret the given bytes as a TSBK.
    pub fn new(buf: Buf) -> TsbkFields { TsbkFields(buf) }

    /// Check the CRC of the given block, correcting up to two bits in place when
    /// `search` is set, and extract its fields.
    pub fn decode(buf: &mut BitBuffer, search: bool) -> (TsbkFields, Verdict) {
        let verdict = crc::correct::<Crc16Params>(buf, 0..80, 80..96, search);

        let mut bytes = [0; TSBK_BYTES];
        buf.bytes(0..TSBK_BITS).into_iter().collect_slice_checked(&mut bytes[..]);

        (TsbkFields(bytes), verdict)
    }

    /// Whether this is the last block in the frame.
    pub fn last(&self) -> bool { self.0[0] >> 7 == 1 }
    /// Whether the block is encrypted.
    pub fn protected(&self) -> bool { self.0[0] >> 6 & 1 == 1 }
    /// Opcode and vendor of the block.
    pub fn opcode(&self) -> Opcode { classify::tsbk(&self.0) }
    /// Raw manufacturer ID.
    pub fn mfg(&self) -> u8 { self.0[1] }
    /// Argument bytes.
    pub fn payload(&self) -> &[u8] { &self.0[2..=9] }
    /// CRC field of the block.
    pub fn crc(&self) -> u16 { slice_u16(&self.0[10..]) }
    /// Full block.
    pub fn bytes(&self) -> &Buf { &self.0 }
}

/// Grant of a traffic channel to a talkgroup.
#[derive(Clone, Debug)]
pub struct GroupVoiceGrant {
    opts: ServiceOptions,
    channel: ChannelRef,
    talkgroup: TalkGroup,
    src_unit: u32,
}

impl GroupVoiceGrant {
    pub fn new(tsbk: &TsbkFields) -> Self {
        let b = tsbk.0;

        GroupVoiceGrant {
            opts: ServiceOptions::new(b[2]),
            channel: ChannelRef::from_bytes(&b[3..=4]),
            talkgroup: TalkGroup::new(&b[5..=6]),
            src_unit: slice_u24(&b[7..=9]),
        }
    }

    pub fn opts(&self) -> ServiceOptions { self.opts }
    pub fn channel(&self) -> &ChannelRef { &self.channel }
    pub fn talkgroup(&self) -> TalkGroup { self.talkgroup }
    /// Unit that initiated the call.
    pub fn src_unit(&self) -> u32 { self.src_unit }
}

/// Talkgroup traffic, voice or data, on one explicitly named channel pair.
#[derive(Clone, Debug)]
pub struct GroupVoiceUpdateExplicit {
    opts: ServiceOptions,
    downlink: ChannelRef,
    uplink: ChannelRef,
    talkgroup: TalkGroup,
}

impl GroupVoiceUpdateExplicit {
    pub fn new(tsbk: &TsbkFields) -> Self {
        let b = tsbk.0;

        GroupVoiceUpdateExplicit {
            opts: ServiceOptions::new(b[2]),
            downlink: ChannelRef::from_bytes(&b[4..=5]),
            uplink: ChannelRef::from_bytes(&b[6..=7]),
            talkgroup: TalkGroup::new(&b[8..=9]),
        }
    }

    pub fn opts(&self) -> ServiceOptions { self.opts }
    pub fn downlink(&self) -> &ChannelRef { &self.downlink }
    pub fn uplink(&self) -> &ChannelRef { &self.uplink }
    pub fn talkgroup(&self) -> TalkGroup { self.talkgroup }
}

/// Traffic channel for a unit-to-unit call, sent as a grant and then as updates.
#[derive(Clone, Debug)]
pub struct UnitVoiceGrant {
    channel: ChannelRef,
    dest_unit: u32,
    src_unit: u32,
}

impl UnitVoiceGrant {
    pub fn new(tsbk: &TsbkFields) -> Self {
        let b = tsbk.0;

        UnitVoiceGrant {
            channel: ChannelRef::from_bytes(&b[2..=3]),
            dest_unit: slice_u24(&b[4..=6]),
            src_unit: slice_u24(&b[7..=9]),
        }
    }

    pub fn channel(&self) -> &ChannelRef { &self.channel }
    pub fn dest_unit(&self) -> u32 { self.dest_unit }
    pub fn src_unit(&self) -> u32 { self.src_unit }
}

/// Request for the target unit to answer a unit-to-unit call.
#[derive(Copy, Clone, Debug)]
pub struct UnitAnswerRequest(Buf);

impl UnitAnswerRequest {
    pub fn new(tsbk: &TsbkFields) -> Self { UnitAnswerRequest(tsbk.0) }

    pub fn opts(&self) -> ServiceOptions { ServiceOptions::new(self.0[2]) }
    pub fn dest_unit(&self) -> u32 { slice_u24(&self.0[4..=6]) }
    pub fn src_unit(&self) -> u32 { slice_u24(&self.0[7..=9]) }
}

/// Grant of a traffic channel for a telephone interconnect call.
#[derive(Clone, Debug)]
pub struct PhoneGrant {
    opts: ServiceOptions,
    channel: ChannelRef,
    call_timer: u16,
    unit: u32,
}

impl PhoneGrant {
    pub fn new(tsbk: &TsbkFields) -> Self {
        let b = tsbk.0;

        PhoneGrant {
            opts: ServiceOptions::new(b[2]),
            channel: ChannelRef::from_bytes(&b[3..=4]),
            call_timer: slice_u16(&b[5..=6]),
            unit: slice_u24(&b[7..=9]),
        }
    }

    pub fn opts(&self) -> ServiceOptions { self.opts }
    pub fn channel(&self) -> &ChannelRef { &self.channel }
    /// Maximum call length in units of 100ms.
    pub fn call_timer(&self) -> u16 { self.call_timer }
    pub fn unit(&self) -> u32 { self.unit }
}

/// Grant of a packet data channel pair to a unit.
#[derive(Clone, Debug)]
pub struct DataGrant {
    opts: ServiceOptions,
    downlink: ChannelRef,
    uplink: ChannelRef,
    unit: u32,
}

impl DataGrant {
    pub fn new(tsbk: &TsbkFields) -> Self {
        let b = tsbk.0;

        DataGrant {
            opts: ServiceOptions::new(b[2]),
            downlink: ChannelRef::from_bytes(&b[3..=4]),
            uplink: ChannelRef::from_bytes(&b[5..=6]),
            unit: slice_u24(&b[7..=9]),
        }
    }

    pub fn opts(&self) -> ServiceOptions { self.opts }
    pub fn downlink(&self) -> &ChannelRef { &self.downlink }
    pub fn uplink(&self) -> &ChannelRef { &self.uplink }
    pub fn unit(&self) -> u32 { self.unit }
}

/// Unit-addressed request (status, message, monitor, or alert) passed on from
/// another unit.
#[derive(Copy, Clone, Debug)]
pub struct UnitRequest(Buf);

impl UnitRequest {
    pub fn new(tsbk: &TsbkFields) -> Self { UnitRequest(tsbk.0) }

    /// Request-specific argument, such as the status or short message code.
    pub fn data(&self) -> u16 { slice_u16(&self.0[2..=3]) }
    pub fn unit_status(&self) -> u8 { self.0[2] }
    pub fn user_status(&self) -> u8 { self.0[3] }
    pub fn dest_unit(&self) -> u32 { slice_u24(&self.0[4..=6]) }
    pub fn src_unit(&self) -> u32 { slice_u24(&self.0[7..=9]) }
}

/// Acknowledgement of a unit's service request.
#[derive(Copy, Clone, Debug)]
pub struct Acknowledge(Buf);

impl Acknowledge {
    pub fn new(tsbk: &TsbkFields) -> Self { Acknowledge(tsbk.0) }

    /// Whether the additional information fields are valid.
    pub fn additional_valid(&self) -> bool { self.0[2] >> 7 == 1 }
    /// Whether the source is given as WACN and system rather than a unit.
    pub fn extended(&self) -> bool { self.0[2] >> 6 & 1 == 1 }
    /// Opcode of the service being acknowledged.
    pub fn service(&self) -> u8 { self.0[2] & 0x3F }

    pub fn wacn_system(&self) -> Option<(u32, u16)> {
        if self.extended() {
            Some(wacn_system(&self.0[3..=6]))
        } else {
            None
        }
    }

    pub fn src_unit(&self) -> Option<u32> {
        if self.extended() {
            None
        } else {
            Some(slice_u24(&self.0[4..=6]))
        }
    }

    pub fn target_unit(&self) -> u32 { slice_u24(&self.0[7..=9]) }
}

/// Queued or denied service request.
#[derive(Copy, Clone, Debug)]
pub struct ServiceResponse(Buf);

impl ServiceResponse {
    pub fn new(tsbk: &TsbkFields) -> Self { ServiceResponse(tsbk.0) }

    /// Opcode of the service requested.
    pub fn service(&self) -> u8 { self.0[2] & 0x3F }
    pub fn reason(&self) -> u8 { self.0[3] }
    pub fn additional(&self) -> u32 { slice_u24(&self.0[4..=6]) }
    pub fn target_unit(&self) -> u32 { slice_u24(&self.0[7..=9]) }
}

/// Response to a unit joining a talkgroup.
#[derive(Copy, Clone, Debug)]
pub struct GroupAffiliationResponse(Buf);

impl GroupAffiliationResponse {
    pub fn new(tsbk: &TsbkFields) -> Self { GroupAffiliationResponse(tsbk.0) }

    /// Whether the affiliation is valid system wide rather than only locally.
    pub fn global(&self) -> bool { self.0[2] >> 7 == 1 }
    /// Affiliation result: 0 accepted, 1 failed, 2 denied, 3 refused.
    pub fn result(&self) -> u8 { self.0[2] & 0x3 }
    pub fn announce_group(&self) -> TalkGroup { TalkGroup::new(&self.0[3..=4]) }
    pub fn talkgroup(&self) -> TalkGroup { TalkGroup::new(&self.0[5..=6]) }
    pub fn target_unit(&self) -> u32 { slice_u24(&self.0[7..=9]) }
}

/// Response to a unit registering with the system.
#[derive(Copy, Clone, Debug)]
pub struct UnitRegistrationResponse(Buf);

impl UnitRegistrationResponse {
    pub fn new(tsbk: &TsbkFields) -> Self { UnitRegistrationResponse(tsbk.0) }

    /// Registration result: 0 accepted, 1 failed, 2 denied, 3 refused.
    pub fn result(&self) -> u8 { self.0[2] >> 4 & 0x3 }
    pub fn system(&self) -> u16 { slice_u16(&self.0[2..=3]) & 0xFFF }
    pub fn src_id(&self) -> u32 { slice_u24(&self.0[4..=6]) }
    pub fn src_unit(&self) -> u32 { slice_u24(&self.0[7..=9]) }
}

/// Confirmation that a unit has left the system.
#[derive(Copy, Clone, Debug)]
pub struct DeregistrationAck(Buf);

impl DeregistrationAck {
    pub fn new(tsbk: &TsbkFields) -> Self { DeregistrationAck(tsbk.0) }

    pub fn wacn(&self) -> u32 { wacn_system(&self.0[3..=6]).0 }
    pub fn system(&self) -> u16 { wacn_system(&self.0[3..=6]).1 }
    pub fn target_unit(&self) -> u32 { slice_u24(&self.0[7..=9]) }
}

/// Roaming address stack entry for a unit.
#[derive(Copy, Clone, Debug)]
pub struct RoamingAddressUpdate(Buf);

impl RoamingAddressUpdate {
    pub fn new(tsbk: &TsbkFields) -> Self { RoamingAddressUpdate(tsbk.0) }

    /// Whether this is the last message in the update.
    pub fn last(&self) -> bool { self.0[2] >> 7 == 1 }
    /// Sequence number of the message.
    pub fn sequence(&self) -> u8 { self.0[2] & 0xF }
    pub fn wacn(&self) -> u32 { wacn_system(&self.0[3..=6]).0 }
    pub fn system(&self) -> u16 { wacn_system(&self.0[3..=6]).1 }
    pub fn target_unit(&self) -> u32 { slice_u24(&self.0[7..=9]) }
}

/// Encryption parameters to be used by a unit.
#[derive(Copy, Clone, Debug)]
pub struct ProtectionParameters(Buf);

impl ProtectionParameters {
    pub fn new(tsbk: &TsbkFields) -> Self { ProtectionParameters(tsbk.0) }

    pub fn crypto_alg(&self) -> u8 { self.0[4] }
    pub fn crypto_key(&self) -> u16 { slice_u16(&self.0[5..=6]) }
    pub fn target_unit(&self) -> u32 { slice_u24(&self.0[7..=9]) }
}

/// Packet data channel pair granted to a unit or a talkgroup.
#[derive(Clone, Debug)]
pub struct DataChannelGrant {
    downlink: ChannelRef,
    uplink: ChannelRef,
    target: [u8; 3],
}

impl DataChannelGrant {
    pub fn new(tsbk: &TsbkFields) -> Self {
        let b = tsbk.0;

        DataChannelGrant {
            downlink: ChannelRef::from_bytes(&b[2..=3]),
            uplink: ChannelRef::from_bytes(&b[4..=5]),
            target: [b[7], b[8], b[9]],
        }
    }

    pub fn downlink(&self) -> &ChannelRef { &self.downlink }
    pub fn uplink(&self) -> &ChannelRef { &self.uplink }
    /// Target address of a unit grant.
    pub fn dest_unit(&self) -> u32 { slice_u24(&self.target) }
    /// Target address of a group grant.
    pub fn talkgroup(&self) -> TalkGroup { TalkGroup::new(&self.target[1..]) }
}

/// Announcement of the SNDCP data channel pair and who may access it.
#[derive(Clone, Debug)]
pub struct DataChannelAnnouncement {
    opts: ServiceOptions,
    access: u8,
    downlink: ChannelRef,
    uplink: ChannelRef,
    access_control: u16,
}

impl DataChannelAnnouncement {
    pub fn new(tsbk: &TsbkFields) -> Self {
        let b = tsbk.0;

        DataChannelAnnouncement {
            opts: ServiceOptions::new(b[2]),
            access: b[3],
            downlink: ChannelRef::from_bytes(&b[4..=5]),
            uplink: ChannelRef::from_bytes(&b[6..=7]),
            access_control: slice_u16(&b[8..=9]),
        }
    }

    pub fn opts(&self) -> ServiceOptions { self.opts }
    /// Whether units may start using the channel without a request.
    pub fn autonomous_access(&self) -> bool { self.access >> 7 == 1 }
    /// Whether units may request access to the channel.
    pub fn requested_access(&self) -> bool { self.access >> 6 & 1 == 1 }
    pub fn downlink(&self) -> &ChannelRef { &self.downlink }
    pub fn uplink(&self) -> &ChannelRef { &self.uplink }
    /// Data access control value that units compare against their own.
    pub fn access_control(&self) -> u16 { self.access_control }
}

/// Secondary control channel given as an explicit downlink/uplink pair.
#[derive(Clone, Debug)]
pub struct SecondaryControlExplicit {
    rfss: u8,
    site: u8,
    downlink: ChannelRef,
    uplink: ChannelRef,
    services: SystemServices,
}

impl SecondaryControlExplicit {
    pub fn new(tsbk: &TsbkFields) -> Self {
        let b = tsbk.0;

        SecondaryControlExplicit {
            rfss: b[2],
            site: b[3],
            downlink: ChannelRef::from_bytes(&b[4..=5]),
            uplink: ChannelRef::from_bytes(&b[7..=8]),
            services: SystemServices::new(b[9]),
        }
    }

    pub fn rfss(&self) -> u8 { self.rfss }
    pub fn site(&self) -> u8 { self.site }
    pub fn downlink(&self) -> &ChannelRef { &self.downlink }
    pub fn uplink(&self) -> &ChannelRef { &self.uplink }
    pub fn services(&self) -> SystemServices { self.services }
}

/// Function (such as inhibit or check) for a unit to carry out.
#[derive(Copy, Clone, Debug)]
pub struct ExtendedFunction(Buf);

impl ExtendedFunction {
    pub fn new(tsbk: &TsbkFields) -> Self { ExtendedFunction(tsbk.0) }

    /// Class and operand of the function.
    pub fn function(&self) -> u16 { slice_u16(&self.0[2..=3]) }
    pub fn argument(&self) -> u32 { slice_u24(&self.0[4..=6]) }
    pub fn target_unit(&self) -> u32 { slice_u24(&self.0[7..=9]) }
}

/// Command from the system to a unit, such as to register or report its
/// affiliation.
#[derive(Copy, Clone, Debug)]
pub struct UnitCommand(Buf);

impl UnitCommand {
    pub fn new(tsbk: &TsbkFields) -> Self { UnitCommand(tsbk.0) }

    pub fn target_unit(&self) -> u32 { slice_u24(&self.0[4..=6]) }
    pub fn src_unit(&self) -> u32 { slice_u24(&self.0[7..=9]) }
}

/// Request for a unit to authenticate with the given system.
#[derive(Copy, Clone, Debug)]
pub struct AuthenticationCommand(Buf);

impl AuthenticationCommand {
    pub fn new(tsbk: &TsbkFields) -> Self { AuthenticationCommand(tsbk.0) }

    pub fn wacn(&self) -> u32 { wacn_system(&self.0[2..=5]).0 }
    pub fn system(&self) -> u16 { wacn_system(&self.0[2..=5]).1 }
    pub fn target_unit(&self) -> u32 { slice_u24(&self.0[6..=8]) }
}

/// Operation on a unit's roaming address stack.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StackOperation {
    Clear,
    Write,
    Delete,
    Read,
    Other(u8),
}

impl StackOperation {
    pub fn from_bits(bits: u8) -> StackOperation {
        use self::StackOperation::*;

        match bits {
            0x00 => Clear,
            0x01 => Write,
            0x02 => Delete,
            0x03 => Read,
            b => Other(b),
        }
    }
}

impl fmt::Display for StackOperation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::StackOperation::*;

        match *self {
            Clear => f.write_str("CLEAR"),
            Write => f.write_str("WRITE"),
            Delete => f.write_str("DELETE"),
            Read => f.write_str("READ"),
            Other(b) => write!(f, "OP:{:02X}", b),
        }
    }
}

/// Command to change or report a unit's roaming address stack.
#[derive(Copy, Clone, Debug)]
pub struct RoamingAddressCommand(Buf);

impl RoamingAddressCommand {
    pub fn new(tsbk: &TsbkFields) -> Self { RoamingAddressCommand(tsbk.0) }

    pub fn operation(&self) -> StackOperation { StackOperation::from_bits(self.0[2]) }
    pub fn wacn(&self) -> u32 { wacn_system(&self.0[3..=6]).0 }
    pub fn system(&self) -> u16 { wacn_system(&self.0[3..=6]).1 }
    pub fn target_unit(&self) -> u32 { slice_u24(&self.0[7..=9]) }
}

/// Current date and time on the system, with the local offset from UTC.
///
/// The payload is a 64-bit word: date, time, and offset validity flags, signed
/// offset in minutes, month, day, year, hours, minutes, seconds.
#[derive(Copy, Clone, Debug)]
pub struct TimeDate(u64);

impl TimeDate {
    pub fn new(tsbk: &TsbkFields) -> Self {
        TimeDate(tsbk.0[2..=9].iter().fold(0, |w, &b| w << 8 | b as u64))
    }

    /// Extract `width` bits starting `start` bits from the MSB.
    fn bits(&self, start: u32, width: u32) -> u64 {
        self.0 >> (64 - start - width) & ((1 << width) - 1)
    }

    pub fn date_valid(&self) -> bool { self.bits(0, 1) == 1 }
    pub fn time_valid(&self) -> bool { self.bits(1, 1) == 1 }
    pub fn offset_valid(&self) -> bool { self.bits(2, 1) == 1 }

    /// Local time offset from UTC in minutes.
    pub fn local_offset(&self) -> i32 {
        let off = self.bits(4, 12) as i32;
        if self.bits(3, 1) == 1 { -off } else { off }
    }

    pub fn month(&self) -> u8 { self.bits(16, 4) as u8 }
    pub fn day(&self) -> u8 { self.bits(20, 5) as u8 }
    pub fn year(&self) -> u16 { self.bits(25, 13) as u16 }
    pub fn hours(&self) -> u8 { self.bits(40, 5) as u8 }
    pub fn minutes(&self) -> u8 { self.bits(45, 6) as u8 }
    pub fn seconds(&self) -> u8 { self.bits(51, 6) as u8 }
}

impl fmt::Display for TimeDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.date_valid() {
            write!(f, " {:04}-{:02}-{:02}", self.year(), self.month(), self.day())?;
        }

        if self.time_valid() {
            write!(f, " {:02}:{:02}:{:02}", self.hours(), self.minutes(), self.seconds())?;
        }

        if self.offset_valid() {
            write!(f, " OFFSET:{}", self.local_offset())?;
        }

        Ok(())
    }
}

/// Decoded trunking signaling block.
#[derive(Clone, Debug)]
pub enum Tsbk {
    GroupVoiceGrant(GroupVoiceGrant),
    GroupVoiceUpdate(ChannelUpdates),
    GroupVoiceUpdateExplicit(GroupVoiceUpdateExplicit),
    UnitVoiceGrant(UnitVoiceGrant),
    UnitAnswerRequest(UnitAnswerRequest),
    UnitVoiceUpdate(UnitVoiceGrant),
    PhoneGrant(PhoneGrant),
    PhoneGrantUpdate(PhoneGrant),
    UnitDataGrant(DataChannelGrant),
    GroupDataGrant(DataChannelGrant),
    GroupDataAnnouncement(ChannelUpdates),
    GroupDataAnnouncementExplicit(GroupVoiceUpdateExplicit),
    DataGrant(DataGrant),
    DataAnnouncementExplicit(DataChannelAnnouncement),
    StatusUpdate(UnitRequest),
    StatusQuery(UnitRequest),
    MessageUpdate(UnitRequest),
    RadioMonitor(UnitRequest),
    CallAlert(UnitRequest),
    Acknowledge(Acknowledge),
    Queued(ServiceResponse),
    ExtendedFunction(ExtendedFunction),
    Deny(ServiceResponse),
    GroupAffiliationResponse(GroupAffiliationResponse),
    SecondaryControlExplicit(SecondaryControlExplicit),
    GroupAffiliationQuery(UnitCommand),
    UnitRegistrationResponse(UnitRegistrationResponse),
    UnitRegistrationCommand(UnitCommand),
    AuthenticationCommand(AuthenticationCommand),
    DeregistrationAck(DeregistrationAck),
    TimeDate(TimeDate),
    RoamingAddressCommand(RoamingAddressCommand),
    IdentifierUpdateTdma(FrequencyBand),
    IdentifierUpdateVuhf(FrequencyBand),
    IdentifierUpdate(FrequencyBand),
    RoamingAddressUpdate(RoamingAddressUpdate),
    SystemServiceBroadcast(ServiceBroadcast),
    SecondaryControlChannel(SecondaryControl),
    RfssStatus(SiteStatus),
    NetworkStatus(NetworkStatus),
    AdjacentSiteStatus(SiteStatus),
    ProtectionParameterBroadcast(ProtectionParameters),
    Motorola(MotorolaTsbk),
    Unknown(TsbkFields),
}

impl Tsbk {
    /// Short name used in summaries.
    pub fn label(&self) -> &'static str {
        use self::Tsbk::*;

        match *self {
            GroupVoiceGrant(_) => "GROUP VOICE GRANT",
            GroupVoiceUpdate(_) => "GROUP VOICE UPDATE",
            GroupVoiceUpdateExplicit(_) => "GROUP VOICE UPDATE EXPLICIT",
            UnitVoiceGrant(_) => "UNIT VOICE GRANT",
            UnitAnswerRequest(_) => "UNIT ANSWER REQUEST",
            UnitVoiceUpdate(_) => "UNIT VOICE UPDATE",
            PhoneGrant(_) => "TELEPHONE GRANT",
            PhoneGrantUpdate(_) => "TELEPHONE GRANT UPDATE",
            UnitDataGrant(_) => "UNIT DATA GRANT",
            GroupDataGrant(_) => "GROUP DATA GRANT",
            GroupDataAnnouncement(_) => "GROUP DATA ANNOUNCEMENT",
            GroupDataAnnouncementExplicit(_) => "GROUP DATA ANNOUNCEMENT EXPLICIT",
            DataGrant(_) => "SNDCP DATA GRANT",
            DataAnnouncementExplicit(_) => "SNDCP DATA ANNOUNCEMENT EXPLICIT",
            StatusUpdate(_) => "STATUS UPDATE",
            StatusQuery(_) => "STATUS QUERY",
            MessageUpdate(_) => "MESSAGE UPDATE",
            RadioMonitor(_) => "RADIO MONITOR",
            CallAlert(_) => "CALL ALERT",
            Acknowledge(_) => "ACKNOWLEDGE",
            Queued(_) => "QUEUED",
            ExtendedFunction(_) => "EXTENDED FUNCTION",
            Deny(_) => "DENY",
            GroupAffiliationResponse(_) => "GROUP AFFILIATION RESPONSE",
            SecondaryControlExplicit(_) => "SECONDARY CONTROL CHANNEL EXPLICIT",
            GroupAffiliationQuery(_) => "GROUP AFFILIATION QUERY",
            UnitRegistrationResponse(_) => "UNIT REGISTRATION RESPONSE",
            UnitRegistrationCommand(_) => "UNIT REGISTRATION COMMAND",
            AuthenticationCommand(_) => "AUTHENTICATION COMMAND",
            DeregistrationAck(_) => "DEREGISTRATION ACK",
            TimeDate(_) => "TIME AND DATE",
            RoamingAddressCommand(_) => "ROAMING ADDRESS COMMAND",
            IdentifierUpdateTdma(_) => "IDENTIFIER UPDATE TDMA",
            IdentifierUpdateVuhf(_) => "IDENTIFIER UPDATE VHF/UHF",
            IdentifierUpdate(_) => "IDENTIFIER UPDATE",
            RoamingAddressUpdate(_) => "ROAMING ADDRESS UPDATE",
            SystemServiceBroadcast(_) => "SYSTEM SERVICE BROADCAST",
            SecondaryControlChannel(_) => "SECONDARY CONTROL CHANNEL",
            RfssStatus(_) => "RFSS STATUS",
            NetworkStatus(_) => "NETWORK STATUS",
            AdjacentSiteStatus(_) => "ADJACENT SITE STATUS",
            ProtectionParameterBroadcast(_) => "PROTECTION PARAMETERS",
            Motorola(ref m) => m.label(),
            Unknown(_) => "UNKNOWN TSBK",
        }
    }

    /// Channels named by the block.
    pub fn channels(&self) -> Vec<&ChannelRef> {
        use self::Tsbk::*;

        match *self {
            GroupVoiceGrant(ref g) => vec![g.channel()],
            GroupVoiceUpdate(ref u) | GroupDataAnnouncement(ref u) => vec![&u[0].0, &u[1].0],
            GroupVoiceUpdateExplicit(ref u) | GroupDataAnnouncementExplicit(ref u) =>
                vec![u.downlink(), u.uplink()],
            UnitVoiceGrant(ref g) | UnitVoiceUpdate(ref g) => vec![g.channel()],
            PhoneGrant(ref g) | PhoneGrantUpdate(ref g) => vec![g.channel()],
            UnitDataGrant(ref g) | GroupDataGrant(ref g) => vec![g.downlink(), g.uplink()],
            DataGrant(ref g) => vec![g.downlink(), g.uplink()],
            DataAnnouncementExplicit(ref a) => vec![a.downlink(), a.uplink()],
            SecondaryControlExplicit(ref s) => vec![s.downlink(), s.uplink()],
            SecondaryControlChannel(ref s) => vec![&s.channels()[0].0, &s.channels()[1].0],
            RfssStatus(ref s) | AdjacentSiteStatus(ref s) => vec![s.channel()],
            NetworkStatus(ref s) => vec![s.channel()],
            Motorola(ref m) => m.channels(),
            _ => vec![],
        }
    }

    /// Downlink and uplink of a block that names them as separate channels.
    pub fn channel_pair(&self) -> Option<(&ChannelRef, &ChannelRef)> {
        use self::Tsbk::*;

        match *self {
            GroupVoiceUpdateExplicit(ref u) | GroupDataAnnouncementExplicit(ref u) =>
                Some((u.downlink(), u.uplink())),
            UnitDataGrant(ref g) | GroupDataGrant(ref g) => Some((g.downlink(), g.uplink())),
            DataGrant(ref g) => Some((g.downlink(), g.uplink())),
            DataAnnouncementExplicit(ref a) => Some((a.downlink(), a.uplink())),
            SecondaryControlExplicit(ref s) => Some((s.downlink(), s.uplink())),
            _ => None,
        }
    }

    /// Band announced by the block.
    pub fn frequency_band(&self) -> Option<FrequencyBand> {
        match *self {
            Tsbk::IdentifierUpdateTdma(b) |
            Tsbk::IdentifierUpdateVuhf(b) |
            Tsbk::IdentifierUpdate(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for Tsbk {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Tsbk::*;

        if let Motorola(ref m) = *self {
            return write!(f, "{}", m);
        }

        f.write_str(self.label())?;

        match *self {
            GroupVoiceGrant(ref g) =>
                write!(f, " TG:{} SRC:{} CHAN:{} {}", g.talkgroup(), g.src_unit(),
                       g.channel(), g.opts()),
            GroupVoiceUpdate(ref u) | GroupDataAnnouncement(ref u) =>
                write!(f, " CHAN:{} TG:{} CHAN:{} TG:{}", u[0].0, u[0].1, u[1].0, u[1].1),
            GroupVoiceUpdateExplicit(ref u) | GroupDataAnnouncementExplicit(ref u) =>
                write!(f, " TG:{} DN:{} UP:{}", u.talkgroup(), u.downlink(), u.uplink()),
            UnitVoiceGrant(ref g) | UnitVoiceUpdate(ref g) =>
                write!(f, " FROM:{} TO:{} CHAN:{}", g.src_unit(), g.dest_unit(), g.channel()),
            UnitAnswerRequest(ref r) =>
                write!(f, " FROM:{} TO:{} {}", r.src_unit(), r.dest_unit(), r.opts()),
            PhoneGrant(ref g) | PhoneGrantUpdate(ref g) =>
                write!(f, " UNIT:{} CHAN:{} TIMER:{}", g.unit(), g.channel(), g.call_timer()),
            UnitDataGrant(ref g) =>
                write!(f, " TO:{} DN:{} UP:{}", g.dest_unit(), g.downlink(), g.uplink()),
            GroupDataGrant(ref g) =>
                write!(f, " TG:{} DN:{} UP:{}", g.talkgroup(), g.downlink(), g.uplink()),
            DataGrant(ref g) =>
                write!(f, " UNIT:{} DN:{} UP:{}", g.unit(), g.downlink(), g.uplink()),
            DataAnnouncementExplicit(ref a) => {
                write!(f, " DN:{} UP:{} DAC:{:04X}", a.downlink(), a.uplink(),
                       a.access_control())?;

                if a.autonomous_access() {
                    f.write_str(" AUTONOMOUS")?;
                }

                Ok(())
            },
            StatusUpdate(ref r) =>
                write!(f, " FROM:{} TO:{} UNIT STATUS:{} USER STATUS:{}", r.src_unit(),
                       r.dest_unit(), r.unit_status(), r.user_status()),
            MessageUpdate(ref r) =>
                write!(f, " FROM:{} TO:{} MSG:{:04X}", r.src_unit(), r.dest_unit(), r.data()),
            StatusQuery(ref r) | RadioMonitor(ref r) | CallAlert(ref r) =>
                write!(f, " FROM:{} TO:{}", r.src_unit(), r.dest_unit()),
            Acknowledge(ref a) => {
                write!(f, " SVC:{:02X}", a.service())?;

                match (a.wacn_system(), a.src_unit()) {
                    (Some((wacn, sys)), _) => write!(f, " WACN:{:05X} SYS:{:03X}", wacn, sys)?,
                    (None, Some(src)) => write!(f, " FROM:{}", src)?,
                    (None, None) => {},
                }

                write!(f, " TO:{}", a.target_unit())
            },
            ExtendedFunction(ref e) =>
                write!(f, " FUNC:{:04X} ARG:{:06X} TO:{}", e.function(), e.argument(),
                       e.target_unit()),
            Queued(ref r) | Deny(ref r) =>
                write!(f, " SVC:{:02X} REASON:{:02X} TO:{}", r.service(), r.reason(),
                       r.target_unit()),
            GroupAffiliationResponse(ref r) =>
                write!(f, " TG:{} ANNOUNCE:{} UNIT:{} RESULT:{}", r.talkgroup(),
                       r.announce_group(), r.target_unit(), r.result()),
            SecondaryControlExplicit(ref s) =>
                write!(f, " SITE:{:02X}-{:02X} DN:{} UP:{} SVC:{}", s.rfss(), s.site(),
                       s.downlink(), s.uplink(), s.services()),
            GroupAffiliationQuery(ref c) | UnitRegistrationCommand(ref c) =>
                write!(f, " FROM:{} TO:{}", c.src_unit(), c.target_unit()),
            AuthenticationCommand(ref a) =>
                write!(f, " WACN:{:05X} SYS:{:03X} TO:{}", a.wacn(), a.system(),
                       a.target_unit()),
            TimeDate(ref t) => write!(f, "{}", t),
            RoamingAddressCommand(ref r) =>
                write!(f, " {} WACN:{:05X} SYS:{:03X} TO:{}", r.operation(), r.wacn(),
                       r.system(), r.target_unit()),
            UnitRegistrationResponse(ref r) =>
                write!(f, " SYS:{:03X} ID:{} UNIT:{} RESULT:{}", r.system(), r.src_id(),
                       r.src_unit(), r.result()),
            DeregistrationAck(ref a) =>
                write!(f, " WACN:{:05X} SYS:{:03X} UNIT:{}", a.wacn(), a.system(),
                       a.target_unit()),
            IdentifierUpdateTdma(ref b) | IdentifierUpdateVuhf(ref b) |
            IdentifierUpdate(ref b) => write!(f, " {}", b),
            RoamingAddressUpdate(ref r) =>
                write!(f, " WACN:{:05X} SYS:{:03X} UNIT:{} SEQ:{}", r.wacn(), r.system(),
                       r.target_unit(), r.sequence()),
            SystemServiceBroadcast(ref s) => write!(f, " {}", s),
            SecondaryControlChannel(ref s) => write!(f, " {}", s),
            RfssStatus(ref s) | AdjacentSiteStatus(ref s) => write!(f, " {}", s),
            NetworkStatus(ref s) => write!(f, " {}", s),
            ProtectionParameterBroadcast(ref p) =>
                write!(f, " ALGID:{:02X} KEY:{:04X} UNIT:{}", p.crypto_alg(), p.crypto_key(),
                       p.target_unit()),
            Motorola(_) => Ok(()),
            Unknown(ref t) => {
                let op = t.opcode();
                write!(f, " OPCODE:{:02X} VENDOR:{}", op.opcode, op.vendor)
            },
        }
    }
}
