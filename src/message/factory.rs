//! Dispatch from frame classification to message variant.
//!
//! Each table below maps the classifier's output onto a variant constructor, with an
//! unknown variant as the fallback arm, so every frame of a defined length yields a
//! message.

use tracing::{debug, trace};

use crate::buffer::BitBuffer;
use crate::classify::Classification;
use crate::coding::{Checks, Stage, StagePolicy};
use crate::data::ambtc;
use crate::data::block::DataBlock;
use crate::data::fields::{PacketFormat, ServiceAccessPoint};
use crate::data::header::{PduHeader, HEADER_BITS as PDU_HEADER_BITS};
use crate::data::{Packet, PduSequence};
use crate::decoder::DecoderConfig;
use crate::error::{DecodeError, Result};
use crate::message::{Frame, Message, MessageKind};
use crate::nid::{DataUnit, NetworkAccessCode, NetworkId};
use crate::trunking::fields::{
    self,
    parse_band,
    parse_updates,
    SecondaryControl,
    ServiceBroadcast,
    SiteStatus,
    UpdateLayout,
};
use crate::trunking::motorola::{self, MotorolaTsbk};
use crate::trunking::tsbk::{self, Tsbk, TsbkFields, TSBK_BITS};
use crate::vendor::Vendor;
use crate::voice::control::{self, LinkControl, LinkControlFields};
use crate::voice::frame::{decode_cc_group, decode_lc_group};
use crate::voice::header::VoiceHeaderFields;
use crate::voice::term;

/// Decode the given frame into its messages: one per TSBK block for trunking frames,
/// exactly one for every other data unit.
///
/// Transmission errors never fail the decode; they show up in each message's checks.
/// A frame shorter than its data unit requires is rejected.
pub fn build(frame: Frame, config: &DecoderConfig) -> Result<Vec<Message>> {
    let Frame { nid, mut bits, timestamp } = frame;
    let class = Classification::new(nid);

    trace!(nac = %class.nac, duid = class.duid, bits = bits.len(), "classifying frame");

    let du = match class.data_unit {
        Some(du) => du,
        None => {
            debug!(duid = class.duid, "reserved data unit");

            return Ok(vec![Message::new(class, timestamp, Checks::new(StagePolicy::STRICT),
                                        0, MessageKind::Unknown(bits))]);
        },
    };

    if bits.len() < du.payload_bits() {
        return Err(DecodeError::ShortFrame {
            kind: du.label(),
            expected: du.payload_bits(),
            found: bits.len(),
        });
    }

    let message = |checks: Checks, corrected: usize, kind: MessageKind| {
        Message::new(class, timestamp, checks, corrected, kind)
    };

    match du {
        DataUnit::VoiceHeader => {
            let mut checks = Checks::new(StagePolicy::HEADER);
            let fields = VoiceHeaderFields::decode(&mut bits, &mut checks);

            Ok(vec![message(checks, bits.corrected(), MessageKind::Header(fields))])
        },
        DataUnit::VoiceSimpleTerminator =>
            Ok(vec![message(Checks::new(StagePolicy::STRICT), 0, MessageKind::Terminator)]),
        DataUnit::VoiceLcTerminator => {
            let mut checks = Checks::new(StagePolicy::TERMINATOR);
            let fields = term::decode(&mut bits, &mut checks);
            let lc = link_control(fields);

            Ok(vec![message(checks, bits.corrected(),
                            MessageKind::TerminatorLinkControl { fields, lc })])
        },
        DataUnit::VoiceLcFrameGroup => {
            let mut checks = Checks::new(StagePolicy::VOICE);
            let (frames, fields) = decode_lc_group(&mut bits, &mut checks);
            let lc = link_control(fields);

            Ok(vec![message(checks, bits.corrected(),
                            MessageKind::VoiceLinkControl { frames, fields, lc })])
        },
        DataUnit::VoiceCcFrameGroup => {
            let mut checks = Checks::new(StagePolicy::VOICE);
            let (frames, crypto) = decode_cc_group(&mut bits, &mut checks);

            Ok(vec![message(checks, bits.corrected(),
                            MessageKind::VoiceCrypto { frames, crypto })])
        },
        DataUnit::TrunkingSignaling => Ok(trunking(class, timestamp, &bits, config)),
        DataUnit::DataPacket => packet_frame(class, timestamp, &bits, config).map(|m| vec![m]),
    }
}

/// Decode the TSBK blocks of a trunking frame, stopping after the one flagged last.
fn trunking(class: Classification, timestamp: u64, bits: &BitBuffer,
            config: &DecoderConfig) -> Vec<Message>
{
    let count = (bits.len() / TSBK_BITS).min(config.max_tsbk_blocks).max(1);
    let mut messages = Vec::with_capacity(count);

    for i in 0..count {
        let mut block = bits.sub_range(i * TSBK_BITS..(i + 1) * TSBK_BITS);
        let (fields, verdict) = TsbkFields::decode(&mut block, config.crc_search);

        let mut checks = Checks::new(StagePolicy::STRICT);
        checks.push(Stage::Crc16, verdict);

        let last = fields.last();

        messages.push(Message::new(class, timestamp, checks, block.corrected(),
                                   MessageKind::Trunking { fields, tsbk: tsbk(fields) }));

        if last {
            break;
        }
    }

    messages
}

/// Split a packet frame into its header and data blocks, sized by the format the
/// corrected header announces.
fn packet_frame(class: Classification, timestamp: u64, bits: &BitBuffer,
                config: &DecoderConfig) -> Result<Message>
{
    let mut hbits = bits.sub_range(0..PDU_HEADER_BITS);
    let (header, verdict) = PduHeader::decode(&mut hbits, config.crc_search);

    let format = header.format();
    let size = format.block_bits();
    let rest = bits.len() - PDU_HEADER_BITS;

    let blocks: Vec<Option<DataBlock>> = if rest % size == 0 {
        (0..rest / size).map(|i| {
            let start = PDU_HEADER_BITS + i * size;
            Some(DataBlock::decode(format, &bits.sub_range(start..start + size)))
        }).collect()
    } else if verdict.is_failed() {
        // Format can't be trusted, so neither can the block boundaries.
        debug!(bits = rest, "discarding blocks of unverified packet");
        vec![]
    } else {
        return Err(DecodeError::BlockLength {
            index: rest / size,
            expected: size,
            found: rest % size,
        });
    };

    let seq = PduSequence::new(header, verdict, blocks, hbits.corrected());

    Ok(sequence_message(class, timestamp, seq))
}

/// Decode a packet delivered as a separate header block and data blocks, with `None`
/// standing in for blocks lost in transport.
pub fn sequence(nac: NetworkAccessCode, timestamp: u64, header: &mut BitBuffer,
                blocks: &[Option<BitBuffer>], search: bool) -> Result<Message>
{
    let class = Classification::new(NetworkId::new(nac, DataUnit::DataPacket));
    let seq = PduSequence::decode(header, blocks, search)?;

    Ok(sequence_message(class, timestamp, seq))
}

fn sequence_message(class: Classification, timestamp: u64, seq: PduSequence) -> Message {
    let mut checks = Checks::new(StagePolicy::PACKET);
    seq.push_checks(&mut checks);

    let corrected = seq.corrected_bits();

    Message::new(class, timestamp, checks, corrected, MessageKind::Packet(packet(seq)))
}

/// Select the link control variant for the given word.
pub fn link_control(lc: LinkControlFields) -> LinkControl {
    use crate::voice::control::LinkControl::*;

    let op = lc.opcode();
    let p = lc.payload();

    let word = match (op.vendor, op.opcode) {
        (Vendor::Standard, 0x00) => GroupVoiceUser(control::GroupVoiceUser::new(lc)),
        (Vendor::Standard, 0x02) => GroupVoiceUpdate(parse_updates(p)),
        (Vendor::Standard, 0x03) => UnitVoiceUser(control::UnitVoiceUser::new(lc)),
        (Vendor::Standard, 0x04) =>
            GroupVoiceUpdateExplicit(control::GroupVoiceUpdateExplicit::new(lc)),
        (Vendor::Standard, 0x05) => UnitAnswerRequest(control::UnitAnswerRequest::new(lc)),
        (Vendor::Standard, 0x06) => PhoneUser(control::PhoneUser::new(lc)),
        (Vendor::Standard, 0x09) => SourceIdExtension(control::SourceIdExtension::new(lc)),
        (Vendor::Standard, 0x0F) => CallTermination(control::CallTermination::new(lc)),
        (Vendor::Standard, 0x18) => IdentifierUpdate(parse_band(UpdateLayout::Plain, p)),
        (Vendor::Standard, 0x19) =>
            IdentifierUpdateExplicit(parse_band(UpdateLayout::VhfUhf, p)),
        (Vendor::Standard, 0x20) => SystemServiceBroadcast(ServiceBroadcast::new(p)),
        (Vendor::Standard, 0x21) => SecondaryControlChannel(SecondaryControl::new(p)),
        (Vendor::Standard, 0x22) => AdjacentSiteStatus(SiteStatus::new(p)),
        (Vendor::Standard, 0x23) => RfssStatus(SiteStatus::new(p)),
        (Vendor::Standard, 0x24) => NetworkStatus(fields::NetworkStatus::new(p)),
        (Vendor::Motorola, 0x00) => PatchGroupUser(control::PatchGroupUser::new(lc)),
        (Vendor::Motorola, 0x01) => PatchGroupUpdate(control::PatchGroupUpdate::new(lc)),
        _ => Unknown(lc),
    };

    trace!(opcode = op.opcode, vendor = %op.vendor, kind = word.label(), "link control");

    word
}

/// Select the TSBK variant for the given block.
pub fn tsbk(t: TsbkFields) -> Tsbk {
    let op = t.opcode();
    let p = t.payload();

    let block = match op.vendor {
        Vendor::Standard => standard_tsbk(&t, op.opcode, p),
        Vendor::Motorola => match motorola_tsbk(&t, op.opcode, p) {
            Some(m) => Tsbk::Motorola(m),
            None => Tsbk::Unknown(t),
        },
        _ => Tsbk::Unknown(t),
    };

    trace!(opcode = op.opcode, vendor = %op.vendor, kind = block.label(), "tsbk");

    block
}

fn standard_tsbk(t: &TsbkFields, opcode: u8, p: &[u8]) -> Tsbk {
    use crate::trunking::tsbk::Tsbk::*;

    match opcode {
        0x00 => GroupVoiceGrant(tsbk::GroupVoiceGrant::new(t)),
        0x02 => GroupVoiceUpdate(parse_updates(p)),
        0x03 => GroupVoiceUpdateExplicit(tsbk::GroupVoiceUpdateExplicit::new(t)),
        0x04 => UnitVoiceGrant(tsbk::UnitVoiceGrant::new(t)),
        0x05 => UnitAnswerRequest(tsbk::UnitAnswerRequest::new(t)),
        0x06 => UnitVoiceUpdate(tsbk::UnitVoiceGrant::new(t)),
        0x08 => PhoneGrant(tsbk::PhoneGrant::new(t)),
        0x09 => PhoneGrantUpdate(tsbk::PhoneGrant::new(t)),
        0x10 => UnitDataGrant(tsbk::DataChannelGrant::new(t)),
        0x11 => GroupDataGrant(tsbk::DataChannelGrant::new(t)),
        0x12 => GroupDataAnnouncement(parse_updates(p)),
        0x13 => GroupDataAnnouncementExplicit(tsbk::GroupVoiceUpdateExplicit::new(t)),
        0x14 => DataGrant(tsbk::DataGrant::new(t)),
        0x16 => DataAnnouncementExplicit(tsbk::DataChannelAnnouncement::new(t)),
        0x18 => StatusUpdate(tsbk::UnitRequest::new(t)),
        0x1A => StatusQuery(tsbk::UnitRequest::new(t)),
        0x1C => MessageUpdate(tsbk::UnitRequest::new(t)),
        0x1D => RadioMonitor(tsbk::UnitRequest::new(t)),
        0x1F => CallAlert(tsbk::UnitRequest::new(t)),
        0x20 => Acknowledge(tsbk::Acknowledge::new(t)),
        0x21 => Queued(tsbk::ServiceResponse::new(t)),
        0x24 => ExtendedFunction(tsbk::ExtendedFunction::new(t)),
        0x27 => Deny(tsbk::ServiceResponse::new(t)),
        0x28 => GroupAffiliationResponse(tsbk::GroupAffiliationResponse::new(t)),
        0x29 => SecondaryControlExplicit(tsbk::SecondaryControlExplicit::new(t)),
        0x2A => GroupAffiliationQuery(tsbk::UnitCommand::new(t)),
        0x2C => UnitRegistrationResponse(tsbk::UnitRegistrationResponse::new(t)),
        0x2D => UnitRegistrationCommand(tsbk::UnitCommand::new(t)),
        0x2E => AuthenticationCommand(tsbk::AuthenticationCommand::new(t)),
        0x2F => DeregistrationAck(tsbk::DeregistrationAck::new(t)),
        0x33 => IdentifierUpdateTdma(parse_band(UpdateLayout::Tdma, p)),
        0x34 => IdentifierUpdateVuhf(parse_band(UpdateLayout::VhfUhf, p)),
        0x35 => TimeDate(tsbk::TimeDate::new(t)),
        0x36 => RoamingAddressCommand(tsbk::RoamingAddressCommand::new(t)),
        0x37 => RoamingAddressUpdate(tsbk::RoamingAddressUpdate::new(t)),
        0x38 => SystemServiceBroadcast(ServiceBroadcast::new(p)),
        0x39 => SecondaryControlChannel(SecondaryControl::new(p)),
        0x3A => RfssStatus(SiteStatus::new(p)),
        0x3B => NetworkStatus(fields::NetworkStatus::new(p)),
        0x3C => AdjacentSiteStatus(SiteStatus::new(p)),
        0x3D => IdentifierUpdate(parse_band(UpdateLayout::Plain, p)),
        0x3E => ProtectionParameterBroadcast(tsbk::ProtectionParameters::new(t)),
        _ => Unknown(*t),
    }
}

fn motorola_tsbk(t: &TsbkFields, opcode: u8, p: &[u8]) -> Option<MotorolaTsbk> {
    use crate::trunking::motorola::MotorolaTsbk::*;

    Some(match opcode {
        0x00 => PatchGroupAdd(motorola::PatchGroup::new(t)),
        0x01 => PatchGroupDelete(motorola::PatchGroup::new(t)),
        0x02 => PatchGroupGrant(motorola::PatchGroupGrant::new(t)),
        0x03 => PatchGroupGrantUpdate(parse_updates(p)),
        0x09 => SystemLoading(*t),
        0x0B => BaseStationId(motorola::BaseStationId::new(t)),
        0x0E => PlannedShutdown(*t),
        _ => return None,
    })
}

/// Select the packet variant for the given sequence from its format, SAP, and (for
/// AMBTC) opcode.
pub fn packet(seq: PduSequence) -> Packet {
    let class = seq.header().class();

    let packet = match class.format {
        PacketFormat::Confirmed if is_user_data(class.sap) => Packet::Confirmed(seq),
        PacketFormat::Unconfirmed if class.sap.is_trunking() =>
            Packet::Umbtc(ambtc::Umbtc::new(seq)),
        PacketFormat::Unconfirmed if is_user_data(class.sap) => Packet::Unconfirmed(seq),
        PacketFormat::Response => Packet::Response(seq),
        PacketFormat::Trunking if class.vendor.is_standard() => match class.opcode {
            Some(0x00) => Packet::GroupVoiceGrant(ambtc::GroupVoiceGrant::new(seq)),
            Some(0x04) => Packet::UnitVoiceGrant(ambtc::UnitVoiceGrant::new(seq)),
            Some(0x37) => Packet::RoamingAddressUpdate(ambtc::RoamingAddressUpdate::new(seq)),
            Some(0x3B) => Packet::NetworkStatus(ambtc::NetworkStatusBroadcast::new(seq)),
            Some(0x3C) => Packet::AdjacentSiteStatus(ambtc::AdjacentSiteStatus::new(seq)),
            _ => Packet::Sequence(seq),
        },
        _ => Packet::Sequence(seq),
    };

    trace!(format = ?class.format, sap = ?class.sap, opcode = ?class.opcode,
           kind = packet.label(), "packet");

    packet
}

fn is_user_data(sap: ServiceAccessPoint) -> bool {
    matches!(sap, ServiceAccessPoint::PacketData | ServiceAccessPoint::UnencryptedUserData)
}
