//! Per-channel decoding: frames in, messages out.
//!
//! A `Decoder` owns the band cache of one logical channel, so frames from different
//! channels need different decoders. Decoders share nothing and can each run on their
//! own thread.

#[cfg(feature = "ser")]
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::band::BandResolver;
use crate::buffer::BitBuffer;
use crate::error::{DecodeError, Result};
use crate::message::{factory, Frame, Message};
use crate::nid::NetworkAccessCode;
use crate::stats::Stats;

/// Runtime knobs for decoding.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "ser", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "ser", serde(default))]
pub struct DecoderConfig {
    /// Whether CRC stages search for and flip single-bit errors.
    pub crc_search: bool,
    /// Maximum TSBK blocks decoded from one trunking frame.
    pub max_tsbk_blocks: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            crc_search: true,
            max_tsbk_blocks: 3,
        }
    }
}

/// Receives the output of `Decoder::feed`.
pub trait MessageHandler {
    /// Called for each decoded message, valid or not.
    fn handle_message(&mut self, msg: Message);

    /// Called when a frame couldn't be decoded at all.
    fn handle_error(&mut self, err: DecodeError) {
        warn!(%err, "dropping frame");
    }
}

/// Decodes the frames of one logical channel and resolves their channel references
/// against the bands the channel has announced.
#[derive(Default)]
pub struct Decoder {
    config: DecoderConfig,
    resolver: BandResolver,
    stats: Stats,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Decoder {
        Decoder {
            config,
            resolver: BandResolver::new(),
            stats: Stats::default(),
        }
    }

    pub fn config(&self) -> &DecoderConfig { &self.config }
    pub fn resolver(&self) -> &BandResolver { &self.resolver }
    pub fn stats(&self) -> &Stats { &self.stats }

    /// Move the accumulated stats into the given object.
    pub fn take_stats(&mut self, into: &mut Stats) {
        into.merge(&mut self.stats);
    }

    /// Decode the given frame into its messages.
    pub fn decode(&mut self, frame: Frame) -> Result<Vec<Message>> {
        let msgs = factory::build(frame, &self.config)?;

        for msg in &msgs {
            self.accept(msg);
        }

        Ok(msgs)
    }

    /// Decode a packet delivered as a header block and its data blocks, with `None`
    /// for blocks lost in transport.
    pub fn decode_packet(&mut self, nac: NetworkAccessCode, timestamp: u64,
                         header: &mut BitBuffer, blocks: &[Option<BitBuffer>])
        -> Result<Message>
    {
        let msg = factory::sequence(nac, timestamp, header, blocks, self.config.crc_search)?;
        self.accept(&msg);

        Ok(msg)
    }

    /// Decode the given frame and hand the result to the given handler.
    pub fn feed<H: MessageHandler>(&mut self, frame: Frame, handler: &mut H) {
        match self.decode(frame) {
            Ok(msgs) => msgs.into_iter().for_each(|m| handler.handle_message(m)),
            Err(err) => handler.handle_error(err),
        }
    }

    fn accept(&mut self, msg: &Message) {
        trace!(label = msg.label(), valid = msg.is_valid(), "decoded");

        self.resolver.process(msg);
        self.stats.record(msg.checks(), msg.corrected_bits());
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coding::Stage;
    use crate::nid::{DataUnit, NetworkId};
    use crate::trunking::tsbk::test::block;
    use crate::voice::term::test::encode as encode_term;

    fn frame(du: DataUnit, bits: BitBuffer) -> Frame {
        Frame::new(NetworkId::new(NetworkAccessCode::Default, du), bits, 0)
    }

    fn band_update() -> BitBuffer {
        BitBuffer::from_bytes(&block([
            0xBD, 0x00, 0x33, 0x22, 0xD0, 0x32, 0x0A, 0x25, 0x10, 0xA2,
        ]))
    }

    #[derive(Default)]
    struct Collect {
        msgs: Vec<Message>,
        errs: Vec<DecodeError>,
    }

    impl MessageHandler for Collect {
        fn handle_message(&mut self, msg: Message) { self.msgs.push(msg); }
        fn handle_error(&mut self, err: DecodeError) { self.errs.push(err); }
    }

    #[test]
    fn test_late_band() {
        let mut d = Decoder::new(DecoderConfig::default());

        let lc = [0x22, 0x12, 0x03, 0x45, 0x67, 0x89, 0x30, 0x64, 0x70];
        let site = d.decode(frame(DataUnit::VoiceLcTerminator, encode_term(&lc)))
            .expect("decode").remove(0);

        assert_eq!(site.downlink_frequency(), 0);
        assert_eq!(d.resolver().pending(), 1);

        let update = d.decode(frame(DataUnit::TrunkingSignaling, band_update()))
            .expect("decode");

        assert_eq!(update.len(), 1);
        assert_eq!(d.resolver().pending(), 0);
        assert_eq!(site.downlink_frequency(), 851_006_250 + 100 * 6_250);

        // Channels decoded after the band resolve right away.
        let again = d.decode(frame(DataUnit::VoiceLcTerminator, encode_term(&lc)))
            .expect("decode").remove(0);
        assert_eq!(again.downlink_frequency(), site.downlink_frequency());
    }

    #[test]
    fn test_invalid_band_ignored() {
        let config = DecoderConfig { crc_search: false, ..DecoderConfig::default() };
        let mut d = Decoder::new(config);

        let mut bits = band_update();
        bits.set(40, !bits.bit(40));

        let msgs = d.decode(frame(DataUnit::TrunkingSignaling, bits)).expect("decode");

        assert!(!msgs[0].is_valid());
        assert!(d.resolver().band(3).is_none());
        assert_eq!(d.stats().invalid, 1);
        assert_eq!(d.stats().code(Stage::Crc16).err, 1);
    }

    #[test]
    fn test_feed() {
        let mut d = Decoder::new(DecoderConfig::default());
        let mut c = Collect::default();

        d.feed(frame(DataUnit::VoiceSimpleTerminator, BitBuffer::new(0)), &mut c);
        d.feed(frame(DataUnit::VoiceHeader, BitBuffer::new(10)), &mut c);
        d.feed(frame(DataUnit::TrunkingSignaling, band_update()), &mut c);

        assert_eq!(c.msgs.len(), 2);
        assert_eq!(c.msgs[0].label(), "TERMINATOR");
        assert_eq!(c.msgs[1].label(), "IDENTIFIER UPDATE");
        assert_eq!(c.errs.len(), 1);
        assert!(matches!(c.errs[0], DecodeError::ShortFrame { expected: 648, .. }));

        let mut total = Stats::default();
        d.take_stats(&mut total);

        assert_eq!(total.messages, 2);
        assert_eq!(total.crc16.runs, 1);
        assert_eq!(d.stats().messages, 0);
    }

    #[test]
    fn test_max_blocks() {
        let config = DecoderConfig { max_tsbk_blocks: 1, ..DecoderConfig::default() };
        let mut d = Decoder::new(config);

        let mut bytes = block([0x3C, 0x00, 0x12, 0x03, 0x45, 0x67, 0x89, 0x30, 0x64, 0x70])
            .to_vec();
        bytes.extend_from_slice(&block([0xBD, 0x00, 0x33, 0x22, 0xD0, 0x32, 0x0A, 0x25,
                                        0x10, 0xA2]));

        let msgs = d.decode(frame(DataUnit::TrunkingSignaling, BitBuffer::from_bytes(&bytes)))
            .expect("decode");

        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].label(), "ADJACENT SITE STATUS");
    }
}
