//! Byte-at-a-time frame decoder.
//!
//! The RX thread feeds raw PHY bytes in one at a time; there is no
//! guarantee they line up on frame boundaries, so the decoder has to
//! track where it is in the envelope and recover from garbage without
//! wedging. A byte seen while not inside a frame attempt is wire noise
//! and is reported as such rather than as an error — only a failure
//! partway through a frame we already started trusting (bad CRC, a
//! missing `SOD`/`EOF`) is a [`LinkError`].

use rpc_core::constants::{CRC_INIT, CRC_POLY, EOF, MAX_PKT_LEN, MIN_PKT_LEN, SOD, SOF};
use rpc_core::error::LinkError;
use rpc_core::payload::PayloadBuf;
use rpc_crc::Crc8;

#[derive(Debug)]
pub enum FeedEvent {
    /// More bytes needed before a frame completes.
    Pending,
    /// A fully validated frame; payload is the decoded bytes.
    Frame(PayloadBuf),
    /// A byte arrived while no frame attempt was in progress.
    Noise(u8),
    /// A frame attempt was abandoned mid-parse.
    Rejected(LinkError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    WaitSof,
    ReadLen1,
    ReadLen2,
    ReadHdrCrc,
    WaitSod,
    ReadPayload,
    ReadPktCrc,
    WaitEof,
}

pub struct Decoder {
    state: State,
    len_lo: u8,
    len: usize,
    hdr_crc: Crc8,
    pkt_crc: Crc8,
    payload: PayloadBuf,
}

impl Decoder {
    pub fn new() -> Self {
        Decoder {
            state: State::WaitSof,
            len_lo: 0,
            len: 0,
            hdr_crc: Crc8::new(CRC_INIT, CRC_POLY),
            pkt_crc: Crc8::new(CRC_INIT, CRC_POLY),
            payload: PayloadBuf::new(),
        }
    }

    fn reset(&mut self) {
        self.state = State::WaitSof;
        self.len_lo = 0;
        self.len = 0;
        self.hdr_crc = Crc8::new(CRC_INIT, CRC_POLY);
        self.pkt_crc = Crc8::new(CRC_INIT, CRC_POLY);
        self.payload.clear();
    }

    pub fn feed(&mut self, byte: u8) -> FeedEvent {
        match self.state {
            State::WaitSof => {
                if byte == SOF {
                    self.hdr_crc = Crc8::new(CRC_INIT, CRC_POLY);
                    self.hdr_crc.update(byte);
                    self.state = State::ReadLen1;
                    FeedEvent::Pending
                } else {
                    FeedEvent::Noise(byte)
                }
            }
            State::ReadLen1 => {
                self.len_lo = byte;
                self.hdr_crc.update(byte);
                self.state = State::ReadLen2;
                FeedEvent::Pending
            }
            State::ReadLen2 => {
                self.hdr_crc.update(byte);
                self.len = (self.len_lo as usize) | ((byte as usize) << 8);
                if self.len < MIN_PKT_LEN || self.len > MAX_PKT_LEN {
                    let bad_len = self.len;
                    self.reset();
                    return FeedEvent::Rejected(LinkError::PayloadSize(bad_len));
                }
                self.state = State::ReadHdrCrc;
                FeedEvent::Pending
            }
            State::ReadHdrCrc => {
                let ok = self.hdr_crc.finish() == byte;
                if !ok {
                    self.reset();
                    return FeedEvent::Rejected(LinkError::HeaderCrc);
                }
                self.state = State::WaitSod;
                FeedEvent::Pending
            }
            State::WaitSod => {
                if byte != SOD {
                    self.reset();
                    return FeedEvent::Rejected(LinkError::Framing);
                }
                self.payload.clear();
                self.pkt_crc = Crc8::new(CRC_INIT, CRC_POLY);
                self.pkt_crc.update(byte);
                let payload_len = self.len - 3;
                if payload_len == 0 {
                    self.state = State::ReadPktCrc;
                } else {
                    self.state = State::ReadPayload;
                }
                FeedEvent::Pending
            }
            State::ReadPayload => {
                self.pkt_crc.update(byte);
                // Infallible: len was bounds-checked against MAX_PKT_LEN above.
                let _ = self.payload.push(byte);
                if self.payload.len() == self.len - 3 {
                    self.state = State::ReadPktCrc;
                }
                FeedEvent::Pending
            }
            State::ReadPktCrc => {
                let ok = self.pkt_crc.finish() == byte;
                if !ok {
                    self.reset();
                    return FeedEvent::Rejected(LinkError::PacketCrc);
                }
                self.state = State::WaitEof;
                FeedEvent::Pending
            }
            State::WaitEof => {
                if byte != EOF {
                    self.reset();
                    return FeedEvent::Rejected(LinkError::Framing);
                }
                let payload = self.payload;
                self.reset();
                FeedEvent::Frame(payload)
            }
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::encode_frame;

    fn decode_all(decoder: &mut Decoder, bytes: &[u8]) -> Vec<FeedEvent> {
        bytes.iter().map(|&b| decoder.feed(b)).collect()
    }

    #[test]
    fn round_trips_a_well_formed_frame() {
        let payload = b"pingpong".to_vec();
        let frame = encode_frame(&payload).unwrap();
        let mut decoder = Decoder::new();
        let events = decode_all(&mut decoder, &frame);
        let last = events.last().unwrap();
        match last {
            FeedEvent::Frame(buf) => assert_eq!(buf.as_slice(), payload.as_slice()),
            other => panic!("expected Frame, got {other:?}"),
        }
    }

    #[test]
    fn decodes_the_literal_ping_response_scenario() {
        let frame = [0xFAu8, 0x09, 0x00, 0x56, 0xFB, 0x16, 0x01, b'p', b'o', b'n', b'g', 0x9A, 0xFE];
        let mut decoder = Decoder::new();
        let events = decode_all(&mut decoder, &frame);
        match events.last().unwrap() {
            FeedEvent::Frame(buf) => assert_eq!(buf.as_slice(), [0x16, 0x01, b'p', b'o', b'n', b'g']),
            other => panic!("expected Frame, got {other:?}"),
        }
    }

    #[test]
    fn corrupted_pkt_crc_is_rejected_and_the_next_frame_still_decodes() {
        // Valid ping REQ frame (type=0x0B seq=1 name="ping") with pkt_crc
        // XORed by 0x01: the decoder must reject it without emitting a
        // payload, then resynchronize on the next frame.
        let mut bad = [0xFAu8, 0x0A, 0x00, 0x69, 0xFB, 0x0B, 0x01, b'p', b'i', b'n', b'g', 0x00, 0x28, 0xFE];
        bad[12] ^= 0x01;
        let good = encode_frame(b"ping-pong").unwrap();

        let mut bytes = bad.to_vec();
        bytes.extend_from_slice(&good);

        let mut decoder = Decoder::new();
        let events = decode_all(&mut decoder, &bytes);
        assert!(events.iter().any(|e| matches!(e, FeedEvent::Rejected(LinkError::PacketCrc))));
        assert!(matches!(events.last(), Some(FeedEvent::Frame(buf)) if buf.as_slice() == b"ping-pong"));
    }

    #[test]
    fn leading_noise_is_reported_but_does_not_block_the_next_frame() {
        let payload = b"pingpong".to_vec();
        let frame = encode_frame(&payload).unwrap();
        let mut bytes = vec![0x00, 0x11, 0xAB];
        bytes.extend_from_slice(&frame);

        let mut decoder = Decoder::new();
        let events = decode_all(&mut decoder, &bytes);
        let noise_count = events
            .iter()
            .filter(|e| matches!(e, FeedEvent::Noise(_)))
            .count();
        assert_eq!(noise_count, 3);
        assert!(matches!(events.last(), Some(FeedEvent::Frame(_))));
    }

    #[test]
    fn corrupted_payload_byte_fails_packet_crc() {
        let payload = b"pingpong".to_vec();
        let mut frame = encode_frame(&payload).unwrap();
        let payload_start = 5;
        frame[payload_start] ^= 0x01;

        let mut decoder = Decoder::new();
        let events = decode_all(&mut decoder, &frame);
        assert!(events
            .iter()
            .any(|e| matches!(e, FeedEvent::Rejected(LinkError::PacketCrc))));
    }

    #[test]
    fn corrupted_header_crc_is_rejected_before_payload_parsing() {
        let payload = b"pingpong".to_vec();
        let mut frame = encode_frame(&payload).unwrap();
        frame[3] ^= 0x01;

        let mut decoder = Decoder::new();
        let events = decode_all(&mut decoder, &frame);
        assert!(events
            .iter()
            .any(|e| matches!(e, FeedEvent::Rejected(LinkError::HeaderCrc))));
    }

    #[test]
    fn decoder_recovers_after_a_rejected_frame() {
        let good = encode_frame(b"pingpong").unwrap();
        let mut bad = encode_frame(b"pingpong").unwrap();
        bad[3] ^= 0x01; // corrupt hdr_crc of the first frame

        let mut bytes = bad;
        bytes.extend_from_slice(&good);

        let mut decoder = Decoder::new();
        let events = decode_all(&mut decoder, &bytes);
        assert!(events
            .iter()
            .any(|e| matches!(e, FeedEvent::Rejected(LinkError::HeaderCrc))));
        assert!(matches!(events.last(), Some(FeedEvent::Frame(_))));
    }

    #[test]
    fn missing_eof_marker_is_rejected() {
        let mut frame = encode_frame(b"pingpong").unwrap();
        *frame.last_mut().unwrap() = 0x00;

        let mut decoder = Decoder::new();
        let events = decode_all(&mut decoder, &frame);
        assert!(events
            .iter()
            .any(|e| matches!(e, FeedEvent::Rejected(LinkError::Framing))));
    }
}
