//! Wire frame layout.
//!
//! ```text
//! SOF | len_lo | len_hi | hdr_crc | SOD | payload (payload_len bytes) | pkt_crc | EOF
//! ```
//!
//! `len` is a two-byte little-endian count of the segment `SOD | payload
//! | pkt_crc | EOF`, so `payload_len = len - 3`. `hdr_crc` checksums
//! `SOF, len_lo, len_hi`; `pkt_crc` checksums `SOD` followed by the
//! payload, so a frame whose `SOD` marker itself got corrupted still
//! fails its checksum rather than silently parsing the wrong payload
//! length.

use rpc_core::constants::{CRC_INIT, CRC_POLY, EOF, MAX_PKT_LEN, MIN_PAYLOAD, MIN_PKT_LEN, PAYLOAD_MAX, SOD, SOF};
use rpc_core::error::LinkError;
use rpc_crc::crc8;

/// Encodes `payload` into a complete frame, ready to hand to a PHY.
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>, LinkError> {
    if payload.len() < MIN_PAYLOAD || payload.len() > PAYLOAD_MAX {
        return Err(LinkError::PayloadSize(payload.len()));
    }
    let len = payload.len() + 3;
    debug_assert!((MIN_PKT_LEN..=MAX_PKT_LEN).contains(&len));
    let len_lo = (len & 0xFF) as u8;
    let len_hi = ((len >> 8) & 0xFF) as u8;
    let hdr_crc = crc8(&[SOF, len_lo, len_hi], CRC_INIT, CRC_POLY);

    let mut pkt_crc_input = Vec::with_capacity(payload.len() + 1);
    pkt_crc_input.push(SOD);
    pkt_crc_input.extend_from_slice(payload);
    let pkt_crc = crc8(&pkt_crc_input, CRC_INIT, CRC_POLY);

    let mut frame = Vec::with_capacity(payload.len() + 7);
    frame.push(SOF);
    frame.push(len_lo);
    frame.push(len_hi);
    frame.push(hdr_crc);
    frame.push(SOD);
    frame.extend_from_slice(payload);
    frame.push(pkt_crc);
    frame.push(EOF);
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_rejects_undersize_payload() {
        assert!(encode_frame(&[]).is_err());
    }

    #[test]
    fn encode_rejects_oversize_payload() {
        let data = vec![0u8; PAYLOAD_MAX + 1];
        assert!(encode_frame(&data).is_err());
    }

    #[test]
    fn encode_produces_expected_envelope() {
        let payload = vec![0u8; MIN_PAYLOAD];
        let frame = encode_frame(&payload).unwrap();
        let len = payload.len() + 3;
        assert_eq!(frame[0], SOF);
        assert_eq!(frame[1], (len & 0xFF) as u8);
        assert_eq!(frame[2], ((len >> 8) & 0xFF) as u8);
        assert_eq!(frame[4], SOD);
        assert_eq!(*frame.last().unwrap(), EOF);
        assert_eq!(frame.len(), payload.len() + 7);
    }

    /// A RESP carrying `type=0x16 seq=1 "pong"`, reproducing the ping
    /// round-trip scenario's frame byte-for-byte.
    #[test]
    fn encode_reproduces_the_ping_response_frame() {
        let payload = [0x16u8, 0x01, b'p', b'o', b'n', b'g'];
        let frame = encode_frame(&payload).unwrap();
        assert_eq!(
            frame,
            vec![0xFA, 0x09, 0x00, 0x56, 0xFB, 0x16, 0x01, b'p', b'o', b'n', b'g', 0x9A, 0xFE]
        );
    }
}
