//! Size limits and defaults shared by every layer.
//!
//! These come straight from the wire contract: a handler name is between
//! [`MIN_NAME`] and [`MAX_NAME`] bytes, arguments are at most
//! [`ARGS_MAX`] bytes, and so on. Every layer validates against the same
//! numbers so a frame that the link layer accepts never overflows the
//! transport layer's buffers.

/// Shortest legal handler name, in bytes.
pub const MIN_NAME: usize = 1;
/// Longest legal handler name, in bytes (NUL excluded).
pub const MAX_NAME: usize = 32;
/// Largest argument blob a request/stream message may carry.
pub const ARGS_MAX: usize = 64;
/// Largest response/error payload a handler may produce.
pub const OUT_CAP: usize = 64;

/// `type(1) + seq(1) + name(MAX_NAME) + NUL(1) + args(ARGS_MAX)`
pub const PAYLOAD_MAX: usize = 1 + 1 + MAX_NAME + 1 + ARGS_MAX;
/// `type(1) + seq(1) + name(MIN_NAME) + NUL(1) + args(0)`
pub const MIN_PAYLOAD: usize = 1 + 1 + MIN_NAME + 1;

/// Frame `len` field counts `SOD + payload + pkt_crc + EOF`, so its valid
/// range tracks `PAYLOAD_MAX`/`MIN_PAYLOAD` offset by those three fixed
/// bytes.
pub const MIN_PKT_LEN: usize = MIN_PAYLOAD + 3;
pub const MAX_PKT_LEN: usize = PAYLOAD_MAX + 3;

/// Maximum number of handlers the registry will hold.
pub const REG_MAX: usize = 16;
/// Maximum number of requests that can be in flight (awaiting a response)
/// at once.
pub const WAITER_MAX: usize = 8;
/// Number of worker threads in the default pool.
pub const WORKER_COUNT: usize = 1;

/// Depth of the RX queue (link layer -> dispatcher).
pub const RX_QUEUE_DEPTH: usize = 16;
/// Depth of the TX queue (dispatcher/workers -> link layer).
pub const TX_QUEUE_DEPTH: usize = 16;
/// Depth of each worker's inbound work queue.
pub const WORKER_QUEUE_DEPTH: usize = 16;

/// Default time a blocking `request()` call waits for its response.
pub const REQ_TIMEOUT_DEFAULT_MS: u64 = 200;
/// Default time a worker waits for a handler to return before treating
/// the call as timed out.
pub const HANDLER_TIMEOUT_DEFAULT_MS: u64 = 150;

/// CRC-8 seed shared by header and payload checksums.
pub const CRC_INIT: u8 = 0x00;
/// CRC-8 polynomial shared by header and payload checksums.
pub const CRC_POLY: u8 = 0x07;

/// Start-of-frame marker.
pub const SOF: u8 = 0xFA;
/// Start-of-data marker, between header and payload.
pub const SOD: u8 = 0xFB;
/// End-of-frame marker.
pub const EOF: u8 = 0xFE;
