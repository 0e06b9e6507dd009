//! Typed message tags and the data that flows between the transport
//! layer and the worker pool.

use crate::payload::PayloadBuf;

/// The four message kinds that can appear as the first byte of a
/// payload, immediately after framing strips the link-layer envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// Blocking call awaiting a `Resp`/`Err` with the same `seq`.
    Req = 0x0B,
    /// Fire-and-forget call, no response expected.
    Stream = 0x0C,
    /// Successful handler result.
    Resp = 0x16,
    /// Handler failure, carries an [`crate::error::ErrorTag`] byte.
    Err = 0x21,
}

impl MessageType {
    pub fn from_u8(b: u8) -> Option<Self> {
        match b {
            0x0B => Some(MessageType::Req),
            0x0C => Some(MessageType::Stream),
            0x16 => Some(MessageType::Resp),
            0x21 => Some(MessageType::Err),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// A request or stream call that has been decoded off the wire and is
/// waiting for a worker thread to pick it up.
#[derive(Debug, Clone)]
pub struct WorkerRequestItem {
    pub msg_type: MessageType,
    pub seq: u8,
    pub name: String,
    pub args: PayloadBuf,
}
