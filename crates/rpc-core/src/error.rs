//! Per-layer error types.
//!
//! Each layer gets its own small enum rather than one shared "RPC error"
//! — a link-layer framing failure and a transport-layer timeout are
//! different enough in cause and handling that collapsing them loses
//! information callers need. `gerror` is reserved for façade-level setup
//! failures (bad config, PHY open failure); see that crate's `codes::rpc`
//! module.

use std::fmt;

/// Failures from [`crate::osal`] primitives (bounded queues, semaphores).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsalError {
    /// A bounded send/take did not complete before its deadline.
    TimedOut,
    /// The queue is full and the caller asked for a non-blocking try.
    WouldBlock,
    /// The channel's peer half has been dropped.
    Closed,
}

impl fmt::Display for OsalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsalError::TimedOut => write!(f, "operation timed out"),
            OsalError::WouldBlock => write!(f, "queue full, would block"),
            OsalError::Closed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for OsalError {}

pub type OsalResult<T> = std::result::Result<T, OsalError>;

/// Failures from [`crate`] link-layer framing/decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// Payload is larger than `PAYLOAD_MAX` or smaller than `MIN_PAYLOAD`.
    PayloadSize(usize),
    /// Header checksum did not match.
    HeaderCrc,
    /// Payload checksum did not match.
    PacketCrc,
    /// A frame marker (`SOD`/`EOF`) was missing where expected.
    Framing,
    /// The underlying PHY returned an error.
    Phy,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::PayloadSize(n) => write!(f, "payload size {n} out of range"),
            LinkError::HeaderCrc => write!(f, "header CRC mismatch"),
            LinkError::PacketCrc => write!(f, "packet CRC mismatch"),
            LinkError::Framing => write!(f, "malformed frame"),
            LinkError::Phy => write!(f, "PHY I/O error"),
        }
    }
}

impl std::error::Error for LinkError {}

pub type LinkResult<T> = std::result::Result<T, LinkError>;

/// Outcome tag carried on the wire inside an `ERR` message, distinct from
/// [`TransportError`] (which is a local, Rust-side `Result` error — the
/// wire only ever carries one of these four bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTag {
    /// No handler registered under the requested name.
    NoFunc,
    /// Argument or result payload exceeded its cap.
    Overflow,
    /// Arguments failed the handler's own validation.
    InvalidArgs,
    /// The handler did not return before its deadline.
    Timeout,
    /// The handler ran and returned failure.
    Fail,
}

impl ErrorTag {
    pub fn as_u8(self) -> u8 {
        match self {
            ErrorTag::NoFunc => 0x01,
            ErrorTag::Overflow => 0x02,
            ErrorTag::InvalidArgs => 0x03,
            ErrorTag::Timeout => 0x04,
            ErrorTag::Fail => 0x05,
        }
    }

    pub fn from_u8(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(ErrorTag::NoFunc),
            0x02 => Some(ErrorTag::Overflow),
            0x03 => Some(ErrorTag::InvalidArgs),
            0x04 => Some(ErrorTag::Timeout),
            0x05 => Some(ErrorTag::Fail),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorTag::NoFunc => "no such function",
            ErrorTag::Overflow => "payload overflow",
            ErrorTag::InvalidArgs => "invalid arguments",
            ErrorTag::Timeout => "handler timed out",
            ErrorTag::Fail => "handler failed",
        };
        write!(f, "{s}")
    }
}

/// Failures from [`crate`] transport-layer operations: registry, waiter
/// table, `request`/`stream` entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The registry is full.
    RegistryFull,
    /// Name fell outside `MIN_NAME..=MAX_NAME`.
    BadName,
    /// Argument slice exceeded `ARGS_MAX`.
    ArgsOverflow,
    /// No waiter slot was free for a new in-flight request.
    WaiterTableFull,
    /// A `request()` call did not see a response before its deadline.
    Timeout,
    /// The remote side reported an error tag.
    Remote(ErrorTag),
    /// The underlying link layer failed.
    Link(LinkError),
    /// A `WAIT_FOREVER` queue send failed — only reachable if the queue's
    /// peer half has gone away.
    QueueClosed,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::RegistryFull => write!(f, "registry full"),
            TransportError::BadName => write!(f, "name length out of range"),
            TransportError::ArgsOverflow => write!(f, "argument payload too large"),
            TransportError::WaiterTableFull => write!(f, "too many in-flight requests"),
            TransportError::Timeout => write!(f, "request timed out"),
            TransportError::Remote(tag) => write!(f, "remote error: {tag}"),
            TransportError::Link(e) => write!(f, "link error: {e}"),
            TransportError::QueueClosed => write!(f, "queue closed under a WAIT_FOREVER send"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<LinkError> for TransportError {
    fn from(e: LinkError) -> Self {
        TransportError::Link(e)
    }
}

impl From<OsalError> for TransportError {
    fn from(_: OsalError) -> Self {
        TransportError::QueueClosed
    }
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;
