//! The physical-transport boundary the link layer reads and writes
//! through. A `Phy` knows nothing about frames, CRCs or message types —
//! it moves bytes in and out of whatever medium backs it (a pipe, a
//! serial port, a socket).

use crate::error::LinkError;

pub trait Phy: Send + Sync {
    /// Writes `bytes` out. **Contract:** either all of `bytes` are
    /// written or an error is returned; partial writes are not exposed
    /// to callers.
    fn send(&self, bytes: &[u8]) -> Result<(), LinkError>;

    /// Reads one byte, blocking up to `timeout_ms` (or forever if
    /// `None`). Returns `Ok(None)` on timeout, `Err` if the medium
    /// itself failed (not merely idle).
    fn recv_byte(&self, timeout_ms: Option<u64>) -> Result<Option<u8>, LinkError>;
}
