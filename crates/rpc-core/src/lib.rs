//! Shared types for the RPC stack: size constants, the per-layer error
//! taxonomy, the fixed-capacity payload buffer, typed message tags, the
//! handler trait, and the OS abstraction traits every other layer is
//! written against.

pub mod constants;
pub mod error;
pub mod handler;
pub mod log;
pub mod message;
pub mod osal;
pub mod payload;
pub mod phy;

pub use constants::*;
pub use error::{ErrorTag, LinkError, LinkResult, OsalError, OsalResult, TransportError, TransportResult};
pub use handler::Handler;
pub use message::{MessageType, WorkerRequestItem};
pub use osal::{BinarySemaphore, BoundedQueue, ThreadSpawner, WaitTimeout};
pub use payload::PayloadBuf;
pub use phy::Phy;
