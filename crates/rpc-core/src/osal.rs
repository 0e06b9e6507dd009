//! Operating-system abstraction traits.
//!
//! Everything above this layer (link, transport, worker pool) is written
//! against these traits, never against `std::thread`/`std::sync`
//! directly, so the stack can be retargeted to a different OS or a
//! no-std executor by swapping the implementation crate. `rpc-osal`
//! supplies the only implementation today, built on `std`.
//!
//! `std::sync::Mutex<T>` is used directly wherever plain mutual exclusion
//! is needed — Rust's ownership model already makes that primitive safe
//! to use concretely, so there is no separate `Mutex` trait here the way
//! a C OSAL would need one.

use crate::error::OsalResult;

/// How long a blocking OSAL call should wait before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTimeout {
    Forever,
    Millis(u64),
    /// Equivalent to a zero-duration timeout: try once, don't block.
    TryOnce,
}

/// A bounded, blocking multi-producer multi-consumer queue.
///
/// # Implementors
///
/// `rpc-osal::ArrayBlockingQueue<T>` is the only implementation; it
/// wraps `crossbeam_queue::ArrayQueue` with a `Condvar` so `send`/`recv`
/// can actually block instead of spinning.
pub trait BoundedQueue<T: Send>: Send + Sync {
    /// Pushes `item` onto the queue.
    ///
    /// **Contract:** blocks according to `timeout` while the queue is
    /// full; returns `Err(OsalError::WouldBlock)` immediately under
    /// `WaitTimeout::TryOnce` if full, or `Err(OsalError::TimedOut)` if
    /// the deadline passes under `WaitTimeout::Millis`.
    fn send(&self, item: T, timeout: WaitTimeout) -> OsalResult<()>;

    /// Pops the oldest item, blocking according to `timeout` while the
    /// queue is empty.
    ///
    /// **Contract:** returns `None` on timeout/would-block, `Some` on
    /// success. Never returns `None` under `WaitTimeout::Forever` unless
    /// the queue has been closed.
    fn recv(&self, timeout: WaitTimeout) -> Option<T>;

    fn len(&self) -> usize;

    fn capacity(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A binary semaphore: starts empty, `give` makes one `take` succeed.
///
/// # Implementors
///
/// `rpc-osal::CondvarSemaphore` backs this with `Mutex<bool> + Condvar`.
/// Used by the transport layer's waiter table to wake a blocked
/// `request()` caller when its response arrives.
pub trait BinarySemaphore: Send + Sync {
    /// **Contract:** blocks up to `timeout_ms` (or forever if `None`)
    /// for a pending `give`. Returns `true` if one was consumed, `false`
    /// on timeout. At most one `take` succeeds per `give`.
    fn take(&self, timeout_ms: Option<u64>) -> bool;

    /// **Contract:** wakes one blocked (or future) `take`. Idempotent
    /// while no `take` is waiting — a `give` with nothing to wake stays
    /// pending for the next `take`.
    fn give(&self);
}

/// Thread spawning, abstracted so the stack doesn't assume `std::thread`
/// is the only way to get a preemptible execution context.
///
/// # Implementors
///
/// `rpc-osal::StdThreadSpawner` spawns named `std::thread`s.
pub trait ThreadSpawner: Send + Sync {
    /// **Contract:** `f` starts running concurrently with the caller
    /// before `spawn_named` returns. `name` is used for diagnostics
    /// (thread names, logs) only. The returned handle joins when `f`
    /// returns; spawn failure (OS thread limit reached) is surfaced to
    /// the caller rather than panicking.
    fn spawn_named(
        &self,
        name: &str,
        f: Box<dyn FnOnce() + Send + 'static>,
    ) -> std::io::Result<std::thread::JoinHandle<()>>;
}

/// Blocks the calling thread for `ms` milliseconds.
pub fn sleep_ms(ms: u64) {
    std::thread::sleep(std::time::Duration::from_millis(ms));
}
