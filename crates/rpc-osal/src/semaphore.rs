//! Binary semaphore built on `Mutex<bool> + Condvar`.
//!
//! Used by the transport layer's waiter table: one of these per in-flight
//! request, `give`n by the dispatcher when a response lands, `take`n by
//! the blocked `request()` caller.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use rpc_core::osal::BinarySemaphore;

pub struct CondvarSemaphore {
    signalled: Mutex<bool>,
    condvar: Condvar,
}

impl CondvarSemaphore {
    pub fn new() -> Self {
        CondvarSemaphore {
            signalled: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Resets the semaphore to its initial (unsignalled) state, so a
    /// waiter slot can be reused without allocating a new one.
    pub fn reset(&self) {
        *self.signalled.lock().unwrap() = false;
    }
}

impl Default for CondvarSemaphore {
    fn default() -> Self {
        Self::new()
    }
}

impl BinarySemaphore for CondvarSemaphore {
    fn take(&self, timeout_ms: Option<u64>) -> bool {
        let mut guard = self.signalled.lock().unwrap();
        match timeout_ms {
            None => {
                while !*guard {
                    guard = self.condvar.wait(guard).unwrap();
                }
                *guard = false;
                true
            }
            Some(ms) => {
                let deadline = Instant::now() + Duration::from_millis(ms);
                while !*guard {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    let (next, _result) =
                        self.condvar.wait_timeout(guard, deadline - now).unwrap();
                    guard = next;
                }
                *guard = false;
                true
            }
        }
    }

    fn give(&self) {
        let mut guard = self.signalled.lock().unwrap();
        *guard = true;
        self.condvar.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn take_after_give_succeeds_immediately() {
        let sem = CondvarSemaphore::new();
        sem.give();
        assert!(sem.take(Some(0)));
    }

    #[test]
    fn take_on_unsignalled_semaphore_times_out() {
        let sem = CondvarSemaphore::new();
        assert!(!sem.take(Some(20)));
    }

    #[test]
    fn take_blocks_until_give_from_another_thread() {
        let sem = Arc::new(CondvarSemaphore::new());
        let sem2 = sem.clone();
        let handle = thread::spawn(move || {
            thread::sleep(std::time::Duration::from_millis(20));
            sem2.give();
        });
        assert!(sem.take(Some(500)));
        handle.join().unwrap();
    }

    #[test]
    fn reset_clears_a_pending_signal() {
        let sem = CondvarSemaphore::new();
        sem.give();
        sem.reset();
        assert!(!sem.take(Some(10)));
    }
}
