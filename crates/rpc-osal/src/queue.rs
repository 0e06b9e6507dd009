//! Bounded blocking queue built on `crossbeam_queue::ArrayQueue`.
//!
//! `ArrayQueue` itself is lock-free but purely non-blocking — a full
//! push or an empty pop just fails immediately. We pair it with a
//! `Mutex<()>` + two `Condvar`s so callers that want `WaitTimeout::Forever`
//! or `WaitTimeout::Millis` semantics actually sleep instead of spinning,
//! the same tradeoff `fixed_pool.rs`'s idle workers make with
//! `thread::park_timeout` but generalised to producers as well.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crossbeam_queue::ArrayQueue;
use rpc_core::error::{OsalError, OsalResult};
use rpc_core::osal::{BoundedQueue, WaitTimeout};

pub struct ArrayBlockingQueue<T> {
    queue: ArrayQueue<T>,
    gate: Mutex<()>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl<T: Send> ArrayBlockingQueue<T> {
    pub fn new(capacity: usize) -> Self {
        ArrayBlockingQueue {
            queue: ArrayQueue::new(capacity),
            gate: Mutex::new(()),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }
}

fn deadline(timeout: WaitTimeout) -> Option<Instant> {
    match timeout {
        WaitTimeout::Forever => None,
        WaitTimeout::TryOnce => Some(Instant::now()),
        WaitTimeout::Millis(ms) => Some(Instant::now() + Duration::from_millis(ms)),
    }
}

impl<T: Send> BoundedQueue<T> for ArrayBlockingQueue<T> {
    fn send(&self, item: T, timeout: WaitTimeout) -> OsalResult<()> {
        let mut item = item;
        let deadline = deadline(timeout);
        loop {
            match self.queue.push(item) {
                Ok(()) => {
                    self.not_empty.notify_one();
                    return Ok(());
                }
                Err(rejected) => {
                    item = rejected;
                    if matches!(timeout, WaitTimeout::TryOnce) {
                        return Err(OsalError::WouldBlock);
                    }
                    let guard = self.gate.lock().unwrap();
                    match deadline {
                        None => {
                            let _unused = self.not_full.wait(guard).unwrap();
                        }
                        Some(d) => {
                            let now = Instant::now();
                            if now >= d {
                                return Err(OsalError::TimedOut);
                            }
                            let (_unused, result) =
                                self.not_full.wait_timeout(guard, d - now).unwrap();
                            if result.timed_out() && self.queue.is_full() {
                                return Err(OsalError::TimedOut);
                            }
                        }
                    }
                }
            }
        }
    }

    fn recv(&self, timeout: WaitTimeout) -> Option<T> {
        let deadline = deadline(timeout);
        loop {
            if let Some(item) = self.queue.pop() {
                self.not_full.notify_one();
                return Some(item);
            }
            if matches!(timeout, WaitTimeout::TryOnce) {
                return None;
            }
            let guard = self.gate.lock().unwrap();
            match deadline {
                None => {
                    let _unused = self.not_empty.wait(guard).unwrap();
                }
                Some(d) => {
                    let now = Instant::now();
                    if now >= d {
                        return None;
                    }
                    let (_unused, result) = self.not_empty.wait_timeout(guard, d - now).unwrap();
                    if result.timed_out() && self.queue.is_empty() {
                        return None;
                    }
                }
            }
        }
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_then_recv_round_trips() {
        let q = ArrayBlockingQueue::new(4);
        q.send(7u32, WaitTimeout::TryOnce).unwrap();
        assert_eq!(q.recv(WaitTimeout::TryOnce), Some(7));
    }

    #[test]
    fn try_once_on_full_queue_fails_fast() {
        let q: ArrayBlockingQueue<u32> = ArrayBlockingQueue::new(1);
        q.send(1, WaitTimeout::TryOnce).unwrap();
        assert_eq!(q.send(2, WaitTimeout::TryOnce), Err(OsalError::WouldBlock));
    }

    #[test]
    fn recv_on_empty_queue_times_out() {
        let q: ArrayBlockingQueue<u32> = ArrayBlockingQueue::new(1);
        assert_eq!(q.recv(WaitTimeout::Millis(20)), None);
    }

    #[test]
    fn recv_wakes_up_once_an_item_is_sent_concurrently() {
        use std::sync::Arc;
        use std::thread;

        let q = Arc::new(ArrayBlockingQueue::new(4));
        let q2 = q.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            q2.send(42u32, WaitTimeout::Forever).unwrap();
        });
        let got = q.recv(WaitTimeout::Millis(500));
        handle.join().unwrap();
        assert_eq!(got, Some(42));
    }
}
