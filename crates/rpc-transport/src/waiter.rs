//! Waiter table: correlates an async response with the blocked
//! `request()` call that is waiting for it.
//!
//! `seq` is a monotonically-incrementing 8-bit counter, independent of
//! slot position — it is never derived from a slot index, so a slot can
//! be claimed with any live `seq` value. `0` is reserved for `STREAM`
//! and is never handed out here. `find`/`deliver` therefore linear-scan
//! the table for the in-use slot whose `seq` matches, all under one
//! table-wide mutex; `wait` disarms its slot under that same mutex
//! before returning, so a response that arrives after the requester has
//! already timed out is dropped rather than misdelivered to whatever
//! claims the slot next.

use rpc_core::constants::WAITER_MAX;
use rpc_core::error::ErrorTag;
use rpc_core::osal::sleep_ms;
use rpc_core::payload::PayloadBuf;
use rpc_osal::CondvarSemaphore;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub enum WireOutcome {
    Resp(PayloadBuf),
    Err(ErrorTag),
}

struct SlotState {
    armed: bool,
    seq: u8,
    result: Option<WireOutcome>,
}

struct Inner {
    slots: Vec<SlotState>,
    next_seq: u8,
}

pub struct WaiterTable {
    inner: Mutex<Inner>,
    sems: Vec<CondvarSemaphore>,
}

/// Number of 1ms sleep-and-retry attempts `alloc` makes before giving up
/// on a full table.
const ALLOC_RETRIES: usize = 255;

impl WaiterTable {
    pub fn new() -> Self {
        let slots = (0..WAITER_MAX).map(|_| SlotState { armed: false, seq: 0, result: None }).collect();
        let sems = (0..WAITER_MAX).map(|_| CondvarSemaphore::new()).collect();
        WaiterTable { inner: Mutex::new(Inner { slots, next_seq: 0 }), sems }
    }

    fn next_seq(inner: &mut Inner) -> u8 {
        inner.next_seq = inner.next_seq.wrapping_add(1);
        if inner.next_seq == 0 {
            inner.next_seq = 1;
        }
        inner.next_seq
    }

    /// Claims a free slot and assigns it a fresh, nonzero `seq`. Retries
    /// with a 1ms sleep between attempts if every slot is in use;
    /// returns `None` once `ALLOC_RETRIES` attempts are exhausted.
    pub fn alloc(&self) -> Option<u8> {
        for attempt in 0..ALLOC_RETRIES {
            let mut inner = self.inner.lock().unwrap();
            let seq = Self::next_seq(&mut inner);
            if let Some(idx) = inner.slots.iter().position(|s| !s.armed) {
                inner.slots[idx].armed = true;
                inner.slots[idx].seq = seq;
                inner.slots[idx].result = None;
                return Some(seq);
            }
            drop(inner);
            if attempt + 1 < ALLOC_RETRIES {
                sleep_ms(1);
            }
        }
        None
    }

    /// Delivers a response to whichever request is currently armed on
    /// `seq`. A response for an unarmed (already-completed or never
    /// allocated) seq is stale wire noise and is dropped.
    pub fn deliver(&self, seq: u8, outcome: WireOutcome) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let Some(idx) = inner.slots.iter().position(|s| s.armed && s.seq == seq) else {
            return false;
        };
        inner.slots[idx].result = Some(outcome);
        drop(inner);
        self.sems[idx].give();
        true
    }

    /// Blocks up to `timeout_ms` for a result on `seq`, then disarms the
    /// slot regardless of outcome so it can be reallocated.
    pub fn wait(&self, seq: u8, timeout_ms: u64) -> Option<WireOutcome> {
        let idx = {
            let inner = self.inner.lock().unwrap();
            inner.slots.iter().position(|s| s.armed && s.seq == seq)?
        };
        self.sems[idx].take(Some(timeout_ms));
        let mut inner = self.inner.lock().unwrap();
        let result = inner.slots[idx].result.take();
        inner.slots[idx].armed = false;
        drop(inner);
        self.sems[idx].reset();
        result
    }
}

impl Default for WaiterTable {
    fn default() -> Self {
        Self::new()
    }
}
