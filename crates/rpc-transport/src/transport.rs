//! Ties the registry, waiter table and codec together into the two
//! public entry points (`request`, `stream`) and the inbound dispatch
//! path that the façade's dispatcher thread drives.

use std::sync::Arc;

use rpc_core::constants::REQ_TIMEOUT_DEFAULT_MS;
use rpc_core::error::{TransportError, TransportResult};
use rpc_core::handler::Handler;
use rpc_core::message::{MessageType, WorkerRequestItem};
use rpc_core::osal::{BoundedQueue, WaitTimeout};
use rpc_core::payload::PayloadBuf;
use rpc_link::encode_frame;

use crate::codec::{build_call, parse_request, parse_response, ResponseMsg};
use crate::registry::Registry;
use crate::waiter::{WaiterTable, WireOutcome};

/// Sequence number used on `Stream` messages, which never get a
/// response and so never need a waiter slot. Reserved: the waiter
/// table's `next_seq` counter skips this value.
const STREAM_SEQ: u8 = 0;

pub struct Transport {
    registry: Registry,
    waiters: WaiterTable,
    tx: Arc<dyn BoundedQueue<Vec<u8>>>,
    worker_queue: Arc<dyn BoundedQueue<WorkerRequestItem>>,
}

impl Transport {
    pub fn new(
        tx: Arc<dyn BoundedQueue<Vec<u8>>>,
        worker_queue: Arc<dyn BoundedQueue<WorkerRequestItem>>,
    ) -> Self {
        Transport { registry: Registry::new(), waiters: WaiterTable::new(), tx, worker_queue }
    }

    pub fn register(&self, name: &str, handler: Arc<dyn Handler>) -> TransportResult<()> {
        self.registry.register(name, handler)
    }

    /// The queue decoded `Req`/`Stream` payloads are pushed onto; a
    /// caller building a worker pool needs to share this exact queue.
    pub fn worker_queue(&self) -> Arc<dyn BoundedQueue<WorkerRequestItem>> {
        self.worker_queue.clone()
    }

    /// The queue outgoing frames are pushed onto; a caller driving the
    /// PHY needs to share this exact queue.
    pub fn tx_queue(&self) -> Arc<dyn BoundedQueue<Vec<u8>>> {
        self.tx.clone()
    }

    pub fn find_handler(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.registry.find(name)
    }

    /// Sends a request and blocks for its response. Enqueueing onto the
    /// TX queue blocks indefinitely (`WAIT_FOREVER`) — it is not part of
    /// the caller's response-wait budget, which only starts once the
    /// frame has actually been accepted.
    pub fn request(&self, name: &str, args: &[u8], timeout_ms: Option<u64>) -> TransportResult<PayloadBuf> {
        let seq = self.waiters.alloc().ok_or(TransportError::WaiterTableFull)?;
        let payload = build_call(MessageType::Req, seq, name, args)?;
        let frame = encode_frame(payload.as_slice())?;
        self.tx.send(frame, WaitTimeout::Forever).map_err(TransportError::from)?;

        let deadline_ms = timeout_ms.unwrap_or(REQ_TIMEOUT_DEFAULT_MS);
        match self.waiters.wait(seq, deadline_ms) {
            Some(WireOutcome::Resp(data)) => Ok(data),
            Some(WireOutcome::Err(tag)) => Err(TransportError::Remote(tag)),
            None => Err(TransportError::Timeout),
        }
    }

    /// Sends a fire-and-forget call; returns once the frame is queued
    /// (blocking indefinitely if the TX queue is momentarily full).
    pub fn stream(&self, name: &str, args: &[u8]) -> TransportResult<()> {
        let payload = build_call(MessageType::Stream, STREAM_SEQ, name, args)?;
        let frame = encode_frame(payload.as_slice())?;
        self.tx.send(frame, WaitTimeout::Forever).map_err(TransportError::from)
    }

    /// Called by the dispatcher thread for every payload the link layer
    /// hands back. Routes `Req`/`Stream` onto the worker queue and
    /// `Resp`/`Err` into the waiter table.
    pub fn dispatch_inbound(&self, payload: &[u8]) {
        if payload.is_empty() {
            return;
        }
        match payload[0] {
            t if t == MessageType::Req.as_u8() || t == MessageType::Stream.as_u8() => {
                match parse_request(payload) {
                    Ok(req) => {
                        let name = req.name.clone();
                        let seq = req.seq;
                        let item = WorkerRequestItem {
                            msg_type: req.msg_type,
                            seq: req.seq,
                            name: req.name,
                            args: req.args,
                        };
                        if self.worker_queue.send(item, WaitTimeout::TryOnce).is_err() {
                            rpc_core::kwarn!("worker queue full, dropping request '{name}' (seq {seq})");
                        }
                    }
                    Err(_) => {
                        // Malformed request payload: nothing to route a
                        // response to, so it's simply dropped.
                    }
                }
            }
            t if t == MessageType::Resp.as_u8() || t == MessageType::Err.as_u8() => {
                if let Ok(response) = parse_response(payload) {
                    match response {
                        ResponseMsg::Resp { seq, data } => {
                            self.waiters.deliver(seq, WireOutcome::Resp(data));
                        }
                        ResponseMsg::Err { seq, tag } => {
                            self.waiters.deliver(seq, WireOutcome::Err(tag));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Sends an already-built response/error payload for `seq`, used by
    /// worker threads after running a handler.
    pub fn send_reply(&self, payload: PayloadBuf) -> TransportResult<()> {
        let frame = encode_frame(payload.as_slice())?;
        self.tx.send(frame, WaitTimeout::Forever).map_err(TransportError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpc_osal::ArrayBlockingQueue;

    fn new_transport() -> (Transport, Arc<ArrayBlockingQueue<Vec<u8>>>, Arc<ArrayBlockingQueue<WorkerRequestItem>>) {
        let tx = Arc::new(ArrayBlockingQueue::new(8));
        let worker_queue = Arc::new(ArrayBlockingQueue::new(8));
        let transport = Transport::new(tx.clone(), worker_queue.clone());
        (transport, tx, worker_queue)
    }

    #[test]
    fn request_with_no_reply_times_out() {
        let (transport, _tx, _worker_queue) = new_transport();
        let result = transport.request("ping", b"", Some(30));
        assert_eq!(result, Err(TransportError::Timeout));
    }

    #[test]
    fn stream_queues_a_frame_without_blocking_for_a_reply() {
        let (transport, tx, _worker_queue) = new_transport();
        transport.stream("echo", b"hi").unwrap();
        assert_eq!(tx.len(), 1);
    }

    #[test]
    fn dispatch_inbound_routes_requests_to_the_worker_queue() {
        let (transport, _tx, worker_queue) = new_transport();
        let payload = build_call(MessageType::Req, 1, "ping", b"").unwrap();
        transport.dispatch_inbound(payload.as_slice());
        assert_eq!(worker_queue.len(), 1);
    }

    #[test]
    fn dispatch_inbound_delivers_responses_to_a_waiting_request() {
        let (transport, tx, _worker_queue) = new_transport();
        let transport = Arc::new(transport);
        let t2 = transport.clone();
        let handle = std::thread::spawn(move || t2.request("ping", b"", Some(500)));

        // Drain the seq the requester used off the TX queue, then hand
        // back a crafted Resp for the same seq as if the peer answered.
        std::thread::sleep(std::time::Duration::from_millis(20));
        let frame = tx.recv(WaitTimeout::Millis(200)).unwrap();
        let mut decoder = rpc_link::Decoder::new();
        let payload = frame
            .iter()
            .find_map(|&b| match decoder.feed(b) {
                rpc_link::FeedEvent::Frame(p) => Some(p),
                _ => None,
            })
            .unwrap();
        let req = crate::codec::parse_request(payload.as_slice()).unwrap();
        let resp = crate::codec::build_resp(req.seq, b"pong").unwrap();
        transport.dispatch_inbound(resp.as_slice());

        let result = handle.join().unwrap();
        assert_eq!(result.unwrap().as_slice(), b"pong");
    }
}
