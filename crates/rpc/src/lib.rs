//! Façade over the RPC stack: `init`/`start`/`register`/`request`/`stream`.
//!
//! Wires a [`rpc_core::Phy`] through the link layer's frame decoder, the
//! transport layer's registry/waiter table, and a fixed worker pool,
//! running each as its own OS thread:
//!
//! ```text
//! PHY --bytes--> rx reader --frames--> dispatcher --Req/Stream--> worker pool --Resp/Err--> tx writer --bytes--> PHY
//!                                          |--Resp/Err--> waiter table (wakes request())
//! ```

mod config;

pub use config::RpcConfig;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use gerror::codes::{ERR_RPC_ALREADY_STARTED, ERR_RPC_SPAWN_FAILED, SUB_RPC_START, SYS_RPC_FACADE, UC_RPC_START};
use gerror::{err, GResult};
use rpc_core::error::TransportResult;
use rpc_core::handler::Handler;
use rpc_core::message::WorkerRequestItem;
use rpc_core::osal::{BoundedQueue, ThreadSpawner, WaitTimeout};
use rpc_core::payload::PayloadBuf;
use rpc_core::phy::Phy;
use rpc_link::{Decoder, FeedEvent};
use rpc_osal::{ArrayBlockingQueue, StdThreadSpawner};
use rpc_transport::Transport;
use rpc_worker::WorkerPool;

pub struct Rpc {
    phy: Arc<dyn Phy>,
    transport: Arc<Transport>,
    rx_queue: Arc<dyn BoundedQueue<Vec<u8>>>,
    spawner: Arc<dyn ThreadSpawner>,
    config: RpcConfig,
    started: AtomicBool,
    shutdown: Arc<AtomicBool>,
    threads: Mutex<Vec<JoinHandle<()>>>,
    pool: Mutex<Option<WorkerPool>>,
}

impl Rpc {
    /// Validates `config` and builds the queues/tables the stack needs,
    /// without starting any threads yet.
    pub fn init(phy: Arc<dyn Phy>, config: RpcConfig) -> GResult<Arc<Rpc>> {
        config.validate()?;

        let tx_queue: Arc<dyn BoundedQueue<Vec<u8>>> = Arc::new(ArrayBlockingQueue::new(config.tx_queue_depth));
        let rx_queue: Arc<dyn BoundedQueue<Vec<u8>>> = Arc::new(ArrayBlockingQueue::new(config.rx_queue_depth));
        let worker_queue: Arc<dyn BoundedQueue<WorkerRequestItem>> =
            Arc::new(ArrayBlockingQueue::new(config.worker_queue_depth));
        let transport = Arc::new(Transport::new(tx_queue, worker_queue));

        Ok(Arc::new(Rpc {
            phy,
            transport,
            rx_queue,
            spawner: Arc::new(StdThreadSpawner),
            config,
            started: AtomicBool::new(false),
            shutdown: Arc::new(AtomicBool::new(false)),
            threads: Mutex::new(Vec::new()),
            pool: Mutex::new(None),
        }))
    }

    /// Registers a handler under `name`. Must be called before
    /// [`Rpc::start`] picks up in-flight traffic, though nothing enforces
    /// that ordering — a late registration just means earlier calls to
    /// that name got `NoFunc`.
    pub fn register(&self, name: &str, handler: Arc<dyn Handler>) -> TransportResult<()> {
        self.transport.register(name, handler)
    }

    /// Sends a blocking request and waits for its response.
    pub fn request(&self, name: &str, args: &[u8], timeout_ms: Option<u64>) -> TransportResult<PayloadBuf> {
        self.transport
            .request(name, args, Some(timeout_ms.unwrap_or(self.config.req_timeout_ms)))
    }

    /// Sends a fire-and-forget call.
    pub fn stream(&self, name: &str, args: &[u8]) -> TransportResult<()> {
        self.transport.stream(name, args)
    }

    /// Spawns the RX reader, dispatcher, TX writer and worker pool
    /// threads. Returns an error if already started.
    pub fn start(self: &Arc<Self>) -> GResult<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(err!(
                SYS_RPC_FACADE,
                SUB_RPC_START,
                ERR_RPC_ALREADY_STARTED,
                UC_RPC_START,
                "start() called more than once"
            ));
        }

        let mut threads = self.threads.lock().unwrap();

        threads.push(self.spawn_rx_reader()?);
        threads.push(self.spawn_dispatcher()?);
        threads.push(self.spawn_tx_writer()?);

        let pool = WorkerPool::with_handler_timeout(
            self.config.worker_count,
            self.transport.worker_queue(),
            self.transport.clone(),
            self.config.handler_timeout_ms,
        );
        *self.pool.lock().unwrap() = Some(pool);

        Ok(())
    }

    fn spawn_rx_reader(&self) -> GResult<JoinHandle<()>> {
        let phy = self.phy.clone();
        let rx_queue = self.rx_queue.clone();
        let shutdown = self.shutdown.clone();
        self.spawner
            .spawn_named("rpc-rx-reader", Box::new(move || rx_reader_loop(phy, rx_queue, shutdown)))
            .map_err(|e| {
                err!(
                    SYS_RPC_FACADE,
                    SUB_RPC_START,
                    ERR_RPC_SPAWN_FAILED,
                    UC_RPC_START,
                    "failed to spawn rx reader thread",
                    source = e
                )
            })
    }

    fn spawn_dispatcher(&self) -> GResult<JoinHandle<()>> {
        let rx_queue = self.rx_queue.clone();
        let transport = self.transport.clone();
        let shutdown = self.shutdown.clone();
        self.spawner
            .spawn_named(
                "rpc-dispatcher",
                Box::new(move || dispatcher_loop(rx_queue, transport, shutdown)),
            )
            .map_err(|e| {
                err!(
                    SYS_RPC_FACADE,
                    SUB_RPC_START,
                    ERR_RPC_SPAWN_FAILED,
                    UC_RPC_START,
                    "failed to spawn dispatcher thread",
                    source = e
                )
            })
    }

    fn spawn_tx_writer(&self) -> GResult<JoinHandle<()>> {
        let phy = self.phy.clone();
        let tx_queue = self.transport.tx_queue();
        let shutdown = self.shutdown.clone();
        self.spawner
            .spawn_named("rpc-tx-writer", Box::new(move || tx_writer_loop(phy, tx_queue, shutdown)))
            .map_err(|e| {
                err!(
                    SYS_RPC_FACADE,
                    SUB_RPC_START,
                    ERR_RPC_SPAWN_FAILED,
                    UC_RPC_START,
                    "failed to spawn tx writer thread",
                    source = e
                )
            })
    }

    /// Signals every thread to stop and joins them. Blocks until the
    /// worker pool and all orchestration threads have exited.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(pool) = self.pool.lock().unwrap().take() {
            pool.shutdown();
        }
        for handle in self.threads.lock().unwrap().drain(..) {
            let _ = handle.join();
        }
    }
}

fn rx_reader_loop(phy: Arc<dyn Phy>, rx_queue: Arc<dyn BoundedQueue<Vec<u8>>>, shutdown: Arc<AtomicBool>) {
    let mut decoder = Decoder::new();
    while !shutdown.load(Ordering::Relaxed) {
        match phy.recv_byte(Some(100)) {
            Ok(Some(byte)) => match decoder.feed(byte) {
                FeedEvent::Frame(payload) => {
                    // WAIT_FOREVER: a full RX queue is backpressure, not
                    // something the parser is allowed to drop.
                    let _ = rx_queue.send(payload.as_slice().to_vec(), WaitTimeout::Forever);
                }
                FeedEvent::Rejected(e) => {
                    rpc_core::kwarn!("link layer rejected a frame: {e}");
                }
                FeedEvent::Noise(_) | FeedEvent::Pending => {}
            },
            Ok(None) => {}
            Err(e) => {
                rpc_core::kerror!("PHY read error: {e}");
                break;
            }
        }
    }
}

fn dispatcher_loop(rx_queue: Arc<dyn BoundedQueue<Vec<u8>>>, transport: Arc<Transport>, shutdown: Arc<AtomicBool>) {
    while !shutdown.load(Ordering::Relaxed) {
        if let Some(payload) = rx_queue.recv(WaitTimeout::Millis(100)) {
            transport.dispatch_inbound(&payload);
        }
    }
}

fn tx_writer_loop(phy: Arc<dyn Phy>, tx_queue: Arc<dyn BoundedQueue<Vec<u8>>>, shutdown: Arc<AtomicBool>) {
    while !shutdown.load(Ordering::Relaxed) {
        if let Some(frame) = tx_queue.recv(WaitTimeout::Millis(100)) {
            if let Err(e) = phy.send(&frame) {
                rpc_core::kerror!("PHY write error: {e}");
            }
        }
    }
}
