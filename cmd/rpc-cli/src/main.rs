//! Reference CLI for the RPC stack.
//!
//! ```text
//! rpc-cli server <rx-path> <tx-path> [--workers N] [--queue-depth N] [--log-level LEVEL]
//! rpc-cli client <rx-path> <tx-path> <function> [args] [--workers N] [--queue-depth N] [--log-level LEVEL]
//! ```
//!
//! The two processes swap `rx-path`/`tx-path` so each reads what the
//! other writes. No `clap` here — a handful of positional arguments plus
//! a few optional `--flag value` overrides reads fine as a manual match
//! over `env::args()`.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rpc::{Rpc, RpcConfig};
use rpc_core::constants::OUT_CAP;
use rpc_core::error::ErrorTag;
use rpc_phy_pipe::NamedPipePhy;

/// Config overrides parsed from `--workers`/`--queue-depth`/`--log-level`
/// flags, applied on top of [`RpcConfig::default`].
#[derive(Default)]
struct Overrides {
    workers: Option<usize>,
    queue_depth: Option<usize>,
    log_level: Option<String>,
}

fn parse_overrides(args: &[String]) -> (Vec<String>, Overrides) {
    let mut positional = Vec::new();
    let mut overrides = Overrides::default();
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--workers" => overrides.workers = it.next().and_then(|v| v.parse().ok()),
            "--queue-depth" => overrides.queue_depth = it.next().and_then(|v| v.parse().ok()),
            "--log-level" => overrides.log_level = it.next().cloned(),
            other => positional.push(other.to_string()),
        }
    }
    (positional, overrides)
}

fn apply_overrides(overrides: &Overrides) -> RpcConfig {
    if let Some(level) = &overrides.log_level {
        rpc_core::log::set_threshold_from_str(level);
    }
    let mut config = RpcConfig::default();
    if let Some(workers) = overrides.workers {
        config.worker_count = workers;
    }
    if let Some(depth) = overrides.queue_depth {
        config.rx_queue_depth = depth;
        config.tx_queue_depth = depth;
        config.worker_queue_depth = depth;
    }
    config
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("server") => run_server(&args[2..]),
        Some("client") => run_client(&args[2..]),
        _ => {
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    println!("usage:");
    println!("  rpc-cli server <rx-path> <tx-path> [--workers N] [--queue-depth N] [--log-level LEVEL]");
    println!("  rpc-cli client <rx-path> <tx-path> <function> [args] [--workers N] [--queue-depth N] [--log-level LEVEL]");
}

fn run_server(args: &[String]) -> ExitCode {
    let (positional, overrides) = parse_overrides(args);
    let (rx_path, tx_path) = match (positional.first(), positional.get(1)) {
        (Some(rx), Some(tx)) => (rx, tx),
        _ => {
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let phy = match NamedPipePhy::open(rx_path, tx_path) {
        Ok(phy) => Arc::new(phy),
        Err(e) => {
            eprintln!("failed to open pipe pair: {e}");
            return ExitCode::FAILURE;
        }
    };

    let config = apply_overrides(&overrides);
    let rpc = match Rpc::init(phy, config) {
        Ok(rpc) => rpc,
        Err(e) => {
            eprintln!("init failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    register_demo_handlers(&rpc);

    if let Err(e) = rpc.start() {
        eprintln!("start failed: {e}");
        return ExitCode::FAILURE;
    }

    println!("rpc-cli server listening on rx={rx_path} tx={tx_path} (ctrl-c to stop)");
    loop {
        std::thread::sleep(std::time::Duration::from_secs(3600));
    }
}

fn register_demo_handlers(rpc: &Arc<Rpc>) {
    rpc.register(
        "ping",
        Arc::new(|args: &[u8], out: &mut [u8; OUT_CAP], _timeout_ms: u64| -> Result<usize, ErrorTag> {
            out[..args.len()].copy_from_slice(args);
            Ok(args.len())
        }),
    )
    .expect("registering 'ping' should not fail on a fresh registry");

    rpc.register(
        "echo",
        Arc::new(|args: &[u8], out: &mut [u8; OUT_CAP], _timeout_ms: u64| -> Result<usize, ErrorTag> {
            out[..args.len()].copy_from_slice(args);
            Ok(args.len())
        }),
    )
    .expect("registering 'echo' should not fail on a fresh registry");

    rpc.register("slow", Arc::new(slow_handler))
        .expect("registering 'slow' should not fail on a fresh registry");
}

/// Deliberately slow handler used to exercise handler timeouts. Rather
/// than blocking unconditionally, it does its (simulated) work in small
/// steps and polls `timeout_ms` after each one, so it can bail out with
/// `ErrorTag::Timeout` cooperatively instead of overrunning its budget
/// and leaving the caller to find out only after the fact.
fn slow_handler(_args: &[u8], _out: &mut [u8; OUT_CAP], timeout_ms: u64) -> Result<usize, ErrorTag> {
    const SIMULATED_WORK: Duration = Duration::from_millis(500);
    const POLL_STEP: Duration = Duration::from_millis(20);

    let budget = (timeout_ms != 0).then(|| Duration::from_millis(timeout_ms));
    let started = Instant::now();
    loop {
        if started.elapsed() >= SIMULATED_WORK {
            return Ok(0);
        }
        if let Some(budget) = budget {
            if started.elapsed() >= budget {
                return Err(ErrorTag::Timeout);
            }
        }
        std::thread::sleep(POLL_STEP);
    }
}

fn run_client(args: &[String]) -> ExitCode {
    let (positional, overrides) = parse_overrides(args);
    let (rx_path, tx_path, function) = match (positional.first(), positional.get(1), positional.get(2)) {
        (Some(rx), Some(tx), Some(f)) => (rx, tx, f),
        _ => {
            print_usage();
            return ExitCode::FAILURE;
        }
    };
    let call_args = positional.get(3).map(String::as_bytes).unwrap_or(b"");

    let phy = match NamedPipePhy::open(rx_path, tx_path) {
        Ok(phy) => Arc::new(phy),
        Err(e) => {
            eprintln!("failed to open pipe pair: {e}");
            return ExitCode::FAILURE;
        }
    };

    let config = apply_overrides(&overrides);
    let rpc = match Rpc::init(phy, config) {
        Ok(rpc) => rpc,
        Err(e) => {
            eprintln!("init failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = rpc.start() {
        eprintln!("start failed: {e}");
        return ExitCode::FAILURE;
    }

    match rpc.request(function, call_args, None) {
        Ok(result) => {
            println!("ok: {:?}", String::from_utf8_lossy(result.as_slice()));
            rpc.shutdown();
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("call failed: {e}");
            rpc.shutdown();
            ExitCode::FAILURE
        }
    }
}
