//! Façade configuration and its validation.

use gerror::codes::{ERR_RPC_BAD_CONFIG, SUB_RPC_INIT, SYS_RPC_CONFIG, UC_RPC_INIT};
use gerror::{err, GResult};
use rpc_core::constants::{
    HANDLER_TIMEOUT_DEFAULT_MS, REQ_TIMEOUT_DEFAULT_MS, RX_QUEUE_DEPTH, TX_QUEUE_DEPTH, WORKER_COUNT,
    WORKER_QUEUE_DEPTH,
};

/// Upper bound on `worker_count`; not a protocol limit, just a sanity
/// check against obviously-wrong configuration (typos, copy-paste of a
/// thread-count from an unrelated subsystem).
const MAX_WORKER_COUNT: usize = 64;

#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub worker_count: usize,
    pub req_timeout_ms: u64,
    pub handler_timeout_ms: u64,
    pub rx_queue_depth: usize,
    pub tx_queue_depth: usize,
    pub worker_queue_depth: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        RpcConfig {
            worker_count: WORKER_COUNT,
            req_timeout_ms: REQ_TIMEOUT_DEFAULT_MS,
            handler_timeout_ms: HANDLER_TIMEOUT_DEFAULT_MS,
            rx_queue_depth: RX_QUEUE_DEPTH,
            tx_queue_depth: TX_QUEUE_DEPTH,
            worker_queue_depth: WORKER_QUEUE_DEPTH,
        }
    }
}

impl RpcConfig {
    pub fn validate(&self) -> GResult<()> {
        if self.worker_count == 0 || self.worker_count > MAX_WORKER_COUNT {
            return Err(err!(
                SYS_RPC_CONFIG,
                SUB_RPC_INIT,
                ERR_RPC_BAD_CONFIG,
                UC_RPC_INIT,
                format!("worker_count {} out of range 1..={MAX_WORKER_COUNT}", self.worker_count)
            ));
        }
        if self.req_timeout_ms == 0 {
            return Err(err!(
                SYS_RPC_CONFIG,
                SUB_RPC_INIT,
                ERR_RPC_BAD_CONFIG,
                UC_RPC_INIT,
                "req_timeout_ms must be non-zero"
            ));
        }
        if self.rx_queue_depth == 0 || self.tx_queue_depth == 0 || self.worker_queue_depth == 0 {
            return Err(err!(
                SYS_RPC_CONFIG,
                SUB_RPC_INIT,
                ERR_RPC_BAD_CONFIG,
                UC_RPC_INIT,
                "queue depths must be non-zero"
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(RpcConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_workers_is_rejected() {
        let cfg = RpcConfig { worker_count: 0, ..RpcConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn absurd_worker_count_is_rejected() {
        let cfg = RpcConfig { worker_count: 10_000, ..RpcConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cfg = RpcConfig { req_timeout_ms: 0, ..RpcConfig::default() };
        assert!(cfg.validate().is_err());
    }
}
