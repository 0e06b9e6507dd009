//! Reserved code namespace for the RPC façade.
//!
//! Used for setup/configuration failures at `init`/`start` time — the
//! "diagnostic path" cases `GError::full` was built for. Per-message
//! protocol failures (bad CRC, overflow, NOFUNC, …) are reported through
//! each layer's own `Result<T, LayerError>` instead; see `rpc-core`.

use crate::GlobalId;

// ── Systems (10000–10099) ─────────────────────────────────────────

pub const SYS_RPC_FACADE: GlobalId = GlobalId::new("rpc_facade", 10001);
pub const SYS_RPC_PHY:    GlobalId = GlobalId::new("rpc_phy", 10002);
pub const SYS_RPC_CONFIG: GlobalId = GlobalId::new("rpc_config", 10003);

// ── Subsystems (10100–10199) ──────────────────────────────────────

pub const SUB_RPC_INIT:  GlobalId = GlobalId::new("rpc_init", 10100);
pub const SUB_RPC_START: GlobalId = GlobalId::new("rpc_start", 10101);
pub const SUB_RPC_PIPE:  GlobalId = GlobalId::new("rpc_pipe", 10102);
pub const SUB_RPC_CLI:   GlobalId = GlobalId::new("rpc_cli", 10103);

// ── Error codes (10200–10299) ──────────────────────────────────────

pub const ERR_RPC_PHY_OPEN:        GlobalId = GlobalId::new("rpc_phy_open", 10200);
pub const ERR_RPC_PHY_CLOSED:      GlobalId = GlobalId::new("rpc_phy_closed", 10201);
pub const ERR_RPC_ALREADY_STARTED: GlobalId = GlobalId::new("rpc_already_started", 10202);
pub const ERR_RPC_BAD_CONFIG:      GlobalId = GlobalId::new("rpc_bad_config", 10203);
pub const ERR_RPC_SPAWN_FAILED:    GlobalId = GlobalId::new("rpc_spawn_failed", 10204);

// ── User codes (10250–10299) — which public call was in flight ────

pub const UC_RPC_INIT:     GlobalId = GlobalId::new("rpc_uc_init", 10250);
pub const UC_RPC_START:    GlobalId = GlobalId::new("rpc_uc_start", 10251);
pub const UC_RPC_PHY_OPEN: GlobalId = GlobalId::new("rpc_uc_phy_open", 10252);
