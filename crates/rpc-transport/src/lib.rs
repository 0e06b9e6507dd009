//! Transport layer: typed message codec, handler registry, waiter
//! table, and the `request`/`stream` entry points the façade exposes.

mod codec;
mod registry;
mod transport;
mod waiter;

pub use codec::{build_call, build_err, build_resp, parse_request, parse_response, RequestMsg, ResponseMsg};
pub use registry::Registry;
pub use transport::Transport;
pub use waiter::{WaiterTable, WireOutcome};
