//! Handler registry.
//!
//! Names are not required to be unique — `register` appends
//! unconditionally and only fails when the table is full; `find` is a
//! linear first-match scan, so the earliest registration under a given
//! name is the one that answers calls. Callers that register two
//! handlers under the same name just waste a slot on an unreachable one;
//! nothing here stops them.

use std::sync::{Arc, Mutex};

use rpc_core::constants::REG_MAX;
use rpc_core::error::TransportError;
use rpc_core::handler::Handler;

pub struct Registry {
    entries: Mutex<Vec<(String, Arc<dyn Handler>)>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry { entries: Mutex::new(Vec::with_capacity(REG_MAX)) }
    }

    pub fn register(&self, name: &str, handler: Arc<dyn Handler>) -> Result<(), TransportError> {
        let mut entries = self.entries.lock().unwrap();
        if entries.len() >= REG_MAX {
            return Err(TransportError::RegistryFull);
        }
        entries.push((name.to_string(), handler));
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<Arc<dyn Handler>> {
        let entries = self.entries.lock().unwrap();
        entries.iter().find(|(n, _)| n == name).map(|(_, h)| h.clone())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpc_core::constants::OUT_CAP;
    use rpc_core::error::ErrorTag;

    fn noop_handler() -> Arc<dyn Handler> {
        Arc::new(|_args: &[u8], _out: &mut [u8; OUT_CAP], _timeout_ms: u64| -> Result<usize, ErrorTag> { Ok(0) })
    }

    fn tagged_handler(tag: u8) -> Arc<dyn Handler> {
        Arc::new(move |_args: &[u8], out: &mut [u8; OUT_CAP], _timeout_ms: u64| -> Result<usize, ErrorTag> {
            out[0] = tag;
            Ok(1)
        })
    }

    #[test]
    fn register_then_find_succeeds() {
        let reg = Registry::new();
        reg.register("ping", noop_handler()).unwrap();
        assert!(reg.find("ping").is_some());
        assert!(reg.find("pong").is_none());
    }

    #[test]
    fn duplicate_registration_succeeds_and_first_match_wins() {
        let reg = Registry::new();
        reg.register("ping", tagged_handler(1)).unwrap();
        reg.register("ping", tagged_handler(2)).unwrap();

        let handler = reg.find("ping").unwrap();
        let mut out = [0u8; OUT_CAP];
        handler.call(&[], &mut out, 0).unwrap();
        assert_eq!(out[0], 1);
    }

    #[test]
    fn registry_full_is_rejected() {
        let reg = Registry::new();
        for i in 0..REG_MAX {
            reg.register(&format!("h{i}"), noop_handler()).unwrap();
        }
        assert_eq!(reg.register("overflow", noop_handler()), Err(TransportError::RegistryFull));
    }
}
