//! `std::thread`-backed [`ThreadSpawner`].

use rpc_core::osal::ThreadSpawner;

pub struct StdThreadSpawner;

impl ThreadSpawner for StdThreadSpawner {
    fn spawn_named(
        &self,
        name: &str,
        f: Box<dyn FnOnce() + Send + 'static>,
    ) -> std::io::Result<std::thread::JoinHandle<()>> {
        std::thread::Builder::new().name(name.to_string()).spawn(f)
    }
}
