//! `std`-backed implementations of the `rpc-core` OS abstraction traits.

mod queue;
mod semaphore;
mod thread;

pub use queue::ArrayBlockingQueue;
pub use semaphore::CondvarSemaphore;
pub use thread::StdThreadSpawner;
