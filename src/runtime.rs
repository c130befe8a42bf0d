//! Async runtime setup for the binary

use std::future::Future;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// Upper bound on waiting for leftover blocking work (e.g. a timed-out DNS lookup) at exit
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Single-threaded runtime; the run's stages are strictly sequential
pub fn build_runtime() -> std::io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}

/// Drive `future` to completion, then shut the runtime down without waiting
/// longer than `shutdown_timeout` for blocking tasks still in flight.
pub fn run_to_completion<F: Future>(
    runtime: Runtime,
    future: F,
    shutdown_timeout: Duration,
) -> F::Output {
    let output = runtime.block_on(future);
    debug!("Shutting down runtime (timeout {:?})", shutdown_timeout);
    runtime.shutdown_timeout(shutdown_timeout);
    output
}
