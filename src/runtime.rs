// SPDX-License-Identifier: MPL-2.0

//! Shared async runtime for all network operations.
//!
//! A single Tokio runtime backs every remote call so synchronous shells can
//! drive the async core without building a runtime per request.

use once_cell::sync::Lazy;
use std::future::Future;
use tokio::runtime::Runtime;

/// Shared multi-threaded Tokio runtime for all async operations.
/// Two worker threads are plenty for I/O-bound client traffic.
static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .thread_name("duet-async")
        .build()
        .expect("failed to create async runtime")
});

/// Execute a future on the shared runtime, blocking until completion.
/// Use this from synchronous code that needs to call async functions.
pub fn block_on<F: Future>(future: F) -> F::Output {
    RUNTIME.block_on(future)
}

/// Spawn a future on the shared runtime without blocking.
pub fn spawn<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    RUNTIME.spawn(future)
}

/// Run blocking work (e.g. a socket accept loop) on the runtime's blocking
/// pool so it never stalls an async worker thread.
pub fn spawn_blocking<F, R>(f: F) -> tokio::task::JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    RUNTIME.spawn_blocking(f)
}

/// Get a handle to the shared runtime for more advanced use cases.
#[allow(dead_code)]
pub fn handle() -> tokio::runtime::Handle {
    RUNTIME.handle().clone()
}
