use anyhow::Context;
use std::future::Future;

/// Runs async HTTP calls for the synchronous worker threads.
#[derive(Debug)]
pub struct Executor {
    runtime: tokio::runtime::Runtime,
}

impl Executor {
    pub fn new(runtime: tokio::runtime::Runtime) -> Self {
        Self { runtime }
    }

    /// Create an executor backed by a new multi-threaded runtime.
    pub fn try_new() -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
        Ok(Self::new(runtime))
    }

    /// Run async code in place, blocking the calling thread until it completes.
    ///
    /// This is safe to call from several worker threads at once, each blocks only itself. It must
    /// not be called from inside the runtime.
    pub fn execute_in_place<T>(
        &self,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> anyhow::Result<T> {
        self.runtime.block_on(fut)
    }
}
