//! Shared handler state.

use tiffin_core::ServiceHandle;
use tiffin_engine::Engine;

use crate::error::ApiResult;

/// State cloned into every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Workflow services
    pub engine: Engine,
    /// Lifecycle of the HTTP service
    pub service: ServiceHandle,
}

impl AppState {
    /// Bundles an engine with a fresh service handle.
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            service: ServiceHandle::new("tiffin-api"),
        }
    }

    /// Runs an engine call on the blocking pool.
    ///
    /// Engine calls take the store lock and writes save a snapshot to disk,
    /// so they never run on a runtime worker.
    pub async fn run<T, F>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&Engine) -> tiffin_core::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let engine = self.engine.clone();
        Ok(tokio::task::spawn_blocking(move || f(&engine)).await??)
    }
}
