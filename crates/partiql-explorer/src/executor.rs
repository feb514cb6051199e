//! The seam between the HTTP layer and the engine bridge.

use async_trait::async_trait;

use partiql_bridge::{BridgeResult, DispatchStats, Dispatcher, QueryRequest};

/// Executes queries on behalf of the HTTP handlers.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run one request and return the engine's result text.
    async fn execute(&self, request: &QueryRequest) -> BridgeResult<String>;

    /// Short description of how queries are executed.
    fn mode_name(&self) -> &'static str;

    fn stats(&self) -> Option<DispatchStats> {
        None
    }
}

#[async_trait]
impl QueryExecutor for Dispatcher {
    async fn execute(&self, request: &QueryRequest) -> BridgeResult<String> {
        Dispatcher::execute(self, request).await
    }

    fn mode_name(&self) -> &'static str {
        self.mode().name()
    }

    fn stats(&self) -> Option<DispatchStats> {
        Some(Dispatcher::stats(self))
    }
}
