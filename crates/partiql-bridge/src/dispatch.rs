//! Request dispatch: persistent worker when configured, one-shot otherwise.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::engine::EngineCommand;
use crate::oneshot::{CliVariant, OneShotExecutor};
use crate::types::{BridgeResult, QueryRequest};
use crate::worker::WorkerConnection;

/// How requests reach the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchMode {
    /// Keep one engine process alive and talk to it over the framed protocol.
    Worker(EngineCommand),
    /// Launch the engine per request.
    OneShot(OneShotExecutor),
}

impl DispatchMode {
    pub fn name(&self) -> &'static str {
        match self {
            DispatchMode::Worker(_) => "worker",
            DispatchMode::OneShot(executor) => match executor.variant() {
                CliVariant::Original { .. } => "one-shot (original)",
                CliVariant::New(_) => "one-shot (new)",
            },
        }
    }
}

/// Snapshot of dispatcher counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub requests: u64,
    pub worker_starts: u64,
    pub worker_failures: u64,
    pub one_shot_runs: u64,
}

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicU64,
    worker_starts: AtomicU64,
    worker_failures: AtomicU64,
    one_shot_runs: AtomicU64,
}

/// Routes requests to the engine and owns the worker connection, if any.
///
/// At most one request is in flight against the worker at a time: the
/// connection sits behind a mutex and is moved out for the duration of a
/// request. It is put back only after a successful exchange, so a failed
/// connection can never be reused.
pub struct Dispatcher {
    mode: DispatchMode,
    connection: Mutex<Option<WorkerConnection>>,
    counters: Counters,
}

impl Dispatcher {
    /// Create a dispatcher without starting anything. In worker mode the
    /// first request starts the worker.
    pub fn new(mode: DispatchMode) -> Self {
        Self {
            mode,
            connection: Mutex::new(None),
            counters: Counters::default(),
        }
    }

    /// Create a dispatcher and, in worker mode, start the worker now.
    pub async fn connect(mode: DispatchMode) -> BridgeResult<Self> {
        let dispatcher = Self::new(mode);
        if let DispatchMode::Worker(command) = &dispatcher.mode {
            let connection = dispatcher.start_worker(command)?;
            *dispatcher.connection.lock().await = Some(connection);
        }
        Ok(dispatcher)
    }

    pub fn mode(&self) -> &DispatchMode {
        &self.mode
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            requests: self.counters.requests.load(Ordering::Relaxed),
            worker_starts: self.counters.worker_starts.load(Ordering::Relaxed),
            worker_failures: self.counters.worker_failures.load(Ordering::Relaxed),
            one_shot_runs: self.counters.one_shot_runs.load(Ordering::Relaxed),
        }
    }

    /// Whether a worker connection is currently held.
    pub async fn has_worker(&self) -> bool {
        self.connection.lock().await.is_some()
    }

    /// Execute one request and return the engine's result text.
    ///
    /// A worker failure is returned to the caller as-is; the failed worker is
    /// closed and replaced before the next request is served, but the request
    /// itself is not retried.
    pub async fn execute(&self, request: &QueryRequest) -> BridgeResult<String> {
        let started = Instant::now();
        self.counters.requests.fetch_add(1, Ordering::Relaxed);

        let result = match &self.mode {
            DispatchMode::Worker(command) => self.execute_on_worker(command, request).await,
            DispatchMode::OneShot(executor) => {
                self.counters.one_shot_runs.fetch_add(1, Ordering::Relaxed);
                executor.execute(request).await
            }
        };

        if result.is_ok() {
            tracing::info!("executed query in {:?}", started.elapsed());
        }
        result
    }

    async fn execute_on_worker(
        &self,
        command: &EngineCommand,
        request: &QueryRequest,
    ) -> BridgeResult<String> {
        let mut slot = self.connection.lock().await;

        // If this future is dropped mid-exchange the connection goes with it
        // (killing the child) and the slot stays empty for the next request.
        let mut connection = match slot.take() {
            Some(connection) => connection,
            None => {
                tracing::warn!("No live engine worker, starting one before serving");
                self.start_worker(command)?
            }
        };

        match connection.execute(request).await {
            Ok(result) => {
                *slot = Some(connection);
                Ok(result)
            }
            Err(e) => {
                self.counters.worker_failures.fetch_add(1, Ordering::Relaxed);

                if let Err(close_err) = connection.close().await {
                    tracing::warn!("Error closing failed engine worker: {close_err}");
                }
                match self.start_worker(command) {
                    Ok(replacement) => *slot = Some(replacement),
                    Err(start_err) => {
                        tracing::error!("Error starting replacement engine worker: {start_err}")
                    }
                }
                Err(e)
            }
        }
    }

    fn start_worker(&self, command: &EngineCommand) -> BridgeResult<WorkerConnection> {
        self.counters.worker_starts.fetch_add(1, Ordering::Relaxed);
        WorkerConnection::start(command)
    }

    /// Close the worker connection, if any. Called on server shutdown.
    pub async fn shutdown(&self) {
        let connection = self.connection.lock().await.take();
        if let Some(connection) = connection {
            if let Err(e) = connection.close().await {
                tracing::warn!("Error closing engine worker on shutdown: {e}");
            }
        }
    }
}
