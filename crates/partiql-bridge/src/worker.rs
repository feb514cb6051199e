//! Persistent engine worker: one child process serving framed requests over
//! its stdin/stdout.

use std::process::Stdio;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout};

use crate::engine::EngineCommand;
use crate::framing;
use crate::types::{BridgeError, BridgeResult, QueryRequest};

/// Flag that switches the engine into its read-request/write-response loop.
pub const SERVER_MODE_FLAG: &str = "--server";

/// A live worker process plus its two pipes.
///
/// A connection that has seen any I/O failure is poisoned: every later
/// `execute` fails without touching the pipes. Callers are expected to
/// `close` it and start a replacement.
pub struct WorkerConnection {
    child: Child,
    to_process: ChildStdin,
    from_process: BufReader<ChildStdout>,
    pid: Option<u32>,
    served: u64,
    poisoned: bool,
}

impl WorkerConnection {
    /// Spawn the engine in worker mode.
    ///
    /// The worker's stderr is inherited so its diagnostics land in our log
    /// stream. The child is killed if the connection is dropped without
    /// `close`.
    pub fn start(command: &EngineCommand) -> BridgeResult<Self> {
        let mut cmd = command.to_command();
        cmd.arg(SERVER_MODE_FLAG)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            BridgeError::Spawn(format!("failed to spawn engine worker `{command}`: {e}"))
        })?;

        let to_process = child
            .stdin
            .take()
            .ok_or_else(|| BridgeError::Spawn("engine worker stdin not captured".into()))?;
        let from_process = child
            .stdout
            .take()
            .ok_or_else(|| BridgeError::Spawn("engine worker stdout not captured".into()))?;

        let pid = child.id();
        tracing::info!(pid = ?pid, "Started engine worker: {command} {SERVER_MODE_FLAG}");

        Ok(Self {
            child,
            to_process,
            from_process: BufReader::new(from_process),
            pid,
            served: 0,
            poisoned: false,
        })
    }

    /// OS process id, if the child has not been reaped.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Number of requests this worker answered successfully.
    pub fn requests_served(&self) -> u64 {
        self.served
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Send one request and wait for its response.
    ///
    /// Responses are matched to requests purely by stream order, so callers
    /// must not overlap calls on the same connection.
    pub async fn execute(&mut self, request: &QueryRequest) -> BridgeResult<String> {
        if self.poisoned {
            return Err(BridgeError::Protocol(
                "engine worker connection is poisoned by an earlier failure".into(),
            ));
        }

        match self.exchange(request).await {
            Ok(result) => {
                self.served += 1;
                Ok(result)
            }
            Err(e) => {
                self.poisoned = true;
                tracing::warn!(pid = ?self.pid, "Engine worker exchange failed: {e}");
                Err(e)
            }
        }
    }

    async fn exchange(&mut self, request: &QueryRequest) -> BridgeResult<String> {
        framing::write_request(&mut self.to_process, request).await?;
        framing::read_response(&mut self.from_process).await
    }

    /// Close stdin, close stdout, and wait for the process to exit.
    ///
    /// All three steps run even when an earlier one fails; the first error
    /// encountered is returned.
    pub async fn close(self) -> BridgeResult<()> {
        let WorkerConnection {
            mut child,
            mut to_process,
            from_process,
            pid,
            served,
            ..
        } = self;

        let input_closed = to_process
            .shutdown()
            .await
            .map_err(|e| BridgeError::Io(std::io::Error::other(format!(
                "failed to close engine worker stdin: {e}"
            ))));
        drop(to_process);

        // Dropping the read half closes it; that step cannot fail.
        drop(from_process);

        let exited = match child.wait().await {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(BridgeError::Io(std::io::Error::other(format!(
                "engine worker exited with {status}"
            )))),
            Err(e) => Err(BridgeError::Io(e)),
        };

        tracing::info!(pid = ?pid, served, "Closed engine worker");
        input_closed.and(exited)
    }
}

impl std::fmt::Debug for WorkerConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerConnection")
            .field("pid", &self.pid)
            .field("served", &self.served)
            .field("poisoned", &self.poisoned)
            .finish()
    }
}
