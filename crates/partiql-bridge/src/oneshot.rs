//! One-shot execution: a fresh engine process per request.
//!
//! The environment goes through a temporary file that is removed when the
//! call returns, on every path. The query goes either on the command line
//! (the upstream CLI) or on the child's stdin (the packaged CLI).

use std::io::Write;
use std::process::Stdio;

use tempfile::NamedTempFile;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStderr, ChildStdout};

use crate::engine::EngineCommand;
use crate::types::{BridgeError, BridgeResult, ExecutionError, QueryRequest};

/// Entry point class of the upstream PartiQL CLI.
pub const ORIGINAL_MAIN_CLASS: &str = "org.partiql.cli.Main";

/// Output format the upstream CLI is asked for.
pub const ORIGINAL_OUTPUT_FORMAT: &str = "PARTIQL";

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Which engine command line to drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliVariant {
    /// `<java> [-classpath <cp>] org.partiql.cli.Main --environment <file>
    /// --output-format PARTIQL --query <query>`
    Original {
        java: EngineCommand,
        classpath: Option<String>,
    },
    /// `<engine> <env-file>`, query written to stdin.
    New(EngineCommand),
}

/// Runs each request in its own engine process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneShotExecutor {
    variant: CliVariant,
}

impl OneShotExecutor {
    /// Drive the upstream CLI main class.
    pub fn original(java: EngineCommand, classpath: Option<String>) -> Self {
        Self {
            variant: CliVariant::Original { java, classpath },
        }
    }

    /// Drive the packaged CLI that reads the query from stdin.
    pub fn new_cli(engine: EngineCommand) -> Self {
        Self {
            variant: CliVariant::New(engine),
        }
    }

    pub fn variant(&self) -> &CliVariant {
        &self.variant
    }

    /// Short name of the variant, for logs and health output.
    pub fn variant_name(&self) -> &'static str {
        match self.variant {
            CliVariant::Original { .. } => "original",
            CliVariant::New(_) => "new",
        }
    }

    /// Execute one request and return the engine's combined stdout/stderr.
    ///
    /// Launch failures, non-zero exits and stdin write failures all come back
    /// as [`ExecutionError`] carrying whatever output was produced.
    pub async fn execute(&self, request: &QueryRequest) -> BridgeResult<String> {
        let env_file = write_environment(request.environment())?;
        let env_path = env_file.path().display().to_string();

        let (mut cmd, stdin_query) = match &self.variant {
            CliVariant::Original { java, classpath } => {
                let mut cmd = java.to_command();
                if let Some(classpath) = classpath {
                    cmd.arg("-classpath").arg(classpath);
                }
                cmd.arg(ORIGINAL_MAIN_CLASS)
                    .arg("--environment")
                    .arg(&env_path)
                    .arg("--output-format")
                    .arg(ORIGINAL_OUTPUT_FORMAT)
                    .arg("--query")
                    .arg(request.query());
                (cmd, None)
            }
            CliVariant::New(engine) => {
                let mut cmd = engine.to_command();
                cmd.arg(&env_path);
                (cmd, Some(request.query().to_owned()))
            }
        };

        cmd.stdin(if stdin_query.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

        tracing::debug!(variant = self.variant_name(), env = %env_path, "Launching one-shot engine");

        let mut child = cmd
            .spawn()
            .map_err(|e| ExecutionError::new("", Some(Box::new(e))))?;

        // Feed stdin from its own task so a chatty engine can't deadlock us.
        let writer = match (child.stdin.take(), stdin_query) {
            (Some(mut stdin), Some(query)) => Some(tokio::spawn(async move {
                let written = stdin.write_all(query.as_bytes()).await;
                let closed = stdin.shutdown().await;
                drop(stdin);
                written.and(closed)
            })),
            _ => None,
        };

        let collected = collect_combined(child.stdout.take(), child.stderr.take()).await;
        let status = child.wait().await;

        let output = match collected {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => return Err(ExecutionError::new("", Some(Box::new(e))).into()),
        };

        match status {
            Ok(status) if status.success() => {}
            Ok(status) => {
                let cause = std::io::Error::other(format!("engine exited with {status}"));
                return Err(ExecutionError::new(output, Some(Box::new(cause))).into());
            }
            Err(e) => return Err(ExecutionError::new(output, Some(Box::new(e))).into()),
        }

        // Checked only after the output is fully drained, so diagnostics survive.
        if let Some(writer) = writer {
            let written = match writer.await {
                Ok(result) => result,
                Err(join) => Err(std::io::Error::other(format!("stdin writer failed: {join}"))),
            };
            if let Err(e) = written {
                return Err(ExecutionError::new(output, Some(Box::new(e))).into());
            }
        }

        Ok(output)
    }
}

/// Write the environment to a temp file that is deleted on drop.
fn write_environment(environment: &str) -> BridgeResult<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("partiql-env-")
        .suffix(".env")
        .tempfile()?;
    file.write_all(environment.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Drain stdout and stderr concurrently into one buffer, in arrival order.
async fn collect_combined(
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
) -> std::io::Result<Vec<u8>> {
    let mut stdout = stdout;
    let mut stderr = stderr;
    let mut out_buf = vec![0u8; READ_CHUNK_SIZE];
    let mut err_buf = vec![0u8; READ_CHUNK_SIZE];
    let mut combined = Vec::new();

    while stdout.is_some() || stderr.is_some() {
        tokio::select! {
            read = read_chunk(&mut stdout, &mut out_buf) => match read? {
                0 => stdout = None,
                n => combined.extend_from_slice(&out_buf[..n]),
            },
            read = read_chunk(&mut stderr, &mut err_buf) => match read? {
                0 => stderr = None,
                n => combined.extend_from_slice(&err_buf[..n]),
            },
        }
    }

    Ok(combined)
}

/// Read from a stream that may already be finished; a finished stream never
/// completes so `select!` keeps waiting on the other one.
async fn read_chunk<R>(stream: &mut Option<R>, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    match stream {
        Some(stream) => stream.read(buf).await,
        None => std::future::pending().await,
    }
}
