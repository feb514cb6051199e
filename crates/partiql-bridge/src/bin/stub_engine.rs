//! Stand-in PartiQL engine.
//!
//! Speaks the same process contracts as the real engine so the bridge can be
//! exercised without a JVM:
//!
//! - `--server`: framed requests on stdin, framed responses on stdout.
//! - `<env-file>`: query on stdin, result on stdout (packaged CLI).
//! - `--environment <file> --query <q>`: upstream CLI form.
//!
//! Results echo the query and environment unless `--respond` fixes one.
//! Queries starting with `!fail` fail the way a bad query does.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tokio::io::{AsyncReadExt, BufReader};

use partiql_bridge::framing;
use partiql_bridge::{BridgeError, BridgeResult};

const FAIL_PREFIX: &str = "!fail";

#[derive(Parser, Debug)]
#[command(
    name = "partiql-stub-engine",
    about = "Stand-in PartiQL engine for exercising the bridge",
    version
)]
struct Cli {
    /// Serve framed requests on stdin until EOF.
    #[arg(long)]
    server: bool,

    /// Fixed response text for every successful request.
    #[arg(long, allow_hyphen_values = true)]
    respond: Option<String>,

    /// Exit after this many responses (server mode).
    #[arg(long)]
    exit_after: Option<u64>,

    /// Environment file (upstream CLI form).
    #[arg(long)]
    environment: Option<PathBuf>,

    /// Query text (upstream CLI form).
    #[arg(long, allow_hyphen_values = true)]
    query: Option<String>,

    /// Output format selector (upstream CLI form, ignored).
    #[arg(long)]
    output_format: Option<String>,

    /// Classpath (upstream CLI form, ignored). `-classpath` is accepted too.
    #[arg(long)]
    classpath: Option<String>,

    /// Main class (ignored) or environment file.
    positional: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // The upstream CLI is launched with a single-dash `-classpath`.
    let args = std::env::args().map(|arg| {
        if arg == "-classpath" {
            "--classpath".to_string()
        } else {
            arg
        }
    });
    let cli = Cli::parse_from(args);

    let outcome = if cli.server {
        serve(cli.respond.as_deref(), cli.exit_after).await
    } else if let Some(environment) = &cli.environment {
        tracing::debug!(
            classpath = ?cli.classpath,
            output_format = ?cli.output_format,
            main_class = ?cli.positional.first(),
            "upstream CLI form"
        );
        let query = cli.query.clone().unwrap_or_default();
        run_once(environment, query, cli.respond.as_deref()).await
    } else if let Some(environment) = cli.positional.last() {
        let mut query = String::new();
        match tokio::io::stdin().read_to_string(&mut query).await {
            Ok(_) => run_once(Path::new(environment), query, cli.respond.as_deref()).await,
            Err(e) => Err(BridgeError::Io(e)),
        }
    } else {
        eprintln!("Usage: pass the environment path as the only arg; reads query from STDIN");
        return ExitCode::from(1);
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("partiql-stub-engine: {e}");
            ExitCode::from(1)
        }
    }
}

fn evaluate(query: &str, environment: &str, canned: Option<&str>) -> Result<String, String> {
    if query.trim_start().starts_with(FAIL_PREFIX) {
        return Err(format!("syntax error: unexpected token in `{}`", query.trim()));
    }
    match canned {
        Some(canned) => Ok(canned.to_string()),
        None => Ok(format!(
            "query: {}\nenvironment: {}",
            query.trim(),
            environment.trim()
        )),
    }
}

async fn serve(canned: Option<&str>, exit_after: Option<u64>) -> BridgeResult<ExitCode> {
    tracing::info!("running in server mode; reading requests from stdin ...");
    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut served = 0u64;

    loop {
        let request = match framing::read_request(&mut stdin).await {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!("stopping: {e}");
                return Ok(ExitCode::SUCCESS);
            }
        };
        tracing::debug!(
            "reading query:{} env:{}",
            request.query().len(),
            request.environment().len()
        );

        let result = evaluate(request.query(), request.environment(), canned)
            .unwrap_or_else(|e| format!("Execution error: {e}"));
        framing::write_response(&mut stdout, &result).await?;

        served += 1;
        if exit_after == Some(served) {
            tracing::info!("exiting after {served} responses");
            return Ok(ExitCode::SUCCESS);
        }
    }
}

async fn run_once(environment: &Path, query: String, canned: Option<&str>) -> BridgeResult<ExitCode> {
    let environment = tokio::fs::read_to_string(environment).await?;
    match evaluate(&query, &environment, canned) {
        Ok(result) => {
            println!("{result}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{e}");
            Ok(ExitCode::from(2))
        }
    }
}
