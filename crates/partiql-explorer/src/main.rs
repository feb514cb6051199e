//! PartiQL Explorer entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use partiql_bridge::{Dispatcher, QueryRequest};
use partiql_explorer::config::{resolve_listen_addr, EngineSettings};
use partiql_explorer::transport::HttpTransport;

#[derive(Parser)]
#[command(
    name = "partiql-explorer",
    about = "Web front-end for running PartiQL queries against an environment",
    version
)]
struct Cli {
    /// Listen address (host:port or :port). Falls back to $PORT, then :8080.
    #[arg(long, global = true)]
    addr: Option<String>,

    /// Path to the packaged engine jar, run as a persistent worker.
    #[arg(long, global = true)]
    jar: Option<PathBuf>,

    /// Engine executable to run directly instead of `java -jar <jar>`.
    #[arg(long, global = true)]
    engine: Option<PathBuf>,

    /// Java launcher.
    #[arg(long, global = true, default_value = "java")]
    java: String,

    /// -classpath argument for the upstream CLI.
    #[arg(long, global = true)]
    classpath: Option<String>,

    /// Run the packaged engine once per request instead of as a worker.
    #[arg(long, global = true)]
    no_server: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default).
    Serve,

    /// Execute one query through the configured engine and print the result.
    Run {
        /// File containing the query text.
        #[arg(long)]
        query_file: PathBuf,

        /// File containing the environment text.
        #[arg(long)]
        env_file: PathBuf,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   partiql-explorer completions bash > ~/.local/share/bash-completion/completions/partiql-explorer
    ///   partiql-explorer completions zsh > ~/.zfunc/_partiql-explorer
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = EngineSettings {
        jar: cli.jar,
        engine: cli.engine,
        java: cli.java,
        classpath: cli.classpath,
        no_server: cli.no_server,
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let addr = resolve_listen_addr(cli.addr.as_deref());
            let mode = settings.dispatch_mode();
            tracing::info!("PartiQL explorer ({})", mode.name());

            let dispatcher = Arc::new(
                Dispatcher::connect(mode)
                    .await
                    .context("failed to start the engine worker")?,
            );

            let transport = HttpTransport::new(dispatcher.clone());
            let served = transport.run(&addr, shutdown_signal()).await;

            dispatcher.shutdown().await;
            served?;
        }

        Commands::Run {
            query_file,
            env_file,
        } => {
            let query = tokio::fs::read_to_string(&query_file)
                .await
                .with_context(|| format!("failed to read {}", query_file.display()))?;
            let environment = tokio::fs::read_to_string(&env_file)
                .await
                .with_context(|| format!("failed to read {}", env_file.display()))?;

            let request = QueryRequest::new(query, environment);
            request.validate()?;

            let dispatcher = Dispatcher::connect(settings.dispatch_mode()).await?;
            let outcome = dispatcher.execute(&request).await;
            dispatcher.shutdown().await;

            println!("{}", outcome?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "partiql-explorer", &mut std::io::stdout());
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
