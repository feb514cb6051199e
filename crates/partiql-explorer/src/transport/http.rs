//! HTTP transport: the explorer page, query execution and /health.

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Request, State},
    response::{Html, Json as AxumJson},
    routing::{get, post},
    Form, Router,
};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use partiql_bridge::{BridgeError, QueryRequest};

use crate::executor::QueryExecutor;
use crate::page::{self, EXECUTE_PATH, TUTORIAL_ENVIRONMENT, TUTORIAL_QUERY};
use crate::types::{ExecuteForm, ExplorerError, ExplorerResult};

/// Shared server state passed to all handlers via axum State.
pub struct ServerState {
    pub executor: Arc<dyn QueryExecutor>,
}

/// HTTP transport for the explorer page.
pub struct HttpTransport {
    state: Arc<ServerState>,
}

impl HttpTransport {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            state: Arc::new(ServerState { executor }),
        }
    }

    /// Build the router. Every request runs in a span with its own id.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(handle_root).fallback(invalid_method))
            .route(EXECUTE_PATH, post(handle_execute).fallback(invalid_method))
            .route("/health", get(handle_health))
            .fallback(not_found)
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &Request| {
                        tracing::info_span!(
                            "http_request",
                            request_id = %uuid::Uuid::new_v4(),
                            method = %request.method(),
                            uri = %request.uri(),
                        )
                    })
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .with_state(self.state.clone())
    }

    /// Serve on `addr` until `shutdown` resolves, then drain in-flight requests.
    pub async fn run<F>(&self, addr: &str, shutdown: F) -> ExplorerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!("listening on http://{addr} ...");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

async fn handle_root(State(state): State<Arc<ServerState>>) -> ExplorerResult<Html<String>> {
    let request = QueryRequest::new(TUTORIAL_QUERY, TUTORIAL_ENVIRONMENT);
    execute_and_render(&state, request).await
}

async fn handle_execute(
    State(state): State<Arc<ServerState>>,
    form: Result<Form<ExecuteForm>, FormRejection>,
) -> ExplorerResult<Html<String>> {
    let Form(form) = form.map_err(|e| ExplorerError::InvalidForm(e.body_text()))?;
    let request = form.into_request();
    request.validate()?;
    execute_and_render(&state, request).await
}

/// Execute and render the page. Engine-level failures go into the result
/// pane; anything else fails the HTTP request.
async fn execute_and_render(
    state: &ServerState,
    request: QueryRequest,
) -> ExplorerResult<Html<String>> {
    let result = match state.executor.execute(&request).await {
        Ok(result) => result,
        Err(BridgeError::Execution(e)) => {
            tracing::warn!("Query failed in the engine: {e}");
            e.to_string()
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Html(page::render(
        request.query(),
        request.environment(),
        &result,
    )))
}

/// Health check endpoint.
async fn handle_health(State(state): State<Arc<ServerState>>) -> AxumJson<serde_json::Value> {
    AxumJson(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "mode": state.executor.mode_name(),
        "stats": state.executor.stats(),
    }))
}

async fn invalid_method() -> ExplorerError {
    ExplorerError::InvalidMethod
}

async fn not_found() -> ExplorerError {
    ExplorerError::NotFound
}
