//! Error type for the HTTP front-end and its mapping to responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use partiql_bridge::BridgeError;

/// All errors that can occur while serving a request.
#[derive(thiserror::Error, Debug)]
pub enum ExplorerError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("invalid method")]
    InvalidMethod,

    #[error("404 page not found")]
    NotFound,

    #[error("Invalid form: {0}")]
    InvalidForm(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExplorerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ExplorerError::InvalidMethod => StatusCode::METHOD_NOT_ALLOWED,
            ExplorerError::NotFound => StatusCode::NOT_FOUND,
            ExplorerError::InvalidForm(_) => StatusCode::BAD_REQUEST,
            // Missing fields are reported the same way as internal failures.
            ExplorerError::Bridge(_) | ExplorerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Plain-text body carrying the error's message.
impl IntoResponse for ExplorerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{self}");
        }
        (status, self.to_string()).into_response()
    }
}

pub type ExplorerResult<T> = Result<T, ExplorerError>;
