//! Transport layer for the explorer.

pub mod http;

pub use http::{HttpTransport, ServerState};
