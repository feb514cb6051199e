//! PartiQL Explorer: run PartiQL queries from a browser form.

pub mod config;
pub mod executor;
pub mod page;
pub mod transport;
pub mod types;

pub use config::{resolve_listen_addr, EngineSettings};
pub use executor::QueryExecutor;
pub use transport::HttpTransport;
