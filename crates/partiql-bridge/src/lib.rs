//! PartiQL bridge: runs queries on an external PartiQL engine process.
//!
//! A persistent worker speaks a length-prefixed protocol over its stdio
//! ([`framing`], [`worker`]); without one, each request launches the engine
//! fresh ([`oneshot`]). [`dispatch`] picks the path and recovers from worker
//! crashes.

pub mod dispatch;
pub mod engine;
pub mod framing;
pub mod oneshot;
pub mod types;
pub mod worker;

pub use dispatch::{DispatchMode, DispatchStats, Dispatcher};
pub use engine::EngineCommand;
pub use oneshot::{CliVariant, OneShotExecutor};
pub use types::*;
pub use worker::WorkerConnection;
