//! Types shared by the HTTP handlers.

pub mod error;
pub mod form;

pub use error::*;
pub use form::ExecuteForm;
