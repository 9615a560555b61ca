// Common types and utilities shared across the application

pub mod error;
pub mod session;

pub use error::{ServerError, ServerResult};
pub use session::SessionData;
