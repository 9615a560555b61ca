// Auth actions, called from the HTTP routes

pub mod send_confirmation;
pub mod validate_token;

pub use send_confirmation::send_confirmation;
pub use validate_token::{validate_token, ValidateOutcome};
