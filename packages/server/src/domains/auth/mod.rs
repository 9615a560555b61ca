//! Auth domain - passwordless email-token login.
//!
//! A short-lived one-time numeric token is emailed to the caller; on
//! validation the session binds to a member identity and its access level.

pub mod actions;
pub mod guard;
pub mod models;

pub use guard::check_access;
pub use models::credential::Credential;
