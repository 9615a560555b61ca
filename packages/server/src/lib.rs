// Membership Management - API Core
//
// Backend for a small membership organization: passwordless email-token
// login, ranked access control, and the daily maintenance batch job that
// reconciles subscriptions, sends renewal reminders and rotates backups.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
