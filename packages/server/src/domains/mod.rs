// Business domains
pub mod auth;
pub mod maintenance;
pub mod member;
