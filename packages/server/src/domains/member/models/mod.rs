pub mod email;
pub mod member;
