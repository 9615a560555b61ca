//! Member domain - membership records and access levels.
//!
//! A Member is a billable/tracked person, distinct from the login
//! credential; one credential may resolve to several members sharing an
//! email address.

pub mod access;
pub mod models;

pub use access::AccessLevel;
pub use models::email::EmailRecord;
pub use models::member::Member;
