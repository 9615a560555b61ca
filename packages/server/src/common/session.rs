//! Per-browser session state.
//!
//! One serde value stored under a single key in the cookie-backed
//! `tower_sessions::Session`. Created at login validation, the logged_in
//! flag cleared at logout; other fields are left for the next login to
//! overwrite.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::domains::member::AccessLevel;

const SESSION_KEY: &str = "member_session";

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionData {
    pub logged_in: bool,
    /// Bound member id; None when the credential resolved to no member.
    pub member_id: Option<i64>,
    /// Access level copied from the bound member at bind time.
    /// Not re-synced until the next login.
    pub access: Option<AccessLevel>,
    pub email: Option<String>,
    /// Selected list filter, cleared on login.
    pub filter: Option<String>,
    /// Navigation-back stack of URLs.
    pub back: Vec<String>,
    /// Current URL, maintained by the access guard.
    pub url: Option<String>,
    /// URL before the current one, target of the access-denied redirect.
    pub url_prev: Option<String>,
}

impl SessionData {
    /// Load from the browser session, defaulting to an anonymous state.
    pub async fn load(session: &Session) -> Self {
        session
            .get::<SessionData>(SESSION_KEY)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    pub async fn save(&self, session: &Session) -> Result<()> {
        session.insert(SESSION_KEY, self).await?;
        Ok(())
    }

    /// Fresh logged-in state established at token validation.
    ///
    /// Clears the filter and the back stack; the access level is the
    /// member's at bind time.
    pub fn signed_in(
        email: String,
        member_id: Option<i64>,
        access: Option<AccessLevel>,
        url: Option<String>,
        url_prev: Option<String>,
    ) -> Self {
        Self {
            logged_in: true,
            member_id,
            access,
            email: Some(email),
            filter: None,
            back: Vec::new(),
            url,
            url_prev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_in_clears_filter_and_back_stack() {
        let state = SessionData::signed_in(
            "a@example.org".to_string(),
            Some(7),
            Some(AccessLevel::Write),
            Some("/".to_string()),
            None,
        );
        assert!(state.logged_in);
        assert_eq!(state.member_id, Some(7));
        assert_eq!(state.access, Some(AccessLevel::Write));
        assert!(state.filter.is_none());
        assert!(state.back.is_empty());
    }
}
