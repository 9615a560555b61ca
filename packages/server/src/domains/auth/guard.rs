//! Cross-cutting access guard.
//!
//! Every protected handler passes its body to [`check_access`] as a value,
//! so enforcement happens at the boundary and cannot be bypassed by calling
//! the operation directly.

use std::future::Future;

use axum::http::Uri;
use axum::response::{IntoResponse, Redirect};
use sqlx::PgPool;
use tower_sessions::Session;

use crate::common::{ServerResult, SessionData};
use crate::domains::member::{AccessLevel, Member};

/// One-time target offered on a fresh install, before any member exists.
pub const DB_RESTORE_URL: &str = "/db_restore";

/// Update the navigation trail for an incoming URL: remember the prior
/// current URL as previous, and pop the back stack when the user navigated
/// back to its top entry.
pub fn record_navigation(state: &mut SessionData, url: &str) {
    state.url_prev = state.url.take();
    state.url = Some(url.to_string());
    if state.back.last().map(String::as_str) == Some(url) {
        state.back.pop();
    }
}

/// Rank comparison with unset access counting as -1.
pub fn rank_allows(have: Option<AccessLevel>, required: AccessLevel) -> bool {
    AccessLevel::rank_of(have) >= required.rank()
}

/// What the guard does with a request.
#[derive(Debug, PartialEq)]
pub(crate) enum GuardDecision {
    /// Redirect to login; on a fresh install the pending URL is switched
    /// to the database-restore page first.
    Login { defer_to_restore: bool },
    /// Empty-store bootstrap: nobody can hold access yet, the call goes
    /// through unauthenticated.
    Bootstrap,
    Denied,
    Allowed,
}

pub(crate) fn decide(
    logged_in: bool,
    store_empty: bool,
    member_id: Option<i64>,
    access: Option<AccessLevel>,
    required: Option<AccessLevel>,
) -> GuardDecision {
    if !logged_in {
        return GuardDecision::Login {
            defer_to_restore: store_empty,
        };
    }
    if let Some(required) = required {
        if (member_id.is_none() || access.is_none()) && store_empty {
            return GuardDecision::Bootstrap;
        }
        if !rank_allows(access, required) {
            return GuardDecision::Denied;
        }
    }
    GuardDecision::Allowed
}

/// Guard a protected operation with an optional required access level.
///
/// Unauthenticated callers are redirected to login (on a fresh install the
/// pending URL becomes the database-restore page first); under-privileged
/// callers are redirected to the access-denied page. The empty-store
/// bootstrap exception lets the very first caller through unauthenticated.
pub async fn check_access<F, Fut>(
    session: &Session,
    pool: &PgPool,
    uri: &Uri,
    required: Option<AccessLevel>,
    op: F,
) -> ServerResult
where
    F: FnOnce(SessionData) -> Fut,
    Fut: Future<Output = ServerResult>,
{
    let mut state = SessionData::load(session).await;
    record_navigation(&mut state, &uri.to_string());

    // The member count only matters before login and for the bootstrap
    // exception; skip the query otherwise.
    let needs_count = !state.logged_in
        || (required.is_some() && (state.member_id.is_none() || state.access.is_none()));
    let store_empty = needs_count && Member::count(pool).await? == 0;

    match decide(
        state.logged_in,
        store_empty,
        state.member_id,
        state.access,
        required,
    ) {
        GuardDecision::Login { defer_to_restore } => {
            if defer_to_restore {
                state.url = Some(DB_RESTORE_URL.to_string());
            }
            state.save(session).await?;
            Ok(Redirect::to("/login").into_response())
        }
        GuardDecision::Denied => {
            state.save(session).await?;
            Ok(Redirect::to("/accessdenied").into_response())
        }
        GuardDecision::Bootstrap | GuardDecision::Allowed => {
            state.save(session).await?;
            op(state).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_records_previous_and_current() {
        let mut state = SessionData {
            url: Some("/a".to_string()),
            ..Default::default()
        };
        record_navigation(&mut state, "/b");
        assert_eq!(state.url_prev.as_deref(), Some("/a"));
        assert_eq!(state.url.as_deref(), Some("/b"));
    }

    #[test]
    fn navigation_pops_back_stack_on_return() {
        let mut state = SessionData {
            back: vec!["/x".to_string(), "/b".to_string()],
            ..Default::default()
        };
        record_navigation(&mut state, "/b");
        assert_eq!(state.back, vec!["/x".to_string()]);

        // Non-matching top is left alone.
        record_navigation(&mut state, "/y");
        assert_eq!(state.back, vec!["/x".to_string()]);
    }

    #[test]
    fn rank_comparison_counts_unset_as_minus_one() {
        assert!(!rank_allows(None, AccessLevel::Read));
        assert!(rank_allows(Some(AccessLevel::Read), AccessLevel::Read));
        assert!(!rank_allows(Some(AccessLevel::Read), AccessLevel::Write));
        assert!(rank_allows(Some(AccessLevel::Admin), AccessLevel::Write));
    }

    #[test]
    fn empty_store_lets_gated_calls_through() {
        // Fresh install: no member can hold access yet, so every gated
        // call passes regardless of the session's access level.
        for required in [None, Some(AccessLevel::Read), Some(AccessLevel::Admin)] {
            let decision = decide(true, true, None, None, required);
            assert!(
                matches!(decision, GuardDecision::Bootstrap | GuardDecision::Allowed),
                "required {required:?} got {decision:?}"
            );
        }
    }

    #[test]
    fn empty_store_defers_login_to_database_restore() {
        assert_eq!(
            decide(false, true, None, None, Some(AccessLevel::Admin)),
            GuardDecision::Login {
                defer_to_restore: true
            }
        );
        assert_eq!(
            decide(false, false, None, None, None),
            GuardDecision::Login {
                defer_to_restore: false
            }
        );
    }

    #[test]
    fn populated_store_without_access_denies_every_gated_call() {
        for required in [AccessLevel::Read, AccessLevel::Write, AccessLevel::Admin] {
            assert_eq!(
                decide(true, false, Some(7), None, Some(required)),
                GuardDecision::Denied,
                "required {required:?}"
            );
        }
    }

    #[test]
    fn sufficient_access_is_allowed() {
        assert_eq!(
            decide(true, false, Some(7), Some(AccessLevel::Write), Some(AccessLevel::Read)),
            GuardDecision::Allowed
        );
        // No required level: login is enough.
        assert_eq!(decide(true, false, None, None, None), GuardDecision::Allowed);
    }
}
