//! Guarded pages and session lifecycle routes.

use axum::extract::Extension;
use axum::http::Uri;
use axum::response::{Html, IntoResponse, Redirect};
use tower_sessions::Session;

use crate::common::{ServerResult, SessionData};
use crate::domains::auth::check_access;
use crate::server::app::AppState;
use crate::server::routes::html_page;

/// GET / - landing page, login required but no particular access level.
pub async fn index_handler(
    Extension(state): Extension<AppState>,
    session: Session,
    uri: Uri,
) -> ServerResult {
    check_access(&session, &state.db_pool, &uri, None, |session_data| async move {
        let email = session_data.email.as_deref().unwrap_or_default().to_string();
        Ok(Html(html_page(
            "Membership database",
            &format!(
                "<p>Signed in as {email}.</p>\
                 <p><a href=\"/logout\">Logout</a></p>"
            ),
        ))
        .into_response())
    })
    .await
}

/// GET /db_restore - one-time target offered on a fresh install. The
/// restore itself is performed by the out-of-scope import tooling.
pub async fn db_restore_handler(
    Extension(state): Extension<AppState>,
    session: Session,
    uri: Uri,
) -> ServerResult {
    check_access(&session, &state.db_pool, &uri, None, |_| async move {
        Ok(Html(html_page(
            "Database restore",
            "<p>The member store is empty. Restore a backup CSV using the import tooling, \
             then reload this page.</p>",
        ))
        .into_response())
    })
    .await
}

/// GET /accessdenied - message naming the support contact, then send the
/// browser back to the previously recorded URL, not the denied one.
pub async fn access_denied_handler(
    Extension(state): Extension<AppState>,
    session: Session,
) -> ServerResult {
    let session_data = SessionData::load(&session).await;
    let back_to = session_data.url_prev.unwrap_or_else(|| "/".to_string());
    let support = &state.deps.settings.support_email;
    Ok(Html(format!(
        "<!DOCTYPE html><html><head><title>Access denied</title>\
         <meta http-equiv=\"refresh\" content=\"3;url={back_to}\" /></head>\
         <body><p>You do not have permission for that, please contact {support} \
         if you think this is wrong.</p></body></html>"
    ))
    .into_response())
}

/// GET /logout - clear the logged-in flag only; the rest of the session is
/// left for the next login to overwrite.
pub async fn logout_handler(session: Session) -> ServerResult {
    let mut session_data = SessionData::load(&session).await;
    session_data.logged_in = false;
    session_data.save(&session).await?;
    Ok(Redirect::to("/").into_response())
}
