//! Login initiation and confirmation issuance.

use axum::extract::{ConnectInfo, Extension, Query};
use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect};
use axum::Form;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::net::SocketAddr;
use tower_sessions::Session;
use tracing::info;

use crate::common::{ServerResult, SessionData};
use crate::domains::auth::actions::send_confirmation;
use crate::domains::auth::Credential;
use crate::server::app::AppState;
use crate::server::routes::html_page;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && EMAIL_RE.is_match(email)
}

fn login_page(support_email: &str, prefill: &str, error: Option<&str>) -> String {
    let error = error
        .map(|e| format!("<p><strong>{e}</strong></p>"))
        .unwrap_or_default();
    html_page(
        "Login",
        &format!(
            "<p>Please specify your email to login.<br />If you have signed in previously, \
             please use the same email as this identifies your record.<br />You can change \
             your email after logging in via 'My account'.<br />If you no longer have access \
             to your old email, please contact \
             <a href=\"mailto:{support_email}\">{support_email}</a>.</p>{error}\
             <form method=\"post\">\
             <input type=\"email\" name=\"email\" value=\"{prefill}\" />\
             <button type=\"submit\">Login</button></form>"
        ),
    )
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
}

/// GET /login - email form, pre-filled from a credential matched by the
/// caller's network origin or the session's last-used email.
pub async fn login_form(
    Extension(state): Extension<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    session: Session,
) -> ServerResult {
    let session_data = SessionData::load(&session).await;
    let prefill = match Credential::find_by_remote_addr(&addr.ip().to_string(), &state.db_pool)
        .await?
    {
        Some(credential) => Some(credential.email),
        None => session_data.email,
    };
    Ok(Html(login_page(
        &state.deps.settings.support_email,
        prefill.as_deref().unwrap_or_default(),
        None,
    ))
    .into_response())
}

/// POST /login - log the attempt and hand off to confirmation issuance.
/// No account creation happens here.
pub async fn login_submit(
    Extension(state): Extension<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> ServerResult {
    let email = form.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Ok(Html(login_page(
            &state.deps.settings.support_email,
            &email,
            Some("Please enter a valid email address."),
        ))
        .into_response());
    }

    let session_data = SessionData::load(&session).await;
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    info!(
        "login {} {} {} {}",
        addr.ip(),
        user_agent,
        email,
        session_data.url.as_deref().unwrap_or_default()
    );

    Ok(Redirect::to(&format!(
        "/send_email_confirmation?email={}",
        urlencoding::encode(&email)
    ))
    .into_response())
}

#[derive(Deserialize)]
pub struct ConfirmationQuery {
    pub email: String,
}

/// GET /send_email_confirmation?email= - issue a one-time token and email
/// the validation link.
pub async fn send_email_confirmation_handler(
    Extension(state): Extension<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    session: Session,
    query: Option<Query<ConfirmationQuery>>,
) -> ServerResult {
    // Missing or malformed email fails closed, without detail.
    let Some(Query(query)) = query else {
        return Ok(Redirect::to("/").into_response());
    };
    let email = query.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Ok(Redirect::to("/").into_response());
    }

    let session_data = SessionData::load(&session).await;
    send_confirmation(&email, &addr.ip().to_string(), session_data.url, &state.deps).await?;

    Ok(Html(html_page(
        "Check your email",
        "<p>Please click the link sent to your email to continue. If you don't see the \
         validation message, please check your spam folder.</p>\
         <p>This link is valid for 15 minutes. You may close this window.</p>",
    ))
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_syntax_check() {
        assert!(is_valid_email("someone@example.org"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two words@example.org"));
    }
}
