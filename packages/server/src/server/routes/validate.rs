//! Token validation link and member disambiguation.

use axum::extract::{ConnectInfo, Extension, Path};
use axum::response::{Html, IntoResponse, Redirect};
use axum::Form;
use serde::Deserialize;
use std::net::SocketAddr;
use tower_sessions::Session;

use crate::common::{ServerResult, SessionData};
use crate::domains::auth::actions::{validate_token, ValidateOutcome};
use crate::server::app::AppState;
use crate::server::routes::html_page;

fn choice_page(choices: &[(i64, String)]) -> String {
    let mut options = String::new();
    for (id, label) in choices {
        options.push_str(&format!(
            "<label><input type=\"radio\" name=\"member\" value=\"{id}\" /> {label}</label><br />"
        ));
    }
    html_page(
        "Sign in",
        &format!(
            "<h6>Please select which of you is signing in:</h6>\
             <form method=\"post\">{options}<button type=\"submit\">Continue</button></form>"
        ),
    )
}

async fn handle_outcome(outcome: ValidateOutcome, session: &Session) -> ServerResult {
    match outcome {
        ValidateOutcome::Invalid => Ok(Redirect::to("/").into_response()),
        ValidateOutcome::Choose { choices } => Ok(Html(choice_page(&choices)).into_response()),
        ValidateOutcome::SignedIn {
            email,
            member_id,
            access,
            redirect,
        } => {
            let previous = SessionData::load(session).await;
            let state =
                SessionData::signed_in(email, member_id, access, previous.url, previous.url_prev);
            state.save(session).await?;
            Ok(Redirect::to(&redirect).into_response())
        }
    }
}

/// GET /validate/{id}/{token} - both segments arrive unvalidated; anything
/// that does not parse fails closed to the site root.
pub async fn validate_get(
    Extension(state): Extension<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    session: Session,
    Path((id, token)): Path<(String, String)>,
) -> ServerResult {
    let (Ok(id), Ok(token)) = (id.parse::<i64>(), token.parse::<i64>()) else {
        return Ok(Redirect::to("/").into_response());
    };
    let outcome = validate_token(id, token, None, &addr.ip().to_string(), &state.deps).await?;
    handle_outcome(outcome, &session).await
}

#[derive(Deserialize)]
pub struct ChoiceForm {
    pub member: i64,
}

/// POST /validate/{id}/{token} - disambiguation choice. The token is still
/// in the credential's list here (it is only cleared on final resolution),
/// so a legitimate re-submission passes.
pub async fn validate_post(
    Extension(state): Extension<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    session: Session,
    Path((id, token)): Path<(String, String)>,
    form: Option<Form<ChoiceForm>>,
) -> ServerResult {
    let (Ok(id), Ok(token)) = (id.parse::<i64>(), token.parse::<i64>()) else {
        return Ok(Redirect::to("/").into_response());
    };
    // A submission without a selection just re-presents the choice form.
    let selected = form.map(|Form(f)| f.member);
    let outcome =
        validate_token(id, token, selected, &addr.ip().to_string(), &state.deps).await?;
    handle_outcome(outcome, &session).await
}
