//! Email-confirmation issuance.

use anyhow::Result;
use chrono::Local;
use tracing::info;

use crate::domains::auth::models::credential::{generate_token, push_token};
use crate::domains::auth::Credential;
use crate::kernel::ServerDeps;

/// Issue a fresh one-time token for `email` and send the validation link.
///
/// Finds or creates the credential, stamps the caller's network origin,
/// prepends the token to the credential's list and records the pending
/// return URL (the session's, defaulting to the site root). One outbound
/// email, one store write.
pub async fn send_confirmation(
    email: &str,
    remote_addr: &str,
    pending_url: Option<String>,
    deps: &ServerDeps,
) -> Result<()> {
    let email = email.to_lowercase();
    let credential = Credential::find_or_create(&email, remote_addr, &deps.db_pool).await?;

    let token = generate_token();
    let tokens = push_token(&credential.tokens.0, token);
    let when_issued = Local::now().naive_local();
    let url = pending_url.unwrap_or_else(|| "/".to_string());

    Credential::record_issue(credential.id, &tokens, when_issued, &url, &deps.db_pool).await?;

    let link = format!("{}/validate/{}/{}", deps.settings.org_domain, credential.id, token);
    let body = deps.letterhead.render(
        " ",
        &[
            format!(
                "Please click <a href=\"{link}\">{link}</a> to continue to {}.",
                deps.settings.org_domain
            ),
            "Please ignore this message if you did not request it.".to_string(),
            "If the link doesn't work, please try copy & pasting it to your browser's \
             address bar."
                .to_string(),
            format!(
                "If you are unable to login, please contact \
                 <a href=\"mailto:{0}\">{0}</a>.",
                deps.settings.support_email
            ),
        ],
    );

    deps.mailer
        .send(
            &email,
            None,
            &deps.settings.support_email,
            "Please Confirm Email",
            &body,
        )
        .await?;

    info!("confirmation sent {} {}", remote_addr, email);
    Ok(())
}
