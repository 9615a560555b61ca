//! Token validation and member resolution.

use anyhow::Result;
use chrono::Local;
use tracing::info;

use crate::domains::auth::Credential;
use crate::domains::member::{AccessLevel, Member};
use crate::kernel::ServerDeps;

/// Pending URLs containing this marker belong to the email-address-change
/// flow and never prompt for member disambiguation.
const SWITCH_EMAIL_MARKER: &str = "switch_email";

/// Result of a validation attempt.
pub enum ValidateOutcome {
    /// Fail closed: unknown credential, unknown token, or expired window.
    Invalid,
    /// Session should be established and the browser redirected.
    SignedIn {
        email: String,
        member_id: Option<i64>,
        access: Option<AccessLevel>,
        redirect: String,
    },
    /// Several members share the email; an explicit choice is required.
    Choose { choices: Vec<(i64, String)> },
}

/// How a credential's member set resolves to a bound identity.
#[derive(Debug, PartialEq)]
enum Selection {
    Auto(Option<i64>),
    Prompt,
    Chosen(i64),
}

fn select_member(member_ids: &[i64], pending_url: &str, selected: Option<i64>) -> Selection {
    if member_ids.len() <= 1 || pending_url.contains(SWITCH_EMAIL_MARKER) {
        // Bind a member only on an exact single match; the switch_email
        // flow with several matches proceeds unbound rather than guessing.
        let only_match = (member_ids.len() == 1).then(|| member_ids[0]);
        Selection::Auto(only_match)
    } else if let Some(choice) = selected {
        if member_ids.contains(&choice) {
            Selection::Chosen(choice)
        } else {
            Selection::Prompt
        }
    } else {
        Selection::Prompt
    }
}

/// Validate a (credential id, token) pair from an emailed link and resolve
/// which member the session should bind to.
///
/// `selected` carries the member chosen on the disambiguation form; the
/// token is still in the credential's list at that point because the list
/// is only cleared on final resolution.
pub async fn validate_token(
    credential_id: i64,
    token: i64,
    selected: Option<i64>,
    remote_addr: &str,
    deps: &ServerDeps,
) -> Result<ValidateOutcome> {
    let Some(credential) = Credential::find_by_id(credential_id, &deps.db_pool).await? else {
        return Ok(ValidateOutcome::Invalid);
    };
    let now = Local::now().naive_local();
    if !credential.token_valid(token, now) {
        return Ok(ValidateOutcome::Invalid);
    }

    let members = Member::find_by_email_ci(&credential.email, &deps.db_pool).await?;
    let member_ids: Vec<i64> = members.iter().map(|m| m.id).collect();
    let pending_url = credential.url.clone().unwrap_or_else(|| "/".to_string());

    let member_id = match select_member(&member_ids, &pending_url, selected) {
        Selection::Auto(id) => id,
        Selection::Chosen(id) => Some(id),
        Selection::Prompt => {
            return Ok(ValidateOutcome::Choose {
                choices: members.iter().map(|m| (m.id, m.choice_label())).collect(),
            });
        }
    };

    let access = member_id
        .and_then(|id| members.iter().find(|m| m.id == id))
        .and_then(Member::access_level);

    Credential::clear_tokens(credential.id, &deps.db_pool).await?;
    info!("verified {} {}", remote_addr, credential.email);

    Ok(ValidateOutcome::SignedIn {
        email: credential.email,
        member_id,
        access,
        redirect: pending_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_member_auto_selects_none() {
        assert_eq!(select_member(&[], "/", None), Selection::Auto(None));
    }

    #[test]
    fn single_member_auto_selects_without_prompting() {
        assert_eq!(select_member(&[4], "/", None), Selection::Auto(Some(4)));
    }

    #[test]
    fn multiple_members_prompt_until_chosen() {
        assert_eq!(select_member(&[4, 9], "/", None), Selection::Prompt);
        assert_eq!(select_member(&[4, 9], "/", Some(9)), Selection::Chosen(9));
    }

    #[test]
    fn choice_outside_the_member_set_reprompts() {
        assert_eq!(select_member(&[4, 9], "/", Some(12)), Selection::Prompt);
    }

    #[test]
    fn switch_email_flow_never_prompts() {
        assert_eq!(
            select_member(&[4], "/members/switch_email", None),
            Selection::Auto(Some(4))
        );
    }

    #[test]
    fn switch_email_with_multiple_members_binds_none() {
        assert_eq!(
            select_member(&[4, 9], "/members/switch_email", None),
            Selection::Auto(None)
        );
    }
}
