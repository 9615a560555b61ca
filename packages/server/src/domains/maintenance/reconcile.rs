//! Subscription reconciliation against the payment providers.

use anyhow::{Context, Result};
use chrono::Local;
use sqlx::PgConnection;
use tracing::{info, warn};

use crate::domains::member::{EmailRecord, Member};
use crate::kernel::{member_greeting, ServerDeps};

/// Check every live subscription with its provider and cancel the ones no
/// longer operational: notice email (production-gated), log line, member
/// row updated on the run's transaction.
pub async fn reconcile_subscriptions(deps: &ServerDeps, conn: &mut PgConnection) -> Result<()> {
    let members = Member::active_subscriptions(&deps.db_pool).await?;
    let now = Local::now().naive_local();

    for member in members {
        let source = member
            .pay_source
            .as_deref()
            .with_context(|| format!("member {} has a subscription but no payment source", member.id))?;
        let gateway = deps.payments.get(source)?;
        if !gateway.is_subscription_cancelled(&member).await? {
            continue;
        }

        let email = EmailRecord::primary_email(member.id, &deps.db_pool).await?;
        if deps.settings.is_production {
            match &email {
                Some(email) => {
                    let support = &deps.settings.support_email;
                    let body = deps.letterhead.render(
                        "Membership Renewal Failure",
                        &[
                            member_greeting(&member),
                            format!(
                                "We have been unable to process your auto-renewal and as a \
                                 result your membership has been cancelled. We hope you will \
                                 <a href=\"{}\">reinstate your membership</a>, but in any case \
                                 we are grateful for your past support!",
                                deps.settings.org_domain
                            ),
                            format!("If you have any questions, please contact {support}"),
                        ],
                    );
                    deps.mailer
                        .send(email, Some(support), support, "Membership Renewal Failure", &body)
                        .await?;
                }
                None => warn!("no email on file for cancelled member {}", member.id),
            }
        }
        info!(
            "Membership Subscription Cancelled {}",
            email.as_deref().unwrap_or("(no email)")
        );

        Member::cancel_subscription(member.id, now, conn).await?;
    }
    Ok(())
}
