//! Server dependencies (using traits for testability)
//!
//! Central dependency container handed to actions, routes and the
//! maintenance job. External services sit behind trait objects so tests can
//! substitute them.

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::kernel::{GatewayRegistry, Letterhead, LogMailer, Mailer, MailgunMailer, StripeGateway};
use mailgun::{MailgunOptions, MailgunService};

/// Runtime settings carried out of [`Config`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub org_name: String,
    pub org_short_name: String,
    pub org_domain: String,
    pub support_email: String,
    pub is_production: bool,
    pub backup_dir: String,
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            org_name: config.org_name.clone(),
            org_short_name: config.org_short_name.clone(),
            org_domain: config.org_domain.clone(),
            support_email: config.support_email.clone(),
            is_production: config.is_production,
            backup_dir: config.backup_dir.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub mailer: Arc<dyn Mailer>,
    pub payments: Arc<GatewayRegistry>,
    pub letterhead: Letterhead,
    pub settings: Settings,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        mailer: Arc<dyn Mailer>,
        payments: Arc<GatewayRegistry>,
        letterhead: Letterhead,
        settings: Settings,
    ) -> Self {
        Self {
            db_pool,
            mailer,
            payments,
            letterhead,
            settings,
        }
    }

    /// Wire the production dependency set from configuration. Outside
    /// production the mailer only logs.
    pub fn from_config(db_pool: PgPool, config: &Config) -> Self {
        let mailer: Arc<dyn Mailer> = if config.is_production {
            Arc::new(MailgunMailer::new(Arc::new(MailgunService::new(
                MailgunOptions {
                    api_key: config.mailgun_api_key.clone(),
                    domain: config.mailgun_domain.clone(),
                },
            ))))
        } else {
            Arc::new(LogMailer)
        };

        let mut payments = GatewayRegistry::new();
        payments.register(
            "stripe",
            Arc::new(StripeGateway::new(config.stripe_secret_key.clone())),
        );

        Self::new(
            db_pool,
            mailer,
            Arc::new(payments),
            Letterhead::new(&config.org_name),
            Settings::from(config),
        )
    }
}
