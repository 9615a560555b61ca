use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Full organization name, used in email bodies.
    pub org_name: String,
    /// Short name, used as the backup filename prefix.
    pub org_short_name: String,
    /// Public base URL of this server (no trailing slash).
    pub org_domain: String,
    pub support_email: String,
    /// Gates actual delivery of maintenance emails.
    pub is_production: bool,
    pub mailgun_api_key: String,
    pub mailgun_domain: String,
    pub stripe_secret_key: String,
    /// Directory holding daily backup CSVs.
    pub backup_dir: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            org_name: env::var("ORG_NAME").context("ORG_NAME must be set")?,
            org_short_name: env::var("ORG_SHORT_NAME").context("ORG_SHORT_NAME must be set")?,
            org_domain: env::var("ORG_DOMAIN").context("ORG_DOMAIN must be set")?,
            support_email: env::var("SUPPORT_EMAIL").context("SUPPORT_EMAIL must be set")?,
            is_production: env::var("IS_PRODUCTION")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            mailgun_api_key: env::var("MAILGUN_API_KEY").context("MAILGUN_API_KEY must be set")?,
            mailgun_domain: env::var("MAILGUN_DOMAIN").context("MAILGUN_DOMAIN must be set")?,
            stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                .context("STRIPE_SECRET_KEY must be set")?,
            backup_dir: env::var("BACKUP_DIR").unwrap_or_else(|_| ".".to_string()),
        })
    }
}
