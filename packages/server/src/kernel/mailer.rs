//! Outbound email behind a trait for testability.

use anyhow::Result;
use async_trait::async_trait;
use mailgun::{MailgunService, OutboundMessage};
use std::sync::Arc;
use tracing::info;

/// `body` is pre-rendered markup from the letterhead wrapper.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        to: &str,
        reply_to: Option<&str>,
        sender: &str,
        subject: &str,
        body: &str,
    ) -> Result<()>;
}

/// Wrapper around MailgunService that implements the Mailer trait
pub struct MailgunMailer(pub Arc<MailgunService>);

impl MailgunMailer {
    pub fn new(service: Arc<MailgunService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl Mailer for MailgunMailer {
    async fn send(
        &self,
        to: &str,
        reply_to: Option<&str>,
        sender: &str,
        subject: &str,
        body: &str,
    ) -> Result<()> {
        let message = OutboundMessage {
            to: to.to_string(),
            reply_to: reply_to.map(str::to_string),
            sender: sender.to_string(),
            subject: subject.to_string(),
            html: body.to_string(),
        };
        self.0
            .send_message(&message)
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("{}", e))
    }
}

/// Non-production mailer: logs the message instead of delivering it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(
        &self,
        to: &str,
        _reply_to: Option<&str>,
        _sender: &str,
        subject: &str,
        _body: &str,
    ) -> Result<()> {
        info!("mail suppressed outside production: to={} subject={}", to, subject);
        Ok(())
    }
}
