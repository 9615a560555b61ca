//! Payment-provider integrations.
//!
//! Reconciliation dispatches by the member's stored `pay_source` through an
//! explicit registry; a source with no registered gateway is a named error,
//! which fails the maintenance run.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::domains::member::Member;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("unknown payment provider: {0}")]
    UnknownProvider(String),
}

/// Per-provider predicate over a member's stored subscription.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Whether the member's subscription is no longer operational.
    async fn is_subscription_cancelled(&self, member: &Member) -> Result<bool>;
}

/// Lookup table from provider-source identifier to gateway. Must hold an
/// entry for every distinct `pay_source` value present in the data.
#[derive(Default)]
pub struct GatewayRegistry {
    gateways: HashMap<String, Arc<dyn PaymentGateway>>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, source: &str, gateway: Arc<dyn PaymentGateway>) {
        self.gateways.insert(source.to_string(), gateway);
    }

    pub fn get(&self, source: &str) -> Result<Arc<dyn PaymentGateway>, PaymentError> {
        self.gateways
            .get(source)
            .cloned()
            .ok_or_else(|| PaymentError::UnknownProvider(source.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct StripeSubscription {
    status: String,
}

/// Stripe integration: `pay_subs` holds the subscription id.
pub struct StripeGateway {
    secret_key: String,
    client: Client,
}

impl StripeGateway {
    pub fn new(secret_key: String) -> Self {
        Self {
            secret_key,
            client: Client::new(),
        }
    }

    fn status_is_cancelled(status: &str) -> bool {
        !matches!(status, "active" | "trialing" | "past_due")
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn is_subscription_cancelled(&self, member: &Member) -> Result<bool> {
        let subscription_id = member
            .pay_subs
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("member {} has no subscription id", member.id))?;

        let url = format!("https://api.stripe.com/v1/subscriptions/{subscription_id}");
        let response = self
            .client
            .get(url)
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await?;

        // Stripe returns 404 for deleted subscriptions.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(true);
        }
        let subscription = response
            .error_for_status()?
            .json::<StripeSubscription>()
            .await?;
        Ok(Self::status_is_cancelled(&subscription.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysCancelled;

    #[async_trait]
    impl PaymentGateway for AlwaysCancelled {
        async fn is_subscription_cancelled(&self, _member: &Member) -> Result<bool> {
            Ok(true)
        }
    }

    #[test]
    fn registry_returns_named_error_for_unknown_source() {
        let registry = GatewayRegistry::new();
        let err = registry.get("paypal").err().unwrap();
        assert_eq!(err.to_string(), "unknown payment provider: paypal");
    }

    #[test]
    fn registry_dispatches_by_source() {
        let mut registry = GatewayRegistry::new();
        registry.register("stripe", Arc::new(AlwaysCancelled));
        assert!(registry.get("stripe").is_ok());
    }

    #[test]
    fn stripe_operational_statuses_are_not_cancelled() {
        for status in ["active", "trialing", "past_due"] {
            assert!(!StripeGateway::status_is_cancelled(status));
        }
        for status in ["canceled", "unpaid", "incomplete_expired"] {
            assert!(StripeGateway::status_is_cancelled(status));
        }
    }
}
