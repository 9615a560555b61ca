//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod letterhead;
pub mod mailer;
pub mod payments;
pub mod scheduled_tasks;

pub use deps::{ServerDeps, Settings};
pub use letterhead::{member_greeting, Letterhead};
pub use mailer::{LogMailer, Mailer, MailgunMailer};
pub use payments::{GatewayRegistry, PaymentError, PaymentGateway, StripeGateway};
