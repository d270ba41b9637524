//! Notification dispatch for abandoned carts.
//!
//! This module provides:
//! - [`Notifier`], the boundary the abandonment scheduler calls into
//! - [`HttpNotifier`] for the storefront's `/api/email` and `/api/whatsapp`
//! - [`TracingNotifier`], a dry-run notifier that only logs
//! - payload types and message rendering
//!
//! Dispatch is best effort: callers log failures and move on.

mod client;
mod error;
mod messages;
mod types;

use std::future::Future;

use tracing::info;

pub use client::HttpNotifier;
pub use error::NotifyError;
pub use messages::abandoned_cart_whatsapp;
pub use types::{AbandonedCartData, CART_ABANDONED_TRIGGER, EmailTrigger, WhatsAppMessage};

/// Outbound notification channels.
pub trait Notifier: Send + Sync + 'static {
    /// Fire an email automation trigger.
    fn trigger_email(
        &self,
        trigger: &EmailTrigger,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;

    /// Send a WhatsApp text message.
    fn send_whatsapp(
        &self,
        message: &WhatsAppMessage,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Notifier that logs what it would send.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    async fn trigger_email(&self, trigger: &EmailTrigger) -> Result<(), NotifyError> {
        info!(
            trigger = %trigger.trigger,
            user_id = %trigger.data.user_id,
            email = %trigger.data.email,
            items = trigger.data.cart_items.len(),
            total = %trigger.data.total,
            "[dry-run] email trigger"
        );
        Ok(())
    }

    async fn send_whatsapp(&self, message: &WhatsAppMessage) -> Result<(), NotifyError> {
        info!(to = %message.to, message = %message.message, "[dry-run] WhatsApp message");
        Ok(())
    }
}
