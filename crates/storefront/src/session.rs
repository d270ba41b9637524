//! A shopper's cart session.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::cart::{CartItem, CartSnapshot, CartStore, LineKey, Mutation, NewLine};
use crate::config::StorefrontConfig;
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::models::Customer;
use crate::notify::Notifier;
use crate::services::abandonment::{AbandonmentScheduler, SchedulerConfig, Tier, TierState};
use crate::signals::{DEFAULT_FREE_SHIPPING_THRESHOLD, ShippingProgress, free_shipping_progress};

/// Settings for a [`CartSession`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub scheduler: SchedulerConfig,
    pub free_shipping_threshold: Decimal,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            free_shipping_threshold: DEFAULT_FREE_SHIPPING_THRESHOLD,
        }
    }
}

impl From<&StorefrontConfig> for SessionConfig {
    fn from(config: &StorefrontConfig) -> Self {
        Self {
            scheduler: SchedulerConfig::from(config),
            free_shipping_threshold: config.free_shipping_threshold,
        }
    }
}

/// Owns one cart and its abandonment scheduler for the length of a visit.
///
/// Every applied cart change is forwarded to the scheduler. Disposing the
/// session, explicitly with [`dispose`](Self::dispose) or by dropping it,
/// shuts the scheduler down so nothing is sent for this cart afterwards.
pub struct CartSession<N: Notifier> {
    cart: CartStore,
    scheduler: AbandonmentScheduler<N>,
    customer: Option<Customer>,
    free_shipping_threshold: Decimal,
}

impl<N: Notifier> std::fmt::Debug for CartSession<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSession")
            .field("cart", &self.cart)
            .field("customer", &self.customer.as_ref().map(|c| c.id))
            .field("free_shipping_threshold", &self.free_shipping_threshold)
            .finish_non_exhaustive()
    }
}

impl<N: Notifier> CartSession<N> {
    /// Start an anonymous session with an empty cart.
    #[must_use]
    pub fn new(notifier: Arc<N>, config: SessionConfig) -> Self {
        let scheduler = AbandonmentScheduler::new(notifier, config.scheduler);
        let mut cart = CartStore::new();

        let observer = scheduler.clone();
        cart.subscribe(move |snapshot| observer.observe(snapshot));

        debug!("Cart session started");
        Self {
            cart,
            scheduler,
            customer: None,
            free_shipping_threshold: config.free_shipping_threshold,
        }
    }

    pub fn add(&mut self, line: NewLine) -> Mutation {
        self.cart.add(line)
    }

    pub fn remove(&mut self, key: &LineKey) -> Mutation {
        self.cart.remove(key)
    }

    /// Set a line's quantity; zero or less removes it.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: i64) -> Mutation {
        self.cart.set_quantity(key, quantity)
    }

    pub fn clear(&mut self) -> Mutation {
        self.cart.clear()
    }

    /// Attach a signed-in customer. Replacing one customer with another
    /// restarts any pending countdown; signing in again with an identical
    /// profile leaves it running.
    pub fn sign_in(&mut self, customer: Customer) {
        set_sentry_user(&customer.id, Some(customer.email.as_str()));
        add_breadcrumb("auth", "Customer signed in", None);
        info!(customer_id = %customer.id, "Customer signed in");

        self.customer = Some(customer.clone());
        self.scheduler.set_customer(Some(customer));
    }

    pub fn sign_out(&mut self) {
        let Some(customer) = self.customer.take() else {
            return;
        };
        info!(customer_id = %customer.id, "Customer signed out");
        add_breadcrumb("auth", "Customer signed out", None);
        clear_sentry_user();
        self.scheduler.set_customer(None);
    }

    #[must_use]
    pub const fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.cart.snapshot()
    }

    /// Free-shipping progress for the current total.
    #[must_use]
    pub fn shipping_progress(&self) -> ShippingProgress {
        free_shipping_progress(self.cart.total(), self.free_shipping_threshold)
    }

    #[must_use]
    pub fn tier_state(&self, tier: Tier) -> TierState {
        self.scheduler.state(tier)
    }

    /// End the session. No abandonment notification is sent afterwards.
    pub fn dispose(self) {
        drop(self);
    }
}

impl<N: Notifier> Drop for CartSession<N> {
    fn drop(&mut self) {
        self.scheduler.shutdown();
        debug!(items = self.cart.items().len(), "Cart session disposed");
    }
}
