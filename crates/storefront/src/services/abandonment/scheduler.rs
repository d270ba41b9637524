//! Two-tier abandoned-cart scheduler.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use aurora_core::CurrencyCode;
use chrono::Utc;
use serde::Serialize;
use tokio::runtime::Handle;
use tracing::{debug, error, info, instrument, warn};

use super::timer::TimerGuard;
use crate::cart::CartSnapshot;
use crate::config::{AbandonmentConfig, StorefrontConfig};
use crate::models::Customer;
use crate::notify::{EmailTrigger, Notifier, WhatsAppMessage, abandoned_cart_whatsapp};
use crate::signals::abandonment_eligible;

/// Abandonment notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Email automation trigger, 15 minutes by default.
    Email,
    /// WhatsApp reminder, 30 minutes by default.
    WhatsApp,
}

impl Tier {
    pub const ALL: [Self; 2] = [Self::Email, Self::WhatsApp];

    #[must_use]
    pub const fn delay(self, config: &AbandonmentConfig) -> Duration {
        match self {
            Self::Email => config.email_delay,
            Self::WhatsApp => config.whatsapp_delay,
        }
    }

    /// Whether this channel can reach the customer at all.
    #[must_use]
    pub const fn reaches(self, customer: &Customer) -> bool {
        match self {
            Self::Email => true,
            Self::WhatsApp => customer.phone.is_some(),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::WhatsApp => "whatsapp",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of one tier within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierState {
    #[default]
    Idle,
    Armed,
    /// Terminal for the session.
    Fired,
}

/// Settings the scheduler needs beyond its notifier.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub delays: AbandonmentConfig,
    pub currency: CurrencyCode,
    pub checkout_url: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            delays: AbandonmentConfig::default(),
            currency: CurrencyCode::default(),
            checkout_url: "/checkout".to_string(),
        }
    }
}

impl From<&StorefrontConfig> for SchedulerConfig {
    fn from(config: &StorefrontConfig) -> Self {
        Self {
            delays: config.abandonment,
            currency: config.currency,
            checkout_url: config.checkout_url.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct TierSlot {
    state: TierState,
    /// Bumped on every arm; a waking timer with an older value is stale.
    generation: u64,
    timer: Option<TimerGuard>,
}

#[derive(Debug, Default)]
struct Shared {
    customer: Option<Customer>,
    snapshot: CartSnapshot,
    email: TierSlot,
    whatsapp: TierSlot,
    shut_down: bool,
}

impl Shared {
    fn slot_mut(&mut self, tier: Tier) -> &mut TierSlot {
        match tier {
            Tier::Email => &mut self.email,
            Tier::WhatsApp => &mut self.whatsapp,
        }
    }

    const fn slot(&self, tier: Tier) -> &TierSlot {
        match tier {
            Tier::Email => &self.email,
            Tier::WhatsApp => &self.whatsapp,
        }
    }

    fn tier_eligible(&self, tier: Tier) -> bool {
        abandonment_eligible(&self.snapshot, self.customer.as_ref())
            && self.customer.as_ref().is_some_and(|c| tier.reaches(c))
    }
}

struct Inner<N> {
    notifier: Arc<N>,
    config: SchedulerConfig,
    shared: Mutex<Shared>,
}

/// Arms, cancels and fires the email and WhatsApp abandonment tiers.
///
/// Feed it every applied cart change through [`observe`](Self::observe) and
/// every sign-in/out through [`set_customer`](Self::set_customer). Each call
/// cancels pending timers and rearms them from zero when the cart is
/// non-empty and a customer is attached. A tier that fired stays fired.
///
/// Timers run on the current Tokio runtime. [`shutdown`](Self::shutdown)
/// releases them; after it returns no notification is dispatched. Timers only
/// hold a weak reference, so dropping the last handle cancels them as well.
pub struct AbandonmentScheduler<N> {
    inner: Arc<Inner<N>>,
}

impl<N> Clone for AbandonmentScheduler<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<N> std::fmt::Debug for AbandonmentScheduler<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbandonmentScheduler")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl<N: Notifier> AbandonmentScheduler<N> {
    /// Create an idle scheduler.
    #[must_use]
    pub fn new(notifier: Arc<N>, config: SchedulerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                notifier,
                config,
                shared: Mutex::new(Shared::default()),
            }),
        }
    }

    /// React to a cart change.
    #[instrument(
        skip(self, snapshot),
        fields(item_count = snapshot.item_count, total = %snapshot.total)
    )]
    pub fn observe(&self, snapshot: &CartSnapshot) {
        let mut shared = self.inner.lock();
        if shared.shut_down {
            return;
        }
        shared.snapshot = snapshot.clone();
        self.rearm(&mut shared, "cart_changed");
    }

    /// Attach, replace or detach the signed-in customer.
    ///
    /// Setting the customer that is already attached keeps running timers.
    #[instrument(skip_all, fields(customer_id = customer.as_ref().map(|c| c.id.get())))]
    pub fn set_customer(&self, customer: Option<Customer>) {
        let mut shared = self.inner.lock();
        if shared.shut_down {
            return;
        }
        if shared.customer == customer {
            debug!("Customer unchanged, keeping abandonment timers");
            return;
        }
        shared.customer = customer;
        self.rearm(&mut shared, "customer_changed");
    }

    /// Current state of a tier.
    #[must_use]
    pub fn state(&self, tier: Tier) -> TierState {
        self.inner.lock().slot(tier).state
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.inner.lock().shut_down
    }

    /// Cancel pending timers and stop reacting to changes.
    ///
    /// Idempotent. Fired tiers keep reporting `Fired`.
    pub fn shutdown(&self) {
        let mut shared = self.inner.lock();
        if shared.shut_down {
            return;
        }
        shared.shut_down = true;
        for tier in Tier::ALL {
            let slot = shared.slot_mut(tier);
            drop(slot.timer.take());
            if slot.state == TierState::Armed {
                slot.state = TierState::Idle;
            }
        }
        debug!("Abandonment scheduler shut down");
    }

    fn rearm(&self, shared: &mut Shared, cause: &'static str) {
        for tier in Tier::ALL {
            if shared.slot(tier).state == TierState::Fired {
                continue;
            }

            let eligible = shared.tier_eligible(tier);
            let slot = shared.slot_mut(tier);
            if let Some(timer) = slot.timer.take() {
                timer.cancel();
                debug!(%tier, cause, "Abandonment timer cancelled");
            }
            slot.state = TierState::Idle;

            if eligible {
                self.arm(slot, tier);
            }
        }
    }

    fn arm(&self, slot: &mut TierSlot, tier: Tier) {
        let Ok(runtime) = Handle::try_current() else {
            warn!(%tier, "No Tokio runtime, abandonment timer not armed");
            return;
        };

        slot.generation += 1;
        let generation = slot.generation;
        let delay = tier.delay(&self.inner.config.delays);
        let inner: Weak<Inner<N>> = Arc::downgrade(&self.inner);

        slot.timer = Some(TimerGuard::spawn(&runtime, async move {
            tokio::time::sleep(delay).await;
            // Gone once every scheduler handle has been dropped.
            if let Some(inner) = inner.upgrade() {
                inner.fire(tier, generation);
            }
        }));
        slot.state = TierState::Armed;
        debug!(%tier, ?delay, generation, "Abandonment timer armed");
    }
}

impl<N> Inner<N> {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<N: Notifier> Inner<N> {
    /// Called by a timer task once its delay has elapsed.
    fn fire(&self, tier: Tier, generation: u64) {
        let dispatch = {
            let mut shared = self.lock();
            if shared.shut_down {
                return;
            }
            let eligible = shared.tier_eligible(tier);
            let slot = shared.slot_mut(tier);
            if slot.generation != generation || slot.state != TierState::Armed {
                return;
            }
            if !eligible {
                slot.state = TierState::Idle;
                return;
            }
            slot.state = TierState::Fired;

            let Some(customer) = shared.customer.as_ref() else {
                return;
            };
            Dispatch::build(tier, customer, &shared.snapshot, &self.config)
        };

        let Some(dispatch) = dispatch else {
            return;
        };
        info!(%tier, customer_id = %dispatch.customer_id(), "Abandonment tier fired");
        tokio::spawn(dispatch.send(Arc::clone(&self.notifier)));
    }
}

/// A notification ready to go out, detached from scheduler state.
enum Dispatch {
    Email(EmailTrigger),
    WhatsApp {
        customer_id: aurora_core::CustomerId,
        message: WhatsAppMessage,
    },
}

impl Dispatch {
    fn build(
        tier: Tier,
        customer: &Customer,
        snapshot: &CartSnapshot,
        config: &SchedulerConfig,
    ) -> Option<Self> {
        match tier {
            Tier::Email => Some(Self::Email(EmailTrigger::cart_abandoned(
                customer,
                snapshot,
                Utc::now(),
            ))),
            Tier::WhatsApp => customer.phone.clone().map(|to| Self::WhatsApp {
                customer_id: customer.id,
                message: WhatsAppMessage {
                    to,
                    message: abandoned_cart_whatsapp(
                        customer,
                        snapshot,
                        config.currency,
                        &config.checkout_url,
                    ),
                },
            }),
        }
    }

    fn customer_id(&self) -> aurora_core::CustomerId {
        match self {
            Self::Email(trigger) => trigger.data.user_id,
            Self::WhatsApp { customer_id, .. } => *customer_id,
        }
    }

    const fn tier(&self) -> Tier {
        match self {
            Self::Email(_) => Tier::Email,
            Self::WhatsApp { .. } => Tier::WhatsApp,
        }
    }

    /// Best effort: failures are logged and dropped.
    #[instrument(skip_all, fields(tier = %self.tier(), customer_id = %self.customer_id()))]
    async fn send<N: Notifier>(self, notifier: Arc<N>) {
        let result = match &self {
            Self::Email(trigger) => notifier.trigger_email(trigger).await,
            Self::WhatsApp { message, .. } => notifier.send_whatsapp(message).await,
        };

        match result {
            Ok(()) => info!("Abandonment notification sent"),
            Err(e) => error!(error = %e, "Abandonment notification failed"),
        }
    }
}
