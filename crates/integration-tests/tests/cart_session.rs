//! Integration tests for cart session lifecycle and abandonment tiers.
//!
//! Every test runs on a paused Tokio clock, so "minutes" pass instantly and
//! deterministically.

use std::sync::Arc;
use std::time::Duration;

use aurora_core::ProductId;
use aurora_integration_tests::{
    RecordingNotifier, blusa, customer_with_phone, customer_without_phone, vestido,
};
use aurora_storefront::cart::IgnoreReason;
use aurora_storefront::cart::{Mutation, NewLine};
use aurora_storefront::notify::CART_ABANDONED_TRIGGER;
use aurora_storefront::services::abandonment::{Tier, TierState};
use aurora_storefront::session::{CartSession, SessionConfig};
use rust_decimal::Decimal;

fn session() -> (CartSession<RecordingNotifier>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let session = CartSession::new(Arc::clone(&notifier), SessionConfig::default());
    (session, notifier)
}

async fn minutes(n: u64) {
    tokio::time::sleep(Duration::from_secs(n * 60)).await;
}

// =============================================================================
// Email Tier Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_email_fires_after_fifteen_idle_minutes() {
    let (mut session, notifier) = session();
    session.sign_in(customer_without_phone());
    session.add(vestido());
    session.add(blusa().quantity(2));

    minutes(14).await;
    assert!(notifier.emails().is_empty(), "Should not fire before 15 min");

    minutes(2).await;
    let emails = notifier.emails();
    assert_eq!(emails.len(), 1);

    let trigger = emails.first().expect("one email");
    assert_eq!(trigger.trigger, CART_ABANDONED_TRIGGER);
    assert_eq!(trigger.data.user_id, customer_without_phone().id);
    assert_eq!(trigger.data.cart_items.len(), 2);
    assert_eq!(trigger.data.total, Decimal::new(59990, 2));
    assert_eq!(session.tier_state(Tier::Email), TierState::Fired);
}

#[tokio::test(start_paused = true)]
async fn test_mutation_at_minute_ten_restarts_countdown() {
    let (mut session, notifier) = session();
    session.sign_in(customer_without_phone());
    session.add(vestido());

    minutes(10).await;
    session.add(blusa());

    // Minute 24
    minutes(14).await;
    assert!(notifier.emails().is_empty(), "Countdown should restart at minute 10");

    // Minute 26
    minutes(2).await;
    assert_eq!(notifier.emails().len(), 1);

    let trigger = notifier.emails().remove(0);
    assert_eq!(trigger.data.cart_items.len(), 2, "Payload reflects latest cart");
}

#[tokio::test(start_paused = true)]
async fn test_emptying_cart_before_fire_sends_nothing() {
    let (mut session, notifier) = session();
    session.sign_in(customer_with_phone());
    session.add(vestido());

    minutes(10).await;
    assert!(session.remove(&vestido().key()).is_applied());
    assert_eq!(session.tier_state(Tier::Email), TierState::Idle);
    assert_eq!(session.tier_state(Tier::WhatsApp), TierState::Idle);

    minutes(120).await;
    assert_eq!(notifier.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_set_quantity_zero_empties_and_disarms() {
    let (mut session, notifier) = session();
    session.sign_in(customer_without_phone());
    session.add(vestido());

    assert_eq!(session.set_quantity(&vestido().key(), 0), Mutation::Applied);
    assert!(session.items().is_empty());

    minutes(30).await;
    assert_eq!(notifier.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_ignored_mutation_does_not_restart_countdown() {
    let (mut session, notifier) = session();
    session.sign_in(customer_without_phone());
    session.add(vestido());

    minutes(10).await;
    assert_eq!(
        session.add(blusa().quantity(0)),
        Mutation::Ignored(IgnoreReason::NonPositiveQuantity)
    );

    minutes(6).await;
    assert_eq!(notifier.emails().len(), 1);
}

// =============================================================================
// WhatsApp Tier Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_whatsapp_fires_after_thirty_minutes() {
    let (mut session, notifier) = session();
    session.sign_in(customer_with_phone());
    session.add(vestido());

    minutes(29).await;
    assert_eq!(notifier.emails().len(), 1);
    assert!(notifier.whatsapps().is_empty());

    minutes(2).await;
    let whatsapps = notifier.whatsapps();
    assert_eq!(whatsapps.len(), 1);

    let message = whatsapps.first().expect("one message");
    assert_eq!(message.to.as_e164(), "+5511987654321");
    assert!(message.message.contains("Ana"));
    assert!(message.message.contains("R$ 299,90"));
}

#[tokio::test(start_paused = true)]
async fn test_whatsapp_idle_without_phone() {
    let (mut session, notifier) = session();
    session.sign_in(customer_without_phone());
    session.add(vestido());

    assert_eq!(session.tier_state(Tier::Email), TierState::Armed);
    assert_eq!(session.tier_state(Tier::WhatsApp), TierState::Idle);

    minutes(60).await;
    assert!(notifier.whatsapps().is_empty());
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_anonymous_cart_never_notifies() {
    let (mut session, notifier) = session();
    session.add(vestido());

    assert_eq!(session.tier_state(Tier::Email), TierState::Idle);
    minutes(120).await;
    assert_eq!(notifier.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_sign_in_after_adding_arms() {
    let (mut session, notifier) = session();
    session.add(vestido());

    minutes(20).await;
    session.sign_in(customer_without_phone());

    minutes(14).await;
    assert!(notifier.emails().is_empty(), "Countdown starts at sign-in");
    minutes(2).await;
    assert_eq!(notifier.emails().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_switching_customer_restarts_countdown() {
    let (mut session, notifier) = session();
    session.sign_in(customer_without_phone());
    session.add(vestido());

    minutes(10).await;
    session.sign_in(customer_with_phone());

    minutes(14).await;
    assert!(notifier.emails().is_empty());

    minutes(2).await;
    let emails = notifier.emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(
        emails.first().expect("one email").data.user_id,
        customer_with_phone().id
    );
}

#[tokio::test(start_paused = true)]
async fn test_repeated_sign_in_keeps_countdown() {
    let (mut session, notifier) = session();
    session.sign_in(customer_without_phone());
    session.add(vestido());

    minutes(10).await;
    session.sign_in(customer_without_phone());
    assert_eq!(session.tier_state(Tier::Email), TierState::Armed);

    minutes(6).await;
    assert_eq!(notifier.emails().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_overflowing_add_is_ignored_and_keeps_countdown() {
    let (mut session, notifier) = session();
    session.sign_in(customer_without_phone());
    session.add(vestido());

    minutes(10).await;
    let joia = NewLine::new(
        ProductId::new(9),
        "Colar Alta Joalheria",
        "70000000000000000000".parse().expect("valid decimal"),
    );
    assert_eq!(
        session.add(joia.quantity(i64::from(u32::MAX))),
        Mutation::Ignored(IgnoreReason::TotalOverflow)
    );
    assert_eq!(session.total(), Decimal::new(29990, 2));

    minutes(6).await;
    assert_eq!(notifier.emails().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fired_tier_never_rearms() {
    let (mut session, notifier) = session();
    session.sign_in(customer_without_phone());
    session.add(vestido());

    minutes(16).await;
    assert_eq!(notifier.emails().len(), 1);

    session.add(blusa());
    session.set_quantity(&vestido().key(), 3);
    assert_eq!(session.tier_state(Tier::Email), TierState::Fired);

    minutes(120).await;
    assert_eq!(notifier.emails().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dispose_before_fire_sends_nothing() {
    let (mut session, notifier) = session();
    session.sign_in(customer_with_phone());
    session.add(vestido());

    minutes(14).await;
    session.dispose();

    minutes(120).await;
    assert_eq!(notifier.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_drop_between_tiers_stops_whatsapp() {
    let notifier = Arc::new(RecordingNotifier::default());
    {
        let mut session = CartSession::new(Arc::clone(&notifier), SessionConfig::default());
        session.sign_in(customer_with_phone());
        session.add(vestido());
        minutes(20).await;
    }

    minutes(120).await;
    assert_eq!(notifier.emails().len(), 1);
    assert!(notifier.whatsapps().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_sessions_are_independent() {
    let notifier = Arc::new(RecordingNotifier::default());
    let mut first = CartSession::new(Arc::clone(&notifier), SessionConfig::default());
    let mut second = CartSession::new(Arc::clone(&notifier), SessionConfig::default());

    first.sign_in(customer_without_phone());
    first.add(vestido());
    second.sign_in(customer_with_phone());
    second.add(blusa());

    minutes(5).await;
    second.dispose();

    minutes(20).await;
    let emails = notifier.emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(
        emails.first().expect("one email").data.user_id,
        customer_without_phone().id
    );
}
