//! Drive a scripted cart session through the real abandonment scheduler.
//!
//! # Usage
//!
//! ```bash
//! # Send through the configured /api endpoints, 60x faster than real time
//! aurora replay session.json --speedup 60
//!
//! # Only log what would be sent
//! aurora replay session.json --speedup 60 --dry-run
//! ```
//!
//! # Script format
//!
//! A JSON array of events, applied in order:
//!
//! ```json
//! [
//!   {"event": "sign_in", "id": 42, "email": "ana@aurora.com.br", "name": "Ana", "phone": "11987654321"},
//!   {"event": "add", "product_id": 1, "name": "Vestido Linho", "unit_price": "299.90", "size": "M"},
//!   {"event": "wait", "secs": 600},
//!   {"event": "set_quantity", "product_id": 1, "size": "M", "quantity": 2},
//!   {"event": "wait", "secs": 1900}
//! ]
//! ```
//!
//! `wait` durations and the abandonment delays are both divided by the
//! speedup factor, so the relative timing is preserved.

use std::path::Path;
use std::time::Duration;

use aurora_storefront::cart::{LineKey, Mutation, NewLine};
use aurora_storefront::config::StorefrontConfig;
use aurora_storefront::error::{AppError, Result};
use aurora_storefront::models::Customer;
use aurora_storefront::notify::{Notifier, TracingNotifier};
use aurora_storefront::services::abandonment::Tier;
use aurora_storefront::session::CartSession;
use aurora_storefront::state::AppState;
use serde::Deserialize;
use tracing::{info, instrument};

/// One step of a replay script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplayEvent {
    SignIn(Customer),
    SignOut,
    Add(NewLine),
    Remove(LineKey),
    SetQuantity {
        #[serde(flatten)]
        key: LineKey,
        quantity: i64,
    },
    Clear,
    /// Let time pass without touching the cart.
    Wait { secs: u64 },
}

/// Parse a replay script.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the script is not a valid event list.
pub fn parse_script(json: &str) -> Result<Vec<ReplayEvent>> {
    serde_json::from_str(json)
        .map_err(|e| AppError::BadRequest(format!("Invalid replay script: {e}")))
}

/// Load `path` and replay it.
///
/// # Errors
///
/// Returns an error if the script cannot be read or parsed, or the HTTP
/// notifier cannot be built.
#[instrument(skip(config))]
pub async fn run(
    path: &Path,
    speedup: u32,
    dry_run: bool,
    mut config: StorefrontConfig,
) -> Result<()> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::BadRequest(format!("Cannot read {}: {e}", path.display())))?;
    let events = parse_script(&json)?;
    info!(events = events.len(), "Replay script loaded");

    let speedup = speedup.max(1);
    config.abandonment = config.abandonment.accelerated(speedup);

    if dry_run {
        let state = AppState::new(config, TracingNotifier);
        replay(&state, &events, speedup).await;
    } else {
        let state = AppState::from_config(config)?;
        replay(&state, &events, speedup).await;
    }
    Ok(())
}

/// Apply `events` to a fresh session, sleeping through `wait` steps.
pub async fn replay<N: Notifier>(state: &AppState<N>, events: &[ReplayEvent], speedup: u32) {
    let mut session = state.new_session();

    for (step, event) in events.iter().enumerate() {
        if let ReplayEvent::Wait { secs } = event {
            tokio::time::sleep(Duration::from_secs(*secs) / speedup.max(1)).await;
        } else if let Some(outcome) = apply(&mut session, event) {
            info!(step, ?event, ?outcome, "Applied");
        }
        log_state(&session, step);
    }

    session.dispose();
    info!("Replay finished");
}

/// Apply a cart or customer event. Returns the mutation outcome for cart
/// events.
fn apply<N: Notifier>(session: &mut CartSession<N>, event: &ReplayEvent) -> Option<Mutation> {
    match event {
        ReplayEvent::SignIn(customer) => {
            session.sign_in(customer.clone());
            None
        }
        ReplayEvent::SignOut => {
            session.sign_out();
            None
        }
        ReplayEvent::Add(line) => Some(session.add(line.clone())),
        ReplayEvent::Remove(key) => Some(session.remove(key)),
        ReplayEvent::SetQuantity { key, quantity } => Some(session.set_quantity(key, *quantity)),
        ReplayEvent::Clear => Some(session.clear()),
        ReplayEvent::Wait { .. } => None,
    }
}

fn log_state<N: Notifier>(session: &CartSession<N>, step: usize) {
    let progress = session.shipping_progress();
    info!(
        step,
        items = session.items().len(),
        total = %session.total(),
        free_shipping_remaining = %progress.remaining,
        email = ?session.tier_state(Tier::Email),
        whatsapp = ?session.tier_state(Tier::WhatsApp),
        "Session state"
    );
}
