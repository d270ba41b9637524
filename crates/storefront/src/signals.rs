//! Derived signals: pure functions over cart snapshots.
//!
//! Nothing here is stored. Views call these on every render so the values
//! can never disagree with the cart.

use aurora_core::{CurrencyCode, Price};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::cart::CartSnapshot;
use crate::models::Customer;

/// Free-shipping threshold used when none is configured (R$ 199,00).
pub const DEFAULT_FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(19_900, 0, 0, false, 2);

/// Progress towards free shipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShippingProgress {
    /// Amount still missing, never negative.
    pub remaining: Decimal,
    /// Percentage of the threshold reached, capped at 100.
    pub progress_pct: Decimal,
}

impl ShippingProgress {
    /// Whether the cart already ships for free.
    #[must_use]
    pub fn qualifies(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Percentage rounded for a progress bar width.
    #[must_use]
    pub fn progress_pct_rounded(&self) -> Decimal {
        self.progress_pct.round_dp(2)
    }

    /// Banner text shown above the cart.
    #[must_use]
    pub fn message(&self, currency: CurrencyCode) -> String {
        if self.qualifies() {
            "Você ganhou frete grátis!".to_string()
        } else {
            format!(
                "Faltam {} para o frete grátis",
                Price::new(self.remaining, currency)
            )
        }
    }
}

/// Compute free-shipping progress for a cart total.
///
/// `remaining = max(0, threshold - total)` and
/// `progress_pct = min(100, 100 * total / threshold)`. A threshold of zero or
/// less means every order ships free.
#[must_use]
pub fn free_shipping_progress(total: Decimal, threshold: Decimal) -> ShippingProgress {
    if threshold <= Decimal::ZERO {
        return ShippingProgress {
            remaining: Decimal::ZERO,
            progress_pct: Decimal::ONE_HUNDRED,
        };
    }

    let total = total.max(Decimal::ZERO);
    let remaining = (threshold - total).max(Decimal::ZERO);
    let progress_pct = if total >= threshold {
        Decimal::ONE_HUNDRED
    } else {
        // 100 * total overflows for thresholds near Decimal::MAX; divide first then.
        Decimal::ONE_HUNDRED
            .checked_mul(total)
            .and_then(|scaled| scaled.checked_div(threshold))
            .or_else(|| {
                total
                    .checked_div(threshold)
                    .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            })
            .map_or(Decimal::ZERO, |pct| pct.min(Decimal::ONE_HUNDRED))
    };

    ShippingProgress {
        remaining,
        progress_pct,
    }
}

/// Whether an abandonment countdown should be running for this cart.
///
/// True when the cart has at least one line and a customer is signed in.
#[must_use]
pub fn abandonment_eligible(snapshot: &CartSnapshot, customer: Option<&Customer>) -> bool {
    customer.is_some() && !snapshot.is_empty()
}
