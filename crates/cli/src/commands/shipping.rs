//! Free-shipping progress for a given cart total.
//!
//! # Usage
//!
//! ```bash
//! aurora shipping --total 150.00
//! aurora shipping --total 150.00 --threshold 249.90
//! ```

use aurora_core::CurrencyCode;
use aurora_storefront::signals::{ShippingProgress, free_shipping_progress};
use rust_decimal::Decimal;

/// Render the progress banner as the storefront shows it.
#[must_use]
pub fn report(total: Decimal, threshold: Decimal, currency: CurrencyCode) -> String {
    let progress = free_shipping_progress(total, threshold);
    format_report(&progress, currency)
}

fn format_report(progress: &ShippingProgress, currency: CurrencyCode) -> String {
    format!(
        "remaining: {}\nprogress:  {}%\n{}",
        progress.remaining,
        progress.progress_pct_rounded(),
        progress.message(currency)
    )
}

/// Print the free-shipping signal for `total`.
pub fn run(total: Decimal, threshold: Decimal, currency: CurrencyCode) {
    let output = report(total, threshold, currency);

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
}
