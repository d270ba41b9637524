//! Pre-rendered message bodies.

use aurora_core::{CurrencyCode, Price};

use crate::cart::CartSnapshot;
use crate::models::Customer;

/// Render the WhatsApp reminder for an abandoned cart.
#[must_use]
pub fn abandoned_cart_whatsapp(
    customer: &Customer,
    snapshot: &CartSnapshot,
    currency: CurrencyCode,
    checkout_url: &str,
) -> String {
    let items = match snapshot.item_count {
        1 => "1 item".to_string(),
        n => format!("{n} itens"),
    };
    format!(
        "Oi, {}! Você deixou {items} no seu carrinho da Aurora (total {}). \
         Eles ainda estão te esperando: {checkout_url}",
        customer.first_name(),
        Price::new(snapshot.total, currency),
    )
}
