//! Payloads sent to the notification endpoints.

use aurora_core::{CustomerId, Email, PhoneNumber};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{CartItem, CartSnapshot};
use crate::models::Customer;

/// Trigger name the email automation keys its abandoned-cart flow on.
pub const CART_ABANDONED_TRIGGER: &str = "cart_abandoned";

/// Body of `POST /api/email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailTrigger {
    pub trigger: String,
    pub data: AbandonedCartData,
}

impl EmailTrigger {
    /// Build the abandoned-cart trigger for a customer and cart.
    #[must_use]
    pub fn cart_abandoned(customer: &Customer, snapshot: &CartSnapshot, at: DateTime<Utc>) -> Self {
        Self {
            trigger: CART_ABANDONED_TRIGGER.to_string(),
            data: AbandonedCartData {
                user_id: customer.id,
                email: customer.email.clone(),
                name: customer.name.clone(),
                phone: customer.phone.clone(),
                cart_items: snapshot.items.clone(),
                total: snapshot.total,
                timestamp: at,
            },
        }
    }
}

/// Free-form payload of the abandoned-cart email trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbandonedCartData {
    pub user_id: CustomerId,
    pub email: Email,
    pub name: String,
    pub phone: Option<PhoneNumber>,
    pub cart_items: Vec<CartItem>,
    pub total: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Body of `POST /api/whatsapp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhatsAppMessage {
    pub to: PhoneNumber,
    pub message: String,
}

/// Optional JSON body returned by the endpoints.
#[derive(Debug, Default, Deserialize)]
pub(super) struct DispatchResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}
