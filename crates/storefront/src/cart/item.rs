//! Cart line types.

use aurora_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Selected product variant.
///
/// Both axes are optional: accessories have no size, basics come in one color.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Variant {
    /// A variant with both size and color selected.
    #[must_use]
    pub fn new(size: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            size: Some(size.into()),
            color: Some(color.into()),
        }
    }

    /// Short label for display, e.g. `"M / Preto"`.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        match (&self.size, &self.color) {
            (Some(size), Some(color)) => Some(format!("{size} / {color}")),
            (Some(one), None) | (None, Some(one)) => Some(one.clone()),
            (None, None) => None,
        }
    }
}

/// Identity of a cart line: the same product in a different size is a
/// different line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: ProductId,
    #[serde(default, flatten)]
    pub variant: Variant,
}

impl LineKey {
    #[must_use]
    pub const fn new(product_id: ProductId, variant: Variant) -> Self {
        Self {
            product_id,
            variant,
        }
    }
}

/// Input for [`CartStore::add`](super::CartStore::add).
///
/// Quantity is signed because it arrives from forms and scripts; the store
/// rejects anything that is not positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default, flatten)]
    pub variant: Variant,
}

const fn default_quantity() -> i64 {
    1
}

impl NewLine {
    /// One unit of a product.
    #[must_use]
    pub fn new(product_id: ProductId, name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            product_id,
            name: name.into(),
            unit_price,
            quantity: 1,
            variant: Variant::default(),
        }
    }

    #[must_use]
    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    #[must_use]
    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// The line this input would land on.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::new(self.product_id, self.variant.clone())
    }
}

/// A line in the cart.
///
/// Only the store constructs these, so `quantity >= 1` and
/// `unit_price >= 0` always hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    product_id: ProductId,
    name: String,
    #[serde(rename = "price")]
    unit_price: Decimal,
    quantity: u32,
    #[serde(flatten)]
    variant: Variant,
}

impl CartItem {
    pub(super) fn new(
        product_id: ProductId,
        name: String,
        unit_price: Decimal,
        quantity: u32,
        variant: Variant,
    ) -> Self {
        Self {
            product_id,
            name,
            unit_price,
            quantity,
            variant,
        }
    }

    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    #[must_use]
    pub const fn variant(&self) -> &Variant {
        &self.variant
    }

    /// Price times quantity.
    ///
    /// The store rejects lines whose total would not fit a `Decimal`, so the
    /// saturating fallback is never reached for items read from a cart.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        line_total(self.unit_price, self.quantity).unwrap_or(Decimal::MAX)
    }

    pub(super) fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.variant == key.variant
    }

    pub(super) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }
}

/// Price times quantity, or `None` when it overflows.
pub(super) fn line_total(unit_price: Decimal, quantity: u32) -> Option<Decimal> {
    unit_price.checked_mul(Decimal::from(quantity))
}
