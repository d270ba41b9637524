//! The cart store: single writable owner of the cart's lines.

use core::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::item::{self, CartItem, LineKey, NewLine};
use crate::error::add_breadcrumb;

/// Callback invoked with a fresh snapshot after every applied mutation.
pub type Subscriber = Box<dyn Fn(&CartSnapshot) + Send + Sync>;

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Outcome of a store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// The cart changed and subscribers were notified.
    Applied,
    /// The input was invalid or changed nothing; the cart is untouched.
    Ignored(IgnoreReason),
}

impl Mutation {
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Why a mutation was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NonPositiveQuantity,
    NegativePrice,
    QuantityOverflow,
    /// The cart total would no longer fit a `Decimal`.
    TotalOverflow,
    UnknownLine,
    Unchanged,
}

/// Immutable view of the cart handed to subscribers and derived signals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub total: Decimal,
    pub item_count: u64,
}

impl CartSnapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// In-memory cart.
///
/// Lines keep insertion order. The total is always recomputed from the lines;
/// there is no stored total to drift. Mutations take `&mut self`, so they are
/// serialized by the borrow checker.
#[derive(Default)]
pub struct CartStore {
    items: Vec<CartItem>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product, or bump the quantity of the line with the same
    /// product and variant.
    pub fn add(&mut self, line: NewLine) -> Mutation {
        if line.quantity <= 0 {
            return ignored("add", IgnoreReason::NonPositiveQuantity);
        }
        if line.unit_price.is_sign_negative() && !line.unit_price.is_zero() {
            return ignored("add", IgnoreReason::NegativePrice);
        }
        let Ok(quantity) = u32::try_from(line.quantity) else {
            return ignored("add", IgnoreReason::QuantityOverflow);
        };

        let key = line.key();
        let (index, unit_price, quantity) = match self.position(&key) {
            Some(index) => {
                let Some(existing) = self.items.get(index) else {
                    return ignored("add", IgnoreReason::UnknownLine);
                };
                let Some(merged) = existing.quantity().checked_add(quantity) else {
                    return ignored("add", IgnoreReason::QuantityOverflow);
                };
                (Some(index), existing.unit_price(), merged)
            }
            None => (None, line.unit_price, quantity),
        };
        if self.total_with(index, unit_price, quantity).is_none() {
            return ignored("add", IgnoreReason::TotalOverflow);
        }

        match index.and_then(|index| self.items.get_mut(index)) {
            Some(existing) => existing.set_quantity(quantity),
            None => self.items.push(CartItem::new(
                line.product_id,
                line.name,
                line.unit_price,
                quantity,
                line.variant,
            )),
        }

        let product_id = key.product_id.to_string();
        add_breadcrumb("cart", "Added item", Some(&[("product_id", product_id.as_str())]));
        self.notify();
        Mutation::Applied
    }

    /// Delete a line.
    pub fn remove(&mut self, key: &LineKey) -> Mutation {
        let Some(index) = self.position(key) else {
            return ignored("remove", IgnoreReason::UnknownLine);
        };
        self.items.remove(index);

        let product_id = key.product_id.to_string();
        add_breadcrumb("cart", "Removed item", Some(&[("product_id", product_id.as_str())]));
        self.notify();
        Mutation::Applied
    }

    /// Set a line's quantity. Zero or less removes the line.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: i64) -> Mutation {
        let Some(index) = self.position(key) else {
            return ignored("set_quantity", IgnoreReason::UnknownLine);
        };
        if quantity <= 0 {
            return self.remove(key);
        }
        let Ok(quantity) = u32::try_from(quantity) else {
            return ignored("set_quantity", IgnoreReason::QuantityOverflow);
        };
        let Some(item) = self.items.get(index) else {
            return ignored("set_quantity", IgnoreReason::UnknownLine);
        };
        if item.quantity() == quantity {
            return ignored("set_quantity", IgnoreReason::Unchanged);
        }
        if self
            .total_with(Some(index), item.unit_price(), quantity)
            .is_none()
        {
            return ignored("set_quantity", IgnoreReason::TotalOverflow);
        }
        if let Some(item) = self.items.get_mut(index) {
            item.set_quantity(quantity);
        }

        let product_id = key.product_id.to_string();
        let quantity = quantity.to_string();
        add_breadcrumb(
            "cart",
            "Updated quantity",
            Some(&[
                ("product_id", product_id.as_str()),
                ("quantity", quantity.as_str()),
            ]),
        );
        self.notify();
        Mutation::Applied
    }

    /// Remove every line, e.g. after checkout.
    pub fn clear(&mut self) -> Mutation {
        if self.items.is_empty() {
            return ignored("clear", IgnoreReason::Unchanged);
        }
        self.items.clear();

        add_breadcrumb("cart", "Cleared cart", None);
        self.notify();
        Mutation::Applied
    }

    /// Sum of price times quantity over all lines.
    ///
    /// Mutations that would overflow are ignored, so the sum always fits.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |total, item| {
                total.checked_add(item.line_total())
            })
            .unwrap_or(Decimal::MAX)
    }

    /// Total number of units, for the cart badge.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity())).sum()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, key: &LineKey) -> Option<&CartItem> {
        self.items.iter().find(|item| item.matches(key))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            total: self.total(),
            item_count: self.item_count(),
        }
    }

    /// Register a callback for applied mutations. Callbacks run in
    /// registration order on the mutating thread.
    pub fn subscribe(
        &mut self,
        subscriber: impl Fn(&CartSnapshot) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Drop a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    fn position(&self, key: &LineKey) -> Option<usize> {
        self.items.iter().position(|item| item.matches(key))
    }

    /// The total after the line at `replace` (or a new line) becomes
    /// `unit_price` times `quantity`. `None` if any step overflows.
    fn total_with(
        &self,
        replace: Option<usize>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Option<Decimal> {
        let line = item::line_total(unit_price, quantity)?;
        // Same summation order as `total()` after the change.
        let mut total = Decimal::ZERO;
        for (index, other) in self.items.iter().enumerate() {
            let value = if Some(index) == replace {
                line
            } else {
                item::line_total(other.unit_price(), other.quantity())?
            };
            total = total.checked_add(value)?;
        }
        if replace.is_none() {
            total = total.checked_add(line)?;
        }
        Some(total)
    }

    fn notify(&self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        debug!(
            lines = snapshot.items.len(),
            item_count = snapshot.item_count,
            total = %snapshot.total,
            "Cart changed"
        );
        for (_, subscriber) in &self.subscribers {
            subscriber(&snapshot);
        }
    }
}

fn ignored(operation: &'static str, reason: IgnoreReason) -> Mutation {
    debug!(operation, ?reason, "Ignoring cart mutation");
    Mutation::Ignored(reason)
}
