//! Cart store and line types.
//!
//! [`CartStore`] is the only writable owner of cart contents. Everything
//! else (signals, the abandonment scheduler, views) works from
//! [`CartSnapshot`]s handed out after each applied mutation.

mod item;
mod store;

pub use item::{CartItem, LineKey, NewLine, Variant};
pub use store::{CartSnapshot, CartStore, IgnoreReason, Mutation, Subscriber, SubscriptionId};
