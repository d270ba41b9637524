//! Abandoned-cart scheduling.
//!
//! Two independent tiers watch the same session: an email trigger after
//! 15 minutes of inactivity and a WhatsApp reminder after 30. Both are armed
//! while the cart is non-empty and a customer is signed in, and both restart
//! their countdown on every cart change.

mod scheduler;
mod timer;

pub use scheduler::{AbandonmentScheduler, SchedulerConfig, Tier, TierState};
pub use timer::TimerGuard;
