//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `abandonment` - Email and WhatsApp reminders for idle carts

pub mod abandonment;
