//! Aurora Core - Shared domain types.
//!
//! This crate provides the value types used by the storefront cart core and
//! its tooling:
//! - `aurora-storefront` - cart store, derived signals, abandonment scheduler
//! - `aurora-cli` - command-line tools for replaying cart sessions
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no timers, no HTTP clients.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and phone numbers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
