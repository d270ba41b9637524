//! Aurora storefront cart core.
//!
//! This crate holds the shopper-facing cart as a library: the in-memory
//! [`cart::CartStore`], derived signals such as free-shipping progress, and
//! the two-tier abandoned-cart scheduler that reaches out by email and
//! WhatsApp. A [`session::CartSession`] wires them together for one visit.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod services;
pub mod session;
pub mod signals;
pub mod state;
