//! Domain models for the storefront cart core.

mod customer;

pub use customer::Customer;
