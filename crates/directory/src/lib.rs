//! Customer and deliverer directories.
//!
//! Session-scoped, in-memory lists with substring search and add-new. There
//! is no persistence: each session starts from the sample data again.

pub mod customer;
pub mod deliverer;

pub use customer::{Customer, CustomerDirectory, CustomerId};
pub use deliverer::{Deliverer, DelivererDirectory, DelivererId};
