//! Product catalog module.
//!
//! Products are **immutable reference data** for the session: the register
//! reads them but never mutates them. The catalog is injected behind the
//! [`CatalogProvider`] trait so the aggregation logic never depends on where
//! the data comes from.

pub mod product;
pub mod provider;

pub use product::{Product, ProductId};
pub use provider::{CatalogProvider, InMemoryCatalog, ProductFilter};
