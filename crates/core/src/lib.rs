//! `tillpoint-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no IO, no UI, no storage).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod event;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use event::Event;
pub use id::AggregateId;
pub use value_object::ValueObject;
