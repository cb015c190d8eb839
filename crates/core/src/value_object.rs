//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** — two value
/// objects with the same attribute values are the same value. `Totals` and
/// `PaymentMethod` are value objects; a `Customer` (which keeps its identity
/// when its phone number changes) is an entity.
///
/// To "modify" a value object, build a new one. The trait therefore only
/// requires `Clone + PartialEq + Debug`.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
