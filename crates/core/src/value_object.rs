//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values;
/// two instances with the same values are interchangeable. Constructors
/// validate eagerly, so holding a value object is proof its invariants
/// hold ("parse, don't validate").
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
