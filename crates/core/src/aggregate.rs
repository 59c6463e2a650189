//! Aggregate root marker.

use crate::entity::Entity;

/// Marker for entities that form a consistency/persistence boundary.
///
/// An aggregate root is the only unit loaded and stored by repositories;
/// value objects it composes (permission ids, codes, claims) have no
/// independent lifecycle. Concurrency control across concurrent loads of
/// the same aggregate is the repository's concern, not the domain's.
pub trait AggregateRoot: Entity {}
