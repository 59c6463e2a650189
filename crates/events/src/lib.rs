//! `authforge-events` — domain event plumbing.
//!
//! Events raised by aggregates are buffered in an [`EventScope`] during a
//! service operation and flushed to an [`EventDispatcher`] only after the
//! operation's persistence step has succeeded. Dropping a scope without
//! publishing discards its buffer, so a failed operation never leaks events.

pub mod dispatcher;
pub mod envelope;
pub mod event;
pub mod in_memory;
pub mod scope;

pub use dispatcher::{DispatchError, EventDispatcher, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory::InMemoryDispatcher;
pub use scope::{EventScope, EventScopeFactory};
