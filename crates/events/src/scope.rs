//! Buffered event-publication scope.
//!
//! A scope collects the events raised during one service operation and
//! flushes them only when the caller confirms success. The ordering
//! invariant: **publish happens only after persistence succeeds**. A scope
//! dropped without [`EventScope::publish`] discards its buffer.

use std::sync::Arc;

use serde::Serialize;

use crate::dispatcher::{DispatchError, EventDispatcher};
use crate::envelope::EventEnvelope;
use crate::event::Event;

/// Creates one scope per service operation over a shared dispatcher.
#[derive(Clone)]
pub struct EventScopeFactory {
    dispatcher: Arc<dyn EventDispatcher>,
}

impl EventScopeFactory {
    pub fn new(dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn begin(&self) -> EventScope {
        EventScope {
            dispatcher: Arc::clone(&self.dispatcher),
            queued: Vec::new(),
        }
    }
}

/// A buffering boundary for domain events raised during one operation.
pub struct EventScope {
    dispatcher: Arc<dyn EventDispatcher>,
    queued: Vec<EventEnvelope>,
}

impl EventScope {
    /// Queue a typed domain event for publication.
    pub fn record<E>(
        &mut self,
        aggregate_type: impl Into<String>,
        aggregate_id: impl core::fmt::Display,
        event: &E,
    ) -> Result<(), DispatchError>
    where
        E: Event + Serialize,
    {
        let envelope = EventEnvelope::from_typed(aggregate_type, aggregate_id, event)
            .map_err(|e| DispatchError::Serialize(e.to_string()))?;
        self.queued.push(envelope);
        Ok(())
    }

    /// Number of queued, not-yet-published events.
    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    /// Flush all queued events to the dispatcher, consuming the scope.
    ///
    /// Returns the number of published events.
    pub fn publish(mut self) -> Result<usize, DispatchError> {
        let queued = std::mem::take(&mut self.queued);
        let count = queued.len();
        for envelope in queued {
            tracing::debug!(
                event_type = envelope.event_type(),
                aggregate_id = envelope.aggregate_id(),
                "publishing domain event"
            );
            self.dispatcher.dispatch(envelope)?;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::in_memory::InMemoryDispatcher;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Pinged {
        occurred_at: DateTime<Utc>,
    }

    impl Event for Pinged {
        fn event_type(&self) -> &'static str {
            "test.pinged"
        }

        fn version(&self) -> u32 {
            1
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            self.occurred_at
        }
    }

    fn factory() -> (Arc<InMemoryDispatcher>, EventScopeFactory) {
        let dispatcher = Arc::new(InMemoryDispatcher::new());
        let factory = EventScopeFactory::new(dispatcher.clone());
        (dispatcher, factory)
    }

    #[test]
    fn publish_flushes_queued_events_in_order() {
        let (dispatcher, factory) = factory();
        let mut scope = factory.begin();

        let event = Pinged {
            occurred_at: Utc::now(),
        };
        scope.record("test", "a-1", &event).unwrap();
        scope.record("test", "a-2", &event).unwrap();

        let published = scope.publish().unwrap();
        assert_eq!(published, 2);

        let dispatched = dispatcher.dispatched();
        assert_eq!(dispatched.len(), 2);
        assert_eq!(dispatched[0].aggregate_id(), "a-1");
        assert_eq!(dispatched[1].aggregate_id(), "a-2");
        assert_eq!(dispatched[0].event_type(), "test.pinged");
    }

    #[test]
    fn dropped_scope_discards_queued_events() {
        let (dispatcher, factory) = factory();

        {
            let mut scope = factory.begin();
            scope
                .record(
                    "test",
                    "a-1",
                    &Pinged {
                        occurred_at: Utc::now(),
                    },
                )
                .unwrap();
            // Dropped without publish: simulates a failed persistence step.
        }

        assert!(dispatcher.dispatched().is_empty());
    }

    #[test]
    fn subscription_receives_published_envelopes() {
        let (dispatcher, factory) = factory();
        let subscription = dispatcher.subscribe();

        let mut scope = factory.begin();
        scope
            .record(
                "test",
                "a-1",
                &Pinged {
                    occurred_at: Utc::now(),
                },
            )
            .unwrap();
        scope.publish().unwrap();

        let envelope = subscription.try_recv().unwrap();
        assert_eq!(envelope.event_type(), "test.pinged");
        assert!(subscription.try_recv().is_err());
    }
}
