//! In-memory event dispatcher for tests/dev.

use std::sync::{Mutex, mpsc};

use crate::dispatcher::{DispatchError, EventDispatcher, Subscription};
use crate::envelope::EventEnvelope;

/// In-memory fan-out dispatcher.
///
/// - No IO / no async
/// - Best-effort fan-out to live subscribers
/// - Keeps every dispatched envelope for test assertions
#[derive(Debug, Default)]
pub struct InMemoryDispatcher {
    subscribers: Mutex<Vec<mpsc::Sender<EventEnvelope>>>,
    dispatched: Mutex<Vec<EventEnvelope>>,
}

impl InMemoryDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// All envelopes dispatched so far, in order.
    pub fn dispatched(&self) -> Vec<EventEnvelope> {
        self.dispatched
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned we still return a subscription;
        // it just won't receive envelopes.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}

impl EventDispatcher for InMemoryDispatcher {
    fn dispatch(&self, envelope: EventEnvelope) -> Result<(), DispatchError> {
        let mut subs = self
            .subscribers
            .lock()
            .map_err(|_| DispatchError::Transport("dispatcher lock poisoned".into()))?;

        // Drop any dead subscribers while dispatching.
        subs.retain(|tx| tx.send(envelope.clone()).is_ok());

        self.dispatched
            .lock()
            .map_err(|_| DispatchError::Transport("dispatcher lock poisoned".into()))?
            .push(envelope);

        Ok(())
    }
}
