//! Event dispatch abstraction (mechanics only).
//!
//! The dispatcher is the transport seam: in-memory fan-out for tests/dev,
//! a message broker adapter in production. It is always injected — there is
//! no process-global dispatcher instance.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use thiserror::Error;

use crate::envelope::EventEnvelope;

/// Dispatch failure.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// An event could not be serialized into its envelope.
    #[error("event serialization failed: {0}")]
    Serialize(String),

    /// The underlying transport rejected the envelope.
    #[error("dispatch failed: {0}")]
    Transport(String),
}

/// Domain event dispatcher (fan-out to consumers).
///
/// Implementations must be safe to share across threads; scopes on
/// concurrent requests flush through the same dispatcher.
pub trait EventDispatcher: Send + Sync {
    fn dispatch(&self, envelope: EventEnvelope) -> Result<(), DispatchError>;
}

impl<D> EventDispatcher for Arc<D>
where
    D: EventDispatcher + ?Sized,
{
    fn dispatch(&self, envelope: EventEnvelope) -> Result<(), DispatchError> {
        (**self).dispatch(envelope)
    }
}

/// A subscription to dispatched events.
///
/// Each subscription gets a copy of every envelope dispatched after it was
/// created (broadcast semantics). Intended for single-threaded consumption.
#[derive(Debug)]
pub struct Subscription {
    receiver: Receiver<EventEnvelope>,
}

impl Subscription {
    pub fn new(receiver: Receiver<EventEnvelope>) -> Self {
        Self { receiver }
    }

    /// Block until the next envelope is available.
    pub fn recv(&self) -> Result<EventEnvelope, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an envelope without blocking.
    pub fn try_recv(&self) -> Result<EventEnvelope, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for an envelope.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Result<EventEnvelope, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}
