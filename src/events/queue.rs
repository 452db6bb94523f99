//! # Bounded event queue shared by the worker pool.
//!
//! [`Queue`] is a thin wrapper around [`tokio::sync::mpsc`] that adds
//! multi-consumer dequeue and an idempotent close.
//!
//! ## Architecture
//! ```text
//! Producers (many):                      Consumers (many):
//!   fire()          ──┐                  ┌──► worker 1
//!   derived events  ──┼──► Queue (mpsc) ─┼──► worker 2
//!   handlers        ──┘                  └──► worker N
//!                                    (receiver behind an async mutex)
//! ```
//!
//! ## Rules
//! - **FIFO**: events are dequeued in the order they were enqueued.
//! - **Bounded**: `send()` waits while the queue is full; `try_send()` fails instead.
//! - **Close**: drops the queue's sender; later sends fail with `QueueClosed`.
//! - **Drain**: events already queued are still delivered after close;
//!   `recv()` returns `None` only once the queue is closed *and* empty.
//! - **Idempotent close**: only the first `close()` returns `true`.

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, mpsc};

use crate::error::DispatchError;

use super::event::Event;

/// Multi-producer, multi-consumer bounded FIFO of [`Event`]s.
#[derive(Debug)]
pub(crate) struct Queue {
    tx: Mutex<Option<mpsc::Sender<Event>>>,
    rx: AsyncMutex<mpsc::Receiver<Event>>,
    capacity: usize,
}

impl Queue {
    /// Creates a new queue. The minimum capacity is 1 (clamped).
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx: Mutex::new(Some(tx)),
            rx: AsyncMutex::new(rx),
            capacity,
        }
    }

    /// Enqueues an event, waiting while the queue is full.
    pub(crate) async fn send(&self, ev: Event) -> Result<(), DispatchError> {
        let tx = self.sender()?;
        tx.send(ev).await.map_err(|_| DispatchError::QueueClosed)
    }

    /// Enqueues an event without waiting.
    pub(crate) fn try_send(&self, ev: Event) -> Result<(), DispatchError> {
        let tx = self.sender()?;
        tx.try_send(ev).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DispatchError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DispatchError::QueueClosed,
        })
    }

    /// Dequeues the next event; `None` once closed and drained.
    pub(crate) async fn recv(&self) -> Option<Event> {
        self.rx.lock().await.recv().await
    }

    /// Forbids further enqueues. Returns `true` only for the call that closed it.
    pub(crate) fn close(&self) -> bool {
        self.tx.lock().take().is_some()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.tx.lock().is_none()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clones the sender so a waiting send does not hold the lock.
    fn sender(&self) -> Result<mpsc::Sender<Event>, DispatchError> {
        self.tx.lock().clone().ok_or(DispatchError::QueueClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fifo() {
        let q = Queue::new(4);
        q.send(Event::new("t", "a")).await.unwrap();
        q.send(Event::new("t", "b")).await.unwrap();
        assert_eq!(q.recv().await.unwrap().target(), "a");
        assert_eq!(q.recv().await.unwrap().target(), "b");
    }

    #[tokio::test]
    async fn test_close_drains_pending() {
        let q = Queue::new(4);
        q.send(Event::new("t", "a")).await.unwrap();
        q.send(Event::new("t", "b")).await.unwrap();
        assert!(q.close());

        assert_eq!(q.recv().await.unwrap().target(), "a");
        assert_eq!(q.recv().await.unwrap().target(), "b");
        assert!(q.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let q = Queue::new(1);
        assert!(!q.is_closed());
        assert!(q.close());
        assert!(!q.close());
        assert!(q.is_closed());
        assert_eq!(
            q.send(Event::new("t", "a")).await,
            Err(DispatchError::QueueClosed)
        );
    }

    #[test]
    fn test_try_send_full() {
        let q = Queue::new(1);
        assert_eq!(q.capacity(), 1);
        q.try_send(Event::new("t", "a")).unwrap();
        assert_eq!(
            q.try_send(Event::new("t", "b")),
            Err(DispatchError::QueueFull)
        );
    }

    #[test]
    fn test_capacity_clamped() {
        assert_eq!(Queue::new(0).capacity(), 1);
    }
}
