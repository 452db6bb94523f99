//! # Handler abstraction and function-backed handler implementation.
//!
//! This module defines the [`Handle`] trait (async, fallible) and a convenient
//! function-backed implementation [`HandlerFn`].
//!
//! A handler receives its own clone of the [`Event`] so the returned future can
//! be `'static`. Handlers report failure by returning a [`HandlerError`]; a panic
//! is caught one level up by [`Binding::invoke`](crate::Binding::invoke).

use std::future::Future;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::events::Event;

/// # Asynchronous event callback.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use circuits::{Event, Handle, HandlerError};
///
/// struct Audit;
///
/// #[async_trait]
/// impl Handle for Audit {
///     async fn handle(&self, event: Event) -> Result<(), HandlerError> {
///         if event.target().is_empty() {
///             return Err(HandlerError::fail("empty target"));
///         }
///         Ok(())
///     }
///
///     fn name(&self) -> &str { "audit" }
/// }
/// ```
#[async_trait]
pub trait Handle: Send + Sync + 'static {
    /// Processes one event. Runs to completion before the worker dequeues again.
    async fn handle(&self, event: Event) -> Result<(), HandlerError>;

    /// Returns the handler name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Function-backed handler.
///
/// Wraps a closure that *creates* a new future per invocation. Shared state
/// belongs in an explicit `Arc<...>` captured by the closure.
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Wraps the closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Handle for HandlerFn<F>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, event: Event) -> Result<(), HandlerError> {
        (self.f)(event).await
    }

    fn name(&self) -> &str {
        "fn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handler_fn_forwards_result() {
        let ok = HandlerFn::new(|_ev: Event| async { Ok(()) });
        assert_eq!(ok.handle(Event::new("t", "a")).await, Ok(()));

        let failing = HandlerFn::new(|ev: Event| async move {
            Err(HandlerError::fail(ev.target().to_string()))
        });
        assert_eq!(
            failing.handle(Event::new("t", "a")).await,
            Err(HandlerError::fail("a"))
        );
    }
}
