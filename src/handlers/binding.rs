//! # Handler bindings.
//!
//! A [`Binding`] pairs a `(topic, target)` pattern with a [`Handle`]. Bindings
//! are shared as [`BindingRef`] (`Arc<Binding>`); the registry compares them by
//! pointer identity, so the same handler registered twice yields two distinct
//! bindings.
//!
//! ## Fault isolation
//! ```text
//! Binding::invoke(&event)
//!   ├─ build handler future   ── panic ─┐
//!   └─ poll to completion     ── panic ─┴─► HandlerError::Panicked { message }
//!                              ── Err(e) ───► e
//!                              ── Ok(())  ───► Ok(())
//! ```
//! A panicking handler never unwinds into the worker loop.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::error::HandlerError;
use crate::events::Event;

use super::handler::{Handle, HandlerFn};

/// Shared handle to a registered binding.
pub type BindingRef = Arc<Binding>;

/// Immutable `(topic, target, handler)` triple.
pub struct Binding {
    topic: Arc<str>,
    target: Arc<str>,
    handler: Arc<dyn Handle>,
}

impl Binding {
    /// Binds `handler` to the `(topic, target)` pattern. Either may be `"*"`.
    pub fn new(
        topic: impl Into<Arc<str>>,
        target: impl Into<Arc<str>>,
        handler: Arc<dyn Handle>,
    ) -> Self {
        Self {
            topic: topic.into(),
            target: target.into(),
            handler,
        }
    }

    /// Creates the binding and returns it as a shared [`BindingRef`].
    pub fn arc(
        topic: impl Into<Arc<str>>,
        target: impl Into<Arc<str>>,
        handler: Arc<dyn Handle>,
    ) -> BindingRef {
        Arc::new(Self::new(topic, target, handler))
    }

    /// Binds a closure through [`HandlerFn`].
    ///
    /// ## Example
    /// ```rust
    /// use circuits::{Binding, BindingRef, Event};
    ///
    /// let b: BindingRef = Binding::from_fn("*", "ping", |_ev: Event| async { Ok(()) });
    /// assert_eq!(b.target(), "ping");
    /// ```
    pub fn from_fn<F, Fut>(
        topic: impl Into<Arc<str>>,
        target: impl Into<Arc<str>>,
        f: F,
    ) -> BindingRef
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Self::arc(topic, target, Arc::new(HandlerFn::new(f)))
    }

    #[inline]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Name of the bound handler, for logs.
    pub fn handler_name(&self) -> &str {
        self.handler.name()
    }

    /// Runs the handler on `event`, converting a panic into [`HandlerError::Panicked`].
    pub async fn invoke(&self, event: &Event) -> Result<(), HandlerError> {
        let ev = event.clone();
        let fut = match std::panic::catch_unwind(AssertUnwindSafe(|| self.handler.handle(ev))) {
            Ok(fut) => fut,
            Err(payload) => return Err(panicked(payload)),
        };

        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(res) => res,
            Err(payload) => Err(panicked(payload)),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("topic", &&*self.topic)
            .field("target", &&*self.target)
            .field("handler", &self.handler.name())
            .finish()
    }
}

fn panicked(payload: Box<dyn Any + Send>) -> HandlerError {
    let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    };
    HandlerError::Panicked { message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invoke_ok() {
        let b = Binding::from_fn("t", "a", |_ev: Event| async { Ok(()) });
        assert_eq!(b.invoke(&Event::new("t", "a")).await, Ok(()));
    }

    #[tokio::test]
    async fn test_invoke_returns_handler_error() {
        let b = Binding::from_fn("t", "a", |_ev: Event| async {
            Err(HandlerError::fail("nope"))
        });
        assert_eq!(
            b.invoke(&Event::new("t", "a")).await,
            Err(HandlerError::fail("nope"))
        );
    }

    #[tokio::test]
    async fn test_invoke_converts_str_panic() {
        let b = Binding::from_fn("t", "a", |ev: Event| async move {
            if ev.target() == "a" {
                panic!("boom");
            }
            Ok(())
        });
        let err = b.invoke(&Event::new("t", "a")).await.unwrap_err();
        assert_eq!(
            err,
            HandlerError::Panicked {
                message: "boom".into()
            }
        );
    }

    #[tokio::test]
    async fn test_invoke_converts_formatted_panic() {
        let b = Binding::from_fn("t", "a", |ev: Event| async move {
            if ev.target() != "a" {
                panic!("bad target {}", ev.target());
            }
            Ok(())
        });
        let err = b.invoke(&Event::new("t", "zz")).await.unwrap_err();
        assert_eq!(
            err,
            HandlerError::Panicked {
                message: "bad target zz".into()
            }
        );
    }

    #[tokio::test]
    async fn test_invoke_converts_eager_panic() {
        struct Eager;

        impl Handle for Eager {
            fn handle<'a, 'b>(
                &'a self,
                _event: Event,
            ) -> std::pin::Pin<
                Box<dyn Future<Output = Result<(), HandlerError>> + Send + 'b>,
            >
            where
                'a: 'b,
                Self: 'b,
            {
                panic!("before future")
            }
        }

        let b = Binding::arc("t", "a", Arc::new(Eager));
        let err = b.invoke(&Event::new("t", "a")).await.unwrap_err();
        assert!(err.is_panic());
    }

    #[test]
    fn test_identity_is_per_binding() {
        let h: Arc<dyn Handle> = Arc::new(HandlerFn::new(|_ev: Event| async { Ok(()) }));
        let a = Binding::arc("t", "a", Arc::clone(&h));
        let b = Binding::arc("t", "a", h);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.handler_name(), "fn");
    }
}
