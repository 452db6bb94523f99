//! Error types used by the dispatch engine and by handlers.
//!
//! This module defines two main error enums:
//!
//! - [`DispatchError`] — errors raised by the engine itself (queue and tree misuse).
//! - [`HandlerError`] — errors raised by individual handler invocations.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.

use thiserror::Error;

/// # Errors produced by the dispatch engine.
///
/// These represent failures of engine operations such as firing into a
/// closed queue or attaching a component in a way that would break the tree.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The root queue was closed by an exit event; no new events are accepted.
    #[error("event queue is closed")]
    QueueClosed,

    /// The root queue is at capacity (only returned by non-blocking firing).
    #[error("event queue is full")]
    QueueFull,

    /// Attaching the component would make it its own ancestor.
    #[error("component cannot be attached to itself or to one of its descendants")]
    Cycle,

    /// The component is already attached to a parent.
    #[error("component is already attached to a parent")]
    AlreadyAttached,
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use circuits::DispatchError;
    ///
    /// assert_eq!(DispatchError::QueueClosed.as_label(), "dispatch_queue_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::QueueClosed => "dispatch_queue_closed",
            DispatchError::QueueFull => "dispatch_queue_full",
            DispatchError::Cycle => "dispatch_cycle",
            DispatchError::AlreadyAttached => "dispatch_already_attached",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

/// # Errors produced by handler invocations.
///
/// A handler either returns [`HandlerError::Fail`] itself, or panics and has
/// the panic converted into [`HandlerError::Panicked`] by the binding wrapper.
/// Both count as a failed invocation for notification purposes.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Handler reported a failure.
    #[error("handler failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Handler panicked; the panic was caught at the binding boundary.
    #[error("handler panicked: {message}")]
    Panicked {
        /// The panic payload rendered as text.
        message: String,
    },
}

impl HandlerError {
    /// Shorthand for [`HandlerError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        HandlerError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use circuits::HandlerError;
    ///
    /// assert_eq!(HandlerError::fail("boom").as_label(), "handler_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Fail { .. } => "handler_failed",
            HandlerError::Panicked { .. } => "handler_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Fail { error } => format!("error: {error}"),
            HandlerError::Panicked { message } => format!("panic: {message}"),
        }
    }

    /// True if the error came from a caught panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, HandlerError::Panicked { .. })
    }
}
