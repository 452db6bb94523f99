//! # Handlers and bindings.
//!
//! This module provides the handler-related types:
//! - [`Handle`] - trait for implementing async event callbacks
//! - [`HandlerFn`] - closure-based handler implementation
//! - [`Binding`] - handler bound to a `(topic, target)` pattern
//! - [`BindingRef`] - shared reference to a binding (`Arc<Binding>`)
//!
//! ## Optional
//! - `logging`: [`LogWriter`], a catch-all handler that traces every event.

mod binding;
mod handler;
#[cfg(feature = "logging")]
mod log;

pub use binding::{Binding, BindingRef};
pub use handler::{Handle, HandlerFn};
#[cfg(feature = "logging")]
pub use log::LogWriter;
