//! Dispatched events: envelope type and the bounded queue.
//!
//! ## Contents
//! - [`Event`] routing envelope (topic, target, notification flags)
//! - [`Queue`] bounded FIFO over `tokio::sync::mpsc` shared by all workers
//!
//! ## Quick reference
//! - **Producers**: `Component::fire`/`try_fire` (callers and handlers),
//!   workers firing derived events.
//! - **Consumers**: worker loops started by `Component::run`.

mod event;
mod queue;

pub use event::{
    COMPLETE_SUFFIX, EXIT_TARGET, Event, FAILURE_SUFFIX, SUCCESS_SUFFIX, WILDCARD,
};
pub(crate) use queue::Queue;
