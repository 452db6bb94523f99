//! # circuits
//!
//! **circuits** is an in-process, hierarchical event-dispatch engine.
//!
//! Components register interest in `(topic, target)` patterns, fire events into
//! a shared bounded queue, and a worker pool invokes the matching handlers,
//! optionally firing follow-up `_success` / `_failure` / `_complete` events.
//! Components form a tree; the root owns the queue and sees every binding
//! registered anywhere below it.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Component A │   │  Component B │   │  Component C │
//!     │  (bindings)  │   │  (bindings)  │   │  (bindings)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ register_component / register_handler propagate upwards
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Root component                                                   │
//! │  - Registry (union of all bindings: topic ─► target ─► [binding]) │
//! │  - Queue (bounded FIFO, closed by the exit event)                 │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     worker 1           worker 2           worker N
//!        │ recv ─► handlers_for(topic, target) ─► invoke in order
//!        │                 └─► derived events (_success/_failure/_complete)
//!        └────────────────────────► back into the same queue
//! ```
//!
//! ### Lifecycle
//! ```text
//! Component::new ──► register handlers/components ──► fire(...) ──► run(N)
//!
//! run(N):
//!   ├─► spawn N workers
//!   ├─► each worker: loop { recv ─► dispatch } until closed && empty
//!   └─► returns when every worker exited
//!
//! fire(Event::exit()) ─► exit bindings close the queue (idempotent)
//!                     ─► queued events are still drained
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types                            |
//! |-------------------|--------------------------------------------------------------|--------------------------------------|
//! | **Events**        | Immutable routing envelope with notification flags.          | [`Event`]                            |
//! | **Handlers**      | Async callbacks; panics are converted into errors.           | [`Handle`], [`HandlerFn`], [`Binding`] |
//! | **Tree**          | Hierarchical registries with upward propagation.             | [`Component`], [`WeakComponent`]     |
//! | **Errors**        | Typed errors for dispatch misuse and handler faults.         | [`DispatchError`], [`HandlerError`]  |
//! | **Configuration** | Queue capacity and default worker count.                     | [`Config`]                           |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a `("*", "*")` handler tracing every event.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use circuits::{Component, Config, Event, HandlerError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let root = Component::new(Config::default());
//!     let done = Arc::new(AtomicUsize::new(0));
//!
//!     root.on("jobs", "import", |_ev: Event| async {
//!         Err(HandlerError::fail("bad input"))
//!     });
//!     let counter = Arc::clone(&done);
//!     root.on("jobs", "import_failure", move |_ev: Event| {
//!         let counter = Arc::clone(&counter);
//!         async move {
//!             counter.fetch_add(1, Ordering::SeqCst);
//!             Ok(())
//!         }
//!     });
//!
//!     root.fire(Event::new("jobs", "import").with_notify_failure(true)).await?;
//!     root.fire(Event::exit()).await?;
//!     root.run(1).await;
//!
//!     assert_eq!(done.load(Ordering::SeqCst), 1);
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod handlers;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{Component, RunState, WeakComponent};
pub use error::{DispatchError, HandlerError};
pub use events::{COMPLETE_SUFFIX, EXIT_TARGET, Event, FAILURE_SUFFIX, SUCCESS_SUFFIX, WILDCARD};
pub use handlers::{Binding, BindingRef, Handle, HandlerFn};

// Optional: expose a simple built-in tracing handler.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use handlers::LogWriter;
