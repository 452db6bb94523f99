//! # Dispatched events.
//!
//! An [`Event`] carries only routing metadata: a `topic`, a `target` and three
//! notification flags that ask the worker to fire follow-up events once a
//! handler has run.
//!
//! ## Routing
//! ```text
//! topic  = coarse routing dimension ("*" = any topic)
//! target = event kind within a topic ("*" = any target; not used for fired events)
//! ```
//!
//! ## Derived events
//! ```text
//! notify_failure  && handler failed    ─► (topic, target + "_failure")
//! notify_success  && handler succeeded ─► (topic, target + "_success")
//! notify_complete (any outcome)        ─► (topic, target + "_complete")
//! ```
//! Derived events never carry notification flags themselves.
//!
//! ## Ordering
//! Each event has a process-wide sequence number (`seq`) that increases
//! monotonically at construction. It is diagnostic only; dispatch never reads it.
//!
//! ## Example
//! ```rust
//! use circuits::Event;
//!
//! let ev = Event::new("jobs", "import")
//!     .with_notify_success(true)
//!     .with_notify_complete(true);
//!
//! assert_eq!(ev.topic(), "jobs");
//! assert_eq!(ev.target(), "import");
//! assert!(ev.notify_success());
//! assert!(!ev.notify_failure());
//! assert_eq!(ev.derive(circuits::COMPLETE_SUFFIX).target(), "import_complete");
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Pattern that matches any topic or any target.
pub const WILDCARD: &str = "*";

/// Target of the standing shutdown event.
pub const EXIT_TARGET: &str = "exit";

/// Suffix of the event fired after a successful invocation.
pub const SUCCESS_SUFFIX: &str = "_success";

/// Suffix of the event fired after a failed invocation.
pub const FAILURE_SUFFIX: &str = "_failure";

/// Suffix of the event fired after every invocation.
pub const COMPLETE_SUFFIX: &str = "_complete";

/// Immutable routing envelope for one dispatched occurrence.
///
/// Fields are private: flags are set with the `with_*` builders before the
/// event is fired, and cannot change afterwards. Cloning is cheap (the
/// strings are reference counted).
#[derive(Clone, PartialEq, Eq)]
pub struct Event {
    seq: u64,
    topic: Arc<str>,
    target: Arc<str>,
    notify_failure: bool,
    notify_success: bool,
    notify_complete: bool,
}

impl Event {
    /// Creates an event for `(topic, target)` with every notification flag off.
    pub fn new(topic: impl Into<Arc<str>>, target: impl Into<Arc<str>>) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            topic: topic.into(),
            target: target.into(),
            notify_failure: false,
            notify_success: false,
            notify_complete: false,
        }
    }

    /// Creates an event for `target` on the wildcard topic.
    pub fn broadcast(target: impl Into<Arc<str>>) -> Self {
        Self::new(WILDCARD, target)
    }

    /// Creates the shutdown event handled by every component's exit binding.
    pub fn exit() -> Self {
        Self::broadcast(EXIT_TARGET)
    }

    /// Requests a `<target>_failure` event when a handler fails.
    #[inline]
    pub fn with_notify_failure(mut self, on: bool) -> Self {
        self.notify_failure = on;
        self
    }

    /// Requests a `<target>_success` event when a handler succeeds.
    #[inline]
    pub fn with_notify_success(mut self, on: bool) -> Self {
        self.notify_success = on;
        self
    }

    /// Requests a `<target>_complete` event after every handler invocation.
    #[inline]
    pub fn with_notify_complete(mut self, on: bool) -> Self {
        self.notify_complete = on;
        self
    }

    /// Builds the follow-up `(topic, target + suffix)` with all flags off.
    pub fn derive(&self, suffix: &str) -> Self {
        Self::new(Arc::clone(&self.topic), format!("{}{suffix}", self.target))
    }

    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    #[inline]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[inline]
    pub fn notify_failure(&self) -> bool {
        self.notify_failure
    }

    #[inline]
    pub fn notify_success(&self) -> bool {
        self.notify_success
    }

    #[inline]
    pub fn notify_complete(&self) -> bool {
        self.notify_complete
    }

    /// True for the standing shutdown target.
    #[inline]
    pub fn is_exit(&self) -> bool {
        &*self.target == EXIT_TARGET
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("seq", &self.seq)
            .field("topic", &&*self.topic)
            .field("target", &&*self.target)
            .field("notify_failure", &self.notify_failure)
            .field("notify_success", &self.notify_success)
            .field("notify_complete", &self.notify_complete)
            .finish()
    }
}
