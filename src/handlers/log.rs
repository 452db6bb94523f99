//! # Catch-all tracing handler for debugging and demos.
//!
//! [`LogWriter`] records every event it receives through `tracing` at `info`
//! level. Register it on `("*", "*")` to see all dispatch traffic.
//!
//! ## Output fields
//! ```text
//! seq=17 topic="jobs" target="import" notify_failure=false notify_success=true notify_complete=false
//! ```
//!
//! ## Example
//! ```no_run
//! use circuits::{Component, LogWriter};
//!
//! let root = Component::default();
//! root.register_handler(LogWriter::binding());
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::events::{Event, WILDCARD};
use crate::handlers::{Binding, BindingRef, Handle};

/// Handler that traces each event. Never fails.
///
/// Enabled via the `logging` feature. Not intended as an audit trail:
/// implement a custom [`Handle`] for that.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Returns a fresh `("*", "*")` binding for this writer.
    pub fn binding() -> BindingRef {
        Binding::arc(WILDCARD, WILDCARD, Arc::new(LogWriter))
    }
}

#[async_trait]
impl Handle for LogWriter {
    async fn handle(&self, e: Event) -> Result<(), HandlerError> {
        tracing::info!(
            seq = e.seq(),
            topic = e.topic(),
            target = e.target(),
            notify_failure = e.notify_failure(),
            notify_success = e.notify_success(),
            notify_complete = e.notify_complete(),
            "event"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log-writer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_writer_binding() {
        let b = LogWriter::binding();
        assert_eq!(b.topic(), WILDCARD);
        assert_eq!(b.target(), WILDCARD);
        assert_eq!(b.handler_name(), "log-writer");
        assert_eq!(b.invoke(&Event::new("t", "a")).await, Ok(()));
    }
}
