//! # Worker loop: dequeue, resolve, invoke, notify.
//!
//! Each worker started by [`Component::run`](crate::Component::run) runs
//! [`run_worker`] until the root queue is closed and drained.
//!
//! ## Event flow
//!
//! ```text
//! queue.recv() ─► handlers_for(topic, target)
//!                   for binding in order:
//!                     binding.invoke(&event)
//!                       ├─ Err && notify_failure ─► fire (topic, target_failure)
//!                       ├─ Ok  && notify_success ─► fire (topic, target_success)
//!                       └─ notify_complete       ─► fire (topic, target_complete)
//! ```
//!
//! ## Rules
//! - Handlers of one event run **sequentially** in registration order.
//! - Flags are read from the **original** event; derived events carry none.
//! - A failed or panicking handler never stops the loop or skips later handlers.
//! - Derived events rejected by a closed queue are dropped (traced at `debug`).

use tracing::{debug, trace, warn};

use crate::error::HandlerError;
use crate::events::{COMPLETE_SUFFIX, Event, FAILURE_SUFFIX, SUCCESS_SUFFIX};

use super::component::Component;

/// Processes events from `root`'s queue until it is closed and empty.
pub(crate) async fn run_worker(id: usize, root: Component) {
    trace!(worker = id, "worker started");
    while let Some(event) = root.queue().recv().await {
        trace!(
            worker = id,
            seq = event.seq(),
            topic = event.topic(),
            target = event.target(),
            "event dequeued"
        );
        if event.is_exit() {
            debug!(worker = id, seq = event.seq(), "exit event dequeued");
        }
        dispatch(&root, &event).await;
    }
    debug!(worker = id, "worker exited");
}

/// Invokes every handler matching `event` and fires the derived events.
pub(crate) async fn dispatch(root: &Component, event: &Event) {
    for binding in root.handlers_for(event.topic(), event.target()) {
        let res = binding.invoke(event).await;

        if let Err(e) = &res {
            if e.is_panic() {
                warn!(
                    handler = binding.handler_name(),
                    topic = event.topic(),
                    target = event.target(),
                    error = %e.as_message(),
                    "handler panicked"
                );
            } else {
                debug!(
                    handler = binding.handler_name(),
                    topic = event.topic(),
                    target = event.target(),
                    label = e.as_label(),
                    error = %e.as_message(),
                    "handler failed"
                );
            }
        }

        for derived in derived_events(event, &res) {
            let target = derived.target().to_owned();
            match root.queue().send(derived).await {
                Ok(()) => trace!(target = %target, "derived event fired"),
                Err(e) => debug!(
                    target = %target,
                    label = e.as_label(),
                    error = %e.as_message(),
                    "derived event dropped"
                ),
            }
        }
    }
}

/// Follow-up events for one invocation outcome (at most two).
fn derived_events(event: &Event, res: &Result<(), HandlerError>) -> Vec<Event> {
    let mut out = Vec::with_capacity(2);
    match res {
        Err(_) if event.notify_failure() => out.push(event.derive(FAILURE_SUFFIX)),
        Ok(()) if event.notify_success() => out.push(event.derive(SUCCESS_SUFFIX)),
        _ => {}
    }
    if event.notify_complete() {
        out.push(event.derive(COMPLETE_SUFFIX));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(events: &[Event]) -> Vec<&str> {
        events.iter().map(Event::target).collect()
    }

    #[test]
    fn test_no_flags_no_derived() {
        let ev = Event::new("t", "job");
        assert!(derived_events(&ev, &Ok(())).is_empty());
        assert!(derived_events(&ev, &Err(HandlerError::fail("x"))).is_empty());
    }

    #[test]
    fn test_success_and_failure_are_exclusive() {
        let ev = Event::new("t", "job")
            .with_notify_success(true)
            .with_notify_failure(true);

        assert_eq!(targets(&derived_events(&ev, &Ok(()))), ["job_success"]);
        assert_eq!(
            targets(&derived_events(&ev, &Err(HandlerError::fail("x")))),
            ["job_failure"]
        );
    }

    #[test]
    fn test_success_flag_ignored_on_failure() {
        let ev = Event::new("t", "job").with_notify_success(true);
        assert!(derived_events(&ev, &Err(HandlerError::fail("x"))).is_empty());
    }

    #[test]
    fn test_complete_is_unconditional() {
        let ev = Event::new("t", "job")
            .with_notify_failure(true)
            .with_notify_complete(true);

        assert_eq!(targets(&derived_events(&ev, &Ok(()))), ["job_complete"]);
        assert_eq!(
            targets(&derived_events(&ev, &Err(HandlerError::fail("x")))),
            ["job_failure", "job_complete"]
        );
    }

    #[test]
    fn test_derived_keep_topic_and_have_no_flags() {
        let ev = Event::new("billing", "charge")
            .with_notify_success(true)
            .with_notify_complete(true);

        for d in derived_events(&ev, &Ok(())) {
            assert_eq!(d.topic(), "billing");
            assert!(!d.notify_success() && !d.notify_failure() && !d.notify_complete());
        }
    }
}
