//! # Dispatch configuration.
//!
//! Provides [`Config`] centralized settings for a [`Component`](crate::Component).
//!
//! Config is used in two ways:
//! 1. **Component creation**: `Component::new(config)` sizes the event queue.
//! 2. **Worker defaults**: `Component::start()` runs `config.workers` workers.
//!
//! ## Sentinel values
//! - `queue_capacity = 0` → clamped to 1 (a queue always holds at least one event)
//! - `workers = 0` → clamped to 1 (at least one worker drains the queue)

/// Settings for a dispatch tree.
///
/// ## Field semantics
/// - `queue_capacity`: bound of the root queue; producers wait while it is full
/// - `workers`: number of workers started by `Component::start()`
///
/// Only the root's configuration matters for dispatch. A component's queue is
/// allocated on first fire or run, so a child that is attached before it fires
/// never allocates one.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of queued events before `fire` starts waiting.
    pub queue_capacity: usize,

    /// Number of concurrent workers used by `Component::start()`.
    pub workers: usize,
}

impl Config {
    /// Returns the queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }

    /// Returns the worker count clamped to a minimum of 1.
    #[inline]
    pub fn workers_clamped(&self) -> usize {
        self.workers.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `queue_capacity = 100`
    /// - `workers = 1` (strict FIFO processing)
    fn default() -> Self {
        Self {
            queue_capacity: 100,
            workers: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.queue_capacity, 100);
        assert_eq!(cfg.workers, 1);
    }

    #[test]
    fn test_zero_is_clamped() {
        let cfg = Config {
            queue_capacity: 0,
            workers: 0,
        };
        assert_eq!(cfg.queue_capacity_clamped(), 1);
        assert_eq!(cfg.workers_clamped(), 1);
    }
}
