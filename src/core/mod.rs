//! Dispatch core: component tree, registry and worker pool.
//!
//! The only public API from this module is [`Component`] (with its
//! [`WeakComponent`] handle and [`RunState`]), which owns registration,
//! firing and the worker pool.
//!
//! Internal modules:
//! - [`component`]: tree structure, propagation rules, firing, `run`;
//! - [`registry`]: two-level `(topic, target)` index and wildcard matching;
//! - [`worker`]: worker loop and derived-event rule.

mod component;
mod registry;
mod worker;

pub use component::{Component, RunState, WeakComponent};
