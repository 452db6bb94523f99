//! # Component: a node of the dispatch tree.
//!
//! A [`Component`] owns a handler registry and a list of child components.
//! The tree's root (the component without a live parent) owns the queue and
//! runs the worker pool; every other component only contributes bindings.
//!
//! ## Propagation
//! ```text
//!            root            register_handler(b) on C:
//!           ┌─┴─┐              C.registry += b ─► B.registry += b ─► root.registry += b
//!           A   B
//!               │            register_component(child):
//!               C              every binding already in child ─► self ─► ... ─► root
//! ```
//! Bindings never flow downwards: a child does not see its ancestors' or
//! siblings' bindings.
//!
//! Every structural change (handler add/remove, attach, detach) runs under one
//! process-wide topology lock, so a propagation walk never interleaves with a
//! parent link changing underneath it. Dispatch only takes the per-node
//! registry read locks and never waits on the topology lock.
//!
//! ## Lifecycle
//! ```text
//! Idle ──run()──► Running ──exit event──► Draining ──queue empty──► Stopped
//! ```
//! - the queue is created on first use, so attached children never allocate one.
//! - every component registers an exit binding on `("*", "exit")` at construction;
//!   it closes the root queue (idempotent).
//! - closing never discards queued events; workers drain them first.
//! - `run()` on a non-root component panics before spawning any worker.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use circuits::{Component, Event};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let root = Component::default();
//!     let child = Component::default();
//!     let seen = Arc::new(Mutex::new(Vec::new()));
//!
//!     let log = Arc::clone(&seen);
//!     child.on("*", "greet", move |ev: Event| {
//!         let log = Arc::clone(&log);
//!         async move {
//!             log.lock().unwrap().push(ev.target().to_string());
//!             Ok(())
//!         }
//!     });
//!     root.register_component(&child)?;
//!
//!     root.fire(Event::broadcast("greet")).await?;
//!     root.fire(Event::exit()).await?;
//!     root.run(1).await;
//!
//!     assert_eq!(*seen.lock().unwrap(), vec!["greet".to_string()]);
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::{DispatchError, HandlerError};
use crate::events::{EXIT_TARGET, Event, Queue, WILDCARD};
use crate::handlers::{Binding, BindingRef};

use super::registry::Registry;
use super::worker;

/// Serializes structural changes across every dispatch tree.
static TOPOLOGY: Mutex<()> = parking_lot::const_mutex(());

/// Lifecycle of a root component's worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    /// Constructed; no workers started.
    Idle = 0,
    /// Workers are processing events.
    Running = 1,
    /// Queue closed; workers drain what is left.
    Draining = 2,
    /// All workers exited.
    Stopped = 3,
}

impl RunState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => RunState::Running,
            2 => RunState::Draining,
            3 => RunState::Stopped,
            _ => RunState::Idle,
        }
    }
}

struct Inner {
    cfg: Config,
    parent: RwLock<Weak<Inner>>,
    children: Mutex<Vec<Component>>,
    registry: RwLock<Registry>,
    queue: OnceLock<Queue>,
    state: AtomicU8,
}

/// Cloneable handle to a node of the dispatch tree.
///
/// Clones share the node; identity is compared with [`Component::ptr_eq`].
#[derive(Clone)]
pub struct Component {
    inner: Arc<Inner>,
}

/// Non-owning handle to a [`Component`].
///
/// Handlers that need to fire events should capture this instead of a
/// `Component`: a strong handle stored in a binding would keep its own
/// registry alive through an `Arc` cycle.
#[derive(Clone, Default)]
pub struct WeakComponent {
    inner: Weak<Inner>,
}

impl WeakComponent {
    /// Returns the component if it is still alive.
    pub fn upgrade(&self) -> Option<Component> {
        self.inner.upgrade().map(|inner| Component { inner })
    }
}

impl Component {
    /// Creates a detached component with the standing exit binding registered.
    pub fn new(cfg: Config) -> Self {
        let inner = Arc::new_cyclic(|me: &Weak<Inner>| {
            let mut registry = Registry::default();
            registry.insert(exit_binding(me.clone()));
            Inner {
                queue: OnceLock::new(),
                cfg,
                parent: RwLock::new(Weak::new()),
                children: Mutex::new(Vec::new()),
                registry: RwLock::new(registry),
                state: AtomicU8::new(RunState::Idle as u8),
            }
        });
        Self { inner }
    }

    /// Creates a component whose queue holds `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(Config {
            queue_capacity: capacity,
            ..Config::default()
        })
    }

    pub fn config(&self) -> &Config {
        &self.inner.cfg
    }

    pub fn downgrade(&self) -> WeakComponent {
        WeakComponent {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// True if both handles point to the same node.
    pub fn ptr_eq(&self, other: &Component) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the parent, if attached and still alive.
    pub fn parent(&self) -> Option<Component> {
        self.inner
            .parent
            .read()
            .upgrade()
            .map(|inner| Component { inner })
    }

    /// Snapshot of the attached children.
    pub fn children(&self) -> Vec<Component> {
        self.inner.children.lock().clone()
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Walks parent links up to the node that owns the queue.
    pub fn root(&self) -> Component {
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    /// Current state of this component's worker pool.
    pub fn state(&self) -> RunState {
        RunState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    // ---- Registry ----

    /// Adds `binding` here and on every ancestor up to the root.
    ///
    /// Bindings in the same `(topic, target)` list are invoked in registration order.
    pub fn register_handler(&self, binding: BindingRef) {
        debug!(
            topic = binding.topic(),
            target = binding.target(),
            handler = binding.handler_name(),
            "handler registered"
        );
        let _topology = TOPOLOGY.lock();
        self.propagate_insert(binding);
    }

    fn propagate_insert(&self, binding: BindingRef) {
        let mut node = Some(self.clone());
        while let Some(n) = node {
            n.inner.registry.write().insert(Arc::clone(&binding));
            node = n.parent();
        }
    }

    /// Binds a closure to `(topic, target)` and registers it.
    ///
    /// Returns the binding so it can later be passed to [`Component::unregister_handler`].
    pub fn on<F, Fut>(
        &self,
        topic: impl Into<Arc<str>>,
        target: impl Into<Arc<str>>,
        f: F,
    ) -> BindingRef
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let binding = Binding::from_fn(topic, target, f);
        self.register_handler(Arc::clone(&binding));
        binding
    }

    /// Removes `binding` here and on every ancestor. Absent bindings are ignored.
    pub fn unregister_handler(&self, binding: &BindingRef) {
        let _topology = TOPOLOGY.lock();
        self.propagate_remove(binding);
    }

    fn propagate_remove(&self, binding: &BindingRef) {
        let mut node = Some(self.clone());
        while let Some(n) = node {
            let removed = n.inner.registry.write().remove(binding);
            trace!(
                topic = binding.topic(),
                target = binding.target(),
                removed,
                "handler unregistered"
            );
            node = n.parent();
        }
    }

    /// Attaches `child` and pushes every binding it already holds up the tree.
    ///
    /// # Errors
    /// - [`DispatchError::Cycle`] if `child` is `self` or one of its ancestors.
    /// - [`DispatchError::AlreadyAttached`] if `child` already has a parent.
    pub fn register_component(&self, child: &Component) -> Result<(), DispatchError> {
        let _topology = TOPOLOGY.lock();
        let mut node = Some(self.clone());
        while let Some(n) = node {
            if n.ptr_eq(child) {
                return Err(DispatchError::Cycle);
            }
            node = n.parent();
        }

        {
            let mut parent = child.inner.parent.write();
            if parent.upgrade().is_some() {
                return Err(DispatchError::AlreadyAttached);
            }
            *parent = Arc::downgrade(&self.inner);
        }
        self.inner.children.lock().push(child.clone());

        let bindings = child.bindings();
        debug!(bindings = bindings.len(), "component attached");
        for binding in bindings {
            self.propagate_insert(binding);
        }
        Ok(())
    }

    /// Detaches `child` and withdraws its bindings from this branch.
    ///
    /// A child that is not attached here is left alone.
    pub fn unregister_component(&self, child: &Component) {
        let _topology = TOPOLOGY.lock();
        let found = {
            let mut children = self.inner.children.lock();
            match children.iter().position(|c| c.ptr_eq(child)) {
                Some(i) => {
                    children.remove(i);
                    true
                }
                None => false,
            }
        };
        if !found {
            trace!("component not attached; nothing to detach");
            return;
        }

        *child.inner.parent.write() = Weak::new();
        let bindings = child.bindings();
        debug!(bindings = bindings.len(), "component detached");
        for binding in &bindings {
            self.propagate_remove(binding);
        }
    }

    /// Snapshot of every binding in this component's registry.
    pub fn bindings(&self) -> Vec<BindingRef> {
        self.inner.registry.read().bindings()
    }

    /// True if this component's registry holds `binding`.
    pub fn contains(&self, binding: &BindingRef) -> bool {
        self.inner.registry.read().contains(binding)
    }

    /// Handlers an event on `(topic, target)` resolves to at this component.
    pub fn handlers_for(&self, topic: &str, target: &str) -> Vec<BindingRef> {
        self.inner.registry.read().matching(topic, target)
    }

    // ---- Firing ----

    /// Enqueues `event` on the root queue, waiting while it is full.
    ///
    /// # Errors
    /// [`DispatchError::QueueClosed`] once an exit event has been processed.
    pub async fn fire(&self, event: Event) -> Result<(), DispatchError> {
        trace!(
            seq = event.seq(),
            topic = event.topic(),
            target = event.target(),
            "event fired"
        );
        self.root().queue().send(event).await
    }

    /// Enqueues `event` on the root queue without waiting.
    ///
    /// # Errors
    /// [`DispatchError::QueueFull`] or [`DispatchError::QueueClosed`].
    pub fn try_fire(&self, event: Event) -> Result<(), DispatchError> {
        trace!(
            seq = event.seq(),
            topic = event.topic(),
            target = event.target(),
            "event fired (non-blocking)"
        );
        self.root().queue().try_send(event)
    }

    // ---- Worker pool ----

    /// Runs `workers` workers (minimum 1) until the queue is closed and drained.
    ///
    /// # Panics
    /// If called on a component that has a parent: only the root owns the queue.
    pub async fn run(&self, workers: usize) {
        assert!(
            self.is_root(),
            "cannot run the dispatch loop on a child component"
        );
        let workers = workers.max(1);

        let next = if self.queue().is_closed() {
            RunState::Draining
        } else {
            RunState::Running
        };
        self.inner.state.store(next as u8, Ordering::Release);
        debug!(
            workers,
            capacity = self.queue().capacity(),
            "dispatch started"
        );

        let mut set = JoinSet::new();
        for id in 0..workers {
            set.spawn(worker::run_worker(id, self.clone()));
        }
        while let Some(res) = set.join_next().await {
            if let Err(e) = res {
                warn!(error = %e, "worker terminated abnormally");
            }
        }

        self.inner
            .state
            .store(RunState::Stopped as u8, Ordering::Release);
        debug!("dispatch stopped");
    }

    /// Runs with the configured number of workers.
    pub async fn start(&self) {
        self.run(self.inner.cfg.workers_clamped()).await;
    }

    /// This component's queue, created on first use.
    pub(crate) fn queue(&self) -> &Queue {
        self.inner
            .queue
            .get_or_init(|| Queue::new(self.inner.cfg.queue_capacity_clamped()))
    }

    /// Closes the root queue; repeated calls are no-ops.
    fn close(&self) {
        let root = self.root();
        if root.queue().close() {
            let _ = root.inner.state.compare_exchange(
                RunState::Running as u8,
                RunState::Draining as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
            debug!("event queue closed");
        }
    }
}

impl Default for Component {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("is_root", &self.is_root())
            .field("children", &self.inner.children.lock().len())
            .field("bindings", &self.inner.registry.read().len())
            .field("state", &self.state())
            .finish()
    }
}

/// Standing `("*", "exit")` binding that closes the owning tree's queue.
fn exit_binding(me: Weak<Inner>) -> BindingRef {
    Binding::from_fn(WILDCARD, EXIT_TARGET, move |_ev: Event| {
        let me = me.clone();
        async move {
            if let Some(inner) = me.upgrade() {
                Component { inner }.close();
            }
            Ok(())
        }
    })
}
