//! # Handler registry: two-level `(topic, target)` index of bindings.
//!
//! Each [`Component`](crate::Component) owns one registry. The root's registry
//! holds the union of every descendant's bindings and is the only one consulted
//! during dispatch.
//!
//! ## Layout
//! ```text
//! topic ──► target ──► [binding, binding, ...]   (insertion order = invocation order)
//! ```
//!
//! ## Matching
//! ```text
//! event topic "*"   ─► every topic bucket
//! event topic "X"   ─► bucket "X", then bucket "*"
//!
//! within a bucket:
//!   event target "*" ─► every target list
//!   event target "Y" ─► list "Y", then list "*"
//! ```
//! Order inside each list is preserved; order across topic buckets is unspecified.

use std::collections::HashMap;
use std::sync::Arc;

use crate::events::WILDCARD;
use crate::handlers::BindingRef;

type Targets = HashMap<String, Vec<BindingRef>>;

/// Ordered per-pattern lists of bindings.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    topics: HashMap<String, Targets>,
}

impl Registry {
    /// Appends the binding to its `(topic, target)` list, creating levels lazily.
    pub(crate) fn insert(&mut self, binding: BindingRef) {
        self.topics
            .entry(binding.topic().to_owned())
            .or_default()
            .entry(binding.target().to_owned())
            .or_default()
            .push(binding);
    }

    /// Removes the first identity match. Returns `false` if it was absent.
    pub(crate) fn remove(&mut self, binding: &BindingRef) -> bool {
        let Some(targets) = self.topics.get_mut(binding.topic()) else {
            return false;
        };
        let Some(list) = targets.get_mut(binding.target()) else {
            return false;
        };
        let Some(pos) = list.iter().position(|b| Arc::ptr_eq(b, binding)) else {
            return false;
        };
        list.remove(pos);

        if list.is_empty() {
            targets.remove(binding.target());
            if targets.is_empty() {
                self.topics.remove(binding.topic());
            }
        }
        true
    }

    pub(crate) fn contains(&self, binding: &BindingRef) -> bool {
        self.topics
            .get(binding.topic())
            .and_then(|targets| targets.get(binding.target()))
            .is_some_and(|list| list.iter().any(|b| Arc::ptr_eq(b, binding)))
    }

    /// Snapshot of every binding.
    pub(crate) fn bindings(&self) -> Vec<BindingRef> {
        self.topics
            .values()
            .flat_map(|targets| targets.values())
            .flat_map(|list| list.iter().cloned())
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.topics
            .values()
            .flat_map(|targets| targets.values())
            .map(Vec::len)
            .sum()
    }

    /// Resolves the handlers for an event fired on `(topic, target)`.
    pub(crate) fn matching(&self, topic: &str, target: &str) -> Vec<BindingRef> {
        let mut out = Vec::new();
        if topic == WILDCARD {
            for targets in self.topics.values() {
                collect(&mut out, targets, target);
            }
        } else {
            if let Some(targets) = self.topics.get(topic) {
                collect(&mut out, targets, target);
            }
            if let Some(targets) = self.topics.get(WILDCARD) {
                collect(&mut out, targets, target);
            }
        }
        out
    }
}

fn collect(out: &mut Vec<BindingRef>, targets: &Targets, target: &str) {
    if target == WILDCARD {
        for list in targets.values() {
            out.extend(list.iter().cloned());
        }
        return;
    }
    if let Some(list) = targets.get(target) {
        out.extend(list.iter().cloned());
    }
    if let Some(list) = targets.get(WILDCARD) {
        out.extend(list.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use crate::handlers::Binding;

    fn noop(topic: &str, target: &str) -> BindingRef {
        Binding::from_fn(topic.to_owned(), target.to_owned(), |_ev: Event| async {
            Ok(())
        })
    }

    fn has(set: &[BindingRef], b: &BindingRef) -> bool {
        set.iter().any(|x| Arc::ptr_eq(x, b))
    }

    #[test]
    fn test_insert_preserves_order() {
        let mut reg = Registry::default();
        let a = noop("t", "x");
        let b = noop("t", "x");
        let c = noop("t", "x");
        reg.insert(a.clone());
        reg.insert(b.clone());
        reg.insert(c.clone());

        let got = reg.matching("t", "x");
        assert_eq!(got.len(), 3);
        assert!(Arc::ptr_eq(&got[0], &a));
        assert!(Arc::ptr_eq(&got[1], &b));
        assert!(Arc::ptr_eq(&got[2], &c));
    }

    #[test]
    fn test_remove_by_identity() {
        let mut reg = Registry::default();
        let a = noop("t", "x");
        let b = noop("t", "x");
        reg.insert(a.clone());
        reg.insert(b.clone());

        assert!(reg.remove(&a));
        assert!(!reg.contains(&a));
        assert!(reg.contains(&b));
        assert!(!reg.remove(&a));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_remove_prunes_empty_levels() {
        let mut reg = Registry::default();
        let a = noop("t", "x");
        reg.insert(a.clone());
        assert!(reg.remove(&a));
        assert_eq!(reg.len(), 0);
        assert!(reg.topics.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut reg = Registry::default();
        reg.insert(noop("t", "x"));
        assert!(!reg.remove(&noop("t", "x")));
        assert!(!reg.remove(&noop("other", "y")));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_wildcard_matrix() {
        let mut reg = Registry::default();
        let all = noop("*", "*");
        let exact = noop("X", "Y");
        let any_target_on_x = noop("X", "*");
        let y_on_any_topic = noop("*", "Y");
        for b in [&all, &exact, &any_target_on_x, &y_on_any_topic] {
            reg.insert(b.clone());
        }

        let x_y = reg.matching("X", "Y");
        assert_eq!(x_y.len(), 4);

        let z_y = reg.matching("Z", "Y");
        assert_eq!(z_y.len(), 2);
        assert!(has(&z_y, &all));
        assert!(has(&z_y, &y_on_any_topic));
        assert!(!has(&z_y, &exact));

        let x_q = reg.matching("X", "Q");
        assert_eq!(x_q.len(), 2);
        assert!(has(&x_q, &all));
        assert!(has(&x_q, &any_target_on_x));

        let z_q = reg.matching("Z", "Q");
        assert_eq!(z_q.len(), 1);
        assert!(has(&z_q, &all));
    }

    #[test]
    fn test_wildcard_topic_ignores_topic() {
        let mut reg = Registry::default();
        let on_a = noop("A", "foo");
        let on_b = noop("B", "foo");
        let other = noop("A", "bar");
        reg.insert(on_a.clone());
        reg.insert(on_b.clone());
        reg.insert(other.clone());

        let got = reg.matching("*", "foo");
        assert_eq!(got.len(), 2);
        assert!(has(&got, &on_a));
        assert!(has(&got, &on_b));
    }

    #[test]
    fn test_wildcard_target_in_event_takes_whole_bucket() {
        let mut reg = Registry::default();
        reg.insert(noop("A", "foo"));
        reg.insert(noop("A", "bar"));
        reg.insert(noop("B", "baz"));

        assert_eq!(reg.matching("A", "*").len(), 2);
        assert_eq!(reg.matching("*", "*").len(), 3);
    }

    #[test]
    fn test_exact_before_wildcard_within_bucket() {
        let mut reg = Registry::default();
        let catch_all = noop("T", "*");
        let exact = noop("T", "x");
        reg.insert(catch_all.clone());
        reg.insert(exact.clone());

        let got = reg.matching("T", "x");
        assert!(Arc::ptr_eq(&got[0], &exact));
        assert!(Arc::ptr_eq(&got[1], &catch_all));
    }
}
