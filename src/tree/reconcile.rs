//! Reconciliation of keyed child caches.
//!
//! A pass never hands out a cached instance: every child returned is a fresh
//! allocation carrying its predecessor's state, so hosts that track rows by
//! object identity pick up expansion changes.

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::tree::node::{ExpandableNode, Node, TreeNode};

/// Keyed cache of child handles in display order.
pub type ChildCache<S> = IndexMap<String, Node<S>>;

/// Fresh instances for every cached child, skipping dropped ones.
pub fn rebuild_children<S>(cache: &ChildCache<S>) -> ChildCache<S>
where
    S: Clone + ExpandableNode,
{
    cache
        .iter()
        .filter(|(_, child)| !child.is_dropped())
        .map(|(key, child)| (key.clone(), child.rebuild()))
        .collect()
}

/// Replace `previous` with the `fetched` items.
///
/// `build` receives a rebuilt copy of the previous child with the same key, or
/// `None` for new keys. Keys missing from `fetched` are not retained and
/// dropped predecessors are treated as absent.
pub fn reconcile_children<I, S>(
    previous: &ChildCache<S>,
    fetched: impl IntoIterator<Item = I>,
    key_of: impl Fn(&I) -> String,
    mut build: impl FnMut(I, Option<Node<S>>) -> Node<S>,
) -> ChildCache<S>
where
    S: Clone + ExpandableNode,
{
    let mut next = IndexMap::new();
    for item in fetched {
        let key = key_of(&item);
        let prior = previous.get(&key).filter(|child| !child.is_dropped()).map(Node::rebuild);
        next.insert(key, build(item, prior));
    }
    next
}

/// Case-insensitive ordering. Equal names keep their fetched order.
pub fn sort_case_insensitive<S>(cache: &mut ChildCache<S>) {
    cache.sort_by(|a, _, b, _| a.to_lowercase().cmp(&b.to_lowercase()));
}

/// Collection ordering: `system.` names after all others, each group case-insensitive.
pub fn collection_order(a: &str, b: &str) -> Ordering {
    let is_system = |name: &str| name.starts_with("system.");
    is_system(a).cmp(&is_system(b)).then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
}

pub fn sort_collections<S>(cache: &mut ChildCache<S>) {
    cache.sort_by(|a, _, b, _| collection_order(a, b));
}

/// Wrap cached children for the host.
pub fn to_tree_nodes<S>(
    cache: &ChildCache<S>,
    wrap: impl Fn(Node<S>) -> TreeNode,
) -> Vec<TreeNode> {
    cache.values().cloned().map(wrap).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Leaf {
        label: String,
        expanded: bool,
        dropped: bool,
    }

    impl ExpandableNode for Leaf {
        fn is_expanded(&self) -> bool {
            self.expanded
        }

        fn cache_is_up_to_date(&self) -> bool {
            true
        }

        fn is_dropped(&self) -> bool {
            self.dropped
        }
    }

    fn leaf(label: &str) -> Node<Leaf> {
        Node::from_state(Leaf { label: label.to_string(), ..Default::default() })
    }

    fn cache_of(labels: &[&str]) -> ChildCache<Leaf> {
        labels.iter().map(|label| (label.to_string(), leaf(label))).collect()
    }

    #[test]
    fn rebuild_allocates_and_skips_dropped() {
        let cache = cache_of(&["a", "b", "c"]);
        cache["b"].lock().dropped = true;
        cache["c"].lock().expanded = true;

        let rebuilt = rebuild_children(&cache);
        assert_eq!(rebuilt.keys().collect::<Vec<_>>(), vec!["a", "c"]);
        assert!(!rebuilt["a"].ptr_eq(&cache["a"]));
        assert!(rebuilt["c"].is_expanded());
    }

    #[test]
    fn reconcile_transplants_matching_keys() {
        let previous = cache_of(&["keep", "gone"]);
        previous["keep"].lock().expanded = true;

        let next = reconcile_children(
            &previous,
            vec!["new", "keep"],
            |name| name.to_string(),
            |name, prior| prior.unwrap_or_else(|| leaf(name)),
        );

        assert_eq!(next.keys().collect::<Vec<_>>(), vec!["new", "keep"]);
        assert!(next["keep"].is_expanded());
        assert!(!next["keep"].ptr_eq(&previous["keep"]));
        assert!(!next["new"].is_expanded());
    }

    #[test]
    fn dropped_predecessor_is_not_transplanted() {
        let previous = cache_of(&["db"]);
        {
            let mut state = previous["db"].lock();
            state.dropped = true;
            state.expanded = true;
        }

        let next = reconcile_children(&previous, vec!["db"], |n| n.to_string(), |n, prior| {
            prior.unwrap_or_else(|| leaf(n))
        });
        assert!(!next["db"].is_expanded());
        assert!(!next["db"].is_dropped());
    }

    #[test]
    fn collections_sort_system_last() {
        let mut cache = cache_of(&[
            "AAA",
            "aaa",
            "zzz",
            "ZZZ",
            "system.views",
            "system.buckets.aaa",
            "111_abc",
        ]);
        sort_collections(&mut cache);

        let labels: Vec<String> = cache.values().map(|node| node.lock().label.clone()).collect();
        assert_eq!(
            labels,
            vec!["111_abc", "AAA", "aaa", "zzz", "ZZZ", "system.buckets.aaa", "system.views"]
        );
    }

    #[test]
    fn case_insensitive_sort_is_stable() {
        let mut cache = cache_of(&["b", "B", "a"]);
        sort_case_insensitive(&mut cache);
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["a", "b", "B"]);
    }
}
