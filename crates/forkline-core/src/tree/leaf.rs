use std::collections::HashSet;

use tracing::{debug, warn};

use super::TreeIndex;
use crate::error::{Error, Result};

/// Upper bound on descent steps when resolving a leaf.
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Walk from `start_id` to the terminal node of its selected branch.
///
/// At every node the last child is taken, so the most recently created fork
/// is the default continuation. Fails with `NotFound` when `start_id` is not
/// in the index.
pub fn resolve_leaf<'a>(index: &TreeIndex<'a>, start_id: &str) -> Result<&'a str> {
    resolve_leaf_with_limit(index, start_id, DEFAULT_MAX_DEPTH)
}

/// Same as [`resolve_leaf`] with an explicit descent limit.
///
/// Corrupted input never hangs the walk: a cycle, a dangling child id or the
/// depth limit all stop at the current node.
pub fn resolve_leaf_with_limit<'a>(
    index: &TreeIndex<'a>,
    start_id: &str,
    max_depth: usize,
) -> Result<&'a str> {
    let mut current = index
        .get(start_id)
        .ok_or_else(|| Error::NotFound(format!("message {start_id}")))?;
    let mut visited: HashSet<&str> = HashSet::new();

    for _ in 0..max_depth {
        if !visited.insert(current.id()) {
            warn!(target: "forkline::tree", id = %current.id(), "Cycle detected while resolving leaf");
            return Ok(current.id());
        }

        let Some(last_child) = current.children_ids.last() else {
            return Ok(current.id());
        };

        match index.get(last_child) {
            Some(child) => current = child,
            None => {
                warn!(
                    target: "forkline::tree",
                    parent = %current.id(),
                    child = %last_child,
                    "Dangling child reference while resolving leaf"
                );
                return Ok(current.id());
            }
        }
    }

    if current.is_leaf() {
        return Ok(current.id());
    }

    warn!(target: "forkline::tree", id = %current.id(), max_depth, "Exceeded max depth while resolving leaf");
    Ok(current.id())
}

/// Resolved leaf of the last root, or `None` for an empty tree.
pub fn fallback_leaf<'a>(index: &TreeIndex<'a>) -> Option<&'a str> {
    let last_root = index.root_ids().last()?;
    resolve_leaf(index, last_root).ok()
}

/// Turn a requested active pointer into the leaf that should be displayed.
///
/// A missing or unknown pointer degrades to [`fallback_leaf`].
pub fn resolve_active_leaf<'a>(index: &TreeIndex<'a>, requested: Option<&str>) -> Option<&'a str> {
    match requested {
        Some(id) => match resolve_leaf(index, id) {
            Ok(leaf) => Some(leaf),
            Err(e) => {
                debug!(target: "forkline::tree", "Active leaf unavailable ({e}); falling back to last root");
                fallback_leaf(index)
            }
        },
        None => fallback_leaf(index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    fn nested_tree() -> Vec<Message> {
        vec![
            Message::user("A", "start").with_children(["B"]),
            Message::assistant("B", "reply")
                .with_parent("A")
                .with_children(["C", "D"]),
            Message::user("C", "first fork").with_parent("B"),
            Message::user("D", "second fork").with_parent("B"),
        ]
    }

    #[test]
    fn descends_into_last_child_at_every_level() {
        let messages = nested_tree();
        let index = TreeIndex::build(&messages);

        assert_eq!(resolve_leaf(&index, "A").ok(), Some("D"));
        assert_eq!(resolve_leaf(&index, "C").ok(), Some("C"));
    }

    #[test]
    fn resolving_a_leaf_is_a_fixed_point() {
        let messages = nested_tree();
        let index = TreeIndex::build(&messages);

        for id in ["A", "B", "C", "D"] {
            let leaf = resolve_leaf(&index, id).expect("known id");
            assert_eq!(resolve_leaf(&index, leaf).ok(), Some(leaf));
        }
    }

    #[test]
    fn unknown_start_is_not_found() {
        let messages = nested_tree();
        let index = TreeIndex::build(&messages);

        assert!(matches!(
            resolve_leaf(&index, "nope"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn cycle_stops_at_repeated_node() {
        let messages = vec![
            Message::user("x", "x").with_children(["y"]),
            Message::assistant("y", "y").with_parent("x").with_children(["x"]),
        ];
        let index = TreeIndex::build(&messages);

        assert_eq!(resolve_leaf(&index, "x").ok(), Some("x"));
    }

    #[test]
    fn dangling_child_stops_at_parent() {
        let messages = vec![Message::user("p", "p").with_children(["ghost"])];
        let index = TreeIndex::build(&messages);

        assert_eq!(resolve_leaf(&index, "p").ok(), Some("p"));
    }

    #[test]
    fn depth_limit_bounds_the_walk() {
        let messages: Vec<Message> = (0..10)
            .map(|i| {
                let mut m = Message::user(format!("n{i}"), "chain");
                if i > 0 {
                    m = m.with_parent(format!("n{}", i - 1));
                }
                if i < 9 {
                    m = m.with_children([format!("n{}", i + 1)]);
                }
                m
            })
            .collect();
        let index = TreeIndex::build(&messages);

        assert_eq!(resolve_leaf_with_limit(&index, "n0", 3).ok(), Some("n3"));
        assert_eq!(resolve_leaf(&index, "n0").ok(), Some("n9"));
    }

    #[test]
    fn active_leaf_falls_back_to_last_root() {
        let messages = vec![
            Message::user("r1", "first").with_children(["a1"]),
            Message::assistant("a1", "one").with_parent("r1"),
            Message::user("r2", "second").with_children(["a2"]),
            Message::assistant("a2", "two").with_parent("r2"),
        ];
        let index = TreeIndex::build(&messages);

        assert_eq!(resolve_active_leaf(&index, Some("r1")), Some("a1"));
        assert_eq!(resolve_active_leaf(&index, Some("deleted")), Some("a2"));
        assert_eq!(resolve_active_leaf(&index, None), Some("a2"));
        assert_eq!(resolve_active_leaf(&TreeIndex::default(), None), None);
    }
}
