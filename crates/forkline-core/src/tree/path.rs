use std::collections::HashSet;

use tracing::warn;

use super::TreeIndex;
use crate::message::Message;

/// Root-to-leaf sequence ending at `leaf_id`.
///
/// Walks `parent_id` links upward and reverses. A missing leaf yields an
/// empty path; a parent link that does not resolve truncates the path at the
/// last reachable ancestor. A node is never emitted twice.
pub fn resolve_path<'a>(index: &TreeIndex<'a>, leaf_id: Option<&str>) -> Vec<&'a Message> {
    let Some(leaf_id) = leaf_id else {
        return Vec::new();
    };

    let mut path = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = index.get(leaf_id);

    while let Some(message) = current {
        if !seen.insert(message.id()) {
            warn!(target: "forkline::tree", id = %message.id(), "Cycle detected while resolving path");
            break;
        }
        path.push(message);

        current = match message.parent_id() {
            Some(parent_id) => {
                let parent = index.get(parent_id);
                if parent.is_none() {
                    warn!(
                        target: "forkline::tree",
                        id = %message.id(),
                        parent = %parent_id,
                        "Broken parent reference; path truncated"
                    );
                }
                parent
            }
            None => None,
        };
    }

    path.reverse();
    path
}

/// Ids of [`resolve_path`], convenient for comparisons and logging.
pub fn resolve_path_ids<'a>(index: &TreeIndex<'a>, leaf_id: Option<&str>) -> Vec<&'a str> {
    resolve_path(index, leaf_id)
        .into_iter()
        .map(Message::id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forked() -> Vec<Message> {
        vec![
            Message::user("A", "question").with_children(["B", "C"]),
            Message::assistant("B", "first answer").with_parent("A"),
            Message::assistant("C", "second answer").with_parent("A"),
        ]
    }

    #[test]
    fn path_runs_root_to_leaf() {
        let messages = forked();
        let index = TreeIndex::build(&messages);

        assert_eq!(resolve_path_ids(&index, Some("B")), ["A", "B"]);
        assert_eq!(resolve_path_ids(&index, Some("C")), ["A", "C"]);
        assert_eq!(resolve_path_ids(&index, Some("A")), ["A"]);
    }

    #[test]
    fn missing_leaf_gives_empty_path() {
        let messages = forked();
        let index = TreeIndex::build(&messages);

        assert!(resolve_path(&index, None).is_empty());
        assert!(resolve_path(&index, Some("zzz")).is_empty());
    }

    #[test]
    fn broken_parent_truncates_instead_of_failing() {
        let messages = vec![
            Message::assistant("orphan", "lost").with_parent("deleted"),
            Message::user("child", "still here").with_parent("orphan"),
        ];
        let index = TreeIndex::build(&messages);

        assert_eq!(resolve_path_ids(&index, Some("child")), ["orphan", "child"]);
    }

    #[test]
    fn parent_cycle_never_repeats_nodes() {
        let messages = vec![
            Message::user("p", "p").with_parent("q"),
            Message::user("q", "q").with_parent("p"),
        ];
        let index = TreeIndex::build(&messages);

        assert_eq!(resolve_path_ids(&index, Some("p")), ["q", "p"]);
    }
}
