use std::fmt;

use strum::Display;
use tracing::debug;

use super::{TreeIndex, resolve_leaf};
use crate::message::MessageId;

/// Direction of a sibling switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

/// Position of a node among its siblings, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchPosition {
    pub position: usize,
    pub total: usize,
}

impl BranchPosition {
    /// The indicator is only shown where the conversation actually forks
    pub fn is_visible(&self) -> bool {
        self.total > 1
    }

    pub fn has_prev(&self) -> bool {
        self.position > 1
    }

    pub fn has_next(&self) -> bool {
        self.position < self.total
    }

    pub fn can_move(&self, direction: Direction) -> bool {
        match direction {
            Direction::Prev => self.has_prev(),
            Direction::Next => self.has_next(),
        }
    }
}

impl fmt::Display for BranchPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.position, self.total)
    }
}

/// Ordered sibling set of `node_id`: the parent's children, or the root list
/// for parentless nodes. Unknown nodes and dangling parents yield an empty set.
pub fn siblings_of<'s>(index: &'s TreeIndex<'_>, node_id: &str) -> &'s [MessageId] {
    let Some(node) = index.get(node_id) else {
        return &[];
    };

    match node.parent_id() {
        Some(parent_id) => index
            .get(parent_id)
            .map_or(&[][..], |parent| parent.children_ids.as_slice()),
        None => index.root_ids(),
    }
}

/// Where `node_id` sits among its siblings, if it is listed there at all.
pub fn branch_position(index: &TreeIndex<'_>, node_id: &str) -> Option<BranchPosition> {
    let siblings = siblings_of(index, node_id);
    let idx = siblings.iter().position(|id| id == node_id)?;
    Some(BranchPosition {
        position: idx + 1,
        total: siblings.len(),
    })
}

/// Leaf of the neighbouring sibling in `direction`, or `None` at the boundary.
///
/// The returned id is the new active leaf; committing it is up to the caller.
pub fn switch_branch<'a>(
    index: &TreeIndex<'a>,
    node_id: &str,
    direction: Direction,
) -> Option<&'a str> {
    let siblings = siblings_of(index, node_id);
    let idx = siblings.iter().position(|id| id == node_id)?;

    let target_idx = match direction {
        Direction::Prev => idx.checked_sub(1)?,
        Direction::Next => idx + 1,
    };
    let target = siblings.get(target_idx)?;

    match resolve_leaf(index, target) {
        Ok(leaf) => {
            debug!(target: "forkline::tree", from = %node_id, to = %target, %leaf, %direction, "Switched branch");
            Some(leaf)
        }
        Err(e) => {
            debug!(target: "forkline::tree", "Sibling {target} unavailable: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::tree::resolve_path_ids;
    use rstest::rstest;

    fn three_way_fork() -> Vec<Message> {
        vec![
            Message::user("q", "question").with_children(["a1", "a2", "a3"]),
            Message::assistant("a1", "one").with_parent("q"),
            Message::assistant("a2", "two")
                .with_parent("q")
                .with_children(["f1"]),
            Message::user("f1", "follow up").with_parent("a2"),
            Message::assistant("a3", "three").with_parent("q"),
        ]
    }

    #[test]
    fn switch_between_two_leaves() {
        let messages = vec![
            Message::user("A", "root").with_children(["B", "C"]),
            Message::assistant("B", "b").with_parent("A"),
            Message::assistant("C", "c").with_parent("A"),
        ];
        let index = TreeIndex::build(&messages);

        assert_eq!(resolve_path_ids(&index, Some("B")), ["A", "B"]);
        let next = switch_branch(&index, "B", Direction::Next);
        assert_eq!(next, Some("C"));
        assert_eq!(resolve_path_ids(&index, next), ["A", "C"]);
    }

    #[rstest]
    #[case::prev_on_first("a1", Direction::Prev, None)]
    #[case::next_on_last("a3", Direction::Next, None)]
    #[case::next_into_subtree("a1", Direction::Next, Some("f1"))]
    #[case::prev_into_subtree("a3", Direction::Prev, Some("f1"))]
    #[case::prev_to_leaf("a2", Direction::Prev, Some("a1"))]
    fn switch_cases(
        #[case] from: &str,
        #[case] direction: Direction,
        #[case] expected: Option<&str>,
    ) {
        let messages = three_way_fork();
        let index = TreeIndex::build(&messages);
        assert_eq!(switch_branch(&index, from, direction), expected);
    }

    #[rstest]
    #[case::first("a1", 1, 3, true)]
    #[case::middle("a2", 2, 3, true)]
    #[case::only_child("f1", 1, 1, false)]
    #[case::single_root("q", 1, 1, false)]
    fn position_and_visibility(
        #[case] id: &str,
        #[case] position: usize,
        #[case] total: usize,
        #[case] visible: bool,
    ) {
        let messages = three_way_fork();
        let index = TreeIndex::build(&messages);
        let pos = branch_position(&index, id).expect("listed among siblings");
        assert_eq!(pos, BranchPosition { position, total });
        assert_eq!(pos.is_visible(), visible);
    }

    #[test]
    fn indicator_text_is_one_based() {
        let pos = BranchPosition {
            position: 2,
            total: 3,
        };
        assert_eq!(pos.to_string(), "2 / 3");
        assert!(pos.has_prev() && pos.has_next());
        assert!(!BranchPosition { position: 3, total: 3 }.can_move(Direction::Next));
    }

    #[test]
    fn roots_are_siblings_of_each_other() {
        let messages = vec![
            Message::user("r1", "first"),
            Message::user("r2", "second").with_children(["x"]),
            Message::assistant("x", "answer").with_parent("r2"),
        ];
        let index = TreeIndex::build(&messages);

        assert_eq!(siblings_of(&index, "r1"), ["r1", "r2"]);
        assert_eq!(switch_branch(&index, "r1", Direction::Next), Some("x"));
        assert_eq!(switch_branch(&index, "r2", Direction::Prev), Some("r1"));
    }

    #[test]
    fn unknown_or_orphaned_nodes_have_no_siblings() {
        let messages = vec![Message::user("o", "orphan").with_parent("gone")];
        let index = TreeIndex::build(&messages);

        assert!(siblings_of(&index, "o").is_empty());
        assert!(siblings_of(&index, "missing").is_empty());
        assert_eq!(branch_position(&index, "o"), None);
        assert_eq!(switch_branch(&index, "o", Direction::Next), None);
    }
}
