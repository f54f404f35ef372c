//! Branching conversation tree.
//!
//! Everything here is a pure function of the message collection (and the
//! active leaf pointer where one is taken), so callers rebuild on every change
//! instead of tracking invalidation.

pub mod edit;
mod index;
mod leaf;
mod navigator;
mod path;
pub mod validate;

pub use edit::{add_message, latest_leaf, update_message};
pub use index::TreeIndex;
pub use leaf::{
    DEFAULT_MAX_DEPTH, fallback_leaf, resolve_active_leaf, resolve_leaf, resolve_leaf_with_limit,
};
pub use navigator::{BranchPosition, Direction, branch_position, siblings_of, switch_branch};
pub use path::{resolve_path, resolve_path_ids};
pub use validate::{TreeIssue, validate};
