//! Fixture builders shared by the workspace's tests.

use crate::message::{Message, Role};
use crate::tree;

/// Build a consistent tree where `parents[i]` names the parent index of node
/// `i`. Parents must precede their children; ids are `m{i}` and roles
/// alternate user/assistant by depth.
pub fn tree_from_parents(parents: &[Option<usize>]) -> Vec<Message> {
    let mut messages: Vec<Message> = Vec::with_capacity(parents.len());
    let mut depths: Vec<usize> = Vec::with_capacity(parents.len());

    for (i, parent) in parents.iter().enumerate() {
        let parent = parent.filter(|p| *p < i);
        let depth = parent.map_or(0, |p| depths[p] + 1);
        let role = if depth % 2 == 0 {
            Role::User
        } else {
            Role::Assistant
        };
        let mut message = Message::new(format!("m{i}"), role, format!("message {i}"));
        if let Some(p) = parent {
            message = message.with_parent(format!("m{p}"));
        }
        tree::add_message(&mut messages, message);
        depths.push(depth);
    }

    messages
}

/// A single unbranched conversation of `len` alternating turns
pub fn linear(len: usize) -> Vec<Message> {
    let parents: Vec<Option<usize>> = (0..len).map(|i| i.checked_sub(1)).collect();
    tree_from_parents(&parents)
}

/// Linear conversation whose message `i` has `lengths[i]` characters of content
pub fn with_lengths(lengths: &[usize]) -> Vec<Message> {
    let mut messages = linear(lengths.len());
    for (message, len) in messages.iter_mut().zip(lengths) {
        message.content = "x".repeat(*len);
    }
    messages
}
