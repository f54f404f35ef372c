use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::message::{Message, MessageId};

/// A structural problem in the message collection.
///
/// Issues are diagnostics only; the resolvers already degrade around them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeIssue {
    #[error("duplicate message id {id}")]
    DuplicateId { id: MessageId },
    #[error("message {id} references missing parent {parent_id}")]
    MissingParent { id: MessageId, parent_id: MessageId },
    #[error("message {parent_id} lists missing child {child_id}")]
    MissingChild {
        parent_id: MessageId,
        child_id: MessageId,
    },
    #[error("message {parent_id} lists child {child_id} whose parent is {actual:?}")]
    ChildParentMismatch {
        parent_id: MessageId,
        child_id: MessageId,
        actual: Option<MessageId>,
    },
    #[error("message {id} is its own ancestor")]
    Cycle { id: MessageId },
}

/// Check the referential-integrity and acyclicity invariants.
pub fn validate(messages: &[Message]) -> Vec<TreeIssue> {
    let mut issues = Vec::new();
    let mut by_id: HashMap<&str, &Message> = HashMap::with_capacity(messages.len());

    for message in messages {
        if by_id.insert(message.id(), message).is_some() {
            issues.push(TreeIssue::DuplicateId {
                id: message.id.clone(),
            });
        }
    }

    for message in messages {
        if let Some(parent_id) = message.parent_id() {
            if !by_id.contains_key(parent_id) {
                issues.push(TreeIssue::MissingParent {
                    id: message.id.clone(),
                    parent_id: parent_id.to_string(),
                });
            }
        }

        for child_id in &message.children_ids {
            match by_id.get(child_id.as_str()) {
                None => issues.push(TreeIssue::MissingChild {
                    parent_id: message.id.clone(),
                    child_id: child_id.clone(),
                }),
                Some(child) if child.parent_id() != Some(message.id()) => {
                    issues.push(TreeIssue::ChildParentMismatch {
                        parent_id: message.id.clone(),
                        child_id: child_id.clone(),
                        actual: child.parent_id.clone(),
                    });
                }
                Some(_) => {}
            }
        }
    }

    // Each cycle is reported once, at the first member reached.
    let mut reported: HashSet<&str> = HashSet::new();
    let mut acyclic: HashSet<&str> = HashSet::new();
    for message in messages {
        let mut chain: Vec<&str> = Vec::new();
        let mut on_chain: HashSet<&str> = HashSet::new();
        let mut current = Some(message);

        while let Some(node) = current {
            let id = node.id();
            if acyclic.contains(id) {
                current = None;
                break;
            }
            if !on_chain.insert(id) {
                let start = chain.iter().position(|c| *c == id).unwrap_or(0);
                let members = &chain[start..];
                if members.iter().all(|m| !reported.contains(m)) {
                    issues.push(TreeIssue::Cycle { id: id.to_string() });
                }
                reported.extend(members.iter().copied());
                break;
            }
            chain.push(id);
            current = node.parent_id().and_then(|p| by_id.get(p).copied());
        }

        if current.is_none() {
            acyclic.extend(chain);
        }
    }

    issues
}
