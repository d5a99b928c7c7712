//! Merge algorithms
//!
//! - `ancestry`: commit-graph traversal (ancestor sets, fast-forward
//!   eligibility, common-ancestor discovery)
//! - merge-message construction for the merge-in-progress state

pub mod ancestry;

use crate::artifacts::objects::object_id::ObjectId;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    /// The two commits share no history. This cannot happen for two commits
    /// created in the same repository, but must be surfaced rather than
    /// guessed at.
    #[error("no common ancestor between {a} and {b}")]
    NoCommonAncestor { a: ObjectId, b: ObjectId },
}

/// Build the message recorded for a merge commit
///
/// `"Merge {label} into {current_branch}"`, followed by a `Conflicts:`
/// section listing every conflicted path when any exist. The caller passes
/// conflicted paths already sorted and deduplicated.
pub fn merge_message(label: &str, current_branch: &str, conflicts: &[&Path]) -> String {
    let mut message = format!("Merge {} into {}", label, current_branch);

    if !conflicts.is_empty() {
        message.push_str("\n\nConflicts:\n");
        for path in conflicts {
            message.push_str(&format!("\t{}\n", path.display()));
        }
    }

    message
}
