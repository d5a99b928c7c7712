//! Command implementations
//!
//! Every command is an `impl Repository` block: plumbing commands expose the
//! object store directly, porcelain commands compose the areas into the
//! user-facing workflow.

pub mod plumbing;
pub mod porcelain;
