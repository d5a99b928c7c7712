//! Table-of-contents diffing
//!
//! A table of contents (TOC) is the flattened path→oid view of a commit's
//! tree, derived per operation and never mutated. The diff engine classifies
//! every path across two or three TOCs; it never touches storage itself.

pub mod toc_diff;

use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Flattened path→oid view of a commit's file tree
pub type Toc = BTreeMap<PathBuf, ObjectId>;
