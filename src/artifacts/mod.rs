//! Data structures and algorithms
//!
//! - `diff`: table-of-contents diffing with three-way classification
//! - `index`: staging area entry types and file format
//! - `merge`: ancestry traversal and merge-message construction
//! - `objects`: object types (blob, tree, commit)

pub mod diff;
pub mod index;
pub mod merge;
pub mod objects;
