//! Object types and operations
//!
//! All repository content is stored as immutable, content-addressed objects
//! identified by SHA-1 hashes. There are three kinds:
//!
//! - **Blob**: file content (raw bytes)
//! - **Tree**: directory listing (names and object IDs)
//! - **Commit**: snapshot with metadata (parents, author, message, tree)
//!
//! All objects serialize to the format `<type> <size>\0<content>`. Identity
//! is computed purely from content, so writing identical content twice
//! yields the same object.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use thiserror::Error;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Object store failures.
///
/// All variants are fatal to the calling operation: objects are immutable
/// and content-addressed, so a missing or malformed object indicates
/// corruption or an invalid reference, never a transient condition.
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("object {0} not found")]
    NotFound(ObjectId),
    #[error("invalid object id: {0:?}")]
    InvalidHash(String),
    #[error("object {oid} is not a {expected}")]
    ObjectCorrupt { oid: ObjectId, expected: ObjectType },
}
