//! Staging area file format
//!
//! The staging area (index) records the content intended for the next
//! commit, keyed by (path, stage). Stage 0 is a normal resolved entry;
//! stages 1/2/3 are the conflict markers holding the base, receiver (ours),
//! and giver (theirs) content of an unresolved merge.
//!
//! ## File format
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "JIDX" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length, 8-byte aligned):
//!   - mtime, size, oid, flags (stage), null-terminated path
//!
//! Checksum (20 bytes):
//!   - SHA-1 of all preceding bytes
//! ```

pub mod checksum;
pub mod index_entry;
pub mod index_header;

/// Size of the trailing SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of the index header in bytes
pub const HEADER_SIZE: usize = 12;

/// Magic signature identifying index files
pub const SIGNATURE: &str = "JIDX";

/// Index file format version
pub const VERSION: u32 = 1;
