//! Staging area entry
//!
//! Each entry records one (path, stage) slot: the content hash plus slim
//! file metadata (mtime, size) used for cheap change detection. For any
//! path, either a single stage-0 entry exists (resolved content) or one to
//! three conflict-stage entries do, never both; the staging area enforces
//! that invariant on insert.
//!
//! ## Entry format
//!
//! Binary, 8-byte aligned: mtime (u32), size (u32), 20-byte oid, flags
//! (u16, low bits = stage), null-terminated path, zero padding.

use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Minimum size of an index entry in bytes
pub const ENTRY_MIN_SIZE: usize = 32;

/// Conflict stage of a staging area entry
///
/// Stage 0 is a normal resolved entry. During an unresolved merge a path
/// instead carries the base (1), receiver/ours (2), and giver/theirs (3)
/// content; stage 1 is omitted when the path did not exist in the common
/// ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Stage {
    #[default]
    Normal = 0,
    Base = 1,
    Receiver = 2,
    Giver = 3,
}

impl Stage {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn try_from_u8(value: u8) -> anyhow::Result<Self> {
        match value {
            0 => Ok(Stage::Normal),
            1 => Ok(Stage::Base),
            2 => Ok(Stage::Receiver),
            3 => Ok(Stage::Giver),
            _ => Err(anyhow::anyhow!("Invalid index entry stage: {value}")),
        }
    }

    pub fn is_conflict(&self) -> bool {
        *self != Stage::Normal
    }
}

/// Slim file metadata kept for stage-0 entries
///
/// Conflict-stage entries come from commits rather than the working copy
/// and carry zeroed metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, new)]
pub struct EntryMetadata {
    /// Modification time (seconds since Unix epoch)
    pub mtime: i64,
    /// File size in bytes
    pub size: u64,
}

/// One (path, stage) slot of the staging area
#[derive(Debug, Clone, new)]
pub struct IndexEntry {
    pub path: PathBuf,
    pub stage: Stage,
    pub oid: ObjectId,
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    /// A resolved stage-0 entry without working-copy metadata
    pub fn resolved(path: PathBuf, oid: ObjectId) -> Self {
        IndexEntry::new(path, Stage::Normal, oid, EntryMetadata::default())
    }

    /// A conflict-stage entry sourced from a commit
    pub fn conflicted(path: PathBuf, stage: Stage, oid: ObjectId) -> Self {
        IndexEntry::new(path, stage, oid, EntryMetadata::default())
    }
}

impl PartialEq for IndexEntry {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.stage == other.stage
    }
}

impl Eq for IndexEntry {}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.path, self.stage).cmp(&(&other.path, other.stage))
    }
}

impl Packable for IndexEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let path = self
            .path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid entry path"))?;

        let mut entry_bytes = Vec::new();
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.size as u32)?;
        self.oid.write_binary_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<byteorder::NetworkEndian>(self.stage.as_u8() as u16)?;
        entry_bytes.write_all(path.as_bytes())?;

        // pad with null bytes to the entry block size, at least one
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }
}

impl Unpackable for IndexEntry {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let bytes = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        if bytes.len() < ENTRY_MIN_SIZE {
            return Err(anyhow::anyhow!("Invalid index entry size"));
        }

        let mtime = byteorder::NetworkEndian::read_u32(&bytes[0..4]) as i64;
        let size = byteorder::NetworkEndian::read_u32(&bytes[4..8]) as u64;
        let mut oid_bytes = std::io::Cursor::new(&bytes[8..28]);
        let oid = ObjectId::read_binary_from(&mut oid_bytes)?;
        let flags = byteorder::NetworkEndian::read_u16(&bytes[28..30]);
        let stage = Stage::try_from_u8(flags as u8)?;

        let path_end = bytes[30..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| anyhow::anyhow!("Missing null terminator in entry path"))?;
        let path = PathBuf::from(
            std::str::from_utf8(&bytes[30..30 + path_end])
                .map_err(|_| anyhow::anyhow!("Invalid UTF-8 in entry path"))?,
        );

        Ok(IndexEntry {
            path,
            stage,
            oid,
            metadata: EntryMetadata::new(mtime, size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn oid(seed: u8) -> ObjectId {
        ObjectId::try_parse(format!("{:02x}", seed).repeat(20)).unwrap()
    }

    #[test]
    fn entries_round_trip_through_the_binary_format() {
        let entry = IndexEntry::new(
            PathBuf::from("dir/file.txt"),
            Stage::Giver,
            oid(7),
            EntryMetadata::new(1_640_995_200, 42),
        );

        let bytes = entry.serialize().unwrap();
        assert_eq!(bytes.len() % ENTRY_BLOCK, 0);

        let parsed = IndexEntry::deserialize(Cursor::new(bytes)).unwrap();
        assert_eq!(parsed.path, entry.path);
        assert_eq!(parsed.stage, Stage::Giver);
        assert_eq!(parsed.oid, entry.oid);
        assert_eq!(parsed.metadata, entry.metadata);
    }

    #[test]
    fn entries_order_by_path_then_stage() {
        let a0 = IndexEntry::resolved(PathBuf::from("a"), oid(1));
        let b2 = IndexEntry::conflicted(PathBuf::from("b"), Stage::Receiver, oid(2));
        let b3 = IndexEntry::conflicted(PathBuf::from("b"), Stage::Giver, oid(3));

        let mut entries = vec![b3.clone(), a0.clone(), b2.clone()];
        entries.sort();

        assert_eq!(entries, vec![a0, b2, b3]);
    }

    #[test]
    fn invalid_stage_values_are_rejected() {
        assert!(Stage::try_from_u8(4).is_err());
        assert_eq!(Stage::try_from_u8(2).unwrap(), Stage::Receiver);
    }
}
