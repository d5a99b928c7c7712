//! Staging area (index)
//!
//! The staging area is the single surface both plain commits and merges
//! write through: a persisted mapping from (path, stage) to content hash.
//! Stage 0 holds resolved content; stages 1–3 hold the base/receiver/giver
//! sides of an unresolved conflict.
//!
//! The invariant that a path carries either one stage-0 entry or only
//! conflict-stage entries is enforced here on every insert.

use crate::artifacts::diff::Toc;
use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{ENTRY_BLOCK, ENTRY_MIN_SIZE, IndexEntry, Stage};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use anyhow::anyhow;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

/// Staging area, persisted with a checksummed binary format
#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.jot/index`)
    path: Box<Path>,
    /// Entries keyed by (path, stage)
    entries: BTreeMap<(PathBuf, Stage), IndexEntry>,
    /// Index file header metadata
    header: IndexHeader,
    /// Whether the in-memory state diverged from disk
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            header: IndexHeader::empty(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.header = IndexHeader::empty();
        self.changed = false;
    }

    /// Load the index from disk
    ///
    /// Parses the header and entries and verifies the trailing checksum.
    /// A missing or empty file yields an empty staging area.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the index file during reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        if !self.path().exists() {
            self.clear();
            std::fs::File::create(self.path())?;
        }

        let mut index_file = std::fs::OpenOptions::new().read(true).open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        self.clear();

        if lock.deref_mut().metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(lock);
        let entries_count = self.parse_header(&mut reader)?;
        self.parse_entries(entries_count, &mut reader)?;

        reader.verify()
    }

    fn parse_header(&self, reader: &mut Checksum) -> anyhow::Result<u32> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header_reader = std::io::Cursor::new(header_bytes);
        let header = IndexHeader::deserialize(header_reader)?;

        if header.marker != SIGNATURE {
            return Err(anyhow!("Invalid index file signature"));
        }

        if header.version != VERSION {
            return Err(anyhow!(
                "Unsupported index file version: {}",
                header.version
            ));
        }

        Ok(header.entries_count)
    }

    /// Parse all entries, handling variable-length paths with 8-byte alignment
    fn parse_entries(&mut self, entries_count: u32, reader: &mut Checksum) -> anyhow::Result<()> {
        for _ in 0..entries_count {
            let entry_bytes = reader.read(ENTRY_MIN_SIZE)?;
            let mut entry_bytes = entry_bytes.to_vec();

            while entry_bytes[entry_bytes.len() - 1] != 0 {
                entry_bytes = [entry_bytes, reader.read(ENTRY_BLOCK)?.to_vec()].concat();
            }

            let entry_bytes = Bytes::from(entry_bytes);
            let entry_reader = std::io::Cursor::new(entry_bytes);
            let entry = IndexEntry::deserialize(entry_reader)?;

            self.entries
                .insert((entry.path.clone(), entry.stage), entry);
        }

        self.header.entries_count = entries_count;

        Ok(())
    }

    /// Persist the staging area
    ///
    /// # Locking
    ///
    /// Acquires an exclusive lock on the index file; the write is durable
    /// before this returns.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())?;
        let lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;

        let mut writer = Checksum::new(lock);

        self.header = IndexHeader {
            entries_count: self.entries.len() as u32,
            ..self.header.clone()
        };
        let header_bytes = self.header.serialize()?;
        writer.write(&header_bytes)?;

        for entry in self.entries.values() {
            let entry_bytes = entry.serialize()?;
            writer.write(&entry_bytes)?;
        }

        writer.write_checksum()?;
        self.changed = false;

        Ok(())
    }

    /// Drop every entry, leaving an empty staging area
    pub fn reset(&mut self) {
        self.entries.clear();
        self.header.entries_count = 0;
        self.changed = true;
    }

    /// Insert an entry, enforcing the stage invariant for its path
    ///
    /// A stage-0 insert removes any conflict-stage entries for the path; a
    /// conflict-stage insert removes the stage-0 entry. A path therefore
    /// never holds both forms at once.
    pub fn add(&mut self, entry: IndexEntry) {
        if entry.stage == Stage::Normal {
            for stage in [Stage::Base, Stage::Receiver, Stage::Giver] {
                self.entries.remove(&(entry.path.clone(), stage));
            }
        } else {
            self.entries.remove(&(entry.path.clone(), Stage::Normal));
        }

        self.entries.insert((entry.path.clone(), entry.stage), entry);
        self.header.entries_count = self.entries.len() as u32;
        self.changed = true;
    }

    /// Remove all stages of a path
    pub fn remove(&mut self, path: &Path) {
        for stage in [Stage::Normal, Stage::Base, Stage::Receiver, Stage::Giver] {
            self.entries.remove(&(path.to_path_buf(), stage));
        }

        self.header.entries_count = self.entries.len() as u32;
        self.changed = true;
    }

    pub fn entry(&self, path: &Path, stage: Stage) -> Option<&IndexEntry> {
        self.entries.get(&(path.to_path_buf(), stage))
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    /// Whether any stage of the path is tracked
    pub fn is_tracked(&self, path: &Path) -> bool {
        [Stage::Normal, Stage::Base, Stage::Receiver, Stage::Giver]
            .iter()
            .any(|stage| self.entries.contains_key(&(path.to_path_buf(), *stage)))
    }

    /// Whether any unresolved conflict entries remain
    pub fn has_conflicts(&self) -> bool {
        self.entries.values().any(|entry| entry.stage.is_conflict())
    }

    /// Sorted, deduplicated paths currently in conflict
    pub fn conflicted_paths(&self) -> BTreeSet<&Path> {
        self.entries
            .values()
            .filter(|entry| entry.stage.is_conflict())
            .map(|entry| entry.path.as_path())
            .collect()
    }

    /// Flatten the resolved (stage-0) entries into a table of contents
    pub fn toc(&self) -> Toc {
        self.entries
            .values()
            .filter(|entry| entry.stage == Stage::Normal)
            .map(|entry| (entry.path.clone(), entry.oid.clone()))
            .collect()
    }
}
