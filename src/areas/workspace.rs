//! Working tree
//!
//! File-level view over the directory the repository lives in, ignoring the
//! repository directory itself. The workspace can snapshot itself as a table
//! of contents and replay a classified diff onto disk.

use crate::areas::database::Database;
use crate::artifacts::diff::toc_diff::{FileStatus, TocDiff};
use crate::artifacts::diff::Toc;
use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::areas::repository::REPO_DIR;
use anyhow::anyhow;
use derive_new::new;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Working tree rooted at the repository's parent directory
#[derive(Debug, new)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn root(&self) -> &Path {
        &self.path
    }

    fn is_ignored(entry: &walkdir::DirEntry) -> bool {
        entry.file_name() == REPO_DIR
    }

    /// Every tracked-candidate file under `start`, as paths relative to the
    /// workspace root, sorted
    pub fn list_files(&self, start: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let start = if start.is_absolute() {
            start.to_path_buf()
        } else {
            self.path.join(start)
        };

        if start.is_file() {
            return Ok(vec![start.strip_prefix(&self.path)?.to_path_buf()]);
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(&start)
            .into_iter()
            .filter_entry(|entry| !Workspace::is_ignored(entry))
        {
            let entry = entry?;

            if entry.file_type().is_file() {
                files.push(entry.path().strip_prefix(&self.path)?.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    pub fn read_file(&self, path: &Path) -> anyhow::Result<String> {
        let content = std::fs::read_to_string(self.path.join(path))?;
        Ok(content)
    }

    pub fn stat_file(&self, path: &Path) -> anyhow::Result<EntryMetadata> {
        let metadata = std::fs::metadata(self.path.join(path))?;
        let mtime = metadata
            .modified()?
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|_| anyhow!("file '{}' is modified before the epoch", path.display()))?
            .as_secs() as i64;

        Ok(EntryMetadata::new(mtime, metadata.len()))
    }

    pub fn write_file(&self, path: &Path, content: &str) -> anyhow::Result<()> {
        let full_path = self.path.join(path);

        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(full_path, content)?;
        Ok(())
    }

    /// Remove a file and prune any directories it leaves empty
    pub fn remove_file(&self, path: &Path) -> anyhow::Result<()> {
        let full_path = self.path.join(path);

        if full_path.exists() {
            std::fs::remove_file(&full_path)?;
        }

        let mut parent = full_path.parent();
        while let Some(dir) = parent {
            if dir == self.path.as_ref() {
                break;
            }

            if std::fs::remove_dir(dir).is_err() {
                break;
            }

            parent = dir.parent();
        }

        Ok(())
    }

    /// Snapshot the working tree as a table of contents, hashing each file
    /// without storing it
    pub fn toc(&self) -> anyhow::Result<Toc> {
        let mut toc = Toc::new();

        for path in self.list_files(Path::new(""))? {
            let blob = Blob::new(self.read_file(&path)?);
            toc.insert(path, blob.object_id()?);
        }

        Ok(toc)
    }

    /// Replay a classified diff onto the working tree
    ///
    /// ADD and MODIFY entries are written from the relevant side's blob,
    /// DELETE entries are removed, and CONFLICT entries are materialized as a
    /// composite file with conflict markers so the user can resolve them.
    pub fn apply_diff(
        &self,
        diff: &TocDiff,
        database: &Database,
        theirs_label: &str,
    ) -> anyhow::Result<()> {
        for (path, entry) in diff {
            match entry.status {
                FileStatus::Same => {}
                FileStatus::Add => {
                    let oid = entry
                        .receiver
                        .as_ref()
                        .or(entry.giver.as_ref())
                        .ok_or_else(|| anyhow!("ADD entry without content for '{}'", path.display()))?;
                    self.write_blob(path, oid, database)?;
                }
                FileStatus::Modify => {
                    let oid = entry
                        .giver
                        .as_ref()
                        .ok_or_else(|| anyhow!("MODIFY entry without giver for '{}'", path.display()))?;
                    self.write_blob(path, oid, database)?;
                }
                FileStatus::Delete => {
                    self.remove_file(path)?;
                }
                FileStatus::Conflict => {
                    self.write_conflict_file(path, entry.receiver.as_ref(), entry.giver.as_ref(), database, theirs_label)?;
                }
            }
        }

        Ok(())
    }

    fn write_blob(&self, path: &Path, oid: &ObjectId, database: &Database) -> anyhow::Result<()> {
        let blob = database.blob(oid)?;
        self.write_file(path, blob.content())
    }

    fn write_conflict_file(
        &self,
        path: &Path,
        receiver: Option<&ObjectId>,
        giver: Option<&ObjectId>,
        database: &Database,
        theirs_label: &str,
    ) -> anyhow::Result<()> {
        let ours = match receiver {
            Some(oid) => database.blob(oid)?.content().to_owned(),
            None => String::new(),
        };
        let theirs = match giver {
            Some(oid) => database.blob(oid)?.content().to_owned(),
            None => String::new(),
        };

        let content = format!(
            "<<<<<<< HEAD\n{}=======\n{}>>>>>>> {}\n",
            with_trailing_newline(ours),
            with_trailing_newline(theirs),
            theirs_label
        );

        self.write_file(path, &content)
    }
}

fn with_trailing_newline(mut content: String) -> String {
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_gains_a_trailing_newline_only_when_missing() {
        assert_eq!(with_trailing_newline("a".to_owned()), "a\n");
        assert_eq!(with_trailing_newline("a\n".to_owned()), "a\n");
        assert_eq!(with_trailing_newline(String::new()), "");
    }
}
