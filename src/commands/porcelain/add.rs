use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::{IndexEntry, Stage};
use crate::artifacts::objects::blob::Blob;
use anyhow::bail;
use std::path::Path;

impl Repository {
    /// Stage files at stage 0, replacing any conflict stages they carried
    ///
    /// Directories are expanded to the files beneath them. A path that is
    /// tracked but missing from the working tree is staged as a removal; an
    /// untracked missing path is an error.
    pub fn add(&self, paths: &[String]) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.borrow_mut();

        index.rehydrate()?;

        for raw_path in paths {
            let path = Path::new(raw_path);

            if !self.workspace().root().join(path).exists() {
                let tracked_paths = index
                    .entries()
                    .map(|entry| entry.path.clone())
                    .filter(|tracked| tracked == path || tracked.starts_with(path))
                    .collect::<Vec<_>>();

                if tracked_paths.is_empty() {
                    bail!("pathspec '{}' did not match any files", raw_path);
                }

                for tracked in tracked_paths {
                    index.remove(&tracked);
                }

                continue;
            }

            for file in self.workspace().list_files(path)? {
                let content = self.workspace().read_file(&file)?;
                let metadata = self.workspace().stat_file(&file)?;

                let blob = Blob::new(content);
                let blob_id = self.database().store(blob)?;

                index.add(IndexEntry::new(file, Stage::Normal, blob_id, metadata));
            }
        }

        index.write_updates()?;

        Ok(())
    }
}
