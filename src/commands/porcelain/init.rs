use crate::areas::repository::{DEFAULT_BRANCH, Repository};
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    /// Create the repository directory layout and the initial references
    ///
    /// Idempotent over an existing repository: directories and files that
    /// already exist are left untouched.
    pub fn init(&self, bare: bool) -> anyhow::Result<()> {
        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create the objects directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create the refs/heads directory")?;

        self.refs()
            .set_head(DEFAULT_BRANCH)
            .context("Failed to create the initial HEAD reference")?;

        self.refs()
            .write_config(bare)
            .context("Failed to write the repository config")?;

        let index = self.index().borrow();
        if !index.path().exists() {
            fs::write(index.path(), b"").context("Failed to create the index file")?;
        }

        writeln!(
            self.writer().borrow_mut(),
            "Initialized empty jot repository in {}",
            self.repo_path().display()
        )?;

        Ok(())
    }
}
