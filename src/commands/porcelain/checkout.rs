use crate::areas::repository::Repository;
use crate::artifacts::diff::Toc;
use crate::artifacts::diff::toc_diff::toc_diff;
use crate::artifacts::index::index_entry::IndexEntry;
use anyhow::bail;
use std::io::Write;

impl Repository {
    /// Switch `HEAD` to another branch, rebuilding the staging area and the
    /// working tree from that branch's snapshot
    pub fn checkout(&self, branch_name: &str) -> anyhow::Result<()> {
        if self.refs().is_merge_in_progress() {
            bail!("cannot switch branches while a merge is in progress");
        }

        if self.refs().read_branch(branch_name)?.is_none() {
            bail!("branch '{}' not found", branch_name);
        }

        let old_toc = match self.refs().read_head()? {
            Some(head) => self.database().commit_toc(&head)?,
            None => Toc::new(),
        };

        self.refs().set_head(branch_name)?;

        let new_toc = match self.refs().read_head()? {
            Some(head) => self.database().commit_toc(&head)?,
            None => Toc::new(),
        };

        {
            let index = self.index();
            let mut index = index.borrow_mut();
            index.rehydrate()?;
            index.reset();

            for (path, oid) in &new_toc {
                index.add(IndexEntry::resolved(path.clone(), oid.clone()));
            }

            index.write_updates()?;
        }

        if !self.refs().is_bare()? {
            let diff = toc_diff(&old_toc, &new_toc, None);
            self.workspace()
                .apply_diff(&diff, self.database(), branch_name)?;
        }

        writeln!(
            self.writer().borrow_mut(),
            "Switched to branch '{}'",
            branch_name
        )?;

        Ok(())
    }
}
