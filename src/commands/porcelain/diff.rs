use crate::areas::repository::Repository;
use crate::artifacts::diff::Toc;
use crate::artifacts::diff::toc_diff::{FileStatus, name_status, toc_diff};
use anyhow::bail;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Print a name-status diff, one `<status>\t<path>` line per change
    ///
    /// By default compares the staging area against the working tree;
    /// `cached` compares `HEAD` against the staging area; one revision
    /// compares its snapshot against the working tree; two revisions
    /// compare their committed snapshots.
    pub fn diff(&self, cached: bool, revisions: &[String]) -> anyhow::Result<()> {
        let (receiver_toc, giver_toc) = match revisions {
            [] if cached => {
                let head_toc = match self.refs().read_head()? {
                    Some(head) => self.database().commit_toc(&head)?,
                    None => Toc::new(),
                };

                let index = self.index();
                let mut index = index.borrow_mut();
                index.rehydrate()?;

                (head_toc, index.toc())
            }
            [] => {
                let index = self.index();
                let mut index = index.borrow_mut();
                index.rehydrate()?;

                (index.toc(), self.workspace().toc()?)
            }
            [receiver] => {
                let receiver_oid = self.resolve_revision(receiver)?;

                (
                    self.database().commit_toc(&receiver_oid)?,
                    self.workspace().toc()?,
                )
            }
            [receiver, giver] => {
                let receiver_oid = self.resolve_revision(receiver)?;
                let giver_oid = self.resolve_revision(giver)?;

                (
                    self.database().commit_toc(&receiver_oid)?,
                    self.database().commit_toc(&giver_oid)?,
                )
            }
            _ => bail!("expected at most two revisions"),
        };

        let diff = toc_diff(&receiver_toc, &giver_toc, None);

        for (path, status) in name_status(&diff) {
            let line = format!("{}\t{}", status.status_char(), path.display());

            let line = match status {
                FileStatus::Add => line.green(),
                FileStatus::Delete => line.red(),
                _ => line.yellow(),
            };

            writeln!(self.writer().borrow_mut(), "{}", line)?;
        }

        Ok(())
    }
}
