use crate::areas::repository::Repository;
use crate::artifacts::diff::Toc;
use crate::artifacts::diff::toc_diff::{FileStatus, name_status, toc_diff};
use colored::Colorize;
use std::io::Write;
use std::path::Path;

fn status_label(status: FileStatus) -> &'static str {
    match status {
        FileStatus::Add => "new file:",
        FileStatus::Delete => "deleted: ",
        _ => "modified:",
    }
}

impl Repository {
    /// Summarize staged changes, unstaged changes, conflicts, and untracked
    /// files on the current branch
    pub fn status(&self) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.borrow_mut();
        index.rehydrate()?;

        let writer = self.writer();
        let mut writer = writer.borrow_mut();

        writeln!(writer, "On branch {}", self.refs().current_branch()?)?;

        if self.refs().is_merge_in_progress() {
            writeln!(writer, "\nYou have unmerged paths.")?;

            for path in index.conflicted_paths() {
                writeln!(
                    writer,
                    "\t{}",
                    format!("both modified:   {}", path.display()).red()
                )?;
            }
        }

        let head_toc = match self.refs().read_head()? {
            Some(head) => self.database().commit_toc(&head)?,
            None => Toc::new(),
        };
        let index_toc = index.toc();

        let staged_diff = toc_diff(&head_toc, &index_toc, None);
        let staged = name_status(&staged_diff);
        if !staged.is_empty() {
            writeln!(writer, "\nChanges to be committed:")?;

            for (path, status) in staged {
                writeln!(
                    writer,
                    "\t{}",
                    format!("{}   {}", status_label(status), path.display()).green()
                )?;
            }
        }

        if self.refs().is_bare()? {
            return Ok(());
        }

        let workspace_toc = self.workspace().toc()?;

        let conflicted = index.conflicted_paths();
        let unstaged_diff = toc_diff(&index_toc, &workspace_toc, None);
        let unstaged = name_status(&unstaged_diff);
        let unstaged = unstaged
            .into_iter()
            // conflicted paths are reported in the unmerged section instead
            .filter(|(path, _)| !conflicted.contains(Path::new(path)))
            .filter(|(path, status)| match status {
                // files never staged show up as untracked, not unstaged adds
                FileStatus::Add => index.is_tracked(Path::new(path)),
                _ => true,
            })
            .collect::<Vec<_>>();

        if !unstaged.is_empty() {
            writeln!(writer, "\nChanges not staged for commit:")?;

            for (path, status) in unstaged {
                writeln!(
                    writer,
                    "\t{}",
                    format!("{}   {}", status_label(status), path.display()).red()
                )?;
            }
        }

        let untracked = workspace_toc
            .keys()
            .filter(|path| !index.is_tracked(path))
            .collect::<Vec<_>>();

        if !untracked.is_empty() {
            writeln!(writer, "\nUntracked files:")?;

            for path in untracked {
                writeln!(writer, "\t{}", path.display().to_string().red())?;
            }
        }

        Ok(())
    }
}
