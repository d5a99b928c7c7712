use crate::areas::repository::Repository;
use crate::artifacts::diff::Toc;
use crate::artifacts::diff::toc_diff::{FileStatus, TocDiff, conflicted_paths, toc_diff};
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::merge::merge_message;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::{anyhow, bail};
use std::collections::BTreeSet;
use std::io::Write;

impl Repository {
    /// Merge another branch or commit into the current branch
    ///
    /// Fast-forwards when the current head is already contained in the
    /// giver's history; otherwise performs a three-way merge against the
    /// common ancestor, staging conflicts for manual resolution and
    /// committing automatically when there are none.
    pub fn merge(&self, target: &str) -> anyhow::Result<()> {
        if self.refs().is_merge_in_progress() {
            bail!("a merge is already in progress (MERGE_HEAD exists)");
        }

        let giver = self.resolve_revision(target)?;
        let receiver = self.refs().read_head()?;

        let ancestry = self.ancestry();

        if ancestry.is_up_to_date(receiver.as_ref(), &giver)? {
            writeln!(self.writer().borrow_mut(), "Already up to date.")?;
            return Ok(());
        }

        if ancestry.can_fast_forward(receiver.as_ref(), &giver)? {
            return self.write_fast_forward_merge(receiver.as_ref(), &giver, target);
        }

        let receiver = receiver.ok_or_else(|| anyhow!("current branch has no commits"))?;
        self.write_non_fast_forward_merge(&receiver, &giver, target)
    }

    /// Move the current branch to the giver without creating a merge commit
    fn write_fast_forward_merge(
        &self,
        receiver: Option<&ObjectId>,
        giver: &ObjectId,
        label: &str,
    ) -> anyhow::Result<()> {
        let old_toc = match receiver {
            Some(oid) => self.database().commit_toc(oid)?,
            None => Toc::new(),
        };
        let giver_toc = self.database().commit_toc(giver)?;

        self.refs().update_head(giver)?;

        {
            let index = self.index();
            let mut index = index.borrow_mut();
            index.rehydrate()?;
            index.reset();

            for (path, oid) in &giver_toc {
                index.add(IndexEntry::resolved(path.clone(), oid.clone()));
            }

            index.write_updates()?;
        }

        if !self.refs().is_bare()? {
            let diff = toc_diff(&old_toc, &giver_toc, None);
            self.workspace().apply_diff(&diff, self.database(), label)?;
        }

        writeln!(
            self.writer().borrow_mut(),
            "Updating {}..{}\nFast-forward",
            receiver.map(ObjectId::to_short_oid).unwrap_or_default(),
            giver.to_short_oid()
        )?;

        Ok(())
    }

    /// Three-way merge against the common ancestor
    ///
    /// Sets `MERGE_HEAD` and the merge message, stages the classified diff,
    /// and materializes it in the working tree. Without conflicts the merge
    /// commit is created immediately; with conflicts the repository is left
    /// in the merging state for the user to resolve and commit.
    fn write_non_fast_forward_merge(
        &self,
        receiver: &ObjectId,
        giver: &ObjectId,
        label: &str,
    ) -> anyhow::Result<()> {
        let base = self.ancestry().common_ancestor(receiver, giver)?;

        let base_toc = self.database().commit_toc(&base)?;
        let receiver_toc = self.database().commit_toc(receiver)?;
        let giver_toc = self.database().commit_toc(giver)?;

        let diff = toc_diff(&receiver_toc, &giver_toc, Some(&base_toc));
        let conflicts = conflicted_paths(&diff);

        self.refs().write_merge_head(giver)?;
        self.refs().write_merge_msg(&merge_message(
            label,
            &self.refs().current_branch()?,
            &conflicts,
        ))?;

        self.write_merge_index(&diff)?;

        if !self.refs().is_bare()? {
            self.workspace().apply_diff(&diff, self.database(), label)?;
        }

        if conflicts.is_empty() {
            return self.write_commit(None);
        }

        let writer = self.writer();
        let mut writer = writer.borrow_mut();

        for path in &conflicts {
            writeln!(
                writer,
                "CONFLICT (content): Merge conflict in {}",
                path.display()
            )?;
        }

        writeln!(
            writer,
            "Automatic merge failed; fix conflicts and then commit the result."
        )?;

        Ok(())
    }

    /// Rebuild the staging area from a classified merge diff
    ///
    /// CONFLICT entries become stages 1-3 (stage 1 only when the ancestor
    /// held the path), MODIFY entries stage the giver's content at stage 0,
    /// SAME and ADD entries stage whichever side holds content, and DELETE
    /// entries are dropped.
    fn write_merge_index(&self, diff: &TocDiff) -> anyhow::Result<()> {
        use crate::artifacts::index::index_entry::Stage;

        let index = self.index();
        let mut index = index.borrow_mut();

        index.rehydrate()?;
        index.reset();

        for (path, entry) in diff {
            match entry.status {
                FileStatus::Conflict => {
                    if let Some(base) = &entry.base {
                        index.add(IndexEntry::conflicted(path.clone(), Stage::Base, base.clone()));
                    }
                    if let Some(receiver) = &entry.receiver {
                        index.add(IndexEntry::conflicted(
                            path.clone(),
                            Stage::Receiver,
                            receiver.clone(),
                        ));
                    }
                    if let Some(giver) = &entry.giver {
                        index.add(IndexEntry::conflicted(
                            path.clone(),
                            Stage::Giver,
                            giver.clone(),
                        ));
                    }
                }
                FileStatus::Modify => {
                    if let Some(giver) = &entry.giver {
                        index.add(IndexEntry::resolved(path.clone(), giver.clone()));
                    }
                }
                FileStatus::Same | FileStatus::Add => {
                    if let Some(oid) = entry.receiver.as_ref().or(entry.giver.as_ref()) {
                        index.add(IndexEntry::resolved(path.clone(), oid.clone()));
                    }
                }
                FileStatus::Delete => {}
            }
        }

        index.write_updates()
    }

    /// Abandon an in-progress merge and restore the pre-merge state
    pub fn merge_abort(&self) -> anyhow::Result<()> {
        if !self.refs().is_merge_in_progress() {
            bail!("there is no merge to abort (MERGE_HEAD missing)");
        }

        let head = self
            .refs()
            .read_head()?
            .ok_or_else(|| anyhow!("current branch has no commits"))?;
        let head_toc = self.database().commit_toc(&head)?;

        let tracked = {
            let index = self.index();
            let mut index = index.borrow_mut();
            index.rehydrate()?;

            let tracked = index
                .entries()
                .map(|entry| entry.path.clone())
                .collect::<BTreeSet<_>>();

            index.reset();

            for (path, oid) in &head_toc {
                index.add(IndexEntry::resolved(path.clone(), oid.clone()));
            }

            index.write_updates()?;
            tracked
        };

        if !self.refs().is_bare()? {
            // only paths the merge could have touched are restored; files
            // unknown to both the staging area and HEAD stay untouched
            let mut workspace_toc = self.workspace().toc()?;
            workspace_toc.retain(|path, _| tracked.contains(path) || head_toc.contains_key(path));

            let diff = toc_diff(&workspace_toc, &head_toc, None);
            self.workspace()
                .apply_diff(&diff, self.database(), "HEAD")?;
        }

        self.refs().clear_merge_head()?;
        self.refs().clear_merge_msg()?;

        Ok(())
    }
}
