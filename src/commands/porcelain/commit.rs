use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::tree::Tree;
use anyhow::bail;
use std::io::Write;

impl Repository {
    /// Record the staging area as a new commit on the current branch
    ///
    /// Refuses while conflict stages remain. When a merge is in progress the
    /// new commit gets `HEAD` and `MERGE_HEAD` as parents, the message falls
    /// back to the recorded merge message, and the merge marker files are
    /// cleared afterwards.
    pub fn write_commit(&self, message: Option<String>) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.borrow_mut();

        index.rehydrate()?;

        if index.has_conflicts() {
            let conflicts = index
                .conflicted_paths()
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");

            bail!("cannot commit with unresolved conflicts in: {}", conflicts);
        }

        let message = match message {
            Some(message) => message,
            None => match self.refs().read_merge_msg()? {
                Some(merge_msg) => merge_msg,
                None => bail!("no commit message provided"),
            },
        };
        let message = message.trim().to_owned();

        if message.is_empty() {
            bail!("empty commit message");
        }

        let toc = index.toc();
        let (tree_id, trees) = Tree::build(toc.iter().map(|(path, oid)| (path.as_path(), oid)))?;

        for tree in trees {
            self.database().store(tree)?;
        }

        let mut parents = Vec::new();
        if let Some(head) = self.refs().read_head()? {
            parents.push(head);
        }
        if let Some(merge_head) = self.refs().read_merge_head()? {
            parents.push(merge_head);
        }

        let commit = Commit::new(tree_id, parents, Author::load_from_env(), message);
        let is_root = if commit.is_root() { " (root-commit)" } else { "" };

        let commit_id = self.database().store(commit.clone())?;
        self.refs().update_head(&commit_id)?;

        self.refs().clear_merge_head()?;
        self.refs().clear_merge_msg()?;

        writeln!(
            self.writer().borrow_mut(),
            "[{}{} {}] {}",
            self.refs().current_branch()?,
            is_root,
            commit_id.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
