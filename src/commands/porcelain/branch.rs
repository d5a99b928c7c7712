use crate::areas::repository::Repository;
use anyhow::anyhow;
use std::io::Write;

impl Repository {
    /// Create, list, or delete branches
    ///
    /// With a name, creates a branch at the current `HEAD`; with `delete`,
    /// removes that branch; with neither, lists branches marking the current
    /// one with `*`.
    pub fn branch(&self, name: Option<&str>, delete: Option<&str>) -> anyhow::Result<()> {
        if let Some(branch_name) = delete {
            self.refs().delete_branch(branch_name)?;
            writeln!(self.writer().borrow_mut(), "Deleted branch {}", branch_name)?;
            return Ok(());
        }

        if let Some(branch_name) = name {
            let head = self
                .refs()
                .read_head()?
                .ok_or_else(|| anyhow!("no current HEAD to branch from"))?;

            self.refs().create_branch(branch_name, &head)?;
            return Ok(());
        }

        let current_branch = self.refs().current_branch()?;

        for branch in self.refs().list_branches()? {
            let marker = if branch == current_branch { "*" } else { " " };
            writeln!(self.writer().borrow_mut(), "{} {}", marker, branch)?;
        }

        Ok(())
    }
}
