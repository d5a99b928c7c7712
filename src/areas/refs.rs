//! Reference store
//!
//! Branch heads, the `HEAD` symref, the repository config and the merge
//! marker files all live under the repository directory and are managed
//! here as plain text files.

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::{Context, anyhow, bail};
use derive_new::new;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const HEAD: &str = "HEAD";
pub const MERGE_HEAD: &str = "MERGE_HEAD";
pub const MERGE_MSG: &str = "MERGE_MSG";
const CONFIG: &str = "config";
const HEADS_DIR: &str = "refs/heads";

const SYMREF_REGEX: &str = r"^ref: (.+)$";

const INVALID_BRANCH_NAME_REGEX: &str = r"(?x)
      ^\.          # begins with .
    | /\.          # a path component begins with .
    | \.\.         # consecutive dots
    | ^/ | /$      # leading or trailing slash
    | \.lock$      # ends with .lock
    | @\{          # reflog-style suffix
    | [\x00-\x20*:?\[\\^~\x7f]
    ";

const BARE_CONFIG_REGEX: &str = r"(?m)^\s*bare\s*=\s*true\s*$";

/// Store for symbolic and direct references under the repository directory
#[derive(Debug, new)]
pub struct Refs {
    /// The repository directory (`.jot`)
    path: Box<Path>,
}

impl Refs {
    fn head_path(&self) -> PathBuf {
        self.path.join(HEAD)
    }

    pub fn heads_path(&self) -> PathBuf {
        self.path.join(HEADS_DIR)
    }

    fn branch_path(&self, branch_name: &str) -> PathBuf {
        self.heads_path().join(branch_name)
    }

    pub fn validate_branch_name(branch_name: &str) -> anyhow::Result<()> {
        let invalid_name = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))?;

        if branch_name.is_empty() || invalid_name.is_match(branch_name) {
            bail!("'{}' is not a valid branch name", branch_name);
        }

        Ok(())
    }

    /// Point `HEAD` at a branch, creating the symref file
    pub fn set_head(&self, branch_name: &str) -> anyhow::Result<()> {
        self.write_ref_file(&self.head_path(), &format!("ref: {}/{}", HEADS_DIR, branch_name))
    }

    /// The branch `HEAD` currently points at
    pub fn current_branch(&self) -> anyhow::Result<String> {
        let head = std::fs::read_to_string(self.head_path())?;
        let head = head.trim();

        let captures = regex::Regex::new(SYMREF_REGEX)?
            .captures(head)
            .ok_or_else(|| anyhow!("HEAD is not a symbolic reference"))?;
        let ref_path = &captures[1];

        ref_path
            .strip_prefix(&format!("{}/", HEADS_DIR))
            .map(str::to_owned)
            .ok_or_else(|| anyhow!("HEAD points outside {}", HEADS_DIR))
    }

    /// The commit `HEAD` resolves to, or `None` on an unborn branch
    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        let branch_name = self.current_branch()?;
        self.read_branch(&branch_name)
    }

    /// Move the branch `HEAD` points at to the given commit
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        let branch_name = self.current_branch()?;
        self.update_branch(&branch_name, oid)
    }

    pub fn read_branch(&self, branch_name: &str) -> anyhow::Result<Option<ObjectId>> {
        let branch_path = self.branch_path(branch_name);

        if !branch_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(branch_path)?;
        Ok(Some(ObjectId::try_parse(content.trim().to_owned())?))
    }

    pub fn update_branch(&self, branch_name: &str, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_ref_file(&self.branch_path(branch_name), oid.as_ref())
    }

    pub fn create_branch(&self, branch_name: &str, oid: &ObjectId) -> anyhow::Result<()> {
        Refs::validate_branch_name(branch_name)?;

        if self.branch_path(branch_name).exists() {
            bail!("a branch named '{}' already exists", branch_name);
        }

        self.update_branch(branch_name, oid)
    }

    pub fn delete_branch(&self, branch_name: &str) -> anyhow::Result<()> {
        if branch_name == self.current_branch()? {
            bail!("cannot delete the current branch '{}'", branch_name);
        }

        let branch_path = self.branch_path(branch_name);
        if !branch_path.exists() {
            bail!("branch '{}' not found", branch_name);
        }

        std::fs::remove_file(branch_path)?;
        Ok(())
    }

    pub fn list_branches(&self) -> anyhow::Result<Vec<String>> {
        let heads_path = self.heads_path();
        let mut branches = Vec::new();

        for entry in WalkDir::new(&heads_path).min_depth(1) {
            let entry = entry?;

            if entry.file_type().is_file() {
                let branch_name = entry
                    .path()
                    .strip_prefix(&heads_path)?
                    .to_string_lossy()
                    .into_owned();
                branches.push(branch_name);
            }
        }

        branches.sort();
        Ok(branches)
    }

    /// Whether the repository was initialized without a working tree
    pub fn is_bare(&self) -> anyhow::Result<bool> {
        let config_path = self.path.join(CONFIG);

        if !config_path.exists() {
            return Ok(false);
        }

        let config = std::fs::read_to_string(config_path)?;
        Ok(regex::Regex::new(BARE_CONFIG_REGEX)?.is_match(&config))
    }

    pub fn write_config(&self, bare: bool) -> anyhow::Result<()> {
        let content = format!("[core]\n\tbare = {}\n", bare);
        std::fs::write(self.path.join(CONFIG), content)?;
        Ok(())
    }

    /// Whether a non-fast-forward merge is awaiting its merge commit
    pub fn is_merge_in_progress(&self) -> bool {
        self.path.join(MERGE_HEAD).exists()
    }

    pub fn read_merge_head(&self) -> anyhow::Result<Option<ObjectId>> {
        let merge_head_path = self.path.join(MERGE_HEAD);

        if !merge_head_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(merge_head_path)?;
        Ok(Some(ObjectId::try_parse(content.trim().to_owned())?))
    }

    pub fn write_merge_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_ref_file(&self.path.join(MERGE_HEAD), oid.as_ref())
    }

    pub fn clear_merge_head(&self) -> anyhow::Result<()> {
        let merge_head_path = self.path.join(MERGE_HEAD);

        if merge_head_path.exists() {
            std::fs::remove_file(merge_head_path)?;
        }

        Ok(())
    }

    pub fn read_merge_msg(&self) -> anyhow::Result<Option<String>> {
        let merge_msg_path = self.path.join(MERGE_MSG);

        if !merge_msg_path.exists() {
            return Ok(None);
        }

        Ok(Some(std::fs::read_to_string(merge_msg_path)?))
    }

    pub fn write_merge_msg(&self, message: &str) -> anyhow::Result<()> {
        std::fs::write(self.path.join(MERGE_MSG), message)?;
        Ok(())
    }

    pub fn clear_merge_msg(&self) -> anyhow::Result<()> {
        let merge_msg_path = self.path.join(MERGE_MSG);

        if merge_msg_path.exists() {
            std::fs::remove_file(merge_msg_path)?;
        }

        Ok(())
    }

    /// Write a ref file under an exclusive lock with a trailing newline
    fn write_ref_file(&self, path: &Path, content: &str) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let mut lock = file_guard::lock(&mut file, file_guard::Lock::Exclusive, 0, 1)?;

        writeln!(&mut *lock, "{}", content)?;
        Ok(())
    }
}

/// Try to interpret user input as a raw object id
pub fn parse_revision_as_oid(revision: &str) -> Option<ObjectId> {
    if revision.len() != OBJECT_ID_LENGTH {
        return None;
    }

    ObjectId::try_parse(revision.to_owned()).ok()
}
