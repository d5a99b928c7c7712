//! Repository handle
//!
//! Owns the four areas and the output sink, and exposes the ancestry walker
//! over the commit graph. Commands are implemented as `impl Repository`
//! blocks under `crate::commands`.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::merge::ancestry::AncestryFinder;
use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use std::cell::RefCell;
use std::path::Path;

pub const REPO_DIR: &str = ".jot";
pub const DEFAULT_BRANCH: &str = "master";

const OBJECTS_DIR: &str = "objects";
const INDEX_FILE: &str = "index";

pub struct Repository {
    /// The workspace root
    path: Box<Path>,
    /// Sink for command output, usually stdout
    writer: RefCell<Box<dyn std::io::Write>>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    pub fn new(path: Box<Path>, writer: Box<dyn std::io::Write>) -> Self {
        let repo_path = path.join(REPO_DIR);

        Repository {
            database: Database::new(repo_path.join(OBJECTS_DIR).into_boxed_path()),
            index: RefCell::new(Index::new(repo_path.join(INDEX_FILE).into_boxed_path())),
            workspace: Workspace::new(path.clone()),
            refs: Refs::new(repo_path.into_boxed_path()),
            writer: RefCell::new(writer),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn repo_path(&self) -> std::path::PathBuf {
        self.path.join(REPO_DIR)
    }

    pub fn writer(&self) -> &RefCell<Box<dyn std::io::Write>> {
        &self.writer
    }

    pub fn index(&self) -> &RefCell<Index> {
        &self.index
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Resolve user input as a branch name first, then as a raw object id
    pub fn resolve_revision(&self, revision: &str) -> anyhow::Result<ObjectId> {
        if let Some(oid) = self.refs.read_branch(revision)? {
            return Ok(oid);
        }

        if let Some(oid) = crate::areas::refs::parse_revision_as_oid(revision) {
            if self.database.exists(&oid) {
                return Ok(oid);
            }
        }

        anyhow::bail!("unknown revision '{}'", revision)
    }

    /// Ancestry walker backed by the object database
    pub fn ancestry(
        &self,
    ) -> AncestryFinder<impl Fn(&ObjectId) -> anyhow::Result<SlimCommit> + '_> {
        AncestryFinder::new(|oid: &ObjectId| self.database.slim_commit(oid))
    }
}
