//! Commit object
//!
//! Commits are snapshots of the repository: a tree object ID, zero or more
//! parent commit IDs (zero only for the root commit, two for a merge
//! commit), author information, and a message.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-oid>
//! parent <parent-oid>
//! author <name> <email> <timestamp> <timezone>
//!
//! <message>
//! ```

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

/// Commit author: name, email, and timestamp with timezone
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    /// Load author information from `JOT_AUTHOR_NAME` / `JOT_AUTHOR_EMAIL`,
    /// falling back to a generic local identity when unset
    pub fn load_from_env() -> Self {
        let name = std::env::var("JOT_AUTHOR_NAME").unwrap_or_else(|_| "Jot User".to_string());
        let email =
            std::env::var("JOT_AUTHOR_EMAIL").unwrap_or_else(|_| "jot@localhost".to_string());

        Author::new(name, email)
    }

    /// Format as `Name <email> timestamp timezone`
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Format: "name <email> timestamp timezone"
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(anyhow::anyhow!("Invalid author format"));
        }

        let timezone = parts[0];
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("Invalid timestamp"))?;
        let name_email = parts[2];

        let email_start = name_email
            .find('<')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '<'"))?;
        let email_end = name_email
            .find('>')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '>'"))?;

        let name = name_email[..email_start].trim().to_string();
        let email = name_email[email_start + 1..email_end].to_string();

        let datetime = chrono::DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid timestamp"))?;
        let datetime = chrono::DateTime::parse_from_str(
            &format!("{} {}", datetime.format("%Y-%m-%d %H:%M:%S"), timezone),
            "%Y-%m-%d %H:%M:%S %z",
        )
        .map_err(|_| anyhow::anyhow!("Invalid timezone"))?;

        Ok(Author {
            name,
            email,
            timestamp: datetime,
        })
    }
}

/// Snapshot of the repository at one point in its history
#[derive(Debug, Clone, new)]
pub struct Commit {
    tree: ObjectId,
    parents: Vec<ObjectId>,
    author: Author,
    message: String,
}

impl Commit {
    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() == 2
    }
}

/// Slim commit view carrying only what ancestry traversal needs
#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct SlimCommit {
    pub oid: ObjectId,
    pub parents: Vec<ObjectId>,
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();
        writeln!(content_bytes, "tree {}", self.tree)?;
        for parent in &self.parents {
            writeln!(content_bytes, "parent {}", parent)?;
        }
        writeln!(content_bytes, "author {}", self.author.display())?;
        writeln!(content_bytes)?;
        write!(content_bytes, "{}", self.message)?;

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been read
        let mut tree = None;
        let mut parents = Vec::new();
        let mut author = None;

        loop {
            let mut line = String::new();
            reader.read_line(&mut line)?;
            let line = line.trim_end_matches('\n');

            if line.is_empty() {
                break;
            }

            match line.split_once(' ') {
                Some(("tree", oid)) => tree = Some(ObjectId::try_parse(oid.to_string())?),
                Some(("parent", oid)) => parents.push(ObjectId::try_parse(oid.to_string())?),
                Some(("author", rest)) => author = Some(Author::try_from(rest)?),
                _ => return Err(anyhow::anyhow!("Invalid commit header line: {line}")),
            }
        }

        let mut message = String::new();
        reader.read_to_string(&mut message)?;

        Ok(Commit {
            tree: tree.ok_or_else(|| anyhow::anyhow!("Commit without a tree"))?,
            parents,
            author: author.ok_or_else(|| anyhow::anyhow!("Commit without an author"))?,
            message,
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        format!(
            "tree {}\n{}author {}\n\n{}",
            self.tree,
            self.parents
                .iter()
                .map(|p| format!("parent {}\n", p))
                .collect::<String>(),
            self.author.display(),
            self.message
        )
    }
}
