//! Tree object
//!
//! Trees are directory snapshots: a sorted list of (name, object ID, kind)
//! entries, where a kind is either a blob (file) or a subtree (directory).
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`, each entry `<mode> <name>\0<20-byte oid>`
//! with mode `100644` for blobs and `40000` for subtrees.
//!
//! Trees are built from a flat path→oid mapping (a table of contents) and
//! flattened back into one on read; both directions recurse over subtrees.

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::Path;

const BLOB_MODE: &str = "100644";
const TREE_MODE: &str = "40000";

/// A single entry of a stored tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub oid: ObjectId,
    pub kind: ObjectType,
}

impl TreeNode {
    fn mode(&self) -> &str {
        match self.kind {
            ObjectType::Tree => TREE_MODE,
            _ => BLOB_MODE,
        }
    }
}

/// Directory snapshot: a sorted name→node mapping
#[derive(Debug, Clone, Default)]
pub struct Tree {
    entries: BTreeMap<String, TreeNode>,
}

impl Tree {
    pub fn entries(&self) -> impl Iterator<Item = (&String, &TreeNode)> {
        self.entries.iter()
    }

    /// Build the tree hierarchy for a flat path→oid mapping
    ///
    /// Returns the root tree's object ID together with every tree in the
    /// hierarchy, ordered bottom-up (root last) so callers can store each
    /// subtree before anything references it.
    pub fn build<'e>(
        entries: impl Iterator<Item = (&'e Path, &'e ObjectId)>,
    ) -> anyhow::Result<(ObjectId, Vec<Tree>)> {
        let mut root = TreeBuilder::default();

        for (path, oid) in entries {
            let components = path
                .iter()
                .map(|c| {
                    c.to_str()
                        .map(String::from)
                        .with_context(|| format!("invalid path component in {}", path.display()))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;

            root.insert(&components, oid.clone())?;
        }

        let mut trees = Vec::new();
        let root_oid = root.flatten(&mut trees)?;

        Ok((root_oid, trees))
    }
}

/// Intermediate nested structure used while grouping paths into directories
#[derive(Debug, Default)]
struct TreeBuilder {
    nodes: BTreeMap<String, BuilderNode>,
}

#[derive(Debug)]
enum BuilderNode {
    Leaf(ObjectId),
    Dir(TreeBuilder),
}

impl TreeBuilder {
    fn insert(&mut self, components: &[String], oid: ObjectId) -> anyhow::Result<()> {
        match components {
            [] => anyhow::bail!("empty path in table of contents"),
            [name] => {
                self.nodes.insert(name.clone(), BuilderNode::Leaf(oid));
                Ok(())
            }
            [dir, rest @ ..] => {
                let node = self
                    .nodes
                    .entry(dir.clone())
                    .or_insert_with(|| BuilderNode::Dir(TreeBuilder::default()));

                match node {
                    BuilderNode::Dir(builder) => builder.insert(rest, oid),
                    BuilderNode::Leaf(_) => {
                        anyhow::bail!("path component {dir} is both a file and a directory")
                    }
                }
            }
        }
    }

    /// Post-order flattening: children are pushed before their parent
    fn flatten(self, out: &mut Vec<Tree>) -> anyhow::Result<ObjectId> {
        let mut entries = BTreeMap::new();

        for (name, node) in self.nodes {
            let entry = match node {
                BuilderNode::Leaf(oid) => TreeNode {
                    oid,
                    kind: ObjectType::Blob,
                },
                BuilderNode::Dir(builder) => TreeNode {
                    oid: builder.flatten(out)?,
                    kind: ObjectType::Tree,
                },
            };
            entries.insert(name, entry);
        }

        let tree = Tree { entries };
        let oid = tree.object_id()?;
        out.push(tree);

        Ok(oid)
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();
        for (name, node) in &self.entries {
            content_bytes.write_all(format!("{} {}\0", node.mode(), name).as_bytes())?;
            node.oid.write_binary_to(&mut content_bytes)?;
        }

        let mut tree_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        tree_bytes.write_all(header.as_bytes())?;
        tree_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(tree_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been read
        let mut entries = BTreeMap::new();

        loop {
            let mut mode = Vec::new();
            reader.read_until(b' ', &mut mode)?;
            if mode.is_empty() {
                break;
            }

            let mode = String::from_utf8(mode)?;
            let mode = mode.trim();

            let mut name = Vec::new();
            reader.read_until(b'\0', &mut name)?;
            name.pop();
            let name = String::from_utf8(name)?;

            let oid = ObjectId::read_binary_from(&mut reader)?;
            let kind = if mode == TREE_MODE {
                ObjectType::Tree
            } else {
                ObjectType::Blob
            };

            entries.insert(name, TreeNode { oid, kind });
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|(name, node)| format!("{} {} {}\t{}", node.mode(), node.kind, node.oid, name))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
