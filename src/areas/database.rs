use crate::artifacts::diff::Toc;
use crate::artifacts::objects::ObjectStoreError;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Content-addressed object store
///
/// Objects are zlib-compressed files under `.jot/objects/xx/yyyy…`, named
/// by their SHA-1. Writes are idempotent: identical content maps to the
/// same path and is stored once.
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).exists()
    }

    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        self.read_object(object_id, object_path)
    }

    /// Store an object unless an object with the same hash already exists
    pub fn store(&self, object: impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        if !object_path.exists() {
            std::fs::create_dir_all(
                object_path
                    .parent()
                    .context(format!("Invalid object path {}", object_path.display()))?,
            )
            .context(format!(
                "Unable to create object directory {}",
                object_path.display()
            ))?;

            self.write_object(object_path, object.serialize()?)?;
        }

        Ok(object_id)
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(object_reader)?))),
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Tree::deserialize(object_reader)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(
                object_reader,
            )?))),
        }
    }

    /// Parse the object as a blob, failing with `ObjectCorrupt` otherwise
    pub fn blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Blob::deserialize(object_reader),
            _ => Err(ObjectStoreError::ObjectCorrupt {
                oid: object_id.clone(),
                expected: ObjectType::Blob,
            }
            .into()),
        }
    }

    /// Parse the object as a tree, failing with `ObjectCorrupt` otherwise
    pub fn tree(&self, object_id: &ObjectId) -> anyhow::Result<Tree> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Tree => Tree::deserialize(object_reader),
            _ => Err(ObjectStoreError::ObjectCorrupt {
                oid: object_id.clone(),
                expected: ObjectType::Tree,
            }
            .into()),
        }
    }

    /// Parse the object as a commit, failing with `ObjectCorrupt` otherwise
    pub fn commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Commit => Commit::deserialize(object_reader),
            _ => Err(ObjectStoreError::ObjectCorrupt {
                oid: object_id.clone(),
                expected: ObjectType::Commit,
            }
            .into()),
        }
    }

    /// Slim commit view for the ancestry traversal
    pub fn slim_commit(&self, object_id: &ObjectId) -> anyhow::Result<SlimCommit> {
        let commit = self.commit(object_id)?;
        Ok(SlimCommit::new(object_id.clone(), commit.parents().to_vec()))
    }

    /// Flatten a commit's tree into its table of contents
    ///
    /// Resolves commit → tree → recursive flatten into a path→oid mapping.
    pub fn commit_toc(&self, object_id: &ObjectId) -> anyhow::Result<Toc> {
        let commit = self.commit(object_id)?;

        let mut toc = Toc::new();
        self.flatten_tree(commit.tree_oid(), Path::new(""), &mut toc)?;

        Ok(toc)
    }

    fn flatten_tree(&self, tree_oid: &ObjectId, prefix: &Path, toc: &mut Toc) -> anyhow::Result<()> {
        let tree = self.tree(tree_oid)?;

        for (name, node) in tree.entries() {
            let path = prefix.join(name);
            match node.kind {
                ObjectType::Tree => self.flatten_tree(&node.oid, &path, toc)?,
                _ => {
                    toc.insert(path, node.oid.clone());
                }
            }
        }

        Ok(())
    }

    fn parse_object_as_bytes(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<(ObjectType, impl BufRead)> {
        let object_path = self.path.join(object_id.to_path());
        let object_content = self.read_object(object_id, object_path)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_object_type(&mut object_reader)?;

        Ok((object_type, object_reader))
    }

    fn read_object(&self, object_id: &ObjectId, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = match std::fs::read(&object_path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ObjectStoreError::NotFound(object_id.clone()).into());
            }
            Err(err) => {
                return Err(err).context(format!(
                    "Unable to read object file {}",
                    object_path.display()
                ));
            }
        };

        Self::decompress(object_content.into())
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make the write atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}
