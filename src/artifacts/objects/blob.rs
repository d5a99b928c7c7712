//! Blob object
//!
//! Blobs store file content. They contain only the raw data; names live in
//! trees. On disk: `blob <size>\0<content>`.

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

/// File content, identified by the SHA-1 of its serialized form
#[derive(Debug, Clone, new)]
pub struct Blob {
    content: String,
}

impl Blob {
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let content_bytes = self.content.as_bytes();

        let mut blob_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        blob_bytes.write_all(header.as_bytes())?;
        blob_bytes.write_all(content_bytes)?;

        Ok(Bytes::from(blob_bytes))
    }
}

impl Unpackable for Blob {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been read
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        let content = String::from_utf8(content)?;
        Ok(Self::new(content))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }

    fn display(&self) -> String {
        self.content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_hashes_to_the_same_object_id() {
        let first = Blob::new("hello world\n".to_string());
        let second = Blob::new("hello world\n".to_string());

        assert_eq!(first.object_id().unwrap(), second.object_id().unwrap());
    }

    #[test]
    fn different_content_hashes_to_different_object_ids() {
        let first = Blob::new("one".to_string());
        let second = Blob::new("two".to_string());

        assert_ne!(first.object_id().unwrap(), second.object_id().unwrap());
    }
}
