//! Object identifier (SHA-1 hash)
//!
//! Object IDs are 40-character hexadecimal strings identifying every object
//! in the repository (blobs, trees, commits).
//!
//! ## Storage
//!
//! Objects live under `.jot/objects/<first-2-chars>/<remaining-38-chars>`.

use crate::artifacts::objects::{OBJECT_ID_LENGTH, ObjectStoreError};
use std::io;
use std::path::PathBuf;

/// Object identifier (SHA-1 hash)
///
/// A validated 40-character hexadecimal string. Lexicographic ordering on
/// the hex form is used wherever a deterministic ordering of a pair of
/// object IDs is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// Fails with [`ObjectStoreError::InvalidHash`] when the string is
    /// empty, has the wrong length, or contains non-hex characters.
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH || !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ObjectStoreError::InvalidHash(id).into());
        }
        Ok(Self(id))
    }

    /// Write the object ID in binary form (20 bytes)
    ///
    /// Used when serializing tree and commit entries and index entries.
    pub fn write_binary_to<W: io::Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        for i in (0..OBJECT_ID_LENGTH).step_by(2) {
            let byte = u8::from_str_radix(&self.0[i..i + 2], 16)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "Invalid hex digit"))?;
            writer.write_all(&[byte])?;
        }

        Ok(())
    }

    /// Read an object ID from binary form (20 bytes)
    pub fn read_binary_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut bytes = [0u8; OBJECT_ID_LENGTH / 2];
        reader.read_exact(&mut bytes)?;

        let mut hex = String::with_capacity(OBJECT_ID_LENGTH);
        for byte in bytes {
            hex.push_str(&format!("{byte:02x}"));
        }

        Self::try_parse(hex)
    }

    /// Convert to the file system path used for object storage
    ///
    /// Splits the hash as `xx/yyyy...` where `xx` is the first 2 chars.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters of the hash, for display
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::ObjectStoreError;

    #[test]
    fn parses_a_valid_forty_char_hex_string() {
        let id = "a".repeat(40);
        let oid = ObjectId::try_parse(id.clone()).unwrap();
        assert_eq!(oid.as_ref(), id);
    }

    #[test]
    fn rejects_empty_and_malformed_ids() {
        for bad in ["", "abc", &"z".repeat(40), &"a".repeat(39)] {
            let err = ObjectId::try_parse(bad.to_string()).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ObjectStoreError>(),
                Some(ObjectStoreError::InvalidHash(_))
            ));
        }
    }

    #[test]
    fn binary_round_trip_preserves_the_hash() {
        let oid = ObjectId::try_parse("0123456789abcdef0123456789abcdef01234567".into()).unwrap();

        let mut buffer = Vec::new();
        oid.write_binary_to(&mut buffer).unwrap();
        assert_eq!(buffer.len(), 20);

        let mut reader = std::io::Cursor::new(buffer);
        let parsed = ObjectId::read_binary_from(&mut reader).unwrap();
        assert_eq!(parsed, oid);
    }

    #[test]
    fn storage_path_splits_after_two_chars() {
        let oid = ObjectId::try_parse("0123456789abcdef0123456789abcdef01234567".into()).unwrap();
        assert_eq!(
            oid.to_path(),
            PathBuf::from("01").join("23456789abcdef0123456789abcdef01234567")
        );
    }
}
