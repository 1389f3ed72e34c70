//! Object identifier (SHA-1 hash)
//!
//! Object IDs are 40-character lowercase hexadecimal strings. They are the
//! sole address of a stored object.
//!
//! ## Storage
//!
//! Objects are stored in `<objects>/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::core::error::{BitError, BitResult};
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use std::io;
use std::path::PathBuf;

/// Object identifier (SHA-1 hash)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// Uppercase digits are normalized so that equal digests compare equal.
    pub fn try_parse(id: String) -> BitResult<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(BitError::InvalidObject(format!(
                "invalid object ID length: {}",
                id.len()
            )));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(BitError::InvalidObject(format!(
                "invalid object ID characters: {id}"
            )));
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Build an object ID from a finished SHA-1 digest
    pub fn from_digest(digest: &[u8]) -> BitResult<Self> {
        let hex = digest.iter().map(|byte| format!("{byte:02x}")).collect();
        Self::try_parse(hex)
    }

    /// Write the object ID in binary format (20 bytes)
    pub fn write_h40_to<W: io::Write>(&self, writer: &mut W) -> BitResult<()> {
        let hex40 = self.as_ref();

        for i in (0..OBJECT_ID_LENGTH).step_by(2) {
            let byte = u8::from_str_radix(&hex40[i..i + 2], 16)
                .map_err(|_| BitError::InvalidObject(format!("invalid hex digit in {hex40}")))?;
            writer
                .write_all(&[byte])
                .map_err(|e| BitError::InvalidObject(format!("unable to write object id: {e}")))?;
        }

        Ok(())
    }

    /// Read an object ID from binary format (20 bytes)
    pub fn read_h40_from<R: io::Read + ?Sized>(reader: &mut R) -> BitResult<Self> {
        let mut raw = [0u8; OBJECT_ID_LENGTH / 2];
        reader
            .read_exact(&mut raw)
            .map_err(|_| BitError::InvalidObject("unexpected EOF in object id".to_string()))?;

        Self::from_digest(&raw)
    }

    /// Convert to file system path for object storage
    ///
    /// `abc123...` becomes `ab/c123...`
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
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
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const OID: &str = "ce013625030ba8dba906f756967f9e9ca394464a";

    #[rstest]
    #[case("abc")]
    #[case("zz013625030ba8dba906f756967f9e9ca394464a")]
    #[case("ce013625030ba8dba906f756967f9e9ca394464a00")]
    fn rejects_malformed_ids(#[case] id: &str) {
        assert!(ObjectId::try_parse(id.to_string()).is_err());
    }

    #[test]
    fn normalizes_uppercase_ids() {
        let oid = ObjectId::try_parse(OID.to_uppercase()).unwrap();
        assert_eq!(oid.as_ref(), OID);
    }

    #[test]
    fn shards_path_by_first_two_characters() {
        let oid = ObjectId::try_parse(OID.to_string()).unwrap();
        assert_eq!(
            oid.to_path(),
            PathBuf::from("ce").join("013625030ba8dba906f756967f9e9ca394464a")
        );
    }

    #[test]
    fn binary_form_is_twenty_bytes() {
        let oid = ObjectId::try_parse(OID.to_string()).unwrap();
        let mut raw = Vec::new();
        oid.write_h40_to(&mut raw).unwrap();

        assert_eq!(raw.len(), 20);
        assert_eq!(
            ObjectId::read_h40_from(&mut std::io::Cursor::new(raw)).unwrap(),
            oid
        );
    }

    #[test]
    fn truncated_binary_id_is_rejected() {
        let mut reader = std::io::Cursor::new(vec![0xce, 0x01]);
        assert!(ObjectId::read_h40_from(&mut reader).is_err());
    }
}
