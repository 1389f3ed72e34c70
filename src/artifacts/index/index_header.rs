use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use byteorder::ByteOrder;
use bytes::Bytes;
use derive_new::new;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexHeader {
    pub(crate) marker: String,
    pub(crate) version: u32,
    pub(crate) entries_count: u32,
}

impl IndexHeader {
    pub(crate) fn empty() -> Self {
        IndexHeader {
            marker: String::from(SIGNATURE),
            version: VERSION,
            entries_count: 0,
        }
    }

    pub(crate) fn serialize(&self) -> Bytes {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.marker.as_bytes()[..4]);
        byteorder::NetworkEndian::write_u32(&mut bytes[4..8], self.version);
        byteorder::NetworkEndian::write_u32(&mut bytes[8..12], self.entries_count);

        Bytes::copy_from_slice(&bytes)
    }

    /// Parse a raw header; the caller maps the reason into a corrupt-index error
    pub(crate) fn deserialize(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() < HEADER_SIZE {
            return Err("invalid header size".to_string());
        }

        let marker = String::from_utf8(bytes[0..4].to_vec())
            .map_err(|_| "invalid marker in index header".to_string())?;
        let version = byteorder::NetworkEndian::read_u32(&bytes[4..8]);
        let entries_count = byteorder::NetworkEndian::read_u32(&bytes[8..12]);

        Ok(IndexHeader {
            marker,
            version,
            entries_count,
        })
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.marker != SIGNATURE {
            return Err("invalid index file signature".to_string());
        }
        if self.version != VERSION {
            return Err(format!("unsupported index file version: {}", self.version));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn header_is_twelve_bytes() {
        let header = IndexHeader::new(SIGNATURE.to_string(), VERSION, 3);
        let bytes = header.serialize();

        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[..], b"BIDX\x00\x00\x00\x01\x00\x00\x00\x03");
        assert_eq!(IndexHeader::deserialize(&bytes).unwrap(), header);
    }

    #[test]
    fn foreign_signature_fails_validation() {
        let header = IndexHeader::new("DIRC".to_string(), 2, 0);

        assert!(header.validate().is_err());
    }
}
