use crate::artifacts::core::error::{BitError, BitResult};
use std::io::BufRead;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
        }
    }

    /// Consume the `<type> <size>\0` envelope header and return the type
    pub fn parse_object_type(data_reader: &mut impl BufRead) -> BitResult<ObjectType> {
        let mut object_type = Vec::new();
        data_reader
            .read_until(b' ', &mut object_type)
            .map_err(|e| BitError::InvalidObject(format!("unreadable object header: {e}")))?;

        let object_type = String::from_utf8(object_type)
            .map_err(|_| BitError::InvalidObject("non UTF-8 object type".to_string()))?;
        let object_type = object_type.trim();

        // skip the size part
        let mut size = Vec::new();
        data_reader
            .read_until(b'\0', &mut size)
            .map_err(|e| BitError::InvalidObject(format!("unreadable object header: {e}")))?;

        ObjectType::try_from(object_type)
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = BitError;

    fn try_from(value: &str) -> BitResult<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            other => Err(BitError::InvalidObject(format!(
                "unknown object type '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
