//! Index entry representation
//!
//! Each entry in the index represents a staged file with:
//! - File path (repository-relative, `/` separated)
//! - Content hash (object ID)
//! - File metadata (mode, size, modification time)
//! - A staged flag
//!
//! The modification time is only a hint for skipping re-hashing; content
//! identity is always the object ID.

use crate::artifacts::core::error::{BitError, BitResult, IoResultExt};
use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use is_executable::IsExecutable;
use std::cmp::min;
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Maximum path length recorded in the entry flags
const MAX_PATH_SIZE: usize = 0x0fff;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Size of the fixed-width part of an entry
const ENTRY_FIXED_SIZE: usize = 46;

/// Minimum size of an index entry in bytes (one path byte plus NUL, padded)
pub const ENTRY_MIN_SIZE: usize = 48;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EntryFlags: u16 {
        const STAGED = 0x8000;
        const NAME_LENGTH = 0x0fff;
    }
}

/// Index entry representing a staged file
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// File path relative to repository root
    pub name: PathBuf,
    /// SHA-1 hash of file content
    pub oid: ObjectId,
    /// File metadata (mode, size, timestamps)
    pub metadata: EntryMetadata,
    /// Whether the entry takes part in the next tree
    #[new(value = "true")]
    pub staged: bool,
}

impl IndexEntry {
    /// Every ancestor directory of the entry, outermost first
    pub fn parent_dirs(&self) -> Vec<&Path> {
        let mut dirs = self
            .name
            .ancestors()
            .skip(1)
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect::<Vec<_>>();
        dirs.reverse();

        dirs
    }

    /// Path segments of the entry, validated to be plain UTF-8 names
    pub fn segments(&self) -> BitResult<Vec<&str>> {
        path_segments(&self.name)
    }

    pub fn stat_match(&self, other: &EntryMetadata) -> bool {
        self.metadata.size == other.size && self.metadata.mode == other.mode
    }

    pub fn times_match(&self, other: &EntryMetadata) -> bool {
        self.metadata.mtime == other.mtime && self.metadata.mtime_nsec == other.mtime_nsec
    }

    pub fn serialize(&self) -> BitResult<Bytes> {
        let entry_name = path_to_slash(&self.name)?;
        let mut flags = EntryFlags::from_bits_retain(min(entry_name.len(), MAX_PATH_SIZE) as u16);
        flags.set(EntryFlags::STAGED, self.staged);

        let mut entry_bytes = Vec::with_capacity(ENTRY_FIXED_SIZE + entry_name.len() + ENTRY_BLOCK);
        entry_bytes.extend_from_slice(&[0u8; 24]);
        byteorder::NetworkEndian::write_i64(&mut entry_bytes[0..8], self.metadata.mtime);
        byteorder::NetworkEndian::write_u32(&mut entry_bytes[8..12], self.metadata.mtime_nsec);
        byteorder::NetworkEndian::write_u32(&mut entry_bytes[12..16], self.metadata.mode.as_u32());
        byteorder::NetworkEndian::write_u64(&mut entry_bytes[16..24], self.metadata.size);
        self.oid.write_h40_to(&mut entry_bytes)?;
        entry_bytes
            .write_u16::<byteorder::NetworkEndian>(flags.bits())
            .map_err(|e| BitError::InvalidObject(format!("unable to encode entry flags: {e}")))?;
        entry_bytes.extend_from_slice(entry_name.as_bytes());

        // Ensure the entry bytes are padded to ENTRY_BLOCK size with null bytes
        entry_bytes.push(0); // There must be at least one null byte at the end
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }

    /// Decode one padded entry; the reason is reported as index corruption by the caller
    pub fn deserialize(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() < ENTRY_MIN_SIZE || bytes.len() % ENTRY_BLOCK != 0 {
            return Err("invalid index entry size".to_string());
        }

        let mtime = byteorder::NetworkEndian::read_i64(&bytes[0..8]);
        let mtime_nsec = byteorder::NetworkEndian::read_u32(&bytes[8..12]);
        let mode = EntryMode::try_from(byteorder::NetworkEndian::read_u32(&bytes[12..16]))
            .map_err(|e| e.to_string())?;
        let size = byteorder::NetworkEndian::read_u64(&bytes[16..24]);
        let oid = ObjectId::read_h40_from(&mut std::io::Cursor::new(&bytes[24..44]))
            .map_err(|e| e.to_string())?;
        let flags = EntryFlags::from_bits_retain(byteorder::NetworkEndian::read_u16(&bytes[44..46]));

        // Extract the entry name, which is null-terminated
        let name_bytes = &bytes[ENTRY_FIXED_SIZE..];
        let name_end = name_bytes
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| "missing null terminator in entry name".to_string())?;
        let name = std::str::from_utf8(&name_bytes[..name_end])
            .map_err(|_| "invalid UTF-8 in entry name".to_string())?;

        if name.is_empty() {
            return Err("empty entry name".to_string());
        }
        if (flags & EntryFlags::NAME_LENGTH).bits() as usize != min(name.len(), MAX_PATH_SIZE) {
            return Err(format!("entry name length mismatch for '{name}'"));
        }

        Ok(IndexEntry {
            name: PathBuf::from(name),
            oid,
            metadata: EntryMetadata {
                mtime,
                mtime_nsec,
                mode,
                size,
            },
            staged: flags.contains(EntryFlags::STAGED),
        })
    }
}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

/// File metadata stored in index entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Modification time (seconds since Unix epoch)
    pub mtime: i64,
    /// Modification time nanoseconds
    pub mtime_nsec: u32,
    /// File mode
    pub mode: EntryMode,
    /// File size in bytes
    pub size: u64,
}

impl TryFrom<(&Path, Metadata)> for EntryMetadata {
    type Error = BitError;

    /// `file_path` must be the absolute path the metadata was read from
    fn try_from((file_path, metadata): (&Path, Metadata)) -> Result<Self, Self::Error> {
        let mode = if metadata.is_dir() {
            EntryMode::Directory
        } else if file_path.is_executable() {
            EntryMode::File(FileMode::Executable)
        } else {
            EntryMode::File(FileMode::Regular)
        };

        let modified = metadata.modified().with_path("stat file", file_path)?;
        let (mtime, mtime_nsec) = match modified.duration_since(UNIX_EPOCH) {
            Ok(since) => (since.as_secs() as i64, since.subsec_nanos()),
            Err(before) => (-(before.duration().as_secs() as i64), 0),
        };

        Ok(Self {
            mtime,
            mtime_nsec,
            mode,
            size: metadata.len(),
        })
    }
}

/// Render a repository-relative path with `/` separators
pub fn path_to_slash(path: &Path) -> BitResult<String> {
    Ok(path_segments(path)?.join("/"))
}

pub fn path_segments(path: &Path) -> BitResult<Vec<&str>> {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .map(|component| match component {
            Component::Normal(name) => name.to_str().ok_or_else(|| {
                BitError::InvalidObject(format!("non UTF-8 path {}", path.display()))
            }),
            _ => Err(BitError::InvalidObject(format!(
                "path must be relative to the repository root: {}",
                path.display()
            ))),
        })
        .collect()
}
