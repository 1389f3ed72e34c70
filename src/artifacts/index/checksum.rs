use crate::artifacts::core::error::{BitError, BitResult};
use crate::artifacts::index::CHECKSUM_SIZE;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Reader/writer over an index file that hashes everything passing through it
pub struct Checksum<'f> {
    path: PathBuf,
    file: &'f mut std::fs::File,
    digest: Sha1,
}

impl<'f> Checksum<'f> {
    pub(crate) fn new(path: &Path, file: &'f mut std::fs::File) -> Self {
        Checksum {
            path: path.to_path_buf(),
            file,
            digest: Sha1::new(),
        }
    }

    pub(crate) fn read(&mut self, size: usize) -> BitResult<Bytes> {
        let mut buffer = vec![0; size];
        self.file
            .read_exact(&mut buffer)
            .map_err(|_| {
                BitError::corrupt_index(&self.path, "unexpected end-of-file while reading index")
            })?;

        self.digest.update(&buffer);
        Ok(Bytes::from(buffer))
    }

    pub(crate) fn write(&mut self, data: &[u8]) -> BitResult<()> {
        self.file
            .write_all(data)
            .map_err(|source| self.io_error("write index", source))?;
        self.digest.update(data);
        Ok(())
    }

    /// Append the digest of everything written so far and flush it to disk
    pub(crate) fn write_checksum(&mut self) -> BitResult<()> {
        let checksum = self.digest.clone().finalize();
        self.file
            .write_all(checksum.as_slice())
            .map_err(|source| self.io_error("write index checksum", source))?;
        self.file
            .sync_all()
            .map_err(|source| self.io_error("sync index", source))
    }

    pub(crate) fn verify(&mut self) -> BitResult<()> {
        let mut expected_checksum = [0u8; CHECKSUM_SIZE];
        self.file
            .read_exact(&mut expected_checksum)
            .map_err(|_| BitError::corrupt_index(&self.path, "missing index checksum"))?;

        let actual_checksum = self.digest.clone().finalize();

        if expected_checksum != actual_checksum.as_slice() {
            return Err(BitError::corrupt_index(
                &self.path,
                "checksum does not match value stored on disk",
            ));
        }

        let mut trailing = [0u8; 1];
        match self.file.read(&mut trailing) {
            Ok(0) => Ok(()),
            Ok(_) => Err(BitError::corrupt_index(
                &self.path,
                "unexpected data after index checksum",
            )),
            Err(source) => Err(self.io_error("read index", source)),
        }
    }

    fn io_error(&self, operation: &'static str, source: std::io::Error) -> BitError {
        BitError::Io {
            operation,
            path: self.path.clone(),
            source,
        }
    }
}
