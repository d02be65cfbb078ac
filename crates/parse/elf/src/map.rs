//! Read-only memory mapping of an input file.

use std::fs::File;
use std::io;
use std::path::Path;

use log::trace;
use memmap2::{Mmap, MmapOptions};

use crate::error::ElfError;

/// A file mapped read-only into the address space.
///
/// The mapping is released when the value is dropped. The descriptor is
/// closed as soon as the mapping exists, since the mapping keeps the file
/// contents reachable on its own.
#[derive(Debug)]
pub struct MappedFile {
    /// `None` for a zero-length file, which cannot be mapped.
    map: Option<Mmap>,
}

impl MappedFile {
    /// Open `path` and map its whole contents read-only.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::FileAccess`] if the file cannot be opened,
    /// [`ElfError::Metadata`] if its size cannot be queried, and
    /// [`ElfError::Mapping`] if it cannot be mapped.
    pub fn open(path: &Path) -> Result<Self, ElfError> {
        let file = File::open(path).map_err(|source| ElfError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;

        let len = file
            .metadata()
            .map_err(|source| ElfError::Metadata {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        if len == 0 {
            trace!("{}: empty file, nothing to map", path.display());
            return Ok(Self { map: None });
        }

        let len = usize::try_from(len).map_err(|_| ElfError::Mapping {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "file too large to map"),
        })?;

        // SAFETY: the mapping is read-only and owned by this value. The file
        // must not be truncated by another process while it is mapped.
        #[allow(unsafe_code)]
        let map = unsafe { MmapOptions::new().len(len).map(&file) }.map_err(|source| {
            ElfError::Mapping {
                path: path.to_path_buf(),
                source,
            }
        })?;

        trace!("{}: mapped {len} bytes", path.display());
        Ok(Self { map: Some(map) })
    }

    /// Returns the mapped file contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or_default()
    }

    /// Returns the length of the mapped file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    /// Returns `true` if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// A file in the temp directory, removed on drop.
    struct TempFile(PathBuf);

    impl TempFile {
        fn with_contents(tag: &str, contents: &[u8]) -> Self {
            let path = std::env::temp_dir()
                .join(format!("elfmeta-map-{}-{tag}", std::process::id()));
            std::fs::write(&path, contents).expect("write temp file");
            Self(path)
        }
    }

    impl Drop for TempFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn map_file_contents() {
        let file = TempFile::with_contents("contents", b"\x7fELF and more");
        let mapped = MappedFile::open(&file.0).expect("mappable file");
        assert_eq!(mapped.bytes(), b"\x7fELF and more");
        assert_eq!(mapped.len(), 13);
        assert!(!mapped.is_empty());
    }

    #[test]
    fn map_empty_file() {
        let file = TempFile::with_contents("empty", b"");
        let mapped = MappedFile::open(&file.0).expect("empty file maps to nothing");
        assert!(mapped.is_empty());
        assert!(mapped.bytes().is_empty());
    }

    #[test]
    fn missing_file_is_access_error() {
        let path = Path::new("/nonexistent/elfmeta/missing");
        match MappedFile::open(path) {
            Err(ElfError::FileAccess { path: p, source }) => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected FileAccess, got {other:?}"),
        }
    }
}
