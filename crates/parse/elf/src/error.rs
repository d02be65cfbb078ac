//! Error type shared by the mapper and the extractor.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that can occur when extracting metadata from an ELF file.
///
/// The first three variants come from the mapper and carry the path and the
/// underlying I/O error. The rest describe the byte layout of the file.
#[derive(Debug)]
pub enum ElfError {
    /// The file could not be opened for reading.
    FileAccess {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The file size could not be queried.
    Metadata {
        /// Path whose metadata was queried.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The file could not be mapped into memory.
    Mapping {
        /// Path that was mapped.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The file does not start with the ELF magic bytes.
    BadMagic,
    /// A structure extends past the end of the file.
    Truncated {
        /// Structure being read.
        what: &'static str,
        /// File offset of the structure.
        offset: u64,
        /// Number of bytes the structure needs.
        len: u64,
    },
    /// A table declares an entry size too small for its record type.
    InvalidEntrySize {
        /// Table being read.
        what: &'static str,
        /// Declared entry size.
        size: u64,
    },
    /// `e_shstrndx` does not name a section in the section header table.
    InvalidStringTableIndex {
        /// Declared index.
        index: u32,
        /// Number of sections in the table.
        count: usize,
    },
    /// A name offset does not reference a NUL-terminated string inside its
    /// string table.
    InvalidName {
        /// String table the name was looked up in.
        table: &'static str,
        /// Offset of the name inside the table.
        offset: u32,
    },
    /// A symbol has a name but its string table section is absent.
    MissingStringTable {
        /// Name of the missing string table section.
        table: &'static str,
    },
}

impl fmt::Display for ElfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileAccess { path, source } => {
                write!(f, "cannot open {}: {source}", path.display())
            }
            Self::Metadata { path, source } => {
                write!(f, "cannot query size of {}: {source}", path.display())
            }
            Self::Mapping { path, source } => {
                write!(f, "cannot map {}: {source}", path.display())
            }
            Self::BadMagic => write!(f, "not an ELF file (invalid magic bytes)"),
            Self::Truncated { what, offset, len } => write!(
                f,
                "{what} at offset {offset:#x} ({len} bytes) extends past end of file"
            ),
            Self::InvalidEntrySize { what, size } => {
                write!(f, "invalid {what} entry size {size}")
            }
            Self::InvalidStringTableIndex { index, count } => write!(
                f,
                "section name string table index {index} out of range ({count} sections)"
            ),
            Self::InvalidName { table, offset } => {
                write!(f, "name offset {offset:#x} is not a valid string in {table}")
            }
            Self::MissingStringTable { table } => {
                write!(f, "symbols reference names but {table} is missing")
            }
        }
    }
}

impl std::error::Error for ElfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileAccess { source, .. }
            | Self::Metadata { source, .. }
            | Self::Mapping { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_errors() {
        let errors = [
            ElfError::FileAccess {
                path: PathBuf::from("/nonexistent"),
                source: io::Error::from(io::ErrorKind::NotFound),
            },
            ElfError::BadMagic,
            ElfError::Truncated {
                what: "section header table",
                offset: 0x40,
                len: 128,
            },
            ElfError::InvalidEntrySize {
                what: "symbol",
                size: 0,
            },
            ElfError::InvalidStringTableIndex { index: 9, count: 4 },
            ElfError::InvalidName {
                table: ".dynstr",
                offset: 0x100,
            },
            ElfError::MissingStringTable { table: ".strtab" },
        ];
        for err in &errors {
            let msg = format!("{err}");
            assert!(!msg.is_empty());
        }
    }

    #[test]
    fn io_errors_expose_source() {
        let err = ElfError::Metadata {
            path: PathBuf::from("a.out"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(err.source().is_some());
        assert!(format!("{err}").contains("a.out"));
        assert!(ElfError::BadMagic.source().is_none());
    }
}
