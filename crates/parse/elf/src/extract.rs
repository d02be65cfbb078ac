//! Extraction of an owned [`ElfData`] from a file or byte slice.

use std::path::Path;

use log::{debug, trace};

use crate::error::ElfError;
use crate::header::Elf64Header;
use crate::map::MappedFile;
use crate::section::{self, Section};
use crate::segment::{self, Elf64ProgramHeader};
use crate::symbol::{SymbolKind, SymbolSource, SymbolTable};

/// How to treat a name that cannot be resolved through its string table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamePolicy {
    /// Fail the whole extraction.
    #[default]
    Strict,
    /// Leave the name absent and log a warning.
    Lenient,
}

/// Options for [`extract_with`] and [`ElfData::parse`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Handling of out-of-bounds or unterminated names.
    pub names: NamePolicy,
}

impl ExtractOptions {
    /// Options that degrade unresolvable names to `None`.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            names: NamePolicy::Lenient,
        }
    }
}

/// Owned metadata extracted from an ELF64 file.
///
/// Nothing in this value borrows the input bytes. The default value is the
/// empty result: a zeroed header and no program headers, sections or
/// symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ElfData {
    /// The ELF file header.
    pub header: Elf64Header,
    /// Program header table, empty if the file declares none.
    pub program_headers: Vec<Elf64ProgramHeader>,
    /// Section header table with resolved names, empty if the file declares none.
    pub sections: Vec<Section>,
    /// Symbols from `.dynsym`, named through `.dynstr`.
    pub dynamic_symbols: SymbolTable,
    /// Symbols from `.symtab`, named through `.strtab`.
    pub static_symbols: SymbolTable,
}

impl ElfData {
    /// Extract metadata from an in-memory ELF64 image.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::BadMagic`] for non-ELF input, and a layout error
    /// if any declared structure lies outside `data` or a name cannot be
    /// resolved under `options.names`.
    pub fn parse(data: &[u8], options: &ExtractOptions) -> Result<Self, ElfError> {
        let header = Elf64Header::parse(data)?;
        debug!(
            "ELF header: type {:?}, machine {}, {} program headers, {} sections",
            header.elf_type(),
            header.e_machine,
            header.e_phnum,
            header.e_shnum
        );

        let program_headers = segment::parse_program_headers(data, &header)?;
        trace!("copied {} program headers", program_headers.len());

        let mut sections = section::parse_section_headers(data, &header)?;
        section::resolve_section_names(data, &header, &mut sections, options.names)?;
        trace!("copied {} section headers", sections.len());

        let endian = header.endian();
        let dynamic_symbols = SymbolSource::locate(&sections, SymbolKind::Dynamic).read(
            data,
            endian,
            options.names,
        )?;
        let static_symbols = SymbolSource::locate(&sections, SymbolKind::Static).read(
            data,
            endian,
            options.names,
        )?;

        Ok(Self {
            header,
            program_headers,
            sections,
            dynamic_symbols,
            static_symbols,
        })
    }

    /// Finds the first section with the given resolved name.
    #[must_use]
    pub fn section_by_name(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name() == Some(name))
    }

    /// Returns `true` if this is the empty result.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Release every owned allocation and reset to the empty result.
    ///
    /// Section and symbol names are dropped together with the arrays that
    /// hold them. Calling this on an empty or already released value does
    /// nothing, so it is safe to call any number of times before the value
    /// is dropped.
    pub fn release(&mut self) {
        if self.is_empty() {
            return;
        }
        trace!(
            "releasing {} program headers, {} sections, {} + {} symbols",
            self.program_headers.len(),
            self.sections.len(),
            self.dynamic_symbols.len(),
            self.static_symbols.len()
        );
        *self = Self::default();
    }
}

/// Extract metadata from the ELF64 file at `path` with default options.
///
/// # Errors
///
/// See [`extract_with`].
pub fn extract(path: impl AsRef<Path>) -> Result<ElfData, ElfError> {
    extract_with(path, &ExtractOptions::default())
}

/// Map the file at `path`, extract its metadata and unmap it.
///
/// The mapping is released before this returns, on success and on every
/// error path.
///
/// # Errors
///
/// Returns [`ElfError::FileAccess`], [`ElfError::Metadata`] or
/// [`ElfError::Mapping`] if the file cannot be mapped, and any error of
/// [`ElfData::parse`] for its contents.
pub fn extract_with(
    path: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ElfData, ElfError> {
    let path = path.as_ref();
    debug!("extracting {}", path.display());
    let mapped = MappedFile::open(path)?;
    ElfData::parse(mapped.bytes(), options)
}
