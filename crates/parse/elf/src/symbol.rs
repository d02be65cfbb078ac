//! ELF64 symbol tables (`.dynsym`, `.symtab`) and symbol name resolution.

use log::{debug, warn};

use crate::error::ElfError;
use crate::extract::NamePolicy;
use crate::read::{self, Endian};
use crate::section::{SHT_NOBITS, Section, StringTable};

/// Symbol type: unspecified.
pub const STT_NOTYPE: u8 = 0;

/// Symbol type: data object.
pub const STT_OBJECT: u8 = 1;

/// Symbol type: function.
pub const STT_FUNC: u8 = 2;

/// Symbol type: section.
pub const STT_SECTION: u8 = 3;

/// Symbol type: source file.
pub const STT_FILE: u8 = 4;

/// Symbol type: thread-local storage object.
pub const STT_TLS: u8 = 6;

/// Symbol binding: local.
pub const STB_LOCAL: u8 = 0;

/// Symbol binding: global.
pub const STB_GLOBAL: u8 = 1;

/// Symbol binding: weak.
pub const STB_WEAK: u8 = 2;

/// Symbol visibility: default.
pub const STV_DEFAULT: u8 = 0;

/// Symbol visibility: internal.
pub const STV_INTERNAL: u8 = 1;

/// Symbol visibility: hidden.
pub const STV_HIDDEN: u8 = 2;

/// Symbol visibility: protected.
pub const STV_PROTECTED: u8 = 3;

/// Size of an ELF64 symbol entry (24 bytes).
pub const ELF64_SYM_SIZE: usize = 24;

/// Parsed ELF64 symbol table entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Elf64Symbol {
    /// Offset into the associated string table for this symbol's name.
    pub st_name: u32,
    /// Symbol type and binding packed into one byte.
    pub st_info: u8,
    /// Symbol visibility.
    pub st_other: u8,
    /// Section index this symbol is defined in.
    pub st_shndx: u16,
    /// Symbol value (address for defined symbols).
    pub st_value: u64,
    /// Symbol size in bytes.
    pub st_size: u64,
}

impl Elf64Symbol {
    /// Parse a symbol entry from the start of `b`.
    ///
    /// The caller must ensure `b.len() >= ELF64_SYM_SIZE`.
    pub(crate) fn parse(b: &[u8], endian: Endian) -> Self {
        Self {
            st_name: endian.u32(b, 0),
            st_info: b[4],
            st_other: b[5],
            st_shndx: endian.u16(b, 6),
            st_value: endian.u64(b, 8),
            st_size: endian.u64(b, 16),
        }
    }

    /// Returns the symbol type (lower 4 bits of `st_info`).
    #[must_use]
    pub fn sym_type(&self) -> u8 {
        self.st_info & 0xf
    }

    /// Returns the symbol binding (upper 4 bits of `st_info`).
    #[must_use]
    pub fn sym_bind(&self) -> u8 {
        self.st_info >> 4
    }

    /// Returns the symbol visibility (lower 2 bits of `st_other`).
    #[must_use]
    pub fn visibility(&self) -> u8 {
        self.st_other & 0x3
    }
}

/// A symbol together with its resolved name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Symbol {
    /// Raw symbol record as stored in the file.
    pub raw: Elf64Symbol,
    /// Name from the linked string table; `None` when `st_name` is zero.
    pub name: Option<String>,
}

impl Symbol {
    /// Returns the resolved name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// An ordered, owned list of symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// Returns the number of symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` if the table holds no symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Returns an iterator over the symbols in file order.
    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    /// Returns the symbols as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Finds the first symbol with the given name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name() == Some(name))
    }
}

impl From<Vec<Symbol>> for SymbolTable {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }
}

impl<'a> IntoIterator for &'a SymbolTable {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

/// Which of the two symbol tables a [`SymbolSource`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SymbolKind {
    /// `.dynsym` resolved through `.dynstr`.
    Dynamic,
    /// `.symtab` resolved through `.strtab`.
    Static,
}

impl SymbolKind {
    fn table_name(self) -> &'static str {
        match self {
            Self::Dynamic => ".dynsym",
            Self::Static => ".symtab",
        }
    }

    fn strtab_name(self) -> &'static str {
        match self {
            Self::Dynamic => ".dynstr",
            Self::Static => ".strtab",
        }
    }
}

/// The symbol section and string table section of one kind, if present.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SymbolSource<'s> {
    kind: SymbolKind,
    symbols: Option<&'s Section>,
    strings: Option<&'s Section>,
}

impl<'s> SymbolSource<'s> {
    /// Scan `sections` for the symbol and string table sections of `kind`,
    /// matching on the resolved name. The last match wins.
    ///
    /// A `SHT_NOBITS` match occupies no file bytes and counts as absent.
    pub(crate) fn locate(sections: &'s [Section], kind: SymbolKind) -> Self {
        let find = |wanted: &str| {
            sections
                .iter()
                .rfind(|s| s.name() == Some(wanted))
                .filter(|s| {
                    let present = s.header.sh_type != SHT_NOBITS;
                    if !present {
                        debug!("{wanted} has no file data (SHT_NOBITS)");
                    }
                    present
                })
        };
        Self {
            kind,
            symbols: find(kind.table_name()),
            strings: find(kind.strtab_name()),
        }
    }

    /// Copy every symbol out of `data` and resolve its name.
    ///
    /// Returns an empty table if the symbol section is absent or empty.
    pub(crate) fn read(
        &self,
        data: &[u8],
        endian: Endian,
        policy: NamePolicy,
    ) -> Result<SymbolTable, ElfError> {
        let Some(section) = self.symbols else {
            debug!("no {} section", self.kind.table_name());
            return Ok(SymbolTable::default());
        };
        let shdr = &section.header;
        if shdr.sh_size == 0 {
            return Ok(SymbolTable::default());
        }
        if shdr.sh_entsize < ELF64_SYM_SIZE as u64 {
            return Err(ElfError::InvalidEntrySize {
                what: self.kind.table_name(),
                size: shdr.sh_entsize,
            });
        }

        let count = shdr.sh_size / shdr.sh_entsize;
        let table = read::table(
            data,
            shdr.sh_offset,
            count,
            shdr.sh_entsize,
            self.kind.table_name(),
        )?;
        let strings = self
            .strings
            .map(|s| StringTable::from_section(data, &s.header, self.kind.strtab_name()))
            .transpose()?;

        #[expect(
            clippy::cast_possible_truncation,
            reason = "table lies inside data, so the stride fits in usize"
        )]
        let stride = shdr.sh_entsize as usize;
        let symbols = table
            .chunks_exact(stride)
            .map(|entry| {
                let raw = Elf64Symbol::parse(entry, endian);
                let name = self.resolve_name(strings.as_ref(), raw.st_name, policy)?;
                Ok(Symbol { raw, name })
            })
            .collect::<Result<Vec<_>, ElfError>>()?;

        debug!("{}: {} symbols", self.kind.table_name(), symbols.len());
        Ok(SymbolTable::from(symbols))
    }

    fn resolve_name(
        &self,
        strings: Option<&StringTable<'_>>,
        st_name: u32,
        policy: NamePolicy,
    ) -> Result<Option<String>, ElfError> {
        // Offset zero is the reserved "no name" entry.
        if st_name == 0 {
            return Ok(None);
        }
        match (strings, policy) {
            (Some(strings), _) => strings.resolve(st_name, policy),
            (None, NamePolicy::Strict) => Err(ElfError::MissingStringTable {
                table: self.kind.strtab_name(),
            }),
            (None, NamePolicy::Lenient) => {
                warn!(
                    "symbol name offset {st_name:#x} without {}",
                    self.kind.strtab_name()
                );
                Ok(None)
            }
        }
    }
}
