//! ELF64 metadata extraction.
//!
//! Maps a file read-only, walks its header, program header table, section
//! header table and symbol tables, and copies everything of interest into an
//! owned [`ElfData`]. The mapping is released before extraction returns; the
//! result holds no reference into it.
//!
//! Every offset and size taken from the file is bounds-checked against the
//! mapped bytes before use. Beyond the magic bytes, the file is not checked
//! for semantic validity.
//!
//! # Usage
//!
//! ```no_run
//! use elfmeta::{ExtractOptions, extract_with};
//!
//! let elf = extract_with("/bin/ls", &ExtractOptions::default())?;
//! for section in &elf.sections {
//!     println!("{:?} at {:#x}", section.name(), section.header.sh_offset);
//! }
//! println!("{} dynamic symbols", elf.dynamic_symbols.len());
//! # Ok::<(), elfmeta::ElfError>(())
//! ```

#![deny(unsafe_code)]

pub mod error;
pub mod extract;
pub mod header;
pub mod map;
pub mod read;
pub mod section;
pub mod segment;
pub mod symbol;

pub use error::ElfError;
pub use extract::{ElfData, ExtractOptions, NamePolicy, extract, extract_with};
pub use header::{ELF_MAGIC, Elf64Header, ElfType};
pub use map::MappedFile;
pub use read::Endian;
pub use section::{
    Elf64SectionHeader, SHF_ALLOC, SHF_EXECINSTR, SHF_WRITE, SHN_ABS, SHN_COMMON, SHN_UNDEF,
    SHT_DYNSYM, SHT_NOBITS, SHT_PROGBITS, SHT_STRTAB, SHT_SYMTAB, Section,
};
pub use segment::{Elf64ProgramHeader, PF_R, PF_W, PF_X, PT_LOAD};
pub use symbol::{
    Elf64Symbol, STB_GLOBAL, STB_LOCAL, STB_WEAK, STT_FUNC, STT_OBJECT, Symbol, SymbolTable,
};
