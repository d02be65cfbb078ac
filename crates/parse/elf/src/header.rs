//! ELF64 file header parsing.
//!
//! Only the magic bytes are validated. Class, encoding, type and machine are
//! reported as found; the byte order of the remaining fields follows
//! `e_ident[EI_DATA]`.

use crate::error::ElfError;
use crate::read::Endian;

/// ELF magic bytes: `\x7fELF`.
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// Number of identification bytes at the start of the header.
pub const EI_NIDENT: usize = 16;

/// Index of the class byte in `e_ident`.
pub const EI_CLASS: usize = 4;

/// Index of the data encoding byte in `e_ident`.
pub const EI_DATA: usize = 5;

/// Index of the OS ABI byte in `e_ident`.
pub const EI_OSABI: usize = 7;

/// ELF class: 32-bit.
pub const ELFCLASS32: u8 = 1;

/// ELF class: 64-bit.
pub const ELFCLASS64: u8 = 2;

/// ELF data encoding: little-endian.
pub const ELFDATA2LSB: u8 = 1;

/// ELF data encoding: big-endian.
pub const ELFDATA2MSB: u8 = 2;

/// Size of an ELF64 file header (64 bytes).
pub const ELF64_EHDR_SIZE: usize = 64;

/// Type of an ELF file, decoded from `e_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ElfType {
    /// `ET_NONE`.
    None,
    /// `ET_REL`: relocatable object.
    Relocatable,
    /// `ET_EXEC`: executable.
    Executable,
    /// `ET_DYN`: shared object or PIE.
    SharedObject,
    /// `ET_CORE`: core dump.
    Core,
    /// Any other value (OS or processor specific).
    Other(u16),
}

impl From<u16> for ElfType {
    fn from(e_type: u16) -> Self {
        match e_type {
            0 => Self::None,
            1 => Self::Relocatable,
            2 => Self::Executable,
            3 => Self::SharedObject,
            4 => Self::Core,
            other => Self::Other(other),
        }
    }
}

/// Parsed ELF64 file header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Elf64Header {
    /// Identification bytes: magic, class, encoding, version, OS ABI.
    pub e_ident: [u8; EI_NIDENT],
    /// Object file type.
    pub e_type: u16,
    /// Target machine architecture.
    pub e_machine: u16,
    /// Object file version.
    pub e_version: u32,
    /// Virtual address of the entry point.
    pub e_entry: u64,
    /// Offset of the program header table in the file.
    pub e_phoff: u64,
    /// Offset of the section header table in the file.
    pub e_shoff: u64,
    /// Processor-specific flags.
    pub e_flags: u32,
    /// Size of this header.
    pub e_ehsize: u16,
    /// Size of each program header entry.
    pub e_phentsize: u16,
    /// Number of program header entries.
    pub e_phnum: u16,
    /// Size of each section header entry.
    pub e_shentsize: u16,
    /// Number of section header entries.
    pub e_shnum: u16,
    /// Section header string table index.
    pub e_shstrndx: u16,
}

impl Elf64Header {
    /// Parse an ELF64 file header from the start of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::BadMagic`] if `data` does not start with the ELF
    /// magic bytes, or [`ElfError::Truncated`] if it is shorter than a header.
    pub fn parse(data: &[u8]) -> Result<Self, ElfError> {
        if data.get(..ELF_MAGIC.len()) != Some(&ELF_MAGIC[..]) {
            return Err(ElfError::BadMagic);
        }
        let b = crate::read::region(data, 0, ELF64_EHDR_SIZE as u64, "file header")?;

        let mut e_ident = [0u8; EI_NIDENT];
        e_ident.copy_from_slice(&b[..EI_NIDENT]);
        let endian = endian_of(&e_ident);

        Ok(Self {
            e_ident,
            e_type: endian.u16(b, 16),
            e_machine: endian.u16(b, 18),
            e_version: endian.u32(b, 20),
            e_entry: endian.u64(b, 24),
            e_phoff: endian.u64(b, 32),
            e_shoff: endian.u64(b, 40),
            e_flags: endian.u32(b, 48),
            e_ehsize: endian.u16(b, 52),
            e_phentsize: endian.u16(b, 54),
            e_phnum: endian.u16(b, 56),
            e_shentsize: endian.u16(b, 58),
            e_shnum: endian.u16(b, 60),
            e_shstrndx: endian.u16(b, 62),
        })
    }

    /// Returns the class byte (`ELFCLASS32` or `ELFCLASS64`).
    #[must_use]
    pub fn class(&self) -> u8 {
        self.e_ident[EI_CLASS]
    }

    /// Returns the data encoding byte (`ELFDATA2LSB` or `ELFDATA2MSB`).
    #[must_use]
    pub fn data_encoding(&self) -> u8 {
        self.e_ident[EI_DATA]
    }

    /// Returns the OS ABI byte.
    #[must_use]
    pub fn os_abi(&self) -> u8 {
        self.e_ident[EI_OSABI]
    }

    /// Returns the byte order used for every multi-byte field in the file.
    #[must_use]
    pub fn endian(&self) -> Endian {
        endian_of(&self.e_ident)
    }

    /// Returns the decoded object file type.
    #[must_use]
    pub fn elf_type(&self) -> ElfType {
        ElfType::from(self.e_type)
    }
}

fn endian_of(e_ident: &[u8; EI_NIDENT]) -> Endian {
    if e_ident[EI_DATA] == ELFDATA2MSB {
        Endian::Big
    } else {
        Endian::Little
    }
}
