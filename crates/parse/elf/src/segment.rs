//! ELF64 program header (segment) table.

use crate::error::ElfError;
use crate::header::Elf64Header;
use crate::read::{self, Endian};

/// Program header type: unused entry.
pub const PT_NULL: u32 = 0;

/// Program header type: loadable segment.
pub const PT_LOAD: u32 = 1;

/// Program header type: dynamic linking information.
pub const PT_DYNAMIC: u32 = 2;

/// Program header type: program interpreter path.
pub const PT_INTERP: u32 = 3;

/// Program header type: auxiliary information.
pub const PT_NOTE: u32 = 4;

/// Program header type: the program header table itself.
pub const PT_PHDR: u32 = 6;

/// Program header type: thread-local storage template.
pub const PT_TLS: u32 = 7;

/// Segment flag: executable.
pub const PF_X: u32 = 0x1;

/// Segment flag: writable.
pub const PF_W: u32 = 0x2;

/// Segment flag: readable.
pub const PF_R: u32 = 0x4;

/// Size of an ELF64 program header entry (56 bytes).
pub const ELF64_PHDR_SIZE: usize = 56;

/// Parsed ELF64 program header entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Elf64ProgramHeader {
    /// Segment type.
    pub p_type: u32,
    /// Segment flags (`PF_R`, `PF_W`, `PF_X`).
    pub p_flags: u32,
    /// Offset of the segment data in the file.
    pub p_offset: u64,
    /// Virtual address of the segment.
    pub p_vaddr: u64,
    /// Physical address of the segment.
    pub p_paddr: u64,
    /// Size of the segment data in the file.
    pub p_filesz: u64,
    /// Size of the segment in memory.
    pub p_memsz: u64,
    /// Required alignment of the segment.
    pub p_align: u64,
}

impl Elf64ProgramHeader {
    /// Parse a program header entry from the start of `b`.
    ///
    /// The caller must ensure `b.len() >= ELF64_PHDR_SIZE`.
    pub(crate) fn parse(b: &[u8], endian: Endian) -> Self {
        Self {
            p_type: endian.u32(b, 0),
            p_flags: endian.u32(b, 4),
            p_offset: endian.u64(b, 8),
            p_vaddr: endian.u64(b, 16),
            p_paddr: endian.u64(b, 24),
            p_filesz: endian.u64(b, 32),
            p_memsz: endian.u64(b, 40),
            p_align: endian.u64(b, 48),
        }
    }

    /// Returns `true` if this is a `PT_LOAD` segment.
    #[must_use]
    pub fn is_load(&self) -> bool {
        self.p_type == PT_LOAD
    }
}

/// Copy every program header declared by `hdr` out of `data`.
///
/// Returns an empty vector if the header declares no program header table
/// (`e_phoff == 0` or `e_phnum == 0`).
pub(crate) fn parse_program_headers(
    data: &[u8],
    hdr: &Elf64Header,
) -> Result<Vec<Elf64ProgramHeader>, ElfError> {
    if hdr.e_phoff == 0 || hdr.e_phnum == 0 {
        return Ok(Vec::new());
    }

    let stride = usize::from(hdr.e_phentsize);
    if stride < ELF64_PHDR_SIZE {
        return Err(ElfError::InvalidEntrySize {
            what: "program header",
            size: u64::from(hdr.e_phentsize),
        });
    }

    let table = read::table(
        data,
        hdr.e_phoff,
        u64::from(hdr.e_phnum),
        u64::from(hdr.e_phentsize),
        "program header table",
    )?;
    let endian = hdr.endian();

    Ok(table
        .chunks_exact(stride)
        .map(|entry| Elf64ProgramHeader::parse(entry, endian))
        .collect())
}
