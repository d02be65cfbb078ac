//! ELF64 section header table and section name resolution.
//!
//! Sections are read in two passes. The first copies every raw header; the
//! second locates the section-name string table among the copied headers
//! (`e_shstrndx`) and resolves each `sh_name` through it. The string table's
//! own location is only known once the whole table has been read.

use log::{debug, warn};

use crate::error::ElfError;
use crate::extract::NamePolicy;
use crate::header::Elf64Header;
use crate::read::{self, Endian};

/// Section type: inactive header.
pub const SHT_NULL: u32 = 0;

/// Section type: program-defined contents.
pub const SHT_PROGBITS: u32 = 1;

/// Section type: symbol table.
pub const SHT_SYMTAB: u32 = 2;

/// Section type: string table.
pub const SHT_STRTAB: u32 = 3;

/// Section type: relocation entries with addends.
pub const SHT_RELA: u32 = 4;

/// Section type: symbol hash table.
pub const SHT_HASH: u32 = 5;

/// Section type: dynamic linking information.
pub const SHT_DYNAMIC: u32 = 6;

/// Section type: notes.
pub const SHT_NOTE: u32 = 7;

/// Section type: occupies no file space (`.bss`).
pub const SHT_NOBITS: u32 = 8;

/// Section type: relocation entries without addends.
pub const SHT_REL: u32 = 9;

/// Section type: dynamic symbol table.
pub const SHT_DYNSYM: u32 = 11;

/// Section flag: writable data.
pub const SHF_WRITE: u64 = 0x1;

/// Section flag: occupies memory during execution.
pub const SHF_ALLOC: u64 = 0x2;

/// Section flag: executable machine instructions.
pub const SHF_EXECINSTR: u64 = 0x4;

/// Section flag: contains NUL-terminated strings.
pub const SHF_STRINGS: u64 = 0x20;

/// Section flag: `sh_info` contains a section header table index.
pub const SHF_INFO_LINK: u64 = 0x40;

/// Special section index: undefined.
pub const SHN_UNDEF: u16 = 0;

/// Special section index: absolute values.
pub const SHN_ABS: u16 = 0xfff1;

/// Special section index: common symbols.
pub const SHN_COMMON: u16 = 0xfff2;

/// Special section index: the real index lives in section 0's `sh_link`.
pub const SHN_XINDEX: u16 = 0xffff;

/// Size of an ELF64 section header entry (64 bytes).
pub const ELF64_SHDR_SIZE: usize = 64;

/// Parsed ELF64 section header entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Elf64SectionHeader {
    /// Offset into the section header string table for this section's name.
    pub sh_name: u32,
    /// Section type (`SHT_SYMTAB`, `SHT_STRTAB`, etc.).
    pub sh_type: u32,
    /// Section flags.
    pub sh_flags: u64,
    /// Virtual address of the section in memory (0 for non-loaded sections).
    pub sh_addr: u64,
    /// File offset of the section data.
    pub sh_offset: u64,
    /// Size of the section data in bytes.
    pub sh_size: u64,
    /// Associated section index (e.g., `.strtab` index for `.symtab`).
    pub sh_link: u32,
    /// Extra info (interpretation depends on section type).
    pub sh_info: u32,
    /// Required alignment of the section (must be a power of two).
    pub sh_addralign: u64,
    /// Size of each entry (for sections with fixed-size entries).
    pub sh_entsize: u64,
}

impl Elf64SectionHeader {
    /// Parse a section header from the start of `b`.
    ///
    /// The caller must ensure `b.len() >= ELF64_SHDR_SIZE`.
    pub(crate) fn parse(b: &[u8], endian: Endian) -> Self {
        Self {
            sh_name: endian.u32(b, 0),
            sh_type: endian.u32(b, 4),
            sh_flags: endian.u64(b, 8),
            sh_addr: endian.u64(b, 16),
            sh_offset: endian.u64(b, 24),
            sh_size: endian.u64(b, 32),
            sh_link: endian.u32(b, 40),
            sh_info: endian.u32(b, 44),
            sh_addralign: endian.u64(b, 48),
            sh_entsize: endian.u64(b, 56),
        }
    }
}

/// A section header together with its resolved name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Section {
    /// Raw section header as stored in the file.
    pub header: Elf64SectionHeader,
    /// Name from the section-name string table, if the file has one.
    pub name: Option<String>,
}

impl Section {
    /// Returns the resolved name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// A view of a NUL-terminated string table section inside the file.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StringTable<'a> {
    data: &'a [u8],
    label: &'static str,
}

impl<'a> StringTable<'a> {
    pub(crate) fn new(data: &'a [u8], label: &'static str) -> Self {
        Self { data, label }
    }

    /// Wraps the bytes of `shdr`, which must lie inside `file`.
    pub(crate) fn from_section(
        file: &'a [u8],
        shdr: &Elf64SectionHeader,
        label: &'static str,
    ) -> Result<Self, ElfError> {
        let data = read::region(file, shdr.sh_offset, shdr.sh_size, label)?;
        Ok(Self::new(data, label))
    }

    /// Looks up the NUL-terminated string at the given byte offset.
    ///
    /// Returns `None` if the offset is out of bounds or no NUL terminator
    /// follows it inside the table.
    pub(crate) fn get(&self, offset: u32) -> Option<&'a [u8]> {
        let remaining = self.data.get(offset as usize..)?;
        let nul_pos = remaining.iter().position(|&b| b == 0)?;
        Some(&remaining[..nul_pos])
    }

    /// Copies the string at `offset` out of the table.
    ///
    /// A lookup failure is [`ElfError::InvalidName`] under
    /// [`NamePolicy::Strict`] and an absent name under [`NamePolicy::Lenient`].
    pub(crate) fn resolve(
        &self,
        offset: u32,
        policy: NamePolicy,
    ) -> Result<Option<String>, ElfError> {
        match self.get(offset) {
            Some(bytes) => Ok(Some(String::from_utf8_lossy(bytes).into_owned())),
            None => match policy {
                NamePolicy::Strict => Err(ElfError::InvalidName {
                    table: self.label,
                    offset,
                }),
                NamePolicy::Lenient => {
                    warn!("name offset {offset:#x} is outside {}", self.label);
                    Ok(None)
                }
            },
        }
    }
}

/// Pass 1: copy every section header declared by `hdr` out of `data`.
///
/// Every name starts unresolved. Returns an empty vector if the header
/// declares no section header table (`e_shoff == 0` or `e_shnum == 0`).
pub(crate) fn parse_section_headers(
    data: &[u8],
    hdr: &Elf64Header,
) -> Result<Vec<Section>, ElfError> {
    if hdr.e_shoff == 0 || hdr.e_shnum == 0 {
        return Ok(Vec::new());
    }

    let stride = usize::from(hdr.e_shentsize);
    if stride < ELF64_SHDR_SIZE {
        return Err(ElfError::InvalidEntrySize {
            what: "section header",
            size: u64::from(hdr.e_shentsize),
        });
    }

    let table = read::table(
        data,
        hdr.e_shoff,
        u64::from(hdr.e_shnum),
        u64::from(hdr.e_shentsize),
        "section header table",
    )?;
    let endian = hdr.endian();

    Ok(table
        .chunks_exact(stride)
        .map(|entry| Section {
            header: Elf64SectionHeader::parse(entry, endian),
            name: None,
        })
        .collect())
}

/// Index of the section-name string table within `sections`.
///
/// Follows the `SHN_XINDEX` escape into section 0's `sh_link`.
fn shstrtab_index(hdr: &Elf64Header, sections: &[Section]) -> u32 {
    if hdr.e_shstrndx == SHN_XINDEX {
        sections.first().map_or(0, |s| s.header.sh_link)
    } else {
        u32::from(hdr.e_shstrndx)
    }
}

/// Pass 2: resolve every section's name through the section-name string table.
///
/// A file whose `e_shstrndx` is `SHN_UNDEF` has no such table and every name
/// stays `None`.
pub(crate) fn resolve_section_names(
    data: &[u8],
    hdr: &Elf64Header,
    sections: &mut [Section],
    policy: NamePolicy,
) -> Result<(), ElfError> {
    if sections.is_empty() {
        return Ok(());
    }

    let index = shstrtab_index(hdr, sections);
    if index == u32::from(SHN_UNDEF) {
        debug!("no section name string table");
        return Ok(());
    }

    let Some(shstrtab) = sections.get(index as usize).map(|s| s.header) else {
        return match policy {
            NamePolicy::Strict => Err(ElfError::InvalidStringTableIndex {
                index,
                count: sections.len(),
            }),
            NamePolicy::Lenient => {
                warn!(
                    "section name string table index {index} out of range ({} sections)",
                    sections.len()
                );
                Ok(())
            }
        };
    };

    let strtab = StringTable::from_section(data, &shstrtab, ".shstrtab")?;
    for section in sections.iter_mut() {
        section.name = strtab.resolve(section.header.sh_name, policy)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::header::tests::make_elf_header;
    use crate::header::{EI_DATA, ELFDATA2MSB};

    /// Append a section header to the ELF buffer and bump `e_shnum`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn append_section(
        buf: &mut Vec<u8>,
        sh_name: u32,
        sh_type: u32,
        sh_flags: u64,
        sh_offset: u64,
        sh_size: u64,
        sh_link: u32,
        sh_addralign: u64,
        sh_entsize: u64,
    ) {
        let start = buf.len();
        buf.resize(start + ELF64_SHDR_SIZE, 0);
        let b = &mut buf[start..];

        b[0..4].copy_from_slice(&sh_name.to_le_bytes());
        b[4..8].copy_from_slice(&sh_type.to_le_bytes());
        b[8..16].copy_from_slice(&sh_flags.to_le_bytes());
        // sh_addr at 16..24 stays zero
        b[24..32].copy_from_slice(&sh_offset.to_le_bytes());
        b[32..40].copy_from_slice(&sh_size.to_le_bytes());
        b[40..44].copy_from_slice(&sh_link.to_le_bytes());
        // sh_info at 44..48 stays zero
        b[48..56].copy_from_slice(&sh_addralign.to_le_bytes());
        b[56..64].copy_from_slice(&sh_entsize.to_le_bytes());

        let shnum = Endian::Little.u16(buf, 60) + 1;
        buf[60..62].copy_from_slice(&shnum.to_le_bytes());
    }

    /// Build an ELF with sections NULL, `.text`, `.shstrtab`.
    ///
    /// Layout: header (64) | section headers (3 * 64) | shstrtab data.
    fn make_elf_with_sections() -> Vec<u8> {
        let mut buf = make_elf_header();
        let shstrtab_data = b"\0.text\0.shstrtab\0";

        let shdr_start = 64u64;
        let shstrtab_off = shdr_start + 3 * ELF64_SHDR_SIZE as u64;

        buf[40..48].copy_from_slice(&shdr_start.to_le_bytes());
        buf[62..64].copy_from_slice(&2u16.to_le_bytes());

        append_section(&mut buf, 0, SHT_NULL, 0, 0, 0, 0, 0, 0);
        append_section(
            &mut buf,
            1,
            SHT_PROGBITS,
            SHF_ALLOC | SHF_EXECINSTR,
            0,
            0,
            0,
            16,
            0,
        );
        append_section(
            &mut buf,
            7,
            SHT_STRTAB,
            0,
            shstrtab_off,
            shstrtab_data.len() as u64,
            0,
            1,
            0,
        );
        buf.extend_from_slice(shstrtab_data);
        buf
    }

    fn parse(buf: &[u8], policy: NamePolicy) -> Result<Vec<Section>, ElfError> {
        let hdr = Elf64Header::parse(buf).expect("valid header");
        let mut sections = parse_section_headers(buf, &hdr)?;
        resolve_section_names(buf, &hdr, &mut sections, policy)?;
        Ok(sections)
    }

    #[test]
    fn no_sections() {
        let buf = make_elf_header();
        assert!(parse(&buf, NamePolicy::Strict).unwrap().is_empty());
    }

    #[test]
    fn section_headers_and_names() {
        let buf = make_elf_with_sections();
        let sections = parse(&buf, NamePolicy::Strict).unwrap();

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].header.sh_type, SHT_NULL);
        assert_eq!(sections[0].name(), Some(""));
        assert_eq!(sections[1].name(), Some(".text"));
        assert_eq!(sections[1].header.sh_flags, SHF_ALLOC | SHF_EXECINSTR);
        assert_eq!(sections[1].header.sh_addralign, 16);
        assert_eq!(sections[2].name(), Some(".shstrtab"));
        assert_eq!(sections[2].header.sh_type, SHT_STRTAB);
    }

    #[test]
    fn undef_shstrndx_leaves_names_absent() {
        let mut buf = make_elf_with_sections();
        buf[62..64].copy_from_slice(&SHN_UNDEF.to_le_bytes());
        let sections = parse(&buf, NamePolicy::Strict).unwrap();
        assert_eq!(sections.len(), 3);
        assert!(sections.iter().all(|s| s.name.is_none()));
    }

    #[test]
    fn xindex_shstrndx_uses_section_zero_link() {
        let mut buf = make_elf_with_sections();
        buf[62..64].copy_from_slice(&SHN_XINDEX.to_le_bytes());
        // Section 0's sh_link lives at e_shoff + 40.
        buf[64 + 40..64 + 44].copy_from_slice(&2u32.to_le_bytes());
        let sections = parse(&buf, NamePolicy::Strict).unwrap();
        assert_eq!(sections[1].name(), Some(".text"));
    }

    #[test]
    fn out_of_range_shstrndx() {
        let mut buf = make_elf_with_sections();
        buf[62..64].copy_from_slice(&9u16.to_le_bytes());

        assert!(matches!(
            parse(&buf, NamePolicy::Strict),
            Err(ElfError::InvalidStringTableIndex { index: 9, count: 3 })
        ));

        let sections = parse(&buf, NamePolicy::Lenient).unwrap();
        assert_eq!(sections.len(), 3);
        assert!(sections.iter().all(|s| s.name.is_none()));
    }

    #[test]
    fn name_offset_outside_string_table() {
        let mut buf = make_elf_with_sections();
        // Point .text's sh_name far past the end of .shstrtab.
        let text_hdr = 64 + ELF64_SHDR_SIZE;
        buf[text_hdr..text_hdr + 4].copy_from_slice(&0x1000u32.to_le_bytes());

        assert!(matches!(
            parse(&buf, NamePolicy::Strict),
            Err(ElfError::InvalidName {
                table: ".shstrtab",
                offset: 0x1000
            })
        ));

        let sections = parse(&buf, NamePolicy::Lenient).unwrap();
        assert_eq!(sections[1].name, None);
        assert_eq!(sections[2].name(), Some(".shstrtab"));
    }

    #[test]
    fn reject_small_entry_size() {
        let mut buf = make_elf_with_sections();
        buf[58..60].copy_from_slice(&40u16.to_le_bytes());
        assert!(matches!(
            parse(&buf, NamePolicy::Strict),
            Err(ElfError::InvalidEntrySize {
                what: "section header",
                size: 40
            })
        ));
    }

    #[test]
    fn reject_section_table_past_end_of_file() {
        let mut buf = make_elf_with_sections();
        buf[60..62].copy_from_slice(&50u16.to_le_bytes());
        assert!(matches!(
            parse(&buf, NamePolicy::Strict),
            Err(ElfError::Truncated {
                what: "section header table",
                ..
            })
        ));
    }

    #[test]
    fn string_table_lookup() {
        let strtab = StringTable::new(b"\0hello\0world\0", ".strtab");
        assert_eq!(strtab.get(0), Some(&b""[..]));
        assert_eq!(strtab.get(1), Some(&b"hello"[..]));
        assert_eq!(strtab.get(7), Some(&b"world"[..]));
        // Suffix of an existing string.
        assert_eq!(strtab.get(3), Some(&b"llo"[..]));
        assert_eq!(strtab.get(100), None);
    }

    #[test]
    fn string_table_no_nul_terminator() {
        let strtab = StringTable::new(b"abc", ".strtab");
        assert_eq!(strtab.get(0), None);
        assert!(strtab.resolve(0, NamePolicy::Strict).is_err());
        assert_eq!(strtab.resolve(0, NamePolicy::Lenient).unwrap(), None);
    }

    #[test]
    fn string_table_lossy_utf8() {
        let strtab = StringTable::new(b"\0a\xffb\0", ".strtab");
        let name = strtab.resolve(1, NamePolicy::Strict).unwrap().unwrap();
        assert_eq!(name, "a\u{fffd}b");
    }

    #[test]
    fn big_endian_section_table() {
        let mut buf = make_elf_header();
        let shstrtab = b"\0.shstrtab\0";
        let shstrtab_off = 64 + 2 * ELF64_SHDR_SIZE as u64;

        buf[EI_DATA] = ELFDATA2MSB;
        buf[40..48].copy_from_slice(&64u64.to_be_bytes());
        buf[58..60].copy_from_slice(&(ELF64_SHDR_SIZE as u16).to_be_bytes());
        buf[60..62].copy_from_slice(&2u16.to_be_bytes());
        buf[62..64].copy_from_slice(&1u16.to_be_bytes());

        buf.resize(64 + ELF64_SHDR_SIZE, 0);
        let mut shdr = [0u8; ELF64_SHDR_SIZE];
        shdr[0..4].copy_from_slice(&1u32.to_be_bytes());
        shdr[4..8].copy_from_slice(&SHT_STRTAB.to_be_bytes());
        shdr[8..16].copy_from_slice(&SHF_ALLOC.to_be_bytes());
        shdr[16..24].copy_from_slice(&0x8000u64.to_be_bytes());
        shdr[24..32].copy_from_slice(&shstrtab_off.to_be_bytes());
        shdr[32..40].copy_from_slice(&(shstrtab.len() as u64).to_be_bytes());
        shdr[40..44].copy_from_slice(&3u32.to_be_bytes());
        shdr[44..48].copy_from_slice(&4u32.to_be_bytes());
        shdr[48..56].copy_from_slice(&1u64.to_be_bytes());
        shdr[56..64].copy_from_slice(&0u64.to_be_bytes());
        buf.extend_from_slice(&shdr);
        buf.extend_from_slice(shstrtab);

        let sections = parse(&buf, NamePolicy::Strict).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].name(), Some(""));

        let header = &sections[1].header;
        assert_eq!(sections[1].name(), Some(".shstrtab"));
        assert_eq!(header.sh_type, SHT_STRTAB);
        assert_eq!(header.sh_flags, SHF_ALLOC);
        assert_eq!(header.sh_addr, 0x8000);
        assert_eq!(header.sh_offset, shstrtab_off);
        assert_eq!(header.sh_size, shstrtab.len() as u64);
        assert_eq!(header.sh_link, 3);
        assert_eq!(header.sh_info, 4);
        assert_eq!(header.sh_addralign, 1);
    }
}
