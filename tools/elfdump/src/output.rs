//! Terminal output formatting for extracted ELF metadata.

use std::io::{self, Write};

use elfmeta::header::{ELFCLASS32, ELFCLASS64, ELFDATA2LSB, ELFDATA2MSB};
use elfmeta::section::{
    SHT_DYNAMIC, SHT_HASH, SHT_NOTE, SHT_NULL, SHT_REL, SHT_RELA, SHT_STRTAB, SHT_SYMTAB,
};
use elfmeta::segment::{PT_DYNAMIC, PT_INTERP, PT_NOTE, PT_NULL, PT_PHDR, PT_TLS};
use elfmeta::symbol::{STT_FILE, STT_NOTYPE, STT_SECTION, STT_TLS};
use elfmeta::{
    Elf64Header, Elf64ProgramHeader, PF_R, PF_W, PF_X, PT_LOAD, SHF_ALLOC, SHF_EXECINSTR,
    SHF_WRITE, SHN_ABS, SHN_COMMON, SHN_UNDEF, SHT_DYNSYM, SHT_NOBITS, SHT_PROGBITS,
    STB_GLOBAL, STB_LOCAL, STB_WEAK, STT_FUNC, STT_OBJECT, Section, SymbolTable,
};

/// Render a symbol name, demangling Rust symbols when requested.
pub fn display_name(name: Option<&str>, demangle: bool) -> String {
    match name {
        Some(raw) if demangle => format!("{:#}", rustc_demangle::demangle(raw)),
        Some(raw) => raw.to_owned(),
        None => String::new(),
    }
}

fn class_name(class: u8) -> &'static str {
    match class {
        ELFCLASS32 => "ELF32",
        ELFCLASS64 => "ELF64",
        _ => "unknown",
    }
}

fn encoding_name(data: u8) -> &'static str {
    match data {
        ELFDATA2LSB => "little-endian",
        ELFDATA2MSB => "big-endian",
        _ => "unknown",
    }
}

fn segment_type_name(p_type: u32) -> String {
    match p_type {
        PT_NULL => "NULL".into(),
        PT_LOAD => "LOAD".into(),
        PT_DYNAMIC => "DYNAMIC".into(),
        PT_INTERP => "INTERP".into(),
        PT_NOTE => "NOTE".into(),
        PT_PHDR => "PHDR".into(),
        PT_TLS => "TLS".into(),
        0x6474_e550 => "GNU_EH_FRAME".into(),
        0x6474_e551 => "GNU_STACK".into(),
        0x6474_e552 => "GNU_RELRO".into(),
        0x6474_e553 => "GNU_PROPERTY".into(),
        other => format!("{other:#x}"),
    }
}

fn segment_flags(flags: u32) -> String {
    [(PF_R, 'R'), (PF_W, 'W'), (PF_X, 'E')]
        .iter()
        .map(|&(bit, c)| if flags & bit != 0 { c } else { ' ' })
        .collect()
}

fn section_type_name(sh_type: u32) -> String {
    match sh_type {
        SHT_NULL => "NULL".into(),
        SHT_PROGBITS => "PROGBITS".into(),
        SHT_SYMTAB => "SYMTAB".into(),
        SHT_STRTAB => "STRTAB".into(),
        SHT_RELA => "RELA".into(),
        SHT_HASH => "HASH".into(),
        SHT_DYNAMIC => "DYNAMIC".into(),
        SHT_NOTE => "NOTE".into(),
        SHT_NOBITS => "NOBITS".into(),
        SHT_REL => "REL".into(),
        SHT_DYNSYM => "DYNSYM".into(),
        other => format!("{other:#x}"),
    }
}

fn section_flags(flags: u64) -> String {
    [(SHF_WRITE, 'W'), (SHF_ALLOC, 'A'), (SHF_EXECINSTR, 'X')]
        .iter()
        .filter(|&&(bit, _)| flags & bit != 0)
        .map(|&(_, c)| c)
        .collect()
}

fn symbol_type_name(sym_type: u8) -> String {
    match sym_type {
        STT_NOTYPE => "NOTYPE".into(),
        STT_OBJECT => "OBJECT".into(),
        STT_FUNC => "FUNC".into(),
        STT_SECTION => "SECTION".into(),
        STT_FILE => "FILE".into(),
        STT_TLS => "TLS".into(),
        other => other.to_string(),
    }
}

fn symbol_bind_name(bind: u8) -> String {
    match bind {
        STB_LOCAL => "LOCAL".into(),
        STB_GLOBAL => "GLOBAL".into(),
        STB_WEAK => "WEAK".into(),
        other => other.to_string(),
    }
}

fn section_index(shndx: u16) -> String {
    match shndx {
        SHN_UNDEF => "UND".into(),
        SHN_ABS => "ABS".into(),
        SHN_COMMON => "COM".into(),
        other => other.to_string(),
    }
}

/// Print the file header.
pub fn write_file_header(out: &mut impl Write, hdr: &Elf64Header) -> io::Result<()> {
    writeln!(out, "ELF Header:")?;
    write!(out, "  Magic:  ")?;
    for b in hdr.e_ident {
        write!(out, " {b:02x}")?;
    }
    writeln!(out)?;
    writeln!(out, "  Class:                 {}", class_name(hdr.class()))?;
    writeln!(out, "  Data:                  {}", encoding_name(hdr.data_encoding()))?;
    writeln!(out, "  OS/ABI:                {}", hdr.os_abi())?;
    writeln!(out, "  Type:                  {:?}", hdr.elf_type())?;
    writeln!(out, "  Machine:               {}", hdr.e_machine)?;
    writeln!(out, "  Version:               {}", hdr.e_version)?;
    writeln!(out, "  Entry point:           {:#x}", hdr.e_entry)?;
    writeln!(
        out,
        "  Program headers:       {} x {} bytes at {:#x}",
        hdr.e_phnum, hdr.e_phentsize, hdr.e_phoff
    )?;
    writeln!(
        out,
        "  Section headers:       {} x {} bytes at {:#x}",
        hdr.e_shnum, hdr.e_shentsize, hdr.e_shoff
    )?;
    writeln!(out, "  Flags:                 {:#x}", hdr.e_flags)?;
    writeln!(out, "  Header size:           {}", hdr.e_ehsize)?;
    writeln!(out, "  Section name index:    {}", hdr.e_shstrndx)?;
    Ok(())
}

/// Print the program header table.
pub fn write_program_headers(
    out: &mut impl Write,
    phdrs: &[Elf64ProgramHeader],
) -> io::Result<()> {
    if phdrs.is_empty() {
        writeln!(out, "There are no program headers in this file.")?;
        return Ok(());
    }

    writeln!(out, "Program Headers:")?;
    writeln!(
        out,
        "  {:<14} {:>18} {:>18} {:>18} {:>18} {:>18} {:<3} {:>8}",
        "Type", "Offset", "VirtAddr", "PhysAddr", "FileSiz", "MemSiz", "Flg", "Align"
    )?;
    for p in phdrs {
        writeln!(
            out,
            "  {:<14} {:#018x} {:#018x} {:#018x} {:#018x} {:#018x} {:<3} {:#8x}",
            segment_type_name(p.p_type),
            p.p_offset,
            p.p_vaddr,
            p.p_paddr,
            p.p_filesz,
            p.p_memsz,
            segment_flags(p.p_flags),
            p.p_align
        )?;
    }
    Ok(())
}

/// Print the section header table.
pub fn write_sections(out: &mut impl Write, sections: &[Section]) -> io::Result<()> {
    if sections.is_empty() {
        writeln!(out, "There are no sections in this file.")?;
        return Ok(());
    }

    let max_name = sections
        .iter()
        .filter_map(Section::name)
        .map(str::len)
        .max()
        .unwrap_or(4)
        .max(4);

    writeln!(out, "Section Headers:")?;
    writeln!(
        out,
        "  [{:>3}] {:<width$} {:<12} {:>18} {:>10} {:>10} {:>6} {:<3} {:>4} {:>4} {:>5}",
        "Nr", "Name", "Type", "Address", "Offset", "Size", "EntSz", "Flg", "Lk", "Inf", "Al",
        width = max_name
    )?;
    for (i, s) in sections.iter().enumerate() {
        let h = &s.header;
        writeln!(
            out,
            "  [{:>3}] {:<width$} {:<12} {:#018x} {:#010x} {:#010x} {:>6} {:<3} {:>4} {:>4} {:>5}",
            i,
            s.name().unwrap_or(""),
            section_type_name(h.sh_type),
            h.sh_addr,
            h.sh_offset,
            h.sh_size,
            h.sh_entsize,
            section_flags(h.sh_flags),
            h.sh_link,
            h.sh_info,
            h.sh_addralign,
            width = max_name
        )?;
    }
    Ok(())
}

/// Print one symbol table under `title`.
pub fn write_symbols(
    out: &mut impl Write,
    title: &str,
    table: &SymbolTable,
    demangle: bool,
) -> io::Result<()> {
    if table.is_empty() {
        writeln!(out, "Symbol table '{title}' is empty or absent.")?;
        return Ok(());
    }

    writeln!(out, "Symbol table '{title}' contains {} entries:", table.len())?;
    writeln!(
        out,
        "  {:>6}: {:>18} {:>6} {:<8} {:<7} {:>4} {:>4} Name",
        "Num", "Value", "Size", "Type", "Bind", "Vis", "Ndx"
    )?;
    for (i, sym) in table.iter().enumerate() {
        let raw = &sym.raw;
        writeln!(
            out,
            "  {:>6}: {:#018x} {:>6} {:<8} {:<7} {:>4} {:>4} {}",
            i,
            raw.st_value,
            raw.st_size,
            symbol_type_name(raw.sym_type()),
            symbol_bind_name(raw.sym_bind()),
            raw.visibility(),
            section_index(raw.st_shndx),
            display_name(sym.name(), demangle)
        )?;
    }
    Ok(())
}
