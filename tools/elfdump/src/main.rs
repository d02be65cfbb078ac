//! ELF64 inspection tool.
//!
//! Extracts headers, sections and symbol tables with `elfmeta` and prints
//! them as tables or JSON. Each file is handled independently: a failure is
//! reported and the remaining files are still processed.

mod cli;
mod logger;
mod output;

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use elfmeta::{
    Elf64Header, Elf64ProgramHeader, ElfData, ExtractOptions, NamePolicy, Section, SymbolTable,
};
use serde::Serialize;

use cli::{Cli, Selection};

/// JSON document for one file, holding only the selected parts.
#[derive(Serialize)]
struct Report<'a> {
    path: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    header: Option<&'a Elf64Header>,
    #[serde(skip_serializing_if = "Option::is_none")]
    program_headers: Option<&'a [Elf64ProgramHeader]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sections: Option<&'a [Section]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dynamic_symbols: Option<&'a SymbolTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    static_symbols: Option<&'a SymbolTable>,
}

impl<'a> Report<'a> {
    fn new(path: &'a Path, elf: &'a ElfData, sel: Selection) -> Self {
        Self {
            path,
            header: sel.file_header.then_some(&elf.header),
            program_headers: sel.program_headers.then_some(elf.program_headers.as_slice()),
            sections: sel.sections.then_some(elf.sections.as_slice()),
            dynamic_symbols: sel.dyn_syms.then_some(&elf.dynamic_symbols),
            static_symbols: sel.symbols.then_some(&elf.static_symbols),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.quiet, cli.verbose);

    let options = ExtractOptions {
        names: if cli.lenient {
            NamePolicy::Lenient
        } else {
            NamePolicy::Strict
        },
    };

    let mut failed = false;
    for path in &cli.files {
        if let Err(err) = dump_file(&cli, path, &options) {
            log::error!("{err:#}");
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Extract one file and print the selected parts to stdout.
fn dump_file(cli: &Cli, path: &Path, options: &ExtractOptions) -> Result<()> {
    let mut elf = elfmeta::extract_with(path, options)
        .with_context(|| format!("failed to extract {}", path.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        let report = Report::new(path, &elf, cli.selection());
        serde_json::to_writer_pretty(&mut out, &report).context("failed to write JSON")?;
        writeln!(out)?;
    } else {
        write_text(&mut out, cli, path, &elf).context("failed to write output")?;
    }

    elf.release();
    Ok(())
}

fn write_text(out: &mut impl Write, cli: &Cli, path: &Path, elf: &ElfData) -> io::Result<()> {
    let sel = cli.selection();
    if cli.files.len() > 1 {
        writeln!(out, "\nFile: {}", path.display())?;
    }
    if sel.file_header {
        output::write_file_header(out, &elf.header)?;
        writeln!(out)?;
    }
    if sel.program_headers {
        output::write_program_headers(out, &elf.program_headers)?;
        writeln!(out)?;
    }
    if sel.sections {
        output::write_sections(out, &elf.sections)?;
        writeln!(out)?;
    }
    if sel.dyn_syms {
        output::write_symbols(out, ".dynsym", &elf.dynamic_symbols, cli.demangle)?;
        writeln!(out)?;
    }
    if sel.symbols {
        output::write_symbols(out, ".symtab", &elf.static_symbols, cli.demangle)?;
        writeln!(out)?;
    }
    Ok(())
}
