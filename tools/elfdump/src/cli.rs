//! Command-line interface definitions for elfdump.

use std::path::PathBuf;

use clap::Parser;

/// Print ELF64 headers, sections and symbol tables.
#[derive(Parser, Debug)]
#[command(name = "elfdump", version, about)]
pub struct Cli {
    /// ELF files to inspect.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Show the file header.
    #[arg(long = "file-header", short = 'H')]
    pub file_header: bool,

    /// Show the program header table.
    #[arg(long, short = 'l')]
    pub program_headers: bool,

    /// Show the section header table.
    #[arg(long, short = 'S')]
    pub sections: bool,

    /// Show the static symbol table (`.symtab`).
    #[arg(long, short = 's')]
    pub symbols: bool,

    /// Show the dynamic symbol table (`.dynsym`).
    #[arg(long)]
    pub dyn_syms: bool,

    /// Emit one JSON document per file instead of tables.
    #[arg(long)]
    pub json: bool,

    /// Demangle Rust symbol names.
    #[arg(long, short = 'C')]
    pub demangle: bool,

    /// Leave unresolvable names empty instead of failing.
    #[arg(long)]
    pub lenient: bool,

    /// Show only errors.
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show extraction diagnostics (repeat for more detail).
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// The parts of a file selected for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Selection {
    pub file_header: bool,
    pub program_headers: bool,
    pub sections: bool,
    pub symbols: bool,
    pub dyn_syms: bool,
}

impl Cli {
    /// Returns the selected parts; selecting nothing selects everything.
    pub fn selection(&self) -> Selection {
        let any = self.file_header
            || self.program_headers
            || self.sections
            || self.symbols
            || self.dyn_syms;
        Selection {
            file_header: self.file_header || !any,
            program_headers: self.program_headers || !any,
            sections: self.sections || !any,
            symbols: self.symbols || !any,
            dyn_syms: self.dyn_syms || !any,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_selects_everything() {
        let cli = Cli::parse_from(["elfdump", "a.out"]);
        let sel = cli.selection();
        assert!(sel.file_header && sel.program_headers && sel.sections);
        assert!(sel.symbols && sel.dyn_syms);
    }

    #[test]
    fn explicit_selection() {
        let cli = Cli::parse_from(["elfdump", "-S", "--dyn-syms", "a.out", "b.so"]);
        let sel = cli.selection();
        assert!(sel.sections && sel.dyn_syms);
        assert!(!sel.file_header && !sel.program_headers && !sel.symbols);
        assert_eq!(cli.files.len(), 2);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["elfdump", "-q", "-v", "a.out"]).is_err());
    }

    #[test]
    fn files_are_required() {
        assert!(Cli::try_parse_from(["elfdump"]).is_err());
    }

    #[test]
    fn verbose_counts() {
        let cli = Cli::parse_from(["elfdump", "-vv", "a.out"]);
        assert_eq!(cli.verbose, 2);
    }
}
