//! Diagnostic output on stderr.
//!
//! Three verbosity levels controlled by CLI flags:
//! - **Quiet** (`-q`): errors only
//! - **Default** (no flag): errors and warnings
//! - **Verbose** (`-v`, `-vv`): extraction stages, then per-structure detail

use log::{Level, LevelFilter, Metadata, Record};

/// Writes `log` records to stderr, formatted by level.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Error | Level::Warn => {
                let level = record.level().as_str().to_lowercase();
                eprintln!("elfdump: {level}: {}", record.args());
            }
            Level::Info => eprintln!("elfdump: {}", record.args()),
            Level::Debug | Level::Trace => {
                eprintln!("[{} {}] {}", record.level(), record.target(), record.args());
            }
        }
    }

    fn flush(&self) {}
}

/// Maps the `-q` / `-v` flags to a maximum log level.
pub fn level_filter(quiet: bool, verbose: u8) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the stderr logger for the current process.
pub fn init(quiet: bool, verbose: u8) {
    // A logger can only be installed once; a second call keeps the first.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level_filter(quiet, verbose));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_filter(true, 0), LevelFilter::Error);
        assert_eq!(level_filter(false, 0), LevelFilter::Warn);
        assert_eq!(level_filter(false, 1), LevelFilter::Debug);
        assert_eq!(level_filter(false, 5), LevelFilter::Trace);
    }
}
