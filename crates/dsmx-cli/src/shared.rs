use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

use dsmx::{ExtractError, JsonWordSource};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::page_range::parse_page_range;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the level is WARN, raised to
/// DEBUG by `-v` and TRACE by `-vv`.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Open a word dump with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr if the file is not
/// found or is not a usable dump.
pub fn open_dump(file: &Path) -> Result<JsonWordSource, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }

    JsonWordSource::open(file).map_err(|e| {
        eprintln!("Error: failed to open word dump: {e}");
        1
    })
}

/// Resolve an optional page range string into 0-indexed page indices.
///
/// If `pages` is `None`, returns all pages (0..page_count).
pub fn resolve_pages(pages: Option<&str>, page_count: usize) -> Result<Vec<usize>, i32> {
    match pages {
        Some(range) => parse_page_range(range, page_count).map_err(|e| {
            eprintln!("Error: {e}");
            1
        }),
        None => Ok((0..page_count).collect()),
    }
}

/// Print an extraction error and map it to exit code 1.
pub fn report_error(err: ExtractError) -> i32 {
    eprintln!("Error: {err}");
    1
}

/// Pretty-print `value` as JSON to `path`, or to stdout when `path` is `None`.
pub fn emit_json<T: serde::Serialize + ?Sized>(value: &T, path: Option<&Path>) -> Result<(), i32> {
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        eprintln!("Error: failed to serialize JSON: {e}");
        1
    })?;
    match path {
        Some(path) => write_file(path, &json),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

/// Write `contents` to `path`, creating missing parent directories.
pub fn write_file(path: &Path, contents: &str) -> Result<(), i32> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            eprintln!("Error: cannot create {}: {e}", parent.display());
            1
        })?;
    }
    fs::write(path, contents).map_err(|e| {
        eprintln!("Error: cannot write {}: {e}", path.display());
        1
    })
}

/// A progress reporter that prints "Processing page N/M..." to stderr,
/// but only when stderr is connected to a TTY (terminal).
pub struct ProgressReporter {
    label: &'static str,
    total: usize,
    is_tty: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter for `total` pages.
    pub fn new(label: &'static str, total: usize) -> Self {
        Self {
            label,
            total,
            is_tty: io::stderr().is_terminal(),
        }
    }

    /// Report progress for page `current` (1-indexed).
    pub fn report(&self, current: usize) {
        if self.is_tty {
            eprint!("\r{} page {}/{}...", self.label, current, self.total);
            let _ = io::stderr().flush();
        }
    }

    /// Clear the progress line (if TTY).
    pub fn finish(&self) {
        if self.is_tty {
            eprint!("\r{}\r", " ".repeat(40));
            let _ = io::stderr().flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_dump_file_not_found() {
        let result = open_dump(Path::new("/nonexistent/words.json"));
        assert_eq!(result.err(), Some(1));
    }

    #[test]
    fn resolve_pages_all_when_none() {
        assert_eq!(resolve_pages(None, 3).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn resolve_pages_invalid_range() {
        assert_eq!(resolve_pages(Some("9"), 3), Err(1));
    }

    #[test]
    fn write_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.txt");
        write_file(&path, "hello").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "hello");
    }

    #[test]
    fn emit_json_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        emit_json(&serde_json::json!({"pages": []}), Some(&path)).unwrap();
        let back: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back["pages"], serde_json::json!([]));
    }
}
