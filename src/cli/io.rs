//! JSON I/O handling for CLI
//!
//! - Input: the notification envelope, from a file or stdin (`-`)
//! - Output: a single JSON document on stdout
//! - Logs never go to stdout

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde::Serialize;

use super::errors::{CliError, CliResult};

/// Read the envelope from `path`, or from stdin when `path` is `-`
pub fn read_event(path: &Path) -> CliResult<String> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().lock().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(path)
            .map_err(|e| CliError::io_error(format!("failed to read {}: {}", path.display(), e)))?
    };

    if raw.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }
    Ok(raw)
}

/// Write a value as pretty JSON to stdout
pub fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_read_event_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Records": []}}"#).unwrap();

        let raw = read_event(file.path()).unwrap();
        assert_eq!(raw, r#"{"Records": []}"#);
    }

    #[test]
    fn test_empty_event_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = read_event(file.path()).unwrap_err();
        assert_eq!(err.code_str(), "DR_CLI_IO_ERROR");
    }

    #[test]
    fn test_missing_event_file() {
        let err = read_event(Path::new("/nonexistent/event.json")).unwrap_err();
        assert!(err.message().contains("/nonexistent/event.json"));
    }
}
