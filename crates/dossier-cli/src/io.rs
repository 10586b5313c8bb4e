/// Input reading with size enforcement and UTF-8 validation.
///
/// `dossier-core` never touches the filesystem; every snapshot and policy
/// configuration is read here and handed over as a `&str`. All failures are
/// [`CliError`] variants with exit code 2.
use std::io::Read as _;
use std::path::Path;

use dossier_core::{PolicyConfig, Snapshot};

use crate::PathOrStdin;
use crate::error::CliError;

/// Reads the entire contents of `source` into a `String`.
///
/// Disk files are size-checked via metadata before any byte is read; stdin
/// is read through a `take` cap so the allocation stays bounded.
pub fn read_input(source: &PathOrStdin, max_size: u64) -> Result<String, CliError> {
    match source {
        PathOrStdin::Path(path) => read_file(path, max_size),
        PathOrStdin::Stdin => read_stdin(max_size),
    }
}

/// Reads and validates a snapshot.
pub fn load_snapshot(source: &PathOrStdin, max_size: u64) -> Result<Snapshot, CliError> {
    let content = read_input(source, max_size)?;
    Ok(Snapshot::from_json(&content)?)
}

/// Reads the policy configuration, or returns the defaults when no file was
/// given.
pub fn load_config(path: Option<&Path>, max_size: u64) -> Result<PolicyConfig, CliError> {
    let Some(path) = path else {
        return Ok(PolicyConfig::default());
    };
    let content = read_file(path, max_size)?;
    let config = PolicyConfig::from_json(&content)?;
    tracing::debug!(path = %path.display(), "policy configuration loaded");
    Ok(config)
}

fn read_file(path: &Path, max_size: u64) -> Result<String, CliError> {
    let file_size = std::fs::metadata(path)
        .map_err(|e| io_error_to_cli(&e, path))?
        .len();
    if file_size > max_size {
        return Err(CliError::FileTooLarge {
            source: path.display().to_string(),
            limit: max_size,
            actual: Some(file_size),
        });
    }
    let bytes = std::fs::read(path).map_err(|e| io_error_to_cli(&e, path))?;
    bytes_to_string(bytes, &path.display().to_string())
}

fn io_error_to_cli(e: &std::io::Error, path: &Path) -> CliError {
    let kind = e.kind();
    if kind == std::io::ErrorKind::NotFound {
        CliError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else if kind == std::io::ErrorKind::PermissionDenied {
        CliError::PermissionDenied {
            path: path.to_path_buf(),
        }
    } else {
        CliError::IoError {
            source: path.display().to_string(),
            detail: e.to_string(),
        }
    }
}

/// Reads stdin up to `max_size` bytes, probing one extra byte to tell
/// "exactly at the limit" from "over it".
fn read_stdin(max_size: u64) -> Result<String, CliError> {
    let stdin = std::io::stdin();
    let mut handle = stdin.lock();
    let mut buf: Vec<u8> = Vec::new();
    (&mut handle)
        .take(max_size)
        .read_to_end(&mut buf)
        .map_err(|e| CliError::StdinReadError {
            detail: e.to_string(),
        })?;

    if buf.len() as u64 == max_size {
        let mut probe = [0u8; 1];
        let extra = handle
            .read(&mut probe)
            .map_err(|e| CliError::StdinReadError {
                detail: e.to_string(),
            })?;
        if extra > 0 {
            return Err(CliError::FileTooLarge {
                source: "-".to_owned(),
                limit: max_size,
                actual: None,
            });
        }
    }

    bytes_to_string(buf, "-")
}

fn bytes_to_string(bytes: Vec<u8>, source_label: &str) -> Result<String, CliError> {
    String::from_utf8(bytes).map_err(|e| CliError::InvalidUtf8 {
        source: source_label.to_owned(),
        byte_offset: e.utf8_error().valid_up_to(),
    })
}
