/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `dossier` binary. Every
/// variant maps to a stable exit code (1 or 2) via [`CliError::exit_code`]:
///
/// - Exit code **2**: input failure. The snapshot or configuration could not
///   be read, parsed or resolved, so no decision was made.
/// - Exit code **1**: logical failure. The command ran to completion and the
///   answer is negative (access denied, readings disagree).
use std::fmt;
use std::path::PathBuf;

/// All error conditions that the `dossier` CLI can produce.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read a file.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// The input exceeds the `--max-file-size` limit.
    FileTooLarge {
        /// `"-"` for stdin, or the filesystem path.
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size, when known (disk files only).
        actual: Option<u64>,
    },

    /// The input bytes are not valid UTF-8.
    InvalidUtf8 {
        /// `"-"` for stdin, or the filesystem path.
        source: String,
        /// Offset of the first invalid byte.
        byte_offset: usize,
    },

    /// Reading stdin failed.
    StdinReadError {
        /// The underlying I/O error message.
        detail: String,
    },

    /// Any other I/O error.
    IoError {
        /// What was being read or written.
        source: String,
        /// The underlying I/O error message.
        detail: String,
    },

    /// The snapshot is malformed or inconsistent.
    InvalidSnapshot {
        /// Parser or validation message.
        detail: String,
    },

    /// The policy configuration is malformed or names unknown roles/tiers.
    InvalidConfig {
        /// Parser or validation message.
        detail: String,
    },

    /// `--user` names nobody in the snapshot.
    UnknownUser {
        /// The id or username given.
        user: String,
    },

    /// `--document` names no document in the snapshot.
    UnknownDocument {
        /// The id given.
        document: String,
    },

    /// An argument failed domain validation after clap accepted it.
    InvalidArgument {
        /// What was wrong.
        detail: String,
    },

    // --- Exit code 1: logical failures ---
    /// `check` evaluated to deny. The decision has already been printed.
    AccessDenied,

    /// `verify` found disagreements. The report has already been printed.
    Inconsistent {
        /// Number of disagreeing or leaking pairs.
        count: usize,
    },
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::StdinReadError { .. }
            | Self::IoError { .. }
            | Self::InvalidSnapshot { .. }
            | Self::InvalidConfig { .. }
            | Self::UnknownUser { .. }
            | Self::UnknownDocument { .. }
            | Self::InvalidArgument { .. } => 2,

            Self::AccessDenied | Self::Inconsistent { .. } => 1,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: Some(actual),
            } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: None,
            } => {
                format!("error: file too large: {source} exceeded limit of {limit} bytes")
            }
            Self::InvalidUtf8 {
                source,
                byte_offset,
            } => {
                format!(
                    "error: invalid UTF-8 in {source}: first invalid byte at offset {byte_offset}"
                )
            }
            Self::StdinReadError { detail } => {
                format!("error: failed to read stdin: {detail}")
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error on {source}: {detail}")
            }
            Self::InvalidSnapshot { detail } => format!("error: snapshot rejected: {detail}"),
            Self::InvalidConfig { detail } => {
                format!("error: policy configuration rejected: {detail}")
            }
            Self::UnknownUser { user } => format!("error: unknown user: {user}"),
            Self::UnknownDocument { document } => {
                format!("error: unknown document: {document}")
            }
            Self::InvalidArgument { detail } => format!("error: {detail}"),
            Self::AccessDenied => "error: access denied".to_owned(),
            Self::Inconsistent { count } => {
                format!("error: {count} pair(s) where the decision and the predicate disagree")
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

impl From<dossier_core::SnapshotError> for CliError {
    fn from(e: dossier_core::SnapshotError) -> Self {
        Self::InvalidSnapshot {
            detail: e.to_string(),
        }
    }
}

impl From<dossier_core::ConfigError> for CliError {
    fn from(e: dossier_core::ConfigError) -> Self {
        Self::InvalidConfig {
            detail: e.to_string(),
        }
    }
}
