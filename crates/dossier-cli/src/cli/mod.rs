//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use dossier_core::Classification;

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// Output format for CLI commands.
///
/// `Human` prints aligned text to stdout. `Json` prints a single
/// pretty-printed JSON value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default).
    Human,
    /// Structured JSON output.
    Json,
}

/// Arguments shared by every command that evaluates on behalf of a user.
#[derive(Clone, Debug, clap::Args)]
pub struct SubjectArgs {
    /// Snapshot file (`{"users": [...], "documents": [...]}`), or `-` for stdin.
    #[arg(value_name = "FILE")]
    pub file: PathOrStdin,
    /// The acting user, by id or username.
    #[arg(long, short = 'u', value_name = "USER")]
    pub user: String,
}

/// All top-level subcommands exposed by the `dossier` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Decide whether a user may access one document.
    ///
    /// Exits 0 when access is granted and 1 when it is denied.
    Check {
        #[command(flatten)]
        subject: SubjectArgs,
        /// The document id.
        #[arg(long, short = 'd', value_name = "DOCUMENT")]
        document: String,
    },

    /// List the documents a user may access, newest first.
    List {
        #[command(flatten)]
        subject: SubjectArgs,
        /// Case-insensitive substring over title, description and file name.
        #[arg(long)]
        query: Option<String>,
        /// Only documents at this classification level.
        #[arg(long)]
        classification: Option<Classification>,
        /// Case-insensitive substring over the category.
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive substring over the owner's username.
        #[arg(long)]
        owner: Option<String>,
        /// Only documents filed under this folder key.
        #[arg(long, value_name = "KEY")]
        section: Option<String>,
        /// Created on or after this date (YYYY-MM-DD).
        #[arg(long, value_name = "DATE")]
        from: Option<NaiveDate>,
        /// Created on or before this date (YYYY-MM-DD).
        #[arg(long, value_name = "DATE")]
        to: Option<NaiveDate>,
        /// Number of leading results to skip.
        #[arg(long, default_value = "0")]
        offset: usize,
        /// Maximum number of results.
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Print the accessible-document predicate for a user.
    Predicate {
        #[command(flatten)]
        subject: SubjectArgs,
        /// Render a parameterised SQL WHERE fragment instead.
        #[arg(long)]
        sql: bool,
    },

    /// Check that the per-document decision and the bulk predicate agree.
    ///
    /// Evaluates every user against every document in the snapshot, then
    /// (unless `--snapshot-only`) the synthetic space of every role,
    /// classification, ownership, sharing and archival combination.
    /// Exits 1 on any disagreement or visible archived document.
    Verify {
        /// Snapshot file, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
        /// Skip the synthetic combinations.
        #[arg(long)]
        snapshot_only: bool,
    },

    /// List every role with its tier under the active policy.
    Roles,

    /// Print a user's dashboard summary.
    Dashboard {
        #[command(flatten)]
        subject: SubjectArgs,
        /// Reference time for the "recent" window (RFC 3339). Defaults to now.
        #[arg(long, value_name = "TIMESTAMP")]
        now: Option<DateTime<Utc>>,
    },
}

/// Root CLI struct for the `dossier` binary.
///
/// All global flags are defined here and marked `global = true` so that clap
/// propagates them to every subcommand.
#[derive(Parser)]
#[command(
    name = "dossier",
    version,
    about = "Document access policy tool",
    long_about = "Evaluates role-based document access against a JSON snapshot of\n\
                  users and documents: single decisions, listings, predicates,\n\
                  dashboards and equivalence checks."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Output format: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Only log errors (incompatible with `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log debug detail to stderr (incompatible with `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Policy configuration file (role→tier overrides, report settings).
    #[arg(long, global = true, env = "DOSSIER_POLICY_CONFIG", value_name = "FILE")]
    pub policy_config: Option<PathBuf>,

    /// Maximum input file size in bytes.
    ///
    /// Can also be set via the `DOSSIER_MAX_FILE_SIZE` environment variable.
    /// Default: 67108864 (64 MB).
    #[arg(
        long,
        global = true,
        env = "DOSSIER_MAX_FILE_SIZE",
        default_value = "67108864"
    )]
    pub max_file_size: u64,

    /// Disable ANSI color codes in human output.
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,
}

#[cfg(test)]
mod tests;
