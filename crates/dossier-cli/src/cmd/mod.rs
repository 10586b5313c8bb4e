/// Command modules for the `dossier` CLI.
///
/// Each submodule implements one subcommand. Its `run` function takes the
/// shared [`Context`] plus the parsed arguments and returns `Ok(())` on
/// success or a [`CliError`] on failure.
pub mod check;
pub mod dashboard;
pub mod list;
pub mod predicate;
pub mod roles;
pub mod verify;

use dossier_core::{AccessPolicy, PolicyConfig, Snapshot, User};

use crate::OutputFormat;
use crate::cli::SubjectArgs;
use crate::error::CliError;
use crate::io;

/// State resolved once from the global flags.
#[derive(Debug)]
pub struct Context {
    /// Policy built from the configuration.
    pub policy: AccessPolicy,
    /// The configuration itself (report settings).
    pub config: PolicyConfig,
    /// Requested output format.
    pub format: OutputFormat,
    /// Whether human output may use ANSI colors.
    pub colors: bool,
    /// Input size cap in bytes.
    pub max_file_size: u64,
}

impl Context {
    /// Loads the snapshot named by `subject` and resolves the acting user.
    pub fn load_subject(&self, subject: &SubjectArgs) -> Result<(Snapshot, User), CliError> {
        let snapshot = io::load_snapshot(&subject.file, self.max_file_size)?;
        let user = find_user(&snapshot, &subject.user)?.clone();
        Ok((snapshot, user))
    }
}

/// Finds a user by id, falling back to a case-insensitive username match.
pub fn find_user<'a>(snapshot: &'a Snapshot, key: &str) -> Result<&'a User, CliError> {
    snapshot
        .users
        .iter()
        .find(|u| &*u.id == key)
        .or_else(|| {
            snapshot
                .users
                .iter()
                .find(|u| u.username.eq_ignore_ascii_case(key))
        })
        .ok_or_else(|| CliError::UnknownUser {
            user: key.to_owned(),
        })
}

/// Describes a user as `name (Role Label, tier)`.
pub fn describe_user(policy: &AccessPolicy, user: &User) -> String {
    let role = user.role.map_or("no role", |r| r.label());
    let superuser = if user.is_superuser { ", superuser" } else { "" };
    format!(
        "{} ({role}, {}{superuser})",
        user.username,
        policy.tier_of(user)
    )
}
