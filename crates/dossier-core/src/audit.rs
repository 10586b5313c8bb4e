/// Audit trail for security-relevant actions.
///
/// The access engine never records anything itself. Callers (the
/// [`Repository`](crate::repository::Repository) in this crate) build an
/// [`AuditEntry`] after a successful, security-relevant operation and hand it
/// to an [`AuditSink`].
use std::fmt;
use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::newtypes::UserId;

/// Kinds of audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Successful sign-in.
    Login,
    /// Sign-out.
    Logout,
    /// Account creation.
    Register,
    /// Password reset completed.
    PasswordReset,
    /// A user's role was reassigned.
    RoleChange,
    /// A document was uploaded.
    DocumentUpload,
    /// A document's details were viewed.
    DocumentView,
    /// A document's file was downloaded.
    DocumentDownload,
    /// A document's metadata or share list changed.
    DocumentUpdate,
    /// A document was archived.
    DocumentArchive,
    /// An archived document was restored.
    DocumentRestore,
    /// A folder was added, renamed or removed.
    FolderChange,
}

impl AuditAction {
    /// Every action, in declaration order.
    pub const ALL: [AuditAction; 12] = [
        AuditAction::Login,
        AuditAction::Logout,
        AuditAction::Register,
        AuditAction::PasswordReset,
        AuditAction::RoleChange,
        AuditAction::DocumentUpload,
        AuditAction::DocumentView,
        AuditAction::DocumentDownload,
        AuditAction::DocumentUpdate,
        AuditAction::DocumentArchive,
        AuditAction::DocumentRestore,
        AuditAction::FolderChange,
    ];

    /// Upper-snake wire name (`DOCUMENT_VIEW`).
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Login => "LOGIN",
            AuditAction::Logout => "LOGOUT",
            AuditAction::Register => "REGISTER",
            AuditAction::PasswordReset => "PASSWORD_RESET",
            AuditAction::RoleChange => "ROLE_CHANGE",
            AuditAction::DocumentUpload => "DOCUMENT_UPLOAD",
            AuditAction::DocumentView => "DOCUMENT_VIEW",
            AuditAction::DocumentDownload => "DOCUMENT_DOWNLOAD",
            AuditAction::DocumentUpdate => "DOCUMENT_UPDATE",
            AuditAction::DocumentArchive => "DOCUMENT_ARCHIVE",
            AuditAction::DocumentRestore => "DOCUMENT_RESTORE",
            AuditAction::FolderChange => "FOLDER_CHANGE",
        }
    }

    /// Actions reported by the session layer rather than by the repository.
    pub fn is_session_event(self) -> bool {
        match self {
            AuditAction::Login | AuditAction::Logout | AuditAction::PasswordReset => true,
            AuditAction::Register
            | AuditAction::RoleChange
            | AuditAction::DocumentUpload
            | AuditAction::DocumentView
            | AuditAction::DocumentDownload
            | AuditAction::DocumentUpdate
            | AuditAction::DocumentArchive
            | AuditAction::DocumentRestore
            | AuditAction::FolderChange => false,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Acting user.
    pub user: UserId,
    /// What happened.
    pub action: AuditAction,
    /// Free-text detail (`"Viewed document: Budget"`).
    #[serde(default)]
    pub description: String,
    /// Client address, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<IpAddr>,
    /// Client user agent, if known.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_agent: String,
    /// When the action happened.
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    /// Creates an entry with no client details.
    pub fn new(
        user: UserId,
        action: AuditAction,
        description: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            user,
            action,
            description: description.into(),
            ip_address: None,
            user_agent: String::new(),
            timestamp,
        }
    }

    /// Attaches client details (builder form).
    #[must_use]
    pub fn with_client(mut self, client: &ClientInfo) -> Self {
        self.ip_address = client.ip_address;
        self.user_agent.clone_from(&client.user_agent);
        self
    }
}

/// Request metadata the transport layer passes down for auditing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    /// Resolved client address (see [`client_ip`]).
    pub ip_address: Option<IpAddr>,
    /// Raw user-agent header.
    pub user_agent: String,
}

/// Resolves the client address from a forwarded-for header and the socket
/// peer address.
///
/// The first comma-separated entry of `forwarded_for` wins if it parses as
/// an IP address; otherwise `remote_addr` is used. Unparseable input yields
/// `None`.
pub fn client_ip(forwarded_for: Option<&str>, remote_addr: Option<&str>) -> Option<IpAddr> {
    let forwarded = forwarded_for
        .and_then(|h| h.split(',').next())
        .and_then(|first| first.trim().parse().ok());
    forwarded.or_else(|| remote_addr.and_then(|r| r.trim().parse().ok()))
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Destination for audit entries.
pub trait AuditSink: Send + Sync {
    /// Records one entry.
    fn record(&self, entry: AuditEntry);
}

/// Emits each entry as an `info` event on the `dossier::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: AuditEntry) {
        tracing::info!(
            target: "dossier::audit",
            user = %entry.user,
            action = %entry.action,
            ip = ?entry.ip_address,
            timestamp = %entry.timestamp,
            "{}",
            entry.description
        );
    }
}

/// In-memory audit log.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every entry, newest first. Entries with equal
    /// timestamps come out in reverse recording order.
    pub fn entries(&self) -> Vec<AuditEntry> {
        let guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out: Vec<AuditEntry> = guard.iter().rev().cloned().collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        out
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditLog {
    fn record(&self, entry: AuditEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

impl<S: AuditSink + ?Sized> AuditSink for std::sync::Arc<S> {
    fn record(&self, entry: AuditEntry) {
        (**self).record(entry);
    }
}

// ---------------------------------------------------------------------------
// Activity filter
// ---------------------------------------------------------------------------

/// Criteria for the activity report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityFilter {
    /// Only this action.
    pub action: Option<AuditAction>,
    /// Only this user.
    pub user: Option<UserId>,
    /// Not before (inclusive).
    pub from: Option<DateTime<Utc>>,
    /// Not after (inclusive).
    pub to: Option<DateTime<Utc>>,
    /// Maximum number of entries returned.
    pub limit: usize,
}

impl Default for ActivityFilter {
    fn default() -> Self {
        Self {
            action: None,
            user: None,
            from: None,
            to: None,
            limit: crate::config::DEFAULT_ACTIVITY_REPORT_LIMIT,
        }
    }
}

impl ActivityFilter {
    /// Tests one entry (the limit is applied by the caller).
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        self.action.is_none_or(|a| a == entry.action)
            && self.user.as_ref().is_none_or(|u| *u == entry.user)
            && self.from.is_none_or(|from| entry.timestamp >= from)
            && self.to.is_none_or(|to| entry.timestamp <= to)
    }
}
