/// The user and document records the access engine reads.
///
/// Only a handful of fields matter to access decisions: a user's role and
/// superuser flag, and a document's owner, classification, share list and
/// archival state. The remaining fields are carried for listing, search and
/// reporting.
use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classification::Classification;
use crate::newtypes::{DocumentId, FolderKey, UserId, Username};
use crate::role::Role;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A user account as seen by the access engine.
///
/// The tier is never stored; it is recomputed from `role` (and
/// `is_superuser`) on every decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable reference used for ownership and sharing.
    pub id: UserId,
    /// Login name, used by owner search.
    pub username: Username,
    /// Assigned role; `None` behaves exactly like a regular-tier role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Site operators evaluate as the full tier regardless of role.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_superuser: bool,
}

impl User {
    /// Creates a non-superuser account with the given role.
    pub fn new(id: UserId, username: Username, role: Option<Role>) -> Self {
        Self {
            id,
            username,
            role,
            is_superuser: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A stored document and its access-control metadata.
///
/// `owner` is fixed at creation and has no setter. Classification, the share
/// list and archival state change only through the repository, which checks
/// the caller's rights first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier.
    pub id: DocumentId,
    /// Title shown in listings.
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Original file name of the upload (storage path is not tracked here).
    #[serde(default)]
    pub file_name: String,
    /// Size of the upload in bytes.
    #[serde(default)]
    pub file_size: u64,
    /// MIME type reported at upload.
    #[serde(default)]
    pub file_type: String,
    owner: UserId,
    /// Sensitivity level.
    #[serde(default)]
    pub classification: Classification,
    /// Folder the document is filed under.
    #[serde(default)]
    pub section: FolderKey,
    /// Free-text category.
    #[serde(default)]
    pub category: String,
    /// Tags, already split and trimmed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Upload time.
    pub created_at: DateTime<Utc>,
    /// Last metadata change.
    pub updated_at: DateTime<Utc>,
    /// Archived documents are invisible to every access path.
    #[serde(default)]
    pub is_archived: bool,
    /// When the document was archived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    /// Who archived the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_by: Option<UserId>,
    /// Users granted access explicitly.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub shared_with: BTreeSet<UserId>,
}

impl Document {
    /// Creates an unarchived, unshared `internal` document in `GENERAL`.
    pub fn new(id: DocumentId, title: impl Into<String>, owner: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            file_name: String::new(),
            file_size: 0,
            file_type: String::new(),
            owner,
            classification: Classification::default(),
            section: FolderKey::default(),
            category: String::new(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            is_archived: false,
            archived_at: None,
            archived_by: None,
            shared_with: BTreeSet::new(),
        }
    }

    /// Returns the owning user.
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    /// Returns `true` if `user` owns the document.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }

    /// Returns `true` if the document has been shared with `user`.
    pub fn is_shared_with(&self, user: &UserId) -> bool {
        self.shared_with.contains(user)
    }

    /// Sets the classification (builder form).
    #[must_use]
    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = classification;
        self
    }

    /// Adds `users` to the share list (builder form).
    #[must_use]
    pub fn shared_with_users<I: IntoIterator<Item = UserId>>(mut self, users: I) -> Self {
        self.shared_with.extend(users);
        self
    }

    /// Marks the document archived by `by` at `at` (builder form).
    #[must_use]
    pub fn archived(mut self, by: UserId, at: DateTime<Utc>) -> Self {
        self.is_archived = true;
        self.archived_by = Some(by);
        self.archived_at = Some(at);
        self
    }

    /// Returns the lowercased extension of the uploaded file name, with the
    /// leading dot (`".pdf"`), or an empty string.
    pub fn file_extension(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default()
    }
}

/// Splits a comma-separated tag string into trimmed, non-empty tags.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}
