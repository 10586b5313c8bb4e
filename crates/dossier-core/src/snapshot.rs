/// JSON snapshot of users, documents and folders.
///
/// A snapshot is the on-disk stand-in for the user and document stores:
///
/// ```json
/// {
///   "users": [{ "id": "u1", "username": "alice", "role": "PRESIDENT" }],
///   "documents": [{ "id": "d1", "title": "Budget", "owner": "u1", ... }],
///   "folders": [{ "key": "GENERAL", "name": "General" }]
/// }
/// ```
///
/// Field shapes are validated by the newtype deserialisers. Cross-references
/// (owners, share targets, archivers, folder keys) and uniqueness are
/// checked by [`Snapshot::validate`]. An omitted or empty `folders` list
/// means the standing folder set.
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::folders::{DocumentFolder, FolderError, FolderRegistry};
use crate::newtypes::{DocumentId, FolderKey, UserId, Username};
use crate::structures::{Document, User};

/// Errors raised while loading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Malformed JSON or a field that failed validation.
    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Two users share an id.
    #[error("duplicate user id {0}")]
    DuplicateUser(UserId),

    /// Two users share a username.
    #[error("duplicate username {0}")]
    DuplicateUsername(Username),

    /// Two documents share an id.
    #[error("duplicate document id {0}")]
    DuplicateDocument(DocumentId),

    /// A document refers to a user that is not in the snapshot.
    #[error("document {document} refers to unknown user {user} ({field})")]
    UnknownUser {
        /// The referring document.
        document: DocumentId,
        /// The missing user.
        user: UserId,
        /// Which field holds the reference.
        field: &'static str,
    },

    /// A document is filed under a folder that is not in the snapshot.
    #[error("document {document} is filed under unknown folder {folder}")]
    UnknownFolder {
        /// The referring document.
        document: DocumentId,
        /// The missing folder key.
        folder: FolderKey,
    },

    /// The folder list itself is inconsistent.
    #[error(transparent)]
    Folder(#[from] FolderError),
}

/// Parsed snapshot contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    /// User accounts.
    #[serde(default)]
    pub users: Vec<User>,
    /// Documents, archived ones included.
    #[serde(default)]
    pub documents: Vec<Document>,
    /// Folder list; empty means the standing set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub folders: Vec<DocumentFolder>,
}

impl Snapshot {
    /// Parses and validates a snapshot.
    pub fn from_json(input: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(input)?;
        snapshot.validate()?;
        tracing::debug!(
            users = snapshot.users.len(),
            documents = snapshot.documents.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Serialises the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds the folder registry described by the snapshot.
    pub fn folder_registry(&self) -> Result<FolderRegistry, SnapshotError> {
        if self.folders.is_empty() {
            return Ok(FolderRegistry::default());
        }
        let mut registry = FolderRegistry::empty();
        for folder in &self.folders {
            registry.insert(folder.clone())?;
        }
        Ok(registry)
    }

    /// Checks uniqueness and every cross-reference.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut user_ids = HashSet::new();
        let mut usernames = HashSet::new();
        for u in &self.users {
            if !user_ids.insert(&u.id) {
                return Err(SnapshotError::DuplicateUser(u.id.clone()));
            }
            if !usernames.insert(u.username.to_lowercase()) {
                return Err(SnapshotError::DuplicateUsername(u.username.clone()));
            }
        }

        let folders = self.folder_registry()?;
        let mut doc_ids = HashSet::new();
        for d in &self.documents {
            if !doc_ids.insert(&d.id) {
                return Err(SnapshotError::DuplicateDocument(d.id.clone()));
            }
            let unknown = |user: &UserId, field| SnapshotError::UnknownUser {
                document: d.id.clone(),
                user: user.clone(),
                field,
            };
            if !user_ids.contains(d.owner()) {
                return Err(unknown(d.owner(), "owner"));
            }
            if let Some(target) = d.shared_with.iter().find(|u| !user_ids.contains(u)) {
                return Err(unknown(target, "shared_with"));
            }
            if let Some(by) = d.archived_by.as_ref().filter(|u| !user_ids.contains(u)) {
                return Err(unknown(by, "archived_by"));
            }
            if !folders.contains(&d.section) {
                return Err(SnapshotError::UnknownFolder {
                    document: d.id.clone(),
                    folder: d.section.clone(),
                });
            }
        }
        Ok(())
    }

    /// Looks up a user by id.
    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == *id)
    }

    /// Looks up a document by id.
    pub fn document(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == *id)
    }
}
