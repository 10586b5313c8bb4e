/// Named folders that documents are filed under.
///
/// A folder is a stable upper-snake [`FolderKey`] plus a display name. The
/// registry starts with the six standing folders and can be extended at
/// runtime by a full-tier user (the repository enforces that; the registry
/// itself only enforces uniqueness and referential integrity).
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::newtypes::FolderKey;
use crate::structures::Document;

/// Maximum length of a folder display name.
pub const MAX_FOLDER_NAME_LEN: usize = 100;

/// The folders every registry starts with, as `(key, name)` pairs.
pub const DEFAULT_FOLDERS: [(&str, &str); 6] = [
    ("GENERAL", "General"),
    ("POLICIES", "Policies"),
    ("PROCEDURES", "Procedures"),
    ("FORMS", "Forms"),
    ("REPORTS", "Reports"),
    ("TEMPLATES", "Templates"),
];

/// A folder entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFolder {
    /// Stable key stored on documents.
    pub key: FolderKey,
    /// Display name; unique ignoring case.
    pub name: String,
}

/// Errors from folder administration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FolderError {
    /// A folder with this key already exists.
    #[error("folder {0} already exists")]
    DuplicateKey(FolderKey),

    /// Another folder already uses this display name.
    #[error("folder name {0:?} is already taken")]
    DuplicateName(String),

    /// The display name is empty or too long.
    #[error("folder name must be 1-100 characters, got {0}")]
    InvalidName(usize),

    /// No folder has this key.
    #[error("no folder with key {0}")]
    NotFound(FolderKey),

    /// Documents are still filed under the folder.
    #[error("folder {key} still holds {count} document(s)")]
    InUse {
        /// The folder being removed.
        key: FolderKey,
        /// Number of documents referencing it.
        count: usize,
    },

    /// The default folder cannot be removed.
    #[error("folder {0} is the default folder and cannot be removed")]
    Protected(FolderKey),
}

/// The set of known folders, keyed by [`FolderKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRegistry {
    folders: BTreeMap<FolderKey, DocumentFolder>,
}

impl Default for FolderRegistry {
    fn default() -> Self {
        let folders = DEFAULT_FOLDERS
            .iter()
            .filter_map(|&(key, name)| {
                FolderKey::try_from(key).ok().map(|key| {
                    (
                        key.clone(),
                        DocumentFolder {
                            key,
                            name: name.to_owned(),
                        },
                    )
                })
            })
            .collect();
        Self { folders }
    }
}

impl FolderRegistry {
    /// A registry with no folders at all (snapshot loading starts here).
    pub fn empty() -> Self {
        Self {
            folders: BTreeMap::new(),
        }
    }

    /// Number of folders.
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Returns `true` if the registry holds no folders.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Looks up a folder by key.
    pub fn get(&self, key: &FolderKey) -> Option<&DocumentFolder> {
        self.folders.get(key)
    }

    /// Returns `true` if a folder with this key exists.
    pub fn contains(&self, key: &FolderKey) -> bool {
        self.folders.contains_key(key)
    }

    /// Iterates folders ordered by display name (case-insensitive).
    pub fn iter(&self) -> impl Iterator<Item = &DocumentFolder> {
        let mut all: Vec<&DocumentFolder> = self.folders.values().collect();
        all.sort_by_key(|f| f.name.to_lowercase());
        all.into_iter()
    }

    /// Adds a folder.
    pub fn add(&mut self, key: FolderKey, name: &str) -> Result<&DocumentFolder, FolderError> {
        let name = validate_name(name)?;
        if self.folders.contains_key(&key) {
            return Err(FolderError::DuplicateKey(key));
        }
        self.ensure_name_free(&name, None)?;
        tracing::debug!(%key, %name, "folder added");
        let folder = DocumentFolder {
            key: key.clone(),
            name,
        };
        Ok(self.folders.entry(key).or_insert(folder))
    }

    /// Changes a folder's display name; the key is unchanged.
    pub fn rename(&mut self, key: &FolderKey, name: &str) -> Result<&DocumentFolder, FolderError> {
        let name = validate_name(name)?;
        if !self.folders.contains_key(key) {
            return Err(FolderError::NotFound(key.clone()));
        }
        self.ensure_name_free(&name, Some(key))?;
        let folder = self
            .folders
            .get_mut(key)
            .ok_or_else(|| FolderError::NotFound(key.clone()))?;
        tracing::debug!(%key, from = %folder.name, to = %name, "folder renamed");
        folder.name = name;
        Ok(folder)
    }

    /// Removes a folder no document in `documents` is filed under.
    pub fn remove<'a, I>(&mut self, key: &FolderKey, documents: I) -> Result<DocumentFolder, FolderError>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        if *key == FolderKey::general() {
            return Err(FolderError::Protected(key.clone()));
        }
        if !self.folders.contains_key(key) {
            return Err(FolderError::NotFound(key.clone()));
        }
        let count = documents.into_iter().filter(|d| d.section == *key).count();
        if count > 0 {
            return Err(FolderError::InUse {
                key: key.clone(),
                count,
            });
        }
        tracing::debug!(%key, "folder removed");
        self.folders
            .remove(key)
            .ok_or_else(|| FolderError::NotFound(key.clone()))
    }

    /// Inserts a folder verbatim, rejecting duplicate keys or names.
    pub(crate) fn insert(&mut self, folder: DocumentFolder) -> Result<(), FolderError> {
        let name = validate_name(&folder.name)?;
        if self.folders.contains_key(&folder.key) {
            return Err(FolderError::DuplicateKey(folder.key));
        }
        self.ensure_name_free(&name, None)?;
        self.folders.insert(folder.key.clone(), DocumentFolder { name, ..folder });
        Ok(())
    }

    fn ensure_name_free(&self, name: &str, except: Option<&FolderKey>) -> Result<(), FolderError> {
        let taken = self
            .folders
            .values()
            .any(|f| Some(&f.key) != except && f.name.eq_ignore_ascii_case(name));
        if taken {
            Err(FolderError::DuplicateName(name.to_owned()))
        } else {
            Ok(())
        }
    }
}

fn validate_name(name: &str) -> Result<String, FolderError> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_FOLDER_NAME_LEN {
        return Err(FolderError::InvalidName(len));
    }
    Ok(name.to_owned())
}
