/// Validated newtype wrappers for the identifiers that flow through the
/// access engine.
///
/// Each newtype enforces its shape at construction time via
/// [`TryFrom<&str>`]. Once constructed, the inner value is immutable (no
/// `DerefMut`). Serde `Deserialize` impls re-run validation so invalid data
/// cannot enter the type system from an untrusted snapshot file.
use std::fmt;
use std::ops::Deref;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced when constructing a validated newtype from an invalid string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NewtypeError {
    /// The string did not match the expected format.
    #[error("invalid {type_name}: expected {expected}, got {got:?}")]
    InvalidFormat {
        /// Name of the type that rejected the input.
        type_name: &'static str,
        /// A human-readable description of the expected format.
        expected: &'static str,
        /// The input that was rejected.
        got: String,
    },
}

// ---------------------------------------------------------------------------
// Regex statics
//
// Both patterns are string literals; `Regex::new` cannot fail for them. The
// workspace bans `unwrap`/`expect`, hence the `unwrap_or_else` arms.
// ---------------------------------------------------------------------------

/// Account names: letters, digits and `@ . + - _`, at most 150 characters.
static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9@.+_-]{1,150}$")
        .unwrap_or_else(|_| unreachable!("username pattern is a valid literal"))
});

/// Folder keys: upper-snake, starting with a letter, at most 50 characters.
static FOLDER_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Z0-9_]{0,49}$")
        .unwrap_or_else(|_| unreachable!("folder key pattern is a valid literal"))
});

/// Implements `Deref<Target = str>`, `Display`, `AsRef<str>` and the
/// validating serde impls for a `String` newtype that has `TryFrom<&str>`.
macro_rules! string_newtype_impls {
    ($name:ident) => {
        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let s = String::deserialize(d)?;
                Self::try_from(s.as_str()).map_err(de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

/// Opaque, non-empty reference to a user.
///
/// Ownership and share-list membership are compared on this value only; the
/// engine never looks at usernames.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(String);

impl TryFrom<&str> for UserId {
    type Error = NewtypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if s.is_empty() {
            Err(NewtypeError::InvalidFormat {
                type_name: "UserId",
                expected: "non-empty string",
                got: s.to_owned(),
            })
        } else {
            Ok(Self(s.to_owned()))
        }
    }
}

string_newtype_impls!(UserId);

// ---------------------------------------------------------------------------
// DocumentId
// ---------------------------------------------------------------------------

/// Opaque, non-empty reference to a document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(String);

impl TryFrom<&str> for DocumentId {
    type Error = NewtypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if s.is_empty() {
            Err(NewtypeError::InvalidFormat {
                type_name: "DocumentId",
                expected: "non-empty string",
                got: s.to_owned(),
            })
        } else {
            Ok(Self(s.to_owned()))
        }
    }
}

string_newtype_impls!(DocumentId);

// ---------------------------------------------------------------------------
// Username
// ---------------------------------------------------------------------------

/// Login name of a user: 1–150 characters of `[A-Za-z0-9@.+_-]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Username(String);

impl TryFrom<&str> for Username {
    type Error = NewtypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if USERNAME_RE.is_match(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(NewtypeError::InvalidFormat {
                type_name: "Username",
                expected: "1-150 characters of letters, digits and @.+-_",
                got: s.to_owned(),
            })
        }
    }
}

string_newtype_impls!(Username);

// ---------------------------------------------------------------------------
// FolderKey
// ---------------------------------------------------------------------------

/// Stable key of a document folder (section), e.g. `GENERAL` or `POLICIES`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FolderKey(String);

impl TryFrom<&str> for FolderKey {
    type Error = NewtypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if FOLDER_KEY_RE.is_match(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(NewtypeError::InvalidFormat {
                type_name: "FolderKey",
                expected: "upper-snake key starting with a letter (e.g. GENERAL)",
                got: s.to_owned(),
            })
        }
    }
}

string_newtype_impls!(FolderKey);

impl FolderKey {
    /// Key of the folder new documents land in when none is given.
    pub fn general() -> Self {
        Self("GENERAL".to_owned())
    }
}

impl Default for FolderKey {
    fn default() -> Self {
        Self::general()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
