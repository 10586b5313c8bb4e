//! Shared test helper functions for constructing fixtures.
//!
//! Compiled only in test builds. Integration tests in
//! `crates/dossier-core/tests/` define their own local helpers because they
//! link against the non-test library build where this module is not
//! available.
#![allow(clippy::expect_used)]

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::classification::Classification;
use crate::newtypes::{DocumentId, UserId, Username};
use crate::role::Role;
use crate::structures::{Document, User};

/// Returns midnight UTC on 2026-02-01 plus `days` days.
pub fn at(days: i64) -> DateTime<Utc> {
    let base = Utc
        .with_ymd_and_hms(2026, 2, 1, 0, 0, 0)
        .single()
        .expect("valid base timestamp");
    base + Duration::days(days)
}

/// Creates a [`UserId`], panicking on invalid input.
pub fn user_id(s: &str) -> UserId {
    UserId::try_from(s).expect("valid UserId")
}

/// Creates a [`DocumentId`], panicking on invalid input.
pub fn doc_id(s: &str) -> DocumentId {
    DocumentId::try_from(s).expect("valid DocumentId")
}

/// Creates a [`Username`], panicking on invalid input.
pub fn username(s: &str) -> Username {
    Username::try_from(s).expect("valid Username")
}

/// Builds a user whose id and username are both `id`.
pub fn user(id: &str, role: Option<Role>) -> User {
    User::new(user_id(id), username(id), role)
}

/// The adviser (full tier).
pub fn adviser() -> User {
    user("adviser", Some(Role::Adviser))
}

/// The president (partial tier).
pub fn president() -> User {
    user("president", Some(Role::President))
}

/// A regular-tier officer.
pub fn officer(id: &str) -> User {
    user(id, Some(Role::Auditor))
}

/// Builds an unarchived document owned by `owner` at the given level,
/// created on day 0.
pub fn doc(id: &str, owner: &str, classification: Classification) -> Document {
    Document::new(doc_id(id), format!("Document {id}"), user_id(owner), at(0))
        .with_classification(classification)
}
