//! Invariant checkers for generated organisations and engine output.

use std::collections::HashSet;

use dossier_core::access::{AccessPolicy, find_mismatches};
use dossier_core::listing::{Page, SearchFilter, list_accessible};
use dossier_core::predicate::sql::SqlFragment;
use dossier_core::{Snapshot, User};

/// Verifies that the snapshot passes its own validation.
pub fn check_snapshot_valid(snapshot: &Snapshot) -> Result<(), String> {
    snapshot
        .validate()
        .map_err(|e| format!("generated snapshot is invalid: {e}"))
}

/// Verifies that `can_access` and the accessible predicate agree for every
/// user × document pair and that no archived document is visible.
pub fn check_equivalence(policy: &AccessPolicy, snapshot: &Snapshot) -> Result<(), String> {
    let report = find_mismatches(policy, &snapshot.users, &snapshot.documents);
    if let Some(m) = report.mismatches.first() {
        return Err(format!(
            "{} mismatch(es); first: user {} document {} direct={} predicate={}",
            report.mismatches.len(),
            m.user,
            m.document,
            m.direct,
            m.predicate
        ));
    }
    if let Some(m) = report.archived_leaks.first() {
        return Err(format!(
            "{} archived leak(s); first: user {} document {}",
            report.archived_leaks.len(),
            m.user,
            m.document
        ));
    }
    Ok(())
}

/// Verifies that a superuser sees exactly the unarchived documents.
pub fn check_superuser_sees_live(
    policy: &AccessPolicy,
    snapshot: &Snapshot,
    superuser: &User,
) -> Result<(), String> {
    if !superuser.is_superuser {
        return Err(format!("user {} is not a superuser", superuser.id));
    }
    let visible = policy.accessible(superuser, &snapshot.documents).len();
    let live = snapshot.documents.iter().filter(|d| !d.is_archived).count();
    if visible != live {
        return Err(format!("superuser sees {visible} documents, {live} are live"));
    }
    Ok(())
}

/// Verifies an unfiltered, unpaged listing for `user`:
/// - the total equals the number of documents `can_access` grants
/// - no document appears twice
/// - documents are ordered newest first, ties by id
pub fn check_listing_consistent(
    policy: &AccessPolicy,
    snapshot: &Snapshot,
    user: &User,
) -> Result<(), String> {
    let listing = list_accessible(
        policy,
        user,
        &snapshot.documents,
        &snapshot.users,
        &SearchFilter::default(),
        Page::all(),
    );
    let expected = snapshot
        .documents
        .iter()
        .filter(|d| policy.can_access(user, d))
        .count();
    if listing.total != expected || listing.documents.len() != expected {
        return Err(format!(
            "listing for {} has total={} page={}, expected {expected}",
            user.id,
            listing.total,
            listing.documents.len()
        ));
    }

    let mut seen = HashSet::new();
    for doc in &listing.documents {
        if !seen.insert(&doc.id) {
            return Err(format!("document {} listed twice", doc.id));
        }
    }
    for pair in listing.documents.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let ordered = a.created_at > b.created_at || (a.created_at == b.created_at && a.id < b.id);
        if !ordered {
            return Err(format!("documents {} and {} out of order", a.id, b.id));
        }
    }
    Ok(())
}

/// Verifies that every `$n` placeholder in `fragment` has a parameter and
/// every parameter is referenced.
pub fn check_sql_placeholders(fragment: &SqlFragment) -> Result<(), String> {
    let mut referenced = HashSet::new();
    let mut chars = fragment.sql.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c != '$' {
            continue;
        }
        let mut digits = String::new();
        while let Some((_, d)) = chars.peek().copied().filter(|(_, d)| d.is_ascii_digit()) {
            digits.push(d);
            chars.next();
        }
        let n: usize = digits
            .parse()
            .map_err(|_| format!("bare '$' in SQL: {}", fragment.sql))?;
        if n == 0 || n > fragment.params.len() {
            return Err(format!(
                "placeholder ${n} out of range (params: {})",
                fragment.params.len()
            ));
        }
        referenced.insert(n);
    }
    if referenced.len() != fragment.params.len() {
        return Err(format!(
            "{} parameter(s) bound, {} referenced",
            fragment.params.len(),
            referenced.len()
        ));
    }
    Ok(())
}
