/// Cross-checks the single-document decision against the bulk predicate.
///
/// [`find_mismatches`] evaluates both readings for every user × document
/// pair of a data set. [`synthetic_fact_space`] builds a data set covering
/// every combination of the facts the rules read, so a policy can be
/// verified without any stored data.
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AccessPolicy;
use crate::classification::Classification;
use crate::newtypes::{DocumentId, UserId, Username};
use crate::role::Role;
use crate::structures::{Document, User};

/// A pair on which the two readings disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// The user.
    pub user: UserId,
    /// The document.
    pub document: DocumentId,
    /// Result of `can_access`.
    pub direct: bool,
    /// Result of matching the accessible predicate.
    pub predicate: bool,
}

/// Summary of an equivalence run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EquivalenceReport {
    /// Number of user × document pairs evaluated.
    pub pairs: usize,
    /// Pairs granted by both readings.
    pub granted: usize,
    /// Disagreeing pairs, in evaluation order.
    pub mismatches: Vec<Mismatch>,
    /// Archived documents that either reading let through.
    pub archived_leaks: Vec<Mismatch>,
}

impl EquivalenceReport {
    /// Returns `true` if both readings agree everywhere and no archived
    /// document is visible.
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty() && self.archived_leaks.is_empty()
    }

    /// Folds another run into this one.
    pub fn merge(&mut self, other: EquivalenceReport) {
        self.pairs += other.pairs;
        self.granted += other.granted;
        self.mismatches.extend(other.mismatches);
        self.archived_leaks.extend(other.archived_leaks);
    }
}

/// Evaluates every user against every document under `policy`.
///
/// The predicate is built once per user, as a bulk query would.
pub fn find_mismatches<'u, 'd, U, D>(policy: &AccessPolicy, users: U, docs: D) -> EquivalenceReport
where
    U: IntoIterator<Item = &'u User>,
    D: IntoIterator<Item = &'d Document>,
    D::IntoIter: Clone,
{
    let docs = docs.into_iter();
    let mut report = EquivalenceReport::default();
    for user in users {
        let predicate = policy.accessible_predicate(user);
        for doc in docs.clone() {
            let direct = policy.can_access(user, doc);
            let via_predicate = predicate.matches(doc);
            report.pairs += 1;
            let pair = || Mismatch {
                user: user.id.clone(),
                document: doc.id.clone(),
                direct,
                predicate: via_predicate,
            };
            if direct != via_predicate {
                report.mismatches.push(pair());
            } else if direct {
                report.granted += 1;
            }
            if doc.is_archived && (direct || via_predicate) {
                report.archived_leaks.push(pair());
            }
        }
    }
    if !report.is_consistent() {
        tracing::warn!(
            pairs = report.pairs,
            mismatches = report.mismatches.len(),
            archived_leaks = report.archived_leaks.len(),
            "access readings disagree"
        );
    }
    report
}

/// Builds users and documents covering every combination of role (or none),
/// superuser flag, classification, ownership, sharing and archival.
///
/// Every user owns one document per classification × share × archival
/// combination; the share target is the next user in the list, so each
/// user also appears as an owner, a share target and a stranger.
pub fn synthetic_fact_space() -> (Vec<User>, Vec<Document>) {
    let mut users = Vec::with_capacity(Role::COUNT + 2);
    let roles = Role::ALL.into_iter().map(Some).chain([None]);
    for (i, role) in roles.enumerate() {
        users.extend(synthetic_user(i, role, false));
    }
    users.extend(synthetic_user(users.len(), None, true));

    let epoch = DateTime::<Utc>::UNIX_EPOCH;
    let mut docs = Vec::new();
    for (i, owner) in users.iter().enumerate() {
        let next = &users[(i + 1) % users.len()];
        for classification in Classification::ALL {
            for shared in [false, true] {
                for archived in [false, true] {
                    let id = format!(
                        "synthetic-{i}-{}-{}-{}",
                        classification.as_str(),
                        u8::from(shared),
                        u8::from(archived)
                    );
                    let Ok(id) = DocumentId::try_from(id.as_str()) else {
                        continue;
                    };
                    let mut doc = Document::new(id, "synthetic", owner.id.clone(), epoch)
                        .with_classification(classification);
                    if shared {
                        doc = doc.shared_with_users([next.id.clone()]);
                    }
                    if archived {
                        doc = doc.archived(next.id.clone(), epoch);
                    }
                    docs.push(doc);
                }
            }
        }
    }
    (users, docs)
}

fn synthetic_user(index: usize, role: Option<Role>, is_superuser: bool) -> Option<User> {
    let name = format!("synthetic-{index}");
    let id = UserId::try_from(name.as_str()).ok()?;
    let username = Username::try_from(name.as_str()).ok()?;
    let mut user = User::new(id, username, role);
    user.is_superuser = is_superuser;
    Some(user)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::role::{RoleTiers, Tier};
    use crate::test_helpers::{doc, officer};

    #[test]
    fn synthetic_space_is_complete() {
        let (users, docs) = synthetic_fact_space();
        assert_eq!(users.len(), Role::COUNT + 2);
        assert_eq!(docs.len(), users.len() * 4 * 2 * 2);
        assert!(users.iter().any(|u| u.is_superuser));
        assert!(users.iter().any(|u| u.role.is_none() && !u.is_superuser));
    }

    #[test]
    fn default_policy_is_consistent_on_synthetic_space() {
        let (users, docs) = synthetic_fact_space();
        let report = find_mismatches(&AccessPolicy::default(), &users, &docs);
        assert!(report.is_consistent(), "{report:?}");
        assert_eq!(report.pairs, users.len() * docs.len());
        assert!(report.granted > 0);
    }

    #[test]
    fn reconfigured_policy_is_consistent_on_synthetic_space() {
        let tiers = RoleTiers::default()
            .with(Role::Secretary, Tier::Partial)
            .with(Role::Treasurer, Tier::Full);
        let (users, docs) = synthetic_fact_space();
        let report = find_mismatches(&AccessPolicy::new(tiers), &users, &docs);
        assert!(report.is_consistent(), "{report:?}");
    }

    #[test]
    fn merge_accumulates() {
        let users = [officer("u1")];
        let docs = [doc("d1", "u1", Classification::Internal)];
        let mut total = find_mismatches(&AccessPolicy::default(), &users, &docs);
        total.merge(find_mismatches(&AccessPolicy::default(), &users, &docs));
        assert_eq!(total.pairs, 2);
        assert_eq!(total.granted, 2);
    }
}
