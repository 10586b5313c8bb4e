/// Single-document access decisions and the equivalent bulk predicate.
///
/// Both entry points are derived from the rule table in [`rules`]:
///
/// - [`AccessPolicy::decide`] walks [`ACCESS_RULES`] in order and stops at the
///   first rule that applies to the document;
/// - [`AccessPolicy::accessible_predicate`] compiles the same table into a
///   [`Predicate`] with the user fixed.
///
/// For every user `u` and document `d`,
/// `accessible_predicate(u).matches(d) == can_access(u, d)`, and both are
/// `false` whenever `d.is_archived`.
///
/// The engine is pure. It holds only the immutable [`RoleTiers`] table, so a
/// single [`AccessPolicy`] can be shared across threads without locking.
pub mod equivalence;
pub mod rules;

#[cfg(test)]
mod tests;

use serde::Serialize;

pub use equivalence::{EquivalenceReport, Mismatch, find_mismatches, synthetic_fact_space};
pub use rules::{ACCESS_RULES, AccessRule, DEFAULT_EFFECT, Effect, Subject};

use crate::predicate::Predicate;
use crate::role::{RoleTiers, Tier};
use crate::structures::{Document, User};

/// Outcome of a single access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    /// Whether access is granted.
    pub granted: bool,
    /// The rule that decided, or `None` if the default applied.
    pub rule: Option<AccessRule>,
}

/// The access policy: the rule table plus the role→tier mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    tiers: RoleTiers,
}

impl AccessPolicy {
    /// Creates a policy using the given role→tier table.
    pub fn new(tiers: RoleTiers) -> Self {
        Self { tiers }
    }

    /// Returns the role→tier table in use.
    pub fn tiers(&self) -> &RoleTiers {
        &self.tiers
    }

    /// Effective tier of `user`. Superusers are always [`Tier::Full`].
    pub fn tier_of(&self, user: &User) -> Tier {
        if user.is_superuser {
            Tier::Full
        } else {
            self.tiers.tier_of(user.role)
        }
    }

    fn subject<'a>(&self, user: &'a User) -> Subject<'a> {
        Subject {
            user: &user.id,
            tier: self.tier_of(user),
        }
    }

    /// Decides whether `user` may access `doc`, reporting the deciding rule.
    pub fn decide(&self, user: &User, doc: &Document) -> AccessDecision {
        let subject = self.subject(user);
        let decision = ACCESS_RULES
            .iter()
            .copied()
            .find(|rule| rule.applies(subject, doc))
            .map_or(
                AccessDecision {
                    granted: DEFAULT_EFFECT == Effect::Allow,
                    rule: None,
                },
                |rule| AccessDecision {
                    granted: rule.effect() == Effect::Allow,
                    rule: Some(rule),
                },
            );
        tracing::trace!(
            user = %user.id,
            document = %doc.id,
            tier = %subject.tier,
            granted = decision.granted,
            rule = decision.rule.map_or("default", AccessRule::name),
            "access decision"
        );
        decision
    }

    /// Returns `true` if `user` may view or download `doc`.
    pub fn can_access(&self, user: &User, doc: &Document) -> bool {
        self.decide(user, doc).granted
    }

    /// Returns the predicate selecting exactly the documents `user` may
    /// access. Archived documents never match.
    pub fn accessible_predicate(&self, user: &User) -> Predicate {
        let predicate = rules::compile(&ACCESS_RULES, self.subject(user));
        tracing::debug!(user = %user.id, %predicate, "accessible predicate");
        predicate
    }

    /// Applies [`accessible_predicate`](Self::accessible_predicate) to a
    /// collection, preserving input order.
    pub fn accessible<'a, I>(&self, user: &User, docs: I) -> Vec<&'a Document>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        self.accessible_predicate(user).filter(docs)
    }

    // -- capability checks layered on the tier --------------------------------

    /// Metadata edits and sharing: owners and privileged tiers, and only on a
    /// document the user can already access (never an archived one).
    pub fn can_update(&self, user: &User, doc: &Document) -> bool {
        self.can_access(user, doc)
            && (doc.is_owned_by(&user.id) || self.tier_of(user).is_privileged())
    }

    /// Archiving: privileged tiers, on an accessible, not yet archived
    /// document.
    pub fn can_archive(&self, user: &User, doc: &Document) -> bool {
        self.can_access(user, doc) && self.tier_of(user).is_privileged()
    }

    /// Restoring: full tier only, on an archived document.
    pub fn can_restore(&self, user: &User, doc: &Document) -> bool {
        doc.is_archived && self.tier_of(user) == Tier::Full
    }

    /// Role reassignment is reserved to the full tier.
    pub fn can_manage_roles(&self, user: &User) -> bool {
        self.tier_of(user) == Tier::Full
    }

    /// Folder administration is reserved to the full tier.
    pub fn can_manage_folders(&self, user: &User) -> bool {
        self.tier_of(user) == Tier::Full
    }

    /// Inventory and activity reports.
    pub fn can_view_reports(&self, user: &User) -> bool {
        self.tier_of(user).is_privileged()
    }
}

/// [`AccessPolicy::can_access`] under the default role table.
pub fn can_access(user: &User, doc: &Document) -> bool {
    AccessPolicy::default().can_access(user, doc)
}

/// [`AccessPolicy::accessible_predicate`] under the default role table.
pub fn accessible_predicate(user: &User) -> Predicate {
    AccessPolicy::default().accessible_predicate(user)
}
