/// The access rule table.
///
/// Each rule has two readings of the same condition:
///
/// - [`AccessRule::applies`] tests it against a concrete document;
/// - [`AccessRule::condition`] partially evaluates it for a subject, leaving
///   only the document-dependent part as a [`Predicate`].
///
/// For every subject, rule and document,
/// `rule.condition(s).matches(d) == rule.applies(s, d)`. The single-item
/// check and the bulk predicate both walk [`ACCESS_RULES`] in order, so they
/// agree whenever every rule's two readings agree.
use serde::Serialize;

use crate::classification::{Classification, ClassificationSet};
use crate::newtypes::UserId;
use crate::predicate::Predicate;
use crate::role::Tier;
use crate::structures::Document;

/// What a matching rule does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Access is granted.
    Allow,
    /// Access is refused.
    Deny,
}

/// One row of the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRule {
    /// Archived documents are closed to everyone.
    Archived,
    /// The full tier sees everything.
    FullTier,
    /// The partial tier sees everything below `restricted`.
    PartialTier,
    /// Owners see their own documents.
    Owner,
    /// Users on the share list see the document.
    Shared,
    /// Everyone sees `public` documents.
    Public,
}

/// The rule table in precedence order. The first rule that applies decides;
/// if none applies, access is denied.
pub const ACCESS_RULES: [AccessRule; 6] = [
    AccessRule::Archived,
    AccessRule::FullTier,
    AccessRule::PartialTier,
    AccessRule::Owner,
    AccessRule::Shared,
    AccessRule::Public,
];

/// The effect applied when no rule matches.
pub const DEFAULT_EFFECT: Effect = Effect::Deny;

/// The subject side of a decision: who is asking and at which tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject<'a> {
    /// The requesting user.
    pub user: &'a UserId,
    /// The user's effective tier.
    pub tier: Tier,
}

impl AccessRule {
    /// The rule's effect when it applies.
    pub fn effect(self) -> Effect {
        match self {
            AccessRule::Archived => Effect::Deny,
            AccessRule::FullTier
            | AccessRule::PartialTier
            | AccessRule::Owner
            | AccessRule::Shared
            | AccessRule::Public => Effect::Allow,
        }
    }

    /// Short kebab-case name for logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            AccessRule::Archived => "archived",
            AccessRule::FullTier => "full-tier",
            AccessRule::PartialTier => "partial-tier",
            AccessRule::Owner => "owner",
            AccessRule::Shared => "shared",
            AccessRule::Public => "public",
        }
    }

    /// Returns `true` if the rule's condition holds for this subject and
    /// document.
    pub fn applies(self, subject: Subject<'_>, doc: &Document) -> bool {
        match self {
            AccessRule::Archived => doc.is_archived,
            AccessRule::FullTier => subject.tier == Tier::Full,
            AccessRule::PartialTier => {
                subject.tier == Tier::Partial && doc.classification != Classification::Restricted
            }
            AccessRule::Owner => doc.is_owned_by(subject.user),
            AccessRule::Shared => doc.is_shared_with(subject.user),
            AccessRule::Public => doc.classification == Classification::Public,
        }
    }

    /// The rule's condition with the subject fixed, as a document predicate.
    pub fn condition(self, subject: Subject<'_>) -> Predicate {
        match self {
            AccessRule::Archived => Predicate::Archived,
            AccessRule::FullTier => constant(subject.tier == Tier::Full),
            AccessRule::PartialTier => {
                if subject.tier == Tier::Partial {
                    Predicate::classification_in(ClassificationSet::all_except(
                        Classification::Restricted,
                    ))
                } else {
                    Predicate::False
                }
            }
            AccessRule::Owner => Predicate::OwnerIs(subject.user.clone()),
            AccessRule::Shared => Predicate::SharedWith(subject.user.clone()),
            AccessRule::Public => Predicate::classification_is(Classification::Public),
        }
    }
}

impl std::fmt::Display for AccessRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn constant(value: bool) -> Predicate {
    if value { Predicate::True } else { Predicate::False }
}

/// Compiles a rule list into one predicate.
///
/// Folding from the last rule backwards, starting from the default effect:
/// an `Allow` rule becomes `cond OR rest`, a `Deny` rule becomes
/// `NOT cond AND rest`. The smart constructors simplify as they go.
pub fn compile(rules: &[AccessRule], subject: Subject<'_>) -> Predicate {
    let fallback = match DEFAULT_EFFECT {
        Effect::Allow => Predicate::True,
        Effect::Deny => Predicate::False,
    };
    rules.iter().rev().fold(fallback, |rest, rule| {
        let cond = rule.condition(subject);
        match rule.effect() {
            Effect::Allow => Predicate::or([cond, rest]),
            Effect::Deny => Predicate::and([Predicate::not(cond), rest]),
        }
    })
}
