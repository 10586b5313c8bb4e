#![allow(clippy::expect_used)]

use super::*;
use crate::classification::{Classification, ClassificationSet};
use crate::role::Role;
use crate::test_helpers::{adviser, at, doc, officer, president, user, user_id};

fn policy() -> AccessPolicy {
    AccessPolicy::default()
}

// ---------------------------------------------------------------------------
// Concrete scenarios
// ---------------------------------------------------------------------------

#[test]
fn full_tier_reads_restricted_it_does_not_own() {
    let d = doc("d1", "someone", Classification::Restricted);
    let decision = policy().decide(&adviser(), &d);
    assert!(decision.granted);
    assert_eq!(decision.rule, Some(AccessRule::FullTier));
}

#[test]
fn partial_tier_is_refused_restricted() {
    let d = doc("d1", "someone", Classification::Restricted);
    let decision = policy().decide(&president(), &d);
    assert!(!decision.granted);
    assert_eq!(decision.rule, None);
}

#[test]
fn partial_tier_reads_confidential() {
    let d = doc("d1", "someone", Classification::Confidential);
    let decision = policy().decide(&president(), &d);
    assert!(decision.granted);
    assert_eq!(decision.rule, Some(AccessRule::PartialTier));
}

#[test]
fn regular_owner_reads_internal() {
    let d = doc("d1", "u1", Classification::Internal);
    let decision = policy().decide(&officer("u1"), &d);
    assert!(decision.granted);
    assert_eq!(decision.rule, Some(AccessRule::Owner));
}

#[test]
fn regular_non_owner_gains_access_by_share() {
    let u = officer("u2");
    let d = doc("d1", "u1", Classification::Internal);
    assert!(!policy().can_access(&u, &d));

    let d = d.shared_with_users([user_id("u2")]);
    let decision = policy().decide(&u, &d);
    assert!(decision.granted);
    assert_eq!(decision.rule, Some(AccessRule::Shared));
}

#[test]
fn archived_document_is_closed_to_owner_and_every_tier() {
    let d = doc("d1", "adviser", Classification::Public).archived(user_id("adviser"), at(1));
    for u in [adviser(), president(), officer("adviser"), user("adviser", None)] {
        let decision = policy().decide(&u, &d);
        assert!(!decision.granted, "{:?}", u.role);
        assert_eq!(decision.rule, Some(AccessRule::Archived));
    }
}

#[test]
fn bulk_set_equals_per_document_filter() {
    let u = officer("u1");
    let docs = vec![
        doc("own", "u1", Classification::Restricted),
        doc("shared", "u9", Classification::Confidential).shared_with_users([user_id("u1")]),
        doc("public", "u9", Classification::Public),
        doc("hidden", "u9", Classification::Internal),
        doc("archived", "u1", Classification::Public).archived(user_id("adviser"), at(2)),
    ];

    let bulk: Vec<&str> = policy()
        .accessible(&u, &docs)
        .into_iter()
        .map(|d| &*d.id)
        .collect();
    let single: Vec<&str> = docs
        .iter()
        .filter(|d| !d.is_archived && policy().can_access(&u, d))
        .map(|d| &*d.id)
        .collect();

    assert_eq!(bulk, single);
    assert_eq!(bulk, vec!["own", "shared", "public"]);
}

// ---------------------------------------------------------------------------
// Tier monotonicity edge cases
// ---------------------------------------------------------------------------

#[test]
fn owner_reaches_restricted_regardless_of_tier() {
    let d = doc("d1", "president", Classification::Restricted);
    assert!(policy().can_access(&president(), &d));
    assert!(policy().can_access(&officer("president"), &d));
}

#[test]
fn partial_tier_reaches_restricted_through_share() {
    let d = doc("d1", "someone", Classification::Restricted)
        .shared_with_users([user_id("president")]);
    assert!(policy().can_access(&president(), &d));
    assert!(policy().accessible_predicate(&president()).matches(&d));
}

#[test]
fn no_role_behaves_like_regular() {
    let none = user("u1", None);
    let regular = officer("u1");
    for level in Classification::ALL {
        let d = doc("d1", "someone", level);
        assert_eq!(policy().can_access(&none, &d), policy().can_access(&regular, &d));
    }
    assert_eq!(
        policy().accessible_predicate(&none),
        policy().accessible_predicate(&regular)
    );
}

#[test]
fn superuser_evaluates_as_full() {
    let mut su = user("root", None);
    su.is_superuser = true;
    assert_eq!(policy().tier_of(&su), Tier::Full);
    let d = doc("d1", "someone", Classification::Restricted);
    assert!(policy().can_access(&su, &d));
}

#[test]
fn configured_tier_override_changes_decision() {
    let tiers = RoleTiers::default().with(Role::Secretary, Tier::Partial);
    let policy = AccessPolicy::new(tiers);
    let secretary = user("sec", Some(Role::Secretary));
    let d = doc("d1", "someone", Classification::Confidential);
    assert!(policy.can_access(&secretary, &d));
    assert!(!AccessPolicy::default().can_access(&secretary, &d));
}

// ---------------------------------------------------------------------------
// Predicate shape per tier
// ---------------------------------------------------------------------------

#[test]
fn full_tier_predicate_is_not_archived() {
    let p = policy().accessible_predicate(&adviser());
    assert_eq!(p, Predicate::not(Predicate::Archived));
    assert_eq!(p.to_string(), "NOT archived");
}

#[test]
fn partial_tier_predicate_covers_owner_and_share() {
    let p = policy().accessible_predicate(&president());
    let id = user_id("president");
    assert_eq!(
        p,
        Predicate::And(vec![
            Predicate::Not(Box::new(Predicate::Archived)),
            Predicate::Or(vec![
                Predicate::ClassificationIn(ClassificationSet::all_except(
                    Classification::Restricted
                )),
                Predicate::OwnerIs(id.clone()),
                Predicate::SharedWith(id),
            ]),
        ])
    );
}

#[test]
fn regular_tier_predicate_text() {
    let p = policy().accessible_predicate(&officer("u1"));
    assert_eq!(
        p.to_string(),
        "NOT archived AND (owner = u1 OR shared_with CONTAINS u1 OR classification = public)"
    );
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

#[test]
fn archival_rule_comes_first_and_denies() {
    assert_eq!(ACCESS_RULES[0], AccessRule::Archived);
    assert_eq!(AccessRule::Archived.effect(), Effect::Deny);
    for rule in &ACCESS_RULES[1..] {
        assert_eq!(rule.effect(), Effect::Allow, "{rule}");
    }
    assert_eq!(DEFAULT_EFFECT, Effect::Deny);
}

#[test]
fn each_rule_condition_agrees_with_applies() {
    let me = user_id("me");
    for tier in Tier::ALL {
        let subject = Subject { user: &me, tier };
        for level in Classification::ALL {
            for owned in [false, true] {
                for shared in [false, true] {
                    for archived in [false, true] {
                        let mut d = doc("d", if owned { "me" } else { "other" }, level);
                        if shared {
                            d = d.shared_with_users([me.clone()]);
                        }
                        if archived {
                            d = d.archived(user_id("x"), at(1));
                        }
                        for rule in ACCESS_RULES {
                            assert_eq!(
                                rule.condition(subject).matches(&d),
                                rule.applies(subject, &d),
                                "{rule} tier={tier} level={level} owned={owned} shared={shared} archived={archived}"
                            );
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn free_functions_use_default_table() {
    let d = doc("d1", "x", Classification::Restricted);
    assert!(can_access(&adviser(), &d));
    assert!(!can_access(&president(), &d));
    assert_eq!(
        accessible_predicate(&adviser()),
        Predicate::not(Predicate::Archived)
    );
}

#[test]
fn decision_serializes_rule_name() {
    let d = doc("d1", "x", Classification::Public);
    let decision = policy().decide(&officer("u1"), &d);
    let json = serde_json::to_value(decision).expect("serialize");
    assert_eq!(json, serde_json::json!({"granted": true, "rule": "public"}));
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

#[test]
fn update_allowed_for_owner_and_privileged_only() {
    let d = doc("d1", "u1", Classification::Internal);
    assert!(policy().can_update(&officer("u1"), &d));
    assert!(!policy().can_update(&officer("u2"), &d));
    assert!(policy().can_update(&president(), &d));
    assert!(policy().can_update(&adviser(), &d));

    let archived = d.archived(user_id("adviser"), at(1));
    assert!(!policy().can_update(&officer("u1"), &archived));
    assert!(!policy().can_update(&adviser(), &archived));
}

#[test]
fn archive_and_restore_are_tier_gated() {
    let d = doc("d1", "u1", Classification::Internal);
    assert!(!policy().can_archive(&officer("u1"), &d));
    assert!(policy().can_archive(&president(), &d));
    assert!(!policy().can_restore(&adviser(), &d));

    let archived = d.archived(user_id("president"), at(1));
    assert!(!policy().can_archive(&adviser(), &archived));
    assert!(policy().can_restore(&adviser(), &archived));
    assert!(!policy().can_restore(&president(), &archived));
}

#[test]
fn partial_tier_cannot_touch_restricted_documents_it_cannot_read() {
    let d = doc("d1", "u1", Classification::Restricted);
    assert!(!policy().can_access(&president(), &d));
    assert!(!policy().can_update(&president(), &d));
    assert!(!policy().can_archive(&president(), &d));

    assert!(policy().can_update(&adviser(), &d));
    assert!(policy().can_archive(&adviser(), &d));
    assert!(policy().can_update(&officer("u1"), &d));

    let shared = d.shared_with_users([user_id("president")]);
    assert!(policy().can_update(&president(), &shared));
}

#[test]
fn administration_is_full_tier_only() {
    assert!(policy().can_manage_roles(&adviser()));
    assert!(!policy().can_manage_roles(&president()));
    assert!(policy().can_manage_folders(&adviser()));
    assert!(!policy().can_manage_folders(&officer("u1")));
    assert!(policy().can_view_reports(&president()));
    assert!(!policy().can_view_reports(&officer("u1")));
}
