//! Bulk access filtering benchmarks.
//!
//! **Group A, `filter`**: one regular-tier user's visible set, computed by
//! matching the accessible predicate against every document and by calling
//! `can_access` per document. Both must return the same documents; the
//! predicate path builds its expression once per user.
//!
//! **Group B, `predicate`**: cost of building the predicate and rendering
//! it to SQL, independent of data size.
//!
//! **Group C, `listing`**: the full listing pipeline (access, text filter,
//! sort, page) for a regular-tier user.
#![allow(clippy::expect_used)]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dossier_bench::{SizeTier, generate_organisation};
use dossier_core::role::Tier;
use dossier_core::{
    AccessPolicy, Page, SearchFilter, Snapshot, SqlSchema, User, list_accessible, to_sql,
};

const TIERS: [(&str, SizeTier); 4] = [
    ("S", SizeTier::Small),
    ("M", SizeTier::Medium),
    ("L", SizeTier::Large),
    ("XL", SizeTier::XLarge),
];

fn regular_user(policy: &AccessPolicy, snapshot: &Snapshot) -> User {
    snapshot
        .users
        .iter()
        .find(|u| !u.is_superuser && policy.tier_of(u) == Tier::Regular)
        .cloned()
        .expect("generated organisation has a regular-tier user")
}

// ---------------------------------------------------------------------------
// Group A: filter
// ---------------------------------------------------------------------------

fn bench_filter_predicate(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter/predicate");
    let policy = AccessPolicy::default();

    for (name, tier) in TIERS {
        let snapshot = generate_organisation(&tier.config(42));
        let user = regular_user(&policy, &snapshot);
        group.throughput(Throughput::Elements(snapshot.documents.len() as u64));

        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                let predicate = policy.accessible_predicate(&user);
                black_box(predicate.filter(&snapshot.documents).len())
            });
        });
    }
    group.finish();
}

fn bench_filter_per_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter/per_document");
    let policy = AccessPolicy::default();

    for (name, tier) in TIERS {
        let snapshot = generate_organisation(&tier.config(42));
        let user = regular_user(&policy, &snapshot);
        group.throughput(Throughput::Elements(snapshot.documents.len() as u64));

        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                let visible = snapshot
                    .documents
                    .iter()
                    .filter(|d| policy.can_access(&user, d))
                    .count();
                black_box(visible)
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Group B: predicate construction and SQL rendering
// ---------------------------------------------------------------------------

fn bench_predicate_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("predicate");
    let policy = AccessPolicy::default();
    let snapshot = generate_organisation(&SizeTier::Small.config(42));
    let schema = SqlSchema::default();

    for tier in Tier::ALL {
        let Some(user) = snapshot
            .users
            .iter()
            .find(|u| !u.is_superuser && policy.tier_of(u) == tier)
        else {
            continue;
        };
        group.bench_function(BenchmarkId::new("build", tier.as_str()), |b| {
            b.iter(|| black_box(policy.accessible_predicate(user)));
        });

        let predicate = policy.accessible_predicate(user);
        group.bench_function(BenchmarkId::new("to_sql", tier.as_str()), |b| {
            b.iter(|| black_box(to_sql(&predicate, &schema)));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Group C: listing
// ---------------------------------------------------------------------------

fn bench_listing(c: &mut Criterion) {
    let mut group = c.benchmark_group("listing");
    let policy = AccessPolicy::default();
    let filter = SearchFilter {
        query: Some("budget".to_owned()),
        ..SearchFilter::default()
    };

    for (name, tier) in TIERS {
        let snapshot = generate_organisation(&tier.config(42));
        let user = regular_user(&policy, &snapshot);
        group.throughput(Throughput::Elements(snapshot.documents.len() as u64));

        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                let listing = list_accessible(
                    &policy,
                    &user,
                    &snapshot.documents,
                    &snapshot.users,
                    &filter,
                    Page::default(),
                );
                black_box(listing.total)
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_filter_predicate,
    bench_filter_per_document,
    bench_predicate_build,
    bench_listing
);
criterion_main!(benches);
