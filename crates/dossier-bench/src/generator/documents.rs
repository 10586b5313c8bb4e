//! Document builders.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use dossier_core::classification::Classification;
use dossier_core::folders::DEFAULT_FOLDERS;
use dossier_core::newtypes::{DocumentId, FolderKey, UserId};
use dossier_core::structures::{Document, User};
use rand::Rng;
use rand::rngs::StdRng;

use super::GeneratorConfig;

const TITLES: &[&str] = &[
    "Annual Budget",
    "Board Minutes",
    "Membership Register",
    "Travel Policy",
    "Expense Claim Form",
    "Audit Findings",
    "Event Plan",
    "Sponsorship Agreement",
    "Election Procedure",
    "Quarterly Report",
    "Press Release",
    "Volunteer Handbook",
];

const CATEGORIES: &[&str] = &[
    "Finance",
    "Governance",
    "Events",
    "Communications",
    "Membership",
    "Legal",
];

const TAGS: &[&str] = &[
    "draft", "final", "2025", "2026", "board", "budget", "urgent", "review", "archive",
];

const FILE_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("txt", "text/plain"),
];

/// Cumulative percentage weights for public, internal, confidential and
/// restricted.
const CLASSIFICATION_WEIGHTS: [(u32, Classification); 4] = [
    (30, Classification::Public),
    (70, Classification::Internal),
    (90, Classification::Confidential),
    (100, Classification::Restricted),
];

fn document_id(index: usize) -> DocumentId {
    let s = format!("doc-{index:07}");
    DocumentId::try_from(s.as_str()).unwrap_or_else(|_| unreachable!())
}

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

fn classification(rng: &mut StdRng) -> Classification {
    let roll = rng.gen_range(0..100);
    CLASSIFICATION_WEIGHTS
        .iter()
        .find(|(bound, _)| roll < *bound)
        .map_or(Classification::Restricted, |(_, c)| *c)
}

fn section(rng: &mut StdRng) -> FolderKey {
    let (key, _) = pick(rng, &DEFAULT_FOLDERS);
    FolderKey::try_from(*key).unwrap_or_else(|_| FolderKey::general())
}

fn share_targets(
    config: &GeneratorConfig,
    users: &[User],
    owner: &UserId,
    rng: &mut StdRng,
) -> BTreeSet<UserId> {
    let mut targets = BTreeSet::new();
    if config.max_shares == 0 || !rng.gen_bool(config.share_density) {
        return targets;
    }
    let count = rng.gen_range(1..=config.max_shares);
    for _ in 0..count {
        let target = &pick(rng, users).id;
        if target != owner {
            targets.insert(target.clone());
        }
    }
    targets
}

/// Builds `config.num_documents` documents owned by and shared among
/// `users`, created within `history_days` of `start`.
///
/// Returns an empty list when there are no users to own anything.
pub fn build_documents(
    config: &GeneratorConfig,
    users: &[User],
    start: DateTime<Utc>,
    rng: &mut StdRng,
) -> Vec<Document> {
    if users.is_empty() {
        return Vec::new();
    }
    let history_minutes = config.history_days.max(1) * 24 * 60;
    let mut docs = Vec::with_capacity(config.num_documents);
    for i in 0..config.num_documents {
        let owner = pick(rng, users).id.clone();
        let created = start + Duration::minutes(rng.gen_range(0..history_minutes));
        let title = *pick(rng, TITLES);
        let (ext, mime) = *pick(rng, FILE_TYPES);

        let mut doc = Document::new(document_id(i), format!("{title} {i}"), owner.clone(), created)
            .with_classification(classification(rng));
        doc.description = format!("{title} prepared for the {}", pick(rng, CATEGORIES));
        doc.file_name = format!("{}.{ext}", title.to_lowercase().replace(' ', "_"));
        doc.file_size = rng.gen_range(1_024..10 * 1024 * 1024);
        doc.file_type = mime.to_owned();
        doc.section = section(rng);
        doc.category = (*pick(rng, CATEGORIES)).to_owned();
        doc.tags = (0..rng.gen_range(0..=3))
            .map(|_| (*pick(rng, TAGS)).to_owned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        doc.updated_at = created + Duration::hours(rng.gen_range(0..72));
        doc.shared_with = share_targets(config, users, &owner, rng);

        if rng.gen_bool(config.archived_fraction) {
            let by = pick(rng, users).id.clone();
            let at = doc.updated_at + Duration::days(rng.gen_range(1..90));
            doc = doc.archived(by, at);
        }
        docs.push(doc);
    }
    docs
}
