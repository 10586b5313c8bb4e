//! Organisation snapshot generator.
//!
//! Produces valid [`Snapshot`] instances with a realistic spread of roles,
//! classifications, shares and archived documents for benchmarking.

pub mod documents;
pub mod users;

use chrono::{DateTime, Utc};
use dossier_core::Snapshot;
use rand::SeedableRng;
use rand::rngs::StdRng;

use documents::build_documents;
use users::build_users;

/// Configuration for the organisation generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Seed for the random number generator (deterministic).
    pub seed: u64,
    /// Number of user accounts, superusers included.
    pub num_users: usize,
    /// Number of documents, archived ones included.
    pub num_documents: usize,
    /// Number of superuser accounts.
    pub num_superusers: usize,
    /// Fraction of ordinary users with no role (0.0-1.0).
    pub no_role_fraction: f64,
    /// Probability that a document is shared at all (0.0-1.0).
    pub share_density: f64,
    /// Upper bound on share targets for a shared document.
    pub max_shares: usize,
    /// Fraction of documents that are archived (0.0-1.0).
    pub archived_fraction: f64,
    /// Creation timestamps are spread over this many days.
    pub history_days: i64,
}

/// Predefined size tiers for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    /// 25 users, 200 documents
    Small,
    /// 100 users, 2 000 documents
    Medium,
    /// 400 users, 20 000 documents
    Large,
    /// 1 500 users, 100 000 documents
    XLarge,
}

impl SizeTier {
    /// Returns the generator configuration for this tier.
    pub fn config(self, seed: u64) -> GeneratorConfig {
        match self {
            SizeTier::Small => GeneratorConfig {
                seed,
                num_users: 25,
                num_documents: 200,
                num_superusers: 1,
                no_role_fraction: 0.2,
                share_density: 0.3,
                max_shares: 3,
                archived_fraction: 0.1,
                history_days: 365,
            },
            SizeTier::Medium => GeneratorConfig {
                seed,
                num_users: 100,
                num_documents: 2_000,
                num_superusers: 2,
                no_role_fraction: 0.3,
                share_density: 0.25,
                max_shares: 5,
                archived_fraction: 0.1,
                history_days: 730,
            },
            SizeTier::Large => GeneratorConfig {
                seed,
                num_users: 400,
                num_documents: 20_000,
                num_superusers: 3,
                no_role_fraction: 0.4,
                share_density: 0.2,
                max_shares: 8,
                archived_fraction: 0.15,
                history_days: 1_095,
            },
            SizeTier::XLarge => GeneratorConfig {
                seed,
                num_users: 1_500,
                num_documents: 100_000,
                num_superusers: 5,
                no_role_fraction: 0.5,
                share_density: 0.2,
                max_shares: 10,
                archived_fraction: 0.2,
                history_days: 1_825,
            },
        }
    }
}

/// Earliest creation timestamp handed out: 2025-01-01T00:00:00Z.
fn history_start() -> DateTime<Utc> {
    DateTime::from_timestamp(1_735_689_600, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Generates an organisation snapshot from the given configuration.
///
/// All randomness is deterministic, seeded from `config.seed`. The result
/// always passes [`Snapshot::validate`].
pub fn generate_organisation(config: &GeneratorConfig) -> Snapshot {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let users = build_users(config, &mut rng);
    let documents = build_documents(config, &users, history_start(), &mut rng);
    Snapshot {
        users,
        documents,
        folders: Vec::new(),
    }
}
