#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod access;
pub mod audit;
pub mod classification;
pub mod config;
pub mod folders;
pub mod listing;
pub mod newtypes;
pub mod predicate;
pub mod reports;
pub mod repository;
pub mod role;
pub mod snapshot;
pub mod structures;

#[cfg(test)]
mod test_helpers;

pub use access::{
    ACCESS_RULES, AccessDecision, AccessPolicy, AccessRule, DEFAULT_EFFECT, Effect,
    EquivalenceReport, Mismatch, Subject, accessible_predicate, can_access, find_mismatches,
    synthetic_fact_space,
};
pub use audit::{
    ActivityFilter, AuditAction, AuditEntry, AuditSink, ClientInfo, MemoryAuditLog,
    TracingAuditSink, client_ip,
};
pub use classification::{Classification, ClassificationSet, ParseClassificationError};
pub use config::{ConfigError, PolicyConfig};
pub use folders::{DocumentFolder, FolderError, FolderRegistry};
pub use listing::{Listing, Page, SearchFilter, list_accessible};
pub use newtypes::{DocumentId, FolderKey, NewtypeError, UserId, Username};
pub use predicate::Predicate;
pub use predicate::sql::{SqlFragment, SqlParam, SqlSchema, to_sql};
pub use reports::{ClassificationCount, Dashboard, ReportError, activity, dashboard, inventory};
pub use repository::{
    MetadataUpdate, NewDocument, Repository, RepositoryError, RequestContext,
};
pub use role::{ParseRoleError, ParseTierError, Role, RoleTiers, Tier, tier_of};
pub use snapshot::{Snapshot, SnapshotError};
pub use structures::{Document, User, parse_tags};

/// Returns the current version of the dossier-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
