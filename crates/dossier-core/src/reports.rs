/// Read-only summaries over the accessible document set and the audit log.
///
/// Every report starts from the caller's accessible predicate, so archived
/// documents and documents the caller cannot open never contribute to a
/// count.
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::access::AccessPolicy;
use crate::audit::{ActivityFilter, AuditEntry};
use crate::classification::Classification;
use crate::structures::{Document, User};

/// Number of documents shown in the dashboard's "recent" list.
pub const RECENT_DOCUMENTS: usize = 5;

/// Errors from report generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    /// The caller's tier may not see this report.
    #[error("user {0} may not view reports")]
    Forbidden(String),
}

/// Count of accessible documents at one classification level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassificationCount {
    /// The level.
    pub classification: Classification,
    /// Number of accessible documents at that level.
    pub count: usize,
}

/// Personal dashboard summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard<'a> {
    /// Accessible documents.
    pub total: usize,
    /// Accessible documents the user owns.
    pub owned: usize,
    /// Accessible documents created within the window.
    pub recent: usize,
    /// The newest accessible documents.
    pub recent_documents: Vec<&'a Document>,
    /// Non-zero counts per level, least restrictive first.
    pub by_classification: Vec<ClassificationCount>,
}

/// Builds the dashboard for `user` as of `now`.
pub fn dashboard<'a, I>(
    policy: &AccessPolicy,
    user: &User,
    docs: I,
    now: DateTime<Utc>,
    window: Duration,
) -> Dashboard<'a>
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut accessible = policy.accessible(user, docs);
    accessible.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

    // A window reaching past the representable range counts everything.
    let since = now.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC);
    let owned = accessible.iter().filter(|d| d.is_owned_by(&user.id)).count();
    let recent = accessible.iter().filter(|d| d.created_at >= since).count();

    let by_classification = Classification::ALL
        .into_iter()
        .map(|classification| ClassificationCount {
            classification,
            count: accessible
                .iter()
                .filter(|d| d.classification == classification)
                .count(),
        })
        .filter(|c| c.count > 0)
        .collect();

    Dashboard {
        total: accessible.len(),
        owned,
        recent,
        recent_documents: accessible.iter().copied().take(RECENT_DOCUMENTS).collect(),
        by_classification,
    }
}

/// Document inventory for privileged tiers, newest first.
///
/// `category` is a case-insensitive substring match.
pub fn inventory<'a, I>(
    policy: &AccessPolicy,
    user: &User,
    docs: I,
    classification: Option<Classification>,
    category: Option<&str>,
) -> Result<Vec<&'a Document>, ReportError>
where
    I: IntoIterator<Item = &'a Document>,
{
    if !policy.can_view_reports(user) {
        return Err(ReportError::Forbidden(user.id.to_string()));
    }
    let category = category.map(str::to_lowercase);
    let mut rows: Vec<&'a Document> = policy
        .accessible(user, docs)
        .into_iter()
        .filter(|d| classification.is_none_or(|c| d.classification == c))
        .filter(|d| {
            category
                .as_deref()
                .is_none_or(|c| d.category.to_lowercase().contains(c))
        })
        .collect();
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    Ok(rows)
}

/// Audit activity for privileged tiers, newest first, capped at
/// `filter.limit`.
pub fn activity<'a, I>(
    policy: &AccessPolicy,
    user: &User,
    entries: I,
    filter: &ActivityFilter,
) -> Result<Vec<&'a AuditEntry>, ReportError>
where
    I: IntoIterator<Item = &'a AuditEntry>,
{
    if !policy.can_view_reports(user) {
        return Err(ReportError::Forbidden(user.id.to_string()));
    }
    let mut rows: Vec<&'a AuditEntry> = entries.into_iter().filter(|e| filter.matches(e)).collect();
    rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    rows.truncate(filter.limit);
    Ok(rows)
}
