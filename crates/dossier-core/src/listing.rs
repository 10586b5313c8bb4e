/// Accessible-document listing with search filters and pagination.
///
/// Listing is always a two-stage pipeline: the caller's accessible predicate
/// first (which already excludes archived documents), then the search
/// filter. The filter can only narrow the accessible set, never widen it.
///
/// # Composition Rules
///
/// Within [`SearchFilter`], every populated field is a separate group and
/// groups combine with AND. An empty filter matches everything.
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::access::AccessPolicy;
use crate::classification::Classification;
use crate::newtypes::{FolderKey, UserId, Username};
use crate::structures::{Document, User};

/// Search criteria for document listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilter {
    /// Case-insensitive substring over title, description and file name.
    pub query: Option<String>,
    /// Exact classification level.
    pub classification: Option<Classification>,
    /// Case-insensitive substring over the category.
    pub category: Option<String>,
    /// Case-insensitive substring over the owner's username.
    pub owner: Option<String>,
    /// Exact folder key.
    pub section: Option<FolderKey>,
    /// Earliest creation date (inclusive, UTC).
    pub created_from: Option<NaiveDate>,
    /// Latest creation date (inclusive, UTC).
    pub created_to: Option<NaiveDate>,
}

impl SearchFilter {
    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Tests one document. `owner_name` is the username of the document's
    /// owner, if known; an unknown owner never matches an owner filter.
    pub fn matches(&self, doc: &Document, owner_name: Option<&Username>) -> bool {
        if let Some(q) = non_blank(self.query.as_deref()) {
            let q = q.to_lowercase();
            let hit = [&doc.title, &doc.description, &doc.file_name]
                .iter()
                .any(|field| field.to_lowercase().contains(&q));
            if !hit {
                return false;
            }
        }
        if let Some(level) = self.classification {
            if doc.classification != level {
                return false;
            }
        }
        if let Some(cat) = non_blank(self.category.as_deref()) {
            if !contains_ci(&doc.category, cat) {
                return false;
            }
        }
        if let Some(owner) = non_blank(self.owner.as_deref()) {
            match owner_name {
                Some(name) if contains_ci(name, owner) => {}
                Some(_) | None => return false,
            }
        }
        if let Some(section) = &self.section {
            if doc.section != *section {
                return false;
            }
        }
        let created = doc.created_at.date_naive();
        if self.created_from.is_some_and(|from| created < from) {
            return false;
        }
        if self.created_to.is_some_and(|to| created > to) {
            return false;
        }
        true
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// A window into an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Number of leading results to skip.
    pub offset: usize,
    /// Maximum number of results to return.
    pub limit: usize,
}

impl Page {
    /// Default page size.
    pub const DEFAULT_LIMIT: usize = 50;

    /// A page covering every result.
    pub fn all() -> Self {
        Self {
            offset: 0,
            limit: usize::MAX,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// One page of listing results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing<'a> {
    /// Number of documents that passed access and filter, before paging.
    pub total: usize,
    /// The documents on this page, newest first.
    pub documents: Vec<&'a Document>,
}

/// Lists the documents `user` may access that match `filter`.
///
/// Results are ordered newest first, ties broken by document id, and then
/// sliced by `page`. `users` resolves owner ids to usernames for the owner
/// filter.
pub fn list_accessible<'a, 'u, D, U>(
    policy: &AccessPolicy,
    user: &User,
    docs: D,
    users: U,
    filter: &SearchFilter,
    page: Page,
) -> Listing<'a>
where
    D: IntoIterator<Item = &'a Document>,
    U: IntoIterator<Item = &'u User>,
{
    let names: HashMap<&UserId, &Username> = users
        .into_iter()
        .map(|u| (&u.id, &u.username))
        .collect();
    let predicate = policy.accessible_predicate(user);

    let mut hits: Vec<&'a Document> = docs
        .into_iter()
        .filter(|d| predicate.matches(d))
        .filter(|d| filter.matches(d, names.get(d.owner()).copied()))
        .collect();
    hits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

    let total = hits.len();
    let documents = hits.into_iter().skip(page.offset).take(page.limit).collect();
    tracing::debug!(user = %user.id, total, offset = page.offset, "listing");
    Listing { total, documents }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::test_helpers::{adviser, at, doc, officer, user_id};

    fn fixture() -> (Vec<User>, Vec<Document>) {
        let users = vec![adviser(), officer("alice"), officer("bob")];
        let mut budget = doc("budget", "alice", Classification::Internal);
        budget.title = "2026 Budget".to_owned();
        budget.category = "Finance".to_owned();
        budget.created_at = at(3);

        let mut minutes = doc("minutes", "bob", Classification::Public);
        minutes.title = "Meeting minutes".to_owned();
        minutes.description = "budget discussion".to_owned();
        minutes.section = FolderKey::try_from("REPORTS").expect("key");
        minutes.created_at = at(5);

        let mut secret = doc("secret", "bob", Classification::Restricted);
        secret.created_at = at(1);

        let mut old = doc("old", "alice", Classification::Public).archived(user_id("adviser"), at(9));
        old.created_at = at(7);

        (users, vec![budget, minutes, secret, old])
    }

    fn ids(listing: &Listing<'_>) -> Vec<String> {
        listing.documents.iter().map(|d| d.id.to_string()).collect()
    }

    #[test]
    fn newest_first_and_archived_excluded() {
        let (users, docs) = fixture();
        let l = list_accessible(
            &AccessPolicy::default(),
            &adviser(),
            &docs,
            &users,
            &SearchFilter::default(),
            Page::default(),
        );
        assert_eq!(ids(&l), vec!["minutes", "budget", "secret"]);
        assert_eq!(l.total, 3);
    }

    #[test]
    fn filter_cannot_widen_access() {
        let (users, docs) = fixture();
        let filter = SearchFilter {
            owner: Some("bob".to_owned()),
            ..SearchFilter::default()
        };
        let l = list_accessible(
            &AccessPolicy::default(),
            &officer("alice"),
            &docs,
            &users,
            &filter,
            Page::default(),
        );
        assert_eq!(ids(&l), vec!["minutes"]);
    }

    #[test]
    fn query_searches_title_and_description() {
        let (users, docs) = fixture();
        let filter = SearchFilter {
            query: Some("BUDGET".to_owned()),
            ..SearchFilter::default()
        };
        let l = list_accessible(
            &AccessPolicy::default(),
            &adviser(),
            &docs,
            &users,
            &filter,
            Page::default(),
        );
        assert_eq!(ids(&l), vec!["minutes", "budget"]);
    }

    #[test]
    fn groups_combine_with_and() {
        let (users, docs) = fixture();
        let filter = SearchFilter {
            query: Some("budget".to_owned()),
            classification: Some(Classification::Internal),
            category: Some("fin".to_owned()),
            ..SearchFilter::default()
        };
        let l = list_accessible(
            &AccessPolicy::default(),
            &adviser(),
            &docs,
            &users,
            &filter,
            Page::default(),
        );
        assert_eq!(ids(&l), vec!["budget"]);
    }

    #[test]
    fn section_and_date_range() {
        let (users, docs) = fixture();
        let by_section = SearchFilter {
            section: Some(FolderKey::try_from("REPORTS").expect("key")),
            ..SearchFilter::default()
        };
        let policy = AccessPolicy::default();
        let l = list_accessible(&policy, &adviser(), &docs, &users, &by_section, Page::default());
        assert_eq!(ids(&l), vec!["minutes"]);

        let by_date = SearchFilter {
            created_from: Some(at(2).date_naive()),
            created_to: Some(at(3).date_naive()),
            ..SearchFilter::default()
        };
        let l = list_accessible(&policy, &adviser(), &docs, &users, &by_date, Page::default());
        assert_eq!(ids(&l), vec!["budget"]);
    }

    #[test]
    fn pagination_slices_after_ordering() {
        let (users, docs) = fixture();
        let page = Page {
            offset: 1,
            limit: 1,
        };
        let l = list_accessible(
            &AccessPolicy::default(),
            &adviser(),
            &docs,
            &users,
            &SearchFilter::default(),
            page,
        );
        assert_eq!(ids(&l), vec!["budget"]);
        assert_eq!(l.total, 3);
    }

    #[test]
    fn ties_break_by_id() {
        let users = vec![officer("u1")];
        let docs = vec![
            doc("b", "u1", Classification::Public),
            doc("a", "u1", Classification::Public),
        ];
        let l = list_accessible(
            &AccessPolicy::default(),
            &officer("u1"),
            &docs,
            &users,
            &SearchFilter::default(),
            Page::all(),
        );
        assert_eq!(ids(&l), vec!["a", "b"]);
    }

    #[test]
    fn unknown_owner_never_matches_owner_filter() {
        let d = doc("d1", "ghost", Classification::Public);
        let filter = SearchFilter {
            owner: Some("ghost".to_owned()),
            ..SearchFilter::default()
        };
        assert!(!filter.matches(&d, None));
        assert!(SearchFilter::default().matches(&d, None));
    }
}
