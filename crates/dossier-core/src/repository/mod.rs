/// In-memory document and user store with access-checked operations.
///
/// Every operation follows the same shape:
///
/// 1. resolve the acting user and the target from the store;
/// 2. consult the [`AccessPolicy`];
/// 3. apply the change (if any);
/// 4. record an audit entry, only on success.
///
/// Each call reads the state it needs once, so no decision spans two reads
/// of the same record.
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::access::AccessPolicy;
use crate::audit::{AuditAction, AuditEntry, AuditSink, ClientInfo, TracingAuditSink};
use crate::classification::Classification;
use crate::folders::{DocumentFolder, FolderError, FolderRegistry};
use crate::listing::{self, Listing, Page, SearchFilter};
use crate::newtypes::{DocumentId, FolderKey, UserId, Username};
use crate::predicate::Predicate;
use crate::reports::{self, Dashboard, ReportError};
use crate::role::Role;
use crate::snapshot::{Snapshot, SnapshotError};
use crate::structures::{Document, User, parse_tags};

/// Default upload size cap (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Errors returned by [`Repository`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// The acting or target user does not exist.
    #[error("unknown user {0}")]
    UnknownUser(UserId),

    /// The target document does not exist.
    #[error("document {0} not found")]
    NotFound(DocumentId),

    /// The policy refused the operation.
    #[error("user {user} may not {action}")]
    Forbidden {
        /// Who asked.
        user: UserId,
        /// What was refused (`"view document d1"`).
        action: String,
    },

    /// A user id is already registered.
    #[error("user id {0} is already registered")]
    DuplicateUser(UserId),

    /// A username is already taken (case-insensitive).
    #[error("username {0} is already taken")]
    DuplicateUsername(Username),

    /// A document id is already in use.
    #[error("document id {0} is already in use")]
    DuplicateDocument(DocumentId),

    /// The document is already archived.
    #[error("document {0} is already archived")]
    AlreadyArchived(DocumentId),

    /// The document is not archived.
    #[error("document {0} is not archived")]
    NotArchived(DocumentId),

    /// The upload exceeds the size cap.
    #[error("file is {size} bytes; the limit is {max} bytes")]
    FileTooLarge {
        /// Upload size.
        size: u64,
        /// Configured cap.
        max: u64,
    },

    /// The title is empty after trimming.
    #[error("document title must not be empty")]
    EmptyTitle,

    /// Only sign-in, sign-out and password resets come from the session layer.
    #[error("{0} is not a session event")]
    NotASessionEvent(AuditAction),

    /// Folder administration failed, or a document names an unknown folder.
    #[error(transparent)]
    Folder(#[from] FolderError),

    /// A report was refused.
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Who is acting, from where, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// The acting user.
    pub actor: UserId,
    /// Transport-level client details for the audit trail.
    pub client: ClientInfo,
    /// The time the request is processed at.
    pub now: DateTime<Utc>,
}

impl RequestContext {
    /// A context with no client details.
    pub fn new(actor: UserId, now: DateTime<Utc>) -> Self {
        Self {
            actor,
            client: ClientInfo::default(),
            now,
        }
    }
}

/// Fields supplied with an upload. The owner is always the uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    /// Identifier to store the document under.
    pub id: DocumentId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Original file name.
    pub file_name: String,
    /// File size in bytes.
    pub file_size: u64,
    /// MIME type.
    pub file_type: String,
    /// Sensitivity level.
    pub classification: Classification,
    /// Folder.
    pub section: FolderKey,
    /// Category.
    pub category: String,
    /// Comma-separated tags.
    pub tags: String,
}

impl NewDocument {
    /// An `internal` upload in `GENERAL` with no description.
    pub fn new(id: DocumentId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            file_name: String::new(),
            file_size: 0,
            file_type: String::new(),
            classification: Classification::default(),
            section: FolderKey::default(),
            category: String::new(),
            tags: String::new(),
        }
    }
}

/// A partial metadata update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataUpdate {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New classification.
    pub classification: Option<Classification>,
    /// New folder.
    pub section: Option<FolderKey>,
    /// New category.
    pub category: Option<String>,
    /// New comma-separated tags.
    pub tags: Option<String>,
}

/// The store.
pub struct Repository {
    policy: AccessPolicy,
    users: BTreeMap<UserId, User>,
    documents: BTreeMap<DocumentId, Document>,
    folders: FolderRegistry,
    audit: Arc<dyn AuditSink>,
    max_file_size: u64,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("users", &self.users.len())
            .field("documents", &self.documents.len())
            .field("folders", &self.folders.len())
            .field("max_file_size", &self.max_file_size)
            .finish_non_exhaustive()
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new(AccessPolicy::default(), Arc::new(TracingAuditSink))
    }
}

impl Repository {
    /// An empty store with the standing folders.
    pub fn new(policy: AccessPolicy, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            policy,
            users: BTreeMap::new(),
            documents: BTreeMap::new(),
            folders: FolderRegistry::default(),
            audit,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Loads a validated snapshot.
    pub fn from_snapshot(
        snapshot: Snapshot,
        policy: AccessPolicy,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, SnapshotError> {
        snapshot.validate()?;
        let folders = snapshot.folder_registry()?;
        Ok(Self {
            policy,
            users: snapshot.users.into_iter().map(|u| (u.id.clone(), u)).collect(),
            documents: snapshot
                .documents
                .into_iter()
                .map(|d| (d.id.clone(), d))
                .collect(),
            folders,
            audit,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        })
    }

    /// Sets the upload size cap (builder form).
    #[must_use]
    pub fn with_max_file_size(mut self, max: u64) -> Self {
        self.max_file_size = max;
        self
    }

    /// Exports the current state.
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            users: self.users.values().cloned().collect(),
            documents: self.documents.values().cloned().collect(),
            folders: self.folders.iter().cloned().collect(),
        }
    }

    // -- plain accessors --------------------------------------------------------

    /// The policy in force.
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// The folder registry.
    pub fn folders(&self) -> &FolderRegistry {
        &self.folders
    }

    /// Looks up a user.
    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    /// Iterates users by id.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Iterates every document, archived ones included, without any access
    /// check. For administration and tests.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    // -- internals --------------------------------------------------------------

    fn actor(&self, ctx: &RequestContext) -> Result<&User, RepositoryError> {
        self.users
            .get(&ctx.actor)
            .ok_or_else(|| RepositoryError::UnknownUser(ctx.actor.clone()))
    }

    fn document(&self, id: &DocumentId) -> Result<&Document, RepositoryError> {
        self.documents
            .get(id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }

    fn record(&self, ctx: &RequestContext, action: AuditAction, description: String) {
        let entry =
            AuditEntry::new(ctx.actor.clone(), action, description, ctx.now).with_client(&ctx.client);
        self.audit.record(entry);
    }

    fn forbidden(ctx: &RequestContext, action: String) -> RepositoryError {
        tracing::debug!(user = %ctx.actor, %action, "forbidden");
        RepositoryError::Forbidden {
            user: ctx.actor.clone(),
            action,
        }
    }

    fn ensure_folder(&self, key: &FolderKey) -> Result<(), RepositoryError> {
        if self.folders.contains(key) {
            Ok(())
        } else {
            Err(FolderError::NotFound(key.clone()).into())
        }
    }

    // -- accounts ---------------------------------------------------------------

    /// Registers a new account. Self-registration always starts without
    /// superuser rights.
    pub fn register_user(
        &mut self,
        mut user: User,
        client: ClientInfo,
        now: DateTime<Utc>,
    ) -> Result<&User, RepositoryError> {
        if self.users.contains_key(&user.id) {
            return Err(RepositoryError::DuplicateUser(user.id));
        }
        let lower = user.username.to_lowercase();
        if self.users.values().any(|u| u.username.to_lowercase() == lower) {
            return Err(RepositoryError::DuplicateUsername(user.username));
        }
        user.is_superuser = false;
        let ctx = RequestContext {
            actor: user.id.clone(),
            client,
            now,
        };
        self.record(&ctx, AuditAction::Register, format!("Registered user: {}", user.username));
        Ok(self.users.entry(user.id.clone()).or_insert(user))
    }

    /// Reassigns `target`'s role. Full tier only.
    pub fn reassign_role(
        &mut self,
        ctx: &RequestContext,
        target: &UserId,
        role: Option<Role>,
    ) -> Result<&User, RepositoryError> {
        let actor = self.actor(ctx)?;
        if !self.policy.can_manage_roles(actor) {
            return Err(Self::forbidden(ctx, format!("change the role of {target}")));
        }
        let user = self
            .users
            .get_mut(target)
            .ok_or_else(|| RepositoryError::UnknownUser(target.clone()))?;
        let before = user.role;
        user.role = role;
        let description = format!(
            "Changed role of {} from {} to {}",
            user.username,
            before.map_or("none", Role::as_str),
            role.map_or("none", Role::as_str)
        );
        self.record(ctx, AuditAction::RoleChange, description);
        self.users
            .get(target)
            .ok_or_else(|| RepositoryError::UnknownUser(target.clone()))
    }

    /// Records an authentication event reported by the session layer. Any
    /// other action is refused and nothing is logged.
    pub fn record_session_event(
        &self,
        ctx: &RequestContext,
        action: AuditAction,
    ) -> Result<(), RepositoryError> {
        if !action.is_session_event() {
            return Err(RepositoryError::NotASessionEvent(action));
        }
        let actor = self.actor(ctx)?;
        let description = format!("{} {}", action, actor.username);
        self.record(ctx, action, description);
        Ok(())
    }

    // -- documents --------------------------------------------------------------

    /// Stores a new document owned by the actor.
    pub fn upload(
        &mut self,
        ctx: &RequestContext,
        new: NewDocument,
    ) -> Result<&Document, RepositoryError> {
        self.actor(ctx)?;
        if new.file_size > self.max_file_size {
            return Err(RepositoryError::FileTooLarge {
                size: new.file_size,
                max: self.max_file_size,
            });
        }
        let title = new.title.trim();
        if title.is_empty() {
            return Err(RepositoryError::EmptyTitle);
        }
        if self.documents.contains_key(&new.id) {
            return Err(RepositoryError::DuplicateDocument(new.id));
        }
        self.ensure_folder(&new.section)?;

        let mut doc = Document::new(new.id.clone(), title, ctx.actor.clone(), ctx.now)
            .with_classification(new.classification);
        doc.description = new.description;
        doc.file_name = new.file_name;
        doc.file_size = new.file_size;
        doc.file_type = new.file_type;
        doc.section = new.section;
        doc.category = new.category;
        doc.tags = parse_tags(&new.tags);

        self.record(ctx, AuditAction::DocumentUpload, format!("Uploaded document: {}", doc.title));
        Ok(self.documents.entry(new.id).or_insert(doc))
    }

    /// Returns a document the actor may access.
    pub fn view(&self, ctx: &RequestContext, id: &DocumentId) -> Result<Document, RepositoryError> {
        self.read(ctx, id, AuditAction::DocumentView, "view", "Viewed")
    }

    /// Returns a document the actor may download. Serving the bytes is the
    /// storage layer's job.
    pub fn download(
        &self,
        ctx: &RequestContext,
        id: &DocumentId,
    ) -> Result<Document, RepositoryError> {
        self.read(ctx, id, AuditAction::DocumentDownload, "download", "Downloaded")
    }

    fn read(
        &self,
        ctx: &RequestContext,
        id: &DocumentId,
        action: AuditAction,
        verb: &str,
        past: &str,
    ) -> Result<Document, RepositoryError> {
        let actor = self.actor(ctx)?;
        let doc = self.document(id)?;
        if !self.policy.can_access(actor, doc) {
            return Err(Self::forbidden(ctx, format!("{verb} document {id}")));
        }
        let snapshot = doc.clone();
        self.record(ctx, action, format!("{past} document: {}", snapshot.title));
        Ok(snapshot)
    }

    /// Applies a metadata update. Owners and privileged tiers only.
    pub fn update_metadata(
        &mut self,
        ctx: &RequestContext,
        id: &DocumentId,
        update: MetadataUpdate,
    ) -> Result<&Document, RepositoryError> {
        let actor = self.actor(ctx)?;
        let doc = self.document(id)?;
        if !self.policy.can_update(actor, doc) {
            return Err(Self::forbidden(ctx, format!("update document {id}")));
        }
        if let Some(section) = &update.section {
            self.ensure_folder(section)?;
        }
        let title = match update.title.as_deref().map(str::trim) {
            Some("") => return Err(RepositoryError::EmptyTitle),
            Some(t) => Some(t.to_owned()),
            None => None,
        };

        let doc = self
            .documents
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        if let Some(t) = title {
            doc.title = t;
        }
        if let Some(d) = update.description {
            doc.description = d;
        }
        if let Some(c) = update.classification {
            doc.classification = c;
        }
        if let Some(s) = update.section {
            doc.section = s;
        }
        if let Some(c) = update.category {
            doc.category = c;
        }
        if let Some(t) = update.tags {
            doc.tags = parse_tags(&t);
        }
        doc.updated_at = ctx.now;
        let description = format!("Updated document: {}", doc.title);
        self.record(ctx, AuditAction::DocumentUpdate, description);
        self.document(id)
    }

    /// Adds `target` to the share list.
    pub fn share(
        &mut self,
        ctx: &RequestContext,
        id: &DocumentId,
        target: &UserId,
    ) -> Result<&Document, RepositoryError> {
        self.change_share(ctx, id, target, true)
    }

    /// Removes `target` from the share list.
    pub fn unshare(
        &mut self,
        ctx: &RequestContext,
        id: &DocumentId,
        target: &UserId,
    ) -> Result<&Document, RepositoryError> {
        self.change_share(ctx, id, target, false)
    }

    fn change_share(
        &mut self,
        ctx: &RequestContext,
        id: &DocumentId,
        target: &UserId,
        add: bool,
    ) -> Result<&Document, RepositoryError> {
        let actor = self.actor(ctx)?;
        let doc = self.document(id)?;
        if !self.policy.can_update(actor, doc) {
            return Err(Self::forbidden(ctx, format!("change sharing of document {id}")));
        }
        let target_name = self
            .users
            .get(target)
            .map(|u| u.username.to_string())
            .ok_or_else(|| RepositoryError::UnknownUser(target.clone()))?;

        let doc = self
            .documents
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        // The owner already has access; sharing with them is a no-op.
        let changed = if add {
            doc.owner() != target && doc.shared_with.insert(target.clone())
        } else {
            doc.shared_with.remove(target)
        };
        if changed {
            doc.updated_at = ctx.now;
            let description = if add {
                format!("Shared document: {} with {target_name}", doc.title)
            } else {
                format!("Unshared document: {} from {target_name}", doc.title)
            };
            self.record(ctx, AuditAction::DocumentUpdate, description);
        }
        self.document(id)
    }

    /// Archives a document. Privileged tiers only.
    pub fn archive(
        &mut self,
        ctx: &RequestContext,
        id: &DocumentId,
    ) -> Result<&Document, RepositoryError> {
        let actor = self.actor(ctx)?;
        let doc = self.document(id)?;
        if doc.is_archived {
            return Err(RepositoryError::AlreadyArchived(id.clone()));
        }
        if !self.policy.can_archive(actor, doc) {
            return Err(Self::forbidden(ctx, format!("archive document {id}")));
        }
        let doc = self
            .documents
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        doc.is_archived = true;
        doc.archived_at = Some(ctx.now);
        doc.archived_by = Some(ctx.actor.clone());
        let description = format!("Archived document: {}", doc.title);
        self.record(ctx, AuditAction::DocumentArchive, description);
        self.document(id)
    }

    /// Restores an archived document. Full tier only.
    pub fn restore(
        &mut self,
        ctx: &RequestContext,
        id: &DocumentId,
    ) -> Result<&Document, RepositoryError> {
        let actor = self.actor(ctx)?;
        let doc = self.document(id)?;
        if !doc.is_archived {
            return Err(RepositoryError::NotArchived(id.clone()));
        }
        if !self.policy.can_restore(actor, doc) {
            return Err(Self::forbidden(ctx, format!("restore document {id}")));
        }
        let doc = self
            .documents
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        doc.is_archived = false;
        doc.archived_at = None;
        doc.archived_by = None;
        let description = format!("Restored document: {}", doc.title);
        self.record(ctx, AuditAction::DocumentRestore, description);
        self.document(id)
    }

    /// Lists accessible documents matching `filter`.
    pub fn list(
        &self,
        ctx: &RequestContext,
        filter: &SearchFilter,
        page: Page,
    ) -> Result<Listing<'_>, RepositoryError> {
        let actor = self.actor(ctx)?;
        Ok(listing::list_accessible(
            &self.policy,
            actor,
            self.documents.values(),
            self.users.values(),
            filter,
            page,
        ))
    }

    /// The actor's accessible predicate.
    pub fn accessible_predicate(&self, ctx: &RequestContext) -> Result<Predicate, RepositoryError> {
        Ok(self.policy.accessible_predicate(self.actor(ctx)?))
    }

    /// The actor's dashboard over the last `window`.
    pub fn dashboard(
        &self,
        ctx: &RequestContext,
        window: Duration,
    ) -> Result<Dashboard<'_>, RepositoryError> {
        let actor = self.actor(ctx)?;
        Ok(reports::dashboard(
            &self.policy,
            actor,
            self.documents.values(),
            ctx.now,
            window,
        ))
    }

    /// The document inventory report.
    pub fn inventory(
        &self,
        ctx: &RequestContext,
        classification: Option<Classification>,
        category: Option<&str>,
    ) -> Result<Vec<&Document>, RepositoryError> {
        let actor = self.actor(ctx)?;
        Ok(reports::inventory(
            &self.policy,
            actor,
            self.documents.values(),
            classification,
            category,
        )?)
    }

    // -- folders ----------------------------------------------------------------

    /// Adds a folder. Full tier only.
    pub fn add_folder(
        &mut self,
        ctx: &RequestContext,
        key: FolderKey,
        name: &str,
    ) -> Result<DocumentFolder, RepositoryError> {
        self.ensure_folder_admin(ctx)?;
        let folder = self.folders.add(key, name)?.clone();
        self.record(ctx, AuditAction::FolderChange, format!("Added folder: {}", folder.name));
        Ok(folder)
    }

    /// Renames a folder. Full tier only.
    pub fn rename_folder(
        &mut self,
        ctx: &RequestContext,
        key: &FolderKey,
        name: &str,
    ) -> Result<DocumentFolder, RepositoryError> {
        self.ensure_folder_admin(ctx)?;
        let folder = self.folders.rename(key, name)?.clone();
        self.record(
            ctx,
            AuditAction::FolderChange,
            format!("Renamed folder {key} to {}", folder.name),
        );
        Ok(folder)
    }

    /// Removes an unused folder. Full tier only.
    pub fn remove_folder(
        &mut self,
        ctx: &RequestContext,
        key: &FolderKey,
    ) -> Result<DocumentFolder, RepositoryError> {
        self.ensure_folder_admin(ctx)?;
        let folder = self.folders.remove(key, self.documents.values())?;
        self.record(ctx, AuditAction::FolderChange, format!("Removed folder: {}", folder.name));
        Ok(folder)
    }

    fn ensure_folder_admin(&self, ctx: &RequestContext) -> Result<(), RepositoryError> {
        let actor = self.actor(ctx)?;
        if self.policy.can_manage_folders(actor) {
            Ok(())
        } else {
            Err(Self::forbidden(ctx, "manage folders".to_owned()))
        }
    }
}
