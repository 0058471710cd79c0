//! # Marketing Item Lifecycle
//!
//! Orchestrates every mutation and query over catalog items:
//!
//! ```text
//!            create / duplicate
//!                   │
//!                   ▼
//!   update ──►  [Active] ──archive──► [Archived]
//!                   ▲                     │
//!                   └──────restore────────┘
//!                   │                     │
//!                   └────hard_delete──────┴──► (gone)
//! ```
//!
//! Authorization happens first in every operation. Branch-scoped callers
//! read their own branch plus global items and write only their own branch;
//! items outside that scope are reported as not found.
//!
//! Generated codes and slugs are probed against a snapshot and committed
//! through the repository's uniqueness constraint. A lost race is retried
//! up to [`MAX_ALLOCATION_ATTEMPTS`] times; caller-supplied identifiers are
//! never retried.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::{authorize, Principal, Role};
use crate::observability::{AuditAction, AuditRecorder, Event, Logger};

use super::allocator::{allocate_code, allocate_slug, code_prefix, slugify};
use super::clock::Clock;
use super::cta;
use super::errors::{CatalogError, CatalogResult, RepositoryError, UniqueField};
use super::item::{non_blank, parse_date, CreateItem, ItemKind, ItemPatch, ItemView, MarketingItem};
use super::repository::{BranchFilter, ItemFilter, ItemRepository};
use super::status::{Status, StatusResolver};
use super::tags::{default_tags, normalize_tags};

/// Bound on generated-identifier commits per create or duplicate
pub const MAX_ALLOCATION_ATTEMPTS: usize = 5;

/// Type segment of generated codes, per kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeTags {
    #[serde(default = "default_brochure_tag")]
    pub brochure: String,
    #[serde(default = "default_service_tag")]
    pub service: String,
}

fn default_brochure_tag() -> String {
    ItemKind::Brochure.default_code_tag().to_string()
}

fn default_service_tag() -> String {
    ItemKind::Service.default_code_tag().to_string()
}

impl Default for CodeTags {
    fn default() -> Self {
        Self {
            brochure: default_brochure_tag(),
            service: default_service_tag(),
        }
    }
}

impl CodeTags {
    pub fn for_kind(&self, kind: ItemKind) -> &str {
        match kind {
            ItemKind::Brochure => &self.brochure,
            ItemKind::Service => &self.service,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LifecycleConfig {
    /// Branch a super admin's create falls back to; None = global
    pub default_branch_id: Option<u64>,

    /// Phone used for the CTA when an item carries none
    pub default_contact_phone: Option<String>,

    pub code_tags: CodeTags,
}

/// Result of an archive request
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveOutcome {
    Archived(ItemView),
    /// No-op; nothing was written or audited
    AlreadyArchived(ItemView),
}

impl ArchiveOutcome {
    pub fn view(&self) -> &ItemView {
        match self {
            ArchiveOutcome::Archived(v) | ArchiveOutcome::AlreadyArchived(v) => v,
        }
    }

    pub fn was_applied(&self) -> bool {
        matches!(self, ArchiveOutcome::Archived(_))
    }
}

/// Listing filters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub branch_id: Option<u64>,
    pub status: Option<Status>,
    pub tag: Option<String>,
    pub category: Option<String>,
    /// Requires post_admin
    pub include_archived: bool,
}

pub struct MarketingItemLifecycle {
    repo: Arc<dyn ItemRepository>,
    audit: AuditRecorder,
    clock: Arc<dyn Clock>,
    config: LifecycleConfig,
}

fn validate_price(price: Option<f64>) -> CatalogResult<()> {
    match price {
        Some(p) if !p.is_finite() || p <= 0.0 => {
            Err(CatalogError::validation("Price must be greater than 0"))
        }
        _ => Ok(()),
    }
}

fn validate_window(start: Option<NaiveDate>, expiry: Option<NaiveDate>) -> CatalogResult<()> {
    match (start, expiry) {
        (Some(s), Some(e)) if s > e => Err(CatalogError::validation(
            "Start date must be on or before expiry date",
        )),
        _ => Ok(()),
    }
}

fn required(label: &str, value: Option<String>) -> CatalogResult<String> {
    non_blank(value).ok_or_else(|| CatalogError::validation(format!("{} is required", label)))
}

/// Branch-scoped callers read their own branch and global items
fn can_read(principal: &Principal, item: &MarketingItem) -> bool {
    !principal.role.is_branch_scoped()
        || item.branch_id.is_none()
        || item.branch_id == principal.branch_id
}

/// Branch-scoped callers write their own branch only
fn can_write(principal: &Principal, item: &MarketingItem) -> bool {
    !principal.role.is_branch_scoped()
        || (principal.branch_id.is_some() && item.branch_id == principal.branch_id)
}

fn event_fields(actor: &Principal, kind: ItemKind, item: &MarketingItem) -> Vec<(&'static str, String)> {
    vec![
        ("actor", actor.name.clone()),
        ("code", item.code.clone()),
        ("id", item.id.to_string()),
        ("kind", kind.to_string()),
        ("role", actor.role.to_string()),
    ]
}

impl MarketingItemLifecycle {
    pub fn new(
        repo: Arc<dyn ItemRepository>,
        audit: AuditRecorder,
        clock: Arc<dyn Clock>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            repo,
            audit,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn view(&self, item: MarketingItem) -> ItemView {
        let status = StatusResolver::resolve(&item, self.today());
        ItemView { item, status }
    }

    fn not_found(kind: ItemKind, id: u64) -> CatalogError {
        CatalogError::not_found(format!("{} {} not found", kind.label(), id))
    }

    fn note_advisory_status(&self, kind: ItemKind, actor: &Principal, status: Option<&str>) {
        if let Some(status) = status.map(str::trim).filter(|s| !s.is_empty()) {
            Logger::trace(
                Event::AdvisoryStatusIgnored,
                &[
                    ("actor", actor.name.clone()),
                    ("kind", kind.to_string()),
                    ("status", status.to_string()),
                ],
            );
        }
    }

    fn audit(
        &self,
        actor: &Principal,
        action: AuditAction,
        kind: ItemKind,
        id: u64,
        note: Option<String>,
    ) {
        self.audit
            .record(&actor.name, actor.role, action, kind.label(), id, note);
    }

    /// Load an item the actor may mutate
    fn load_for_write(
        &self,
        kind: ItemKind,
        id: u64,
        actor: &Principal,
    ) -> CatalogResult<MarketingItem> {
        match self.repo.get(kind, id)? {
            Some(item) if can_write(actor, &item) => Ok(item),
            _ => Err(Self::not_found(kind, id)),
        }
    }

    fn branch_for_create(&self, actor: &Principal, requested: Option<u64>) -> CatalogResult<Option<u64>> {
        if actor.role.is_branch_scoped() {
            actor
                .branch_id
                .map(Some)
                .ok_or_else(|| CatalogError::validation("Missing branch ID for branch-scoped role"))
        } else {
            Ok(requested.or(self.config.default_branch_id))
        }
    }

    /// Assign code and slug, then insert
    ///
    /// Explicit values that are already taken fail immediately. Generated
    /// values that lose a race at commit are re-probed against a fresh
    /// snapshot.
    fn insert_with_identity(
        &self,
        kind: ItemKind,
        draft: MarketingItem,
        explicit_code: Option<String>,
        explicit_slug: Option<String>,
    ) -> CatalogResult<MarketingItem> {
        let prefix = code_prefix(self.today(), self.config.code_tags.for_kind(kind));
        let base_slug = slugify(&draft.title);

        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let existing = self.repo.list(kind, &ItemFilter::all())?;
            let codes: HashSet<String> = existing.iter().map(|i| i.code.clone()).collect();
            let slugs: HashSet<String> = existing.into_iter().map(|i| i.slug).collect();

            let code = match &explicit_code {
                Some(code) if codes.contains(code) => {
                    return Err(RepositoryError::Conflict {
                        field: UniqueField::Code,
                        value: code.clone(),
                    }
                    .into())
                }
                Some(code) => code.clone(),
                None => allocate_code(&prefix, &codes).ok_or_else(|| {
                    CatalogError::Conflict(format!(
                        "No {} codes left under prefix {}",
                        kind, prefix
                    ))
                })?,
            };
            let slug = match &explicit_slug {
                Some(slug) if slugs.contains(slug) => {
                    return Err(RepositoryError::Conflict {
                        field: UniqueField::Slug,
                        value: slug.clone(),
                    }
                    .into())
                }
                Some(slug) => slug.clone(),
                None => allocate_slug(&base_slug, &slugs),
            };

            let mut item = draft.clone();
            item.code = code;
            item.slug = slug;
            item.cta_link = cta::link_for(&item);

            match self.repo.insert(kind, item) {
                Ok(saved) => return Ok(saved),
                Err(RepositoryError::Conflict { field, value }) => {
                    let generated = match field {
                        UniqueField::Code => explicit_code.is_none(),
                        UniqueField::Slug => explicit_slug.is_none(),
                    };
                    if !generated {
                        return Err(RepositoryError::Conflict { field, value }.into());
                    }
                    Logger::warn(
                        Event::CodeAllocationRetry,
                        &[
                            ("attempt", attempt.to_string()),
                            ("field", field.to_string()),
                            ("kind", kind.to_string()),
                            ("value", value),
                        ],
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(CatalogError::Conflict(format!(
            "Could not allocate a unique {} code after {} attempts",
            kind, MAX_ALLOCATION_ATTEMPTS
        )))
    }

    /// Merge a patch into `item`, returning the names of changed fields
    ///
    /// `code` and `slug` are applied verbatim here; callers that want them
    /// allocated take them out of the patch first.
    fn apply_patch(
        &self,
        item: &mut MarketingItem,
        patch: ItemPatch,
        actor: &Principal,
    ) -> CatalogResult<Vec<&'static str>> {
        let before = item.clone();

        if let Some(title) = patch.title {
            item.title = required("Title", Some(title))?;
        }
        if let Some(category) = patch.category {
            item.category = required("Category", Some(category))?;
        }
        if let Some(description) = patch.description {
            item.description = non_blank(description);
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
            item.price = price;
        }
        if let Some(code) = patch.code {
            item.code = required("Code", Some(code))?;
        }
        if let Some(slug) = patch.slug {
            item.slug = slugify(&required("Slug", Some(slug))?);
        }
        if let Some(image_url) = patch.image_url {
            item.image_url = non_blank(image_url);
        }
        if let Some(start) = patch.start_date {
            item.start_date = parse_date("start date", start.as_deref())?;
        }
        if let Some(expiry) = patch.expiry_date {
            item.expiry_date = parse_date("expiry date", expiry.as_deref())?;
        }
        validate_window(item.start_date, item.expiry_date)?;
        if let Some(infinite) = patch.infinite {
            item.infinite = infinite;
        }
        if let Some(tags) = patch.tags {
            item.tags = normalize_tags(tags);
        }
        if let Some(branch_id) = patch.branch_id {
            if branch_id != item.branch_id && actor.role.is_branch_scoped() {
                return Err(CatalogError::forbidden(
                    "Branch-scoped roles cannot move items between branches",
                ));
            }
            item.branch_id = branch_id;
        }
        if let Some(phone) = patch.contact_phone {
            item.contact_phone = non_blank(phone);
        }
        if let Some(link) = patch.cta_override {
            item.cta_override = non_blank(link);
        }

        let mut changed = Vec::new();
        macro_rules! track {
            ($($field:ident),*) => {
                $(if before.$field != item.$field {
                    changed.push(stringify!($field));
                })*
            };
        }
        track!(
            title, category, description, price, code, slug, image_url, start_date,
            expiry_date, infinite, tags, branch_id, contact_phone, cta_override
        );
        Ok(changed)
    }

    /// Create a new item (post_admin)
    pub fn create(&self, kind: ItemKind, actor: &Principal, payload: CreateItem) -> CatalogResult<ItemView> {
        actor.require(Role::PostAdmin)?;
        self.note_advisory_status(kind, actor, payload.status.as_deref());

        let title = required("Title", Some(payload.title))?;
        let category = required("Category", Some(payload.category))?;
        validate_price(payload.price)?;
        let start_date = parse_date("start date", payload.start_date.as_deref())?;
        let expiry_date = parse_date("expiry date", payload.expiry_date.as_deref())?;
        validate_window(start_date, expiry_date)?;

        let branch_id = self.branch_for_create(actor, payload.branch_id)?;
        let mut tags = normalize_tags(payload.tags);
        if tags.is_empty() {
            tags = default_tags(branch_id);
        }

        let now = self.clock.now();
        let draft = MarketingItem {
            id: 0,
            kind,
            branch_id,
            title,
            description: non_blank(payload.description),
            category,
            code: String::new(),
            slug: String::new(),
            price: payload.price,
            image_url: non_blank(payload.image_url),
            start_date,
            expiry_date,
            infinite: payload.infinite.unwrap_or(false),
            is_active: payload.is_active.unwrap_or(true),
            tags,
            contact_phone: non_blank(payload.contact_phone)
                .or_else(|| self.config.default_contact_phone.clone()),
            cta_override: non_blank(payload.cta_override),
            cta_link: None,
            created_at: now,
            updated_at: now,
        };

        let explicit_slug = non_blank(payload.slug).map(|s| slugify(&s));
        let item = self.insert_with_identity(kind, draft, non_blank(payload.code), explicit_slug)?;

        self.audit(actor, AuditAction::Create, kind, item.id, None);
        Logger::info(Event::ItemCreated, &event_fields(actor, kind, &item));
        Ok(self.view(item))
    }

    /// Fetch one item
    ///
    /// Anonymous callers and viewers see active items only; post_admin and
    /// above also see archived ones.
    pub fn get(&self, kind: ItemKind, id: u64, viewer: Option<&Principal>) -> CatalogResult<ItemView> {
        let item = self.repo.get(kind, id)?.ok_or_else(|| Self::not_found(kind, id))?;

        let visible = match viewer {
            None => item.is_active,
            Some(p) => {
                can_read(p, &item) && (item.is_active || authorize(p.role, Role::PostAdmin))
            }
        };
        if !visible {
            return Err(Self::not_found(kind, id));
        }
        Ok(self.view(item))
    }

    /// List items, newest first
    pub fn list(
        &self,
        kind: ItemKind,
        query: &ListQuery,
        viewer: Option<&Principal>,
    ) -> CatalogResult<Vec<ItemView>> {
        if query.include_archived {
            viewer.ok_or(CatalogError::Unauthorized)?.require(Role::PostAdmin)?;
        }

        let branch = match viewer {
            Some(p) if p.role.is_branch_scoped() => match p.branch_id {
                Some(b) => BranchFilter::VisibleTo(b),
                None => BranchFilter::Exactly(None),
            },
            _ => BranchFilter::Any,
        };
        let filter = ItemFilter {
            is_active: if query.include_archived { None } else { Some(true) },
            branch,
        };

        let tag = query.tag.as_deref().map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty());
        let category = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty());

        let mut views: Vec<ItemView> = self
            .repo
            .list(kind, &filter)?
            .into_iter()
            .filter(|i| query.branch_id.map_or(true, |b| i.branch_id == Some(b)))
            .filter(|i| tag.as_ref().map_or(true, |t| i.tags.contains(t)))
            .filter(|i| category.map_or(true, |c| i.category.eq_ignore_ascii_case(c)))
            .map(|i| self.view(i))
            .filter(|v| query.status.map_or(true, |s| v.status == s))
            .collect();

        views.sort_by(|a, b| {
            b.item
                .created_at
                .cmp(&a.item.created_at)
                .then(b.item.id.cmp(&a.item.id))
        });
        Ok(views)
    }

    /// Patch an active item (post_admin)
    pub fn update(
        &self,
        kind: ItemKind,
        id: u64,
        actor: &Principal,
        patch: ItemPatch,
    ) -> CatalogResult<ItemView> {
        actor.require(Role::PostAdmin)?;
        self.note_advisory_status(kind, actor, patch.status.as_deref());

        let current = self.load_for_write(kind, id, actor)?;
        if !current.is_active {
            return Err(CatalogError::not_found(format!(
                "{} {} is archived; restore it before editing",
                kind.label(),
                id
            )));
        }

        let mut item = current.clone();
        let changed = self.apply_patch(&mut item, patch, actor)?;
        if changed
            .iter()
            .any(|f| matches!(*f, "title" | "code" | "contact_phone" | "cta_override"))
        {
            item.cta_link = cta::link_for(&item);
        }
        item.updated_at = self.clock.now();
        self.repo.update(kind, &current, &item)?;

        let note = (!changed.is_empty()).then(|| format!("changed={}", changed.join(",")));
        self.audit(actor, AuditAction::Update, kind, id, note);
        Logger::info(Event::ItemUpdated, &event_fields(actor, kind, &item));
        Ok(self.view(item))
    }

    /// Soft-delete (post_admin)
    pub fn archive(&self, kind: ItemKind, id: u64, actor: &Principal) -> CatalogResult<ArchiveOutcome> {
        actor.require(Role::PostAdmin)?;

        let current = self.load_for_write(kind, id, actor)?;
        if !current.is_active {
            return Ok(ArchiveOutcome::AlreadyArchived(self.view(current)));
        }

        let previous = StatusResolver::resolve(&current, self.today());
        let mut item = current.clone();
        item.is_active = false;
        item.updated_at = self.clock.now();
        self.repo.update(kind, &current, &item)?;

        self.audit(
            actor,
            AuditAction::Archive,
            kind,
            id,
            Some(format!("previous_status={}", previous)),
        );
        Logger::info(Event::ItemArchived, &event_fields(actor, kind, &item));
        Ok(ArchiveOutcome::Archived(self.view(item)))
    }

    /// Bring an archived item back (post_admin)
    pub fn restore(&self, kind: ItemKind, id: u64, actor: &Principal) -> CatalogResult<ItemView> {
        actor.require(Role::PostAdmin)?;

        let current = self.load_for_write(kind, id, actor)?;
        if current.is_active {
            return Err(CatalogError::not_found(format!(
                "{} {} is not archived",
                kind.label(),
                id
            )));
        }

        let mut item = current.clone();
        item.is_active = true;
        item.updated_at = self.clock.now();
        self.repo.update(kind, &current, &item)?;

        self.audit(actor, AuditAction::Restore, kind, id, None);
        Logger::info(Event::ItemRestored, &event_fields(actor, kind, &item));
        Ok(self.view(item))
    }

    /// Remove an item permanently (super_admin)
    ///
    /// The audit record is written before the row goes away.
    pub fn hard_delete(&self, kind: ItemKind, id: u64, actor: &Principal) -> CatalogResult<()> {
        actor.require(Role::SuperAdmin)?;

        let item = self.load_for_write(kind, id, actor)?;
        self.audit(
            actor,
            AuditAction::HardDelete,
            kind,
            id,
            Some(format!("code={}", item.code)),
        );
        self.repo.delete(kind, id)?;

        Logger::info(Event::ItemHardDeleted, &event_fields(actor, kind, &item));
        Ok(())
    }

    /// Copy an active item under a fresh identity (post_admin)
    ///
    /// Business fields are copied, `overrides` applied on top, and code and
    /// slug allocated anew unless the overrides name them. The copy is
    /// always active.
    pub fn duplicate(
        &self,
        kind: ItemKind,
        id: u64,
        actor: &Principal,
        mut overrides: ItemPatch,
    ) -> CatalogResult<ItemView> {
        actor.require(Role::PostAdmin)?;
        self.note_advisory_status(kind, actor, overrides.status.as_deref());

        let source = self.load_for_write(kind, id, actor)?;
        if !source.is_active {
            return Err(CatalogError::not_found(format!(
                "{} {} is archived and cannot be duplicated",
                kind.label(),
                id
            )));
        }

        let explicit_code = overrides.code.take().and_then(|c| non_blank(Some(c)));
        let explicit_slug = overrides
            .slug
            .take()
            .and_then(|s| non_blank(Some(s)))
            .map(|s| slugify(&s));

        let now = self.clock.now();
        let mut draft = MarketingItem {
            id: 0,
            code: String::new(),
            slug: String::new(),
            is_active: true,
            cta_override: None,
            cta_link: None,
            created_at: now,
            updated_at: now,
            ..source
        };
        self.apply_patch(&mut draft, overrides, actor)?;

        let item = self.insert_with_identity(kind, draft, explicit_code, explicit_slug)?;

        self.audit(
            actor,
            AuditAction::Duplicate,
            kind,
            item.id,
            Some(format!("source_id={}", id)),
        );
        Logger::info(Event::ItemDuplicated, &event_fields(actor, kind, &item));
        Ok(self.view(item))
    }
}

impl std::fmt::Debug for MarketingItemLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketingItemLifecycle")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
