//! # Item Repository
//!
//! Storage boundary for catalog items. Implementations must enforce code and
//! slug uniqueness per kind and report violations as
//! [`RepositoryError::Conflict`]; the lifecycle relies on that constraint to
//! settle allocation races.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use super::errors::{RepositoryError, RepositoryResult, UniqueField};
use super::item::{ItemKind, MarketingItem};

/// Which branches a listing should include
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchFilter {
    #[default]
    Any,
    /// Exactly this scoping key (None = global items only)
    Exactly(Option<u64>),
    /// This branch plus global items
    VisibleTo(u64),
}

impl BranchFilter {
    pub fn matches(&self, branch_id: Option<u64>) -> bool {
        match self {
            BranchFilter::Any => true,
            BranchFilter::Exactly(b) => *b == branch_id,
            BranchFilter::VisibleTo(b) => branch_id.is_none() || branch_id == Some(*b),
        }
    }
}

/// Storage-level listing filter
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    /// None = both active and archived
    pub is_active: Option<bool>,
    pub branch: BranchFilter,
}

impl ItemFilter {
    /// Every stored item of a kind
    pub fn all() -> Self {
        Self::default()
    }

    pub fn active_only() -> Self {
        Self {
            is_active: Some(true),
            ..Self::default()
        }
    }

    pub fn matches(&self, item: &MarketingItem) -> bool {
        self.is_active.map_or(true, |a| item.is_active == a) && self.branch.matches(item.branch_id)
    }
}

/// Item storage trait
pub trait ItemRepository: Send + Sync {
    fn get(&self, kind: ItemKind, id: u64) -> RepositoryResult<Option<MarketingItem>>;

    /// Matching items in ascending id order
    fn list(&self, kind: ItemKind, filter: &ItemFilter) -> RepositoryResult<Vec<MarketingItem>>;

    /// Persist a new item under a fresh id; the incoming `id` is ignored
    fn insert(&self, kind: ItemKind, item: MarketingItem) -> RepositoryResult<MarketingItem>;

    /// Replace the stored row with `item`, but only while it still equals
    /// `current`; a row changed since it was read is `Stale`
    fn update(&self, kind: ItemKind, current: &MarketingItem, item: &MarketingItem) -> RepositoryResult<()>;

    /// Remove the row entirely
    fn delete(&self, kind: ItemKind, id: u64) -> RepositoryResult<()>;
}

/// Rows of one kind plus its id sequence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Table {
    pub(crate) next_id: u64,
    pub(crate) rows: BTreeMap<u64, MarketingItem>,
}

impl Table {
    fn check_unique(&self, item: &MarketingItem, exclude: Option<u64>) -> RepositoryResult<()> {
        for row in self.rows.values() {
            if Some(row.id) == exclude {
                continue;
            }
            if row.code == item.code {
                return Err(RepositoryError::Conflict {
                    field: UniqueField::Code,
                    value: item.code.clone(),
                });
            }
            if row.slug == item.slug {
                return Err(RepositoryError::Conflict {
                    field: UniqueField::Slug,
                    value: item.slug.clone(),
                });
            }
        }
        Ok(())
    }
}

pub(crate) type Tables = HashMap<ItemKind, Table>;

/// In-memory item repository
///
/// Uniqueness checks and writes happen under one write lock, so concurrent
/// inserts racing on the same code cannot both land.
#[derive(Debug, Default)]
pub struct InMemoryItemRepository {
    tables: RwLock<Tables>,
}

fn poisoned() -> RepositoryError {
    RepositoryError::Backend("Lock poisoned".to_string())
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_tables(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    pub(crate) fn tables(&self) -> RepositoryResult<Tables> {
        Ok(self.tables.read().map_err(|_| poisoned())?.clone())
    }

    pub(crate) fn replace_tables(&self, tables: Tables) -> RepositoryResult<()> {
        *self.tables.write().map_err(|_| poisoned())? = tables;
        Ok(())
    }

    pub fn count(&self, kind: ItemKind) -> usize {
        self.tables
            .read()
            .map(|t| t.get(&kind).map_or(0, |table| table.rows.len()))
            .unwrap_or(0)
    }
}

impl ItemRepository for InMemoryItemRepository {
    fn get(&self, kind: ItemKind, id: u64) -> RepositoryResult<Option<MarketingItem>> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables.get(&kind).and_then(|t| t.rows.get(&id)).cloned())
    }

    fn list(&self, kind: ItemKind, filter: &ItemFilter) -> RepositoryResult<Vec<MarketingItem>> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables
            .get(&kind)
            .map(|t| t.rows.values().filter(|i| filter.matches(i)).cloned().collect())
            .unwrap_or_default())
    }

    fn insert(&self, kind: ItemKind, mut item: MarketingItem) -> RepositoryResult<MarketingItem> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let table = tables.entry(kind).or_default();

        table.check_unique(&item, None)?;

        table.next_id += 1;
        item.id = table.next_id;
        item.kind = kind;
        table.rows.insert(item.id, item.clone());
        Ok(item)
    }

    fn update(&self, kind: ItemKind, current: &MarketingItem, item: &MarketingItem) -> RepositoryResult<()> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let table = tables
            .get_mut(&kind)
            .ok_or(RepositoryError::NotFound(item.id))?;

        match table.rows.get(&item.id) {
            None => return Err(RepositoryError::NotFound(item.id)),
            Some(stored) if stored != current => return Err(RepositoryError::Stale(item.id)),
            Some(_) => {}
        }
        table.check_unique(item, Some(item.id))?;
        table.rows.insert(item.id, item.clone());
        Ok(())
    }

    fn delete(&self, kind: ItemKind, id: u64) -> RepositoryResult<()> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        tables
            .get_mut(&kind)
            .and_then(|t| t.rows.remove(&id))
            .map(|_| ())
            .ok_or(RepositoryError::NotFound(id))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;

    pub(crate) fn sample(code: &str, slug: &str) -> MarketingItem {
        let now = Utc::now();
        MarketingItem {
            id: 0,
            kind: ItemKind::Brochure,
            branch_id: Some(1),
            title: "Offer".to_string(),
            description: None,
            category: "skin".to_string(),
            code: code.to_string(),
            slug: slug.to_string(),
            price: Some(10.0),
            image_url: None,
            start_date: None,
            expiry_date: None,
            infinite: false,
            is_active: true,
            tags: vec![],
            contact_phone: None,
            cta_override: None,
            cta_link: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_insert_assigns_monotonic_ids() {
        let repo = InMemoryItemRepository::new();
        let a = repo.insert(ItemKind::Brochure, sample("A-001", "a")).unwrap();
        let b = repo.insert(ItemKind::Brochure, sample("A-002", "b")).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);

        repo.delete(ItemKind::Brochure, b.id).unwrap();
        let c = repo.insert(ItemKind::Brochure, sample("A-003", "c")).unwrap();
        assert_eq!(c.id, 3);
    }

    #[test]
    fn test_uniqueness_is_per_kind() {
        let repo = InMemoryItemRepository::new();
        repo.insert(ItemKind::Brochure, sample("A-001", "a")).unwrap();

        let dup = repo.insert(ItemKind::Brochure, sample("A-001", "other"));
        assert_eq!(
            dup.unwrap_err(),
            RepositoryError::Conflict {
                field: UniqueField::Code,
                value: "A-001".to_string()
            }
        );

        let dup = repo.insert(ItemKind::Brochure, sample("A-009", "a"));
        assert!(matches!(
            dup,
            Err(RepositoryError::Conflict { field: UniqueField::Slug, .. })
        ));

        let service = repo.insert(ItemKind::Service, sample("A-001", "a")).unwrap();
        assert_eq!(service.kind, ItemKind::Service);
    }

    #[test]
    fn test_update_checks_uniqueness_against_others() {
        let repo = InMemoryItemRepository::new();
        let a = repo.insert(ItemKind::Brochure, sample("A-001", "a")).unwrap();
        repo.insert(ItemKind::Brochure, sample("A-002", "b")).unwrap();

        let mut same = a.clone();
        same.title = "Renamed".to_string();
        repo.update(ItemKind::Brochure, &a, &same).unwrap();

        let mut clash = same.clone();
        clash.code = "A-002".to_string();
        assert!(matches!(
            repo.update(ItemKind::Brochure, &same, &clash),
            Err(RepositoryError::Conflict { field: UniqueField::Code, .. })
        ));
    }

    #[test]
    fn test_missing_rows() {
        let repo = InMemoryItemRepository::new();
        assert_eq!(repo.get(ItemKind::Service, 1).unwrap(), None);
        assert_eq!(repo.delete(ItemKind::Service, 1), Err(RepositoryError::NotFound(1)));

        let mut ghost = sample("A-001", "a");
        ghost.id = 42;
        assert_eq!(
            repo.update(ItemKind::Service, &ghost, &ghost),
            Err(RepositoryError::NotFound(42))
        );
    }

    #[test]
    fn test_update_rejects_row_changed_since_read() {
        let repo = InMemoryItemRepository::new();
        let read = repo.insert(ItemKind::Brochure, sample("A-001", "a")).unwrap();

        let mut archived = read.clone();
        archived.is_active = false;
        repo.update(ItemKind::Brochure, &read, &archived).unwrap();

        let mut renamed = read.clone();
        renamed.title = "Renamed".to_string();
        assert_eq!(
            repo.update(ItemKind::Brochure, &read, &renamed),
            Err(RepositoryError::Stale(read.id))
        );

        let stored = repo.get(ItemKind::Brochure, read.id).unwrap().unwrap();
        assert!(!stored.is_active);
        assert_eq!(stored.title, "Offer");
    }

    #[test]
    fn test_list_filters() {
        let repo = InMemoryItemRepository::new();
        let mut archived = sample("A-001", "a");
        archived.is_active = false;
        repo.insert(ItemKind::Brochure, archived).unwrap();

        let mut global = sample("A-002", "b");
        global.branch_id = None;
        repo.insert(ItemKind::Brochure, global).unwrap();

        let mut other = sample("A-003", "c");
        other.branch_id = Some(2);
        repo.insert(ItemKind::Brochure, other).unwrap();

        assert_eq!(repo.list(ItemKind::Brochure, &ItemFilter::all()).unwrap().len(), 3);
        assert_eq!(repo.list(ItemKind::Brochure, &ItemFilter::active_only()).unwrap().len(), 2);

        let visible = ItemFilter {
            is_active: None,
            branch: BranchFilter::VisibleTo(1),
        };
        let codes: Vec<_> = repo
            .list(ItemKind::Brochure, &visible)
            .unwrap()
            .into_iter()
            .map(|i| i.code)
            .collect();
        assert_eq!(codes, vec!["A-001", "A-002"]);
    }
}
