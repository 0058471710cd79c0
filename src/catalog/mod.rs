//! # Catalog
//!
//! Brochures and services: the item model, derived status, code/slug
//! allocation, contact links, storage boundary and the lifecycle that ties
//! them together.

mod allocator;
mod clock;
mod cta;
mod errors;
mod item;
mod lifecycle;
mod repository;
mod snapshot;
mod status;
mod tags;

pub use allocator::{allocate_code, allocate_slug, code_prefix, slugify};
pub use clock::{Clock, FixedClock, SystemClock};
pub use cta::{build as build_cta_link, compose_message, link_for, BRAND_SUFFIX};
pub use errors::{CatalogError, CatalogResult, RepositoryError, RepositoryResult, UniqueField};
pub use item::{parse_date, CreateItem, ItemKind, ItemPatch, ItemView, MarketingItem};
pub use lifecycle::{
    ArchiveOutcome, CodeTags, LifecycleConfig, ListQuery, MarketingItemLifecycle,
    MAX_ALLOCATION_ATTEMPTS,
};
pub use repository::{BranchFilter, InMemoryItemRepository, ItemFilter, ItemRepository};
pub use snapshot::FileItemRepository;
pub use status::{Status, StatusResolver};
pub use tags::{default_tags, normalize_tags};
