//! Status Derivation Tests
//!
//! Status is derived on every read from the clock, never stored:
//! - Deactivation dominates the date window
//! - `infinite` ignores the window
//! - Items move scheduled -> active -> expired as the clock advances

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use giyo::auth::{Principal, Role};
use giyo::catalog::{
    CreateItem, FixedClock, InMemoryItemRepository, ItemKind, LifecycleConfig, ListQuery,
    MarketingItemLifecycle, Status,
};
use giyo::observability::{AuditRecorder, MemoryAuditLog};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 15).unwrap()
}

fn setup() -> (MarketingItemLifecycle, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::on(start()));
    let lifecycle = MarketingItemLifecycle::new(
        Arc::new(InMemoryItemRepository::new()),
        AuditRecorder::new(Arc::new(MemoryAuditLog::new())),
        clock.clone(),
        LifecycleConfig::default(),
    );
    (lifecycle, clock)
}

fn owner() -> Principal {
    Principal::new("Owner", Role::SuperAdmin)
}

fn windowed(title: &str, from: &str, to: &str) -> CreateItem {
    CreateItem {
        start_date: Some(from.to_string()),
        expiry_date: Some(to.to_string()),
        ..CreateItem::new(title, "skin")
    }
}

/// Status follows the clock without any write.
#[test]
fn test_status_advances_with_clock() {
    let (lifecycle, clock) = setup();
    let id = lifecycle
        .create(ItemKind::Brochure, &owner(), windowed("June", "2025-06-01", "2025-06-30"))
        .unwrap()
        .item
        .id;

    let status = || lifecycle.get(ItemKind::Brochure, id, None).unwrap().status;
    assert_eq!(status(), Status::Scheduled);

    clock.advance(Duration::days(17));
    assert_eq!(status(), Status::Active);

    // Both window bounds are inclusive
    clock.advance(Duration::days(29));
    assert_eq!(lifecycle.today(), NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    assert_eq!(status(), Status::Active);

    clock.advance(Duration::days(1));
    assert_eq!(status(), Status::Expired);
}

/// `infinite` keeps an item active outside its window.
#[test]
fn test_infinite_ignores_window() {
    let (lifecycle, _clock) = setup();
    let view = lifecycle
        .create(
            ItemKind::Service,
            &owner(),
            CreateItem {
                infinite: Some(true),
                ..windowed("Always", "2024-01-01", "2024-01-31")
            },
        )
        .unwrap();

    assert_eq!(view.status, Status::Active);
}

/// Archiving wins over everything, including `infinite`.
#[test]
fn test_archive_dominates() {
    let (lifecycle, _clock) = setup();
    let id = lifecycle
        .create(
            ItemKind::Service,
            &owner(),
            CreateItem {
                infinite: Some(true),
                ..CreateItem::new("Forever", "skin")
            },
        )
        .unwrap()
        .item
        .id;

    let outcome = lifecycle.archive(ItemKind::Service, id, &owner()).unwrap();
    assert_eq!(outcome.view().status, Status::Archived);
}

/// A client-supplied status is advisory and never stored.
#[test]
fn test_advisory_status_is_ignored() {
    let (lifecycle, _clock) = setup();
    let view = lifecycle
        .create(
            ItemKind::Brochure,
            &owner(),
            CreateItem {
                status: Some("archived".to_string()),
                ..windowed("Later", "2025-07-01", "2025-07-31")
            },
        )
        .unwrap();

    assert_eq!(view.status, Status::Scheduled);
    assert!(view.item.is_active);
}

/// The status filter on list uses the derived status.
#[test]
fn test_list_filters_on_derived_status() {
    let (lifecycle, clock) = setup();
    lifecycle
        .create(ItemKind::Brochure, &owner(), windowed("May", "2025-05-01", "2025-05-31"))
        .unwrap();
    lifecycle
        .create(ItemKind::Brochure, &owner(), windowed("June", "2025-06-01", "2025-06-30"))
        .unwrap();

    let by_status = |status| {
        let query = ListQuery {
            status: Some(status),
            ..Default::default()
        };
        lifecycle
            .list(ItemKind::Brochure, &query, None)
            .unwrap()
            .into_iter()
            .map(|v| v.item.title)
            .collect::<Vec<_>>()
    };

    assert_eq!(by_status(Status::Active), vec!["May"]);
    assert_eq!(by_status(Status::Scheduled), vec!["June"]);

    clock.advance(Duration::days(20));
    assert_eq!(by_status(Status::Expired), vec!["May"]);
    assert_eq!(by_status(Status::Active), vec!["June"]);
}
