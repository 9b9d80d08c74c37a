//! Event service ownership, validation and capacity edits.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::Duration;
use vibe_core::{Clock, EventPatch, EventRepository, VibeError};
use vibe_testing::fixtures::{business_user, event_draft, regular_user};
use vibe_testing::{TestServices, test_clock};

#[tokio::test]
async fn test_create_starts_with_every_spot_free() {
    let services = TestServices::new();
    let business = business_user();

    let event = services.events.create(&business, event_draft(40)).await.unwrap();

    assert_eq!(event.capacity, 40);
    assert_eq!(event.spots_left, 40);
    assert_eq!(event.business, business.id);
    assert_eq!(event.image, "");
    assert_eq!(services.events.get(event.id).await.unwrap(), event);
}

#[tokio::test]
async fn test_only_business_accounts_create_events() {
    let services = TestServices::new();
    let err = services
        .events
        .create(&regular_user("Ada"), event_draft(10))
        .await
        .unwrap_err();
    assert!(matches!(err, VibeError::Forbidden(_)));
}

#[tokio::test]
async fn test_create_rejects_schema_violations() {
    let services = TestServices::new();
    let business = business_user();

    let mut past = event_draft(10);
    past.date = test_clock().now() - Duration::days(1);
    let mut short_title = event_draft(10);
    short_title.title = "Gig".to_string();
    let mut negative_price = event_draft(10);
    negative_price.price = -1.0;

    for draft in [past, short_title, negative_price, event_draft(0), event_draft(501)] {
        let err = services.events.create(&business, draft).await.unwrap_err();
        assert!(matches!(err, VibeError::Validation(_)), "{err:?}");
    }
    assert_eq!(services.store.event_count(), 0);
}

#[tokio::test]
async fn test_list_is_soonest_first() {
    let services = TestServices::new();
    let business = business_user();

    let mut later = event_draft(10);
    later.date = test_clock().now() + Duration::days(60);
    let later = services.events.create(&business, later).await.unwrap();
    let sooner = services.events.create(&business, event_draft(10)).await.unwrap();

    let ids: Vec<_> = services.events.list().await.unwrap().into_iter().map(|e| e.id).collect();
    assert_eq!(ids, [sooner.id, later.id]);
}

#[tokio::test]
async fn test_update_requires_ownership() {
    let services = TestServices::new();
    let (_owner, event) = services.seed_event(10);
    let rival = business_user();

    let patch = EventPatch {
        price: Some(20.0),
        ..EventPatch::default()
    };
    let err = services.events.update(&rival, event.id, patch).await.unwrap_err();
    assert!(matches!(err, VibeError::Forbidden(_)));
}

#[tokio::test]
async fn test_capacity_edit_shifts_spots_left() {
    let services = TestServices::new();
    let (owner, event) = services.seed_event(10);
    let ada = services.seed_user("Ada");
    services.reservations.create(event.id, ada.id, 4).await.unwrap();

    let grown = services
        .events
        .update(
            &owner,
            event.id,
            EventPatch {
                capacity: Some(25),
                title: Some("  Rooftop Jazz: Encore  ".to_string()),
                ..EventPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(grown.capacity, 25);
    assert_eq!(grown.spots_left, 21);
    assert_eq!(grown.title, "Rooftop Jazz: Encore");

    let err = services
        .events
        .update(
            &owner,
            event.id,
            EventPatch {
                capacity: Some(3),
                ..EventPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, VibeError::Validation(_)));

    let exact = services
        .events
        .update(
            &owner,
            event.id,
            EventPatch {
                capacity: Some(4),
                ..EventPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(exact.spots_left, 0);
}

#[tokio::test]
async fn test_unchanged_past_date_is_not_revalidated() {
    let services = TestServices::new();
    let (owner, mut event) = services.seed_event(10);
    event.date = test_clock().now() - Duration::days(2);
    services.store.seed_event(event.clone());

    let updated = services
        .events
        .update(
            &owner,
            event.id,
            EventPatch {
                date: Some(event.date),
                price: Some(0.0),
                ..EventPatch::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.price.abs() < f64::EPSILON);

    let err = services
        .events
        .update(
            &owner,
            event.id,
            EventPatch {
                date: Some(test_clock().now() - Duration::days(1)),
                ..EventPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, VibeError::Validation(_)));
}

#[tokio::test]
async fn test_delete_requires_ownership_and_reports_missing() {
    let services = TestServices::new();
    let (owner, event) = services.seed_event(10);

    let err = services.events.delete(&business_user(), event.id).await.unwrap_err();
    assert!(matches!(err, VibeError::Forbidden(_)));

    services.events.delete(&owner, event.id).await.unwrap();
    assert!(services.store.get_event(event.id).await.unwrap().is_none());

    let err = services.events.delete(&owner, event.id).await.unwrap_err();
    assert!(matches!(err, VibeError::NotFound { .. }));
}
