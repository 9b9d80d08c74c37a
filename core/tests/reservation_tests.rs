//! Reservation service behaviour against the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use chrono::Duration;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use vibe_core::reservation::{DUPLICATE_MESSAGE, FULL_MESSAGE};
use vibe_core::{
    CapacityPolicy, Clock, ConfirmationEmail, EventId, EventRepository, ReservationNotifier,
    ReservationService, ReservationStatus, VibeError,
};
use vibe_testing::{FailingNotifier, FixedClock, RecordingNotifier, TestServices, test_clock};

const WAIT: StdDuration = StdDuration::from_secs(2);

async fn spots_left(services: &TestServices, event: EventId) -> u32 {
    services.store.get_event(event).await.unwrap().unwrap().spots_left
}

#[tokio::test]
async fn test_create_decrements_and_joins() {
    let services = TestServices::new();
    let (_business, event) = services.seed_event(10);
    let ada = services.seed_user("Ada");

    let details = services.reservations.create(event.id, ada.id, 3).await.unwrap();

    assert_eq!(details.no_reservations, 3);
    assert_eq!(details.status, ReservationStatus::Accepted);
    assert_eq!(details.event.id, event.id);
    assert_eq!(details.event.spots_left, 7);
    assert_eq!(details.user.id, ada.id);
    assert_eq!(details.created_at, test_clock().now());
    assert_eq!(spots_left(&services, event.id).await, 7);
}

#[tokio::test]
async fn test_confirmation_carries_reservation_details() {
    let services = TestServices::new();
    let (_business, event) = services.seed_event(10);
    let ada = services.seed_user("Ada");

    let details = services.reservations.create(event.id, ada.id, 2).await.unwrap();

    let sent = services.notifier.wait_for(1, WAIT).await;
    assert_eq!(sent.len(), 1);
    let email = &sent[0];
    assert_eq!(email.to, ada.email);
    assert_eq!(email.name, "Ada");
    assert_eq!(email.event_title, event.title);
    assert_eq!(email.event_time, event.time);
    assert_eq!(email.reservation_id, details.id);
    assert_eq!(email.tickets, 2);
    assert_eq!(
        email.subject(),
        "Your Reservation Confirmation for Rooftop Jazz Night"
    );
}

#[tokio::test]
async fn test_second_reservation_for_same_pair_conflicts() {
    let services = TestServices::new();
    let (_business, event) = services.seed_event(50);
    let ada = services.seed_user("Ada");

    services.reservations.create(event.id, ada.id, 1).await.unwrap();

    for tickets in [1, 2, 10] {
        let err = services
            .reservations
            .create(event.id, ada.id, tickets)
            .await
            .unwrap_err();
        assert_eq!(err, VibeError::conflict(DUPLICATE_MESSAGE));
    }
    assert_eq!(services.store.reservation_count(), 1);
    assert_eq!(spots_left(&services, event.id).await, 49);
}

#[tokio::test]
async fn test_exactly_exhausting_spots_is_rejected_by_default() {
    let services = TestServices::new();
    let (_business, event) = services.seed_event(10);
    let ada = services.seed_user("Ada");

    let err = services
        .reservations
        .create(event.id, ada.id, 10)
        .await
        .unwrap_err();
    assert_eq!(err, VibeError::conflict(FULL_MESSAGE));
    assert_eq!(spots_left(&services, event.id).await, 10);

    services.reservations.create(event.id, ada.id, 9).await.unwrap();
    assert_eq!(spots_left(&services, event.id).await, 1);
}

#[tokio::test]
async fn test_sell_out_scenario_with_exact_fill() {
    let services = TestServices::with_policy(CapacityPolicy::AllowExactFill);
    let (_business, event) = services.seed_event(10);
    let a = services.seed_user("Alice");
    let b = services.seed_user("Bob");
    let c = services.seed_user("Carol");

    services.reservations.create(event.id, a.id, 5).await.unwrap();
    assert_eq!(spots_left(&services, event.id).await, 5);

    let err = services.reservations.create(event.id, a.id, 5).await.unwrap_err();
    assert!(matches!(err, VibeError::Conflict(_)));

    let booked = services.reservations.create(event.id, b.id, 5).await.unwrap();
    assert_eq!(booked.event.spots_left, 0);

    let err = services.reservations.create(event.id, c.id, 1).await.unwrap_err();
    assert_eq!(err, VibeError::conflict(FULL_MESSAGE));
    assert_eq!(services.store.reservation_count(), 2);
}

#[tokio::test]
async fn test_sell_out_scenario_keeps_last_spot_by_default() {
    let services = TestServices::new();
    let (_business, event) = services.seed_event(10);
    let a = services.seed_user("Alice");
    let b = services.seed_user("Bob");

    services.reservations.create(event.id, a.id, 5).await.unwrap();
    let err = services.reservations.create(event.id, b.id, 5).await.unwrap_err();
    assert_eq!(err, VibeError::conflict(FULL_MESSAGE));
    assert_eq!(spots_left(&services, event.id).await, 5);
}

#[tokio::test]
async fn test_missing_event_and_zero_tickets() {
    let services = TestServices::new();
    let ada = services.seed_user("Ada");

    let err = services
        .reservations
        .create(EventId::new(), ada.id, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, VibeError::NotFound { resource: "Event", .. }));

    let (_business, event) = services.seed_event(10);
    let err = services.reservations.create(event.id, ada.id, 0).await.unwrap_err();
    assert!(matches!(err, VibeError::Validation(_)));
    assert_eq!(services.store.reservation_count(), 0);
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_booking() {
    let failing = FailingNotifier::new();
    let services = TestServices::with_notifier(Arc::new(failing.clone()));
    let (_business, event) = services.seed_event(10);
    let ada = services.seed_user("Ada");

    let details = services.reservations.create(event.id, ada.id, 2).await.unwrap();
    assert_eq!(details.event.spots_left, 8);

    assert_eq!(failing.wait_for(1, WAIT).await, 1);
    assert_eq!(services.store.reservation_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_six_and_six_against_ten() {
    for policy in [CapacityPolicy::KeepLastSpot, CapacityPolicy::AllowExactFill] {
        let services = TestServices::with_policy(policy);
        let (_business, event) = services.seed_event(10);
        let a = services.seed_user("Alice");
        let b = services.seed_user("Bob");

        let (event_id, a_id, b_id) = (event.id, a.id, b.id);
        let first = services.reservations.clone();
        let second = services.reservations.clone();
        let (ra, rb) = tokio::join!(
            tokio::spawn(async move { first.create(event_id, a_id, 6).await }),
            tokio::spawn(async move { second.create(event_id, b_id, 6).await }),
        );
        let outcomes = [ra.unwrap(), rb.unwrap()];

        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "policy {policy:?}");
        assert!(
            outcomes
                .iter()
                .any(|r| matches!(r, Err(VibeError::Conflict(_))))
        );
        assert_eq!(spots_left(&services, event_id).await, 4);
        assert_eq!(services.store.reservation_count(), 1);
    }
}

#[tokio::test]
async fn test_exists_reports_joined_reservation() {
    let services = TestServices::new();
    let (_business, event) = services.seed_event(10);
    let ada = services.seed_user("Ada");

    let check = services.reservations.exists(event.id, ada.id).await.unwrap();
    assert!(!check.has_reservation);
    assert!(check.reservation.is_none());

    let booked = services.reservations.create(event.id, ada.id, 1).await.unwrap();
    let check = services.reservations.exists(event.id, ada.id).await.unwrap();
    assert!(check.has_reservation);
    assert_eq!(check.reservation.unwrap().id, booked.id);
}

#[tokio::test]
async fn test_list_for_user_is_newest_first() {
    let services = TestServices::new();
    let ada = services.seed_user("Ada");
    let (_b1, older) = services.seed_event(10);
    let (_b2, newer) = services.seed_event(10);

    let at = |offset: i64| -> Arc<dyn Clock> {
        Arc::new(FixedClock::new(test_clock().now() + Duration::minutes(offset)))
    };
    let shared = Arc::new(services.store.clone());
    let service_at = |offset| {
        ReservationService::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            Arc::new(RecordingNotifier::new()),
            at(offset),
        )
    };

    let first = service_at(1).create(older.id, ada.id, 1).await.unwrap();
    let second = service_at(2).create(newer.id, ada.id, 2).await.unwrap();

    let listed = services.reservations.list_for_user(ada.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].reservation_id, second.id);
    assert_eq!(listed[0].event.id, newer.id);
    assert_eq!(listed[0].event.spots_left, 8);
    assert_eq!(listed[1].reservation_id, first.id);
    assert!(listed[0].reservation_date > listed[1].reservation_date);
}

#[tokio::test]
async fn test_list_for_business_groups_attendees_by_event() {
    let services = TestServices::new();
    let (business, event) = services.seed_event(20);
    let ada = services.seed_user("Ada");
    let bob = services.seed_user("Bob");
    let (_other_business, other_event) = services.seed_event(20);

    services.reservations.create(event.id, ada.id, 2).await.unwrap();
    services.reservations.create(event.id, bob.id, 3).await.unwrap();
    services.reservations.create(other_event.id, ada.id, 1).await.unwrap();

    let dashboard = services.reservations.list_for_business(business.id).await.unwrap();
    assert_eq!(dashboard.len(), 1);
    let row = &dashboard[0];
    assert_eq!(row.id, event.id);
    assert_eq!(row.title, event.title);
    assert_eq!(row.reservations.len(), 2);

    let mut names: Vec<_> = row.reservations.iter().map(|r| r.user.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["Ada", "Bob"]);
    let tickets: u32 = row.reservations.iter().map(|r| r.no_reservations).sum();
    assert_eq!(tickets, 5);
}

#[tokio::test]
async fn test_event_delete_cascades_to_reservations() {
    let services = TestServices::new();
    let (business, event) = services.seed_event(10);
    let ada = services.seed_user("Ada");
    let bob = services.seed_user("Bob");

    let first = services.reservations.create(event.id, ada.id, 1).await.unwrap();
    let second = services.reservations.create(event.id, bob.id, 1).await.unwrap();

    services.events.delete(&business, event.id).await.unwrap();

    for id in [first.id, second.id] {
        let err = services.reservations.get(id).await.unwrap_err();
        assert!(matches!(err, VibeError::NotFound { resource: "Reservation", .. }));
    }
    assert_eq!(services.store.reservation_count(), 0);
    assert!(services.reservations.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_reservation_does_not_restore_capacity() {
    let services = TestServices::new();
    let (_business, event) = services.seed_event(10);
    let ada = services.seed_user("Ada");

    let booked = services.reservations.create(event.id, ada.id, 4).await.unwrap();
    services.reservations.delete(&ada, booked.id).await.unwrap();

    assert_eq!(spots_left(&services, event.id).await, 6);
    let err = services.reservations.delete(&ada, booked.id).await.unwrap_err();
    assert!(matches!(err, VibeError::NotFound { .. }));
}

#[tokio::test]
async fn test_status_update_is_limited_to_holder_and_owner() {
    let services = TestServices::new();
    let (business, event) = services.seed_event(10);
    let ada = services.seed_user("Ada");
    let mallory = services.seed_user("Mallory");

    let booked = services.reservations.create(event.id, ada.id, 1).await.unwrap();

    let err = services
        .reservations
        .update_status(&mallory, booked.id, ReservationStatus::Declined)
        .await
        .unwrap_err();
    assert!(matches!(err, VibeError::Forbidden(_)));

    let updated = services
        .reservations
        .update_status(&business, booked.id, ReservationStatus::Declined)
        .await
        .unwrap();
    assert_eq!(updated.status, ReservationStatus::Declined);

    let fetched = services.reservations.get(booked.id).await.unwrap();
    assert_eq!(fetched.status, ReservationStatus::Declined);
    assert_eq!(fetched.no_reservations, 1);
}

#[tokio::test]
async fn test_storage_failure_surfaces_as_storage_error() {
    let services = TestServices::new();
    let (_business, event) = services.seed_event(10);
    let ada = services.seed_user("Ada");

    services.store.set_unavailable(true);
    let err = services.reservations.create(event.id, ada.id, 1).await.unwrap_err();
    assert!(matches!(err, VibeError::Storage(_)));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_booking_stamps_the_event() {
    let services = TestServices::new();
    let (_business, event) = services.seed_event(10);
    let ada = services.seed_user("Ada");
    let later = test_clock().now() + Duration::hours(3);

    let shared = Arc::new(services.store.clone());
    let service = ReservationService::new(
        shared.clone(),
        shared.clone(),
        shared,
        Arc::new(RecordingNotifier::new()),
        Arc::new(FixedClock::new(later)),
    );
    let booked = service.create(event.id, ada.id, 2).await.unwrap();

    assert_eq!(booked.event.updated_at, later);
    let stored = services.store.get_event(event.id).await.unwrap().unwrap();
    assert_eq!(stored.updated_at, later);
    assert_eq!(stored.spots_left, booked.event.spots_left);
}

#[tokio::test]
async fn test_drain_waits_for_pending_confirmations() {
    let services = TestServices::new();
    let (_business, event) = services.seed_event(10);
    let ada = services.seed_user("Ada");

    services.reservations.create(event.id, ada.id, 1).await.unwrap();
    assert_eq!(services.reservations.drain_notifications(WAIT).await, 0);
    assert_eq!(services.notifier.sent().len(), 1);
    assert_eq!(services.reservations.drain_notifications(WAIT).await, 0);
}

struct StalledNotifier;

impl ReservationNotifier for StalledNotifier {
    fn send_confirmation(
        &self,
        _email: ConfirmationEmail,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = vibe_core::Result<()>> + Send + '_>>
    {
        Box::pin(std::future::pending())
    }
}

#[tokio::test]
async fn test_drain_gives_up_on_stalled_confirmations() {
    let services = TestServices::with_notifier(Arc::new(StalledNotifier));
    let (_business, event) = services.seed_event(10);
    let ada = services.seed_user("Ada");
    let bob = services.seed_user("Bob");

    services.reservations.create(event.id, ada.id, 1).await.unwrap();
    services.reservations.create(event.id, bob.id, 1).await.unwrap();

    let abandoned = services
        .reservations
        .drain_notifications(StdDuration::from_millis(50))
        .await;
    assert_eq!(abandoned, 2);
    assert_eq!(services.store.reservation_count(), 2);
}
