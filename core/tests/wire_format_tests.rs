//! JSON shapes the web client reads.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::{Value, json};
use vibe_testing::TestServices;

#[tokio::test]
async fn test_booking_serializes_with_client_field_names() {
    let services = TestServices::new();
    let (_business, event) = services.seed_event(10);
    let ada = services.seed_user("Ada");

    let booked = services.reservations.create(event.id, ada.id, 2).await.unwrap();
    let body = serde_json::to_value(&booked).unwrap();

    assert_eq!(body["_id"], booked.id.to_string());
    assert_eq!(body["noReservations"], 2);
    assert_eq!(body["status"], "accepted");
    assert_eq!(body["event"]["_id"], event.id.to_string());
    assert_eq!(body["event"]["spotsLeft"], 8);
    assert_eq!(body["user"]["_id"], ada.id.to_string());
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password_hash").is_none());
    assert_eq!(body["user"]["location"]["type"], "Point");
    assert!(body.get("no_reservations").is_none());
}

#[tokio::test]
async fn test_check_and_listings_serialize_with_client_field_names() {
    let services = TestServices::new();
    let (business, event) = services.seed_event(10);
    let ada = services.seed_user("Ada");
    let bob = services.seed_user("Bob");
    let booked = services.reservations.create(event.id, ada.id, 3).await.unwrap();

    let held = serde_json::to_value(services.reservations.exists(event.id, ada.id).await.unwrap())
        .unwrap();
    assert_eq!(held["hasReservation"], true);
    assert_eq!(held["reservation"]["_id"], booked.id.to_string());

    let none = serde_json::to_value(services.reservations.exists(event.id, bob.id).await.unwrap())
        .unwrap();
    assert_eq!(none, json!({ "hasReservation": false }));

    let mine = serde_json::to_value(services.reservations.list_for_user(ada.id).await.unwrap())
        .unwrap();
    assert_eq!(mine[0]["_id"], event.id.to_string());
    assert_eq!(mine[0]["reservationId"], booked.id.to_string());
    assert!(mine[0]["reservationDate"].is_string());
    assert_eq!(mine[0]["spotsLeft"], 7);

    let dashboard: Value =
        serde_json::to_value(services.reservations.list_for_business(business.id).await.unwrap())
            .unwrap();
    let row = &dashboard[0]["reservations"][0];
    assert_eq!(row["_id"], booked.id.to_string());
    assert_eq!(row["noReservations"], 3);
    assert_eq!(row["user"]["name"], "Ada");
}
