//! Notifier wiring against the reservation service.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use lettre::message::Mailbox;
use std::time::Duration;
use vibe_core::ConfirmationEmail;
use vibe_notify::{MailTransport, MailerConfig, SmtpCredentials, notifier_from_config, render};
use vibe_testing::TestServices;

#[tokio::test]
async fn test_console_notifier_backs_reservation_flow() {
    let notifier = notifier_from_config(&MailerConfig::default()).unwrap();
    let services = TestServices::with_notifier(notifier);
    let (_business, event) = services.seed_event(10);
    let ada = services.seed_user("Ada");

    let details = services.reservations.create(event.id, ada.id, 2).await.unwrap();

    assert_eq!(details.event.spots_left, 8);
    let abandoned = services
        .reservations
        .drain_notifications(Duration::from_secs(5))
        .await;
    assert_eq!(abandoned, 0);
}

#[tokio::test]
async fn test_production_config_builds_smtp_notifier() {
    let config = MailerConfig::new(MailTransport::Production {
        host: "smtp.gmail.com".to_string(),
        port: 465,
        credentials: SmtpCredentials {
            username: "vibe@gmail.com".to_string(),
            password: "app-password".to_string(),
        },
    })
    .with_sender("Vibe Events", "events@vibe.com");

    assert!(notifier_from_config(&config).is_ok());
}

#[test]
fn test_rendered_message_for_seeded_booking() {
    let services = TestServices::new();
    let (_business, event) = services.seed_event(10);
    let ada = services.seed_user("Ada Lovelace");
    let reservation = vibe_core::Reservation {
        id: vibe_core::ReservationId::new(),
        event: event.id,
        user: ada.id,
        no_reservations: 4,
        status: vibe_core::ReservationStatus::Accepted,
        created_at: event.created_at,
        updated_at: event.created_at,
    };
    let email = ConfirmationEmail::new(&ada, &event, &reservation);
    let from: Mailbox = MailerConfig::default().sender().unwrap();

    let formatted = String::from_utf8(render::message(&email, &from).unwrap().formatted()).unwrap();

    assert!(formatted.contains(&ada.email));
    assert!(formatted.contains("Subject: Your Reservation Confirmation for Rooftop Jazz Night"));
    assert!(formatted.contains("Content-Disposition: inline"));
}
