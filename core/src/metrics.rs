//! Metric names and descriptions.
//!
//! The services record through the `metrics` facade; the binary installs the
//! Prometheus recorder and calls [`describe_metrics`] once at startup.

use metrics::{describe_counter, describe_histogram};

/// Reservation attempts, labelled by `outcome`.
pub const RESERVATIONS_TOTAL: &str = "vibe_reservations_total";
/// Tickets successfully reserved.
pub const TICKETS_RESERVED_TOTAL: &str = "vibe_tickets_reserved_total";
/// Confirmation deliveries, labelled by `outcome`.
pub const NOTIFICATIONS_TOTAL: &str = "vibe_notifications_total";
/// Event mutations, labelled by `action`.
pub const EVENTS_TOTAL: &str = "vibe_events_total";
/// Time spent in the atomic booking write.
pub const BOOKING_DURATION_SECONDS: &str = "vibe_booking_duration_seconds";

/// Register descriptions for every metric the services emit.
pub fn describe_metrics() {
    describe_counter!(
        RESERVATIONS_TOTAL,
        "Reservation attempts by outcome (booked, full, duplicate, not_found, invalid)"
    );
    describe_counter!(
        TICKETS_RESERVED_TOTAL,
        "Total number of tickets claimed by successful reservations"
    );
    describe_counter!(
        NOTIFICATIONS_TOTAL,
        "Confirmation emails by outcome (sent, failed, abandoned)"
    );
    describe_counter!(
        EVENTS_TOTAL,
        "Event mutations by action (created, updated, deleted)"
    );
    describe_histogram!(
        BOOKING_DURATION_SECONDS,
        "Time taken by the atomic reservation insert and capacity decrement"
    );
}
