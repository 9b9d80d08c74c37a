//! Reservation service: capacity-gated booking and the joined read views.
//!
//! # Booking sequence
//!
//! 1. Reject a ticket count of zero.
//! 2. Load the event (`NotFound`) and the reserving user (`NotFound`).
//! 3. Gate on the event snapshot with the configured [`CapacityPolicy`].
//! 4. Reject a second reservation for the same (event, user) pair.
//! 5. [`ReservationRepository::book`]: insert and decrement as one store
//!    operation that re-checks both conditions, so concurrent requests can
//!    never overbook or double-book.
//! 6. Spawn the confirmation email. Its outcome is logged and counted only.
//!    Sends still in flight at shutdown are awaited by
//!    [`ReservationService::drain_notifications`].

use crate::environment::Clock;
use crate::error::{Result, VibeError};
use crate::metrics::{
    BOOKING_DURATION_SECONDS, NOTIFICATIONS_TOTAL, RESERVATIONS_TOTAL, TICKETS_RESERVED_TOTAL,
};
use crate::notification::{ConfirmationEmail, ReservationNotifier};
use crate::repository::{
    BookingOutcome, CapacityPolicy, EventRepository, ReservationRepository, UserRepository,
};
use crate::types::{
    Attendee, AttendeeReservation, BusinessEventReservations, Event, EventId, PublicUser,
    Reservation, ReservationCheck, ReservationDetails, ReservationId, ReservationStatus,
    ReservedEvent, User, UserId,
};
use crate::validation;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Message returned when the capacity gate rejects a request.
pub const FULL_MESSAGE: &str = "Event is full or not enough spots to accommodate request";
/// Message returned for a second reservation on the same event.
pub const DUPLICATE_MESSAGE: &str = "You already have a reservation for this event";

/// Reservation use cases.
#[derive(Clone)]
pub struct ReservationService {
    events: Arc<dyn EventRepository>,
    reservations: Arc<dyn ReservationRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn ReservationNotifier>,
    clock: Arc<dyn Clock>,
    policy: CapacityPolicy,
    pending: Arc<Mutex<JoinSet<()>>>,
}

impl ReservationService {
    /// Create a service with the default [`CapacityPolicy::KeepLastSpot`].
    #[must_use]
    pub fn new(
        events: Arc<dyn EventRepository>,
        reservations: Arc<dyn ReservationRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Arc<dyn ReservationNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            events,
            reservations,
            users,
            notifier,
            clock,
            policy: CapacityPolicy::default(),
            pending: Arc::default(),
        }
    }

    /// Use a different capacity policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: CapacityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The active capacity policy.
    #[must_use]
    pub const fn policy(&self) -> CapacityPolicy {
        self.policy
    }

    /// Reserve `tickets` spots of `event_id` for `user_id`.
    ///
    /// Returns the stored reservation joined with its event (post-decrement)
    /// and the reserving user.
    ///
    /// # Errors
    ///
    /// - `Validation` when `tickets` is zero
    /// - `NotFound` when the event or user does not exist
    /// - `Conflict` when the capacity gate fails or a reservation already exists
    /// - `Storage` when the store fails
    #[tracing::instrument(skip(self), fields(policy = ?self.policy))]
    pub async fn create(
        &self,
        event_id: EventId,
        user_id: UserId,
        tickets: u32,
    ) -> Result<ReservationDetails> {
        if let Err(err) = validation::ticket_count(tickets) {
            record_attempt("invalid");
            return Err(err);
        }

        let Some(mut event) = self.events.get_event(event_id).await? else {
            record_attempt("not_found");
            return Err(VibeError::not_found("Event", event_id));
        };
        let Some(user) = self.users.get_user(user_id).await? else {
            record_attempt("not_found");
            return Err(VibeError::not_found("User", user_id));
        };

        if !self.policy.admits(event.spots_left, tickets) {
            debug!(spots_left = event.spots_left, tickets, "capacity gate rejected request");
            record_attempt("full");
            return Err(VibeError::conflict(FULL_MESSAGE));
        }

        if self
            .reservations
            .find_reservation(event_id, user_id)
            .await?
            .is_some()
        {
            record_attempt("duplicate");
            return Err(VibeError::conflict(DUPLICATE_MESSAGE));
        }

        let now = self.clock.now();
        let reservation = Reservation {
            id: ReservationId::new(),
            event: event_id,
            user: user_id,
            no_reservations: tickets,
            status: ReservationStatus::default(),
            created_at: now,
            updated_at: now,
        };

        let started = Instant::now();
        let outcome = self.reservations.book(reservation.clone(), self.policy).await?;
        metrics::histogram!(BOOKING_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

        match outcome {
            BookingOutcome::Booked { spots_left } => {
                event.spots_left = spots_left;
                event.updated_at = now;
                record_attempt("booked");
                metrics::counter!(TICKETS_RESERVED_TOTAL).increment(u64::from(tickets));
                info!(
                    reservation_id = %reservation.id,
                    event_id = %event_id,
                    user_id = %user_id,
                    tickets,
                    spots_left,
                    "reservation created"
                );
            }
            BookingOutcome::InsufficientSpots { spots_left } => {
                debug!(spots_left, tickets, "lost capacity race at write time");
                record_attempt("full");
                return Err(VibeError::conflict(FULL_MESSAGE));
            }
            BookingOutcome::Duplicate => {
                record_attempt("duplicate");
                return Err(VibeError::conflict(DUPLICATE_MESSAGE));
            }
            BookingOutcome::EventMissing => {
                record_attempt("not_found");
                return Err(VibeError::not_found("Event", event_id));
            }
        }

        self.dispatch_confirmation(ConfirmationEmail::new(&user, &event, &reservation));

        Ok(join(reservation, event, &user))
    }

    /// Hand the confirmation to the notifier on a tracked task.
    fn dispatch_confirmation(&self, email: ConfirmationEmail) {
        let notifier = Arc::clone(&self.notifier);
        let mut pending = self.pending_sends();
        while pending.try_join_next().is_some() {}
        pending.spawn(async move {
            let reservation_id = email.reservation_id;
            match notifier.send_confirmation(email).await {
                Ok(()) => {
                    metrics::counter!(NOTIFICATIONS_TOTAL, "outcome" => "sent").increment(1);
                    debug!(%reservation_id, "confirmation email sent");
                }
                Err(err) => {
                    metrics::counter!(NOTIFICATIONS_TOTAL, "outcome" => "failed").increment(1);
                    warn!(%reservation_id, error = %err, "confirmation email failed");
                }
            }
        });
    }

    /// Wait up to `timeout` for confirmation emails still being sent.
    ///
    /// Sends still running after `timeout` are aborted, logged and counted;
    /// the return value is how many were abandoned.
    pub async fn drain_notifications(&self, timeout: Duration) -> usize {
        let mut pending = std::mem::take(&mut *self.pending_sends());
        if pending.is_empty() {
            return 0;
        }
        debug!(in_flight = pending.len(), "waiting for confirmation emails");

        let drained = tokio::time::timeout(timeout, async {
            while pending.join_next().await.is_some() {}
        })
        .await;
        if drained.is_ok() {
            return 0;
        }

        let abandoned = pending.len();
        pending.abort_all();
        metrics::counter!(NOTIFICATIONS_TOTAL, "outcome" => "abandoned")
            .increment(u64::try_from(abandoned).unwrap_or(u64::MAX));
        warn!(abandoned, ?timeout, "confirmation emails still sending at shutdown were dropped");
        abandoned
    }

    fn pending_sends(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Whether `user_id` already holds a reservation for `event_id`.
    ///
    /// # Errors
    ///
    /// Returns `Storage` when the store fails.
    pub async fn exists(&self, event_id: EventId, user_id: UserId) -> Result<ReservationCheck> {
        let Some(reservation) = self.reservations.find_reservation(event_id, user_id).await? else {
            return Ok(ReservationCheck {
                has_reservation: false,
                reservation: None,
            });
        };
        let details = self.details(reservation).await?;
        Ok(ReservationCheck {
            has_reservation: true,
            reservation: Some(details),
        })
    }

    /// Events the user holds reservations for, newest reservation first.
    ///
    /// # Errors
    ///
    /// Returns `Storage` when the store fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ReservedEvent>> {
        let reservations = self.reservations.list_reservations_for_user(user_id).await?;
        let mut reserved = Vec::with_capacity(reservations.len());
        for reservation in reservations {
            let Some(event) = self.events.get_event(reservation.event).await? else {
                warn!(reservation_id = %reservation.id, "reservation references a missing event");
                continue;
            };
            reserved.push(ReservedEvent {
                event,
                reservation_id: reservation.id,
                reservation_date: reservation.created_at,
            });
        }
        Ok(reserved)
    }

    /// Every event owned by `business_id` with its reservations and attendees.
    ///
    /// # Errors
    ///
    /// Returns `Storage` when the store fails.
    pub async fn list_for_business(
        &self,
        business_id: UserId,
    ) -> Result<Vec<BusinessEventReservations>> {
        let events = self.events.list_events_by_business(business_id).await?;
        let mut dashboard = Vec::with_capacity(events.len());
        for event in events {
            let reservations = self.reservations.list_reservations_for_event(event.id).await?;
            let mut rows = Vec::with_capacity(reservations.len());
            for reservation in reservations {
                let Some(user) = self.users.get_user(reservation.user).await? else {
                    warn!(reservation_id = %reservation.id, "reservation references a missing user");
                    continue;
                };
                rows.push(AttendeeReservation {
                    id: reservation.id,
                    user: Attendee::from(&user),
                    no_reservations: reservation.no_reservations,
                });
            }
            dashboard.push(BusinessEventReservations {
                id: event.id,
                title: event.title,
                date: event.date,
                time: event.time,
                reservations: rows,
            });
        }
        Ok(dashboard)
    }

    /// A single reservation joined with its event and user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the reservation does not exist.
    pub async fn get(&self, id: ReservationId) -> Result<ReservationDetails> {
        let reservation = self
            .reservations
            .get_reservation(id)
            .await?
            .ok_or_else(|| VibeError::not_found("Reservation", id))?;
        self.details(reservation).await
    }

    /// Every reservation, joined.
    ///
    /// # Errors
    ///
    /// Returns `Storage` when the store fails.
    pub async fn list_all(&self) -> Result<Vec<ReservationDetails>> {
        let reservations = self.reservations.list_reservations().await?;
        let mut joined = Vec::with_capacity(reservations.len());
        for reservation in reservations {
            match self.details(reservation).await {
                Ok(details) => joined.push(details),
                Err(VibeError::NotFound { resource, id }) => {
                    warn!(resource, id = %id, "skipping reservation with a dangling reference");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(joined)
    }

    /// Change a reservation's status.
    ///
    /// Allowed for the reserving user and for the business owning the event.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the reservation does not exist
    /// - `Forbidden` when the caller is neither holder nor event owner
    pub async fn update_status(
        &self,
        caller: &User,
        id: ReservationId,
        status: ReservationStatus,
    ) -> Result<Reservation> {
        let reservation = self
            .reservations
            .get_reservation(id)
            .await?
            .ok_or_else(|| VibeError::not_found("Reservation", id))?;
        self.authorize(caller, &reservation).await?;

        let updated = self
            .reservations
            .update_reservation_status(id, status, self.clock.now())
            .await?
            .ok_or_else(|| VibeError::not_found("Reservation", id))?;
        info!(reservation_id = %id, %status, "reservation status updated");
        Ok(updated)
    }

    /// Delete a reservation. The event's `spots_left` is not restored.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the reservation does not exist
    /// - `Forbidden` when the caller is neither holder nor event owner
    pub async fn delete(&self, caller: &User, id: ReservationId) -> Result<()> {
        let reservation = self
            .reservations
            .get_reservation(id)
            .await?
            .ok_or_else(|| VibeError::not_found("Reservation", id))?;
        self.authorize(caller, &reservation).await?;

        if !self.reservations.delete_reservation(id).await? {
            return Err(VibeError::not_found("Reservation", id));
        }
        info!(reservation_id = %id, "reservation deleted");
        Ok(())
    }

    async fn authorize(&self, caller: &User, reservation: &Reservation) -> Result<()> {
        if reservation.user == caller.id {
            return Ok(());
        }
        let owns_event = self
            .events
            .get_event(reservation.event)
            .await?
            .is_some_and(|event| event.business == caller.id);
        if owns_event {
            Ok(())
        } else {
            Err(VibeError::Forbidden(
                "Only the reservation holder or the event owner can modify it".to_string(),
            ))
        }
    }

    async fn details(&self, reservation: Reservation) -> Result<ReservationDetails> {
        let event = self
            .events
            .get_event(reservation.event)
            .await?
            .ok_or_else(|| VibeError::not_found("Event", reservation.event))?;
        let user = self
            .users
            .get_user(reservation.user)
            .await?
            .ok_or_else(|| VibeError::not_found("User", reservation.user))?;
        Ok(join(reservation, event, &user))
    }
}

fn join(reservation: Reservation, event: Event, user: &User) -> ReservationDetails {
    ReservationDetails {
        id: reservation.id,
        event,
        user: PublicUser::from(user),
        no_reservations: reservation.no_reservations,
        status: reservation.status,
        created_at: reservation.created_at,
        updated_at: reservation.updated_at,
    }
}

fn record_attempt(outcome: &'static str) {
    metrics::counter!(RESERVATIONS_TOTAL, "outcome" => outcome).increment(1);
}
