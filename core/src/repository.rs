//! Storage abstractions for events, reservations and users.
//!
//! # Implementations
//!
//! - `PostgresStore` (in `vibe-postgres`): production storage
//! - `InMemoryStore` (in `vibe-testing`): fast, deterministic tests
//!
//! # Dyn Compatibility
//!
//! Every method returns a boxed future instead of using `async fn` so the
//! services can hold `Arc<dyn EventRepository>` and friends.
//!
//! # Atomicity
//!
//! Two operations must be indivisible in every implementation:
//!
//! - [`ReservationRepository::book`] inserts the reservation and decrements
//!   `spots_left` only if the capacity gate still holds at write time.
//! - [`EventRepository::delete_event`] removes the event together with all
//!   of its reservations.

use crate::error::Result;
use crate::types::{Event, EventId, Reservation, ReservationId, ReservationStatus, User, UserId};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by every repository method.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// How the capacity gate treats a request that would consume every
/// remaining spot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CapacityPolicy {
    /// Reject when `spots_left <= tickets`: the last spot is never sold.
    #[default]
    KeepLastSpot,
    /// Reject only when `spots_left < tickets`: an event can sell out.
    AllowExactFill,
}

impl CapacityPolicy {
    /// Whether `tickets` may be taken from an event with `spots_left` remaining.
    ///
    /// # Examples
    ///
    /// ```
    /// use vibe_core::CapacityPolicy;
    ///
    /// assert!(!CapacityPolicy::KeepLastSpot.admits(5, 5));
    /// assert!(CapacityPolicy::AllowExactFill.admits(5, 5));
    /// assert!(!CapacityPolicy::AllowExactFill.admits(0, 1));
    /// ```
    #[must_use]
    pub const fn admits(self, spots_left: u32, tickets: u32) -> bool {
        if spots_left == 0 {
            return false;
        }
        match self {
            Self::KeepLastSpot => spots_left > tickets,
            Self::AllowExactFill => spots_left >= tickets,
        }
    }
}

/// Outcome of [`ReservationRepository::book`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingOutcome {
    /// Reservation stored and capacity decremented.
    Booked {
        /// Remaining spots after the decrement
        spots_left: u32,
    },
    /// The capacity gate failed at write time; nothing was written.
    InsufficientSpots {
        /// Remaining spots observed by the failed attempt
        spots_left: u32,
    },
    /// The user already holds a reservation for the event; nothing was written.
    Duplicate,
    /// The event no longer exists; nothing was written.
    EventMissing,
}

/// Field changes applied by [`EventRepository::update_event`].
///
/// `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventChanges {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New date
    pub date: Option<DateTime<Utc>>,
    /// New time
    pub time: Option<String>,
    /// New capacity; `spots_left` shifts by the same delta
    pub capacity: Option<u32>,
    /// New image URI
    pub image: Option<String>,
    /// New price
    pub price: Option<f64>,
}

impl EventChanges {
    /// Apply the changes to an in-memory snapshot.
    ///
    /// The caller must already have checked that a new capacity is not below
    /// the claimed spots.
    pub fn apply(&self, event: &mut Event, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            event.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            event.description.clone_from(description);
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(time) = &self.time {
            event.time.clone_from(time);
        }
        if let Some(capacity) = self.capacity {
            let claimed = event.claimed();
            event.capacity = capacity;
            event.spots_left = capacity.saturating_sub(claimed);
        }
        if let Some(image) = &self.image {
            event.image.clone_from(image);
        }
        if let Some(price) = self.price {
            event.price = price;
        }
        event.updated_at = now;
    }
}

/// Outcome of [`EventRepository::update_event`].
#[derive(Clone, Debug, PartialEq)]
pub enum EventUpdate {
    /// Changes stored; the updated event.
    Updated(Event),
    /// The requested capacity is below the spots already claimed.
    BelowClaimed {
        /// Spots currently held by reservations
        claimed: u32,
    },
    /// No such event.
    Missing,
}

/// Event persistence.
pub trait EventRepository: Send + Sync {
    /// Store a new event.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the write fails.
    fn insert_event(&self, event: Event) -> StoreFuture<'_, Event>;

    /// Load an event by id.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the read fails.
    fn get_event(&self, id: EventId) -> StoreFuture<'_, Option<Event>>;

    /// All events, soonest date first.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the read fails.
    fn list_events(&self) -> StoreFuture<'_, Vec<Event>>;

    /// Events owned by `business`, soonest date first.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the read fails.
    fn list_events_by_business(&self, business: UserId) -> StoreFuture<'_, Vec<Event>>;

    /// Apply `changes` atomically, including the capacity/`spots_left` shift.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the write fails.
    fn update_event(
        &self,
        id: EventId,
        changes: EventChanges,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, EventUpdate>;

    /// Delete an event and all of its reservations in one unit.
    ///
    /// Returns `false` if the event did not exist.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the write fails; nothing is deleted in that case.
    fn delete_event(&self, id: EventId) -> StoreFuture<'_, bool>;

    /// Cheap connectivity check for readiness probes.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store is unreachable.
    fn ping(&self) -> StoreFuture<'_, ()>;
}

/// Reservation persistence.
pub trait ReservationRepository: Send + Sync {
    /// Insert `reservation` and decrement its event's `spots_left` by
    /// `reservation.no_reservations`, as one indivisible operation, provided
    /// `policy` admits the request against the current counter and the user
    /// holds no reservation for the event yet.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the write fails; nothing is written in that case.
    fn book(
        &self,
        reservation: Reservation,
        policy: CapacityPolicy,
    ) -> StoreFuture<'_, BookingOutcome>;

    /// The reservation `user` holds for `event`, if any.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the read fails.
    fn find_reservation(
        &self,
        event: EventId,
        user: UserId,
    ) -> StoreFuture<'_, Option<Reservation>>;

    /// Load a reservation by id.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the read fails.
    fn get_reservation(&self, id: ReservationId) -> StoreFuture<'_, Option<Reservation>>;

    /// Reservations held by `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the read fails.
    fn list_reservations_for_user(&self, user: UserId) -> StoreFuture<'_, Vec<Reservation>>;

    /// Reservations for `event`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the read fails.
    fn list_reservations_for_event(&self, event: EventId) -> StoreFuture<'_, Vec<Reservation>>;

    /// Every reservation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the read fails.
    fn list_reservations(&self) -> StoreFuture<'_, Vec<Reservation>>;

    /// Change a reservation's status.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the write fails.
    fn update_reservation_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, Option<Reservation>>;

    /// Delete a reservation. Capacity is left untouched.
    ///
    /// Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the write fails.
    fn delete_reservation(&self, id: ReservationId) -> StoreFuture<'_, bool>;
}

/// User persistence.
pub trait UserRepository: Send + Sync {
    /// Store a new user.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the email is taken, `Storage` if the write fails.
    fn insert_user(&self, user: User) -> StoreFuture<'_, User>;

    /// Load a user by id.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the read fails.
    fn get_user(&self, id: UserId) -> StoreFuture<'_, Option<User>>;

    /// Load a user by (already normalized) email.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the read fails.
    fn find_user_by_email(&self, email: String) -> StoreFuture<'_, Option<User>>;

    /// Replace a stored user. Returns `None` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the new email is taken, `Storage` if the write fails.
    fn update_user(&self, user: User) -> StoreFuture<'_, Option<User>>;
}
