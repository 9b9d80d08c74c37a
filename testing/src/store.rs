//! In-memory implementation of every repository trait.
//!
//! All three collections sit behind one mutex, so each trait method is a
//! single critical section. That makes [`ReservationRepository::book`] and
//! [`EventRepository::delete_event`] atomic with respect to each other, the
//! same guarantee the Postgres store gives through transactions.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Only panics on a poisoned lock

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use vibe_core::{
    BookingOutcome, CapacityPolicy, Event, EventChanges, EventId, EventRepository, EventUpdate,
    Reservation, ReservationId, ReservationRepository, ReservationStatus, StoreFuture, User,
    UserId, UserRepository, VibeError,
};

#[derive(Debug, Default)]
struct Collections {
    events: HashMap<EventId, Event>,
    reservations: HashMap<ReservationId, Reservation>,
    users: HashMap<UserId, User>,
}

/// HashMap-backed store for fast, deterministic tests.
///
/// # Example
///
/// ```
/// use vibe_testing::InMemoryStore;
/// use vibe_core::EventRepository;
///
/// # async fn example() -> vibe_core::Result<()> {
/// let store = InMemoryStore::new();
/// assert!(store.list_events().await?.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Collections>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `Storage` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored reservations.
    #[must_use]
    pub fn reservation_count(&self) -> usize {
        self.inner.lock().unwrap().reservations.len()
    }

    /// Number of stored events.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.inner.lock().unwrap().events.len()
    }

    /// Seed an event directly, bypassing validation.
    pub fn seed_event(&self, event: Event) {
        self.inner.lock().unwrap().events.insert(event.id, event);
    }

    /// Seed a user directly, bypassing validation and hashing.
    pub fn seed_user(&self, user: User) {
        self.inner.lock().unwrap().users.insert(user.id, user);
    }

    fn with<T>(&self, f: impl FnOnce(&mut Collections) -> vibe_core::Result<T>) -> vibe_core::Result<T> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(VibeError::Storage("in-memory store marked unavailable".to_string()));
        }
        let mut guard = self.inner.lock().unwrap();
        f(&mut guard)
    }

    fn ready<T: Send + 'static>(result: vibe_core::Result<T>) -> StoreFuture<'static, T> {
        Box::pin(std::future::ready(result))
    }
}

fn by_date(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
    events
}

fn oldest_first(mut reservations: Vec<Reservation>) -> Vec<Reservation> {
    reservations.sort_by_key(|r| r.created_at);
    reservations
}

impl EventRepository for InMemoryStore {
    fn insert_event(&self, event: Event) -> StoreFuture<'_, Event> {
        Self::ready(self.with(|c| {
            c.events.insert(event.id, event.clone());
            Ok(event)
        }))
    }

    fn get_event(&self, id: EventId) -> StoreFuture<'_, Option<Event>> {
        Self::ready(self.with(|c| Ok(c.events.get(&id).cloned())))
    }

    fn list_events(&self) -> StoreFuture<'_, Vec<Event>> {
        Self::ready(self.with(|c| Ok(by_date(c.events.values().cloned().collect()))))
    }

    fn list_events_by_business(&self, business: UserId) -> StoreFuture<'_, Vec<Event>> {
        Self::ready(self.with(|c| {
            Ok(by_date(
                c.events
                    .values()
                    .filter(|e| e.business == business)
                    .cloned()
                    .collect(),
            ))
        }))
    }

    fn update_event(
        &self,
        id: EventId,
        changes: EventChanges,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, EventUpdate> {
        Self::ready(self.with(|c| {
            let Some(event) = c.events.get_mut(&id) else {
                return Ok(EventUpdate::Missing);
            };
            let claimed = event.claimed();
            if changes.capacity.is_some_and(|capacity| capacity < claimed) {
                return Ok(EventUpdate::BelowClaimed { claimed });
            }
            changes.apply(event, now);
            Ok(EventUpdate::Updated(event.clone()))
        }))
    }

    fn delete_event(&self, id: EventId) -> StoreFuture<'_, bool> {
        Self::ready(self.with(|c| {
            if c.events.remove(&id).is_none() {
                return Ok(false);
            }
            c.reservations.retain(|_, r| r.event != id);
            Ok(true)
        }))
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Self::ready(self.with(|_| Ok(())))
    }
}

impl ReservationRepository for InMemoryStore {
    fn book(
        &self,
        reservation: Reservation,
        policy: CapacityPolicy,
    ) -> StoreFuture<'_, BookingOutcome> {
        Self::ready(self.with(|c| {
            let Some(event) = c.events.get_mut(&reservation.event) else {
                return Ok(BookingOutcome::EventMissing);
            };
            // Capacity before uniqueness, the order the SQL store applies them.
            if !policy.admits(event.spots_left, reservation.no_reservations) {
                return Ok(BookingOutcome::InsufficientSpots {
                    spots_left: event.spots_left,
                });
            }
            let duplicate = c
                .reservations
                .values()
                .any(|r| r.event == reservation.event && r.user == reservation.user);
            if duplicate {
                return Ok(BookingOutcome::Duplicate);
            }
            event.spots_left -= reservation.no_reservations;
            event.updated_at = reservation.created_at;
            let spots_left = event.spots_left;
            c.reservations.insert(reservation.id, reservation);
            Ok(BookingOutcome::Booked { spots_left })
        }))
    }

    fn find_reservation(
        &self,
        event: EventId,
        user: UserId,
    ) -> StoreFuture<'_, Option<Reservation>> {
        Self::ready(self.with(|c| {
            Ok(c.reservations
                .values()
                .find(|r| r.event == event && r.user == user)
                .cloned())
        }))
    }

    fn get_reservation(&self, id: ReservationId) -> StoreFuture<'_, Option<Reservation>> {
        Self::ready(self.with(|c| Ok(c.reservations.get(&id).cloned())))
    }

    fn list_reservations_for_user(&self, user: UserId) -> StoreFuture<'_, Vec<Reservation>> {
        Self::ready(self.with(|c| {
            let mut mine = oldest_first(
                c.reservations
                    .values()
                    .filter(|r| r.user == user)
                    .cloned()
                    .collect(),
            );
            mine.reverse();
            Ok(mine)
        }))
    }

    fn list_reservations_for_event(&self, event: EventId) -> StoreFuture<'_, Vec<Reservation>> {
        Self::ready(self.with(|c| {
            Ok(oldest_first(
                c.reservations
                    .values()
                    .filter(|r| r.event == event)
                    .cloned()
                    .collect(),
            ))
        }))
    }

    fn list_reservations(&self) -> StoreFuture<'_, Vec<Reservation>> {
        Self::ready(self.with(|c| Ok(oldest_first(c.reservations.values().cloned().collect()))))
    }

    fn update_reservation_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, Option<Reservation>> {
        Self::ready(self.with(|c| {
            Ok(c.reservations.get_mut(&id).map(|r| {
                r.status = status;
                r.updated_at = now;
                r.clone()
            }))
        }))
    }

    fn delete_reservation(&self, id: ReservationId) -> StoreFuture<'_, bool> {
        Self::ready(self.with(|c| Ok(c.reservations.remove(&id).is_some())))
    }
}

impl UserRepository for InMemoryStore {
    fn insert_user(&self, user: User) -> StoreFuture<'_, User> {
        Self::ready(self.with(|c| {
            if c.users.values().any(|u| u.email == user.email) {
                return Err(VibeError::conflict("This email already exists"));
            }
            c.users.insert(user.id, user.clone());
            Ok(user)
        }))
    }

    fn get_user(&self, id: UserId) -> StoreFuture<'_, Option<User>> {
        Self::ready(self.with(|c| Ok(c.users.get(&id).cloned())))
    }

    fn find_user_by_email(&self, email: String) -> StoreFuture<'_, Option<User>> {
        Self::ready(self.with(|c| Ok(c.users.values().find(|u| u.email == email).cloned())))
    }

    fn update_user(&self, user: User) -> StoreFuture<'_, Option<User>> {
        Self::ready(self.with(|c| {
            if c
                .users
                .values()
                .any(|u| u.id != user.id && u.email == user.email)
            {
                return Err(VibeError::conflict("This email already exists"));
            }
            let Some(stored) = c.users.get_mut(&user.id) else {
                return Ok(None);
            };
            *stored = user.clone();
            Ok(Some(user))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{business_user, event_owned_by, regular_user};

    #[tokio::test]
    async fn test_book_decrements_in_one_step() {
        let store = InMemoryStore::new();
        let business = business_user();
        let event = event_owned_by(&business, 10);
        store.seed_event(event.clone());
        let user = regular_user("Ada");

        let reservation = Reservation {
            id: ReservationId::new(),
            event: event.id,
            user: user.id,
            no_reservations: 3,
            status: ReservationStatus::Accepted,
            created_at: event.created_at,
            updated_at: event.created_at,
        };
        let outcome = store
            .book(reservation.clone(), CapacityPolicy::KeepLastSpot)
            .await
            .unwrap();
        assert_eq!(outcome, BookingOutcome::Booked { spots_left: 7 });

        let again = store
            .book(
                Reservation {
                    id: ReservationId::new(),
                    ..reservation
                },
                CapacityPolicy::KeepLastSpot,
            )
            .await
            .unwrap();
        assert_eq!(again, BookingOutcome::Duplicate);
        assert_eq!(store.reservation_count(), 1);
    }

    #[tokio::test]
    async fn test_full_event_wins_over_duplicate() {
        let store = InMemoryStore::new();
        let event = event_owned_by(&business_user(), 5);
        store.seed_event(event.clone());
        let user = regular_user("Ada");
        let stamp = event.created_at + chrono::Duration::hours(1);

        let first = Reservation {
            id: ReservationId::new(),
            event: event.id,
            user: user.id,
            no_reservations: 3,
            status: ReservationStatus::Accepted,
            created_at: stamp,
            updated_at: stamp,
        };
        let booked = store.book(first.clone(), CapacityPolicy::KeepLastSpot).await.unwrap();
        assert_eq!(booked, BookingOutcome::Booked { spots_left: 2 });
        let stored = store.get_event(event.id).await.unwrap().unwrap();
        assert_eq!(stored.updated_at, stamp);

        let repeat = Reservation {
            id: ReservationId::new(),
            no_reservations: 2,
            ..first
        };
        let outcome = store.book(repeat, CapacityPolicy::KeepLastSpot).await.unwrap();
        assert_eq!(outcome, BookingOutcome::InsufficientSpots { spots_left: 2 });
        assert_eq!(store.reservation_count(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(store.ping().await, Err(VibeError::Storage(_))));
        store.set_unavailable(false);
        assert!(store.ping().await.is_ok());
    }
}
