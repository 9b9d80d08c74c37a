//! Ready-made domain values and a wired service bundle.

use crate::mocks::{RecordingNotifier, test_clock};
use crate::store::InMemoryStore;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use vibe_core::{
    CapacityPolicy, Clock, Event, EventDraft, EventId, EventService, GeoPoint, LocationInput,
    ReservationNotifier, ReservationService, Role, User, UserDraft, UserId, UserService,
};

/// Lowest cost bcrypt accepts; keeps hashing fast in tests.
pub const TEST_BCRYPT_COST: u32 = 4;

fn epoch() -> DateTime<Utc> {
    test_clock().now()
}

/// A business account, stored with a placeholder hash.
#[must_use]
pub fn business_user() -> User {
    user_with_role("Harbour Events", Role::Business)
}

/// A regular account named `name`, stored with a placeholder hash.
#[must_use]
pub fn regular_user(name: &str) -> User {
    user_with_role(name, Role::User)
}

fn user_with_role(name: &str, role: Role) -> User {
    let id = UserId::new();
    User {
        id,
        role,
        name: name.to_string(),
        email: format!("{}.{}@example.com", name.to_lowercase().replace(' ', "."), id.as_uuid().simple()),
        password_hash: "$2b$04$placeholderplaceholderplaceholderplaceholderpla".to_string(),
        profile_picture: None,
        location: Some(GeoPoint::new(-73.9857, 40.7484)),
        created_at: epoch(),
        updated_at: epoch(),
    }
}

/// An event one month after the test clock, with `capacity` spots all free.
#[must_use]
pub fn event_owned_by(business: &User, capacity: u32) -> Event {
    Event {
        id: EventId::new(),
        title: "Rooftop Jazz Night".to_string(),
        description: "Live quartet, city views and a late bar on the roof.".to_string(),
        date: epoch() + Duration::days(30),
        time: "20:00".to_string(),
        capacity,
        spots_left: capacity,
        business: business.id,
        image: String::new(),
        price: 15.0,
        created_at: epoch(),
        updated_at: epoch(),
    }
}

/// A valid event draft one month after the test clock.
#[must_use]
pub fn event_draft(capacity: u32) -> EventDraft {
    EventDraft {
        title: "Sunset Salsa Social".to_string(),
        description: "Beginner lesson followed by an open social dance.".to_string(),
        date: epoch() + Duration::days(30),
        time: "18:30".to_string(),
        capacity,
        image: None,
        price: 10.0,
    }
}

/// A valid registration draft.
#[must_use]
pub fn user_draft(name: &str, email: &str, role: Role) -> UserDraft {
    UserDraft {
        name: name.to_string(),
        email: email.to_string(),
        password: "hunter22".to_string(),
        role: Some(role),
        location: Some(LocationInput {
            coordinates: Some([-73.9857, 40.7484]),
        }),
        profile_picture: None,
    }
}

/// Every service wired against one [`InMemoryStore`].
#[derive(Clone)]
pub struct TestServices {
    /// Shared store
    pub store: InMemoryStore,
    /// Records confirmations
    pub notifier: RecordingNotifier,
    /// Reservation service
    pub reservations: ReservationService,
    /// Event service
    pub events: EventService,
    /// User service
    pub users: UserService,
}

impl TestServices {
    /// Wire with the default capacity policy and a recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::build(CapacityPolicy::default(), None)
    }

    /// Wire with a specific capacity policy.
    #[must_use]
    pub fn with_policy(policy: CapacityPolicy) -> Self {
        Self::build(policy, None)
    }

    /// Wire with a custom notifier; the recording notifier stays unused.
    #[must_use]
    pub fn with_notifier(notifier: Arc<dyn ReservationNotifier>) -> Self {
        Self::build(CapacityPolicy::default(), Some(notifier))
    }

    fn build(policy: CapacityPolicy, notifier: Option<Arc<dyn ReservationNotifier>>) -> Self {
        let store = InMemoryStore::new();
        let recorder = RecordingNotifier::new();
        let clock: Arc<dyn Clock> = Arc::new(test_clock());
        let shared = Arc::new(store.clone());
        let notifier = notifier.unwrap_or_else(|| Arc::new(recorder.clone()));

        Self {
            reservations: ReservationService::new(
                shared.clone(),
                shared.clone(),
                shared.clone(),
                notifier,
                Arc::clone(&clock),
            )
            .with_policy(policy),
            events: EventService::new(shared.clone(), Arc::clone(&clock)),
            users: UserService::new(shared, clock, TEST_BCRYPT_COST),
            store,
            notifier: recorder,
        }
    }

    /// Seed a business account and an event it owns with `capacity` spots.
    #[must_use]
    pub fn seed_event(&self, capacity: u32) -> (User, Event) {
        let business = business_user();
        let event = event_owned_by(&business, capacity);
        self.store.seed_user(business.clone());
        self.store.seed_event(event.clone());
        (business, event)
    }

    /// Seed a regular account.
    #[must_use]
    pub fn seed_user(&self, name: &str) -> User {
        let user = regular_user(name);
        self.store.seed_user(user.clone());
        user
    }
}

impl Default for TestServices {
    fn default() -> Self {
        Self::new()
    }
}
