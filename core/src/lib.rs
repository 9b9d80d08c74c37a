//! # Vibe Core
//!
//! Domain types, validation rules and services for the Vibe event
//! reservation platform.
//!
//! ## Layout
//!
//! - [`types`]: events, reservations, users and the joined views clients see
//! - [`repository`]: dyn-compatible storage traits and the atomic booking contract
//! - [`notification`]: the confirmation-email seam
//! - [`reservation`], [`events`], [`users`]: the use cases
//!
//! Services hold `Arc<dyn Trait>` collaborators so the same code runs against
//! Postgres in production and the in-memory store in tests.

pub mod environment;
pub mod error;
pub mod events;
pub mod metrics;
pub mod notification;
pub mod repository;
pub mod reservation;
pub mod types;
pub mod users;
pub mod validation;

pub use environment::{Clock, SystemClock};
pub use error::{Result, VibeError};
pub use events::{EventDraft, EventPatch, EventService};
pub use notification::{ConfirmationEmail, ReservationNotifier};
pub use repository::{
    BookingOutcome, CapacityPolicy, EventChanges, EventRepository, EventUpdate,
    ReservationRepository, StoreFuture, UserRepository,
};
pub use reservation::ReservationService;
pub use types::{
    Attendee, AttendeeReservation, BusinessEventReservations, Event, EventId, GeoPoint, PublicUser,
    Reservation, ReservationCheck, ReservationDetails, ReservationId, ReservationStatus,
    ReservedEvent, Role, User, UserId,
};
pub use users::{LocationInput, UserDraft, UserPatch, UserService};
