//! Domain types for the Vibe reservation platform.
//!
//! Three persisted collections exist: events, reservations and users. They
//! reference each other by identifier only; the joined views returned to
//! clients (`ReservationDetails`, `ReservedEvent`, `BusinessEventReservations`)
//! are assembled by the services.
//!
//! The serde representation mirrors the JSON the web client already speaks:
//! camelCase field names and `_id` for identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random `", stringify!($name), "`")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Create a `", stringify!($name), "` from a `Uuid`")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for an event
    EventId
);
define_id!(
    /// Unique identifier for a reservation
    ReservationId
);
define_id!(
    /// Unique identifier for a user (regular or business account)
    UserId
);

// ============================================================================
// Enumerations
// ============================================================================

/// Account role.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End user browsing and reserving events
    #[default]
    User,
    /// Business account that owns events
    Business,
}

impl Role {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Business => "business",
        }
    }

    /// Parse from the database representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "business" => Some(Self::Business),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reservation status.
///
/// Reservations are created `Accepted`; the other states are only reachable
/// through an explicit status update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Awaiting a decision
    Pending,
    /// Confirmed (default)
    #[default]
    Accepted,
    /// Rejected by the business
    Declined,
}

impl ReservationStatus {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// Parse from the database representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Geography
// ============================================================================

/// GeoJSON point, `coordinates` is `[longitude, latitude]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Always `"Point"`
    #[serde(rename = "type", default)]
    pub kind: GeoKind,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

/// The only GeoJSON geometry users carry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeoKind {
    /// A single position
    #[default]
    Point,
}

impl GeoPoint {
    /// Build a point from longitude and latitude.
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: GeoKind::Point,
            coordinates: [longitude, latitude],
        }
    }

    /// Longitude component.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    /// Latitude component.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A bookable occurrence owned by a business.
///
/// `spots_left` starts equal to `capacity` and is only ever decreased by
/// reservation creation (or shifted by a capacity edit).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event identifier
    #[serde(rename = "_id")]
    pub id: EventId,
    /// Title (5-100 characters)
    pub title: String,
    /// Description (20-1000 characters)
    pub description: String,
    /// Date of the event
    pub date: DateTime<Utc>,
    /// Free-text start time, 24h format expected
    pub time: String,
    /// Total capacity (1-500)
    pub capacity: u32,
    /// Remaining capacity
    pub spots_left: u32,
    /// Owning business account
    pub business: UserId,
    /// Image URI, empty when none was uploaded
    pub image: String,
    /// Ticket price (non-negative)
    pub price: f64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Spots already claimed by reservations.
    #[must_use]
    pub const fn claimed(&self) -> u32 {
        self.capacity.saturating_sub(self.spots_left)
    }
}

/// A user's claim on one or more spots of an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Reservation identifier
    #[serde(rename = "_id")]
    pub id: ReservationId,
    /// Reserved event
    pub event: EventId,
    /// Reserving user
    pub user: UserId,
    /// Ticket count (>= 1)
    pub no_reservations: u32,
    /// Status
    pub status: ReservationStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// A stored account, including the password hash.
///
/// Never serialized to clients; see [`PublicUser`].
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    /// User identifier
    pub id: UserId,
    /// Account role
    pub role: Role,
    /// Display name
    pub name: String,
    /// Unique, lowercased email address
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Profile picture URI
    pub profile_picture: Option<String>,
    /// Home location
    pub location: Option<GeoPoint>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Credential-free view of a [`User`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    /// User identifier
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Account role
    pub role: Role,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Profile picture URI
    pub profile_picture: Option<String>,
    /// Home location
    pub location: Option<GeoPoint>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            name: user.name.clone(),
            email: user.email.clone(),
            profile_picture: user.profile_picture.clone(),
            location: user.location,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            name: user.name,
            email: user.email,
            profile_picture: user.profile_picture,
            location: user.location,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ============================================================================
// Joined views
// ============================================================================

/// Reservation joined with its event and the reserving user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDetails {
    /// Reservation identifier
    #[serde(rename = "_id")]
    pub id: ReservationId,
    /// Reserved event
    pub event: Event,
    /// Reserving user
    pub user: PublicUser,
    /// Ticket count
    pub no_reservations: u32,
    /// Status
    pub status: ReservationStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// An event the user holds a reservation for, annotated with that reservation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservedEvent {
    /// The event snapshot
    #[serde(flatten)]
    pub event: Event,
    /// Reservation identifier
    pub reservation_id: ReservationId,
    /// When the reservation was made
    pub reservation_date: DateTime<Utc>,
}

/// Reserving user as shown to the owning business.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    /// User identifier
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Profile picture URI
    pub profile_picture: Option<String>,
}

impl From<&User> for Attendee {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            profile_picture: user.profile_picture.clone(),
        }
    }
}

/// One reservation row in the business dashboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeReservation {
    /// Reservation identifier
    #[serde(rename = "_id")]
    pub id: ReservationId,
    /// Reserving user
    pub user: Attendee,
    /// Ticket count
    pub no_reservations: u32,
}

/// An event owned by a business together with all of its reservations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessEventReservations {
    /// Event identifier
    #[serde(rename = "_id")]
    pub id: EventId,
    /// Event title
    pub title: String,
    /// Event date
    pub date: DateTime<Utc>,
    /// Event time
    pub time: String,
    /// Reservations for the event
    pub reservations: Vec<AttendeeReservation>,
}

/// Result of a reservation existence check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationCheck {
    /// Whether the user already holds a reservation for the event
    pub has_reservation: bool,
    /// The joined reservation, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation: Option<ReservationDetails>,
}
