//! Row decoding and integer conversions.

use crate::storage;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;
use vibe_core::{
    Event, EventId, GeoPoint, Reservation, ReservationId, ReservationStatus, Result, Role, User,
    UserId, VibeError,
};

macro_rules! event_columns {
    () => {
        "id, title, description, event_date, event_time, capacity, spots_left, \
         business_id, image, price, created_at, updated_at"
    };
}

macro_rules! reservation_columns {
    () => {
        "id, event_id, user_id, no_reservations, status, created_at, updated_at"
    };
}

macro_rules! user_columns {
    () => {
        "id, role, name, email, password_hash, profile_picture, longitude, latitude, \
         created_at, updated_at"
    };
}

pub(crate) use {event_columns, reservation_columns, user_columns};

/// Counters are `u32` in the domain and `INTEGER` in the schema.
pub(crate) fn to_db(value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| VibeError::validation(format!("{value} is out of range")))
}

fn from_db(column: &str, value: i32) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| VibeError::Storage(format!("negative {column} in storage: {value}")))
}

pub(crate) fn event(row: &PgRow) -> Result<Event> {
    Ok(Event {
        id: EventId::from_uuid(row.try_get::<Uuid, _>("id").map_err(storage)?),
        title: row.try_get("title").map_err(storage)?,
        description: row.try_get("description").map_err(storage)?,
        date: row.try_get("event_date").map_err(storage)?,
        time: row.try_get("event_time").map_err(storage)?,
        capacity: from_db("capacity", row.try_get("capacity").map_err(storage)?)?,
        spots_left: from_db("spots_left", row.try_get("spots_left").map_err(storage)?)?,
        business: UserId::from_uuid(row.try_get::<Uuid, _>("business_id").map_err(storage)?),
        image: row.try_get("image").map_err(storage)?,
        price: row.try_get("price").map_err(storage)?,
        created_at: row.try_get("created_at").map_err(storage)?,
        updated_at: row.try_get("updated_at").map_err(storage)?,
    })
}

pub(crate) fn reservation(row: &PgRow) -> Result<Reservation> {
    let status: String = row.try_get("status").map_err(storage)?;
    Ok(Reservation {
        id: ReservationId::from_uuid(row.try_get::<Uuid, _>("id").map_err(storage)?),
        event: EventId::from_uuid(row.try_get::<Uuid, _>("event_id").map_err(storage)?),
        user: UserId::from_uuid(row.try_get::<Uuid, _>("user_id").map_err(storage)?),
        no_reservations: from_db(
            "no_reservations",
            row.try_get("no_reservations").map_err(storage)?,
        )?,
        status: ReservationStatus::parse(&status)
            .ok_or_else(|| VibeError::Storage(format!("Invalid reservation status: {status}")))?,
        created_at: row.try_get("created_at").map_err(storage)?,
        updated_at: row.try_get("updated_at").map_err(storage)?,
    })
}

pub(crate) fn user(row: &PgRow) -> Result<User> {
    let role: String = row.try_get("role").map_err(storage)?;
    let longitude: Option<f64> = row.try_get("longitude").map_err(storage)?;
    let latitude: Option<f64> = row.try_get("latitude").map_err(storage)?;
    Ok(User {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("id").map_err(storage)?),
        role: Role::parse(&role)
            .ok_or_else(|| VibeError::Storage(format!("Invalid role: {role}")))?,
        name: row.try_get("name").map_err(storage)?,
        email: row.try_get("email").map_err(storage)?,
        password_hash: row.try_get("password_hash").map_err(storage)?,
        profile_picture: row.try_get("profile_picture").map_err(storage)?,
        location: longitude.zip(latitude).map(|(lng, lat)| GeoPoint::new(lng, lat)),
        created_at: row.try_get("created_at").map_err(storage)?,
        updated_at: row.try_get("updated_at").map_err(storage)?,
    })
}
