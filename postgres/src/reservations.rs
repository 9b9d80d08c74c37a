//! `ReservationRepository` for `PostgresStore`.

use crate::rows::{self, reservation_columns, to_db};
use crate::{PostgresStore, storage};
use chrono::{DateTime, Utc};
use vibe_core::{
    BookingOutcome, CapacityPolicy, EventId, Reservation, ReservationId, ReservationRepository,
    ReservationStatus, StoreFuture, UserId,
};

const DECREMENT_KEEP_LAST_SPOT: &str = r"
    UPDATE events
    SET spots_left = spots_left - $2, updated_at = $3
    WHERE id = $1 AND spots_left > 0 AND spots_left > $2
    RETURNING spots_left
";

const DECREMENT_ALLOW_EXACT_FILL: &str = r"
    UPDATE events
    SET spots_left = spots_left - $2, updated_at = $3
    WHERE id = $1 AND spots_left > 0 AND spots_left >= $2
    RETURNING spots_left
";

impl ReservationRepository for PostgresStore {
    fn book(
        &self,
        reservation: Reservation,
        policy: CapacityPolicy,
    ) -> StoreFuture<'_, BookingOutcome> {
        Box::pin(async move {
            let tickets = to_db(reservation.no_reservations)?;
            let decrement = match policy {
                CapacityPolicy::KeepLastSpot => DECREMENT_KEEP_LAST_SPOT,
                CapacityPolicy::AllowExactFill => DECREMENT_ALLOW_EXACT_FILL,
            };

            let mut tx = self.pool.begin().await.map_err(storage)?;

            // The row lock taken here serialises concurrent bookings for the
            // same event; a waiter re-evaluates the guard on the new counter.
            let remaining: Option<i32> = sqlx::query_scalar(decrement)
                .bind(reservation.event.as_uuid())
                .bind(tickets)
                .bind(reservation.created_at)
                .fetch_optional(&mut *tx)
                .await
                .map_err(storage)?;

            let Some(remaining) = remaining else {
                let current: Option<i32> =
                    sqlx::query_scalar("SELECT spots_left FROM events WHERE id = $1")
                        .bind(reservation.event.as_uuid())
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(storage)?;
                tx.rollback().await.map_err(storage)?;
                return Ok(match current {
                    None => BookingOutcome::EventMissing,
                    Some(spots_left) => BookingOutcome::InsufficientSpots {
                        spots_left: u32::try_from(spots_left).unwrap_or_default(),
                    },
                });
            };

            let inserted = sqlx::query(
                r"
                INSERT INTO reservations (
                    id, event_id, user_id, no_reservations, status, created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT ON CONSTRAINT uq_reservations_event_user DO NOTHING
                ",
            )
            .bind(reservation.id.as_uuid())
            .bind(reservation.event.as_uuid())
            .bind(reservation.user.as_uuid())
            .bind(tickets)
            .bind(reservation.status.as_str())
            .bind(reservation.created_at)
            .bind(reservation.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(storage)?
            .rows_affected();

            if inserted == 0 {
                tx.rollback().await.map_err(storage)?;
                return Ok(BookingOutcome::Duplicate);
            }

            tx.commit().await.map_err(storage)?;
            tracing::debug!(
                reservation_id = %reservation.id,
                event_id = %reservation.event,
                spots_left = remaining,
                "booking committed"
            );
            Ok(BookingOutcome::Booked {
                spots_left: u32::try_from(remaining).unwrap_or_default(),
            })
        })
    }

    fn find_reservation(
        &self,
        event: EventId,
        user: UserId,
    ) -> StoreFuture<'_, Option<Reservation>> {
        Box::pin(async move {
            let row = sqlx::query(concat!(
                "SELECT ",
                reservation_columns!(),
                " FROM reservations WHERE event_id = $1 AND user_id = $2"
            ))
            .bind(event.as_uuid())
            .bind(user.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

            row.as_ref().map(rows::reservation).transpose()
        })
    }

    fn get_reservation(&self, id: ReservationId) -> StoreFuture<'_, Option<Reservation>> {
        Box::pin(async move {
            let row = sqlx::query(concat!(
                "SELECT ",
                reservation_columns!(),
                " FROM reservations WHERE id = $1"
            ))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

            row.as_ref().map(rows::reservation).transpose()
        })
    }

    fn list_reservations_for_user(&self, user: UserId) -> StoreFuture<'_, Vec<Reservation>> {
        Box::pin(async move {
            let records = sqlx::query(concat!(
                "SELECT ",
                reservation_columns!(),
                " FROM reservations WHERE user_id = $1 ORDER BY created_at DESC"
            ))
            .bind(user.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

            records.iter().map(rows::reservation).collect()
        })
    }

    fn list_reservations_for_event(&self, event: EventId) -> StoreFuture<'_, Vec<Reservation>> {
        Box::pin(async move {
            let records = sqlx::query(concat!(
                "SELECT ",
                reservation_columns!(),
                " FROM reservations WHERE event_id = $1 ORDER BY created_at ASC"
            ))
            .bind(event.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

            records.iter().map(rows::reservation).collect()
        })
    }

    fn list_reservations(&self) -> StoreFuture<'_, Vec<Reservation>> {
        Box::pin(async move {
            let records = sqlx::query(concat!(
                "SELECT ",
                reservation_columns!(),
                " FROM reservations ORDER BY created_at ASC"
            ))
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

            records.iter().map(rows::reservation).collect()
        })
    }

    fn update_reservation_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, Option<Reservation>> {
        Box::pin(async move {
            let row = sqlx::query(concat!(
                "UPDATE reservations SET status = $2, updated_at = $3 WHERE id = $1 RETURNING ",
                reservation_columns!()
            ))
            .bind(id.as_uuid())
            .bind(status.as_str())
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

            row.as_ref().map(rows::reservation).transpose()
        })
    }

    fn delete_reservation(&self, id: ReservationId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let deleted = sqlx::query("DELETE FROM reservations WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(storage)?
                .rows_affected();
            Ok(deleted > 0)
        })
    }
}
