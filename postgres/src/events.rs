//! `EventRepository` for `PostgresStore`.

use crate::rows::{self, event_columns, to_db};
use crate::{PostgresStore, storage};
use chrono::{DateTime, Utc};
use vibe_core::{Event, EventChanges, EventId, EventRepository, EventUpdate, StoreFuture, UserId};

impl EventRepository for PostgresStore {
    fn insert_event(&self, event: Event) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            sqlx::query(
                r"
                INSERT INTO events (
                    id, title, description, event_date, event_time, capacity, spots_left,
                    business_id, image, price, created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                ",
            )
            .bind(event.id.as_uuid())
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.date)
            .bind(&event.time)
            .bind(to_db(event.capacity)?)
            .bind(to_db(event.spots_left)?)
            .bind(event.business.as_uuid())
            .bind(&event.image)
            .bind(event.price)
            .bind(event.created_at)
            .bind(event.updated_at)
            .execute(&self.pool)
            .await
            .map_err(storage)?;

            tracing::debug!(event_id = %event.id, "event inserted");
            Ok(event)
        })
    }

    fn get_event(&self, id: EventId) -> StoreFuture<'_, Option<Event>> {
        Box::pin(async move {
            let row = sqlx::query(concat!(
                "SELECT ",
                event_columns!(),
                " FROM events WHERE id = $1"
            ))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

            row.as_ref().map(rows::event).transpose()
        })
    }

    fn list_events(&self) -> StoreFuture<'_, Vec<Event>> {
        Box::pin(async move {
            let records = sqlx::query(concat!(
                "SELECT ",
                event_columns!(),
                " FROM events ORDER BY event_date ASC, created_at ASC"
            ))
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

            records.iter().map(rows::event).collect()
        })
    }

    fn list_events_by_business(&self, business: UserId) -> StoreFuture<'_, Vec<Event>> {
        Box::pin(async move {
            let records = sqlx::query(concat!(
                "SELECT ",
                event_columns!(),
                " FROM events WHERE business_id = $1 ORDER BY event_date ASC, created_at ASC"
            ))
            .bind(business.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

            records.iter().map(rows::event).collect()
        })
    }

    fn update_event(
        &self,
        id: EventId,
        changes: EventChanges,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, EventUpdate> {
        Box::pin(async move {
            let capacity = changes.capacity.map(to_db).transpose()?;

            // SET expressions all read the pre-update row, so the capacity
            // delta is applied to spots_left in the same statement.
            let row = sqlx::query(concat!(
                r"
                UPDATE events SET
                    title = COALESCE($2, title),
                    description = COALESCE($3, description),
                    event_date = COALESCE($4, event_date),
                    event_time = COALESCE($5, event_time),
                    spots_left = spots_left + (COALESCE($6, capacity) - capacity),
                    capacity = COALESCE($6, capacity),
                    image = COALESCE($7, image),
                    price = COALESCE($8, price),
                    updated_at = $9
                WHERE id = $1 AND COALESCE($6, capacity) >= capacity - spots_left
                RETURNING ",
                event_columns!()
            ))
            .bind(id.as_uuid())
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.date)
            .bind(changes.time)
            .bind(capacity)
            .bind(changes.image)
            .bind(changes.price)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

            if let Some(row) = row {
                return Ok(EventUpdate::Updated(rows::event(&row)?));
            }

            let claimed: Option<i32> =
                sqlx::query_scalar("SELECT capacity - spots_left FROM events WHERE id = $1")
                    .bind(id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(storage)?;

            Ok(match claimed {
                None => EventUpdate::Missing,
                Some(claimed) => EventUpdate::BelowClaimed {
                    claimed: u32::try_from(claimed).unwrap_or_default(),
                },
            })
        })
    }

    fn delete_event(&self, id: EventId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await.map_err(storage)?;

            let cascaded = sqlx::query("DELETE FROM reservations WHERE event_id = $1")
                .bind(id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(storage)?
                .rows_affected();

            let deleted = sqlx::query("DELETE FROM events WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(storage)?
                .rows_affected();

            if deleted == 0 {
                tx.rollback().await.map_err(storage)?;
                return Ok(false);
            }

            tx.commit().await.map_err(storage)?;
            tracing::debug!(event_id = %id, reservations = cascaded, "event deleted with cascade");
            Ok(true)
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(storage)?;
            Ok(())
        })
    }
}
