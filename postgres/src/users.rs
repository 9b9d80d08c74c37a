//! `UserRepository` for `PostgresStore`.

use crate::rows::{self, user_columns};
use crate::{PostgresStore, is_unique_violation, storage};
use vibe_core::{StoreFuture, User, UserId, UserRepository, VibeError};

const EMAIL_TAKEN: &str = "This email already exists";

impl UserRepository for PostgresStore {
    fn insert_user(&self, user: User) -> StoreFuture<'_, User> {
        Box::pin(async move {
            sqlx::query(
                r"
                INSERT INTO users (
                    id, role, name, email, password_hash, profile_picture,
                    longitude, latitude, created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ",
            )
            .bind(user.id.as_uuid())
            .bind(user.role.as_str())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.profile_picture)
            .bind(user.location.map(|l| l.longitude()))
            .bind(user.location.map(|l| l.latitude()))
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    VibeError::conflict(EMAIL_TAKEN)
                } else {
                    storage(e)
                }
            })?;

            Ok(user)
        })
    }

    fn get_user(&self, id: UserId) -> StoreFuture<'_, Option<User>> {
        Box::pin(async move {
            let row = sqlx::query(concat!("SELECT ", user_columns!(), " FROM users WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(storage)?;

            row.as_ref().map(rows::user).transpose()
        })
    }

    fn find_user_by_email(&self, email: String) -> StoreFuture<'_, Option<User>> {
        Box::pin(async move {
            let row = sqlx::query(concat!(
                "SELECT ",
                user_columns!(),
                " FROM users WHERE email = $1"
            ))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

            row.as_ref().map(rows::user).transpose()
        })
    }

    fn update_user(&self, user: User) -> StoreFuture<'_, Option<User>> {
        Box::pin(async move {
            let updated = sqlx::query(
                r"
                UPDATE users SET
                    role = $2, name = $3, email = $4, password_hash = $5,
                    profile_picture = $6, longitude = $7, latitude = $8, updated_at = $9
                WHERE id = $1
                ",
            )
            .bind(user.id.as_uuid())
            .bind(user.role.as_str())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.profile_picture)
            .bind(user.location.map(|l| l.longitude()))
            .bind(user.location.map(|l| l.latitude()))
            .bind(user.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    VibeError::conflict(EMAIL_TAKEN)
                } else {
                    storage(e)
                }
            })?
            .rows_affected();

            Ok((updated > 0).then_some(user))
        })
    }
}
