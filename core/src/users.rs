//! User service: registration, credential checks and profile edits.

use crate::environment::Clock;
use crate::error::{Result, VibeError};
use crate::repository::UserRepository;
use crate::types::{GeoPoint, Role, User, UserId};
use crate::validation;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Location as submitted by the client; only the coordinates matter.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LocationInput {
    /// `[longitude, latitude]`
    pub coordinates: Option<[f64; 2]>,
}

/// Input for [`UserService::register`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Plain-text password
    pub password: String,
    /// Requested role, defaults to `user`
    #[serde(default)]
    pub role: Option<Role>,
    /// Home location, coordinates required
    pub location: Option<LocationInput>,
    /// Profile picture URI
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Input for [`UserService::update`]; the role cannot be changed.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    /// New display name
    pub name: Option<String>,
    /// New email address
    pub email: Option<String>,
    /// New plain-text password
    pub password: Option<String>,
    /// New profile picture URI
    pub profile_picture: Option<String>,
    /// New location
    pub location: Option<LocationInput>,
}

/// User use cases.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
    bcrypt_cost: u32,
}

impl UserService {
    /// Create a user service hashing with `bcrypt_cost` rounds.
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, clock: Arc<dyn Clock>, bcrypt_cost: u32) -> Self {
        Self {
            users,
            clock,
            bcrypt_cost,
        }
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// - `Validation` when a field breaks a rule or location is missing
    /// - `Conflict` when the email is already registered
    pub async fn register(&self, draft: UserDraft) -> Result<User> {
        let name = validation::name(&draft.name)?;
        let email = validation::email(&draft.email)?;
        let password = validation::password(&draft.password)?;
        let location = required_location(draft.location.as_ref())?;

        if self.users.find_user_by_email(email.clone()).await?.is_some() {
            return Err(VibeError::conflict("This email already exists"));
        }

        let now = self.clock.now();
        let user = User {
            id: UserId::new(),
            role: draft.role.unwrap_or_default(),
            name,
            email,
            password_hash: self.hash(password).await?,
            profile_picture: draft.profile_picture,
            location: Some(location),
            created_at: now,
            updated_at: now,
        };

        let user = self.users.insert_user(user).await?;
        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Check credentials.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for an unknown email or a wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| VibeError::Unauthorized("User not found".to_string()))?;

        let candidate = password.trim().to_string();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(candidate, &hash))
            .await
            .map_err(|e| VibeError::Storage(format!("password check aborted: {e}")))?
            .unwrap_or(false);

        if !matches {
            return Err(VibeError::Unauthorized("Incorrect password".to_string()));
        }
        info!(user_id = %user.id, "user logged in");
        Ok(user)
    }

    /// Load a user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the user does not exist.
    pub async fn get(&self, id: UserId) -> Result<User> {
        self.users
            .get_user(id)
            .await?
            .ok_or_else(|| VibeError::not_found("User", id))
    }

    /// Edit the caller's own profile.
    ///
    /// # Errors
    ///
    /// - `Forbidden` when `caller` is not `id`
    /// - `NotFound` when the user does not exist
    /// - `Validation` when a field breaks a rule
    /// - `Conflict` when the new email is already registered
    pub async fn update(&self, caller: &User, id: UserId, patch: UserPatch) -> Result<User> {
        if caller.id != id {
            return Err(VibeError::Forbidden(
                "You can only update your own profile".to_string(),
            ));
        }
        let mut user = self.get(id).await?;

        if let Some(name) = patch.name.as_deref() {
            user.name = validation::name(name)?;
        }
        if let Some(email) = patch.email.as_deref() {
            let email = validation::email(email)?;
            if email != user.email {
                if self.users.find_user_by_email(email.clone()).await?.is_some() {
                    return Err(VibeError::conflict("This email already exists"));
                }
                user.email = email;
            }
        }
        if let Some(password) = patch.password.as_deref() {
            let password = validation::password(password)?;
            user.password_hash = self.hash(password).await?;
        }
        if let Some(picture) = patch.profile_picture {
            user.profile_picture = Some(picture);
        }
        if let Some(location) = patch.location.as_ref() {
            user.location = Some(required_location(Some(location))?);
        }
        user.updated_at = self.clock.now();

        let user = self
            .users
            .update_user(user)
            .await?
            .ok_or_else(|| VibeError::not_found("User", id))?;
        info!(user_id = %id, "user updated");
        Ok(user)
    }

    async fn hash(&self, password: String) -> Result<String> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| VibeError::Storage(format!("password hashing aborted: {e}")))?
            .map_err(|e| VibeError::Storage(format!("password hashing failed: {e}")))
    }
}

fn required_location(location: Option<&LocationInput>) -> Result<GeoPoint> {
    let [longitude, latitude] = location
        .and_then(|l| l.coordinates)
        .ok_or_else(|| VibeError::validation("Location coordinates are required"))?;
    validation::coordinates(longitude, latitude)?;
    Ok(GeoPoint::new(longitude, latitude))
}
