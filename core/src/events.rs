//! Event service: business-owned CRUD around the capacity counter.

use crate::environment::Clock;
use crate::error::{Result, VibeError};
use crate::metrics::EVENTS_TOTAL;
use crate::repository::{EventChanges, EventRepository, EventUpdate};
use crate::types::{Event, EventId, Role, User};
use crate::validation;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Input for [`EventService::create`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Date, must be in the future
    pub date: DateTime<Utc>,
    /// Start time
    pub time: String,
    /// Capacity
    pub capacity: u32,
    /// Image URI
    #[serde(default)]
    pub image: Option<String>,
    /// Ticket price
    pub price: f64,
}

/// Input for [`EventService::update`]; absent fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New date
    pub date: Option<DateTime<Utc>>,
    /// New time
    pub time: Option<String>,
    /// New capacity
    pub capacity: Option<u32>,
    /// New image URI
    pub image: Option<String>,
    /// New price
    pub price: Option<f64>,
}

/// Event use cases.
#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventRepository>,
    clock: Arc<dyn Clock>,
}

impl EventService {
    /// Create a new event service.
    #[must_use]
    pub fn new(events: Arc<dyn EventRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { events, clock }
    }

    /// Publish a new event owned by `business`.
    ///
    /// # Errors
    ///
    /// - `Forbidden` when `business` is not a business account
    /// - `Validation` when a field breaks a rule
    pub async fn create(&self, business: &User, draft: EventDraft) -> Result<Event> {
        if business.role != Role::Business {
            return Err(VibeError::Forbidden(
                "Only business accounts can create events".to_string(),
            ));
        }

        let now = self.clock.now();
        let capacity = validation::capacity(draft.capacity)?;
        let event = Event {
            id: EventId::new(),
            title: validation::title(&draft.title)?,
            description: validation::description(&draft.description)?,
            date: validation::future_date(draft.date, now)?,
            time: validation::time(&draft.time)?,
            capacity,
            spots_left: capacity,
            business: business.id,
            image: draft.image.unwrap_or_default(),
            price: validation::price(draft.price)?,
            created_at: now,
            updated_at: now,
        };

        let event = self.events.insert_event(event).await?;
        metrics::counter!(EVENTS_TOTAL, "action" => "created").increment(1);
        info!(event_id = %event.id, business_id = %business.id, capacity, "event created");
        Ok(event)
    }

    /// All events, soonest first.
    ///
    /// # Errors
    ///
    /// Returns `Storage` when the store fails.
    pub async fn list(&self) -> Result<Vec<Event>> {
        self.events.list_events().await
    }

    /// One event.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the event does not exist.
    pub async fn get(&self, id: EventId) -> Result<Event> {
        self.events
            .get_event(id)
            .await?
            .ok_or_else(|| VibeError::not_found("Event", id))
    }

    /// Apply `patch` to an event owned by `caller`.
    ///
    /// A capacity change shifts `spots_left` by the same amount; lowering
    /// capacity below the spots already claimed is rejected.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the event does not exist
    /// - `Forbidden` when `caller` does not own it
    /// - `Validation` when a field breaks a rule
    pub async fn update(&self, caller: &User, id: EventId, patch: EventPatch) -> Result<Event> {
        let existing = self.owned(caller, id).await?;
        let now = self.clock.now();

        let changes = EventChanges {
            title: patch.title.as_deref().map(validation::title).transpose()?,
            description: patch
                .description
                .as_deref()
                .map(validation::description)
                .transpose()?,
            date: match patch.date {
                Some(date) if date != existing.date => Some(validation::future_date(date, now)?),
                other => other,
            },
            time: patch.time.as_deref().map(validation::time).transpose()?,
            capacity: patch.capacity.map(validation::capacity).transpose()?,
            image: patch.image,
            price: patch.price.map(validation::price).transpose()?,
        };

        match self.events.update_event(id, changes, now).await? {
            EventUpdate::Updated(event) => {
                metrics::counter!(EVENTS_TOTAL, "action" => "updated").increment(1);
                info!(event_id = %id, spots_left = event.spots_left, "event updated");
                Ok(event)
            }
            EventUpdate::BelowClaimed { claimed } => Err(VibeError::validation(format!(
                "Capacity cannot be lower than the {claimed} spots already reserved"
            ))),
            EventUpdate::Missing => Err(VibeError::not_found("Event", id)),
        }
    }

    /// Delete an event owned by `caller` together with its reservations.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the event does not exist
    /// - `Forbidden` when `caller` does not own it
    pub async fn delete(&self, caller: &User, id: EventId) -> Result<()> {
        self.owned(caller, id).await?;
        if !self.events.delete_event(id).await? {
            return Err(VibeError::not_found("Event", id));
        }
        metrics::counter!(EVENTS_TOTAL, "action" => "deleted").increment(1);
        info!(event_id = %id, "event and its reservations deleted");
        Ok(())
    }

    async fn owned(&self, caller: &User, id: EventId) -> Result<Event> {
        let event = self.get(id).await?;
        if event.business != caller.id {
            return Err(VibeError::Forbidden(
                "You can only modify your own events".to_string(),
            ));
        }
        Ok(event)
    }
}
