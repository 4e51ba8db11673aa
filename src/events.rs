//! Event and reminder lifecycle.
//!
//! Owns the list of calendar-style events for the signed-in user, keeps the
//! local notification registrations in step with the reminder flags, and
//! drives the post-event review flow.

use chrono::{Timelike, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Error;
use crate::models::{Event, EventDraft, EventKind};
use crate::services::docstore::collections;
use crate::services::{DocumentStore, NotificationScheduler};
use crate::signal::{SignalHub, UiSignal};

/// Manager for the events screen
pub struct EventManager {
    store: Arc<dyn DocumentStore>,
    scheduler: Arc<dyn NotificationScheduler>,
    signals: SignalHub,
    user_id: Option<String>,
    events: Vec<Event>,
    last_error: Option<String>,
}

impl EventManager {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        scheduler: Arc<dyn NotificationScheduler>,
        signals: SignalHub,
    ) -> Self {
        Self {
            store,
            scheduler,
            signals,
            user_id: None,
            events: Vec::new(),
            last_error: None,
        }
    }

    /// The current in-memory event list
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Future events, soonest first
    pub fn upcoming(&self) -> Vec<&Event> {
        let now = Utc::now();
        let mut upcoming: Vec<&Event> = self.events.iter().filter(|e| !e.is_past(now)).collect();
        upcoming.sort_by_key(|e| e.starts_at);
        upcoming
    }

    /// The most recent error message, for inline display
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Past events whose review has not been collected yet
    pub fn pending_review(&self) -> Vec<&Event> {
        let now = Utc::now();
        self.events
            .iter()
            .filter(|e| e.is_past(now) && !e.reviewed)
            .collect()
    }

    /// Replace the event list from the store
    pub async fn fetch(&mut self, user_id: &str) -> Result<(), Error> {
        let docs = match self.store.fetch_all(user_id, collections::EVENTS).await {
            Ok(docs) => docs,
            Err(err) => {
                self.last_error = Some(err.to_string());
                return Err(err.into());
            }
        };

        self.user_id = Some(user_id.to_string());
        self.events = docs.into_iter().filter_map(Self::decode_event).collect();
        self.last_error = None;

        if let Some(event) = self.pending_review().first() {
            self.signals.emit(UiSignal::ReviewPrompt(event.id));
        }
        Ok(())
    }

    fn decode_event(doc: Value) -> Option<Event> {
        match serde_json::from_value(doc) {
            Ok(event) => Some(event),
            Err(err) => {
                // Skip documents written by newer app versions rather than
                // failing the whole fetch.
                warn!("skipping undecodable event document: {err}");
                None
            }
        }
    }

    /// Create an event and persist it.
    ///
    /// Returns the new event's id; the in-memory list is only extended once
    /// the store write succeeds.
    pub async fn add(&mut self, draft: EventDraft) -> Result<Uuid, Error> {
        let person = match Self::validated_person(&draft) {
            Ok(person) => person,
            Err(err) => {
                self.last_error = Some(err.to_string());
                return Err(err);
            }
        };
        let user_id = self.require_user()?;

        let event = Event {
            id: Uuid::new_v4(),
            person,
            starts_at: draft.starts_at,
            kind: draft.kind,
            reminder_on: draft.reminder_on,
            rating: None,
            notes: draft.notes,
            reviewed: false,
        };

        if let Err(err) = self.persist(&user_id, &event).await {
            self.last_error = Some(err.to_string());
            return Err(err);
        }

        self.sync_reminder(&event).await;
        info!("added event {} ({})", event.id, event.kind.label());
        let id = event.id;
        self.events.push(event);
        self.last_error = None;
        self.signals.emit(UiSignal::Celebrate);
        Ok(id)
    }

    /// Replace an existing event's user-editable fields
    pub async fn update(&mut self, id: Uuid, draft: EventDraft) -> Result<(), Error> {
        let person = match Self::validated_person(&draft) {
            Ok(person) => person,
            Err(err) => {
                self.last_error = Some(err.to_string());
                return Err(err);
            }
        };
        let user_id = self.require_user()?;

        let index = self
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| Error::UnknownId(id.to_string()))?;

        let mut updated = self.events[index].clone();
        updated.person = person;
        updated.starts_at = draft.starts_at;
        updated.kind = draft.kind;
        updated.reminder_on = draft.reminder_on;
        updated.notes = draft.notes;

        if let Err(err) = self.persist(&user_id, &updated).await {
            self.last_error = Some(err.to_string());
            return Err(err);
        }

        self.sync_reminder(&updated).await;
        self.events[index] = updated;
        self.last_error = None;
        Ok(())
    }

    /// Remove events locally and from the store, cancelling their reminders
    pub async fn delete(&mut self, ids: &[Uuid]) -> Result<(), Error> {
        let user_id = self.require_user()?;
        let mut first_error: Option<Error> = None;

        for id in ids {
            self.scheduler.cancel(&id.to_string()).await;
            self.events.retain(|e| e.id != *id);

            if let Err(err) = self
                .store
                .delete(&user_id, collections::EVENTS, &id.to_string())
                .await
            {
                warn!("failed to delete event {id} from the store: {err}");
                self.last_error = Some(err.to_string());
                first_error.get_or_insert(err.into());
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                self.last_error = None;
                Ok(())
            }
        }
    }

    /// Record the post-event review and mark the event reviewed
    pub async fn submit_review(
        &mut self,
        id: Uuid,
        rating: u8,
        notes: Option<String>,
    ) -> Result<(), Error> {
        if !(1..=5).contains(&rating) {
            let err = Error::validation("Rating must be between 1 and 5");
            self.last_error = Some(err.to_string());
            return Err(err);
        }
        let user_id = self.require_user()?;

        let index = self
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| Error::UnknownId(id.to_string()))?;

        let mut reviewed = self.events[index].clone();
        reviewed.rating = Some(rating);
        reviewed.notes = notes;
        reviewed.reviewed = true;

        if let Err(err) = self.persist(&user_id, &reviewed).await {
            self.last_error = Some(err.to_string());
            return Err(err);
        }

        self.events[index] = reviewed;
        self.last_error = None;
        Ok(())
    }

    /// Drop all per-user state on sign-out
    pub fn clear(&mut self) {
        self.user_id = None;
        self.events.clear();
        self.last_error = None;
    }

    fn validated_person(draft: &EventDraft) -> Result<String, Error> {
        let person = draft.person.trim();
        if person.is_empty() {
            return Err(Error::validation("Name cannot be empty"));
        }
        Ok(person.to_string())
    }

    fn require_user(&self) -> Result<String, Error> {
        self.user_id.clone().ok_or(Error::NoSession)
    }

    async fn persist(&self, user_id: &str, event: &Event) -> Result<(), Error> {
        let doc = serde_json::to_value(event)?;
        self.store
            .put(user_id, collections::EVENTS, &event.id.to_string(), doc)
            .await?;
        Ok(())
    }

    /// Bring the notification registration in line with the event.
    ///
    /// Scheduling is best-effort: a scheduler failure never rolls back the
    /// event itself.
    async fn sync_reminder(&self, event: &Event) {
        let key = event.id.to_string();

        if event.reminder_on && !event.is_past(Utc::now()) {
            let fire_at = event
                .starts_at
                .with_second(0)
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or(event.starts_at);
            let (title, body) = reminder_copy(event);

            if let Err(err) = self.scheduler.schedule_at(&key, fire_at, &title, &body).await {
                warn!("could not schedule reminder for {key}: {err}");
            }
        } else {
            self.scheduler.cancel(&key).await;
        }
    }
}

fn reminder_copy(event: &Event) -> (String, String) {
    match event.kind {
        EventKind::Birthday => (
            format!("{}'s birthday", event.person),
            "Make today feel special.".to_string(),
        ),
        EventKind::Anniversary => (
            format!("Anniversary with {}", event.person),
            "Don't let the date slip by.".to_string(),
        ),
        EventKind::DateNight => (
            format!("Date night with {}", event.person),
            "Tonight's the night.".to_string(),
        ),
        EventKind::Other => (
            format!("Reminder: {}", event.person),
            "You asked to be reminded today.".to_string(),
        ),
    }
}
