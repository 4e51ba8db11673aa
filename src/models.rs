//! Domain entities shared by the Ember managers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of a calendar event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Birthday,
    Anniversary,
    DateNight,
    Other,
}

impl EventKind {
    /// Human-readable label used in list rows and notification copy
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Birthday => "Birthday",
            EventKind::Anniversary => "Anniversary",
            EventKind::DateNight => "Date night",
            EventKind::Other => "Reminder",
        }
    }
}

/// A calendar-style event tied to a person
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// The event ID, also used as the notification key
    pub id: Uuid,

    /// Name of the person the event is about
    pub person: String,

    /// When the event takes place
    pub starts_at: DateTime<Utc>,

    /// The event kind
    pub kind: EventKind,

    /// Whether a local notification should fire at the event time
    pub reminder_on: bool,

    /// Rating collected by the post-event review, 1 through 5
    pub rating: Option<u8>,

    /// Free-form review notes
    pub notes: Option<String>,

    /// Whether the post-event review was completed
    pub reviewed: bool,
}

impl Event {
    /// Whether the event date has passed
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now
    }
}

/// Fields supplied by the user when creating or editing an event
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub person: String,
    pub starts_at: DateTime<Utc>,
    pub kind: EventKind,
    pub reminder_on: bool,
    pub notes: Option<String>,
}

/// One of the five fixed Spark chapters.
///
/// Declaration order is the catalog order; only the first chapter is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SparkCategory {
    FirstSteps,
    DeeperTalks,
    SharedAdventures,
    ThoughtfulGestures,
    KeepingTheFlame,
}

impl SparkCategory {
    /// All chapters in catalog order
    pub const ALL: [SparkCategory; 5] = [
        SparkCategory::FirstSteps,
        SparkCategory::DeeperTalks,
        SparkCategory::SharedAdventures,
        SparkCategory::ThoughtfulGestures,
        SparkCategory::KeepingTheFlame,
    ];

    /// Chapter title shown in the checklist screens
    pub fn title(&self) -> &'static str {
        match self {
            SparkCategory::FirstSteps => "First Steps",
            SparkCategory::DeeperTalks => "Deeper Talks",
            SparkCategory::SharedAdventures => "Shared Adventures",
            SparkCategory::ThoughtfulGestures => "Thoughtful Gestures",
            SparkCategory::KeepingTheFlame => "Keeping the Flame",
        }
    }

    /// The first chapter is available without a subscription
    pub fn is_free(&self) -> bool {
        matches!(self, SparkCategory::FirstSteps)
    }
}

/// A single relationship-building prompt with a completion flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparkItem {
    pub id: Uuid,

    /// The prompt text, copied from the catalog at seeding time
    pub prompt: String,

    /// The chapter the prompt belongs to
    pub category: SparkCategory,

    /// Position within the seeded catalog, used to keep a stable order
    pub position: u32,

    /// Whether the user marked the prompt as done
    pub completed: bool,
}

/// Category of a date idea card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaCategory {
    Romantic,
    Outdoor,
    AtHome,
    Creative,
    Food,
    /// Categories added to the bundled catalog after this build
    #[serde(other)]
    Other,
}

/// Availability tier of a date idea
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaTier {
    Free,
    Premium,
}

/// A bundled date-idea card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Idea {
    /// Stable ID from the bundled catalog
    pub id: String,

    pub title: String,

    pub description: String,

    pub category: IdeaCategory,

    /// Effort required, 1 through 5
    pub difficulty: u8,

    /// How impressive the result is, 1 through 5
    pub impressiveness: u8,

    /// Bundled image asset name, if any
    pub image: Option<String>,

    pub tier: IdeaTier,
}

/// The signed-in user as reported by the identity collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: Option<String>,
}

/// A purchasable product listed by the commerce collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub description: String,

    /// Localized display price, formatted by the commerce collaborator
    pub display_price: String,
}

/// An active entitlement row from the commerce collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entitlement {
    pub product_id: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Terminal states of a purchase attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOutcome {
    /// The transaction completed and was verified
    Verified,
    /// The transaction completed but could not be verified
    Unverified,
    /// The user backed out
    Cancelled,
    /// Awaiting external approval (e.g. family sharing)
    Pending,
}
