use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use uuid::Uuid;
use validator::Validate;

/// Represents an incident in the system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Unique identifier
    pub id: Uuid,

    /// Human-readable title
    pub title: String,

    /// Detailed description
    pub description: String,

    /// Current lifecycle status
    pub status: IncidentStatus,

    /// Creation timestamp, assigned by the repository on insert
    pub created_at: DateTime<Utc>,

    /// Last update timestamp, assigned by the repository on every save
    pub updated_at: DateTime<Utc>,

    /// Attached log entries in insertion order
    #[serde(default)]
    pub logs: Vec<IncidentLog>,
}

impl Incident {
    /// Build a not-yet-persisted incident. New incidents always start `OPEN`.
    pub fn open(title: String, description: String) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            title,
            description,
            status: IncidentStatus::Open,
            created_at: now,
            updated_at: now,
            logs: Vec::new(),
        }
    }

    /// Apply a status change if the lifecycle table allows it.
    ///
    /// Returns the previous status on success and leaves `self` untouched on
    /// failure.
    pub fn transition_to(
        &mut self,
        next: IncidentStatus,
    ) -> Result<IncidentStatus, (IncidentStatus, IncidentStatus)> {
        let current = self.status;
        if !current.can_transition_to(next) {
            return Err((current, next));
        }
        self.status = next;
        Ok(current)
    }

    /// Copy of the row without its log collection
    pub fn without_logs(&self) -> Self {
        Self {
            logs: Vec::new(),
            ..self.clone()
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status.is_terminal()
    }
}

/// A free-text entry attached to an incident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentLog {
    pub id: Uuid,
    pub incident_id: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl IncidentLog {
    pub fn new(incident_id: Uuid, message: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            incident_id,
            message,
            created_at: Utc::now(),
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl IncidentStatus {
    /// Statuses reachable in one step from `self`
    pub fn allowed_transitions(&self) -> &'static [IncidentStatus] {
        match self {
            IncidentStatus::Open => &[IncidentStatus::InProgress, IncidentStatus::Closed],
            IncidentStatus::InProgress => &[IncidentStatus::Resolved],
            IncidentStatus::Resolved => &[IncidentStatus::Closed],
            IncidentStatus::Closed => &[],
        }
    }

    pub fn can_transition_to(&self, next: IncidentStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Every status reachable from `OPEN`, including `OPEN` itself
    pub fn reachable_from_open() -> Vec<IncidentStatus> {
        let mut reachable = vec![IncidentStatus::Open];
        let mut frontier = vec![IncidentStatus::Open];

        while let Some(status) = frontier.pop() {
            for next in status.allowed_transitions() {
                if !reachable.contains(next) {
                    reachable.push(*next);
                    frontier.push(*next);
                }
            }
        }

        reachable
    }

    pub fn all() -> impl Iterator<Item = IncidentStatus> {
        IncidentStatus::iter()
    }
}

/// Payload for creating an incident
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewIncident {
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    #[serde(default)]
    pub description: String,
}

impl NewIncident {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Partial update of an incident. Only the status is patchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncidentPatch {
    #[serde(default)]
    pub status: Option<IncidentStatus>,
}

impl IncidentPatch {
    pub fn status(status: IncidentStatus) -> Self {
        Self {
            status: Some(status),
        }
    }
}

/// Payload for attaching a log entry
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewIncidentLog {
    #[validate(length(min = 1))]
    pub message: String,
}
