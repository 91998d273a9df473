//! Lifecycle event records

use crate::models::{Incident, IncidentLog, IncidentStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type-specific event body, tagged by `event_type` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum EventPayload {
    /// Incident persisted for the first time
    IncidentCreated {
        incident_id: Uuid,
        title: String,
        status: IncidentStatus,
    },

    /// Log entry persisted against an incident
    IncidentLogAttached {
        log_id: Uuid,
        incident_id: Uuid,
        message: String,
        created_at: DateTime<Utc>,
    },
}

impl EventPayload {
    pub fn incident_created(incident: &Incident) -> Self {
        EventPayload::IncidentCreated {
            incident_id: incident.id,
            title: incident.title.clone(),
            status: incident.status,
        }
    }

    pub fn log_attached(log: &IncidentLog) -> Self {
        EventPayload::IncidentLogAttached {
            log_id: log.id,
            incident_id: log.incident_id,
            message: log.message.clone(),
            created_at: log.created_at,
        }
    }

    /// Get the incident ID from any event
    pub fn incident_id(&self) -> Uuid {
        match self {
            EventPayload::IncidentCreated { incident_id, .. }
            | EventPayload::IncidentLogAttached { incident_id, .. } => *incident_id,
        }
    }

    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            EventPayload::IncidentCreated { .. } => "IncidentCreated",
            EventPayload::IncidentLogAttached { .. } => "IncidentLogAttached",
        }
    }
}

/// Immutable record of one lifecycle change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// Fresh for every emission
    pub event_id: Uuid,

    /// Emission time
    pub occurred_at: DateTime<Utc>,

    /// Emitting component
    pub source: String,

    #[serde(flatten)]
    pub payload: EventPayload,
}

impl LifecycleEvent {
    pub fn new(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            source: source.into(),
            payload,
        }
    }

    pub fn incident_created(source: impl Into<String>, incident: &Incident) -> Self {
        Self::new(source, EventPayload::incident_created(incident))
    }

    pub fn log_attached(source: impl Into<String>, log: &IncidentLog) -> Self {
        Self::new(source, EventPayload::log_attached(log))
    }

    pub fn event_type(&self) -> &'static str {
        self.payload.event_type()
    }

    pub fn incident_id(&self) -> Uuid {
        self.payload.incident_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_created_event_from_incident() {
        let incident = Incident::open("DB outage".to_string(), "replica down".to_string());
        let event = LifecycleEvent::incident_created("incident_service", &incident);

        assert_eq!(event.incident_id(), incident.id);
        assert_eq!(event.event_type(), "IncidentCreated");
        assert_eq!(event.source, "incident_service");
        assert_eq!(
            event.payload,
            EventPayload::IncidentCreated {
                incident_id: incident.id,
                title: "DB outage".to_string(),
                status: IncidentStatus::Open,
            }
        );
    }

    #[test]
    fn test_each_emission_gets_fresh_id() {
        let incident = Incident::open("t".to_string(), String::new());
        let first = LifecycleEvent::incident_created("s", &incident);
        let second = LifecycleEvent::incident_created("s", &incident);
        assert_ne!(first.event_id, second.event_id);
        assert_eq!(first.payload, second.payload);
    }

    #[test]
    fn test_wire_format_is_flat() {
        let log = IncidentLog::new(Uuid::new_v4(), "restarted replica".to_string());
        let event = LifecycleEvent::log_attached("incident_service", &log);

        let json: Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "IncidentLogAttached");
        assert_eq!(json["incident_id"], log.incident_id.to_string());
        assert_eq!(json["message"], "restarted replica");
        assert!(json.get("occurred_at").is_some());
        assert!(json.get("payload").is_none());

        let decoded: LifecycleEvent = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, event);
    }
}
