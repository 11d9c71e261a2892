use taskweave_core::{EventType, TaskEvent};
use uuid::Uuid;

use super::task::{datetime_to_timestamp, timestamp_to_datetime};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    pub seq: i64,
    pub id: String,
    pub task_id: String,
    pub agent_name: String,
    pub event_type: String,
    pub message: String,
    pub details: Option<String>,
    pub created_at: i64,
}

impl EventRow {
    pub fn into_domain(self) -> TaskEvent {
        TaskEvent {
            id: Uuid::parse_str(&self.id).unwrap_or_default(),
            task_id: Uuid::parse_str(&self.task_id).unwrap_or_default(),
            agent_name: self.agent_name,
            event_type: EventType::parse(&self.event_type).unwrap_or_default(),
            message: self.message,
            created_at: timestamp_to_datetime(self.created_at),
            details: self.details.and_then(|s| serde_json::from_str(&s).ok()),
            seq: self.seq,
        }
    }
}

impl From<&TaskEvent> for EventRow {
    fn from(event: &TaskEvent) -> Self {
        Self {
            seq: event.seq,
            id: event.id.to_string(),
            task_id: event.task_id.to_string(),
            agent_name: event.agent_name.clone(),
            event_type: event.event_type.as_str().to_string(),
            message: event.message.clone(),
            details: event
                .details
                .as_ref()
                .and_then(|v| serde_json::to_string(v).ok()),
            created_at: datetime_to_timestamp(event.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_round_trip() {
        let event = TaskEvent::new(
            Uuid::new_v4(),
            "Researcher",
            EventType::Success,
            "Research completed",
            Some(json!({"researchResults": []})),
        );

        let row = EventRow::from(&event);
        let back = row.into_domain();

        assert_eq!(back.id, event.id);
        assert_eq!(back.task_id, event.task_id);
        assert_eq!(back.agent_name, "Researcher");
        assert_eq!(back.event_type, EventType::Success);
        assert_eq!(back.details.unwrap()["researchResults"], json!([]));
    }
}
