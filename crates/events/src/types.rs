//! Event types published on the Taskweave bus.

use serde::{Deserialize, Serialize};
use taskweave_core::TaskEvent;
use uuid::Uuid;

/// All events published on the bus.
///
/// `AgentEvent` wraps the persisted log entry, which already carries its own
/// id, timestamp, and store-assigned sequence number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A new task was submitted
    #[serde(rename = "task.created")]
    TaskCreated { task_id: Uuid },

    /// Task status changed
    #[serde(rename = "task.status_changed")]
    TaskStatusChanged {
        task_id: Uuid,
        from_status: String,
        to_status: String,
    },

    /// An agent event was appended to a task's log
    #[serde(rename = "agent.event")]
    AgentEvent { event: TaskEvent },
}

impl Event {
    /// The task this event belongs to.
    pub fn task_id(&self) -> Uuid {
        match self {
            Event::TaskCreated { task_id } => *task_id,
            Event::TaskStatusChanged { task_id, .. } => *task_id,
            Event::AgentEvent { event } => event.task_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskweave_core::EventType;

    #[test]
    fn test_event_serialization() {
        let event = Event::TaskStatusChanged {
            task_id: Uuid::new_v4(),
            from_status: "pending".to_string(),
            to_status: "in_progress".to_string(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("task.status_changed"));
        assert!(json.contains("from_status"));
        assert!(json.contains("to_status"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"task.created","task_id":"550e8400-e29b-41d4-a716-446655440000"}"#;
        let event: Event = serde_json::from_str(json).unwrap();

        match event {
            Event::TaskCreated { task_id } => assert!(!task_id.is_nil()),
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn test_event_task_id() {
        let task_id = Uuid::new_v4();

        let created = Event::TaskCreated { task_id };
        assert_eq!(created.task_id(), task_id);

        let appended = Event::AgentEvent {
            event: TaskEvent::new(task_id, "Planner", EventType::Start, "started", None),
        };
        assert_eq!(appended.task_id(), task_id);
    }
}
