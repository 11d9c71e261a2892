use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Start,
    Success,
    Error,
    Retry,
    #[default]
    Info,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Success => "success",
            Self::Error => "error",
            Self::Retry => "retry",
            Self::Info => "info",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "start" => Some(Self::Start),
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            "retry" => Some(Self::Retry),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

/// One append-only log entry in a task's execution history.
///
/// `seq` is assigned by the store on insert and breaks `created_at` ties so
/// per-task ordering is total. It is store-internal and stays off the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskEvent {
    pub id: Uuid,
    pub task_id: Uuid,
    pub agent_name: String,
    pub event_type: EventType,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip)]
    pub seq: i64,
}

impl TaskEvent {
    pub fn new(
        task_id: Uuid,
        agent_name: impl Into<String>,
        event_type: EventType,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            agent_name: agent_name.into(),
            event_type,
            message: message.into(),
            created_at: Utc::now(),
            details,
            seq: 0,
        }
    }
}
