use chrono::{DateTime, TimeZone, Utc};
use taskweave_core::{Task, TaskStatus};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskRow {
    pub id: String,
    pub prompt: String,
    pub status: String,
    pub result: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TaskRow {
    pub fn into_domain(self) -> Task {
        Task {
            id: Uuid::parse_str(&self.id).unwrap_or_default(),
            prompt: self.prompt,
            status: TaskStatus::parse(&self.status).unwrap_or_default(),
            result: self.result.and_then(|s| serde_json::from_str(&s).ok()),
            created_at: timestamp_to_datetime(self.created_at),
            updated_at: timestamp_to_datetime(self.updated_at),
        }
    }
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            prompt: task.prompt.clone(),
            status: task.status.as_str().to_string(),
            result: task
                .result
                .as_ref()
                .and_then(|v| serde_json::to_string(v).ok()),
            created_at: datetime_to_timestamp(task.created_at),
            updated_at: datetime_to_timestamp(task.updated_at),
        }
    }
}

// Millisecond precision keeps event/task timestamps readable; the events
// table's seq column remains the authoritative tiebreaker.
pub(crate) fn timestamp_to_datetime(ts: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ts).single().unwrap_or_default()
}

pub(crate) fn datetime_to_timestamp(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}
