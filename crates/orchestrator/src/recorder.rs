use db::{DbError, EventRepository};
use events::{Event, EventBus};
use serde_json::Value;
use taskweave_core::{EventType, TaskEvent};
use tracing::debug;
use uuid::Uuid;

/// Records agent events: appends them to the store, then publishes them on
/// the bus so live subscribers see them without polling.
///
/// The store write happens first so the assigned sequence number travels
/// with the published event.
#[derive(Clone)]
pub struct EventRecorder {
    events: EventRepository,
    bus: EventBus,
}

impl EventRecorder {
    pub fn new(events: EventRepository, bus: EventBus) -> Self {
        Self { events, bus }
    }

    pub async fn record(
        &self,
        task_id: Uuid,
        agent_name: &str,
        event_type: EventType,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Result<TaskEvent, DbError> {
        let message = message.into();
        let event = TaskEvent::new(task_id, agent_name, event_type, message.clone(), details);
        let stored = self.events.insert(&event).await?;

        debug!(
            task_id = %task_id,
            agent = agent_name,
            kind = event_type.as_str(),
            "{}", message
        );

        self.bus.publish(Event::AgentEvent {
            event: stored.clone(),
        });
        Ok(stored)
    }

    /// Shorthand for the `info` progress events agents emit while working.
    pub async fn info(
        &self,
        task_id: Uuid,
        agent_name: &str,
        message: impl Into<String>,
    ) -> Result<TaskEvent, DbError> {
        self.record(task_id, agent_name, EventType::Info, message, None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::{create_pool, run_migrations, TaskRepository};
    use taskweave_core::Task;
    use tempfile::TempDir;

    async fn setup() -> (EventRecorder, EventRepository, EventBus, Uuid, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let url = format!("sqlite:{}", temp_dir.path().join("test.db").display());
        let pool = create_pool(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let task = Task::new("record me");
        TaskRepository::new(pool.clone())
            .create(&task)
            .await
            .unwrap();

        let events = EventRepository::new(pool);
        let bus = EventBus::new();
        let recorder = EventRecorder::new(events.clone(), bus.clone());
        (recorder, events, bus, task.id, temp_dir)
    }

    #[tokio::test]
    async fn test_record_persists_and_publishes() {
        let (recorder, events, bus, task_id, _dir) = setup().await;
        let mut rx = bus.subscribe();

        let stored = recorder
            .record(task_id, "Planner", EventType::Start, "started", None)
            .await
            .unwrap();
        assert!(stored.seq > 0);

        let in_store = events.find_by_task(task_id).await.unwrap();
        assert_eq!(in_store.len(), 1);
        assert_eq!(in_store[0].id, stored.id);

        match rx.recv().await.unwrap() {
            Event::AgentEvent { event } => {
                assert_eq!(event.id, stored.id);
                assert_eq!(event.seq, stored.seq);
            }
            other => panic!("unexpected bus event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_info_shorthand() {
        let (recorder, events, _bus, task_id, _dir) = setup().await;

        recorder
            .info(task_id, "Writer", "Writing Conclusion")
            .await
            .unwrap();

        let in_store = events.find_by_task(task_id).await.unwrap();
        assert_eq!(in_store[0].event_type, EventType::Info);
        assert_eq!(in_store[0].agent_name, "Writer");
        assert!(in_store[0].details.is_none());
    }
}
