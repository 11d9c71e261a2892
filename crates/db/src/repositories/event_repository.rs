use sqlx::SqlitePool;
use taskweave_core::TaskEvent;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::EventRow;

#[derive(Clone)]
pub struct EventRepository {
    pool: SqlitePool,
}

impl EventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append an event, returning it with the store-assigned sequence number.
    pub async fn insert(&self, event: &TaskEvent) -> Result<TaskEvent, DbError> {
        let row = EventRow::from(event);

        let result = sqlx::query(
            r#"
            INSERT INTO events (id, task_id, agent_name, event_type, message, details, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.task_id)
        .bind(&row.agent_name)
        .bind(&row.event_type)
        .bind(&row.message)
        .bind(&row.details)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;

        let mut stored = event.clone();
        stored.seq = result.last_insert_rowid();
        Ok(stored)
    }

    /// All events for a task in log order: `created_at` ascending, ties
    /// broken by the assigned sequence number.
    pub async fn find_by_task(&self, task_id: Uuid) -> Result<Vec<TaskEvent>, DbError> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r#"
            SELECT seq, id, task_id, agent_name, event_type, message, details, created_at
            FROM events
            WHERE task_id = ?
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(task_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_domain()).collect())
    }

    /// Events for a task appended after `seq`, in log order.
    pub async fn find_by_task_after(
        &self,
        task_id: Uuid,
        seq: i64,
    ) -> Result<Vec<TaskEvent>, DbError> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r#"
            SELECT seq, id, task_id, agent_name, event_type, message, details, created_at
            FROM events
            WHERE task_id = ? AND seq > ?
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(task_id.to_string())
        .bind(seq)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_domain()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::TaskRepository;
    use crate::{create_pool, run_migrations};
    use serde_json::json;
    use taskweave_core::{EventType, Task};
    use tempfile::TempDir;

    async fn setup_test_db() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let url = format!("sqlite:{}", temp_dir.path().join("test.db").display());
        let pool = create_pool(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (pool, temp_dir)
    }

    async fn insert_task(pool: &SqlitePool) -> Task {
        let task = Task::new("event host");
        TaskRepository::new(pool.clone())
            .create(&task)
            .await
            .unwrap();
        task
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_seq() {
        let (pool, _dir) = setup_test_db().await;
        let task = insert_task(&pool).await;
        let repo = EventRepository::new(pool);

        let first = repo
            .insert(&TaskEvent::new(
                task.id,
                "Planner",
                EventType::Start,
                "started",
                None,
            ))
            .await
            .unwrap();
        let second = repo
            .insert(&TaskEvent::new(
                task.id,
                "Planner",
                EventType::Info,
                "thinking",
                None,
            ))
            .await
            .unwrap();

        assert!(first.seq > 0);
        assert!(second.seq > first.seq);
    }

    #[tokio::test]
    async fn test_find_by_task_in_log_order() {
        let (pool, _dir) = setup_test_db().await;
        let task = insert_task(&pool).await;
        let other = insert_task(&pool).await;
        let repo = EventRepository::new(pool);

        for message in ["one", "two", "three"] {
            repo.insert(&TaskEvent::new(
                task.id,
                "Planner",
                EventType::Info,
                message,
                None,
            ))
            .await
            .unwrap();
        }
        repo.insert(&TaskEvent::new(
            other.id,
            "Writer",
            EventType::Info,
            "unrelated",
            None,
        ))
        .await
        .unwrap();

        let events = repo.find_by_task(task.id).await.unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events.iter().map(|e| e.message.as_str()).collect::<Vec<_>>(),
            vec!["one", "two", "three"]
        );
        assert!(events.windows(2).all(|w| w[0].seq < w[1].seq));
    }

    #[tokio::test]
    async fn test_find_by_task_after() {
        let (pool, _dir) = setup_test_db().await;
        let task = insert_task(&pool).await;
        let repo = EventRepository::new(pool);

        let mut seqs = Vec::new();
        for message in ["a", "b", "c", "d"] {
            let stored = repo
                .insert(&TaskEvent::new(
                    task.id,
                    "Researcher",
                    EventType::Info,
                    message,
                    None,
                ))
                .await
                .unwrap();
            seqs.push(stored.seq);
        }

        let tail = repo.find_by_task_after(task.id, seqs[1]).await.unwrap();
        assert_eq!(
            tail.iter().map(|e| e.message.as_str()).collect::<Vec<_>>(),
            vec!["c", "d"]
        );

        let none = repo.find_by_task_after(task.id, seqs[3]).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_details_round_trip() {
        let (pool, _dir) = setup_test_db().await;
        let task = insert_task(&pool).await;
        let repo = EventRepository::new(pool);

        repo.insert(&TaskEvent::new(
            task.id,
            "Reviewer",
            EventType::Success,
            "approved",
            Some(json!({"action": "APPROVE", "approved": true})),
        ))
        .await
        .unwrap();

        let events = repo.find_by_task(task.id).await.unwrap();
        let details = events[0].details.as_ref().unwrap();
        assert_eq!(details["action"], "APPROVE");
        assert_eq!(details["approved"], true);
    }
}
