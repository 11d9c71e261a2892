use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use taskweave_core::{Task, TaskStatus};
use uuid::Uuid;

use crate::error::DbError;
use crate::models::TaskRow;

#[derive(Clone)]
pub struct TaskRepository {
    pool: SqlitePool,
}

impl TaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, task: &Task) -> Result<Task, DbError> {
        let row = TaskRow::from(task);

        sqlx::query(
            r#"
            INSERT INTO tasks (id, prompt, status, result, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.prompt)
        .bind(&row.status)
        .bind(&row.result)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(task.clone())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, DbError> {
        let row: Option<TaskRow> = sqlx::query_as(
            r#"
            SELECT id, prompt, status, result, created_at, updated_at
            FROM tasks
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_domain()))
    }

    /// All tasks, newest first. Ties on `created_at` keep insertion order.
    pub async fn find_all(&self) -> Result<Vec<Task>, DbError> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            r#"
            SELECT id, prompt, status, result, created_at, updated_at
            FROM tasks
            ORDER BY created_at DESC, rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_domain()).collect())
    }

    /// Move a task to `status`, refreshing `updated_at` and replacing
    /// `result` when one is given.
    ///
    /// Terminal tasks are immutable: updating one is rejected rather than
    /// silently applied.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: TaskStatus,
        result: Option<Value>,
    ) -> Result<Task, DbError> {
        let existing = self.find_by_id(id).await?;
        let Some(mut task) = existing else {
            return Err(DbError::TaskNotFound(id));
        };

        if task.status.is_terminal() {
            return Err(DbError::InvalidTransition {
                from: task.status.as_str().to_string(),
                to: status.as_str().to_string(),
            });
        }

        task.status = status;
        if result.is_some() {
            task.result = result;
        }
        task.updated_at = Utc::now();
        let row = TaskRow::from(&task);

        sqlx::query(
            r#"
            UPDATE tasks
            SET status = ?, result = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&row.status)
        .bind(&row.result)
        .bind(row.updated_at)
        .bind(&row.id)
        .execute(&self.pool)
        .await?;

        Ok(task)
    }
}
