use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_optional_datetime, parse_task_status},
    models::{Task, TaskPatch, TaskStatus},
};

fn row_to_task(row: &Row) -> Result<Task> {
    let status: String = row.get("status")?;
    let deadline: Option<String> = row.get("deadline")?;
    let created_at: String = row.get("created_at")?;

    Ok(Task {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: parse_task_status(&status)?,
        deadline: parse_optional_datetime(deadline, "deadline")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    pub async fn insert_task(
        &self,
        user_id: i64,
        title: String,
        description: Option<String>,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<Task> {
        self.execute(move |conn| {
            let created_at = Utc::now();
            conn.execute(
                "INSERT INTO tasks (user_id, title, description, status, deadline, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user_id,
                    title,
                    description,
                    TaskStatus::Active.as_str(),
                    deadline.map(|dt| dt.to_rfc3339()),
                    created_at.to_rfc3339(),
                ],
            )
            .context("failed to insert task")?;

            Ok(Task {
                id: conn.last_insert_rowid(),
                user_id,
                title,
                description,
                status: TaskStatus::Active,
                deadline,
                created_at,
            })
        })
        .await
    }

    pub async fn list_tasks_for_user(&self, user_id: i64) -> Result<Vec<Task>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, title, description, status, deadline, created_at
                 FROM tasks
                 WHERE user_id = ?1
                 ORDER BY created_at",
            )?;

            let mut rows = stmt.query(params![user_id])?;
            let mut tasks = Vec::new();
            while let Some(row) = rows.next()? {
                tasks.push(row_to_task(row)?);
            }

            Ok(tasks)
        })
        .await
    }

    /// Fetch one task, scoped to its owner.
    pub async fn get_task(&self, task_id: i64, user_id: i64) -> Result<Option<Task>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, title, description, status, deadline, created_at
                 FROM tasks
                 WHERE id = ?1 AND user_id = ?2",
            )?;

            let mut rows = stmt.query(params![task_id, user_id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_task(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    /// Apply a partial update. Unset patch fields keep their stored value.
    pub async fn update_task(
        &self,
        task_id: i64,
        user_id: i64,
        patch: TaskPatch,
    ) -> Result<Option<Task>> {
        self.execute(move |conn| {
            conn.execute(
                "UPDATE tasks
                 SET title = COALESCE(?1, title),
                     description = COALESCE(?2, description),
                     status = COALESCE(?3, status),
                     deadline = COALESCE(?4, deadline)
                 WHERE id = ?5 AND user_id = ?6",
                params![
                    patch.title,
                    patch.description,
                    patch.status.map(|s| s.as_str()),
                    patch.deadline.map(|dt| dt.to_rfc3339()),
                    task_id,
                    user_id,
                ],
            )
            .context("failed to update task")?;

            let mut stmt = conn.prepare(
                "SELECT id, user_id, title, description, status, deadline, created_at
                 FROM tasks
                 WHERE id = ?1 AND user_id = ?2",
            )?;
            let mut rows = stmt.query(params![task_id, user_id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_task(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    /// Delete a task; its steps cascade away with it.
    pub async fn delete_task(&self, task_id: i64, user_id: i64) -> Result<bool> {
        self.execute(move |conn| {
            let affected = conn
                .execute(
                    "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
                    params![task_id, user_id],
                )
                .context("failed to delete task")?;
            Ok(affected > 0)
        })
        .await
    }
}
