use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};

use crate::db::{connection::Database, helpers::parse_datetime, models::TaskStep};

fn row_to_step(row: &Row) -> Result<TaskStep> {
    let created_at: String = row.get("created_at")?;

    Ok(TaskStep {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        title: row.get("title")?,
        is_done: row.get("is_done")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    pub async fn insert_step(&self, task_id: i64, title: String) -> Result<TaskStep> {
        self.execute(move |conn| {
            let created_at = Utc::now();
            conn.execute(
                "INSERT INTO task_steps (task_id, title, is_done, created_at)
                 VALUES (?1, ?2, 0, ?3)",
                params![task_id, title, created_at.to_rfc3339()],
            )
            .context("failed to insert step")?;

            Ok(TaskStep {
                id: conn.last_insert_rowid(),
                task_id,
                title,
                is_done: false,
                created_at,
            })
        })
        .await
    }

    pub async fn list_steps_for_task(&self, task_id: i64) -> Result<Vec<TaskStep>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, task_id, title, is_done, created_at
                 FROM task_steps
                 WHERE task_id = ?1
                 ORDER BY id",
            )?;

            let mut rows = stmt.query(params![task_id])?;
            let mut steps = Vec::new();
            while let Some(row) = rows.next()? {
                steps.push(row_to_step(row)?);
            }

            Ok(steps)
        })
        .await
    }

    /// Flip a step's done marker, returning the step when it exists.
    pub async fn toggle_step_done(&self, step_id: i64, task_id: i64) -> Result<Option<TaskStep>> {
        self.execute(move |conn| {
            conn.execute(
                "UPDATE task_steps
                 SET is_done = NOT is_done
                 WHERE id = ?1 AND task_id = ?2",
                params![step_id, task_id],
            )
            .context("failed to toggle step")?;

            fetch_step(conn, step_id, task_id)
        })
        .await
    }

    pub async fn rename_step(
        &self,
        step_id: i64,
        task_id: i64,
        title: String,
    ) -> Result<Option<TaskStep>> {
        self.execute(move |conn| {
            conn.execute(
                "UPDATE task_steps
                 SET title = ?1
                 WHERE id = ?2 AND task_id = ?3",
                params![title, step_id, task_id],
            )
            .context("failed to rename step")?;

            fetch_step(conn, step_id, task_id)
        })
        .await
    }

    pub async fn delete_step(&self, step_id: i64, task_id: i64) -> Result<bool> {
        self.execute(move |conn| {
            let affected = conn
                .execute(
                    "DELETE FROM task_steps WHERE id = ?1 AND task_id = ?2",
                    params![step_id, task_id],
                )
                .context("failed to delete step")?;
            Ok(affected > 0)
        })
        .await
    }
}

fn fetch_step(
    conn: &rusqlite::Connection,
    step_id: i64,
    task_id: i64,
) -> Result<Option<TaskStep>> {
    let mut stmt = conn.prepare(
        "SELECT id, task_id, title, is_done, created_at
         FROM task_steps
         WHERE id = ?1 AND task_id = ?2",
    )?;

    let mut rows = stmt.query(params![step_id, task_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_step(row)?)),
        None => Ok(None),
    }
}
