use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ordered step inside a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStep {
    pub id: i64,
    pub task_id: i64,
    pub title: String,
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
}
