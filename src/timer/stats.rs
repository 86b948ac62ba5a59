use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOG_PATH: &str = "stats.json";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One completed or stopped countdown session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionLogEntry {
    pub timestamp: String,
    pub duration_minutes: f64,
}

/// Append-only JSON log of session durations.
///
/// Appending reads the whole collection back, pushes one entry and rewrites
/// the file. A missing or unparseable file reads as an empty collection.
/// Only one writer per log file is assumed.
#[derive(Clone)]
pub struct SessionLog {
    path: Arc<PathBuf>,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    pub fn entries(&self) -> Vec<SessionLogEntry> {
        let raw = match fs::read_to_string(self.path.as_path()) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }

    pub fn append(&self, elapsed_secs: u64) -> Result<()> {
        let mut entries = self.entries();
        entries.push(SessionLogEntry {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            duration_minutes: round_to_minutes(elapsed_secs),
        });

        let serialized = serde_json::to_string_pretty(&entries)?;
        fs::write(self.path.as_path(), serialized)
            .with_context(|| format!("failed to write session log to {}", self.path.display()))
    }
}

/// Seconds to minutes, rounded to two decimal places.
fn round_to_minutes(elapsed_secs: u64) -> f64 {
    (elapsed_secs as f64 / 60.0 * 100.0).round() / 100.0
}
