use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::timer::{StopBehavior, DEFAULT_LOG_PATH};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    pub default_minutes: u64,
    pub default_seconds: u64,
    pub stats_path: String,
    pub stop_behavior: StopBehavior,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            default_minutes: 0,
            default_seconds: 0,
            stats_path: DEFAULT_LOG_PATH.into(),
            stop_behavior: StopBehavior::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UserSettings {
    timer: TimerSettings,
}

/// JSON-backed settings, read once and written through on update.
///
/// A missing or unparseable file falls back to defaults.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn timer(&self) -> TimerSettings {
        self.data.read().unwrap().timer.clone()
    }

    pub fn update_timer(&self, settings: TimerSettings) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            guard.timer = settings;
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        let timer = store.timer();
        assert_eq!(timer.default_minutes, 0);
        assert_eq!(timer.stats_path, DEFAULT_LOG_PATH);
        assert_eq!(timer.stop_behavior, StopBehavior::LogElapsed);
    }

    #[test]
    fn update_writes_through_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        store
            .update_timer(TimerSettings {
                default_minutes: 25,
                default_seconds: 0,
                stats_path: "focus.json".into(),
                stop_behavior: StopBehavior::DiscardAndRewind,
            })
            .unwrap();

        let reopened = SettingsStore::new(path).unwrap();
        let timer = reopened.timer();
        assert_eq!(timer.default_minutes, 25);
        assert_eq!(timer.stats_path, "focus.json");
        assert_eq!(timer.stop_behavior, StopBehavior::DiscardAndRewind);
    }

    #[test]
    fn garbled_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ nope").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.timer().default_seconds, 0);
    }
}
