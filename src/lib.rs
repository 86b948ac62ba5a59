pub mod auth;
pub mod db;
pub mod deadline;
pub mod settings;
pub mod timer;

pub use db::Database;
pub use settings::{SettingsStore, TimerSettings};
pub use timer::{CountdownTimer, SessionLog, SessionLogEntry, StopBehavior, TimerHooks};
