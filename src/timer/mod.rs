pub mod controller;
pub mod state;
pub mod stats;

pub use controller::{CountdownTimer, StopBehavior, TimerHooks};
pub use stats::{SessionLog, SessionLogEntry, DEFAULT_LOG_PATH};
pub use state::{TimerState, TimerStatus};
