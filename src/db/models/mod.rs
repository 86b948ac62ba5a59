pub mod step;
pub mod task;
pub mod user;

pub use step::TaskStep;
pub use task::{Task, TaskPatch, TaskStatus};
pub use user::User;
