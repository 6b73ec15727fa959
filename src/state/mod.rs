pub mod background_tasks;

pub use background_tasks::{AuthOutcome, BackgroundTasks};
