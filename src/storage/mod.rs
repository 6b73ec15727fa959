// Local persistence: config, session progress, CSV export

pub mod config;
pub mod export;
pub mod progress;

pub use config::UserConfig;
pub use progress::ProgressStore;
