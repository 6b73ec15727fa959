// Domain value types shared across the app

pub mod decision;
pub mod session;
pub mod suggestion;
pub mod theme;
pub mod track;

// Re-export commonly used types
pub use decision::Decision;
pub use session::{ClassificationSession, SessionState};
pub use suggestion::Suggestion;
pub use theme::Theme;
pub use track::Track;
