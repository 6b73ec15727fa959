// One file per user action, composing engine, sync, and persistence

pub mod check_update;
pub mod classify_track;
pub mod export_session;
pub mod resume_session;
pub mod undo_decision;
