// Screen rendering: each screen returns the action the user picked, and
// the app applies it after the frame is laid out.

pub mod classify;
pub mod complete;
pub mod setup;

/// User intent collected from buttons and shortcuts during one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Decide(String),
    Skip,
    Undo,
    Export,
    Pause,
    RequestStopClear,
    ConfirmStopClear,
    CancelStopClear,
    SaveSetup,
}
