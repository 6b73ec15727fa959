//! Use case: export session decisions to CSV.

use std::path::{Path, PathBuf};

use crate::models::ClassificationSession;
use crate::storage::export::export_csv;

/// Write the session's decisions to `path` and return it for display.
pub fn export(
    session: &ClassificationSession,
    path: &Path,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    export_csv(&session.decisions, path)?;
    log::info!(
        "[Export] Wrote {} decisions to {}",
        session.decisions.len(),
        path.display()
    );
    Ok(path.to_path_buf())
}
