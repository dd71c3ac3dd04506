use crate::activity::{ActivitySink, FileActivityLog, NullActivityLog};
use crate::batch::{BatchResult, BatchSession, UndoResult};
use crate::filesystem::FileSystem;
use crate::pipeline::PipelineConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Open the activity log at `path`, or a sink that drops everything when
/// logging is disabled. A log that cannot be opened is reported and
/// replaced by the null sink; it never blocks a rename.
pub fn open_activity_sink(path: Option<&Path>) -> Box<dyn ActivitySink> {
    match path {
        Some(path) => match FileActivityLog::open(path) {
            Ok(log) => Box::new(log),
            Err(e) => {
                eprintln!("Warning: {e:#}. Continuing without an activity log.");
                Box::new(NullActivityLog)
            },
        },
        None => Box::new(NullActivityLog),
    }
}

/// High-level rename operation - equivalent to `batchname rename`
pub fn rename_operation<F: FileSystem>(
    session: &mut BatchSession<F>,
    directory: &Path,
    config: &PipelineConfig,
) -> Result<BatchResult> {
    session
        .apply_batch(directory, config)
        .with_context(|| format!("Failed to rename files in {}", directory.display()))
}

/// Revert whatever the session's last batch did
pub fn undo_operation<F: FileSystem>(session: &mut BatchSession<F>) -> UndoResult {
    session.undo_batch()
}
