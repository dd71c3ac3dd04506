use crate::batch::{BatchResult, BatchSession};
use crate::pipeline::PipelineConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// High-level preview operation - equivalent to `batchname preview`
pub fn preview_operation(directory: &Path, config: &PipelineConfig) -> Result<BatchResult> {
    BatchSession::new()
        .preview(directory, config)
        .with_context(|| format!("Failed to preview renames in {}", directory.display()))
}
