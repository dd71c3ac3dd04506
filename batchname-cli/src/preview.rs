use anyhow::Result;
use batchname_core::{preview_operation, OutputFormatter, PipelineConfig};
use std::path::Path;

use crate::cli::OutputFormat;

pub fn handle_preview(
    directory: &Path,
    config: &PipelineConfig,
    output: OutputFormat,
    fixed_table_width: bool,
    use_color: bool,
) -> Result<()> {
    let result = preview_operation(directory, config)?;

    match output {
        OutputFormat::Json => println!("{}", result.format_json()),
        OutputFormat::Summary => {
            if !result.renamed.is_empty() || !result.skipped.is_empty() {
                println!("{}", result.render_table(use_color, fixed_table_width));
                println!();
            }
            print!("{}", result.render_totals());
        },
    }

    Ok(())
}
