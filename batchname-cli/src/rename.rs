use anyhow::{Context, Result};
use batchname_core::{
    open_activity_sink, undo_operation, BatchSession, FinishedBatch, OutputFormatter,
    PipelineConfig,
};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::cli::OutputFormat;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn handle_rename(
    directory: &Path,
    config: &PipelineConfig,
    log_path: Option<&Path>,
    review: bool,
    output: OutputFormat,
    use_color: bool,
    interrupted: &AtomicBool,
) -> Result<()> {
    let session = BatchSession::new().with_boxed_activity(open_activity_sink(log_path));
    let task = session.spawn_apply(directory.to_path_buf(), config.clone());

    // A started batch always runs to completion so the undo log stays
    // consistent with the directory
    while !task.is_finished() {
        thread::sleep(POLL_INTERVAL);
    }
    let FinishedBatch {
        mut session,
        result,
    } = task.wait()?;
    let result =
        result.with_context(|| format!("Failed to rename files in {}", directory.display()))?;

    match output {
        OutputFormat::Json => println!("{}", result.format_json()),
        OutputFormat::Summary => print!("{}", result.render_summary(use_color)),
    }

    let can_prompt = io::stdin().is_terminal() && output == OutputFormat::Summary;
    if review
        && can_prompt
        && session.can_undo()
        && !interrupted.load(Ordering::SeqCst)
        && !prompt_keep_changes()?
    {
        let undo = undo_operation(&mut session);
        print!("{}", undo.format_summary());
    }

    Ok(())
}

fn prompt_keep_changes() -> Result<bool> {
    prompt_keep_changes_with_input(&mut io::stdin())
}

fn prompt_keep_changes_with_input<R: io::Read>(reader: &mut R) -> Result<bool> {
    let mut reader = io::BufReader::new(reader);
    loop {
        eprint!("\nKeep these changes? [Y/n]: ");
        io::stderr().flush()?;

        let mut input = String::new();
        if reader.read_line(&mut input)? == 0 {
            return Ok(true);
        }

        match input.trim().to_lowercase().as_str() {
            "" | "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => eprintln!("Invalid choice. Please enter y or n."),
        }
    }
}
