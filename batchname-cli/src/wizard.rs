//! Question-by-question front end for people who would rather not learn
//! the flags.

use anyhow::Result;
use batchname_core::{
    open_activity_sink, rename_operation, undo_operation, BatchError, BatchSession,
    PipelineConfig,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

pub fn handle_wizard(base: &PipelineConfig, log_path: Option<&Path>) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    run_wizard(&mut input, &mut output, base, log_path)
}

/// Answers collected from the user
#[derive(Debug, PartialEq)]
struct WizardAnswers {
    directory: PathBuf,
    config: PipelineConfig,
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{}", question)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn ask_yes_no<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<bool> {
    Ok(ask(input, output, question)?.trim().eq_ignore_ascii_case("y"))
}

fn collect_answers<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    base: &PipelineConfig,
) -> Result<WizardAnswers> {
    let directory = PathBuf::from(ask(
        input,
        output,
        "Enter the directory path of files to rename: ",
    )?
    .trim());
    if !directory.is_dir() {
        writeln!(output, "Directory does not exist.")?;
        return Err(BatchError::DirectoryNotFound { path: directory }.into());
    }

    let prefix = ask(input, output, "Enter a prefix to add (leave blank for none): ")?;
    let suffix = ask(input, output, "Enter a suffix to add (leave blank for none): ")?;
    let underscores = ask_yes_no(input, output, "Replace spaces with underscores? (y/n): ")?;
    let date = ask_yes_no(
        input,
        output,
        "Add the current date to the file names? (y/n): ",
    )?;
    let sequence = ask_yes_no(input, output, "Rename files with sequential numbers? (y/n): ")?;

    let answered = PipelineConfig::new()
        .with_prefix(prefix)
        .with_suffix(suffix)
        .with_underscores(underscores)
        .with_date(date)
        .with_sequence(sequence);

    Ok(WizardAnswers {
        directory,
        config: base.merged_with(&answered),
    })
}

pub fn run_wizard<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    base: &PipelineConfig,
    log_path: Option<&Path>,
) -> Result<()> {
    let answers = collect_answers(input, output, base)?;

    let mut session = BatchSession::new().with_boxed_activity(open_activity_sink(log_path));
    let result = rename_operation(&mut session, &answers.directory, &answers.config)?;

    writeln!(output)?;
    for entry in &result.renamed {
        writeln!(
            output,
            "Renamed: {} -> {}",
            entry.original_name, entry.new_name
        )?;
    }
    for skipped in &result.skipped {
        writeln!(output, "Skipped: {} ({})", skipped.name, skipped.reason)?;
    }
    writeln!(
        output,
        "\n{} of {} files renamed.",
        result.renamed_count, result.total_eligible_count
    )?;

    if session.can_undo() && ask_yes_no(input, output, "Undo these changes? (y/n): ")? {
        let undo = undo_operation(&mut session);
        for failure in &undo.failures {
            writeln!(
                output,
                "Could not revert {}: {}",
                failure.from.display(),
                failure.error
            )?;
        }
        writeln!(output, "Reverted {} files.", undo.reverted)?;
    }

    Ok(())
}
