//! Name derivation.
//!
//! Everything here is pure: no filesystem access and no clock reads. The
//! batch date is handed in by the caller so that every file of one batch
//! gets the same stamp.

use crate::pipeline::{PipelineConfig, RegexMode};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]").unwrap());
static WHITESPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SPECIAL_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

const UPDATED_SUFFIX: &str = "_updated";

/// Split a file name into stem and extension.
///
/// The extension starts at the last `.` and keeps it (`"a.tar.gz"` gives
/// `("a.tar", ".gz")`). Names without a dot have an empty extension.
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) => file_name.split_at(idx),
        None => (file_name, ""),
    }
}

/// Apply the predefined pattern substitution
pub fn apply_regex_mode(name: &str, mode: RegexMode) -> String {
    match mode {
        RegexMode::None => name.to_string(),
        RegexMode::RemoveNumbers => DIGITS.replace_all(name, "").into_owned(),
        RegexMode::ReplaceSpaces => WHITESPACE_RUNS.replace_all(name, "_").into_owned(),
        RegexMode::RemoveSpecialChars => SPECIAL_CHARS.replace_all(name, "").into_owned(),
        RegexMode::AppendUpdatedSuffix => format!("{}{}", name, UPDATED_SUFFIX),
    }
}

/// Derive the candidate stem for one file.
///
/// `sequence_index` is the 1-based position of the file among the files
/// renamed so far in the batch; it only shows up in the result when
/// sequential numbering is enabled.
pub fn transform(
    stem: &str,
    sequence_index: usize,
    config: &PipelineConfig,
    date: NaiveDate,
) -> String {
    let mut name = match config.find_replace() {
        Some((find, replace)) => stem.replace(find, replace),
        None => stem.to_string(),
    };

    name = apply_regex_mode(&name, config.regex_mode);

    if let Some(prefix) = config.prefix() {
        name.insert_str(0, prefix);
    }

    if let Some(suffix) = config.suffix() {
        name.push_str(suffix);
    }

    if config.replace_spaces_with_underscore {
        name = name.replace(' ', "_");
    }

    if config.append_date {
        name = format!("{}_{}", name, date.format("%Y-%m-%d"));
    }

    if config.sequential_numbering {
        name = format!("{}_{:03}", name, sequence_index);
    }

    name
}

/// A pipeline bound to the date of one batch
#[derive(Debug, Clone)]
pub struct NameTransformer<'a> {
    config: &'a PipelineConfig,
    date: NaiveDate,
}

impl<'a> NameTransformer<'a> {
    pub fn new(config: &'a PipelineConfig, date: NaiveDate) -> Self {
        Self { config, date }
    }

    /// Full new file name, extension reattached verbatim
    pub fn new_name(&self, file_name: &str, sequence_index: usize) -> String {
        let (stem, extension) = split_extension(file_name);
        let mut name = transform(stem, sequence_index, self.config, self.date);
        name.push_str(extension);
        name
    }
}
