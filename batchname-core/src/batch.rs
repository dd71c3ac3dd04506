//! Batch renaming and undo.
//!
//! A [`BatchSession`] owns the undo log of the most recent batch. Each call
//! to [`BatchSession::apply_batch`] lists the directory once, derives a new
//! name for every eligible file and renames them one after another. Files
//! are processed strictly in sequence: the collision check and the sequence
//! counter both depend on the outcome of earlier files.

use crate::activity::{ActivityEvent, ActivitySink, NullActivityLog};
use crate::error::BatchError;
use crate::filesystem::{is_case_only_change, rename_entry, DirEntryInfo, FileSystem, StdFileSystem};
use crate::pipeline::{ListingOrder, PipelineConfig};
use crate::transform::{split_extension, NameTransformer};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Why a file was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The derived name is already taken (case-insensitively)
    NameCollision,
    /// The filesystem refused the rename
    RenameFailed,
    /// The derived name equals the current one
    Unchanged,
    /// The derived name is empty or contains a path separator
    InvalidName,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NameCollision => "name collision",
            Self::RenameFailed => "rename failed",
            Self::Unchanged => "unchanged",
            Self::InvalidName => "invalid name",
        };
        f.write_str(text)
    }
}

/// One planned or performed rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameEntry {
    pub original_path: PathBuf,
    pub original_name: String,
    pub new_name: String,
    pub new_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub name: String,
    pub reason: SkipReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Outcome of a batch (or of a dry run)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub directory: PathBuf,
    pub renamed_count: usize,
    /// Non-hidden regular files in the directory, before the extension
    /// filter is applied
    pub total_eligible_count: usize,
    pub skipped: Vec<SkippedFile>,
    pub renamed: Vec<RenameEntry>,
    pub dry_run: bool,
}

impl BatchResult {
    pub fn skipped_with(&self, reason: SkipReason) -> impl Iterator<Item = &SkippedFile> {
        self.skipped.iter().filter(move |s| s.reason == reason)
    }
}

/// New path -> original path for every rename of the latest batch, in the
/// order the renames happened
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoLog {
    entries: Vec<(PathBuf, PathBuf)>,
}

impl UndoLog {
    pub fn record(&mut self, new_path: PathBuf, original_path: PathBuf) {
        self.entries.push((new_path, original_path));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Original path of the file now living at `new_path`
    pub fn original_of(&self, new_path: &Path) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(new, _)| new == new_path)
            .map(|(_, original)| original.as_path())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn take(&mut self) -> Vec<(PathBuf, PathBuf)> {
        std::mem::take(&mut self.entries)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoFailure {
    /// Where the file was expected (its renamed path)
    pub from: PathBuf,
    /// The original path it should have gone back to
    pub to: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoResult {
    pub reverted: usize,
    /// Entries left alone because their renamed name is hidden
    pub skipped_hidden: usize,
    pub failures: Vec<UndoFailure>,
}

/// Case-insensitive multiset of the names currently in the directory
#[derive(Debug, Default)]
struct NameIndex {
    counts: HashMap<String, usize>,
}

impl NameIndex {
    fn key(name: &str) -> String {
        name.to_lowercase()
    }

    fn from_entries(entries: &[DirEntryInfo]) -> Self {
        let mut index = Self::default();
        for entry in entries {
            index.insert(&entry.name);
        }
        index
    }

    fn insert(&mut self, name: &str) {
        *self.counts.entry(Self::key(name)).or_insert(0) += 1;
    }

    fn remove(&mut self, name: &str) {
        let key = Self::key(name);
        if let Some(count) = self.counts.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&key);
            }
        }
    }

    fn count(&self, name: &str) -> usize {
        self.counts.get(&Self::key(name)).copied().unwrap_or(0)
    }

    /// Whether `candidate` is taken by anything other than `current` itself
    fn collides(&self, current: &str, candidate: &str) -> bool {
        let mut taken = self.count(candidate);
        if Self::key(current) == Self::key(candidate) {
            taken = taken.saturating_sub(1);
        }
        taken > 0
    }

    fn moved(&mut self, from: &str, to: &str) {
        self.remove(from);
        self.insert(to);
    }
}

fn invalid_name_reason(name: &str) -> Option<&'static str> {
    let (stem, _) = split_extension(name);
    if name.is_empty() || stem.is_empty() {
        Some("derived name is empty")
    } else if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
        Some("derived name contains a path separator")
    } else if name == "." || name == ".." {
        Some("derived name is reserved")
    } else {
        None
    }
}

/// Caller-owned state for batch renames in one process
pub struct BatchSession<F: FileSystem = StdFileSystem> {
    fs: F,
    activity: Box<dyn ActivitySink>,
    undo_log: UndoLog,
    date: Option<NaiveDate>,
}

impl BatchSession<StdFileSystem> {
    pub fn new() -> Self {
        Self::with_fs(StdFileSystem)
    }
}

impl Default for BatchSession<StdFileSystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FileSystem> fmt::Debug for BatchSession<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchSession")
            .field("undo_log", &self.undo_log)
            .field("date", &self.date)
            .finish_non_exhaustive()
    }
}

impl<F: FileSystem> BatchSession<F> {
    pub fn with_fs(fs: F) -> Self {
        Self {
            fs,
            activity: Box::new(NullActivityLog),
            undo_log: UndoLog::default(),
            date: None,
        }
    }

    /// Send activity records to `sink` instead of discarding them
    pub fn with_activity(mut self, sink: impl ActivitySink + 'static) -> Self {
        self.activity = Box::new(sink);
        self
    }

    pub fn with_boxed_activity(mut self, sink: Box<dyn ActivitySink>) -> Self {
        self.activity = sink;
        self
    }

    /// Name of the activity log file when it lives directly in `directory`.
    /// The batch never renames it.
    fn activity_log_name(&self, directory: &Path) -> Option<String> {
        let log = self.activity.file_path()?;
        let parent = log.parent()?;
        let same_directory = parent == directory
            || std::fs::canonicalize(directory).is_ok_and(|dir| dir == parent);
        if same_directory {
            log.file_name().map(|name| name.to_string_lossy().into_owned())
        } else {
            None
        }
    }

    /// Pin the date used for date stamps instead of reading the local clock
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn undo_log(&self) -> &UndoLog {
        &self.undo_log
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_log.is_empty()
    }

    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    fn batch_date(&self) -> NaiveDate {
        self.date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Rename every eligible file in `directory`.
    ///
    /// Replaces the undo log of the previous batch once the directory has
    /// been listed. Individual collisions and rename failures are reported
    /// in the result and never abort the batch.
    pub fn apply_batch(
        &mut self,
        directory: &Path,
        config: &PipelineConfig,
    ) -> Result<BatchResult, BatchError> {
        let entries = self.list(directory)?;
        self.undo_log.clear();
        self.activity.record(ActivityEvent::BatchStarted {
            directory: directory.to_path_buf(),
        });

        let case_insensitive = self.fs.is_case_insensitive(directory);
        let date = self.batch_date();
        let reserved = self.activity_log_name(directory);
        let result = run_batch(
            directory,
            &entries,
            reserved.as_deref(),
            config,
            date,
            &mut Mode::Apply {
                fs: &self.fs,
                case_insensitive,
                undo_log: &mut self.undo_log,
                activity: self.activity.as_mut(),
            },
        );

        self.activity.record(ActivityEvent::BatchFinished {
            renamed: result.renamed_count,
            total: result.total_eligible_count,
        });
        Ok(result)
    }

    /// Work out what [`apply_batch`](Self::apply_batch) would do without
    /// touching disk or the undo log
    pub fn preview(
        &self,
        directory: &Path,
        config: &PipelineConfig,
    ) -> Result<BatchResult, BatchError> {
        let entries = self.list(directory)?;
        let reserved = self.activity_log_name(directory);
        Ok(run_batch(
            directory,
            &entries,
            reserved.as_deref(),
            config,
            self.batch_date(),
            &mut Mode::<F>::DryRun,
        ))
    }

    /// Revert the latest batch, newest rename first.
    ///
    /// The log is cleared whatever happens, so a failed reversal cannot be
    /// retried later. An empty log is a no-op.
    pub fn undo_batch(&mut self) -> UndoResult {
        let entries = self.undo_log.take();
        let mut result = UndoResult::default();
        if entries.is_empty() {
            return result;
        }

        let case_insensitive = entries
            .first()
            .and_then(|(new, _)| new.parent())
            .is_some_and(|dir| self.fs.is_case_insensitive(dir));

        for (new_path, original_path) in entries.iter().rev() {
            let new_name = file_name_of(new_path);
            let original_name = file_name_of(original_path);

            if new_name.starts_with('.') {
                result.skipped_hidden += 1;
                continue;
            }

            // On a case-insensitive backend `exists` would find the file itself
            let finds_itself = case_insensitive && is_case_only_change(&new_name, &original_name);
            let outcome = if !finds_itself && self.fs.exists(original_path) {
                Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "original name is taken",
                ))
            } else {
                rename_entry(&self.fs, new_path, original_path, case_insensitive)
            };

            match outcome {
                Ok(()) => {
                    result.reverted += 1;
                    self.activity.record(ActivityEvent::Reverted {
                        from: new_name,
                        to: original_name,
                    });
                },
                Err(e) => {
                    self.activity.record(ActivityEvent::UndoFailed {
                        from: new_name,
                        to: original_name,
                        error: e.to_string(),
                    });
                    result.failures.push(UndoFailure {
                        from: new_path.clone(),
                        to: original_path.clone(),
                        error: e.to_string(),
                    });
                },
            }
        }

        result
    }

    fn list(&self, directory: &Path) -> Result<Vec<DirEntryInfo>, BatchError> {
        self.fs
            .list(directory)
            .map_err(|source| BatchError::from_listing(directory.to_path_buf(), source))
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

enum Mode<'a, F: FileSystem> {
    DryRun,
    Apply {
        fs: &'a F,
        case_insensitive: bool,
        undo_log: &'a mut UndoLog,
        activity: &'a mut dyn ActivitySink,
    },
}

impl<F: FileSystem> Mode<'_, F> {
    fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun)
    }

    /// Live re-check for names that appeared after the listing was taken.
    ///
    /// Matches case-insensitively on every backend. A case-insensitive
    /// backend answers `exists` for the file itself on a case-only change,
    /// so that case is left to the in-memory index.
    fn name_taken_on_disk(&self, directory: &Path, entry: &RenameEntry) -> bool {
        let case_only = is_case_only_change(&entry.original_name, &entry.new_name);
        match self {
            Self::DryRun => false,
            Self::Apply {
                fs,
                case_insensitive: true,
                ..
            } => !case_only && fs.exists(&entry.new_path),
            Self::Apply { fs, .. } => {
                fs.exists(&entry.new_path)
                    || fs
                        .names_matching(directory, &entry.new_name)
                        .is_ok_and(|found| found.iter().any(|name| *name != entry.original_name))
            },
        }
    }

    fn rename(&mut self, entry: &RenameEntry) -> io::Result<()> {
        match self {
            Self::DryRun => Ok(()),
            Self::Apply {
                fs,
                case_insensitive,
                undo_log,
                activity,
            } => {
                rename_entry(*fs, &entry.original_path, &entry.new_path, *case_insensitive)?;
                undo_log.record(entry.new_path.clone(), entry.original_path.clone());
                activity.record(ActivityEvent::Renamed {
                    original: entry.original_name.clone(),
                    new: entry.new_name.clone(),
                });
                Ok(())
            },
        }
    }

    fn skipped(&mut self, skip: &SkippedFile) {
        if let Self::Apply { activity, .. } = self {
            activity.record(ActivityEvent::Skipped {
                name: skip.name.clone(),
                reason: skip.reason,
                detail: skip.detail.clone(),
            });
        }
    }
}

fn run_batch<F: FileSystem>(
    directory: &Path,
    entries: &[DirEntryInfo],
    reserved: Option<&str>,
    config: &PipelineConfig,
    date: NaiveDate,
    mode: &mut Mode<'_, F>,
) -> BatchResult {
    let mut result = BatchResult {
        directory: directory.to_path_buf(),
        dry_run: mode.is_dry_run(),
        ..BatchResult::default()
    };

    let mut names = NameIndex::from_entries(entries);

    let eligible: Vec<&DirEntryInfo> = entries
        .iter()
        .filter(|e| e.is_file() && !e.is_hidden() && reserved != Some(e.name.as_str()))
        .collect();
    result.total_eligible_count = eligible.len();

    let mut candidates: Vec<&DirEntryInfo> = eligible
        .into_iter()
        .filter(|e| config.accepts_extension(split_extension(&e.name).1))
        .collect();
    if config.order == ListingOrder::Name {
        candidates.sort_by(|a, b| a.name.cmp(&b.name));
    }

    let transformer = NameTransformer::new(config, date);

    for entry in candidates {
        let new_name = transformer.new_name(&entry.name, result.renamed_count + 1);
        let rename = RenameEntry {
            original_path: directory.join(&entry.name),
            original_name: entry.name.clone(),
            new_path: directory.join(&new_name),
            new_name,
        };

        let skip = |reason: SkipReason, detail: Option<String>| SkippedFile {
            name: rename.original_name.clone(),
            reason,
            detail,
        };

        let outcome = if rename.new_name == rename.original_name {
            Err(skip(SkipReason::Unchanged, None))
        } else if let Some(why) = invalid_name_reason(&rename.new_name) {
            Err(skip(SkipReason::InvalidName, Some(why.to_string())))
        } else if names.collides(&rename.original_name, &rename.new_name)
            || mode.name_taken_on_disk(directory, &rename)
        {
            Err(skip(
                SkipReason::NameCollision,
                Some(format!("{} already exists", rename.new_name)),
            ))
        } else {
            mode.rename(&rename)
                .map_err(|e| skip(SkipReason::RenameFailed, Some(e.to_string())))
        };

        match outcome {
            Ok(()) => {
                names.moved(&rename.original_name, &rename.new_name);
                result.renamed_count += 1;
                result.renamed.push(rename);
            },
            Err(skipped) => {
                mode.skipped(&skipped);
                result.skipped.push(skipped);
            },
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::MemoryActivityLog;
    use crate::filesystem::EntryKind;
    use crate::pipeline::RegexMode;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory directory with injectable rename failures
    #[derive(Default)]
    struct FakeFs {
        entries: Mutex<Vec<DirEntryInfo>>,
        /// Files created by someone else right after the next listing
        pending: Mutex<Vec<String>>,
        failing: HashSet<String>,
        unlistable: bool,
    }

    impl FakeFs {
        fn with_files(names: &[&str]) -> Self {
            Self {
                entries: Mutex::new(
                    names
                        .iter()
                        .map(|n| DirEntryInfo::new(*n, EntryKind::File))
                        .collect(),
                ),
                ..Self::default()
            }
        }

        fn created_after_listing(self, name: &str) -> Self {
            self.pending.lock().unwrap().push(name.to_string());
            self
        }

        fn failing_on(mut self, name: &str) -> Self {
            self.failing.insert(name.to_string());
            self
        }

        fn add(&self, name: &str, kind: EntryKind) {
            self.entries
                .lock()
                .unwrap()
                .push(DirEntryInfo::new(name, kind));
        }

        fn names(&self) -> Vec<String> {
            self.entries
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.name.clone())
                .collect()
        }
    }

    impl FileSystem for FakeFs {
        fn list(&self, _dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
            if self.unlistable {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            let mut entries = self.entries.lock().unwrap();
            let listing = entries.clone();
            for name in self.pending.lock().unwrap().drain(..) {
                entries.push(DirEntryInfo::new(name, EntryKind::File));
            }
            Ok(listing)
        }

        fn exists(&self, path: &Path) -> bool {
            let name = file_name_of(path);
            self.entries.lock().unwrap().iter().any(|e| e.name == name)
        }

        fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
            let from_name = file_name_of(from);
            if self.failing.contains(&from_name) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            let mut entries = self.entries.lock().unwrap();
            let entry = entries
                .iter_mut()
                .find(|e| e.name == from_name)
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "gone"))?;
            entry.name = file_name_of(to);
            Ok(())
        }
    }

    /// Sink that claims to write to a file without touching disk
    struct LogFileAt(PathBuf);

    impl ActivitySink for LogFileAt {
        fn record(&mut self, _event: ActivityEvent) {}

        fn file_path(&self) -> Option<&Path> {
            Some(&self.0)
        }
    }

    fn dir() -> &'static Path {
        Path::new("/data")
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn session(fs: FakeFs) -> BatchSession<FakeFs> {
        BatchSession::with_fs(fs).with_date(date())
    }

    fn sorted(mut names: Vec<String>) -> Vec<String> {
        names.sort();
        names
    }

    #[test]
    fn test_scenario_prefix_and_sequence() {
        let fs = FakeFs::with_files(&["report.txt", "photo.png", ".hidden"]);
        let mut session = session(fs);
        let config = PipelineConfig::new().with_prefix("2024_").with_sequence(true);

        let result = session.apply_batch(dir(), &config).unwrap();

        assert_eq!(result.renamed_count, 2);
        assert_eq!(result.total_eligible_count, 2);
        assert!(result.skipped.is_empty());
        assert_eq!(
            sorted(session.filesystem().names()),
            vec![".hidden", "2024_photo_002.png", "2024_report_001.txt"]
        );
        assert_eq!(session.undo_log().len(), 2);
    }

    #[test]
    fn test_remove_numbers_scenario() {
        let mut session = session(FakeFs::with_files(&["file123.txt"]));
        let config = PipelineConfig::new().with_regex_mode(RegexMode::RemoveNumbers);
        let result = session.apply_batch(dir(), &config).unwrap();
        assert_eq!(result.renamed[0].new_name, "file.txt");
        assert_eq!(result.renamed[0].new_path, dir().join("file.txt"));
    }

    #[test]
    fn test_extension_filter_keeps_pre_filter_total() {
        let mut session = session(FakeFs::with_files(&["a.txt", "b.png"]));
        let config = PipelineConfig::new()
            .with_suffix("_x")
            .with_extensions([".txt"]);
        let result = session.apply_batch(dir(), &config).unwrap();

        assert_eq!(result.total_eligible_count, 2);
        assert_eq!(result.renamed_count, 1);
        assert_eq!(
            sorted(session.filesystem().names()),
            vec!["a_x.txt", "b.png"]
        );
    }

    #[test]
    fn test_only_regular_files_are_candidates() {
        let fs = FakeFs::with_files(&["a.txt"]);
        fs.add("folder", EntryKind::Dir);
        fs.add("link.txt", EntryKind::Symlink);
        let mut session = session(fs);

        let result = session
            .apply_batch(dir(), &PipelineConfig::new().with_prefix("p_"))
            .unwrap();

        assert_eq!(result.total_eligible_count, 1);
        assert_eq!(
            sorted(session.filesystem().names()),
            vec!["folder", "link.txt", "p_a.txt"]
        );
    }

    #[test]
    fn test_collision_with_existing_file_is_case_insensitive() {
        let mut session = session(FakeFs::with_files(&["A.txt", "b.txt"]));
        let config = PipelineConfig::new().with_find_replace("b", "a");

        let result = session.apply_batch(dir(), &config).unwrap();

        assert_eq!(result.renamed_count, 0);
        let collisions: Vec<_> = result.skipped_with(SkipReason::NameCollision).collect();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].name, "b.txt");
        assert_eq!(
            sorted(session.filesystem().names()),
            vec!["A.txt", "b.txt"]
        );
    }

    #[test]
    fn test_file_created_after_listing_collides_case_insensitively() {
        let fs = FakeFs::with_files(&["b.txt"]).created_after_listing("A.txt");
        let mut session = session(fs);
        let config = PipelineConfig::new().with_find_replace("b", "a");

        let result = session.apply_batch(dir(), &config).unwrap();

        assert_eq!(result.renamed_count, 0);
        let collisions: Vec<_> = result.skipped_with(SkipReason::NameCollision).collect();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].name, "b.txt");
        assert_eq!(
            sorted(session.filesystem().names()),
            vec!["A.txt", "b.txt"]
        );
        assert!(!session.can_undo());
    }

    #[test]
    fn test_case_only_rename_checks_live_directory_on_case_sensitive_fs() {
        let fs = FakeFs::with_files(&["readme.md"]).created_after_listing("README.md");
        let mut session = session(fs);
        let config = PipelineConfig::new().with_find_replace("readme", "README");

        let result = session.apply_batch(dir(), &config).unwrap();

        assert_eq!(result.renamed_count, 0);
        assert_eq!(result.skipped_with(SkipReason::NameCollision).count(), 1);
        assert_eq!(
            sorted(session.filesystem().names()),
            vec!["README.md", "readme.md"]
        );
    }

    #[test]
    fn test_case_only_rename_without_competition_succeeds() {
        let mut session = session(FakeFs::with_files(&["readme.md"]));
        let config = PipelineConfig::new().with_find_replace("readme", "README");

        let result = session.apply_batch(dir(), &config).unwrap();

        assert_eq!(result.renamed_count, 1);
        assert_eq!(session.filesystem().names(), vec!["README.md"]);
    }

    #[test]
    fn test_collision_with_file_renamed_earlier_in_batch() {
        let mut session = session(FakeFs::with_files(&["Invoice.pdf", "invoice.pdf"]));
        let config = PipelineConfig::new().with_suffix("_final");

        let result = session.apply_batch(dir(), &config).unwrap();

        assert_eq!(result.renamed_count, 1);
        let collisions: Vec<_> = result.skipped_with(SkipReason::NameCollision).collect();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].name, "invoice.pdf");
    }

    #[test]
    fn test_collision_does_not_consume_sequence_number() {
        let fs = FakeFs::with_files(&["a.txt", "b.txt", "c.txt"]);
        fs.add("x_b_002.txt", EntryKind::File);
        let mut session = session(fs);
        let config = PipelineConfig::new()
            .with_prefix("x_")
            .with_sequence(true)
            .with_extensions(["txt"]);

        let result = session.apply_batch(dir(), &config).unwrap();

        // a -> x_a_001, b -> x_b_002 collides, c takes 002
        let new_names: Vec<&str> = result.renamed.iter().map(|r| r.new_name.as_str()).collect();
        assert_eq!(new_names, vec!["x_a_001.txt", "x_c_002.txt", "x_x_b_002_003.txt"]);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].name, "b.txt");
    }

    #[test]
    fn test_name_freed_earlier_in_batch_can_be_reused() {
        // ab -> abb frees "ab.txt", which a -> ab then takes
        let mut session = session(FakeFs::with_files(&["ab.txt", "a.txt"]));
        let config = PipelineConfig::new().with_find_replace("a", "ab");

        let result = session.apply_batch(dir(), &config).unwrap();

        assert_eq!(result.renamed_count, 2);
        assert!(result.skipped.is_empty());
        assert_eq!(sorted(session.filesystem().names()), vec!["ab.txt", "abb.txt"]);
    }

    #[test]
    fn test_rename_failure_is_recorded_and_batch_continues() {
        let fs = FakeFs::with_files(&["one.txt", "two.txt", "three.txt"]).failing_on("two.txt");
        let mut session = session(fs);
        let config = PipelineConfig::new().with_sequence(true);

        let result = session.apply_batch(dir(), &config).unwrap();

        assert_eq!(result.renamed_count, 2);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].reason, SkipReason::RenameFailed);
        assert_eq!(result.skipped[0].detail.as_deref(), Some("denied"));
        let new_names: Vec<&str> = result.renamed.iter().map(|r| r.new_name.as_str()).collect();
        assert_eq!(new_names, vec!["one_001.txt", "three_002.txt"]);
        assert_eq!(session.undo_log().len(), 2);
    }

    #[test]
    fn test_unchanged_names_are_skipped() {
        let mut session = session(FakeFs::with_files(&["plain.txt"]));
        let result = session.apply_batch(dir(), &PipelineConfig::new()).unwrap();
        assert_eq!(result.renamed_count, 0);
        assert_eq!(result.skipped[0].reason, SkipReason::Unchanged);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_empty_and_separator_names_are_invalid() {
        let mut session = session(FakeFs::with_files(&["123.txt", "a-b.txt"]));
        let config = PipelineConfig::new()
            .with_find_replace("-", "/")
            .with_regex_mode(RegexMode::RemoveNumbers);
        let result = session.apply_batch(dir(), &config).unwrap();

        assert_eq!(result.renamed_count, 0);
        assert!(result
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::InvalidName));
        assert_eq!(result.skipped.len(), 2);
    }

    #[test]
    fn test_name_order_sorts_before_numbering() {
        let mut session = session(FakeFs::with_files(&["b.txt", "c.txt", "a.txt"]));
        let config = PipelineConfig::new()
            .with_sequence(true)
            .with_order(ListingOrder::Name);
        let result = session.apply_batch(dir(), &config).unwrap();
        let new_names: Vec<&str> = result.renamed.iter().map(|r| r.new_name.as_str()).collect();
        assert_eq!(new_names, vec!["a_001.txt", "b_002.txt", "c_003.txt"]);
    }

    #[test]
    fn test_date_is_stamped_from_session() {
        let mut session = session(FakeFs::with_files(&["x.md", "y.md"]));
        let result = session
            .apply_batch(dir(), &PipelineConfig::new().with_date(true))
            .unwrap();
        assert!(result
            .renamed
            .iter()
            .all(|r| r.new_name.ends_with("_2024-05-01.md")));
    }

    #[test]
    fn test_unlistable_directory_fails_without_touching_undo_log() {
        let mut session = session(FakeFs::with_files(&["a.txt"]));
        session
            .apply_batch(dir(), &PipelineConfig::new().with_prefix("p_"))
            .unwrap();
        assert!(session.can_undo());

        let mut broken = session;
        broken.fs.unlistable = true;
        let err = broken
            .apply_batch(dir(), &PipelineConfig::new().with_prefix("q_"))
            .unwrap_err();
        assert!(matches!(err, BatchError::DirectoryUnreadable { .. }));
        assert!(broken.can_undo());
    }

    #[test]
    fn test_undo_restores_names_and_clears_log() {
        let mut session = session(FakeFs::with_files(&["a.txt", "b.txt", ".hidden"]));
        let before = sorted(session.filesystem().names());
        session
            .apply_batch(dir(), &PipelineConfig::new().with_prefix("new_").with_sequence(true))
            .unwrap();

        let undo = session.undo_batch();

        assert_eq!(undo.reverted, 2);
        assert!(undo.failures.is_empty());
        assert_eq!(sorted(session.filesystem().names()), before);
        assert!(!session.can_undo());
        assert_eq!(session.undo_batch(), UndoResult::default());
    }

    #[test]
    fn test_undo_runs_newest_first() {
        // a.txt took the name ab.txt gave up, so it has to move back first
        let mut session = session(FakeFs::with_files(&["ab.txt", "a.txt"]));
        session
            .apply_batch(dir(), &PipelineConfig::new().with_find_replace("a", "ab"))
            .unwrap();

        let undo = session.undo_batch();

        assert_eq!(undo.reverted, 2);
        assert!(undo.failures.is_empty());
        assert_eq!(sorted(session.filesystem().names()), vec!["a.txt", "ab.txt"]);
    }

    #[test]
    fn test_undo_failure_continues_and_still_clears() {
        let mut session = session(FakeFs::with_files(&["a.txt", "b.txt"]));
        session
            .apply_batch(dir(), &PipelineConfig::new().with_suffix("_v2"))
            .unwrap();
        session.fs.failing.insert("a_v2.txt".to_string());

        let undo = session.undo_batch();

        assert_eq!(undo.reverted, 1);
        assert_eq!(undo.failures.len(), 1);
        assert_eq!(undo.failures[0].from, dir().join("a_v2.txt"));
        assert!(!session.can_undo());
        assert_eq!(sorted(session.filesystem().names()), vec!["a_v2.txt", "b.txt"]);
    }

    #[test]
    fn test_undo_refuses_to_overwrite_reused_original_name() {
        let mut session = session(FakeFs::with_files(&["a.txt"]));
        session
            .apply_batch(dir(), &PipelineConfig::new().with_prefix("z_"))
            .unwrap();
        session.filesystem().add("a.txt", EntryKind::File);

        let undo = session.undo_batch();

        assert_eq!(undo.reverted, 0);
        assert_eq!(undo.failures.len(), 1);
        assert!(undo.failures[0].error.contains("taken"));
    }

    #[test]
    fn test_undo_of_case_only_rename_keeps_new_file_at_original_name() {
        let mut session = session(FakeFs::with_files(&["Invoice.pdf"]));
        session
            .apply_batch(dir(), &PipelineConfig::new().with_find_replace("Invoice", "invoice"))
            .unwrap();
        session.filesystem().add("Invoice.pdf", EntryKind::File);

        let undo = session.undo_batch();

        assert_eq!(undo.reverted, 0);
        assert_eq!(undo.failures.len(), 1);
        assert_eq!(undo.failures[0].error, "original name is taken");
        assert_eq!(
            sorted(session.filesystem().names()),
            vec!["Invoice.pdf", "invoice.pdf"]
        );
    }

    #[test]
    fn test_activity_log_inside_directory_is_never_renamed() {
        let fs = FakeFs::with_files(&["a.txt", "batch.log"]);
        let mut session = session(fs).with_activity(LogFileAt(dir().join("batch.log")));
        let config = PipelineConfig::new().with_prefix("p_");

        let preview = session.preview(dir(), &config).unwrap();
        assert_eq!(preview.total_eligible_count, 1);

        let result = session.apply_batch(dir(), &config).unwrap();

        assert_eq!(result.total_eligible_count, 1);
        assert_eq!(result.renamed_count, 1);
        assert!(result.skipped.is_empty());
        assert_eq!(
            sorted(session.filesystem().names()),
            vec!["batch.log", "p_a.txt"]
        );
    }

    #[test]
    fn test_activity_log_elsewhere_does_not_shield_same_name() {
        let fs = FakeFs::with_files(&["batch.log"]);
        let mut session = session(fs).with_activity(LogFileAt(PathBuf::from("/logs/batch.log")));

        let result = session
            .apply_batch(dir(), &PipelineConfig::new().with_prefix("p_"))
            .unwrap();

        assert_eq!(result.renamed_count, 1);
        assert_eq!(session.filesystem().names(), vec!["p_batch.log"]);
    }

    #[test]
    fn test_undo_skips_entries_renamed_to_hidden_names() {
        let mut session = session(FakeFs::with_files(&["a.txt", "b.txt"]));
        session
            .apply_batch(dir(), &PipelineConfig::new().with_find_replace("a", "."))
            .unwrap();

        let undo = session.undo_batch();

        assert_eq!(undo.reverted, 0);
        assert_eq!(undo.skipped_hidden, 1);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_new_batch_replaces_undo_log() {
        let mut session = session(FakeFs::with_files(&["a.txt"]));
        session
            .apply_batch(dir(), &PipelineConfig::new().with_prefix("1_"))
            .unwrap();
        session
            .apply_batch(dir(), &PipelineConfig::new().with_prefix("2_"))
            .unwrap();

        assert_eq!(session.undo_log().len(), 1);
        assert_eq!(
            session.undo_log().original_of(&dir().join("2_1_a.txt")),
            Some(dir().join("1_a.txt").as_path())
        );
        session.undo_batch();
        assert_eq!(session.filesystem().names(), vec!["1_a.txt"]);
    }

    #[test]
    fn test_preview_matches_apply_without_side_effects() {
        let mut session = session(FakeFs::with_files(&["Invoice.pdf", "invoice.pdf", "c.pdf"]));
        let config = PipelineConfig::new().with_suffix("_final").with_sequence(true);

        let preview = session.preview(dir(), &config).unwrap();
        assert!(preview.dry_run);
        assert_eq!(
            sorted(session.filesystem().names()),
            vec!["Invoice.pdf", "c.pdf", "invoice.pdf"]
        );
        assert!(!session.can_undo());

        let applied = session.apply_batch(dir(), &config).unwrap();
        assert_eq!(preview.renamed, applied.renamed);
        assert_eq!(preview.skipped, applied.skipped);
    }

    #[test]
    fn test_activity_log_records_renames_and_skips() {
        let log = MemoryActivityLog::new();
        let mut session = BatchSession::with_fs(FakeFs::with_files(&["A.txt", "b.txt"]))
            .with_date(date())
            .with_activity(log.clone());

        session
            .apply_batch(dir(), &PipelineConfig::new().with_find_replace("b", "a"))
            .unwrap();
        session.undo_batch();

        let events = log.events();
        assert!(matches!(events.first(), Some(ActivityEvent::BatchStarted { .. })));
        assert!(events.contains(&ActivityEvent::Skipped {
            name: "b.txt".to_string(),
            reason: SkipReason::NameCollision,
            detail: Some("a.txt already exists".to_string()),
        }));
        assert!(events.contains(&ActivityEvent::Skipped {
            name: "A.txt".to_string(),
            reason: SkipReason::Unchanged,
            detail: None,
        }));
        assert!(matches!(
            events.last(),
            Some(ActivityEvent::BatchFinished {
                renamed: 0,
                total: 2
            })
        ));
    }

    #[test]
    fn test_hidden_files_never_reported() {
        let log = MemoryActivityLog::new();
        let mut session = BatchSession::with_fs(FakeFs::with_files(&[".env", ".git"]))
            .with_activity(log.clone());
        let result = session
            .apply_batch(dir(), &PipelineConfig::new().with_prefix("x"))
            .unwrap();

        assert_eq!(result.total_eligible_count, 0);
        assert!(result.skipped.is_empty());
        assert!(!session.can_undo());
        assert_eq!(log.events().len(), 2);
    }
}
