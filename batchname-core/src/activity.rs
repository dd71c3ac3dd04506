use crate::batch::SkipReason;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Something worth writing to the activity log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ActivityEvent {
    BatchStarted {
        directory: PathBuf,
    },
    Renamed {
        original: String,
        new: String,
    },
    Skipped {
        name: String,
        reason: SkipReason,
        detail: Option<String>,
    },
    BatchFinished {
        renamed: usize,
        total: usize,
    },
    Reverted {
        from: String,
        to: String,
    },
    UndoFailed {
        from: String,
        to: String,
        error: String,
    },
}

impl fmt::Display for ActivityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BatchStarted { directory } => {
                write!(f, "Starting batch in {}", directory.display())
            },
            Self::Renamed { original, new } => write!(f, "Renamed {} -> {}", original, new),
            Self::Skipped {
                name,
                reason,
                detail: Some(detail),
            } => write!(f, "Skipped {} ({}): {}", name, reason, detail),
            Self::Skipped { name, reason, .. } => write!(f, "Skipped {} ({})", name, reason),
            Self::BatchFinished { renamed, total } => {
                write!(f, "Batch finished: {} of {} files renamed", renamed, total)
            },
            Self::Reverted { from, to } => write!(f, "Reverted {} -> {}", from, to),
            Self::UndoFailed { from, to, error } => {
                write!(f, "Failed to revert {} -> {}: {}", from, to, error)
            },
        }
    }
}

/// An event with the moment it happened
#[derive(Debug, Clone, Serialize)]
pub struct ActivityRecord {
    pub timestamp: DateTime<Local>,
    #[serde(flatten)]
    pub event: ActivityEvent,
}

/// Append-only destination for activity records.
///
/// Recording never fails the batch: a sink that cannot write reports the
/// problem on its own terms.
pub trait ActivitySink: Send {
    fn record(&mut self, event: ActivityEvent);

    /// File the sink writes to, if any
    fn file_path(&self) -> Option<&Path> {
        None
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullActivityLog;

impl ActivitySink for NullActivityLog {
    fn record(&mut self, _event: ActivityEvent) {}
}

/// Collects records in memory. Clones share the same buffer, so a caller
/// can keep one handle and give the other to a session.
#[derive(Debug, Default, Clone)]
pub struct MemoryActivityLog {
    records: Arc<Mutex<Vec<ActivityRecord>>>,
}

impl MemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ActivityRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn events(&self) -> Vec<ActivityEvent> {
        self.records().into_iter().map(|r| r.event).collect()
    }
}

impl ActivitySink for MemoryActivityLog {
    fn record(&mut self, event: ActivityEvent) {
        if let Ok(mut records) = self.records.lock() {
            records.push(ActivityRecord {
                timestamp: Local::now(),
                event,
            });
        }
    }
}

/// Appends one timestamped line per event to a log file
#[derive(Debug)]
pub struct FileActivityLog {
    path: PathBuf,
    file: File,
    warned: bool,
}

impl FileActivityLog {
    /// Open (or create) the log file in append mode, creating parent
    /// directories as needed
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory: {}", parent.display())
                })?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open activity log: {}", path.display()))?;

        let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Ok(Self {
            path,
            file,
            warned: false,
        })
    }

    fn write_line(&mut self, event: &ActivityEvent) -> std::io::Result<()> {
        writeln!(
            self.file,
            "[{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            event
        )?;
        self.file.flush()
    }
}

impl ActivitySink for FileActivityLog {
    fn file_path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn record(&mut self, event: ActivityEvent) {
        if let Err(e) = self.write_line(&event) {
            if !self.warned {
                eprintln!(
                    "Warning: Failed to write activity log {}: {}",
                    self.path.display(),
                    e
                );
                self.warned = true;
            }
        }
    }
}
