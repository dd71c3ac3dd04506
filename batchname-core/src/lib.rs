#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod activity;
pub mod batch;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod operations;
pub mod output;
pub mod pipeline;
pub mod task;
pub mod transform;

pub use activity::{
    ActivityEvent, ActivityRecord, ActivitySink, FileActivityLog, MemoryActivityLog,
    NullActivityLog,
};
pub use batch::{
    BatchResult, BatchSession, RenameEntry, SkipReason, SkippedFile, UndoFailure, UndoLog,
    UndoResult,
};
pub use config::Config;
pub use error::BatchError;
pub use filesystem::{
    detect_case_insensitive_fs, DirEntryInfo, EntryKind, FileSystem, StdFileSystem,
};
pub use operations::{open_activity_sink, preview_operation, rename_operation, undo_operation};
pub use output::{OutputFormat, OutputFormatter, VersionResult};
pub use pipeline::{ListingOrder, PipelineConfig, RegexMode};
pub use task::{BatchTask, FinishedBatch};
pub use transform::{split_extension, transform, NameTransformer};
