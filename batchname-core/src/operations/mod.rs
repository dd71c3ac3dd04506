//! High-level operations that correspond to CLI commands
//!
//! These wrap the batch protocol with activity-log setup and error context,
//! separated from CLI concerns like argument parsing and output formatting.

pub mod preview;
pub mod rename;

pub use preview::preview_operation;
pub use rename::{open_activity_sink, rename_operation, undo_operation};
