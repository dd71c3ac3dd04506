pub mod args;
pub mod types;

pub use args::{Cli, Commands, PipelineArgs};
pub use types::OutputFormat;
