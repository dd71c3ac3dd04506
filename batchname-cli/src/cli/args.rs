use batchname_core::PipelineConfig;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use super::types::{OrderArg, OutputFormat, RegexModeArg};

/// Rename every file in a directory through a configurable name pipeline, with undo
#[derive(Parser, Debug)]
#[command(name = "batchname")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Run as if started in <path> instead of the current working directory
    #[arg(short = 'C', id = "change_dir", global = true, value_name = "PATH")]
    pub directory: Option<PathBuf>,

    /// Do not write the activity log
    #[arg(long, global = true)]
    pub no_log: bool,

    /// Write the activity log here instead of .batchname/activity.log (a log
    /// file inside the target directory is left out of the batch)
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "no_log")]
    pub log_file: Option<PathBuf>,

    /// Assume yes for all prompts
    #[arg(short = 'y', long = "yes", global = true, env = "BATCHNAME_YES")]
    pub yes: bool,
}

/// The name pipeline, stage by stage
#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    /// Literal text to find in each name
    #[arg(long, requires = "replace")]
    pub find: Option<String>,

    /// Replacement for every occurrence of --find
    #[arg(long, requires = "find")]
    pub replace: Option<String>,

    /// Predefined pattern substitution applied after find/replace
    #[arg(long, value_enum)]
    pub mode: Option<RegexModeArg>,

    /// Text to put in front of each name
    #[arg(long)]
    pub prefix: Option<String>,

    /// Text to append to each name (before the extension)
    #[arg(long)]
    pub suffix: Option<String>,

    /// Replace spaces with underscores
    #[arg(long)]
    pub underscores: bool,

    /// Append today's date as _YYYY-MM-DD
    #[arg(long)]
    pub date: bool,

    /// Append a sequence number (_001, _002, ...)
    #[arg(long)]
    pub number: bool,

    /// Only rename files with these extensions (e.g. txt,.jpg)
    #[arg(long, value_delimiter = ',', value_name = "EXT")]
    pub ext: Vec<String>,

    /// Order in which files are processed (affects numbering)
    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,
}

impl PipelineArgs {
    /// The pipeline described by the flags alone
    pub fn to_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::new()
            .with_underscores(self.underscores)
            .with_date(self.date)
            .with_sequence(self.number)
            .with_extensions(&self.ext);

        if let (Some(find), Some(replace)) = (&self.find, &self.replace) {
            config = config.with_find_replace(find, replace);
        }
        if let Some(mode) = self.mode {
            config = config.with_regex_mode(mode.into());
        }
        if let Some(prefix) = &self.prefix {
            config = config.with_prefix(prefix);
        }
        if let Some(suffix) = &self.suffix {
            config = config.with_suffix(suffix);
        }
        if let Some(order) = self.order {
            config = config.with_order(order.into());
        }
        config
    }

    /// Flags layered over the `[pipeline]` section of the config file
    pub fn resolve(&self, base: &PipelineConfig) -> PipelineConfig {
        base.merged_with(&self.to_config())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show what a rename would do without touching any file
    Preview {
        /// Directory whose files to rename
        directory: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Use fixed column widths in the preview table
        #[arg(long)]
        fixed_table_width: bool,

        /// Output format for machine consumption
        #[arg(long, value_enum)]
        output: Option<OutputFormat>,
    },

    /// Rename every eligible file in a directory
    Rename {
        /// Directory whose files to rename
        directory: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Ask whether to keep the result and undo it otherwise
        #[arg(long)]
        review: bool,

        /// Output format for machine consumption
        #[arg(long, value_enum)]
        output: Option<OutputFormat>,
    },

    /// Answer a few questions, rename, then optionally undo
    Wizard,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,

        /// Directory to write the completion file into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Show version information
    Version {
        /// Output format for machine consumption
        #[arg(long, value_enum, default_value = "summary")]
        output: OutputFormat,
    },
}
