use batchname_core::{ListingOrder, RegexMode};
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum RegexModeArg {
    None,
    RemoveNumbers,
    ReplaceSpaces,
    RemoveSpecialChars,
    #[value(alias = "append-updated-suffix")]
    AppendUpdated,
}

impl From<RegexModeArg> for RegexMode {
    fn from(arg: RegexModeArg) -> Self {
        match arg {
            RegexModeArg::None => Self::None,
            RegexModeArg::RemoveNumbers => Self::RemoveNumbers,
            RegexModeArg::ReplaceSpaces => Self::ReplaceSpaces,
            RegexModeArg::RemoveSpecialChars => Self::RemoveSpecialChars,
            RegexModeArg::AppendUpdated => Self::AppendUpdatedSuffix,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum OrderArg {
    /// Directory listing order as returned by the OS
    Native,
    /// Sorted by file name
    Name,
}

impl From<OrderArg> for ListingOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Native => Self::Native,
            OrderArg::Name => Self::Name,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum OutputFormat {
    Summary,
    Json,
}

impl OutputFormat {
    /// Fall back to the configured default when no `--output` was given
    pub fn resolve(arg: Option<Self>, configured: &str) -> Self {
        arg.or_else(|| Self::from_str(configured, true).ok())
            .unwrap_or(Self::Summary)
    }
}

impl From<OutputFormat> for batchname_core::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Summary => Self::Summary,
            OutputFormat::Json => Self::Json,
        }
    }
}
