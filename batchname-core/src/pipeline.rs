use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Predefined pattern substitution applied after find/replace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegexMode {
    #[default]
    None,
    /// Delete every ASCII digit
    RemoveNumbers,
    /// Collapse runs of whitespace into a single underscore
    ReplaceSpaces,
    /// Delete everything except alphanumerics, underscores and whitespace
    RemoveSpecialChars,
    /// Append `_updated`
    #[serde(alias = "append-updated")]
    AppendUpdatedSuffix,
}

impl RegexMode {
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::RemoveNumbers,
        Self::ReplaceSpaces,
        Self::RemoveSpecialChars,
        Self::AppendUpdatedSuffix,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::RemoveNumbers => "remove-numbers",
            Self::ReplaceSpaces => "replace-spaces",
            Self::RemoveSpecialChars => "remove-special-chars",
            Self::AppendUpdatedSuffix => "append-updated-suffix",
        }
    }
}

impl fmt::Display for RegexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegexMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "" | "none" => Ok(Self::None),
            "remove-numbers" => Ok(Self::RemoveNumbers),
            "replace-spaces" => Ok(Self::ReplaceSpaces),
            "remove-special-chars" => Ok(Self::RemoveSpecialChars),
            "append-updated" | "append-updated-suffix" => Ok(Self::AppendUpdatedSuffix),
            other => Err(format!("Unknown pattern mode: {}", other)),
        }
    }
}

/// Order in which directory entries are processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingOrder {
    /// Whatever order the OS hands back
    #[default]
    Native,
    /// Sorted by file name
    Name,
}

/// The transformation applied to every eligible file in a batch.
///
/// Every field is an independent toggle. Empty strings behave exactly like
/// unset ones, so a config built straight from form fields or CLI flags
/// needs no extra validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub find_text: Option<String>,
    pub replace_text: Option<String>,
    pub regex_mode: RegexMode,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub replace_spaces_with_underscore: bool,
    pub append_date: bool,
    pub sequential_numbering: bool,
    /// Lower-cased extensions with a leading dot. Empty means no filter.
    pub extension_filter: BTreeSet<String>,
    pub order: ListingOrder,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_find_replace(mut self, find: impl Into<String>, replace: impl Into<String>) -> Self {
        self.find_text = Some(find.into());
        self.replace_text = Some(replace.into());
        self
    }

    pub fn with_regex_mode(mut self, mode: RegexMode) -> Self {
        self.regex_mode = mode;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_underscores(mut self, enabled: bool) -> Self {
        self.replace_spaces_with_underscore = enabled;
        self
    }

    pub fn with_date(mut self, enabled: bool) -> Self {
        self.append_date = enabled;
        self
    }

    pub fn with_sequence(mut self, enabled: bool) -> Self {
        self.sequential_numbering = enabled;
        self
    }

    pub fn with_order(mut self, order: ListingOrder) -> Self {
        self.order = order;
        self
    }

    /// Add extensions to the filter. Accepts `txt`, `.txt` or `.TXT`.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extension_filter
            .extend(extensions.into_iter().filter_map(|e| normalize_extension(e.as_ref())));
        self
    }

    /// The find/replace pair, only when both sides are non-empty
    pub fn find_replace(&self) -> Option<(&str, &str)> {
        match (non_empty(&self.find_text), non_empty(&self.replace_text)) {
            (Some(find), Some(replace)) => Some((find, replace)),
            _ => None,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        non_empty(&self.prefix)
    }

    pub fn suffix(&self) -> Option<&str> {
        non_empty(&self.suffix)
    }

    /// Whether a file with this extension (as split off its name) passes the filter
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.extension_filter.is_empty()
            || self.extension_filter.contains(&extension.to_lowercase())
    }

    /// Normalize the extension filter in place. Used after deserializing
    /// hand-written config files.
    pub fn normalized(mut self) -> Self {
        let filter = std::mem::take(&mut self.extension_filter);
        self.extension_filter = filter
            .iter()
            .filter_map(|e| normalize_extension(e))
            .collect();
        self
    }

    /// Layer `other` on top of `self`: set strings and enabled toggles in
    /// `other` win.
    pub fn merged_with(&self, other: &Self) -> Self {
        let pick = |base: &Option<String>, over: &Option<String>| {
            non_empty(over)
                .or_else(|| non_empty(base))
                .map(str::to_string)
        };

        Self {
            find_text: pick(&self.find_text, &other.find_text),
            replace_text: pick(&self.replace_text, &other.replace_text),
            regex_mode: if other.regex_mode == RegexMode::None {
                self.regex_mode
            } else {
                other.regex_mode
            },
            prefix: pick(&self.prefix, &other.prefix),
            suffix: pick(&self.suffix, &other.suffix),
            replace_spaces_with_underscore: self.replace_spaces_with_underscore
                || other.replace_spaces_with_underscore,
            append_date: self.append_date || other.append_date,
            sequential_numbering: self.sequential_numbering || other.sequential_numbering,
            extension_filter: if other.extension_filter.is_empty() {
                self.extension_filter.clone()
            } else {
                other.extension_filter.clone()
            },
            order: if other.order == ListingOrder::Native {
                self.order
            } else {
                other.order
            },
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!(".{}", trimmed.to_lowercase()))
    }
}
