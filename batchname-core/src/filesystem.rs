use std::fs;
use std::io;
use std::path::Path;
use tempfile::TempDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    /// Sockets, fifos, devices and entries whose name is not valid UTF-8
    Other,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntryInfo {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

/// The directory operations a batch needs.
///
/// Everything the renamer does to disk goes through this trait, so front
/// ends and tests can substitute their own implementation.
pub trait FileSystem {
    /// Non-recursive listing in the order the backend returns entries
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>>;

    /// Whether anything (file, directory, dangling symlink) exists at `path`
    fn exists(&self, path: &Path) -> bool;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Names in `dir` that equal `name` ignoring case, read from a fresh
    /// listing
    fn names_matching(&self, dir: &Path, name: &str) -> io::Result<Vec<String>> {
        let key = name.to_lowercase();
        Ok(self
            .list(dir)?
            .into_iter()
            .filter(|entry| entry.name.to_lowercase() == key)
            .map(|entry| entry.name)
            .collect())
    }

    /// Whether names in `dir` compare case-insensitively on this backend
    fn is_case_insensitive(&self, _dir: &Path) -> bool {
        false
    }
}

/// `std::fs` backed implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            // file_type() does not follow symlinks
            let file_type = entry.file_type()?;
            let kind = if file_type.is_symlink() {
                EntryKind::Symlink
            } else if file_type.is_file() {
                EntryKind::File
            } else if file_type.is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::Other
            };

            match entry.file_name().into_string() {
                Ok(name) => entries.push(DirEntryInfo { name, kind }),
                Err(raw) => entries.push(DirEntryInfo {
                    name: raw.to_string_lossy().into_owned(),
                    kind: EntryKind::Other,
                }),
            }
        }
        Ok(entries)
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn is_case_insensitive(&self, dir: &Path) -> bool {
        detect_case_insensitive_fs(dir)
    }
}

/// Check if the filesystem at the given path is case-insensitive
pub fn detect_case_insensitive_fs(path: &Path) -> bool {
    let temp_dir = match TempDir::new_in(path) {
        Ok(dir) => dir,
        Err(_) => return false, // Assume case-sensitive if we can't test
    };

    let test_file_lower = temp_dir.path().join("test_case_a");
    let test_file_upper = temp_dir.path().join("test_case_A");

    if fs::write(&test_file_lower, b"test").is_err() {
        return false;
    }

    // On a case-insensitive FS the uppercase name resolves to the same file
    fs::metadata(&test_file_upper).is_ok()
}

/// Whether two names differ only by letter case
pub fn is_case_only_change(from: &str, to: &str) -> bool {
    from != to && from.to_lowercase() == to.to_lowercase()
}

/// Rename `from` to `to`, staging through a temporary name when the two
/// differ only by case on a case-insensitive filesystem.
pub fn rename_entry<F: FileSystem + ?Sized>(
    fs: &F,
    from: &Path,
    to: &Path,
    case_insensitive: bool,
) -> io::Result<()> {
    let case_only = match (from.file_name(), to.file_name()) {
        (Some(a), Some(b)) => is_case_only_change(&a.to_string_lossy(), &b.to_string_lossy()),
        _ => false,
    };

    if case_only && case_insensitive {
        let temp_name = to.with_extension(format!("{}.batchname.tmp", std::process::id()));
        fs.rename(from, &temp_name)?;
        if let Err(e) = fs.rename(&temp_name, to) {
            // Put the file back under its original name before reporting
            let _ = fs.rename(&temp_name, from);
            return Err(e);
        }
        Ok(())
    } else {
        fs.rename(from, to)
    }
}
