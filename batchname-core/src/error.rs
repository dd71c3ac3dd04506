use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole batch before any file is touched
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Directory does not exist: {}", .path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("Cannot list directory {}: {source}", .path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Batch worker thread panicked")]
    WorkerPanicked,
}

impl BatchError {
    pub(crate) fn from_listing(path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::DirectoryNotFound { path }
        } else {
            Self::DirectoryUnreadable { path, source }
        }
    }

    /// Whether this is a problem with the requested directory (as opposed
    /// to an internal failure)
    pub fn is_directory_error(&self) -> bool {
        matches!(
            self,
            Self::DirectoryNotFound { .. } | Self::DirectoryUnreadable { .. }
        )
    }
}
