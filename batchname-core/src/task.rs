use crate::batch::{BatchResult, BatchSession};
use crate::error::BatchError;
use crate::filesystem::FileSystem;
use crate::pipeline::PipelineConfig;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

/// A batch running on its own thread.
///
/// The session moves into the worker and comes back out of [`wait`](Self::wait),
/// undo log included, so the caller can undo the batch afterwards.
#[derive(Debug)]
pub struct BatchTask<F: FileSystem> {
    handle: JoinHandle<(BatchSession<F>, Result<BatchResult, BatchError>)>,
}

/// What a finished [`BatchTask`] hands back
#[derive(Debug)]
pub struct FinishedBatch<F: FileSystem> {
    pub session: BatchSession<F>,
    pub result: Result<BatchResult, BatchError>,
}

impl<F: FileSystem + Send + 'static> BatchSession<F> {
    /// Run [`apply_batch`](Self::apply_batch) on a background thread
    pub fn spawn_apply(mut self, directory: PathBuf, config: PipelineConfig) -> BatchTask<F> {
        let handle = thread::spawn(move || {
            let result = self.apply_batch(&directory, &config);
            (self, result)
        });
        BatchTask { handle }
    }
}

impl<F: FileSystem> BatchTask<F> {
    /// Poll without blocking
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the batch completes
    pub fn wait(self) -> Result<FinishedBatch<F>, BatchError> {
        let (session, result) = self.handle.join().map_err(|_| BatchError::WorkerPanicked)?;
        Ok(FinishedBatch { session, result })
    }
}
