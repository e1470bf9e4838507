//! Engine-level error type.

use thiserror::Error;

use crate::scheduler::TaskId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The task was never scheduled or has already retired.
    #[error("unknown scheduled task {0:?}")]
    UnknownTask(TaskId),
}
