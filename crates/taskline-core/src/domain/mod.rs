//! Core domain types for Taskline.
//!
//! - [`task`] — `Task`, `Plan`, `TaskOutputSpec`
//! - [`results`] — `ResultsMap`, `TaskResult`
//! - [`run_state`] — `RunState`, `HistoryMessage`
//! - [`error`] — `OrchestratorError`, `ProtocolError`, `AssignmentError`

pub mod error;
pub mod results;
pub mod run_state;
pub mod task;

pub use error::{AssignmentError, OrchestratorError, OrchestratorResult, ProtocolError};
pub use results::{ResultsMap, TaskResult};
pub use run_state::{HistoryMessage, MessageRole, RunState};
pub use task::{Plan, Task, TaskId, TaskOutputSpec};
