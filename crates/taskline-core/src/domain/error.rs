//! Error taxonomy for Taskline runs.

use crate::domain::task::TaskId;
use crate::validation::PlanningError;

/// Errors produced while reading the manager's text protocol.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("no <{tag}> ... </{tag}> block found in response")]
    MissingTag { tag: &'static str },

    #[error("plan payload is not a valid task list: {0}")]
    InvalidPlan(#[from] serde_json::Error),

    #[error("task id {0} is declared more than once in the plan")]
    DuplicateTaskId(TaskId),

    #[error("no worker index could be read from {raw:?}")]
    InvalidWorkerIndex { raw: String },
}

/// A single failed assignment attempt.
///
/// These never escape the engine: each one is folded into the task prompt as
/// feedback for the next attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentError {
    #[error("manager call failed: {detail}")]
    ManagerFailed { detail: String },

    #[error("could not read a worker index from the manager response {raw:?}")]
    UnparseableIndex { raw: String },

    #[error("worker index {index} is out of range for a roster of {roster_len}")]
    IndexOutOfRange { index: i64, roster_len: usize },
}

/// Run-level errors. Any of these terminates the orchestration.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("manager '{manager}' failed to produce a plan: {detail}")]
    PlanRequestFailed { manager: String, detail: String },

    #[error("failed to parse plan: {0}")]
    PlanParse(#[source] ProtocolError),

    #[error("plan rejected: {0}")]
    PlanValidation(#[from] PlanningError),

    #[error("failed to assign task {task_id}.{task_name} after {attempts} attempt(s): {last_error}")]
    TaskExecutionFailed {
        task_id: TaskId,
        task_name: String,
        attempts: u32,
        last_error: String,
    },

    #[error("worker {worker_index}.{worker} failed task {task_id}.{task_name}: {detail}")]
    WorkerExecutionFailed {
        task_id: TaskId,
        task_name: String,
        worker_index: usize,
        worker: String,
        detail: String,
    },

    #[error("manager '{manager}' failed to summarize: {detail}")]
    SummaryRequestFailed { manager: String, detail: String },

    #[error("failed to parse final answer: {0}")]
    FinalAnswerParse(#[source] ProtocolError),

    #[error("result for task {0} is already recorded")]
    DuplicateResult(TaskId),
}

impl OrchestratorError {
    /// Id of the task the error is attributed to, if any.
    pub fn task_id(&self) -> Option<TaskId> {
        match self {
            OrchestratorError::TaskExecutionFailed { task_id, .. }
            | OrchestratorError::WorkerExecutionFailed { task_id, .. }
            | OrchestratorError::DuplicateResult(task_id) => Some(*task_id),
            _ => None,
        }
    }
}

/// Result type for orchestration operations.
pub type OrchestratorResult<T> = std::result::Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_execution_failed_display() {
        let err = OrchestratorError::TaskExecutionFailed {
            task_id: 7,
            task_name: "collect sources".to_string(),
            attempts: 3,
            last_error: "worker index 9 is out of range for a roster of 2".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("7.collect sources"));
        assert!(msg.contains("3 attempt(s)"));
        assert_eq!(err.task_id(), Some(7));
    }

    #[test]
    fn test_plan_parse_keeps_protocol_source() {
        let err = OrchestratorError::PlanParse(ProtocolError::MissingTag { tag: "output" });
        assert!(err.to_string().contains("<output>"));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.task_id(), None);
    }

    #[test]
    fn test_assignment_error_display() {
        let err = AssignmentError::IndexOutOfRange {
            index: -1,
            roster_len: 2,
        };
        assert!(err.to_string().contains("-1"));
        assert!(err.to_string().contains("roster of 2"));
    }
}
