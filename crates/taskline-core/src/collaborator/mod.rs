//! The call contract shared by the manager and every worker.
//!
//! A collaborator receives a [`CallRequest`] together with the current
//! run-dependency chain and answers with a [`CallOutcome`]. Failures are
//! reported in-band through [`CallStatus::Failure`]; transport problems are
//! the implementation's concern and must be folded into a failure outcome.

pub mod http;
pub mod roster;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::HistoryMessage;

pub use http::HttpCollaborator;
pub use roster::Roster;

/// Status half of a collaborator answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Success,
    Failure,
}

/// Answer of a single collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOutcome {
    pub status: CallStatus,
    /// Result payload on success, error detail on failure.
    pub content: String,
}

impl CallOutcome {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            status: CallStatus::Success,
            content: content.into(),
        }
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            status: CallStatus::Failure,
            content: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CallStatus::Success
    }
}

/// Request payload. The manager sees `plan`, `assign` and `summarize`;
/// workers only ever see `execute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CallRequest {
    Plan {
        input_task: String,
        agents: String,
    },
    Assign {
        input_task: String,
        task: String,
        agents: String,
    },
    Summarize {
        input_task: String,
        chat_history: Vec<HistoryMessage>,
        tasks_outputs: String,
    },
    Execute {
        input: String,
    },
}

impl CallRequest {
    pub fn mode(&self) -> &'static str {
        match self {
            CallRequest::Plan { .. } => "plan",
            CallRequest::Assign { .. } => "assign",
            CallRequest::Summarize { .. } => "summarize",
            CallRequest::Execute { .. } => "execute",
        }
    }
}

/// Which side of the contract a collaborator sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaboratorKind {
    Manager,
    Worker,
}

/// Causal pointer to the collaborator that answered last.
///
/// Passed to the next call so tracing collaborators can attribute ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDependency {
    pub node: String,
    pub kind: CollaboratorKind,
}

impl RunDependency {
    pub fn new(node: impl Into<String>, kind: CollaboratorKind) -> Self {
        Self {
            node: node.into(),
            kind,
        }
    }
}

/// Manager or worker.
#[async_trait]
pub trait Collaborator: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, request: &CallRequest, run_depends: &[RunDependency]) -> CallOutcome;
}
