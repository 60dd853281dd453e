//! Per-run mutable state owned by the orchestrator.

use serde::{Deserialize, Serialize};

use crate::collaborator::RunDependency;
use crate::domain::error::OrchestratorResult;
use crate::domain::results::{ResultsMap, TaskResult};

/// Speaker of a history message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One entry of the conversational history handed to the summarizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: MessageRole,
    pub content: String,
}

impl HistoryMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Results, run-dependency chain and history for the run in progress.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    results: ResultsMap,
    run_depends: Vec<RunDependency>,
    history: Vec<HistoryMessage>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &ResultsMap {
        &self.results
    }

    pub fn run_depends(&self) -> &[RunDependency] {
        &self.run_depends
    }

    pub fn history(&self) -> &[HistoryMessage] {
        &self.history
    }

    pub(crate) fn record_result(&mut self, result: TaskResult) -> OrchestratorResult<()> {
        self.results.record(result)
    }

    /// Point the chain at the collaborator that just answered.
    pub(crate) fn depend_on(&mut self, dependency: RunDependency) {
        self.run_depends = vec![dependency];
    }

    pub(crate) fn push_history(&mut self, message: HistoryMessage) {
        self.history.push(message);
    }

    pub(crate) fn reset(&mut self) {
        self.results.clear();
        self.run_depends.clear();
        self.history.clear();
    }
}
