//! Write-once store of completed task outputs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::{OrchestratorError, OrchestratorResult};
use crate::domain::task::TaskId;

/// Output of one completed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub id: TaskId,
    pub name: String,
    pub result: String,
}

/// Results keyed by task id, iterated in insertion order.
///
/// Entries are only ever appended; an id can be recorded once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultsMap {
    entries: Vec<TaskResult>,
    #[serde(skip)]
    index: HashMap<TaskId, usize>,
}

impl ResultsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a result. Fails if the task id already has one.
    pub fn record(&mut self, result: TaskResult) -> OrchestratorResult<()> {
        if self.index.contains_key(&result.id) {
            return Err(OrchestratorError::DuplicateResult(result.id));
        }
        self.index.insert(result.id, self.entries.len());
        self.entries.push(result);
        Ok(())
    }

    pub fn get(&self, id: TaskId) -> Option<&TaskResult> {
        self.index.get(&id).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Results in the order they were recorded.
    pub fn iter(&self) -> std::slice::Iter<'_, TaskResult> {
        self.entries.iter()
    }

    /// The result with the numerically highest task id.
    pub fn highest_id(&self) -> Option<&TaskResult> {
        self.entries.iter().max_by_key(|r| r.id)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}
