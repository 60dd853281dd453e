//! Tasks and plans as produced by the manager.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::ProtocolError;

/// Task identifier, unique within a single plan.
pub type TaskId = i64;

/// What the manager expects a task to produce: free text or a shape mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskOutputSpec {
    Text(String),
    Shape(serde_json::Map<String, serde_json::Value>),
}

impl fmt::Display for TaskOutputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutputSpec::Text(text) => f.write_str(text),
            TaskOutputSpec::Shape(shape) => {
                let rendered = serde_json::to_string(shape).map_err(|_| fmt::Error)?;
                f.write_str(&rendered)
            }
        }
    }
}

/// A single unit of work in a plan. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub description: String,
    /// Ids of tasks whose results are rendered into this task's prompt.
    pub dependencies: Vec<TaskId>,
    pub output: TaskOutputSpec,
}

impl Task {
    /// The instruction handed to the manager and, later, to the worker.
    pub fn instruction(&self) -> String {
        format!(
            "**{}**\n**Required information for output**: {}",
            self.description, self.output
        )
    }
}

/// Ordered task list for one objective.
///
/// Execution follows declaration order, not a topological sort of the
/// dependency edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Plan {
    tasks: Vec<Task>,
}

impl Plan {
    /// Build a plan, rejecting duplicate task ids.
    pub fn new(tasks: Vec<Task>) -> Result<Self, ProtocolError> {
        let mut seen = BTreeSet::new();
        for task in &tasks {
            if !seen.insert(task.id) {
                return Err(ProtocolError::DuplicateTaskId(task.id));
            }
        }
        Ok(Self { tasks })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    /// Position of `id` in declaration order.
    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
