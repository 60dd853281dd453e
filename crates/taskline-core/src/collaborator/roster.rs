//! Ordered, fixed set of workers addressed by index.

use std::fmt;
use std::sync::Arc;

use crate::collaborator::Collaborator;

/// Worker roster. The manager-facing description is derived once here.
#[derive(Clone)]
pub struct Roster {
    workers: Vec<Arc<dyn Collaborator>>,
    description: String,
}

impl Roster {
    pub fn new(workers: Vec<Arc<dyn Collaborator>>) -> Self {
        let description = workers
            .iter()
            .enumerate()
            .map(|(i, w)| format!("{i}. {}", w.name()))
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            workers,
            description,
        }
    }

    /// `"<index>. <name>"`, one worker per line.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Bounds-checked lookup for an index proposed by the manager.
    pub fn checked_index(&self, index: i64) -> Option<usize> {
        usize::try_from(index).ok().filter(|&i| i < self.workers.len())
    }

    pub fn get(&self, index: usize) -> Option<&Arc<dyn Collaborator>> {
        self.workers.get(index)
    }

    pub fn names(&self) -> Vec<String> {
        self.workers.iter().map(|w| w.name().to_string()).collect()
    }
}

impl fmt::Debug for Roster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Roster")
            .field("workers", &self.names())
            .finish()
    }
}
