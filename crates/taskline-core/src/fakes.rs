//! In-memory collaborators (testing only)
//!
//! `ScriptedCollaborator` replays a queue of canned outcomes and records every
//! call it receives, so tests can assert on prompts and the run-dependency
//! chain without any network.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::collaborator::{CallOutcome, CallRequest, Collaborator, RunDependency};

/// A call as seen by a fake collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub request: CallRequest,
    pub run_depends: Vec<RunDependency>,
}

#[derive(Debug, Default)]
struct Script {
    queue: VecDeque<CallOutcome>,
    fallback: Option<CallOutcome>,
    calls: Vec<RecordedCall>,
}

/// Collaborator answering from a script.
///
/// Queued outcomes are consumed first; once the queue is empty the fallback
/// (if any) is repeated, otherwise the call fails with "script exhausted".
#[derive(Debug)]
pub struct ScriptedCollaborator {
    name: String,
    script: Mutex<Script>,
}

impl ScriptedCollaborator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: Mutex::new(Script::default()),
        }
    }

    /// Queue one outcome.
    pub fn respond(self, outcome: CallOutcome) -> Self {
        self.lock().queue.push_back(outcome);
        self
    }

    /// Queue a success with `content`.
    pub fn succeed(self, content: impl Into<String>) -> Self {
        self.respond(CallOutcome::success(content))
    }

    /// Queue a failure with `detail`.
    pub fn fail(self, detail: impl Into<String>) -> Self {
        self.respond(CallOutcome::failure(detail))
    }

    /// Answer with `outcome` whenever the queue is empty.
    pub fn always(self, outcome: CallOutcome) -> Self {
        self.lock().fallback = Some(outcome);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Calls filtered by request mode (`plan`, `assign`, ...).
    pub fn calls_in_mode(&self, mode: &str) -> Vec<RecordedCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.request.mode() == mode)
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Collaborator for ScriptedCollaborator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, request: &CallRequest, run_depends: &[RunDependency]) -> CallOutcome {
        let mut script = self.lock();
        script.calls.push(RecordedCall {
            request: request.clone(),
            run_depends: run_depends.to_vec(),
        });
        script
            .queue
            .pop_front()
            .or_else(|| script.fallback.clone())
            .unwrap_or_else(|| CallOutcome::failure(format!("{}: script exhausted", self.name)))
    }
}
