//! Linear orchestration engine.
//!
//! A run goes plan → execute every task in declared order → synthesize:
//!
//! 1. the manager returns a tagged JSON task list ([`LinearOrchestrator::get_plan`])
//! 2. per task, the manager picks a worker index inside a bounded
//!    [`FeedbackLoop`]; the chosen worker executes the task prompt, which
//!    carries the rendered results of the task's dependencies
//!    ([`LinearOrchestrator::execute_tasks`])
//! 3. the final answer is concatenated, passed through from the last task, or
//!    summarized by the manager ([`LinearOrchestrator::synthesize`])
//!
//! Assignment failures are retried with feedback. Everything else, including
//! a failing worker, aborts the run.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn, Instrument};
use uuid::Uuid;

use crate::collaborator::{
    CallOutcome, CallRequest, Collaborator, CollaboratorKind, Roster, RunDependency,
};
use crate::context::{render_all, render_dependencies};
use crate::domain::{
    AssignmentError, HistoryMessage, OrchestratorError, OrchestratorResult, Plan, ResultsMap,
    RunState, Task, TaskResult,
};
use crate::metrics::METRICS;
use crate::obs;
use crate::protocol::{self, IndexParse};
use crate::retry::FeedbackLoop;
use crate::synthesis::{local_answer, FinalAnswerMode};
use crate::validation::validate_dependency_order;

/// Behavior switches fixed at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorSettings {
    /// Assignment attempts per task before the run fails.
    pub max_assignment_attempts: u32,
    pub use_summarizer: bool,
    /// Only consulted when `use_summarizer` is set.
    pub summarize_all_answers: bool,
    /// Reject plans whose dependencies do not point to earlier tasks.
    pub validate_dependencies: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_assignment_attempts: 1,
            use_summarizer: true,
            summarize_all_answers: false,
            validate_dependencies: false,
        }
    }
}

impl OrchestratorSettings {
    pub fn final_answer_mode(&self) -> FinalAnswerMode {
        FinalAnswerMode::from_flags(self.use_summarizer, self.summarize_all_answers)
    }
}

/// Serializable view of an orchestrator's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrchestratorDescriptor {
    pub name: String,
    pub manager: String,
    pub workers: Vec<String>,
    #[serde(flatten)]
    pub settings: OrchestratorSettings,
    pub final_answer_mode: FinalAnswerMode,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub objective: String,
    pub final_answer: String,
    pub results: ResultsMap,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Manager-directed orchestrator executing tasks one at a time.
///
/// Run state lives on the instance; [`run`](Self::run) resets it first, so an
/// instance can be reused for consecutive runs but never for concurrent ones.
pub struct LinearOrchestrator {
    name: String,
    manager: Arc<dyn Collaborator>,
    roster: Roster,
    settings: OrchestratorSettings,
    state: RunState,
}

impl LinearOrchestrator {
    pub fn new(
        name: impl Into<String>,
        manager: Arc<dyn Collaborator>,
        workers: Vec<Arc<dyn Collaborator>>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            name: name.into(),
            manager,
            roster: Roster::new(workers),
            settings,
            state: RunState::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn results(&self) -> &ResultsMap {
        self.state.results()
    }

    pub fn reset_run_state(&mut self) {
        self.state.reset();
    }

    pub fn describe(&self) -> OrchestratorDescriptor {
        OrchestratorDescriptor {
            name: self.name.clone(),
            manager: self.manager.name().to_string(),
            workers: self.roster.names(),
            settings: self.settings,
            final_answer_mode: self.settings.final_answer_mode(),
        }
    }

    /// Run the whole pipeline for `objective`.
    pub async fn run(&mut self, objective: &str) -> OrchestratorResult<RunReport> {
        let run_id = Uuid::new_v4();
        let span = obs::run_span(&run_id.to_string(), &self.name);
        self.run_in_span(run_id, objective).instrument(span).await
    }

    async fn run_in_span(&mut self, run_id: Uuid, objective: &str) -> OrchestratorResult<RunReport> {
        let run_label = run_id.to_string();
        let started_at = Utc::now();
        let clock = Instant::now();

        self.reset_run_state();
        self.state.push_history(HistoryMessage::user(objective));
        METRICS.inc_runs();
        obs::emit_run_started(&run_label, objective, self.roster.len());

        let outcome = self.run_stages(objective).await;

        let duration_ms = clock.elapsed().as_millis() as u64;
        obs::emit_run_finished(
            &run_label,
            duration_ms,
            self.state.results().len(),
            outcome.is_ok(),
        );
        METRICS.flush();

        let final_answer = match outcome {
            Ok(answer) => answer,
            Err(e) => {
                obs::emit_run_failed(&run_label, &e);
                return Err(e);
            }
        };
        self.state
            .push_history(HistoryMessage::assistant(final_answer.clone()));

        Ok(RunReport {
            run_id,
            objective: objective.to_string(),
            final_answer,
            results: self.state.results().clone(),
            started_at,
            finished_at: Utc::now(),
        })
    }

    async fn run_stages(&mut self, objective: &str) -> OrchestratorResult<String> {
        let plan = self.get_plan(objective).await?;
        self.execute_tasks(&plan, objective).await?;
        self.synthesize(objective).await
    }

    /// Ask the manager for a plan and parse it.
    #[instrument(skip(self, objective), fields(manager = %self.manager.name()))]
    pub async fn get_plan(&mut self, objective: &str) -> OrchestratorResult<Plan> {
        let request = CallRequest::Plan {
            input_task: objective.to_string(),
            agents: self.roster.description().to_string(),
        };
        let outcome = self.call_manager(&request).await;
        if !outcome.is_success() {
            return Err(OrchestratorError::PlanRequestFailed {
                manager: self.manager.name().to_string(),
                detail: outcome.content,
            });
        }
        debug!(response = %outcome.content, "plan response received");

        let plan = protocol::parse_plan(&outcome.content).map_err(OrchestratorError::PlanParse)?;
        if self.settings.validate_dependencies {
            validate_dependency_order(&plan)?;
        }
        if plan.is_empty() {
            warn!("manager returned an empty plan");
        }

        obs::emit_plan_generated(self.manager.name(), plan.len());
        Ok(plan)
    }

    /// Execute every task of `plan` in declared order, stopping at the first
    /// fatal error.
    pub async fn execute_tasks(&mut self, plan: &Plan, objective: &str) -> OrchestratorResult<()> {
        for task in plan {
            self.execute_task(task, objective).await?;
        }
        Ok(())
    }

    #[instrument(skip(self, task, objective), fields(task_id = task.id, task_name = %task.name))]
    async fn execute_task(&mut self, task: &Task, objective: &str) -> OrchestratorResult<()> {
        let mut prompt = task.instruction();
        let context = render_dependencies(&task.dependencies, self.state.results());
        if !context.is_empty() {
            prompt.push('\n');
            prompt.push_str(&context);
        }

        let mut attempts = FeedbackLoop::new(self.settings.max_assignment_attempts, prompt);
        while let Some(attempt) = attempts.next_attempt() {
            debug!(
                attempt,
                max_attempts = attempts.max_attempts(),
                "requesting assignment"
            );
            let request = CallRequest::Assign {
                input_task: objective.to_string(),
                task: attempts.prompt().to_string(),
                agents: self.roster.description().to_string(),
            };
            let outcome = self.call_manager(&request).await;

            match self.resolve_assignment(outcome) {
                Ok((worker_index, worker)) => {
                    obs::emit_task_assigned(task.id, attempt, worker_index, worker.name());
                    return self
                        .dispatch(task, worker_index, worker, attempts.prompt())
                        .await;
                }
                Err(failure) => {
                    obs::emit_assignment_failed(task.id, attempt, &failure);
                    METRICS.inc_assignment_retries();
                    attempts.absorb(&failure);
                }
            }
        }

        Err(OrchestratorError::TaskExecutionFailed {
            task_id: task.id,
            task_name: task.name.clone(),
            attempts: attempts.attempts(),
            last_error: attempts
                .last_failure()
                .unwrap_or("no assignment attempts allowed")
                .to_string(),
        })
    }

    /// Turn the manager's assign answer into a roster slot.
    fn resolve_assignment(
        &self,
        outcome: CallOutcome,
    ) -> Result<(usize, Arc<dyn Collaborator>), AssignmentError> {
        if !outcome.is_success() {
            return Err(AssignmentError::ManagerFailed {
                detail: outcome.content,
            });
        }

        let proposed = protocol::parse_worker_index(&outcome.content).map_err(|_| {
            AssignmentError::UnparseableIndex {
                raw: outcome.content.clone(),
            }
        })?;
        if proposed.parse == IndexParse::LeadingDigits {
            warn!(raw = %outcome.content, index = proposed.value, "worker index read from leading digits");
        }

        self.roster
            .checked_index(proposed.value)
            .and_then(|i| self.roster.get(i).map(|w| (i, Arc::clone(w))))
            .ok_or(AssignmentError::IndexOutOfRange {
                index: proposed.value,
                roster_len: self.roster.len(),
            })
    }

    async fn dispatch(
        &mut self,
        task: &Task,
        worker_index: usize,
        worker: Arc<dyn Collaborator>,
        prompt: &str,
    ) -> OrchestratorResult<()> {
        METRICS.inc_worker_calls();
        let request = CallRequest::Execute {
            input: prompt.to_string(),
        };
        let outcome = worker.run(&request, self.state.run_depends()).await;
        if !outcome.is_success() {
            return Err(OrchestratorError::WorkerExecutionFailed {
                task_id: task.id,
                task_name: task.name.clone(),
                worker_index,
                worker: worker.name().to_string(),
                detail: outcome.content,
            });
        }

        self.state
            .depend_on(RunDependency::new(worker.name(), CollaboratorKind::Worker));
        obs::emit_task_completed(task.id, worker.name(), outcome.content.len());
        METRICS.inc_tasks_completed();
        self.state.record_result(TaskResult {
            id: task.id,
            name: task.name.clone(),
            result: outcome.content,
        })
    }

    /// Produce the final answer from the recorded results.
    #[instrument(skip(self, objective), fields(mode = self.settings.final_answer_mode().as_str()))]
    pub async fn synthesize(&mut self, objective: &str) -> OrchestratorResult<String> {
        let mode = self.settings.final_answer_mode();
        if let Some(answer) = local_answer(mode, self.state.results()) {
            obs::emit_final_answer(mode.as_str(), answer.len());
            return Ok(answer);
        }

        let request = CallRequest::Summarize {
            input_task: objective.to_string(),
            chat_history: self.state.history().to_vec(),
            tasks_outputs: render_all(self.state.results()),
        };
        let outcome = self.call_manager(&request).await;
        if !outcome.is_success() {
            return Err(OrchestratorError::SummaryRequestFailed {
                manager: self.manager.name().to_string(),
                detail: outcome.content,
            });
        }

        let answer = protocol::extract_final_answer(&outcome.content)
            .map_err(OrchestratorError::FinalAnswerParse)?;
        obs::emit_final_answer(FinalAnswerMode::Summarize.as_str(), answer.len());
        Ok(answer)
    }

    async fn call_manager(&mut self, request: &CallRequest) -> CallOutcome {
        METRICS.inc_manager_calls();
        debug!(manager = %self.manager.name(), mode = request.mode(), "calling manager");
        let outcome = self.manager.run(request, self.state.run_depends()).await;
        if outcome.is_success() {
            self.state.depend_on(RunDependency::new(
                self.manager.name(),
                CollaboratorKind::Manager,
            ));
        }
        outcome
    }
}
