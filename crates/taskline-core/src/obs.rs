//! Structured lifecycle events for orchestration runs.
//!
//! Every run is wrapped in a `taskline.run` span (see [`run_span`]); the
//! `emit_*` functions log one event each with an `event` field naming it.

use tracing::{info, warn, Span};

/// Span that scopes all events of one run.
///
/// Attach it with `tracing::Instrument` so it follows the run across awaits.
pub fn run_span(run_id: &str, orchestrator: &str) -> Span {
    tracing::info_span!("taskline.run", run_id = %run_id, orchestrator = %orchestrator)
}

/// Emit event: run started.
pub fn emit_run_started(run_id: &str, objective: &str, workers: usize) {
    info!(
        event = "run.started",
        run_id = %run_id,
        objective = %objective,
        workers = workers,
    );
}

/// Emit event: plan received and parsed.
pub fn emit_plan_generated(manager: &str, tasks: usize) {
    info!(event = "plan.generated", manager = %manager, tasks = tasks);
}

/// Emit event: manager picked a worker for a task.
pub fn emit_task_assigned(task_id: i64, attempt: u32, worker_index: usize, worker: &str) {
    info!(
        event = "task.assigned",
        task_id = task_id,
        attempt = attempt,
        worker_index = worker_index,
        worker = %worker,
    );
}

/// Emit event: an assignment attempt failed and will be retried if budget remains.
pub fn emit_assignment_failed(task_id: i64, attempt: u32, error: &dyn std::fmt::Display) {
    warn!(
        event = "task.assignment_failed",
        task_id = task_id,
        attempt = attempt,
        error = %error,
    );
}

/// Emit event: worker result recorded.
pub fn emit_task_completed(task_id: i64, worker: &str, result_len: usize) {
    info!(
        event = "task.completed",
        task_id = task_id,
        worker = %worker,
        result_len = result_len,
    );
}

/// Emit event: final answer produced.
pub fn emit_final_answer(mode: &str, answer_len: usize) {
    info!(event = "answer.synthesized", mode = %mode, answer_len = answer_len);
}

/// Emit event: run finished, successfully or not.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, tasks_completed: usize, success: bool) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        tasks_completed = tasks_completed,
        success = success,
    );
}

/// Emit event: run aborted with an error (warning level).
pub fn emit_run_failed(run_id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "run.failed", run_id = %run_id, error = %error);
}
