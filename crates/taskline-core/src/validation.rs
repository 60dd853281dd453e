//! Opt-in dependency checks for manager-produced plans.
//!
//! By default a plan runs as declared even when a task depends on a later or
//! unknown task; such dependencies just render no context. With
//! `validate_dependencies` enabled the orchestrator rejects those plans
//! instead. Requiring every dependency to point backwards in declaration
//! order also rules out cycles.

use crate::domain::{Plan, TaskId};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlanningError {
    #[error("task {task_id} depends on unknown task {missing_dependency}")]
    MissingDependency {
        task_id: TaskId,
        missing_dependency: TaskId,
    },
    #[error("task {task_id} depends on task {dependency}, which is not declared before it")]
    ForwardDependency { task_id: TaskId, dependency: TaskId },
}

/// Check that every dependency names a task declared earlier in the plan.
pub fn validate_dependency_order(plan: &Plan) -> Result<(), PlanningError> {
    for (position, task) in plan.iter().enumerate() {
        for &dep in &task.dependencies {
            match plan.position(dep) {
                None => {
                    return Err(PlanningError::MissingDependency {
                        task_id: task.id,
                        missing_dependency: dep,
                    })
                }
                Some(dep_position) if dep_position >= position => {
                    return Err(PlanningError::ForwardDependency {
                        task_id: task.id,
                        dependency: dep,
                    })
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}
