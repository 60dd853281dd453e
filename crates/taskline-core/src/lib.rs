//! Taskline Core Library
//!
//! Linear, manager-directed task orchestration: a manager collaborator
//! decomposes an objective into a dependency-annotated plan and assigns each
//! task to a worker; workers run sequentially with their dependencies'
//! results as context; the results are folded into a final answer.

pub mod collaborator;
pub mod config;
pub mod context;
pub mod domain;
pub mod fakes;
pub mod metrics;
pub mod obs;
pub mod orchestrator;
pub mod protocol;
pub mod retry;
pub mod synthesis;
pub mod telemetry;
pub mod validation;

pub use collaborator::{
    CallOutcome, CallRequest, CallStatus, Collaborator, CollaboratorKind, HttpCollaborator,
    Roster, RunDependency,
};
pub use config::{CollaboratorConfig, ConfigError, OrchestratorConfig, DEFAULT_CONFIG_FILE};
pub use context::{render_all, render_dependencies};
pub use domain::{
    AssignmentError, HistoryMessage, MessageRole, OrchestratorError, OrchestratorResult, Plan,
    ProtocolError, ResultsMap, RunState, Task, TaskId, TaskOutputSpec, TaskResult,
};
pub use metrics::METRICS;
pub use orchestrator::{
    LinearOrchestrator, OrchestratorDescriptor, OrchestratorSettings, RunReport,
};
pub use protocol::{extract_final_answer, parse_plan, parse_worker_index, IndexParse, WorkerIndex};
pub use retry::FeedbackLoop;
pub use synthesis::FinalAnswerMode;
pub use telemetry::init_tracing;
pub use validation::{validate_dependency_order, PlanningError};

/// Taskline version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
