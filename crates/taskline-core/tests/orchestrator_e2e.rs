//! End-to-end orchestration runs against scripted collaborators.
//!
//! Covers the plan → assign/execute → synthesize pipeline, dependency context
//! propagation, the run-dependency chain, and the three final-answer modes.

use std::sync::Arc;

use taskline_core::fakes::ScriptedCollaborator;
use taskline_core::{
    CallRequest, Collaborator, CollaboratorKind, HistoryMessage, LinearOrchestrator,
    OrchestratorError, OrchestratorSettings, RunDependency,
};

const TWO_TASK_PLAN: &str = r#"Here is the plan.
<output>
```json
[
  {"id": 1, "name": "Gather facts", "description": "Collect facts about Rust", "dependencies": [], "output": "bullet list"},
  {"id": 2, "name": "Write summary", "description": "Summarize the facts", "dependencies": [1], "output": {"summary": "string"}}
]
```
</output>"#;

fn settings(use_summarizer: bool, summarize_all_answers: bool) -> OrchestratorSettings {
    OrchestratorSettings {
        max_assignment_attempts: 3,
        use_summarizer,
        summarize_all_answers,
        validate_dependencies: false,
    }
}

fn orchestrator(
    manager: &Arc<ScriptedCollaborator>,
    workers: &[Arc<ScriptedCollaborator>],
    settings: OrchestratorSettings,
) -> LinearOrchestrator {
    LinearOrchestrator::new(
        "e2e",
        manager.clone(),
        workers
            .iter()
            .map(|w| w.clone() as Arc<dyn Collaborator>)
            .collect(),
        settings,
    )
}

fn worker_input(call: &CallRequest) -> &str {
    match call {
        CallRequest::Execute { input } => input,
        other => panic!("expected execute request, got {other:?}"),
    }
}

#[tokio::test]
async fn test_two_task_plan_propagates_dependency_context() {
    let manager = Arc::new(
        ScriptedCollaborator::new("manager")
            .succeed(TWO_TASK_PLAN)
            .succeed("0")
            .succeed("1"),
    );
    let researcher =
        Arc::new(ScriptedCollaborator::new("researcher").succeed("Rust has no GC"));
    let writer = Arc::new(ScriptedCollaborator::new("writer").succeed("Rust is memory safe"));

    let mut o = orchestrator(
        &manager,
        &[researcher.clone(), writer.clone()],
        settings(true, false),
    );
    let report = o.run("Explain Rust").await.expect("run succeeds");

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results.get(1).unwrap().result, "Rust has no GC");
    assert_eq!(report.results.get(2).unwrap().name, "Write summary");
    assert_eq!(report.final_answer, "Rust is memory safe");

    // Task 1 has no dependencies, so its prompt carries no context.
    let first = researcher.calls();
    assert_eq!(first.len(), 1);
    let first_input = worker_input(&first[0].request);
    assert!(first_input.starts_with("**Collect facts about Rust**"));
    assert!(!first_input.contains("previously collected information"));

    // Task 2 sees task 1's name and result.
    let second = writer.calls();
    assert_eq!(second.len(), 1);
    let second_input = worker_input(&second[0].request);
    assert!(second_input.contains(r#"**Required information for output**: {"summary":"string"}"#));
    assert!(second_input.contains("**Task:** Gather facts\n**Result:** Rust has no GC"));
}

#[tokio::test]
async fn test_manager_sees_roster_and_objective() {
    let manager = Arc::new(
        ScriptedCollaborator::new("manager")
            .succeed(TWO_TASK_PLAN)
            .succeed("0")
            .succeed("1"),
    );
    let researcher = Arc::new(ScriptedCollaborator::new("researcher").succeed("a"));
    let writer = Arc::new(ScriptedCollaborator::new("writer").succeed("b"));
    let mut o = orchestrator(&manager, &[researcher, writer], settings(true, false));

    o.run("Explain Rust").await.unwrap();

    let plan_calls = manager.calls_in_mode("plan");
    assert_eq!(plan_calls.len(), 1);
    assert_eq!(
        plan_calls[0].request,
        CallRequest::Plan {
            input_task: "Explain Rust".to_string(),
            agents: "0. researcher\n1. writer".to_string(),
        }
    );

    let assign_calls = manager.calls_in_mode("assign");
    assert_eq!(assign_calls.len(), 2);
    for call in &assign_calls {
        match &call.request {
            CallRequest::Assign {
                input_task, agents, ..
            } => {
                assert_eq!(input_task, "Explain Rust");
                assert_eq!(agents, "0. researcher\n1. writer");
            }
            other => panic!("unexpected request {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_run_dependency_chain_follows_last_collaborator() {
    let manager = Arc::new(
        ScriptedCollaborator::new("manager")
            .succeed(TWO_TASK_PLAN)
            .succeed("0")
            .succeed("1"),
    );
    let researcher = Arc::new(ScriptedCollaborator::new("researcher").succeed("a"));
    let writer = Arc::new(ScriptedCollaborator::new("writer").succeed("b"));
    let mut o = orchestrator(
        &manager,
        &[researcher.clone(), writer.clone()],
        settings(true, false),
    );

    o.run("Explain Rust").await.unwrap();

    let manager_calls = manager.calls();
    // The plan call opens the run with an empty chain.
    assert!(manager_calls[0].run_depends.is_empty());
    // First assignment follows the plan call.
    assert_eq!(
        manager_calls[1].run_depends,
        vec![RunDependency::new("manager", CollaboratorKind::Manager)]
    );
    // Second assignment follows the researcher's execution.
    assert_eq!(
        manager_calls[2].run_depends,
        vec![RunDependency::new("researcher", CollaboratorKind::Worker)]
    );
    // Workers always follow the manager's assignment.
    assert_eq!(
        writer.calls()[0].run_depends,
        vec![RunDependency::new("manager", CollaboratorKind::Manager)]
    );
    assert_eq!(
        o.state().run_depends(),
        &[RunDependency::new("writer", CollaboratorKind::Worker)]
    );
}

#[tokio::test]
async fn test_concatenation_mode_when_summarizer_disabled() {
    let manager = Arc::new(
        ScriptedCollaborator::new("manager")
            .succeed(TWO_TASK_PLAN)
            .succeed("0")
            .succeed("0"),
    );
    let worker = Arc::new(ScriptedCollaborator::new("generalist").succeed("x").succeed("y"));
    let mut o = orchestrator(&manager, &[worker], settings(false, true));

    let report = o.run("Explain Rust").await.unwrap();
    assert_eq!(
        report.final_answer,
        "**Task:** Gather facts\n**Result:** x\n\n**Task:** Write summary\n**Result:** y"
    );
    assert!(manager.calls_in_mode("summarize").is_empty());
}

#[tokio::test]
async fn test_summarize_all_calls_manager_with_outputs_and_history() {
    let manager = Arc::new(
        ScriptedCollaborator::new("manager")
            .succeed(TWO_TASK_PLAN)
            .succeed("0")
            .succeed("0")
            .succeed("Draft...\n<final_answer>\nRust: safe and fast.\n</final_answer>"),
    );
    let worker = Arc::new(ScriptedCollaborator::new("generalist").succeed("x").succeed("y"));
    let mut o = orchestrator(&manager, &[worker], settings(true, true));

    let report = o.run("Explain Rust").await.unwrap();
    assert_eq!(report.final_answer, "Rust: safe and fast.");

    let summarize = manager.calls_in_mode("summarize");
    assert_eq!(summarize.len(), 1);
    assert_eq!(
        summarize[0].request,
        CallRequest::Summarize {
            input_task: "Explain Rust".to_string(),
            chat_history: vec![HistoryMessage::user("Explain Rust")],
            tasks_outputs:
                "**Task:** Gather facts\n**Result:** x\n\n**Task:** Write summary\n**Result:** y"
                    .to_string(),
        }
    );
}

#[tokio::test]
async fn test_summary_without_tags_is_final_answer_parse_error() {
    let manager = Arc::new(
        ScriptedCollaborator::new("manager")
            .succeed(TWO_TASK_PLAN)
            .succeed("0")
            .succeed("0")
            .succeed("Rust is great, trust me"),
    );
    let worker = Arc::new(ScriptedCollaborator::new("generalist").succeed("x").succeed("y"));
    let mut o = orchestrator(&manager, &[worker], settings(true, true));

    let err = o.run("Explain Rust").await.unwrap_err();
    assert!(matches!(err, OrchestratorError::FinalAnswerParse(_)));
}

#[tokio::test]
async fn test_failed_summary_call_aborts_run() {
    let manager = Arc::new(
        ScriptedCollaborator::new("manager")
            .succeed(TWO_TASK_PLAN)
            .succeed("0")
            .succeed("0")
            .fail("context window exceeded"),
    );
    let worker = Arc::new(ScriptedCollaborator::new("generalist").succeed("x").succeed("y"));
    let mut o = orchestrator(&manager, &[worker], settings(true, true));

    match o.run("Explain Rust").await.unwrap_err() {
        OrchestratorError::SummaryRequestFailed { manager, detail } => {
            assert_eq!(manager, "manager");
            assert_eq!(detail, "context window exceeded");
        }
        other => panic!("expected SummaryRequestFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_plan_with_last_task_mode_asks_manager() {
    let manager = Arc::new(
        ScriptedCollaborator::new("manager")
            .succeed("<output>[]</output>")
            .succeed("<final_answer>nothing to do</final_answer>"),
    );
    let worker = Arc::new(ScriptedCollaborator::new("generalist"));
    let mut o = orchestrator(&manager, &[worker.clone()], settings(true, false));

    let report = o.run("Nothing").await.unwrap();
    assert_eq!(report.final_answer, "nothing to do");
    assert!(report.results.is_empty());
    assert_eq!(worker.call_count(), 0);
}

#[tokio::test]
async fn test_consecutive_runs_start_from_clean_state() {
    let manager = Arc::new(
        ScriptedCollaborator::new("manager")
            .succeed(TWO_TASK_PLAN)
            .succeed("0")
            .succeed("0")
            .succeed(TWO_TASK_PLAN)
            .succeed("0")
            .succeed("0"),
    );
    let worker = Arc::new(
        ScriptedCollaborator::new("generalist")
            .succeed("first-a")
            .succeed("first-b")
            .succeed("second-a")
            .succeed("second-b"),
    );
    let mut o = orchestrator(&manager, &[worker], settings(true, false));

    let first = o.run("run one").await.unwrap();
    let second = o.run("run two").await.unwrap();

    assert_eq!(first.final_answer, "first-b");
    assert_eq!(second.final_answer, "second-b");
    assert_eq!(second.results.len(), 2);
    assert_ne!(first.run_id, second.run_id);
    // The second plan call starts a new chain.
    assert!(manager.calls_in_mode("plan")[1].run_depends.is_empty());
    assert_eq!(o.state().history()[0], HistoryMessage::user("run two"));
}

#[tokio::test]
async fn test_dependency_on_later_task_renders_header_only() {
    let plan = r#"<output>[
        {"id": 1, "name": "Early", "description": "needs later", "dependencies": [2], "output": "text"},
        {"id": 2, "name": "Later", "description": "independent", "dependencies": [], "output": "text"}
    ]</output>"#;
    let manager = Arc::new(
        ScriptedCollaborator::new("manager")
            .succeed(plan)
            .succeed("0")
            .succeed("0"),
    );
    let worker = Arc::new(ScriptedCollaborator::new("generalist").succeed("e").succeed("l"));
    let mut o = orchestrator(&manager, &[worker.clone()], settings(false, false));

    o.run("order check").await.unwrap();

    let calls = worker.calls();
    let early = worker_input(&calls[0].request);
    assert!(early.ends_with("**Here is the previously collected information:**"));
    assert!(!early.contains("**Task:** Later"));
}
