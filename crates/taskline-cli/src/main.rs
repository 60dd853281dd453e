//! Taskline - manager-directed task orchestration CLI
//!
//! ## Commands
//!
//! - `run`: plan, execute and synthesize an objective against the configured
//!   HTTP collaborators
//! - `describe`: show the orchestrator a config file would build
//! - `check-plan`: parse a saved manager plan response offline

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use taskline_core::{
    parse_plan, validate_dependency_order, OrchestratorConfig, Plan, RunReport, TaskId,
    DEFAULT_CONFIG_FILE,
};

#[derive(Parser)]
#[command(name = "taskline")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Linear, manager-directed task orchestration", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an objective through plan, assignment, execution and synthesis
    Run {
        /// Orchestrator config file
        #[arg(short, long, env = "TASKLINE_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// The objective to accomplish
        #[arg(short, long)]
        objective: String,

        /// Override max_assignment_attempts from the config
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Concatenate all task results instead of using the summarizer
        #[arg(long, conflicts_with = "summarize_all")]
        no_summarizer: bool,

        /// Ask the manager to summarize all task results
        #[arg(long)]
        summarize_all: bool,

        /// Print the full run report as JSON instead of the final answer
        #[arg(long)]
        json_output: bool,
    },

    /// Show the orchestrator a config file describes
    Describe {
        /// Orchestrator config file
        #[arg(short, long, env = "TASKLINE_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },

    /// Parse a saved plan response and list its tasks
    CheckPlan {
        /// File holding the manager's raw plan response
        #[arg(short, long)]
        file: PathBuf,

        /// Also require every dependency to point to an earlier task
        #[arg(long)]
        validate_dependencies: bool,
    },
}

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Default, Clone, Copy)]
struct RunOverrides {
    max_attempts: Option<u32>,
    no_summarizer: bool,
    summarize_all: bool,
}

impl RunOverrides {
    fn apply(&self, config: &mut OrchestratorConfig) {
        if let Some(max_attempts) = self.max_attempts {
            config.max_assignment_attempts = max_attempts;
        }
        if self.no_summarizer {
            config.use_summarizer = false;
        }
        if self.summarize_all {
            config.use_summarizer = true;
            config.summarize_all_answers = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    taskline_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Run {
            config,
            objective,
            max_attempts,
            no_summarizer,
            summarize_all,
            json_output,
        } => {
            let overrides = RunOverrides {
                max_attempts,
                no_summarizer,
                summarize_all,
            };
            cmd_run(&config, &objective, overrides, json_output).await
        }
        Commands::Describe { config } => cmd_describe(&config),
        Commands::CheckPlan {
            file,
            validate_dependencies,
        } => cmd_check_plan(&file, validate_dependencies),
    }
}

fn load_config(path: &Path, overrides: RunOverrides) -> Result<OrchestratorConfig> {
    let mut config = OrchestratorConfig::load(path)
        .with_context(|| format!("Failed to load config {:?}", path))?;
    overrides.apply(&mut config);
    config
        .validate()
        .context("Config is invalid after applying overrides")?;
    Ok(config)
}

/// Run one objective end to end
async fn cmd_run(
    config_path: &Path,
    objective: &str,
    overrides: RunOverrides,
    json_output: bool,
) -> Result<()> {
    let config = load_config(config_path, overrides)?;
    let mut orchestrator = config
        .build()
        .context("Failed to build orchestrator from config")?;

    info!(
        orchestrator = %orchestrator.name(),
        workers = orchestrator.roster().len(),
        "Starting run"
    );
    let report = orchestrator
        .run(objective)
        .await
        .with_context(|| format!("Run failed for objective {:?}", objective))?;

    println!("{}", render_report(&report, json_output)?);
    Ok(())
}

fn render_report(report: &RunReport, json_output: bool) -> Result<String> {
    if json_output {
        return serde_json::to_string_pretty(report).context("Failed to serialize run report");
    }
    Ok(report.final_answer.clone())
}

/// Print the resolved orchestrator configuration
fn cmd_describe(config_path: &Path) -> Result<()> {
    let config = load_config(config_path, RunOverrides::default())?;
    let orchestrator = config
        .build()
        .context("Failed to build orchestrator from config")?;
    let descriptor = orchestrator.describe();
    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    Ok(())
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct PlanSummary {
    tasks: usize,
    order: Vec<TaskId>,
    dependencies_validated: bool,
}

fn summarize_plan(raw: &str, validate_dependencies: bool) -> Result<(Plan, PlanSummary)> {
    let plan = parse_plan(raw).context("Plan response could not be parsed")?;
    if validate_dependencies {
        validate_dependency_order(&plan).context("Plan dependencies are invalid")?;
    }
    let summary = PlanSummary {
        tasks: plan.len(),
        order: plan.iter().map(|t| t.id).collect(),
        dependencies_validated: validate_dependencies,
    };
    Ok((plan, summary))
}

/// Parse a saved plan response and list its tasks
fn cmd_check_plan(file: &Path, validate_dependencies: bool) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read plan response {:?}", file))?;
    let (plan, summary) = summarize_plan(&raw, validate_dependencies)?;

    for task in &plan {
        println!("{}. {} (depends on {:?})", task.id, task.name, task.dependencies);
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
