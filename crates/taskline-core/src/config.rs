//! TOML configuration for an orchestrator and its HTTP collaborators.
//!
//! ```toml
//! name = "research-team"
//! max_assignment_attempts = 3
//! use_summarizer = true
//! summarize_all_answers = false
//!
//! [manager]
//! name = "manager"
//! endpoint = "http://localhost:8080/manager"
//!
//! [[workers]]
//! name = "researcher"
//! endpoint = "http://localhost:8080/researcher"
//! timeout_secs = 60
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collaborator::{Collaborator, HttpCollaborator};
use crate::orchestrator::{LinearOrchestrator, OrchestratorSettings};

/// Default config file name looked up by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "taskline.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("failed to build HTTP client for {name}: {source}")]
    HttpClient {
        name: String,
        #[source]
        source: reqwest::Error,
    },
}

/// One HTTP-reachable collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorConfig {
    pub name: String,
    pub endpoint: String,
    /// Per-request timeout; 0 disables it.
    #[serde(default)]
    pub timeout_secs: u64,
}

impl CollaboratorConfig {
    fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    fn build(&self) -> Result<HttpCollaborator, ConfigError> {
        HttpCollaborator::new(&self.name, &self.endpoint, self.timeout()).map_err(|source| {
            ConfigError::HttpClient {
                name: self.name.clone(),
                source,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_max_assignment_attempts")]
    pub max_assignment_attempts: u32,
    #[serde(default = "default_true")]
    pub use_summarizer: bool,
    #[serde(default)]
    pub summarize_all_answers: bool,
    #[serde(default)]
    pub validate_dependencies: bool,
    pub manager: CollaboratorConfig,
    #[serde(default)]
    pub workers: Vec<CollaboratorConfig>,
}

fn default_name() -> String {
    "LinearOrchestrator".to_string()
}

fn default_max_assignment_attempts() -> u32 {
    OrchestratorSettings::default().max_assignment_attempts
}

fn default_true() -> bool {
    true
}

impl OrchestratorConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded orchestrator config");
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_assignment_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_assignment_attempts must be at least 1".to_string(),
            ));
        }
        if self.workers.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one worker is required".to_string(),
            ));
        }
        for collaborator in std::iter::once(&self.manager).chain(&self.workers) {
            if collaborator.name.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "collaborator names must not be blank".to_string(),
                ));
            }
            if collaborator.endpoint.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "collaborator '{}' has no endpoint",
                    collaborator.name
                )));
            }
        }
        Ok(())
    }

    pub fn settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            max_assignment_attempts: self.max_assignment_attempts,
            use_summarizer: self.use_summarizer,
            summarize_all_answers: self.summarize_all_answers,
            validate_dependencies: self.validate_dependencies,
        }
    }

    /// Validate and wire up HTTP collaborators into an orchestrator.
    pub fn build(&self) -> Result<LinearOrchestrator, ConfigError> {
        self.validate()?;
        let manager: Arc<dyn Collaborator> = Arc::new(self.manager.build()?);
        let workers = self
            .workers
            .iter()
            .map(|w| w.build().map(|c| Arc::new(c) as Arc<dyn Collaborator>))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LinearOrchestrator::new(
            &self.name,
            manager,
            workers,
            self.settings(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[manager]
name = "manager"
endpoint = "http://localhost:8080/manager"

[[workers]]
name = "researcher"
endpoint = "http://localhost:8080/researcher"
"#;

    #[test]
    fn test_defaults_applied() {
        let config = OrchestratorConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.name, "LinearOrchestrator");
        assert_eq!(config.max_assignment_attempts, 1);
        assert!(config.use_summarizer);
        assert!(!config.summarize_all_answers);
        assert!(!config.validate_dependencies);
        assert_eq!(config.workers[0].timeout_secs, 0);
        assert_eq!(config.workers[0].timeout(), None);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let raw = format!("max_assignment_attempts = 0\n{MINIMAL}");
        let err = OrchestratorConfig::from_toml_str(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_workers_rejected() {
        let raw = r#"
[manager]
name = "manager"
endpoint = "http://localhost:8080/manager"
"#;
        let err = OrchestratorConfig::from_toml_str(raw).unwrap_err();
        assert!(err.to_string().contains("at least one worker"));
    }

    #[test]
    fn test_missing_manager_is_parse_error() {
        let err = OrchestratorConfig::from_toml_str("name = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_build_wires_roster_in_order() {
        let raw = format!(
            "{MINIMAL}\n[[workers]]\nname = \"writer\"\nendpoint = \"http://localhost:8080/writer\"\ntimeout_secs = 30\n"
        );
        let config = OrchestratorConfig::from_toml_str(&raw).unwrap();
        let orchestrator = config.build().unwrap();
        assert_eq!(
            orchestrator.roster().description(),
            "0. researcher\n1. writer"
        );
        assert_eq!(orchestrator.describe().manager, "manager");
    }
}
