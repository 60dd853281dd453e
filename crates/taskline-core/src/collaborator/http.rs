//! JSON-over-HTTP collaborator.
//!
//! Posts `{"action": ..., <fields>, "run_depends": [...]}` to a fixed endpoint
//! and expects `{"status": "success" | "failure", "content": "..."}` back.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::collaborator::{CallOutcome, CallRequest, Collaborator, RunDependency};

#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(flatten)]
    request: &'a CallRequest,
    run_depends: &'a [RunDependency],
}

/// A manager or worker reachable over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCollaborator {
    name: String,
    endpoint: String,
    http_client: reqwest::Client,
}

impl HttpCollaborator {
    /// Build a collaborator. `timeout` of `None` leaves calls unbounded.
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("taskline/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            name: name.into(),
            endpoint: endpoint.into(),
            http_client: builder.build()?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(
        &self,
        request: &CallRequest,
        run_depends: &[RunDependency],
    ) -> Result<CallOutcome, String> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&Envelope {
                request,
                run_depends,
            })
            .send()
            .await
            .map_err(|e| format!("request to {} failed: {e}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("{} returned {status}: {body}", self.endpoint));
        }

        response
            .json::<CallOutcome>()
            .await
            .map_err(|e| format!("invalid response from {}: {e}", self.endpoint))
    }
}

#[async_trait]
impl Collaborator for HttpCollaborator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, request: &CallRequest, run_depends: &[RunDependency]) -> CallOutcome {
        debug!(
            collaborator = %self.name,
            endpoint = %self.endpoint(),
            mode = request.mode(),
            "posting request"
        );
        match self.post(request, run_depends).await {
            Ok(outcome) => outcome,
            Err(detail) => {
                warn!(collaborator = %self.name, error = %detail, "collaborator call failed");
                CallOutcome::failure(detail)
            }
        }
    }
}
