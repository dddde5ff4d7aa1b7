//! Commit-status value types.
//!
//! GitHub's status API knows four states; the relay produces three of them
//! (`failure` is never used). [`StatusReport`] is the exact body POSTed to
//! GitHub, so its field order and names are part of the wire contract.

use serde::{Deserialize, Serialize};

use crate::{ExecutionId, PipelineName};

// ---------------------------------------------------------------------------
// State mapping
// ---------------------------------------------------------------------------

/// Commit status as understood by GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitState {
    Success,
    Pending,
    Error,
}

impl CommitState {
    /// Maps a CodePipeline execution state, compared case-insensitively.
    ///
    /// Unknown states (including `FAILED` and `CANCELLED`) map to
    /// [`CommitState::Error`].
    pub fn from_pipeline_state(state: &str) -> Self {
        match state.to_ascii_uppercase().as_str() {
            "SUCCEEDED" => CommitState::Success,
            "RESUMED" | "STARTED" | "STOPPING" | "STOPPED" | "SUPERSEDED" => CommitState::Pending,
            _ => CommitState::Error,
        }
    }

    /// Returns the wire name (`"success"`, `"pending"`, `"error"`).
    pub fn as_str(self) -> &'static str {
        match self {
            CommitState::Success => "success",
            CommitState::Pending => "pending",
            CommitState::Error => "error",
        }
    }
}

impl std::fmt::Display for CommitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Status report
// ---------------------------------------------------------------------------

/// Body of one `POST /repos/{owner}/{repo}/statuses/{sha}` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Status context label; the pipeline name.
    pub context: String,
    pub state: CommitState,
    /// Console deep link to the execution.
    pub target_url: String,
}

impl StatusReport {
    /// Builds the report for one execution state change.
    pub fn new(
        pipeline: &PipelineName,
        execution_id: &ExecutionId,
        state: CommitState,
        region: &str,
    ) -> Self {
        Self {
            context: pipeline.to_string(),
            state,
            target_url: console_execution_url(region, pipeline, execution_id),
        }
    }
}

/// Deep link to an execution in the CodePipeline console.
pub fn console_execution_url(
    region: &str,
    pipeline: &PipelineName,
    execution_id: &ExecutionId,
) -> String {
    format!(
        "https://{region}.console.aws.amazon.com/codesuite/codepipeline/pipelines/{pipeline}/executions/{execution_id}?region={region}"
    )
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// GitHub API token as read from the parameter store.
///
/// `Debug` is redacted so the token cannot leak through `tracing` fields or
/// error reports.
#[derive(Clone, PartialEq, Eq)]
pub struct GithubToken(String);

impl GithubToken {
    /// Wraps a plaintext token.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plaintext token for use in an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for GithubToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GithubToken(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succeeded_maps_to_success_in_any_case() {
        for state in ["SUCCEEDED", "succeeded", "Succeeded", "sUcCeEdEd"] {
            assert_eq!(CommitState::from_pipeline_state(state), CommitState::Success);
        }
    }

    #[test]
    fn in_flight_states_map_to_pending_in_any_case() {
        for state in ["RESUMED", "STARTED", "STOPPING", "STOPPED", "SUPERSEDED"] {
            assert_eq!(CommitState::from_pipeline_state(state), CommitState::Pending);
            assert_eq!(
                CommitState::from_pipeline_state(&state.to_lowercase()),
                CommitState::Pending
            );
        }
    }

    #[test]
    fn everything_else_maps_to_error() {
        for state in ["FAILED", "CANCELLED", "garbage", "SUCCEEDED ", "IN_PROGRESS"] {
            assert_eq!(CommitState::from_pipeline_state(state), CommitState::Error);
        }
    }

    #[test]
    fn report_serializes_to_github_body() {
        let report = StatusReport::new(
            &PipelineName::new("demo").unwrap(),
            &ExecutionId::new("abc123").unwrap(),
            CommitState::Success,
            "eu-west-1",
        );

        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"context":"demo","state":"success","target_url":"https://eu-west-1.console.aws.amazon.com/codesuite/codepipeline/pipelines/demo/executions/abc123?region=eu-west-1"}"#
        );
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = GithubToken::new("ghp_secret");
        assert_eq!(format!("{token:?}"), "GithubToken(***)");
        assert_eq!(token.expose(), "ghp_secret");
    }
}
