//! Port traits implemented by the infrastructure crates.
//!
//! | Trait | Implemented by |
//! |-------|----------------|
//! | [`ExecutionResolver`] | `aws-services::CodePipelineExecutions` |
//! | [`SecretStore`] | `aws-services::SsmParameterStore` |
//! | [`StatusPublisher`] | `github::GithubStatusPublisher` |
//!
//! Implementations translate their transport failures into the matching
//! [`RelayError`] variant; nothing above this layer sees SDK or HTTP types.

use async_trait::async_trait;

use crate::{CommitSha, ExecutionId, GithubToken, PipelineName, RelayError, RepositoryId, StatusReport};

// ---------------------------------------------------------------------------
// Execution lookup
// ---------------------------------------------------------------------------

/// One source revision attached to a pipeline execution.
///
/// Both fields are optional because the provider may omit them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactRevision {
    pub revision_id: Option<String>,
    pub revision_url: Option<String>,
}

/// The parts of an execution the relay cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionRecord {
    /// Artifact revisions in provider order.
    pub artifact_revisions: Vec<ArtifactRevision>,
}

/// The commit a status is reported against, plus where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRevision {
    pub commit: CommitSha,
    pub url: String,
}

impl ExecutionRecord {
    /// Picks the first artifact revision and checks it names a commit.
    ///
    /// A missing revision URL becomes an empty string; repository extraction
    /// rejects it later with a message that includes the URL.
    pub fn source_revision(
        &self,
        pipeline: &PipelineName,
        execution_id: &ExecutionId,
    ) -> Result<SourceRevision, RelayError> {
        let first = self
            .artifact_revisions
            .first()
            .ok_or_else(|| RelayError::NoArtifactRevisions {
                pipeline: pipeline.to_string(),
                execution_id: execution_id.to_string(),
            })?;

        let commit = first
            .revision_id
            .clone()
            .and_then(CommitSha::new)
            .ok_or_else(|| RelayError::IncompleteRevision {
                pipeline: pipeline.to_string(),
                execution_id: execution_id.to_string(),
                field: "revision id",
            })?;

        Ok(SourceRevision {
            commit,
            url: first.revision_url.clone().unwrap_or_default(),
        })
    }
}

/// Looks up execution details at the CI/CD provider.
#[async_trait]
pub trait ExecutionResolver: Send + Sync {
    /// Fetches the execution identified by `pipeline` + `execution_id`.
    ///
    /// # Errors
    ///
    /// [`RelayError::Upstream`] if the provider call fails.
    async fn get_execution(
        &self,
        pipeline: &PipelineName,
        execution_id: &ExecutionId,
    ) -> Result<ExecutionRecord, RelayError>;
}

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

/// Reads decrypted secrets by name.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetches the current value of `name`. Never cached.
    ///
    /// # Errors
    ///
    /// [`RelayError::SecretAccess`] if the store call fails or the parameter
    /// has no value.
    async fn get_token(&self, name: &str) -> Result<GithubToken, RelayError>;
}

// ---------------------------------------------------------------------------
// Status publishing
// ---------------------------------------------------------------------------

/// Sends a commit status to the source-hosting platform.
#[async_trait]
pub trait StatusPublisher: Send + Sync {
    /// Publishes `report` for `commit` in `repository`. Sent exactly once.
    ///
    /// # Errors
    ///
    /// [`RelayError::Publish`] on a non-2xx response,
    /// [`RelayError::Transport`] if no response was received.
    async fn publish(
        &self,
        repository: &RepositoryId,
        commit: &CommitSha,
        report: &StatusReport,
        token: &GithubToken,
    ) -> Result<(), RelayError>;
}
