//! In-memory fakes for the port traits (testing only).
//!
//! Provides [`FakeExecutions`], [`FakeSecrets`], and [`RecordingPublisher`]
//! that satisfy the port contracts without any network access and record
//! every call they receive, so tests can assert which outbound calls a
//! relay run made.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{ArtifactRevision, ExecutionRecord, ExecutionResolver, SecretStore, StatusPublisher};
use crate::{CommitSha, ExecutionId, GithubToken, PipelineName, RelayError, RepositoryId, StatusReport};

// ---------------------------------------------------------------------------
// FakeExecutions
// ---------------------------------------------------------------------------

/// Execution resolver returning a fixed record, or a fixed failure.
#[derive(Debug)]
pub struct FakeExecutions {
    revisions: Vec<ArtifactRevision>,
    failure: Option<String>,
    lookups: Mutex<Vec<(String, String)>>,
}

impl FakeExecutions {
    /// Returns `revisions` for every lookup.
    pub fn returning(revisions: Vec<ArtifactRevision>) -> Self {
        Self {
            revisions,
            failure: None,
            lookups: Mutex::new(Vec::new()),
        }
    }

    /// Returns a single revision for every lookup.
    pub fn with_revision(revision_id: &str, revision_url: &str) -> Self {
        Self::returning(vec![ArtifactRevision {
            revision_id: Some(revision_id.to_string()),
            revision_url: Some(revision_url.to_string()),
        }])
    }

    /// Fails every lookup with [`RelayError::Upstream`].
    pub fn failing(message: &str) -> Self {
        Self {
            revisions: Vec::new(),
            failure: Some(message.to_string()),
            lookups: Mutex::new(Vec::new()),
        }
    }

    /// `(pipeline, execution_id)` of every lookup, in call order.
    pub fn lookups(&self) -> Vec<(String, String)> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionResolver for FakeExecutions {
    async fn get_execution(
        &self,
        pipeline: &PipelineName,
        execution_id: &ExecutionId,
    ) -> Result<ExecutionRecord, RelayError> {
        self.lookups
            .lock()
            .unwrap()
            .push((pipeline.to_string(), execution_id.to_string()));
        match &self.failure {
            Some(message) => Err(RelayError::Upstream {
                pipeline: pipeline.to_string(),
                execution_id: execution_id.to_string(),
                message: message.clone(),
            }),
            None => Ok(ExecutionRecord {
                artifact_revisions: self.revisions.clone(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// FakeSecrets
// ---------------------------------------------------------------------------

/// Secret store holding a single token, or refusing access.
#[derive(Debug)]
pub struct FakeSecrets {
    token: Option<String>,
    requested: Mutex<Vec<String>>,
}

impl FakeSecrets {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Fails every read with [`RelayError::SecretAccess`].
    pub fn denied() -> Self {
        Self {
            token: None,
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Parameter names requested so far.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecretStore for FakeSecrets {
    async fn get_token(&self, name: &str) -> Result<GithubToken, RelayError> {
        self.requested.lock().unwrap().push(name.to_string());
        self.token
            .as_deref()
            .map(GithubToken::new)
            .ok_or_else(|| RelayError::SecretAccess {
                parameter: name.to_string(),
                message: "AccessDeniedException".to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// RecordingPublisher
// ---------------------------------------------------------------------------

/// One recorded publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCall {
    pub repository: RepositoryId,
    pub commit: CommitSha,
    pub report: StatusReport,
    pub token: String,
}

/// Status publisher that records calls and answers with a fixed HTTP status.
#[derive(Debug)]
pub struct RecordingPublisher {
    status: u16,
    calls: Mutex<Vec<PublishCall>>,
}

impl RecordingPublisher {
    /// Answers every call with `201 Created`.
    pub fn accepting() -> Self {
        Self::responding(201)
    }

    /// Answers every call with `status`; non-2xx becomes [`RelayError::Publish`].
    pub fn responding(status: u16) -> Self {
        Self {
            status,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<PublishCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusPublisher for RecordingPublisher {
    async fn publish(
        &self,
        repository: &RepositoryId,
        commit: &CommitSha,
        report: &StatusReport,
        token: &GithubToken,
    ) -> Result<(), RelayError> {
        self.calls.lock().unwrap().push(PublishCall {
            repository: repository.clone(),
            commit: commit.clone(),
            report: report.clone(),
            token: token.expose().to_string(),
        });
        if (200..300).contains(&self.status) {
            Ok(())
        } else {
            Err(RelayError::Publish {
                status: self.status,
            })
        }
    }
}
