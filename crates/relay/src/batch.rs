//! Per-batch orchestration.
//!
//! [`StatusRelay`] runs every message of a batch through the same seven
//! steps, strictly in order:
//!
//! 1. decode the envelope
//! 2. validate required fields
//! 3. look up the execution and pick its first artifact revision
//! 4. derive `owner/repo` from the revision URL
//! 5. map the pipeline state to a commit state
//! 6. read the GitHub token
//! 7. publish the commit status
//!
//! The first failing message aborts the batch; later messages are not
//! touched. Messages are processed one after the other, never concurrently.

use std::sync::Arc;

use tracing::field::Empty;
use tracing::{debug, info, instrument, warn, Span};

use crate::ports::{ExecutionResolver, SecretStore, StatusPublisher};
use crate::repository::extract_repository_id;
use crate::{CommitSha, CommitState, NotificationEnvelope, RelayError, RepositoryId, StatusReport};

/// Process-wide settings the relay needs on every message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    /// Region used in console deep links.
    pub region: String,
    /// Parameter store name of the GitHub token.
    pub token_parameter: String,
}

/// What was published for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedStatus {
    pub repository: RepositoryId,
    pub commit: CommitSha,
    pub report: StatusReport,
}

/// Relays pipeline state changes to commit statuses.
///
/// Holds the shared infrastructure clients; construct once at start-up and
/// reuse for every invocation.
pub struct StatusRelay {
    settings: RelaySettings,
    executions: Arc<dyn ExecutionResolver>,
    secrets: Arc<dyn SecretStore>,
    publisher: Arc<dyn StatusPublisher>,
}

impl StatusRelay {
    pub fn new(
        settings: RelaySettings,
        executions: Arc<dyn ExecutionResolver>,
        secrets: Arc<dyn SecretStore>,
        publisher: Arc<dyn StatusPublisher>,
    ) -> Self {
        Self {
            settings,
            executions,
            secrets,
            publisher,
        }
    }

    /// Processes every message of a batch in order.
    ///
    /// Returns one [`PublishedStatus`] per message on success.
    ///
    /// # Errors
    ///
    /// The error of the first failing message. Messages after it are skipped.
    pub async fn process_batch<'a, I>(&self, messages: I) -> Result<Vec<PublishedStatus>, RelayError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut published = Vec::new();
        for (index, message) in messages.into_iter().enumerate() {
            match self.process_message(message).await {
                Ok(status) => published.push(status),
                Err(err) => {
                    warn!(
                        message_index = index,
                        processed = published.len(),
                        retry_policy = ?err.retry_policy(),
                        error = %err,
                        "Aborting notification batch"
                    );
                    return Err(err);
                }
            }
        }
        Ok(published)
    }

    /// Runs one SNS message body through all seven steps.
    #[instrument(
        skip_all,
        fields(pipeline = Empty, execution_id = Empty, state = Empty)
    )]
    pub async fn process_message(&self, raw: &str) -> Result<PublishedStatus, RelayError> {
        let envelope = NotificationEnvelope::decode(raw)?;
        let event = envelope.validate()?;

        let span = Span::current();
        span.record("pipeline", event.pipeline.as_str());
        span.record("execution_id", event.execution_id.as_str());
        span.record("state", event.state.as_str());
        debug!(
            account = %envelope.account,
            region = %envelope.region,
            trigger_type = %envelope.detail.execution_trigger.trigger_type,
            "Decoded pipeline state change"
        );

        let record = self
            .executions
            .get_execution(&event.pipeline, &event.execution_id)
            .await?;
        let source = record.source_revision(&event.pipeline, &event.execution_id)?;
        let repository = extract_repository_id(&source.url)?;

        let state = CommitState::from_pipeline_state(&event.state);
        let report = StatusReport::new(
            &event.pipeline,
            &event.execution_id,
            state,
            &self.settings.region,
        );

        let token = self.secrets.get_token(&self.settings.token_parameter).await?;
        self.publisher
            .publish(&repository, &source.commit, &report, &token)
            .await?;

        info!(
            repository = %repository,
            commit = %source.commit,
            commit_state = %state,
            "Published commit status"
        );

        Ok(PublishedStatus {
            repository,
            commit: source.commit,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeExecutions, FakeSecrets, RecordingPublisher};
    use crate::ports::ArtifactRevision;
    use serde_json::json;

    fn message(state: &str) -> String {
        json!({
            "detail": {
                "pipeline": "demo",
                "execution-id": "abc123",
                "state": state
            }
        })
        .to_string()
    }

    fn relay(
        executions: Arc<FakeExecutions>,
        secrets: Arc<FakeSecrets>,
        publisher: Arc<RecordingPublisher>,
    ) -> StatusRelay {
        StatusRelay::new(
            RelaySettings {
                region: "eu-west-1".into(),
                token_parameter: "/demo-app/GITHUB_TOKEN".into(),
            },
            executions,
            secrets,
            publisher,
        )
    }

    #[tokio::test]
    async fn lower_case_state_is_published_as_pending() {
        let executions = Arc::new(FakeExecutions::with_revision(
            "deadbeef",
            "https://github.com/acme/widgets/commit/deadbeef",
        ));
        let secrets = Arc::new(FakeSecrets::with_token("tok"));
        let publisher = Arc::new(RecordingPublisher::accepting());

        let status = relay(executions, secrets, publisher.clone())
            .process_message(&message("started"))
            .await
            .unwrap();

        assert_eq!(status.report.state, CommitState::Pending);
        assert_eq!(status.repository.as_str(), "acme/widgets");
        assert_eq!(publisher.calls().len(), 1);
    }

    #[tokio::test]
    async fn null_envelope_fields_do_not_block_publishing() {
        let executions = Arc::new(FakeExecutions::with_revision(
            "deadbeef",
            "https://github.com/acme/widgets/commit/deadbeef",
        ));
        let secrets = Arc::new(FakeSecrets::with_token("tok"));
        let publisher = Arc::new(RecordingPublisher::accepting());
        let raw = json!({
            "resources": null,
            "additionalAttributes": null,
            "detail": {
                "pipeline": "demo",
                "execution-id": "abc123",
                "execution-trigger": { "trigger-type": null },
                "state": "SUCCEEDED"
            }
        })
        .to_string();

        let status = relay(executions, secrets, publisher.clone())
            .process_message(&raw)
            .await
            .unwrap();

        assert_eq!(status.report.state, CommitState::Success);
        assert_eq!(publisher.calls().len(), 1);
    }

    #[tokio::test]
    async fn token_is_read_from_configured_parameter() {
        let executions = Arc::new(FakeExecutions::with_revision(
            "deadbeef",
            "https://github.com/acme/widgets/commit/deadbeef",
        ));
        let secrets = Arc::new(FakeSecrets::with_token("tok"));
        let publisher = Arc::new(RecordingPublisher::accepting());

        relay(executions, secrets.clone(), publisher)
            .process_message(&message("SUCCEEDED"))
            .await
            .unwrap();

        assert_eq!(secrets.requested(), vec!["/demo-app/GITHUB_TOKEN".to_string()]);
    }

    #[tokio::test]
    async fn malformed_url_stops_before_secret_and_publish() {
        let executions = Arc::new(FakeExecutions::returning(vec![ArtifactRevision {
            revision_id: Some("deadbeef".into()),
            revision_url: Some("https://short".into()),
        }]));
        let secrets = Arc::new(FakeSecrets::with_token("tok"));
        let publisher = Arc::new(RecordingPublisher::accepting());

        let err = relay(executions, secrets.clone(), publisher.clone())
            .process_message(&message("SUCCEEDED"))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::MalformedRevisionUrl { .. }));
        assert!(secrets.requested().is_empty());
        assert!(publisher.calls().is_empty());
    }
}
