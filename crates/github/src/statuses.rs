//! Commit status publisher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use relay::{CommitSha, GithubToken, RelayError, RepositoryId, StatusPublisher, StatusReport};

/// Public GitHub API root.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("codepipeline-github-status/", env!("CARGO_PKG_VERSION"));
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Connection settings for [`GithubStatusPublisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubConfig {
    /// API root, e.g. `https://api.github.com` or a GitHub Enterprise
    /// `https://ghe.example.com/api/v3`. A trailing `/` is ignored.
    pub api_base: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Error payload GitHub returns alongside 4xx/5xx responses.
#[derive(Debug, Deserialize)]
struct GithubErrorBody {
    message: String,
}

/// Posts commit statuses through one shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct GithubStatusPublisher {
    client: reqwest::Client,
    api_base: String,
}

impl GithubStatusPublisher {
    /// Builds the HTTP client.
    ///
    /// # Errors
    ///
    /// [`RelayError::Configuration`] if the TLS backend cannot be initialised.
    pub fn new(config: GithubConfig) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| RelayError::Configuration {
                message: format!("failed to build GitHub HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn statuses_url(&self, repository: &RepositoryId, commit: &CommitSha) -> String {
        format!("{}/repos/{repository}/statuses/{commit}", self.api_base)
    }
}

#[async_trait]
impl StatusPublisher for GithubStatusPublisher {
    #[instrument(skip_all, fields(repository = %repository, commit = %commit, state = %report.state))]
    async fn publish(
        &self,
        repository: &RepositoryId,
        commit: &CommitSha,
        report: &StatusReport,
        token: &GithubToken,
    ) -> Result<(), RelayError> {
        let url = self.statuses_url(repository, commit);

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("token {}", token.expose()))
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .json(report)
            .send()
            .await
            .map_err(|e| RelayError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "GitHub accepted commit status");
            return Ok(());
        }

        // The body only feeds the log line; failing to read it is not an error.
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GithubErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or(body);
        warn!(
            status = status.as_u16(),
            github_message = %message,
            "GitHub rejected commit status"
        );

        Err(RelayError::Publish {
            status: status.as_u16(),
        })
    }
}
