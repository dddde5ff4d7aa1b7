//! Error and retry-classification types for the relay.
//!
//! [`RelayError`] is the single error type that flows out of a batch. Every
//! failure aborts the batch; the Lambda platform's own redelivery policy then
//! decides what happens next.
//!
//! [`RetryPolicy`] does not drive any retry inside the relay. It is logged
//! with each failure so an operator can tell whether a redelivery of the same
//! notification has any chance of succeeding.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether redelivering the failed notification could plausibly succeed.
///
/// ## Rules
///
/// - `Retryable`: upstream API failures, secret store failures, non-2xx
///   responses from GitHub, transport failures.
/// - `NonRetryable`: undecodable or incomplete notifications, executions
///   without a usable artifact revision, revision URLs of an unknown shape,
///   invalid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// The same input may succeed on a later attempt.
    Retryable,
    /// The same input will fail again; a human has to look at it.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Relay errors
// ---------------------------------------------------------------------------

/// Errors that abort processing of an inbound notification batch.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The message body is not valid JSON or does not have the envelope shape.
    #[error("failed to decode notification envelope: {source}")]
    Decode {
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },

    /// One or more required envelope fields are empty or absent.
    #[error("missing required data in notification: {}", .missing.join(", "))]
    Validation {
        /// Wire names of the missing fields, in declaration order.
        missing: Vec<&'static str>,
    },

    /// The execution lookup call failed.
    #[error("failed to get pipeline execution {pipeline}/{execution_id}: {message}")]
    Upstream {
        /// Pipeline that was queried.
        pipeline: String,
        /// Execution that was queried.
        execution_id: String,
        /// Provider error description.
        message: String,
    },

    /// The execution exists but carries no artifact revision.
    ///
    /// Typical for pipelines whose source action is not a Git provider.
    #[error("pipeline execution {pipeline}/{execution_id} has no artifact revisions")]
    NoArtifactRevisions {
        /// Pipeline that was queried.
        pipeline: String,
        /// Execution that was queried.
        execution_id: String,
    },

    /// The first artifact revision lacks a field the relay needs.
    #[error("artifact revision of {pipeline}/{execution_id} has no {field}")]
    IncompleteRevision {
        /// Pipeline that was queried.
        pipeline: String,
        /// Execution that was queried.
        execution_id: String,
        /// Name of the absent field.
        field: &'static str,
    },

    /// No `owner/repo` could be derived from the revision URL.
    #[error("cannot derive repository from revision URL '{url}'")]
    MalformedRevisionUrl {
        /// The offending URL.
        url: String,
    },

    /// The API token could not be read from the parameter store.
    #[error("failed to get secret value '{parameter}': {message}")]
    SecretAccess {
        /// Parameter name that was requested.
        parameter: String,
        /// Store error description.
        message: String,
    },

    /// GitHub answered the status POST with a non-2xx code.
    #[error("GitHub API returned unexpected status code: {status}")]
    Publish {
        /// HTTP status code of the response.
        status: u16,
    },

    /// The status POST never produced a response (DNS, TLS, timeout, ...).
    #[error("failed to make GitHub request: {message}")]
    Transport {
        /// Client error description.
        message: String,
    },

    /// Start-up configuration is invalid.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl RelayError {
    /// Classifies whether redelivery of the same notification could succeed.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            RelayError::Upstream { .. }
            | RelayError::SecretAccess { .. }
            | RelayError::Publish { .. }
            | RelayError::Transport { .. } => RetryPolicy::Retryable,
            RelayError::Decode { .. }
            | RelayError::Validation { .. }
            | RelayError::NoArtifactRevisions { .. }
            | RelayError::IncompleteRevision { .. }
            | RelayError::MalformedRevisionUrl { .. }
            | RelayError::Configuration { .. } => RetryPolicy::NonRetryable,
        }
    }
}
