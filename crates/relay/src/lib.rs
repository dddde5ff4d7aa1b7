//! Core domain for the CodePipeline → GitHub commit-status relay.
//!
//! This crate contains the envelope model, the identifier newtypes, the pure
//! mapping functions, the port traits infrastructure crates implement, and
//! the [`StatusRelay`] that drives one notification batch end to end.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`envelope`] | Notification envelope decoding and validation |
//! | [`identifiers`] | Newtype identifiers (`PipelineName`, `CommitSha`, etc.) |
//! | [`repository`] | `owner/repo` extraction from revision URLs |
//! | [`status`] | Commit state mapping and the status report body |
//! | [`ports`] | Execution, secret, and publisher traits |
//! | [`batch`] | Per-batch orchestration |
//! | [`errors`] | Error and retry-classification types |
//! | [`fakes`] | In-memory port implementations for tests |

pub mod batch;
pub mod envelope;
pub mod errors;
pub mod fakes;
pub mod identifiers;
pub mod ports;
pub mod repository;
pub mod status;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use batch::{PublishedStatus, RelaySettings, StatusRelay};
pub use envelope::{Detail, ExecutionTrigger, NotificationEnvelope, ValidatedEvent};
pub use errors::{RelayError, RetryPolicy};
pub use identifiers::{CommitSha, ExecutionId, PipelineName, RepositoryId};
pub use ports::{
    ArtifactRevision, ExecutionRecord, ExecutionResolver, SecretStore, SourceRevision,
    StatusPublisher,
};
pub use repository::extract_repository_id;
pub use status::{console_execution_url, CommitState, GithubToken, StatusReport};
