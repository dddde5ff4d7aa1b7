//! AWS infrastructure adapter.
//!
//! Implements two of the ports defined in the [`relay`] crate:
//!
//! - [`CodePipelineExecutions`] — [`relay::ExecutionResolver`] over
//!   CodePipeline `GetPipelineExecution`.
//! - [`SsmParameterStore`] — [`relay::SecretStore`] over SSM
//!   `GetParameter` with decryption.
//!
//! Both clients are built from one [`aws_config::SdkConfig`], loaded once at
//! cold start with [`load_sdk_config`]. Credentials and region come from the
//! standard provider chain (the Lambda execution role in production).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** SDK types never leave this crate; failures are mapped
//! to [`relay::RelayError::Upstream`] and [`relay::RelayError::SecretAccess`].

pub mod codepipeline;
pub mod ssm;

pub use codepipeline::CodePipelineExecutions;
pub use ssm::SsmParameterStore;

use aws_config::{BehaviorVersion, SdkConfig};

/// Loads the shared SDK configuration from the default provider chain.
pub async fn load_sdk_config() -> SdkConfig {
    aws_config::load_defaults(BehaviorVersion::latest()).await
}
