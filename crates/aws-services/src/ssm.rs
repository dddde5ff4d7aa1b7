//! Token lookup over SSM Parameter Store.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::types::Parameter;
use tracing::{debug, instrument};

use relay::{GithubToken, RelayError, SecretStore};

/// [`SecretStore`] backed by `GetParameter` with `WithDecryption=true`.
#[derive(Debug, Clone)]
pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(aws_sdk_ssm::Client::new(config))
    }

    pub fn from_client(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for SsmParameterStore {
    #[instrument(skip(self))]
    async fn get_token(&self, name: &str) -> Result<GithubToken, RelayError> {
        let output = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| RelayError::SecretAccess {
                parameter: name.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let token = parameter_token(name, output.parameter())?;
        debug!("Fetched GitHub token");
        Ok(token)
    }
}

fn parameter_token(name: &str, parameter: Option<&Parameter>) -> Result<GithubToken, RelayError> {
    parameter
        .and_then(Parameter::value)
        .filter(|value| !value.is_empty())
        .map(GithubToken::new)
        .ok_or_else(|| RelayError::SecretAccess {
            parameter: name.to_string(),
            message: "parameter has no value".to_string(),
        })
}
