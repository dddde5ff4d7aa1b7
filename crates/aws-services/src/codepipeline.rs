//! Execution lookup over CodePipeline.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_codepipeline::error::DisplayErrorContext;
use aws_sdk_codepipeline::types::{self, PipelineExecution};
use tracing::{debug, instrument};

use relay::{ArtifactRevision, ExecutionId, ExecutionRecord, ExecutionResolver, PipelineName, RelayError};

/// [`ExecutionResolver`] backed by `GetPipelineExecution`.
#[derive(Debug, Clone)]
pub struct CodePipelineExecutions {
    client: aws_sdk_codepipeline::Client,
}

impl CodePipelineExecutions {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(aws_sdk_codepipeline::Client::new(config))
    }

    pub fn from_client(client: aws_sdk_codepipeline::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExecutionResolver for CodePipelineExecutions {
    #[instrument(skip_all, fields(pipeline = %pipeline, execution_id = %execution_id))]
    async fn get_execution(
        &self,
        pipeline: &PipelineName,
        execution_id: &ExecutionId,
    ) -> Result<ExecutionRecord, RelayError> {
        let output = self
            .client
            .get_pipeline_execution()
            .pipeline_name(pipeline.as_str())
            .pipeline_execution_id(execution_id.as_str())
            .send()
            .await
            .map_err(|e| RelayError::Upstream {
                pipeline: pipeline.to_string(),
                execution_id: execution_id.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let record = execution_record(output.pipeline_execution());
        debug!(
            revisions = record.artifact_revisions.len(),
            "Fetched pipeline execution"
        );
        Ok(record)
    }
}

fn execution_record(execution: Option<&PipelineExecution>) -> ExecutionRecord {
    let artifact_revisions = execution
        .map(|e| e.artifact_revisions().iter().map(artifact_revision).collect())
        .unwrap_or_default();
    ExecutionRecord { artifact_revisions }
}

fn artifact_revision(revision: &types::ArtifactRevision) -> ArtifactRevision {
    ArtifactRevision {
        revision_id: revision.revision_id().map(str::to_string),
        revision_url: revision.revision_url().map(str::to_string),
    }
}
