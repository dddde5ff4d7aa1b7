//! Trigger event source for the relay.
//!
//! CodePipeline notification rules publish to an SNS topic; the topic invokes
//! the Lambda function with a batch of records, each carrying one envelope as
//! its message body. This crate:
//!
//! - unpacks the batch into message bodies ([`sns_messages`]),
//! - hands them to [`relay::StatusRelay::process_batch`] ([`handle_batch`]),
//! - runs the `lambda_runtime` event loop ([`run`]).
//!
//! ## Error contract
//!
//! Any failing record fails the whole invocation. There is no partial-batch
//! response: Lambda redelivers (or dead-letters) the entire event according to
//! the function's async invocation settings.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** The [`relay`] crate never sees Lambda or SNS types.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use aws_lambda_events::event::sns::SnsEvent;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::{info, instrument};

use relay::{PublishedStatus, RelayError, StatusRelay};

/// Callback run after every invocation, whatever its outcome.
///
/// The composition root uses it to flush exported telemetry before Lambda
/// freezes the execution environment. The returned future is awaited before
/// the invocation's result is reported.
pub type InvocationHook = Arc<dyn Fn() -> HookFuture + Send + Sync>;

/// Future returned by an [`InvocationHook`].
pub type HookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Message bodies of every record, in delivery order.
pub fn sns_messages(event: &SnsEvent) -> Vec<&str> {
    event
        .records
        .iter()
        .map(|record| record.sns.message.as_str())
        .collect()
}

/// Relays every record of one SNS delivery.
pub async fn handle_batch(
    relay: &StatusRelay,
    event: &SnsEvent,
) -> Result<Vec<PublishedStatus>, RelayError> {
    relay.process_batch(sns_messages(event)).await
}

#[instrument(
    skip_all,
    fields(request_id = %event.context.request_id, records = event.payload.records.len())
)]
async fn handle_invocation(relay: &StatusRelay, event: LambdaEvent<SnsEvent>) -> Result<(), Error> {
    let published = handle_batch(relay, &event.payload).await?;
    info!(published = published.len(), "Relayed notification batch");
    Ok(())
}

/// Serves Lambda invocations until the runtime shuts down.
///
/// # Errors
///
/// Returns the runtime's error if the Lambda Runtime API becomes unreachable.
/// Per-invocation failures are reported to the runtime, not returned here.
pub async fn run(relay: Arc<StatusRelay>, after_invocation: InvocationHook) -> Result<(), Error> {
    lambda_runtime::run(service_fn(move |event: LambdaEvent<SnsEvent>| {
        let relay = Arc::clone(&relay);
        let after_invocation = Arc::clone(&after_invocation);
        async move {
            let result = handle_invocation(&relay, event).await;
            after_invocation().await;
            result
        }
    }))
    .await
}
