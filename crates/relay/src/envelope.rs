//! Inbound notification envelope: decoding and validation.
//!
//! CodePipeline notification rules publish a JSON document to SNS for every
//! execution state change. The relay only acts on three fields of it
//! (`detail.pipeline`, `detail.execution-id`, `detail.state`), but the whole
//! envelope is modelled so that log lines can carry the surrounding context.
//!
//! Decoding is lenient: unknown fields are ignored, and absent or `null`
//! fields take their zero value. Validation is where required fields are
//! enforced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::{ExecutionId, PipelineName, RelayError};

/// The outer JSON document delivered in an SNS message body.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationEnvelope {
    /// AWS account the pipeline lives in.
    #[serde(deserialize_with = "null_as_default")]
    pub account: String,
    /// Event type label, e.g. `"CodePipeline Pipeline Execution State Change"`.
    #[serde(deserialize_with = "null_as_default")]
    pub detail_type: String,
    /// Region the event originated in.
    #[serde(deserialize_with = "null_as_default")]
    pub region: String,
    /// Event source, e.g. `"aws.codepipeline"`.
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    /// When the state change happened.
    pub time: Option<DateTime<Utc>>,
    /// ARN of the notification rule that produced this message.
    #[serde(deserialize_with = "null_as_default")]
    pub notification_rule_arn: String,
    /// The state-change payload.
    #[serde(deserialize_with = "null_as_default")]
    pub detail: Detail,
    /// ARNs of the resources the event concerns.
    #[serde(deserialize_with = "null_as_default")]
    pub resources: Vec<String>,
    /// Open-ended attributes bag; carried but never interpreted.
    #[serde(deserialize_with = "null_as_default")]
    pub additional_attributes: serde_json::Map<String, serde_json::Value>,
}

/// The pipeline-execution state change itself.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Detail {
    #[serde(deserialize_with = "null_as_default")]
    pub pipeline: String,
    #[serde(
        rename = "execution-id",
        alias = "executionId",
        deserialize_with = "null_as_default"
    )]
    pub execution_id: String,
    #[serde(rename = "execution-trigger", deserialize_with = "null_as_default")]
    pub execution_trigger: ExecutionTrigger,
    /// Raw provider state, e.g. `"SUCCEEDED"`. Compared case-insensitively.
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
}

/// What started the execution.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExecutionTrigger {
    #[serde(rename = "trigger-type", deserialize_with = "null_as_default")]
    pub trigger_type: String,
    #[serde(rename = "trigger-detail", deserialize_with = "null_as_default")]
    pub trigger_detail: String,
}

/// Reads an explicit `null` as the field's zero value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An envelope whose required fields are known to be present.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEvent {
    pub pipeline: PipelineName,
    pub execution_id: ExecutionId,
    pub state: String,
}

impl NotificationEnvelope {
    /// Parses one SNS message body.
    pub fn decode(raw: &str) -> Result<Self, RelayError> {
        serde_json::from_str(raw).map_err(|source| RelayError::Decode { source })
    }

    /// Checks that `state`, `pipeline` and `execution-id` are non-empty.
    ///
    /// Every missing field is reported, not just the first one.
    pub fn validate(&self) -> Result<ValidatedEvent, RelayError> {
        let pipeline = PipelineName::new(self.detail.pipeline.clone());
        let execution_id = ExecutionId::new(self.detail.execution_id.clone());

        let mut missing = Vec::new();
        if self.detail.state.is_empty() {
            missing.push("state");
        }
        if pipeline.is_none() {
            missing.push("pipeline");
        }
        if execution_id.is_none() {
            missing.push("execution-id");
        }

        match (pipeline, execution_id) {
            (Some(pipeline), Some(execution_id)) if missing.is_empty() => Ok(ValidatedEvent {
                pipeline,
                execution_id,
                state: self.detail.state.clone(),
            }),
            _ => Err(RelayError::Validation { missing }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_envelope() -> serde_json::Value {
        json!({
            "account": "123456789012",
            "detailType": "CodePipeline Pipeline Execution State Change",
            "region": "eu-west-1",
            "source": "aws.codepipeline",
            "time": "2024-03-01T10:15:30Z",
            "notificationRuleArn": "arn:aws:codestar-notifications:eu-west-1:123456789012:notificationrule/abc",
            "detail": {
                "pipeline": "demo",
                "execution-id": "abc123",
                "execution-trigger": {
                    "trigger-type": "Webhook",
                    "trigger-detail": "arn:aws:codestar-connections:eu-west-1:123456789012:connection/xyz"
                },
                "state": "SUCCEEDED",
                "version": 3.0
            },
            "resources": ["arn:aws:codepipeline:eu-west-1:123456789012:demo"],
            "additionalAttributes": {}
        })
    }

    #[test]
    fn decodes_full_envelope() {
        let envelope = NotificationEnvelope::decode(&full_envelope().to_string()).unwrap();

        assert_eq!(envelope.account, "123456789012");
        assert_eq!(envelope.region, "eu-west-1");
        assert_eq!(envelope.detail.pipeline, "demo");
        assert_eq!(envelope.detail.execution_id, "abc123");
        assert_eq!(envelope.detail.execution_trigger.trigger_type, "Webhook");
        assert_eq!(envelope.detail.state, "SUCCEEDED");
        assert_eq!(envelope.resources.len(), 1);
        assert!(envelope.time.is_some());
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let envelope = NotificationEnvelope::decode(r#"{"detail":{"pipeline":"demo"}}"#).unwrap();

        assert_eq!(envelope.detail.pipeline, "demo");
        assert!(envelope.detail.execution_id.is_empty());
        assert!(envelope.time.is_none());
        assert!(envelope.additional_attributes.is_empty());
    }

    #[test]
    fn null_fields_default_to_empty() {
        let envelope = NotificationEnvelope::decode(
            r#"{"account":null,"resources":null,"additionalAttributes":null,"detail":{"pipeline":"demo","execution-id":"abc","state":"SUCCEEDED","execution-trigger":null}}"#,
        )
        .unwrap();

        assert!(envelope.account.is_empty());
        assert!(envelope.resources.is_empty());
        assert!(envelope.additional_attributes.is_empty());
        assert_eq!(envelope.detail.execution_trigger, ExecutionTrigger::default());
        assert_eq!(envelope.validate().unwrap().pipeline.as_str(), "demo");
    }

    #[test]
    fn null_detail_fails_validation_not_decoding() {
        let envelope =
            NotificationEnvelope::decode(r#"{"detail":null,"time":null}"#).unwrap();
        match envelope.validate() {
            Err(RelayError::Validation { missing }) => {
                assert_eq!(missing, vec!["state", "pipeline", "execution-id"])
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn null_state_is_reported_missing() {
        let envelope = NotificationEnvelope::decode(
            r#"{"detail":{"pipeline":"demo","execution-id":"abc","state":null}}"#,
        )
        .unwrap();
        match envelope.validate() {
            Err(RelayError::Validation { missing }) => assert_eq!(missing, vec!["state"]),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn camel_case_execution_id_is_accepted() {
        let envelope =
            NotificationEnvelope::decode(r#"{"detail":{"executionId":"abc123"}}"#).unwrap();
        assert_eq!(envelope.detail.execution_id, "abc123");
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        let err = NotificationEnvelope::decode("not json").unwrap_err();
        assert!(matches!(err, RelayError::Decode { .. }));
    }

    #[test]
    fn wrong_shape_is_a_decode_error() {
        let err = NotificationEnvelope::decode(r#"{"detail":"SUCCEEDED"}"#).unwrap_err();
        assert!(matches!(err, RelayError::Decode { .. }));
    }

    #[test]
    fn validate_accepts_complete_detail() {
        let envelope = NotificationEnvelope::decode(&full_envelope().to_string()).unwrap();
        let event = envelope.validate().unwrap();

        assert_eq!(event.pipeline.as_str(), "demo");
        assert_eq!(event.execution_id.as_str(), "abc123");
        assert_eq!(event.state, "SUCCEEDED");
    }

    #[test]
    fn validate_reports_each_missing_field() {
        for (field, wire_name) in [
            ("state", "state"),
            ("pipeline", "pipeline"),
            ("execution-id", "execution-id"),
        ] {
            let mut value = full_envelope();
            value["detail"]
                .as_object_mut()
                .unwrap()
                .remove(field)
                .unwrap();
            let envelope = NotificationEnvelope::decode(&value.to_string()).unwrap();

            match envelope.validate() {
                Err(RelayError::Validation { missing }) => assert_eq!(missing, vec![wire_name]),
                other => panic!("expected validation error for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn validate_reports_all_fields_of_empty_envelope() {
        match NotificationEnvelope::default().validate() {
            Err(RelayError::Validation { missing }) => {
                assert_eq!(missing, vec!["state", "pipeline", "execution-id"])
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
