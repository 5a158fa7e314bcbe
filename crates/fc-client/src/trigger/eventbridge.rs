//! EventBridge trigger configuration.
//!
//! EventBridge triggers are behind a feature gate: requests that create,
//! read, update, delete or list them carry
//! `x-fc-enable-eventbridge-trigger: enable`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Feature gate header for EventBridge triggers.
pub const EVENTBRIDGE_TRIGGER_HEADER: &str = "x-fc-enable-eventbridge-trigger";
pub const EVENTBRIDGE_TRIGGER_HEADER_VALUE: &str = "enable";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBridgeTriggerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_enable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub async_invocation_type: Option<bool>,
    /// Event pattern as JSON text; not interpreted by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_rule_filter_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source_config: Option<EventSourceConfig>,
}

impl EventBridgeTriggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trigger_enable(mut self, enable: bool) -> Self {
        self.trigger_enable = Some(enable);
        self
    }

    pub fn with_async_invocation_type(mut self, is_async: bool) -> Self {
        self.async_invocation_type = Some(is_async);
        self
    }

    pub fn with_event_rule_filter_pattern(mut self, pattern: &str) -> Self {
        self.event_rule_filter_pattern = Some(pattern.to_string());
        self
    }

    pub fn with_event_source_config(mut self, config: EventSourceConfig) -> Self {
        self.event_source_config = Some(config);
        self
    }

    pub fn event_source_type(&self) -> Option<EventSourceType> {
        self.event_source_config.as_ref().and_then(|c| c.event_source_type)
    }
}

/// Where events come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventSourceType {
    /// The account's default event bus.
    Default,
    #[serde(rename = "MNS")]
    Mns,
    #[serde(rename = "RocketMQ")]
    RocketMq,
    #[serde(rename = "RabbitMQ")]
    RabbitMq,
}

impl EventSourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSourceType::Default => "Default",
            EventSourceType::Mns => "MNS",
            EventSourceType::RocketMq => "RocketMQ",
            EventSourceType::RabbitMq => "RabbitMQ",
        }
    }
}

impl fmt::Display for EventSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source_type: Option<EventSourceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source_parameters: Option<EventSourceParameters>,
}

impl EventSourceConfig {
    /// The default event bus; takes no parameters.
    pub fn default_bus() -> Self {
        Self {
            event_source_type: Some(EventSourceType::Default),
            event_source_parameters: None,
        }
    }

    pub fn mns(params: SourceMnsParameters) -> Self {
        Self {
            event_source_type: Some(EventSourceType::Mns),
            event_source_parameters: Some(EventSourceParameters {
                source_mns_parameters: Some(params),
                ..Default::default()
            }),
        }
    }

    pub fn rocketmq(params: SourceRocketMqParameters) -> Self {
        Self {
            event_source_type: Some(EventSourceType::RocketMq),
            event_source_parameters: Some(EventSourceParameters {
                source_rocketmq_parameters: Some(params),
                ..Default::default()
            }),
        }
    }

    pub fn rabbitmq(params: SourceRabbitMqParameters) -> Self {
        Self {
            event_source_type: Some(EventSourceType::RabbitMq),
            event_source_parameters: Some(EventSourceParameters {
                source_rabbitmq_parameters: Some(params),
                ..Default::default()
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventSourceParameters {
    #[serde(rename = "sourceMNSParameters", default, skip_serializing_if = "Option::is_none")]
    pub source_mns_parameters: Option<SourceMnsParameters>,
    #[serde(rename = "sourceRocketMQParameters", default, skip_serializing_if = "Option::is_none")]
    pub source_rocketmq_parameters: Option<SourceRocketMqParameters>,
    #[serde(rename = "sourceRabbitMQParameters", default, skip_serializing_if = "Option::is_none")]
    pub source_rabbitmq_parameters: Option<SourceRabbitMqParameters>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceMnsParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_base64_decode: Option<bool>,
}

impl SourceMnsParameters {
    pub fn new(region_id: &str, queue_name: &str) -> Self {
        Self {
            region_id: Some(region_id.to_string()),
            queue_name: Some(queue_name.to_string()),
            is_base64_decode: None,
        }
    }

    pub fn with_is_base64_decode(mut self, decode: bool) -> Self {
        self.is_base64_decode = Some(decode);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceRocketMqParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// `CONSUME_FROM_LAST_OFFSET`, `CONSUME_FROM_FIRST_OFFSET` or
    /// `CONSUME_FROM_TIMESTAMP`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
    /// Milliseconds since the epoch, used with `CONSUME_FROM_TIMESTAMP`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(rename = "GroupID", default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl SourceRocketMqParameters {
    pub fn new(region_id: &str, instance_id: &str, topic: &str) -> Self {
        Self {
            region_id: Some(region_id.to_string()),
            instance_id: Some(instance_id.to_string()),
            topic: Some(topic.to_string()),
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    pub fn with_offset(mut self, offset: &str) -> Self {
        self.offset = Some(offset.to_string());
        self
    }

    pub fn with_timestamp(mut self, millis: i64) -> Self {
        self.timestamp = Some(millis);
        self
    }

    pub fn with_group_id(mut self, group_id: &str) -> Self {
        self.group_id = Some(group_id.to_string());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceRabbitMqParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_host_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_name: Option<String>,
}

impl SourceRabbitMqParameters {
    pub fn new(region_id: &str, instance_id: &str, virtual_host_name: &str, queue_name: &str) -> Self {
        Self {
            region_id: Some(region_id.to_string()),
            instance_id: Some(instance_id.to_string()),
            virtual_host_name: Some(virtual_host_name.to_string()),
            queue_name: Some(queue_name.to_string()),
        }
    }
}

/// Event bus the server creates for a trigger.
pub fn eventbridge_bus_name(source: EventSourceType, function_name: &str, trigger_name: &str) -> String {
    match source {
        EventSourceType::Default => "default".to_string(),
        other => format!("{}-{}-{}", other.as_str(), function_name, trigger_name),
    }
}

/// Source ARN the server assigns to an EventBridge trigger:
/// `acs:eventbridge:{region}:{account}:eventbus/{bus}/rule/{service}-{function}-{trigger}`.
///
/// The client never sends this value; it describes what the server reports
/// so callers can check it.
pub fn eventbridge_source_arn(
    region: &str,
    account_id: &str,
    source: EventSourceType,
    service_name: &str,
    function_name: &str,
    trigger_name: &str,
) -> String {
    format!(
        "acs:eventbridge:{}:{}:eventbus/{}/rule/{}-{}-{}",
        region,
        account_id,
        eventbridge_bus_name(source, function_name, trigger_name),
        service_name,
        function_name,
        trigger_name
    )
}
