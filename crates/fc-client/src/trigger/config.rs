//! OSS, Log and HTTP trigger configurations.
//!
//! Every field is optional so the same types serve create (full config) and
//! update (only the fields to change; the server merges the rest).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── OSS ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OssTriggerConfig {
    /// Event types such as `oss:ObjectCreated:PostObject`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<OssTriggerFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OssTriggerFilter {
    #[serde(default)]
    pub key: OssTriggerKey,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OssTriggerKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl OssTriggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events<S: ToString>(mut self, events: impl IntoIterator<Item = S>) -> Self {
        self.events = Some(events.into_iter().map(|e| e.to_string()).collect());
        self
    }

    pub fn with_filter_key_prefix(mut self, prefix: &str) -> Self {
        self.filter.get_or_insert_with(Default::default).key.prefix = Some(prefix.to_string());
        self
    }

    pub fn with_filter_key_suffix(mut self, suffix: &str) -> Self {
        self.filter.get_or_insert_with(Default::default).key.suffix = Some(suffix.to_string());
        self
    }

    pub fn filter_key_prefix(&self) -> Option<&str> {
        self.filter.as_ref().and_then(|f| f.key.prefix.as_deref())
    }

    pub fn filter_key_suffix(&self) -> Option<&str> {
        self.filter.as_ref().and_then(|f| f.key.suffix.as_deref())
    }
}

// ── Log ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogTriggerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_config: Option<LogSourceConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_config: Option<LogJobConfig>,
    /// Passed through to the function untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_parameter: Option<Map<String, Value>>,
    /// Where the trigger writes its own execution logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_config: Option<JobLogConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogSourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logstore: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogJobConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retry_time: Option<i32>,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_interval: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobLogConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logstore: Option<String>,
}

impl LogTriggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_logstore(mut self, logstore: &str) -> Self {
        self.source_config = Some(LogSourceConfig { logstore: Some(logstore.to_string()) });
        self
    }

    pub fn with_job_config(mut self, max_retry_time: i32, trigger_interval: i32) -> Self {
        self.job_config = Some(LogJobConfig {
            max_retry_time: Some(max_retry_time),
            trigger_interval: Some(trigger_interval),
        });
        self
    }

    pub fn with_function_parameter(mut self, params: Map<String, Value>) -> Self {
        self.function_parameter = Some(params);
        self
    }

    pub fn with_log_config(mut self, project: &str, logstore: &str) -> Self {
        self.log_config = Some(JobLogConfig {
            project: Some(project.to_string()),
            logstore: Some(logstore.to_string()),
        });
        self
    }

    pub fn with_enable(mut self, enable: bool) -> Self {
        self.enable = Some(enable);
        self
    }
}

// ── HTTP ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpAuthType {
    /// Requests must be signed.
    Function,
    Anonymous,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpTriggerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<HttpAuthType>,
    /// Allowed HTTP methods, upper case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
}

impl HttpTriggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auth_type(mut self, auth_type: HttpAuthType) -> Self {
        self.auth_type = Some(auth_type);
        self
    }

    pub fn with_methods<S: AsRef<str>>(mut self, methods: impl IntoIterator<Item = S>) -> Self {
        self.methods = Some(
            methods
                .into_iter()
                .map(|m| m.as_ref().to_uppercase())
                .collect(),
        );
        self
    }
}
