//! Trigger operations and the trigger configuration model.
//!
//! A trigger binds an event source to a function. Its `triggerConfig` has a
//! different shape per `triggerType`; [`TriggerConfig`] is the closed sum of
//! the modelled shapes, with [`TriggerConfig::Other`] keeping anything the
//! server reports that this crate does not model.

pub mod config;
pub mod eventbridge;

pub use config::*;
pub use eventbridge::*;

use crate::client::{decode, function_path, trigger_path, ApiRequest, FcClient};
use crate::error::{FcError, FcErrorKind, FcResult};
use crate::response::{impl_fc_output, ResponseMeta};
use reqwest::Method;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

// ── Trigger type ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TriggerType {
    Oss,
    Log,
    Http,
    EventBridge,
    /// A discriminant this crate has no typed configuration for.
    Other(String),
}

impl TriggerType {
    pub fn as_str(&self) -> &str {
        match self {
            TriggerType::Oss => "oss",
            TriggerType::Log => "log",
            TriggerType::Http => "http",
            TriggerType::EventBridge => "eventbridge",
            TriggerType::Other(s) => s,
        }
    }
}

impl From<String> for TriggerType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "oss" => TriggerType::Oss,
            "log" => TriggerType::Log,
            "http" => TriggerType::Http,
            "eventbridge" => TriggerType::EventBridge,
            _ => TriggerType::Other(s),
        }
    }
}

impl From<&str> for TriggerType {
    fn from(s: &str) -> Self {
        TriggerType::from(s.to_string())
    }
}

impl From<TriggerType> for String {
    fn from(t: TriggerType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Trigger config ──────────────────────────────────────────────────────

/// Configuration of one trigger. Serializes as the bare payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerConfig {
    Oss(OssTriggerConfig),
    Log(LogTriggerConfig),
    Http(HttpTriggerConfig),
    EventBridge(EventBridgeTriggerConfig),
    Other { trigger_type: String, config: Value },
}

impl TriggerConfig {
    pub fn trigger_type(&self) -> TriggerType {
        match self {
            TriggerConfig::Oss(_) => TriggerType::Oss,
            TriggerConfig::Log(_) => TriggerType::Log,
            TriggerConfig::Http(_) => TriggerType::Http,
            TriggerConfig::EventBridge(_) => TriggerType::EventBridge,
            TriggerConfig::Other { trigger_type, .. } => TriggerType::from(trigger_type.as_str()),
        }
    }

    /// Read a raw `triggerConfig` as the shape named by `trigger_type`.
    pub fn from_value(trigger_type: &TriggerType, value: Value) -> FcResult<Self> {
        let value = if value.is_null() { Value::Object(Default::default()) } else { value };
        let mismatch = |e: serde_json::Error| {
            FcError::new(
                FcErrorKind::TypeMismatch,
                "TriggerConfigMismatch",
                &format!("triggerConfig is not a valid '{}' configuration: {}", trigger_type, e),
                0,
            )
        };
        Ok(match trigger_type {
            TriggerType::Oss => TriggerConfig::Oss(serde_json::from_value(value).map_err(mismatch)?),
            TriggerType::Log => TriggerConfig::Log(serde_json::from_value(value).map_err(mismatch)?),
            TriggerType::Http => TriggerConfig::Http(serde_json::from_value(value).map_err(mismatch)?),
            TriggerType::EventBridge => {
                TriggerConfig::EventBridge(serde_json::from_value(value).map_err(mismatch)?)
            }
            TriggerType::Other(name) => TriggerConfig::Other {
                trigger_type: name.clone(),
                config: value,
            },
        })
    }

    pub fn as_oss(&self) -> FcResult<&OssTriggerConfig> {
        match self {
            TriggerConfig::Oss(c) => Ok(c),
            other => Err(FcError::type_mismatch("oss", other.trigger_type().as_str())),
        }
    }

    pub fn as_log(&self) -> FcResult<&LogTriggerConfig> {
        match self {
            TriggerConfig::Log(c) => Ok(c),
            other => Err(FcError::type_mismatch("log", other.trigger_type().as_str())),
        }
    }

    pub fn as_http(&self) -> FcResult<&HttpTriggerConfig> {
        match self {
            TriggerConfig::Http(c) => Ok(c),
            other => Err(FcError::type_mismatch("http", other.trigger_type().as_str())),
        }
    }

    pub fn as_eventbridge(&self) -> FcResult<&EventBridgeTriggerConfig> {
        match self {
            TriggerConfig::EventBridge(c) => Ok(c),
            other => Err(FcError::type_mismatch("eventbridge", other.trigger_type().as_str())),
        }
    }
}

impl Serialize for TriggerConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TriggerConfig::Oss(c) => c.serialize(serializer),
            TriggerConfig::Log(c) => c.serialize(serializer),
            TriggerConfig::Http(c) => c.serialize(serializer),
            TriggerConfig::EventBridge(c) => c.serialize(serializer),
            TriggerConfig::Other { config, .. } => config.serialize(serializer),
        }
    }
}

impl From<OssTriggerConfig> for TriggerConfig {
    fn from(c: OssTriggerConfig) -> Self {
        TriggerConfig::Oss(c)
    }
}

impl From<LogTriggerConfig> for TriggerConfig {
    fn from(c: LogTriggerConfig) -> Self {
        TriggerConfig::Log(c)
    }
}

impl From<HttpTriggerConfig> for TriggerConfig {
    fn from(c: HttpTriggerConfig) -> Self {
        TriggerConfig::Http(c)
    }
}

impl From<EventBridgeTriggerConfig> for TriggerConfig {
    fn from(c: EventBridgeTriggerConfig) -> Self {
        TriggerConfig::EventBridge(c)
    }
}

// ── Metadata ────────────────────────────────────────────────────────────

/// A trigger as described by the server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerMetadata {
    pub trigger_name: Option<String>,
    pub trigger_id: Option<String>,
    pub description: Option<String>,
    pub trigger_type: Option<TriggerType>,
    pub trigger_config: Option<TriggerConfig>,
    /// Absent for HTTP triggers.
    pub source_arn: Option<String>,
    /// Not meaningful for EventBridge triggers.
    pub invocation_role: Option<String>,
    pub qualifier: Option<String>,
    pub url_internet: Option<String>,
    pub url_intranet: Option<String>,
    pub created_time: Option<String>,
    pub last_modified_time: Option<String>,
}

/// Wire form; `triggerConfig` is resolved against `triggerType` afterwards.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TriggerWire {
    #[serde(default)]
    trigger_name: Option<String>,
    #[serde(default)]
    trigger_id: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    trigger_type: Option<String>,
    #[serde(default)]
    trigger_config: Option<Value>,
    #[serde(default)]
    source_arn: Option<String>,
    #[serde(default)]
    invocation_role: Option<String>,
    #[serde(default)]
    qualifier: Option<String>,
    #[serde(default)]
    url_internet: Option<String>,
    #[serde(default)]
    url_intranet: Option<String>,
    #[serde(default)]
    created_time: Option<String>,
    #[serde(default)]
    last_modified_time: Option<String>,
}

impl TryFrom<TriggerWire> for TriggerMetadata {
    type Error = FcError;

    fn try_from(w: TriggerWire) -> FcResult<Self> {
        let trigger_type = w.trigger_type.map(TriggerType::from);
        let trigger_config = match (&trigger_type, w.trigger_config) {
            (Some(t), Some(v)) => Some(TriggerConfig::from_value(t, v)?),
            (None, Some(v)) if !v.is_null() => {
                return Err(FcError::new(
                    FcErrorKind::TypeMismatch,
                    "TriggerTypeMissing",
                    "triggerConfig present without triggerType",
                    0,
                ))
            }
            _ => None,
        };
        Ok(Self {
            trigger_name: w.trigger_name,
            trigger_id: w.trigger_id,
            description: w.description,
            trigger_type,
            trigger_config,
            source_arn: w.source_arn,
            invocation_role: w.invocation_role,
            qualifier: w.qualifier,
            url_internet: w.url_internet,
            url_intranet: w.url_intranet,
            created_time: w.created_time,
            last_modified_time: w.last_modified_time,
        })
    }
}

impl TriggerMetadata {
    /// Parse one trigger from its JSON form.
    pub fn from_json(value: Value) -> FcResult<Self> {
        let wire: TriggerWire = serde_json::from_value(value)?;
        Self::try_from(wire)
    }

    /// The configuration, or a `TypeMismatch` when the server sent none.
    fn config(&self) -> FcResult<&TriggerConfig> {
        self.trigger_config.as_ref().ok_or_else(|| {
            FcError::type_mismatch(
                "configured",
                self.trigger_type.as_ref().map(TriggerType::as_str).unwrap_or("none"),
            )
        })
    }

    pub fn oss_config(&self) -> FcResult<&OssTriggerConfig> {
        self.config()?.as_oss()
    }

    pub fn log_config(&self) -> FcResult<&LogTriggerConfig> {
        self.config()?.as_log()
    }

    pub fn http_config(&self) -> FcResult<&HttpTriggerConfig> {
        self.config()?.as_http()
    }

    pub fn eventbridge_config(&self) -> FcResult<&EventBridgeTriggerConfig> {
        self.config()?.as_eventbridge()
    }
}

// ── Inputs ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTriggerInput {
    #[serde(skip)]
    pub service_name: String,
    #[serde(skip)]
    pub function_name: String,
    pub trigger_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_type: Option<TriggerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_config: Option<TriggerConfig>,
    #[serde(skip)]
    pub headers: BTreeMap<String, String>,
}

impl CreateTriggerInput {
    pub fn new(service_name: &str, function_name: &str, trigger_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            function_name: function_name.to_string(),
            trigger_name: trigger_name.to_string(),
            description: None,
            trigger_type: None,
            source_arn: None,
            invocation_role: None,
            qualifier: None,
            trigger_config: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_trigger_name(mut self, name: &str) -> Self {
        self.trigger_name = name.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_trigger_type(mut self, trigger_type: impl Into<TriggerType>) -> Self {
        self.trigger_type = Some(trigger_type.into());
        self
    }

    pub fn with_source_arn(mut self, arn: &str) -> Self {
        self.source_arn = Some(arn.to_string());
        self
    }

    pub fn with_invocation_role(mut self, role_arn: &str) -> Self {
        self.invocation_role = Some(role_arn.to_string());
        self
    }

    pub fn with_qualifier(mut self, qualifier: &str) -> Self {
        self.qualifier = Some(qualifier.to_string());
        self
    }

    pub fn with_trigger_config(mut self, config: impl Into<TriggerConfig>) -> Self {
        self.trigger_config = Some(config.into());
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_eventbridge_enabled(self) -> Self {
        self.with_header(EVENTBRIDGE_TRIGGER_HEADER, EVENTBRIDGE_TRIGGER_HEADER_VALUE)
    }

    /// Reconcile `trigger_type` with the config variant.
    fn checked(&self) -> FcResult<Self> {
        let mut body = self.clone();
        if let Some(ref config) = self.trigger_config {
            let actual = config.trigger_type();
            match self.trigger_type {
                Some(ref declared) if *declared != actual => {
                    return Err(FcError::type_mismatch(declared.as_str(), actual.as_str()));
                }
                Some(_) => {}
                None => body.trigger_type = Some(actual),
            }
        }
        Ok(body)
    }
}

/// Partial update: only fields that were set are sent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTriggerInput {
    #[serde(skip)]
    pub service_name: String,
    #[serde(skip)]
    pub function_name: String,
    #[serde(skip)]
    pub trigger_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_config: Option<TriggerConfig>,
    #[serde(skip)]
    pub if_match: Option<String>,
    #[serde(skip)]
    pub headers: BTreeMap<String, String>,
}

impl UpdateTriggerInput {
    pub fn new(service_name: &str, function_name: &str, trigger_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            function_name: function_name.to_string(),
            trigger_name: trigger_name.to_string(),
            description: None,
            invocation_role: None,
            qualifier: None,
            trigger_config: None,
            if_match: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_invocation_role(mut self, role_arn: &str) -> Self {
        self.invocation_role = Some(role_arn.to_string());
        self
    }

    pub fn with_qualifier(mut self, qualifier: &str) -> Self {
        self.qualifier = Some(qualifier.to_string());
        self
    }

    pub fn with_trigger_config(mut self, config: impl Into<TriggerConfig>) -> Self {
        self.trigger_config = Some(config.into());
        self
    }

    pub fn with_if_match(mut self, etag: &str) -> Self {
        self.if_match = Some(etag.to_string());
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_eventbridge_enabled(self) -> Self {
        self.with_header(EVENTBRIDGE_TRIGGER_HEADER, EVENTBRIDGE_TRIGGER_HEADER_VALUE)
    }
}

#[derive(Debug, Clone)]
pub struct GetTriggerInput {
    pub service_name: String,
    pub function_name: String,
    pub trigger_name: String,
    pub headers: BTreeMap<String, String>,
}

impl GetTriggerInput {
    pub fn new(service_name: &str, function_name: &str, trigger_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            function_name: function_name.to_string(),
            trigger_name: trigger_name.to_string(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_eventbridge_enabled(self) -> Self {
        self.with_header(EVENTBRIDGE_TRIGGER_HEADER, EVENTBRIDGE_TRIGGER_HEADER_VALUE)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteTriggerInput {
    pub service_name: String,
    pub function_name: String,
    pub trigger_name: String,
    pub if_match: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl DeleteTriggerInput {
    pub fn new(service_name: &str, function_name: &str, trigger_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            function_name: function_name.to_string(),
            trigger_name: trigger_name.to_string(),
            if_match: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_if_match(mut self, etag: &str) -> Self {
        self.if_match = Some(etag.to_string());
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_eventbridge_enabled(self) -> Self {
        self.with_header(EVENTBRIDGE_TRIGGER_HEADER, EVENTBRIDGE_TRIGGER_HEADER_VALUE)
    }
}

#[derive(Debug, Clone)]
pub struct ListTriggersInput {
    pub service_name: String,
    pub function_name: String,
    pub limit: Option<u32>,
    pub prefix: Option<String>,
    pub start_key: Option<String>,
    pub next_token: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl ListTriggersInput {
    pub fn new(service_name: &str, function_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            function_name: function_name.to_string(),
            limit: None,
            prefix: None,
            start_key: None,
            next_token: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn with_start_key(mut self, start_key: &str) -> Self {
        self.start_key = Some(start_key.to_string());
        self
    }

    pub fn with_next_token(mut self, token: &str) -> Self {
        self.next_token = Some(token.to_string());
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_eventbridge_enabled(self) -> Self {
        self.with_header(EVENTBRIDGE_TRIGGER_HEADER, EVENTBRIDGE_TRIGGER_HEADER_VALUE)
    }
}

// ── Outputs ─────────────────────────────────────────────────────────────

/// Output of Create/Get/UpdateTrigger.
#[derive(Debug, Clone)]
pub struct TriggerOutput {
    pub trigger: TriggerMetadata,
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone)]
pub struct DeleteTriggerOutput {
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone)]
pub struct ListTriggersOutput {
    pub triggers: Vec<TriggerMetadata>,
    pub next_token: Option<String>,
    pub meta: ResponseMeta,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTriggersBody {
    #[serde(default)]
    triggers: Vec<TriggerWire>,
    #[serde(default)]
    next_token: Option<String>,
}

impl_fc_output!(TriggerOutput, DeleteTriggerOutput, ListTriggersOutput);

// ── Operations ──────────────────────────────────────────────────────────

impl FcClient {
    /// Create a trigger. A declared type that disagrees with the config
    /// variant is rejected before anything is sent.
    pub async fn create_trigger(&self, input: &CreateTriggerInput) -> FcResult<TriggerOutput> {
        let body = input.checked()?;
        let path = format!(
            "{}/triggers",
            function_path(&input.service_name, None, &input.function_name)
        );
        let req = ApiRequest::new(Method::POST, path)
            .headers(&input.headers)
            .json(&body)?;
        let resp = self.send(req).await?;
        let wire: TriggerWire = decode(&resp)?;
        Ok(TriggerOutput { trigger: wire.try_into()?, meta: resp.meta() })
    }

    pub async fn get_trigger(&self, input: &GetTriggerInput) -> FcResult<TriggerOutput> {
        let path = trigger_path(&input.service_name, &input.function_name, &input.trigger_name);
        let req = ApiRequest::new(Method::GET, path).headers(&input.headers);
        let resp = self.send(req).await?;
        let wire: TriggerWire = decode(&resp)?;
        Ok(TriggerOutput { trigger: wire.try_into()?, meta: resp.meta() })
    }

    pub async fn update_trigger(&self, input: &UpdateTriggerInput) -> FcResult<TriggerOutput> {
        let path = trigger_path(&input.service_name, &input.function_name, &input.trigger_name);
        let req = ApiRequest::new(Method::PUT, path)
            .header("if-match", input.if_match.as_deref())
            .headers(&input.headers)
            .json(input)?;
        let resp = self.send(req).await?;
        let wire: TriggerWire = decode(&resp)?;
        Ok(TriggerOutput { trigger: wire.try_into()?, meta: resp.meta() })
    }

    pub async fn delete_trigger(&self, input: &DeleteTriggerInput) -> FcResult<DeleteTriggerOutput> {
        let path = trigger_path(&input.service_name, &input.function_name, &input.trigger_name);
        let req = ApiRequest::new(Method::DELETE, path)
            .header("if-match", input.if_match.as_deref())
            .headers(&input.headers);
        let resp = self.send(req).await?;
        Ok(DeleteTriggerOutput { meta: resp.meta() })
    }

    pub async fn list_triggers(&self, input: &ListTriggersInput) -> FcResult<ListTriggersOutput> {
        let path = format!(
            "{}/triggers",
            function_path(&input.service_name, None, &input.function_name)
        );
        let req = ApiRequest::new(Method::GET, path)
            .query("limit", input.limit)
            .query("prefix", input.prefix.as_ref())
            .query("startKey", input.start_key.as_ref())
            .query("nextToken", input.next_token.as_ref())
            .headers(&input.headers);
        let resp = self.send(req).await?;
        let body: ListTriggersBody = decode(&resp)?;
        let triggers = body
            .triggers
            .into_iter()
            .map(TriggerMetadata::try_from)
            .collect::<FcResult<Vec<_>>>()
            .map_err(|e| e.with_request_id(resp.request_id().map(String::from)))?;
        Ok(ListTriggersOutput {
            triggers,
            next_token: body.next_token,
            meta: resp.meta(),
        })
    }
}
