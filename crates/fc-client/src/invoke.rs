//! Function invocation.

use crate::client::{function_path, ApiRequest, FcClient};
use crate::error::{FcError, FcResult};
use crate::response::{impl_fc_output, ResponseMeta, HEADER_ERROR_TYPE, HEADER_LOG_RESULT};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use reqwest::Method;
use std::collections::BTreeMap;

pub const HEADER_LOG_TYPE: &str = "x-fc-log-type";
pub const HEADER_INVOCATION_TYPE: &str = "x-fc-invocation-type";

/// Whether the tail of the execution log is returned with the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogType {
    Tail,
    #[default]
    None,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Tail => "Tail",
            LogType::None => "None",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvocationType {
    #[default]
    Sync,
    /// Queue the event and return immediately with HTTP 202.
    Async,
}

impl InvocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationType::Sync => "Sync",
            InvocationType::Async => "Async",
        }
    }
}

#[derive(Debug, Clone)]
pub struct InvokeFunctionInput {
    pub service_name: String,
    pub function_name: String,
    pub qualifier: Option<String>,
    pub payload: Bytes,
    pub log_type: Option<LogType>,
    pub invocation_type: Option<InvocationType>,
    pub headers: BTreeMap<String, String>,
}

impl InvokeFunctionInput {
    pub fn new(service_name: &str, function_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            function_name: function_name.to_string(),
            qualifier: None,
            payload: Bytes::new(),
            log_type: None,
            invocation_type: None,
            headers: BTreeMap::new(),
        }
    }

    /// Event bytes, sent unchanged.
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn with_qualifier(mut self, qualifier: &str) -> Self {
        self.qualifier = Some(qualifier.to_string());
        self
    }

    pub fn with_log_type(mut self, log_type: LogType) -> Self {
        self.log_type = Some(log_type);
        self
    }

    pub fn with_invocation_type(mut self, invocation_type: InvocationType) -> Self {
        self.invocation_type = Some(invocation_type);
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct InvokeFunctionOutput {
    /// Function result as returned, byte for byte.
    pub payload: Bytes,
    pub meta: ResponseMeta,
}

impl InvokeFunctionOutput {
    /// Decoded `x-fc-log-result`; `None` unless the call asked for
    /// [`LogType::Tail`].
    pub fn log_result(&self) -> FcResult<Option<String>> {
        let Some(encoded) = self.meta.headers.get(HEADER_LOG_RESULT) else {
            return Ok(None);
        };
        let raw = STANDARD.decode(encoded.trim()).map_err(|e| {
            FcError::decode(&format!("Invalid {} header: {}", HEADER_LOG_RESULT, e))
                .with_request_id(self.meta.request_id.clone())
        })?;
        Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
    }

    /// Set when the function itself failed (`x-fc-error-type`).
    pub fn error_type(&self) -> Option<&str> {
        self.meta.headers.get(HEADER_ERROR_TYPE).map(String::as_str)
    }

    pub fn is_error(&self) -> bool {
        self.error_type().is_some()
    }
}

impl_fc_output!(InvokeFunctionOutput);

impl FcClient {
    pub async fn invoke_function(&self, input: &InvokeFunctionInput) -> FcResult<InvokeFunctionOutput> {
        let path = format!(
            "{}/invocations",
            function_path(&input.service_name, input.qualifier.as_deref(), &input.function_name)
        );
        let req = ApiRequest::new(Method::POST, path)
            .header(HEADER_LOG_TYPE, input.log_type.map(|t| t.as_str()))
            .header(HEADER_INVOCATION_TYPE, input.invocation_type.map(|t| t.as_str()))
            .headers(&input.headers)
            .raw_body(input.payload.to_vec());
        let resp = self.send(req).await?;
        Ok(InvokeFunctionOutput {
            meta: resp.meta(),
            payload: resp.body,
        })
    }
}
