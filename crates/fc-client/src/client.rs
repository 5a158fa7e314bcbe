//! Base FC HTTP client.
//!
//! `FcClient` owns the connection pool and the signer. Every operation in
//! this crate is an `impl FcClient` block that builds an [`ApiRequest`],
//! hands it to [`FcClient::send`], and decodes the [`FcResponse`].
//! Pass-through requests for HTTP-triggered functions go through
//! [`FcClient::do_http_request`] and are returned untouched.

use crate::config::ClientConfig;
use crate::error::{FcError, FcResult};
use crate::response::FcResponse;
use crate::signing::{self, FcSigner};
use bytes::Bytes;
use chrono::Utc;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Everything except RFC 3986 unreserved characters.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const JSON: &str = "application/json";

/// Signed FC API client.
#[derive(Clone)]
pub struct FcClient {
    http: Client,
    config: ClientConfig,
    signer: FcSigner,
    user_agent: String,
}

impl std::fmt::Debug for FcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FcClient")
            .field("endpoint", &self.config.endpoint)
            .field("api_version", &self.config.api_version)
            .finish()
    }
}

/// One API call, before signing. `path` excludes the API version prefix and
/// is unescaped.
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: BTreeMap<String, String>,
    body: Vec<u8>,
}

impl ApiRequest {
    pub(crate) fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Add a query parameter when a value is present.
    pub(crate) fn query<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.query.push((key.to_string(), v.to_string()));
        }
        self
    }

    pub(crate) fn header(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(v) = value {
            self.headers.insert(key.to_lowercase(), v.to_string());
        }
        self
    }

    pub(crate) fn headers(mut self, headers: &BTreeMap<String, String>) -> Self {
        for (k, v) in headers {
            self.headers.insert(k.to_lowercase(), v.clone());
        }
        self
    }

    pub(crate) fn json<B: Serialize>(mut self, body: &B) -> FcResult<Self> {
        self.body = serde_json::to_vec(body)?;
        Ok(self)
    }

    pub(crate) fn raw_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }
}

/// A caller-built HTTP request, used to reach functions behind an HTTP
/// trigger (`/{version}/proxy/{service}/{function}/...`).
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Unescaped absolute path, including the API version.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl HttpRequest {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// Full response of a pass-through request, whatever its status.
pub type HttpResponse = FcResponse;

impl FcClient {
    /// Create a client from a validated configuration.
    pub fn new(config: ClientConfig) -> FcResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(10)
            .build()?;

        let mut user_agent = format!("fc-client-rust/{}", env!("CARGO_PKG_VERSION"));
        if let Some(ref suffix) = config.user_agent_suffix {
            user_agent.push(' ');
            user_agent.push_str(suffix);
        }

        Ok(Self {
            http,
            signer: FcSigner::new(&config.credentials),
            config,
            user_agent,
        })
    }

    /// Shorthand for an explicit endpoint and static access keys.
    pub fn with_endpoint(
        endpoint: &str,
        api_version: &str,
        access_key_id: &str,
        access_key_secret: &str,
    ) -> FcResult<Self> {
        Self::new(ClientConfig::new(endpoint, api_version, access_key_id, access_key_secret))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api_version(&self) -> &str {
        &self.config.api_version
    }

    /// Dispatch an API call. Non-2xx answers become an [`FcError`].
    pub(crate) async fn send(&self, request: ApiRequest) -> FcResult<FcResponse> {
        let path = format!("/{}{}", self.config.api_version, request.path);
        let mut headers = self.default_headers();
        headers.insert("accept".to_string(), JSON.to_string());
        headers.insert(signing::HEADER_CONTENT_TYPE.to_string(), JSON.to_string());
        headers.extend(request.headers);

        let signed = self.signer.sign_request(
            request.method.as_str(),
            &signing::canonical_resource(&path),
            &headers,
            &request.body,
            Utc::now(),
        );

        let url = self.url(&path, &request.query)?;
        let response = self
            .execute(request.method.clone(), url, &signed.headers, request.body)
            .await?;

        log::debug!(
            "FC {} {} -> {} [{}]",
            request.method,
            path,
            response.status,
            response.request_id().unwrap_or("-")
        );

        if (200..300).contains(&response.status) {
            Ok(response)
        } else {
            let err = FcError::from_response(
                response.status,
                &response.body,
                response.request_id().map(String::from),
            );
            log::warn!("FC {} {} failed: {}", request.method, path, err);
            Err(err)
        }
    }

    /// Sign and send a caller-built request, returning status, headers and
    /// body unmodified.
    pub async fn do_http_request(&self, request: HttpRequest) -> FcResult<HttpResponse> {
        let mut headers = self.default_headers();
        for (k, v) in &request.headers {
            headers.insert(k.to_lowercase(), v.clone());
        }

        let resource = signing::canonical_resource_with_queries(&request.path, &request.query);
        let signed = self.signer.sign_request(
            request.method.as_str(),
            &resource,
            &headers,
            &request.body,
            Utc::now(),
        );

        let url = self.url(&request.path, &request.query)?;
        let response = self
            .execute(request.method.clone(), url, &signed.headers, request.body.to_vec())
            .await?;
        log::debug!(
            "FC pass-through {} {} -> {} [{}]",
            request.method,
            request.path,
            response.status,
            response.request_id().unwrap_or("-")
        );
        Ok(response)
    }

    /// Headers shared by API calls and pass-through requests.
    fn default_headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("user-agent".to_string(), self.user_agent.clone());
        if let Some(ref account) = self.config.account_id {
            headers.insert("x-fc-account-id".to_string(), account.clone());
        }
        headers
    }

    fn url(&self, unescaped_path: &str, query: &[(String, String)]) -> FcResult<url::Url> {
        let raw = format!("{}{}", self.config.endpoint, encode_path(unescaped_path));
        let mut url = url::Url::parse(&raw)
            .map_err(|e| FcError::config(&format!("Invalid request URL '{}': {}", raw, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }

    /// Execute a single signed HTTP request.
    async fn execute(
        &self,
        method: Method,
        url: url::Url,
        headers: &BTreeMap<String, String>,
        body: Vec<u8>,
    ) -> FcResult<FcResponse> {
        let mut req = self.http.request(method, url);
        for (key, value) in headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if !body.is_empty() {
            req = req.body(body);
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let mut resp_headers = BTreeMap::new();
        for (key, value) in resp.headers() {
            if let Ok(v) = value.to_str() {
                resp_headers.insert(key.as_str().to_lowercase(), v.to_string());
            }
        }
        let body = resp.bytes().await?;

        Ok(FcResponse {
            status,
            headers: resp_headers,
            body,
        })
    }
}

/// Decode a JSON response body, keeping the request ID on failure.
pub(crate) fn decode<T: DeserializeOwned>(response: &FcResponse) -> FcResult<T> {
    serde_json::from_slice(&response.body).map_err(|e| {
        FcError::decode(&format!("Failed to parse response: {}", e))
            .with_request_id(response.request_id().map(String::from))
    })
}

/// Percent-encode each segment of a path, keeping the separators.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// `/services/{service}` or `/services/{service}.{qualifier}`.
pub(crate) fn service_path(service: &str, qualifier: Option<&str>) -> String {
    match qualifier {
        Some(q) => format!("/services/{}.{}", service, q),
        None => format!("/services/{}", service),
    }
}

pub(crate) fn function_path(service: &str, qualifier: Option<&str>, function: &str) -> String {
    format!("{}/functions/{}", service_path(service, qualifier), function)
}

pub(crate) fn trigger_path(service: &str, function: &str, trigger: &str) -> String {
    format!("{}/triggers/{}", function_path(service, None, function), trigger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_API_VERSION;

    fn client() -> FcClient {
        FcClient::with_endpoint("https://123.cn-hangzhou.fc.aliyuncs.com", DEFAULT_API_VERSION, "ak", "sk")
            .unwrap()
    }

    #[test]
    fn encode_path_keeps_slashes() {
        assert_eq!(encode_path("/2016-08-15/services/my svc"), "/2016-08-15/services/my%20svc");
        assert_eq!(encode_path("/services/a_b-c.LATEST"), "/services/a_b-c.LATEST");
    }

    #[test]
    fn resource_paths() {
        assert_eq!(service_path("s", None), "/services/s");
        assert_eq!(service_path("s", Some("prod")), "/services/s.prod");
        assert_eq!(function_path("s", Some("1"), "f"), "/services/s.1/functions/f");
        assert_eq!(trigger_path("s", "f", "t"), "/services/s/functions/f/triggers/t");
    }

    #[test]
    fn url_with_query() {
        let url = client()
            .url("/2016-08-15/services", &[("prefix".to_string(), "go-service".to_string())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://123.cn-hangzhou.fc.aliyuncs.com/2016-08-15/services?prefix=go-service"
        );
    }

    #[test]
    fn api_request_skips_absent_query() {
        let req = ApiRequest::new(Method::GET, "/services")
            .query("limit", Some(100))
            .query::<String>("prefix", None);
        assert_eq!(req.query, vec![("limit".to_string(), "100".to_string())]);
    }

    #[test]
    fn default_headers_include_account() {
        let cfg = ClientConfig::new("https://fc.example.com", DEFAULT_API_VERSION, "ak", "sk")
            .with_account_id("42")
            .with_user_agent_suffix("tests");
        let c = FcClient::new(cfg).unwrap();
        let h = c.default_headers();
        assert_eq!(h["x-fc-account-id"], "42");
        assert!(h["user-agent"].ends_with(" tests"));
        assert!(!h.contains_key("accept"));
        assert!(!h.contains_key("content-type"));
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(FcClient::with_endpoint("https://fc.example.com", DEFAULT_API_VERSION, "", "").is_err());
    }
}
