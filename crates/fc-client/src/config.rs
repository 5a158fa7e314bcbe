//! Client configuration and credentials.
//!
//! Configuration is resolved once when the client is built and is read-only
//! afterwards. Values come either from code or from the environment.

use crate::error::{FcError, FcResult};
use serde::{Deserialize, Serialize};

/// API version every path is prefixed with.
pub const DEFAULT_API_VERSION: &str = "2016-08-15";

/// Static access key credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub access_key_id: String,
    pub access_key_secret: String,
    /// Present for temporary (STS) credentials.
    pub security_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<redacted>")
            .field("security_token", &self.security_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    pub fn new(access_key_id: &str, access_key_secret: &str) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            access_key_secret: access_key_secret.to_string(),
            security_token: None,
        }
    }

    pub fn new_temporary(access_key_id: &str, access_key_secret: &str, security_token: &str) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            access_key_secret: access_key_secret.to_string(),
            security_token: Some(security_token.to_string()),
        }
    }

    pub fn is_temporary(&self) -> bool {
        self.security_token.is_some()
    }
}

/// Everything an [`FcClient`](crate::client::FcClient) needs to talk to one
/// FC endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL, e.g. `https://123456.cn-shanghai.fc.aliyuncs.com`.
    pub endpoint: String,
    pub api_version: String,
    pub credentials: Credentials,
    /// Sent as `x-fc-account-id` when set.
    pub account_id: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Appended to the default User-Agent.
    pub user_agent_suffix: Option<String>,
}

impl ClientConfig {
    /// Build a config for an explicit endpoint. A missing scheme defaults to
    /// `https://`.
    pub fn new(endpoint: &str, api_version: &str, access_key_id: &str, access_key_secret: &str) -> Self {
        Self {
            endpoint: normalize_endpoint(endpoint),
            api_version: api_version.to_string(),
            credentials: Credentials::new(access_key_id, access_key_secret),
            account_id: None,
            request_timeout_secs: 60,
            connect_timeout_secs: 10,
            user_agent_suffix: None,
        }
    }

    /// Build a config for the public endpoint of an account in a region.
    pub fn for_region(account_id: &str, region: &str, credentials: Credentials) -> Self {
        let mut cfg = Self::new(&region_endpoint(account_id, region), DEFAULT_API_VERSION, "", "");
        cfg.credentials = credentials;
        cfg.account_id = Some(account_id.to_string());
        cfg
    }

    /// Resolve configuration from `ENDPOINT`, `ACCESS_KEY_ID`,
    /// `ACCESS_KEY_SECRET` and the optional `SECURITY_TOKEN`, `ACCOUNT_ID`,
    /// `API_VERSION` variables.
    pub fn from_environment() -> FcResult<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let endpoint = var("ENDPOINT").ok_or_else(|| FcError::config("ENDPOINT is not set"))?;
        let ak = var("ACCESS_KEY_ID").ok_or_else(|| FcError::config("ACCESS_KEY_ID is not set"))?;
        let sk = var("ACCESS_KEY_SECRET")
            .ok_or_else(|| FcError::config("ACCESS_KEY_SECRET is not set"))?;
        let version = var("API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let mut cfg = Self::new(&endpoint, &version, &ak, &sk);
        cfg.credentials.security_token = var("SECURITY_TOKEN");
        cfg.account_id = var("ACCOUNT_ID");
        Ok(cfg)
    }

    pub fn with_security_token(mut self, token: &str) -> Self {
        self.credentials.security_token = Some(token.to_string());
        self
    }

    pub fn with_account_id(mut self, account_id: &str) -> Self {
        self.account_id = Some(account_id.to_string());
        self
    }

    pub fn with_timeouts(mut self, request_secs: u64, connect_secs: u64) -> Self {
        self.request_timeout_secs = request_secs;
        self.connect_timeout_secs = connect_secs;
        self
    }

    pub fn with_user_agent_suffix(mut self, suffix: &str) -> Self {
        self.user_agent_suffix = Some(suffix.to_string());
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> FcResult<()> {
        if self.credentials.access_key_id.is_empty() {
            return Err(FcError::config("Access key ID is required"));
        }
        if self.credentials.access_key_secret.is_empty() {
            return Err(FcError::config("Access key secret is required"));
        }
        if self.api_version.is_empty() {
            return Err(FcError::config("API version is required"));
        }
        if url::Url::parse(&self.endpoint).is_err() {
            return Err(FcError::config(&format!("Invalid endpoint '{}'", self.endpoint)));
        }
        Ok(())
    }
}

/// `https://{account}.{region}.fc.aliyuncs.com`
pub fn region_endpoint(account_id: &str, region: &str) -> String {
    format!("https://{}.{}.fc.aliyuncs.com", account_id, region)
}

fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FcErrorKind;

    #[test]
    fn endpoint_without_scheme_defaults_to_https() {
        let cfg = ClientConfig::new("123.cn-hangzhou.fc.aliyuncs.com", DEFAULT_API_VERSION, "ak", "sk");
        assert_eq!(cfg.endpoint, "https://123.cn-hangzhou.fc.aliyuncs.com");
    }

    #[test]
    fn endpoint_keeps_http_and_strips_slash() {
        let cfg = ClientConfig::new("http://127.0.0.1:9000/", DEFAULT_API_VERSION, "ak", "sk");
        assert_eq!(cfg.endpoint, "http://127.0.0.1:9000");
    }

    #[test]
    fn region_config() {
        let cfg = ClientConfig::for_region("1234", "cn-shanghai", Credentials::new("ak", "sk"));
        assert_eq!(cfg.endpoint, "https://1234.cn-shanghai.fc.aliyuncs.com");
        assert_eq!(cfg.account_id.as_deref(), Some("1234"));
        assert_eq!(cfg.api_version, DEFAULT_API_VERSION);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_empty_key() {
        let cfg = ClientConfig::new("https://fc.example.com", DEFAULT_API_VERSION, "", "sk");
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.kind, FcErrorKind::Config);
        assert_eq!(err.status_code, 0);
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let c = Credentials::new_temporary("STS.abc", "very-secret", "token");
        let dbg = format!("{:?}", c);
        assert!(dbg.contains("STS.abc"));
        assert!(!dbg.contains("very-secret"));
        assert!(dbg.contains("<redacted>"));
        assert!(c.is_temporary());
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = ClientConfig::new("https://fc.example.com", DEFAULT_API_VERSION, "ak", "sk")
            .with_account_id("42")
            .with_security_token("tok");
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.account_id.as_deref(), Some("42"));
        assert_eq!(back.credentials.security_token.as_deref(), Some("tok"));
    }
}
