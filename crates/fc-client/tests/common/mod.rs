#![allow(dead_code)]

use fc_client::{ClientConfig, FcClient, DEFAULT_API_VERSION};
use mockito::{Matcher, ServerGuard};

pub const ACCOUNT_ID: &str = "1234567890";
pub const REGION: &str = "cn-shanghai";

pub fn client(server: &ServerGuard) -> FcClient {
    let cfg = ClientConfig::new(&server.url(), DEFAULT_API_VERSION, "test-ak", "test-sk")
        .with_account_id(ACCOUNT_ID);
    FcClient::new(cfg).unwrap()
}

pub fn path(rest: &str) -> String {
    format!("/{}{}", DEFAULT_API_VERSION, rest)
}

pub fn signed() -> Matcher {
    Matcher::Regex("^FC test-ak:[A-Za-z0-9+/]+=*$".to_string())
}

pub fn timestamps() -> serde_json::Value {
    serde_json::json!({
        "createdTime": "2024-05-01T08:00:00Z",
        "lastModifiedTime": "2024-05-01T08:00:00Z"
    })
}

/// Merge `extra` into `base`.
pub fn with(mut base: serde_json::Value, extra: serde_json::Value) -> serde_json::Value {
    if let (Some(b), Some(e)) = (base.as_object_mut(), extra.as_object()) {
        for (k, v) in e {
            b.insert(k.clone(), v.clone());
        }
    }
    base
}
