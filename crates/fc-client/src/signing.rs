//! Function Compute request signing.
//!
//! Every request carries `Authorization: FC {AccessKeyId}:{Signature}` where
//!
//! ```text
//! Signature = Base64(HMAC-SHA256(AccessKeySecret,
//!     VERB + "\n"
//!   + Content-MD5 + "\n"
//!   + Content-Type + "\n"
//!   + Date + "\n"
//!   + CanonicalizedFCHeaders
//!   + CanonicalizedResource))
//! ```
//!
//! `CanonicalizedFCHeaders` are the `x-fc-*` headers, lowercased, sorted and
//! rendered as `key:value\n`. `CanonicalizedResource` is the unescaped path;
//! for HTTP-trigger pass-through requests it is followed by `\n` and the
//! sorted `key=value` query pairs joined by `\n`.

use crate::config::Credentials;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha2::Sha256;
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

/// Prefix of headers that take part in the signature.
pub const FC_HEADER_PREFIX: &str = "x-fc-";

pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_DATE: &str = "date";
pub const HEADER_CONTENT_MD5: &str = "content-md5";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_SECURITY_TOKEN: &str = "x-fc-security-token";

/// FC request signer.
#[derive(Clone)]
pub struct FcSigner {
    access_key_id: String,
    access_key_secret: String,
    security_token: Option<String>,
}

/// Headers of a request after signing.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub method: String,
    /// Lowercased header names, including `authorization` and `date`.
    pub headers: BTreeMap<String, String>,
}

impl FcSigner {
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            access_key_id: credentials.access_key_id.clone(),
            access_key_secret: credentials.access_key_secret.clone(),
            security_token: credentials.security_token.clone(),
        }
    }

    /// Sign a request.
    ///
    /// `headers` are the request headers (any case); `resource` is the
    /// canonicalized resource built with [`canonical_resource`] or
    /// [`canonical_resource_with_queries`].
    pub fn sign_request(
        &self,
        method: &str,
        resource: &str,
        headers: &BTreeMap<String, String>,
        body: &[u8],
        timestamp: DateTime<Utc>,
    ) -> SignedRequest {
        let method = method.to_uppercase();
        let mut signed: BTreeMap<String, String> = headers
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.clone()))
            .collect();

        signed
            .entry(HEADER_DATE.to_string())
            .or_insert_with(|| http_date(timestamp));
        if !body.is_empty() && !signed.contains_key(HEADER_CONTENT_MD5) {
            signed.insert(HEADER_CONTENT_MD5.to_string(), content_md5(body));
        }
        if let Some(ref token) = self.security_token {
            signed.insert(HEADER_SECURITY_TOKEN.to_string(), token.clone());
        }

        let string_to_sign = string_to_sign(&method, &signed, resource);
        let signature = STANDARD.encode(hmac_sha256(
            self.access_key_secret.as_bytes(),
            string_to_sign.as_bytes(),
        ));
        signed.insert(
            HEADER_AUTHORIZATION.to_string(),
            format!("FC {}:{}", self.access_key_id, signature),
        );

        SignedRequest { method, headers: signed }
    }
}

/// Build the string to sign from lowercased headers.
fn string_to_sign(method: &str, headers: &BTreeMap<String, String>, resource: &str) -> String {
    let get = |name: &str| headers.get(name).map(String::as_str).unwrap_or("");
    format!(
        "{}\n{}\n{}\n{}\n{}{}",
        method,
        get(HEADER_CONTENT_MD5),
        get(HEADER_CONTENT_TYPE),
        get(HEADER_DATE),
        canonical_fc_headers(headers),
        resource
    )
}

/// `x-fc-*` headers, lowercased and sorted, one `key:value\n` per header.
pub fn canonical_fc_headers(headers: &BTreeMap<String, String>) -> String {
    let mut fc: Vec<(String, &str)> = headers
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.as_str()))
        .filter(|(k, _)| k.starts_with(FC_HEADER_PREFIX))
        .collect();
    fc.sort_by(|a, b| a.0.cmp(&b.0));
    fc.iter().map(|(k, v)| format!("{}:{}\n", k, v)).collect()
}

/// Resource for regular API calls: the unescaped path.
pub fn canonical_resource(unescaped_path: &str) -> String {
    unescaped_path.to_string()
}

/// Resource for pass-through calls: path, then sorted `key=value` pairs.
pub fn canonical_resource_with_queries(unescaped_path: &str, queries: &[(String, String)]) -> String {
    let mut params: Vec<String> = queries.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    params.sort();
    format!("{}\n{}", unescaped_path, params.join("\n"))
}

/// RFC 1123 date in GMT, as FC expects in the `Date` header.
pub fn http_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Base64 of the MD5 digest of a body.
pub fn content_md5(body: &[u8]) -> String {
    STANDARD.encode(Md5::digest(body))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
