//! Resource tagging.
//!
//! Tags are plain string pairs attached to a resource ARN. Callers may pass
//! the short form `services/{name}`; the server answers with the fully
//! qualified `acs:fc:{region}:{account}:services/{name}`.

use crate::client::{decode, ApiRequest, FcClient};
use crate::error::FcResult;
use crate::response::{impl_fc_output, ResponseMeta};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query parameter prefix used to filter service listings by tag.
pub const TAG_QUERY_PREFIX: &str = "tag_";

/// A set of tags on one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeMap<String, String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    /// True when every pair of `query` is present here with the same value.
    /// This is the rule the server applies to tag-filtered listings.
    pub fn contains_all(&self, query: &TagSet) -> bool {
        query.0.iter().all(|(k, v)| self.0.get(k) == Some(v))
    }
}

impl<K: ToString, V: ToString> FromIterator<(K, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }
}

impl From<BTreeMap<String, String>> for TagSet {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

/// Short ARN form accepted by the tag API for a service.
pub fn service_resource_arn(service_name: &str) -> String {
    format!("services/{}", service_name)
}

/// Fully qualified service ARN as returned by the server.
pub fn service_arn(region: &str, account_id: &str, service_name: &str) -> String {
    format!("acs:fc:{}:{}:services/{}", region, account_id, service_name)
}

pub(crate) fn tag_query_params(tags: &BTreeMap<String, String>) -> Vec<(String, String)> {
    tags.iter()
        .map(|(k, v)| (format!("{}{}", TAG_QUERY_PREFIX, k), v.clone()))
        .collect()
}

// ── Inputs ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResourceInput {
    pub resource_arn: String,
    pub tags: TagSet,
    #[serde(skip)]
    pub headers: BTreeMap<String, String>,
}

impl TagResourceInput {
    pub fn new(resource_arn: &str) -> Self {
        Self {
            resource_arn: resource_arn.to_string(),
            tags: TagSet::new(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags = self.tags.with(key, value);
        self
    }

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnTagResourceInput {
    pub resource_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_keys: Option<Vec<String>>,
    /// Remove every tag regardless of `tag_keys`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all: Option<bool>,
    #[serde(skip)]
    pub headers: BTreeMap<String, String>,
}

impl UnTagResourceInput {
    pub fn new(resource_arn: &str) -> Self {
        Self {
            resource_arn: resource_arn.to_string(),
            tag_keys: None,
            all: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_tag_keys<S: ToString>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.tag_keys = Some(keys.into_iter().map(|k| k.to_string()).collect());
        self
    }

    pub fn with_all(mut self, all: bool) -> Self {
        self.all = Some(all);
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct GetResourceTagsInput {
    pub resource_arn: String,
    pub headers: BTreeMap<String, String>,
}

impl GetResourceTagsInput {
    pub fn new(resource_arn: &str) -> Self {
        Self {
            resource_arn: resource_arn.to_string(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListTaggedResourcesInput {
    pub limit: Option<u32>,
    pub next_token: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl ListTaggedResourcesInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
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
}

// ── Outputs ─────────────────────────────────────────────────────────────

/// A resource and its tags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedResource {
    #[serde(default)]
    pub resource_arn: String,
    #[serde(default)]
    pub tags: TagSet,
}

#[derive(Debug, Clone)]
pub struct TagResourceOutput {
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone)]
pub struct UnTagResourceOutput {
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone)]
pub struct GetResourceTagsOutput {
    pub resource: TaggedResource,
    pub meta: ResponseMeta,
}

impl GetResourceTagsOutput {
    pub fn resource_arn(&self) -> &str {
        &self.resource.resource_arn
    }

    pub fn tags(&self) -> &TagSet {
        &self.resource.tags
    }
}

#[derive(Debug, Clone)]
pub struct ListTaggedResourcesOutput {
    pub resources: Vec<TaggedResource>,
    pub next_token: Option<String>,
    pub meta: ResponseMeta,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTaggedResourcesBody {
    #[serde(default)]
    resources: Vec<TaggedResource>,
    #[serde(default)]
    next_token: Option<String>,
}

impl_fc_output!(
    TagResourceOutput,
    UnTagResourceOutput,
    GetResourceTagsOutput,
    ListTaggedResourcesOutput,
);

// ── Operations ──────────────────────────────────────────────────────────

impl FcClient {
    pub async fn tag_resource(&self, input: &TagResourceInput) -> FcResult<TagResourceOutput> {
        let req = ApiRequest::new(Method::POST, "/tag")
            .headers(&input.headers)
            .json(input)?;
        let resp = self.send(req).await?;
        Ok(TagResourceOutput { meta: resp.meta() })
    }

    pub async fn untag_resource(&self, input: &UnTagResourceInput) -> FcResult<UnTagResourceOutput> {
        let req = ApiRequest::new(Method::DELETE, "/tag")
            .headers(&input.headers)
            .json(input)?;
        let resp = self.send(req).await?;
        Ok(UnTagResourceOutput { meta: resp.meta() })
    }

    pub async fn get_resource_tags(&self, input: &GetResourceTagsInput) -> FcResult<GetResourceTagsOutput> {
        let req = ApiRequest::new(Method::GET, "/tag")
            .query("resourceArn", Some(&input.resource_arn))
            .headers(&input.headers);
        let resp = self.send(req).await?;
        Ok(GetResourceTagsOutput { resource: decode(&resp)?, meta: resp.meta() })
    }

    pub async fn list_tagged_resources(
        &self,
        input: &ListTaggedResourcesInput,
    ) -> FcResult<ListTaggedResourcesOutput> {
        let req = ApiRequest::new(Method::GET, "/tags")
            .query("limit", input.limit)
            .query("nextToken", input.next_token.as_ref())
            .headers(&input.headers);
        let resp = self.send(req).await?;
        let body: ListTaggedResourcesBody = decode(&resp)?;
        Ok(ListTaggedResourcesOutput {
            resources: body.resources,
            next_token: body.next_token,
            meta: resp.meta(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_all_is_and_semantics() {
        let a: TagSet = [("k1", "v1"), ("k2", "v2")].into_iter().collect();
        let b: TagSet = [("k1", "v1")].into_iter().collect();

        let only_k1 = TagSet::new().with("k1", "v1");
        let both = TagSet::new().with("k1", "v1").with("k2", "v2");

        assert!(a.contains_all(&only_k1));
        assert!(b.contains_all(&only_k1));
        assert!(a.contains_all(&both));
        assert!(!b.contains_all(&both));
        assert!(!a.contains_all(&TagSet::new().with("k1", "other")));
        assert!(a.contains_all(&TagSet::new()));
    }

    #[test]
    fn alternating_tag_sets() {
        let resources: Vec<TagSet> = (0..10)
            .map(|i| {
                if i % 2 == 0 {
                    TagSet::new().with("k1", "v1").with("k3", "v3")
                } else {
                    TagSet::new().with("k2", "v2").with("k3", "v3")
                }
            })
            .collect();
        let count = |q: TagSet| resources.iter().filter(|r| r.contains_all(&q)).count();

        assert_eq!(count(TagSet::new().with("k3", "v3")), 10);
        assert_eq!(count(TagSet::new().with("k1", "v1")), 5);
        assert_eq!(count(TagSet::new().with("k1", "v1").with("k2", "v2")), 0);
    }

    #[test]
    fn tag_query_params_prefixed() {
        let mut tags = BTreeMap::new();
        tags.insert("env".to_string(), "prod".to_string());
        assert_eq!(
            tag_query_params(&tags),
            vec![("tag_env".to_string(), "prod".to_string())]
        );
    }

    #[test]
    fn untag_body_omits_unset() {
        let input = UnTagResourceInput::new("services/demo").with_tag_keys(["k1"]);
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"resourceArn": "services/demo", "tagKeys": ["k1"]})
        );

        let all = UnTagResourceInput::new("services/demo").with_all(true);
        let json = serde_json::to_value(&all).unwrap();
        assert_eq!(json, serde_json::json!({"resourceArn": "services/demo", "all": true}));
    }

    #[test]
    fn untag_body_keeps_explicitly_empty_keys() {
        let input = UnTagResourceInput::new("services/demo")
            .with_tag_keys(Vec::<String>::new())
            .with_all(true);
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"resourceArn": "services/demo", "tagKeys": [], "all": true})
        );
    }

    #[test]
    fn tag_body_shape() {
        let input = TagResourceInput::new(&service_resource_arn("demo")).with_tag("k", "v");
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"resourceArn": "services/demo", "tags": {"k": "v"}})
        );
    }

    #[test]
    fn arn_helpers() {
        assert_eq!(service_resource_arn("svc"), "services/svc");
        assert_eq!(service_arn("cn-shanghai", "123", "svc"), "acs:fc:cn-shanghai:123:services/svc");
    }

    #[test]
    fn tagged_resource_decodes() {
        let body = r#"{"resourceArn":"acs:fc:cn-shanghai:123:services/svc","tags":{"a":"1"}}"#;
        let r: TaggedResource = serde_json::from_str(body).unwrap();
        assert_eq!(r.tags.get("a"), Some("1"));
        assert_eq!(r.tags.len(), 1);
    }
}
