//! Service operations: the top-level namespace grouping functions.

use crate::client::{decode, service_path, ApiRequest, FcClient};
use crate::error::FcResult;
use crate::response::{impl_fc_output, ResponseMeta};
use crate::tag::tag_query_params;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Types ───────────────────────────────────────────────────────────────

/// Log Service destination for function logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub logstore: String,
}

impl LogConfig {
    pub fn new(project: &str, logstore: &str) -> Self {
        Self {
            project: project.to_string(),
            logstore: logstore.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VpcConfig {
    #[serde(default)]
    pub vpc_id: String,
    #[serde(default, rename = "vSwitchIds")]
    pub v_switch_ids: Vec<String>,
    #[serde(default)]
    pub security_group_id: String,
}

/// A service as described by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMetadata {
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub log_config: Option<LogConfig>,
    #[serde(default)]
    pub vpc_config: Option<VpcConfig>,
    #[serde(default)]
    pub internet_access: Option<bool>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub last_modified_time: Option<String>,
}

// ── Inputs ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceInput {
    pub service_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_config: Option<LogConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_config: Option<VpcConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internet_access: Option<bool>,
    #[serde(skip)]
    pub headers: BTreeMap<String, String>,
}

impl CreateServiceInput {
    pub fn new(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            description: None,
            role: None,
            log_config: None,
            vpc_config: None,
            internet_access: None,
            headers: BTreeMap::new(),
        }
    }

    /// Renames the service, for re-using one input as a template.
    pub fn with_service_name(mut self, name: &str) -> Self {
        self.service_name = name.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_role(mut self, role_arn: &str) -> Self {
        self.role = Some(role_arn.to_string());
        self
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = Some(log_config);
        self
    }

    pub fn with_vpc_config(mut self, vpc_config: VpcConfig) -> Self {
        self.vpc_config = Some(vpc_config);
        self
    }

    pub fn with_internet_access(mut self, enabled: bool) -> Self {
        self.internet_access = Some(enabled);
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct GetServiceInput {
    pub service_name: String,
    pub qualifier: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl GetServiceInput {
    pub fn new(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            qualifier: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: &str) -> Self {
        self.qualifier = Some(qualifier.to_string());
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }
}

/// Partial update: only fields that were set are sent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceInput {
    #[serde(skip)]
    pub service_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_config: Option<LogConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_config: Option<VpcConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internet_access: Option<bool>,
    #[serde(skip)]
    pub if_match: Option<String>,
    #[serde(skip)]
    pub headers: BTreeMap<String, String>,
}

impl UpdateServiceInput {
    pub fn new(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            description: None,
            role: None,
            log_config: None,
            vpc_config: None,
            internet_access: None,
            if_match: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_role(mut self, role_arn: &str) -> Self {
        self.role = Some(role_arn.to_string());
        self
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = Some(log_config);
        self
    }

    pub fn with_vpc_config(mut self, vpc_config: VpcConfig) -> Self {
        self.vpc_config = Some(vpc_config);
        self
    }

    pub fn with_internet_access(mut self, enabled: bool) -> Self {
        self.internet_access = Some(enabled);
        self
    }

    /// Only apply the update if the service still has this ETag.
    pub fn with_if_match(mut self, etag: &str) -> Self {
        self.if_match = Some(etag.to_string());
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct DeleteServiceInput {
    pub service_name: String,
    pub if_match: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl DeleteServiceInput {
    pub fn new(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
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
}

#[derive(Debug, Clone, Default)]
pub struct ListServicesInput {
    pub limit: Option<u32>,
    pub prefix: Option<String>,
    pub start_key: Option<String>,
    pub next_token: Option<String>,
    /// Only services carrying every one of these tags are returned.
    pub tags: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
}

impl ListServicesInput {
    pub fn new() -> Self {
        Self::default()
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

    pub fn with_tags<K: ToString, V: ToString>(mut self, tags: impl IntoIterator<Item = (K, V)>) -> Self {
        self.tags = tags
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub(crate) fn to_request(&self) -> ApiRequest {
        let mut req = ApiRequest::new(Method::GET, "/services")
            .query("limit", self.limit)
            .query("prefix", self.prefix.as_ref())
            .query("startKey", self.start_key.as_ref())
            .query("nextToken", self.next_token.as_ref());
        for (k, v) in tag_query_params(&self.tags) {
            req = req.query(&k, Some(v));
        }
        req.headers(&self.headers)
    }
}

// ── Outputs ─────────────────────────────────────────────────────────────

/// Output of Create/Get/UpdateService.
#[derive(Debug, Clone)]
pub struct ServiceOutput {
    pub service: ServiceMetadata,
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone)]
pub struct DeleteServiceOutput {
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone)]
pub struct ListServicesOutput {
    /// Services in server order.
    pub services: Vec<ServiceMetadata>,
    pub next_token: Option<String>,
    pub meta: ResponseMeta,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListServicesBody {
    #[serde(default)]
    services: Vec<ServiceMetadata>,
    #[serde(default)]
    next_token: Option<String>,
}

impl_fc_output!(ServiceOutput, DeleteServiceOutput, ListServicesOutput);

// ── Operations ──────────────────────────────────────────────────────────

impl FcClient {
    pub async fn create_service(&self, input: &CreateServiceInput) -> FcResult<ServiceOutput> {
        let req = ApiRequest::new(Method::POST, "/services")
            .headers(&input.headers)
            .json(input)?;
        let resp = self.send(req).await?;
        Ok(ServiceOutput { service: decode(&resp)?, meta: resp.meta() })
    }

    pub async fn get_service(&self, input: &GetServiceInput) -> FcResult<ServiceOutput> {
        let path = service_path(&input.service_name, input.qualifier.as_deref());
        let req = ApiRequest::new(Method::GET, path).headers(&input.headers);
        let resp = self.send(req).await?;
        Ok(ServiceOutput { service: decode(&resp)?, meta: resp.meta() })
    }

    pub async fn update_service(&self, input: &UpdateServiceInput) -> FcResult<ServiceOutput> {
        let req = ApiRequest::new(Method::PUT, service_path(&input.service_name, None))
            .header("if-match", input.if_match.as_deref())
            .headers(&input.headers)
            .json(input)?;
        let resp = self.send(req).await?;
        Ok(ServiceOutput { service: decode(&resp)?, meta: resp.meta() })
    }

    pub async fn delete_service(&self, input: &DeleteServiceInput) -> FcResult<DeleteServiceOutput> {
        let req = ApiRequest::new(Method::DELETE, service_path(&input.service_name, None))
            .header("if-match", input.if_match.as_deref())
            .headers(&input.headers);
        let resp = self.send(req).await?;
        Ok(DeleteServiceOutput { meta: resp.meta() })
    }

    pub async fn list_services(&self, input: &ListServicesInput) -> FcResult<ListServicesOutput> {
        let resp = self.send(input.to_request()).await?;
        let body: ListServicesBody = decode(&resp)?;
        Ok(ListServicesOutput {
            services: body.services,
            next_token: body.next_token,
            meta: resp.meta(),
        })
    }
}
