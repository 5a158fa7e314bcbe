//! # fc-client – Function Compute API client
//!
//! Typed request builders and response models for FC API version
//! `2016-08-15`: services, functions, triggers (OSS, Log, HTTP,
//! EventBridge) and resource tags, plus function invocation and signed
//! pass-through requests to HTTP-triggered functions.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  Operation modules                               │
//! │  service.rs · function.rs · trigger/ · tag.rs    │
//! │  invoke.rs                                       │
//! │  ├── *Input   builders (new + with_*)            │
//! │  └── *Output  typed models + ResponseMeta        │
//! ├──────────────────────────────────────────────────┤
//! │  FcClient  (client.rs)                           │
//! │  ├── send             (API calls, error mapping) │
//! │  └── do_http_request  (raw pass-through)         │
//! ├──────────────────────────────────────────────────┤
//! │  FcSigner  (signing.rs)                          │
//! │  └── content-md5 / x-fc-* headers / hmac-sha256  │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use fc_client::{ClientConfig, CreateServiceInput, FcClient, FcOutput};
//!
//! # async fn run() -> fc_client::FcResult<()> {
//! let client = FcClient::new(ClientConfig::from_environment()?)?;
//! let created = client
//!     .create_service(&CreateServiceInput::new("demo"))
//!     .await?;
//! println!("{:?} etag={:?}", created.service.service_id, created.etag());
//! # Ok(())
//! # }
//! ```

// ── Sub-modules ─────────────────────────────────────────────────────────

pub mod error;
pub mod config;
pub mod signing;
pub mod response;
pub mod client;

// Operations
pub mod service;
pub mod function;
pub mod trigger;
pub mod tag;
pub mod invoke;

// ── Re-exports for ergonomic access ─────────────────────────────────────

pub use client::{FcClient, HttpRequest, HttpResponse};
pub use reqwest::Method;
pub use config::{ClientConfig, Credentials, DEFAULT_API_VERSION};
pub use error::{FcError, FcErrorKind, FcResult};
pub use response::{FcOutput, FcResponse, ResponseMeta};

pub use function::{
    Code, CreateFunctionInput, DeleteFunctionInput, DeleteFunctionOutput, FunctionMetadata,
    FunctionOutput, GetFunctionCodeInput, GetFunctionCodeOutput, GetFunctionInput,
    ListFunctionsInput, ListFunctionsOutput, UpdateFunctionInput,
};
pub use invoke::{InvocationType, InvokeFunctionInput, InvokeFunctionOutput, LogType};
pub use service::{
    CreateServiceInput, DeleteServiceInput, DeleteServiceOutput, GetServiceInput,
    ListServicesInput, ListServicesOutput, LogConfig, ServiceMetadata, ServiceOutput,
    UpdateServiceInput, VpcConfig,
};
pub use tag::{
    GetResourceTagsInput, GetResourceTagsOutput, ListTaggedResourcesInput,
    ListTaggedResourcesOutput, TagResourceInput, TagResourceOutput, TagSet, TaggedResource,
    UnTagResourceInput, UnTagResourceOutput,
};
pub use trigger::{
    eventbridge_source_arn, CreateTriggerInput, DeleteTriggerInput, DeleteTriggerOutput,
    EventBridgeTriggerConfig, EventSourceConfig, EventSourceType, GetTriggerInput,
    HttpAuthType, HttpTriggerConfig, ListTriggersInput, ListTriggersOutput, LogTriggerConfig,
    OssTriggerConfig, TriggerConfig, TriggerMetadata, TriggerOutput, TriggerType,
    UpdateTriggerInput, EVENTBRIDGE_TRIGGER_HEADER,
};
