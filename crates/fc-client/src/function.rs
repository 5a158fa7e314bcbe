//! Function operations and code packaging.

use crate::client::{decode, function_path, service_path, ApiRequest, FcClient};
use crate::error::{FcError, FcErrorKind, FcResult};
use crate::response::{impl_fc_output, ResponseMeta};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

// ── Code ────────────────────────────────────────────────────────────────

/// Function code: either an OSS object or an inline zip archive.
///
/// `with_files` points at local content instead; it is read and packaged
/// when the request is dispatched, so a missing path only fails then.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Code {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oss_bucket_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oss_object_name: Option<String>,
    /// Base64 of a zip archive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_file: Option<String>,
    #[serde(skip)]
    pub files: Option<PathBuf>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_oss_bucket_name(mut self, bucket: &str) -> Self {
        self.oss_bucket_name = Some(bucket.to_string());
        self
    }

    pub fn with_oss_object_name(mut self, object: &str) -> Self {
        self.oss_object_name = Some(object.to_string());
        self
    }

    /// Inline an already built zip archive.
    pub fn with_zip_file(mut self, archive: &[u8]) -> Self {
        self.zip_file = Some(STANDARD.encode(archive));
        self
    }

    /// A `.zip` archive, a single file or a directory on the local disk.
    pub fn with_files(mut self, path: impl AsRef<Path>) -> Self {
        self.files = Some(path.as_ref().to_path_buf());
        self
    }

    /// Replace a local path with its packaged `zipFile`.
    pub(crate) async fn resolve(mut self) -> FcResult<Self> {
        let Some(path) = self.files.take() else {
            return Ok(self);
        };
        let archive = tokio::task::spawn_blocking(move || package(&path))
            .await
            .map_err(|e| FcError::new(FcErrorKind::Io, "PackagingAborted", &e.to_string(), 0))??;
        self.zip_file = Some(STANDARD.encode(archive));
        Ok(self)
    }
}

/// Build the zip archive for a local path.
///
/// A file ending in `.zip` is taken as-is. Any other file becomes a
/// one-entry archive. A directory is archived recursively with entry names
/// relative to it.
pub fn package(path: &Path) -> FcResult<Vec<u8>> {
    let meta = std::fs::metadata(path).map_err(|e| {
        FcError::new(
            FcErrorKind::Io,
            "CodePathUnreadable",
            &format!("{}: {}", path.display(), e),
            0,
        )
    })?;

    if meta.is_file() {
        let is_zip = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("zip"))
            .unwrap_or(false);
        if is_zip {
            return Ok(std::fs::read(path)?);
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "index".to_string());
        return zip_entries(vec![(name, path.to_path_buf())]);
    }

    let mut entries = Vec::new();
    for entry in walkdir::WalkDir::new(path).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            FcError::new(FcErrorKind::Io, "CodePathUnreadable", &e.to_string(), 0)
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(path)
            .unwrap_or_else(|_| entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        entries.push((rel, entry.path().to_path_buf()));
    }
    zip_entries(entries)
}

fn zip_entries(entries: Vec<(String, PathBuf)>) -> FcResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    for (name, file) in entries {
        zip.start_file(name, options)?;
        zip.write_all(&std::fs::read(&file)?)?;
    }
    Ok(zip.finish()?.into_inner())
}

// ── Types ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionMetadata {
    #[serde(default)]
    pub function_name: Option<String>,
    #[serde(default)]
    pub function_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub handler: Option<String>,
    #[serde(default)]
    pub initializer: Option<String>,
    #[serde(default)]
    pub initialization_timeout: Option<i32>,
    /// Seconds.
    #[serde(default)]
    pub timeout: Option<i32>,
    /// MiB.
    #[serde(default)]
    pub memory_size: Option<i32>,
    #[serde(default)]
    pub instance_concurrency: Option<i32>,
    #[serde(default)]
    pub environment_variables: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub code_size: Option<i64>,
    #[serde(default)]
    pub code_checksum: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub last_modified_time: Option<String>,
}

// ── Inputs ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFunctionInput {
    #[serde(skip)]
    pub service_name: String,
    pub function_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initializer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initialization_timeout: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_concurrency: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_variables: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip)]
    pub headers: BTreeMap<String, String>,
}

impl CreateFunctionInput {
    pub fn new(service_name: &str, function_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            function_name: function_name.to_string(),
            description: None,
            runtime: None,
            handler: None,
            initializer: None,
            initialization_timeout: None,
            timeout: None,
            memory_size: None,
            instance_concurrency: None,
            environment_variables: None,
            code: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_function_name(mut self, name: &str) -> Self {
        self.function_name = name.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_runtime(mut self, runtime: &str) -> Self {
        self.runtime = Some(runtime.to_string());
        self
    }

    pub fn with_handler(mut self, handler: &str) -> Self {
        self.handler = Some(handler.to_string());
        self
    }

    pub fn with_initializer(mut self, initializer: &str) -> Self {
        self.initializer = Some(initializer.to_string());
        self
    }

    pub fn with_initialization_timeout(mut self, secs: i32) -> Self {
        self.initialization_timeout = Some(secs);
        self
    }

    pub fn with_timeout(mut self, secs: i32) -> Self {
        self.timeout = Some(secs);
        self
    }

    pub fn with_memory_size(mut self, mib: i32) -> Self {
        self.memory_size = Some(mib);
        self
    }

    pub fn with_instance_concurrency(mut self, n: i32) -> Self {
        self.instance_concurrency = Some(n);
        self
    }

    pub fn with_environment_variables(mut self, vars: BTreeMap<String, String>) -> Self {
        self.environment_variables = Some(vars);
        self
    }

    pub fn with_code(mut self, code: Code) -> Self {
        self.code = Some(code);
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
pub struct UpdateFunctionInput {
    #[serde(skip)]
    pub service_name: String,
    #[serde(skip)]
    pub function_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initializer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initialization_timeout: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_concurrency: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_variables: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip)]
    pub if_match: Option<String>,
    #[serde(skip)]
    pub headers: BTreeMap<String, String>,
}

impl UpdateFunctionInput {
    pub fn new(service_name: &str, function_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            function_name: function_name.to_string(),
            description: None,
            runtime: None,
            handler: None,
            initializer: None,
            initialization_timeout: None,
            timeout: None,
            memory_size: None,
            instance_concurrency: None,
            environment_variables: None,
            code: None,
            if_match: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_runtime(mut self, runtime: &str) -> Self {
        self.runtime = Some(runtime.to_string());
        self
    }

    pub fn with_handler(mut self, handler: &str) -> Self {
        self.handler = Some(handler.to_string());
        self
    }

    pub fn with_initializer(mut self, initializer: &str) -> Self {
        self.initializer = Some(initializer.to_string());
        self
    }

    pub fn with_initialization_timeout(mut self, secs: i32) -> Self {
        self.initialization_timeout = Some(secs);
        self
    }

    pub fn with_timeout(mut self, secs: i32) -> Self {
        self.timeout = Some(secs);
        self
    }

    pub fn with_memory_size(mut self, mib: i32) -> Self {
        self.memory_size = Some(mib);
        self
    }

    pub fn with_instance_concurrency(mut self, n: i32) -> Self {
        self.instance_concurrency = Some(n);
        self
    }

    pub fn with_environment_variables(mut self, vars: BTreeMap<String, String>) -> Self {
        self.environment_variables = Some(vars);
        self
    }

    pub fn with_code(mut self, code: Code) -> Self {
        self.code = Some(code);
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
}

/// Addresses one function, optionally through a version or alias.
#[derive(Debug, Clone)]
pub struct GetFunctionInput {
    pub service_name: String,
    pub function_name: String,
    pub qualifier: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl GetFunctionInput {
    pub fn new(service_name: &str, function_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            function_name: function_name.to_string(),
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

    fn path(&self) -> String {
        function_path(&self.service_name, self.qualifier.as_deref(), &self.function_name)
    }
}

/// Same addressing as [`GetFunctionInput`].
pub type GetFunctionCodeInput = GetFunctionInput;

#[derive(Debug, Clone)]
pub struct DeleteFunctionInput {
    pub service_name: String,
    pub function_name: String,
    pub if_match: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl DeleteFunctionInput {
    pub fn new(service_name: &str, function_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            function_name: function_name.to_string(),
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

#[derive(Debug, Clone)]
pub struct ListFunctionsInput {
    pub service_name: String,
    pub qualifier: Option<String>,
    pub limit: Option<u32>,
    pub prefix: Option<String>,
    pub start_key: Option<String>,
    pub next_token: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl ListFunctionsInput {
    pub fn new(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            qualifier: None,
            limit: None,
            prefix: None,
            start_key: None,
            next_token: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: &str) -> Self {
        self.qualifier = Some(qualifier.to_string());
        self
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
}

// ── Outputs ─────────────────────────────────────────────────────────────

/// Output of Create/Get/UpdateFunction.
#[derive(Debug, Clone)]
pub struct FunctionOutput {
    pub function: FunctionMetadata,
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone)]
pub struct DeleteFunctionOutput {
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone)]
pub struct ListFunctionsOutput {
    pub functions: Vec<FunctionMetadata>,
    pub next_token: Option<String>,
    pub meta: ResponseMeta,
}

/// Download location of a function's code package.
#[derive(Debug, Clone)]
pub struct GetFunctionCodeOutput {
    /// Pre-signed, short-lived URL.
    pub url: String,
    pub checksum: Option<String>,
    pub meta: ResponseMeta,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFunctionsBody {
    #[serde(default)]
    functions: Vec<FunctionMetadata>,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Deserialize)]
struct FunctionCodeBody {
    #[serde(default)]
    url: String,
    #[serde(default)]
    checksum: Option<String>,
}

impl_fc_output!(
    FunctionOutput,
    DeleteFunctionOutput,
    ListFunctionsOutput,
    GetFunctionCodeOutput,
);

// ── Operations ──────────────────────────────────────────────────────────

impl FcClient {
    pub async fn create_function(&self, input: &CreateFunctionInput) -> FcResult<FunctionOutput> {
        let mut body = input.clone();
        if let Some(code) = body.code.take() {
            body.code = Some(code.resolve().await?);
        }
        let path = format!("{}/functions", service_path(&input.service_name, None));
        let req = ApiRequest::new(Method::POST, path)
            .headers(&input.headers)
            .json(&body)?;
        let resp = self.send(req).await?;
        Ok(FunctionOutput { function: decode(&resp)?, meta: resp.meta() })
    }

    pub async fn get_function(&self, input: &GetFunctionInput) -> FcResult<FunctionOutput> {
        let req = ApiRequest::new(Method::GET, input.path()).headers(&input.headers);
        let resp = self.send(req).await?;
        Ok(FunctionOutput { function: decode(&resp)?, meta: resp.meta() })
    }

    pub async fn get_function_code(&self, input: &GetFunctionCodeInput) -> FcResult<GetFunctionCodeOutput> {
        let req = ApiRequest::new(Method::GET, format!("{}/code", input.path())).headers(&input.headers);
        let resp = self.send(req).await?;
        let body: FunctionCodeBody = decode(&resp)?;
        Ok(GetFunctionCodeOutput {
            url: body.url,
            checksum: body.checksum,
            meta: resp.meta(),
        })
    }

    pub async fn update_function(&self, input: &UpdateFunctionInput) -> FcResult<FunctionOutput> {
        let mut body = input.clone();
        if let Some(code) = body.code.take() {
            body.code = Some(code.resolve().await?);
        }
        let path = function_path(&input.service_name, None, &input.function_name);
        let req = ApiRequest::new(Method::PUT, path)
            .header("if-match", input.if_match.as_deref())
            .headers(&input.headers)
            .json(&body)?;
        let resp = self.send(req).await?;
        Ok(FunctionOutput { function: decode(&resp)?, meta: resp.meta() })
    }

    pub async fn delete_function(&self, input: &DeleteFunctionInput) -> FcResult<DeleteFunctionOutput> {
        let path = function_path(&input.service_name, None, &input.function_name);
        let req = ApiRequest::new(Method::DELETE, path)
            .header("if-match", input.if_match.as_deref())
            .headers(&input.headers);
        let resp = self.send(req).await?;
        Ok(DeleteFunctionOutput { meta: resp.meta() })
    }

    pub async fn list_functions(&self, input: &ListFunctionsInput) -> FcResult<ListFunctionsOutput> {
        let path = format!(
            "{}/functions",
            service_path(&input.service_name, input.qualifier.as_deref())
        );
        let req = ApiRequest::new(Method::GET, path)
            .query("limit", input.limit)
            .query("prefix", input.prefix.as_ref())
            .query("startKey", input.start_key.as_ref())
            .query("nextToken", input.next_token.as_ref())
            .headers(&input.headers);
        let resp = self.send(req).await?;
        let body: ListFunctionsBody = decode(&resp)?;
        Ok(ListFunctionsOutput {
            functions: body.functions,
            next_token: body.next_token,
            meta: resp.meta(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn entry_names(archive: &[u8]) -> Vec<String> {
        let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
        let mut names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn oss_code_serializes_camel_case() {
        let code = Code::new().with_oss_bucket_name("bucket").with_oss_object_name("hello.zip");
        let json = serde_json::to_value(&code).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"ossBucketName": "bucket", "ossObjectName": "hello.zip"})
        );
    }

    #[test]
    fn create_input_body_excludes_service() {
        let input = CreateFunctionInput::new("svc", "fn")
            .with_handler("main.handler")
            .with_runtime("python3")
            .with_timeout(5);
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "functionName": "fn",
                "handler": "main.handler",
                "runtime": "python3",
                "timeout": 5
            })
        );
    }

    #[test]
    fn rebranded_input_keeps_base() {
        let base = CreateFunctionInput::new("svc", "a").with_handler("h1");
        let other = base.clone().with_function_name("b").with_handler("h2");
        assert_eq!(base.function_name, "a");
        assert_eq!(base.handler.as_deref(), Some("h1"));
        assert_eq!(other.function_name, "b");
    }

    #[test]
    fn package_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.py");
        std::fs::write(&file, "def handler(e, c):\n    return 'hi'\n").unwrap();

        let archive = package(&file).unwrap();
        assert_eq!(entry_names(&archive), vec!["main.py"]);

        let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
        let mut content = String::new();
        zip.by_name("main.py").unwrap().read_to_string(&mut content).unwrap();
        assert!(content.contains("return 'hi'"));
    }

    #[test]
    fn package_directory_uses_relative_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("lib")).unwrap();
        std::fs::write(dir.path().join("index.js"), "exports.handler = 1").unwrap();
        std::fs::write(dir.path().join("lib/util.js"), "module.exports = 2").unwrap();

        let archive = package(dir.path()).unwrap();
        assert_eq!(entry_names(&archive), vec!["index.js", "lib/util.js"]);
    }

    #[test]
    fn package_zip_is_passed_through() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("code.ZIP");
        std::fs::write(&zip_path, b"PK\x03\x04not-really").unwrap();
        assert_eq!(package(&zip_path).unwrap(), b"PK\x03\x04not-really".to_vec());
    }

    #[test]
    fn package_missing_path_is_io_error() {
        let err = package(Path::new("/definitely/not/here")).unwrap_err();
        assert_eq!(err.kind, FcErrorKind::Io);
        assert!(err.message.contains("/definitely/not/here"));
    }

    #[tokio::test]
    async fn resolve_replaces_files_with_zip_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.py");
        std::fs::write(&file, "x = 1").unwrap();

        let code = Code::new().with_files(&file).resolve().await.unwrap();
        assert!(code.files.is_none());
        let raw = STANDARD.decode(code.zip_file.unwrap()).unwrap();
        assert_eq!(entry_names(&raw), vec!["main.py"]);
    }

    #[test]
    fn function_metadata_decodes() {
        let body = r#"{
            "functionName": "fn", "functionId": "id-1", "runtime": "nodejs6",
            "handler": "hello_world.handler", "timeout": 5, "memorySize": 128,
            "codeSize": 1024, "codeChecksum": "123456",
            "environmentVariables": {"A": "1"},
            "createdTime": "2018-01-01T00:00:00Z", "lastModifiedTime": "2018-01-01T00:00:00Z"
        }"#;
        let f: FunctionMetadata = serde_json::from_str(body).unwrap();
        assert_eq!(f.memory_size, Some(128));
        assert_eq!(f.code_size, Some(1024));
        assert_eq!(f.environment_variables.unwrap()["A"], "1");
    }
}
