//! Function CRUD, code packaging and code download.

mod common;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use common::{client, path, signed, timestamps, with};
use fc_client::*;
use mockito::{Matcher, Server};
use serde_json::json;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};

fn function_body(name: &str, description: &str) -> serde_json::Value {
    with(
        json!({
            "functionName": name,
            "functionId": format!("fid-{}", name),
            "description": description,
            "runtime": "nodejs6",
            "handler": "hello_world.handler",
            "timeout": 5,
            "memorySize": 128,
            "codeSize": 2048,
            "codeChecksum": "1234567890"
        }),
        timestamps(),
    )
}

#[tokio::test]
async fn create_function_from_oss() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", path("/services/svc/functions").as_str())
        .match_header("authorization", signed())
        .match_body(Matcher::Json(json!({
            "functionName": "fn",
            "description": "go sdk test function",
            "handler": "hello_world.handler",
            "runtime": "nodejs6",
            "timeout": 5,
            "code": {"ossBucketName": "code-bucket", "ossObjectName": "hello_world_nodejs.zip"}
        })))
        .with_status(200)
        .with_body(function_body("fn", "go sdk test function").to_string())
        .create_async()
        .await;

    let out = client(&server)
        .create_function(
            &CreateFunctionInput::new("svc", "fn")
                .with_description("go sdk test function")
                .with_handler("hello_world.handler")
                .with_runtime("nodejs6")
                .with_code(
                    Code::new()
                        .with_oss_bucket_name("code-bucket")
                        .with_oss_object_name("hello_world_nodejs.zip"),
                )
                .with_timeout(5),
        )
        .await
        .unwrap();

    let f = &out.function;
    assert_eq!(f.function_name.as_deref(), Some("fn"));
    assert_eq!(f.runtime.as_deref(), Some("nodejs6"));
    assert!(f.code_checksum.is_some());
    assert!(f.code_size.is_some());
    assert!(f.function_id.is_some());
    assert!(f.memory_size.is_some());
    assert_eq!(f.timeout, Some(5));
    mock.assert_async().await;
}

#[tokio::test]
async fn create_function_from_local_file_sends_zip() {
    let dir = tempfile::tempdir().unwrap();
    let main = dir.path().join("main.py");
    std::fs::write(&main, "def handler(environ, start_response):\n    pass\n").unwrap();

    let captured: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let sink = captured.clone();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", path("/services/svc/functions").as_str())
        .match_body(Matcher::PartialJson(json!({"functionName": "local-fn"})))
        .with_status(200)
        .with_body_from_request(move |req| {
            let body: serde_json::Value = serde_json::from_slice(req.body().unwrap()).unwrap();
            *sink.lock().unwrap() = body["code"]["zipFile"].as_str().map(String::from);
            function_body("local-fn", "").to_string().into_bytes()
        })
        .create_async()
        .await;

    client(&server)
        .create_function(
            &CreateFunctionInput::new("svc", "local-fn")
                .with_handler("main.handler")
                .with_runtime("python3")
                .with_code(Code::new().with_files(&main)),
        )
        .await
        .unwrap();
    mock.assert_async().await;

    let encoded = captured.lock().unwrap().clone().expect("zipFile sent");
    let raw = STANDARD.decode(encoded).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(raw)).unwrap();
    let mut content = String::new();
    archive.by_name("main.py").unwrap().read_to_string(&mut content).unwrap();
    assert!(content.contains("def handler"));
}

#[tokio::test]
async fn create_function_with_missing_code_path_fails_locally() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", path("/services/svc/functions").as_str())
        .expect(0)
        .create_async()
        .await;

    let err = client(&server)
        .create_function(
            &CreateFunctionInput::new("svc", "fn")
                .with_code(Code::new().with_files("/no/such/code/dir")),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, FcErrorKind::Io);
    mock.assert_async().await;
}

#[tokio::test]
async fn recreate_from_shared_builder() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("POST", path("/services/svc/functions").as_str())
        .match_body(Matcher::PartialJson(json!({"functionName": "fn-1", "handler": "h"})))
        .with_status(200)
        .with_body(function_body("fn-1", "").to_string())
        .create_async()
        .await;
    let second = server
        .mock("POST", path("/services/svc/functions").as_str())
        .match_body(Matcher::PartialJson(json!({"functionName": "fn-2", "handler": "h"})))
        .with_status(200)
        .with_body(function_body("fn-2", "").to_string())
        .create_async()
        .await;

    let base = CreateFunctionInput::new("svc", "fn-1").with_handler("h");
    let c = client(&server);
    c.create_function(&base).await.unwrap();
    c.create_function(&base.clone().with_function_name("fn-2")).await.unwrap();
    assert_eq!(base.function_name, "fn-1");

    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn get_update_list_delete_function() {
    let mut server = Server::new_async().await;
    let get = server
        .mock("GET", path("/services/svc/functions/fn").as_str())
        .with_status(200)
        .with_header("etag", "f-etag")
        .with_body(function_body("fn", "go sdk test function").to_string())
        .create_async()
        .await;
    let update = server
        .mock("PUT", path("/services/svc/functions/fn").as_str())
        .match_header("if-match", "f-etag")
        .match_body(Matcher::Json(json!({"description": "newdesc"})))
        .with_status(200)
        .with_body(function_body("fn", "newdesc").to_string())
        .create_async()
        .await;
    let list = server
        .mock("GET", path("/services/svc/functions").as_str())
        .match_query(Matcher::UrlEncoded("prefix".into(), "go-function-".into()))
        .with_status(200)
        .with_body(
            json!({"functions": [function_body("go-function-a", ""), function_body("go-function-b", "")]})
                .to_string(),
        )
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", path("/services/svc/functions/fn").as_str())
        .with_status(204)
        .create_async()
        .await;

    let c = client(&server);
    let got = c.get_function(&GetFunctionInput::new("svc", "fn")).await.unwrap();
    let etag = got.etag().unwrap().to_string();

    let updated = c
        .update_function(
            &UpdateFunctionInput::new("svc", "fn")
                .with_description("newdesc")
                .with_if_match(&etag),
        )
        .await
        .unwrap();
    assert_eq!(updated.function.description.as_deref(), Some("newdesc"));
    assert_eq!(updated.function.code_checksum, got.function.code_checksum);

    let listed = c
        .list_functions(&ListFunctionsInput::new("svc").with_prefix("go-function-"))
        .await
        .unwrap();
    assert_eq!(listed.functions.len(), 2);
    assert!(listed.next_token.is_none());

    c.delete_function(&DeleteFunctionInput::new("svc", "fn")).await.unwrap();

    get.assert_async().await;
    update.assert_async().await;
    list.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn get_function_code_location() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", path("/services/svc.LATEST/functions/fn/code").as_str())
        .with_status(200)
        .with_body(json!({"url": "https://oss.example.com/code.zip?sig=1", "checksum": "42"}).to_string())
        .create_async()
        .await;

    let out = client(&server)
        .get_function_code(&GetFunctionCodeInput::new("svc", "fn").with_qualifier("LATEST"))
        .await
        .unwrap();
    assert!(out.url.starts_with("https://oss.example.com/"));
    assert_eq!(out.checksum.as_deref(), Some("42"));
    mock.assert_async().await;
}
