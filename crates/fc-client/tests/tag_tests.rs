//! Tag, untag and tag lookups.

mod common;

use common::{client, path, ACCOUNT_ID, REGION};
use fc_client::tag::{service_arn, service_resource_arn};
use fc_client::*;
use mockito::{Matcher, Server};
use serde_json::json;

#[tokio::test]
async fn tag_then_get_tags() {
    let full_arn = service_arn(REGION, ACCOUNT_ID, "svc");
    let mut server = Server::new_async().await;
    let tag = server
        .mock("POST", path("/tag").as_str())
        .match_body(Matcher::Json(json!({
            "resourceArn": "services/svc",
            "tags": {"k1": "v1", "k2": "v2"}
        })))
        .with_status(200)
        .with_header("x-fc-request-id", "req-tag")
        .create_async()
        .await;
    let get = server
        .mock("GET", path("/tag").as_str())
        .match_query(Matcher::UrlEncoded("resourceArn".into(), "services/svc".into()))
        .with_status(200)
        .with_body(json!({"resourceArn": full_arn, "tags": {"k1": "v1", "k2": "v2"}}).to_string())
        .create_async()
        .await;

    let c = client(&server);
    let out = c
        .tag_resource(
            &TagResourceInput::new(&service_resource_arn("svc"))
                .with_tag("k1", "v1")
                .with_tag("k2", "v2"),
        )
        .await
        .unwrap();
    assert_eq!(out.request_id(), Some("req-tag"));

    let tags = c
        .get_resource_tags(&GetResourceTagsInput::new("services/svc"))
        .await
        .unwrap();
    assert_eq!(tags.resource_arn(), format!("acs:fc:{}:{}:services/svc", REGION, ACCOUNT_ID));
    assert_eq!(tags.tags().get("k2"), Some("v2"));
    assert!(tags.tags().contains_all(&TagSet::new().with("k1", "v1")));

    tag.assert_async().await;
    get.assert_async().await;
}

#[tokio::test]
async fn untag_by_keys_and_all() {
    let mut server = Server::new_async().await;
    let by_keys = server
        .mock("DELETE", path("/tag").as_str())
        .match_body(Matcher::Json(json!({"resourceArn": "services/svc", "tagKeys": ["k1"]})))
        .with_status(200)
        .create_async()
        .await;
    let all = server
        .mock("DELETE", path("/tag").as_str())
        .match_body(Matcher::Json(json!({"resourceArn": "services/svc", "tagKeys": [], "all": true})))
        .with_status(200)
        .create_async()
        .await;

    let c = client(&server);
    c.untag_resource(&UnTagResourceInput::new("services/svc").with_tag_keys(["k1"]))
        .await
        .unwrap();
    c.untag_resource(
        &UnTagResourceInput::new("services/svc")
            .with_tag_keys(Vec::<String>::new())
            .with_all(true),
    )
    .await
    .unwrap();

    by_keys.assert_async().await;
    all.assert_async().await;
}

#[tokio::test]
async fn list_tagged_resources_pages() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", path("/tags").as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "1".into()),
            Matcher::UrlEncoded("nextToken".into(), "page-2".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "resources": [{"resourceArn": service_arn(REGION, ACCOUNT_ID, "b"), "tags": {"env": "prod"}}],
                "nextToken": "page-3"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let out = client(&server)
        .list_tagged_resources(&ListTaggedResourcesInput::new().with_limit(1).with_next_token("page-2"))
        .await
        .unwrap();
    assert_eq!(out.resources.len(), 1);
    assert_eq!(out.resources[0].tags.get("env"), Some("prod"));
    assert_eq!(out.next_token.as_deref(), Some("page-3"));
    mock.assert_async().await;
}

#[tokio::test]
async fn tagging_unknown_resource_is_not_found() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", path("/tag").as_str())
        .with_status(404)
        .with_body(r#"{"ErrorCode":"ServiceNotFound","ErrorMessage":"service 'ghost' does not exist"}"#)
        .create_async()
        .await;

    let err = client(&server)
        .tag_resource(&TagResourceInput::new("services/ghost").with_tag("k", "v"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
