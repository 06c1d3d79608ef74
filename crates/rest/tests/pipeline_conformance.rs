//! End-to-end pipeline conformance tests.
//!
//! Drives the full stack (routing, validation, negotiation, query building,
//! adapter execution, rendering) over an in-memory adapter:
//! - content negotiation (200 media types, 406)
//! - request validation (400, 415, extension handling)
//! - fetching (filters, sort, pagination, includes, relationships)
//! - writing (create, update, delete, bulk member aggregation)
//! - error documents (status selection, method not allowed)

mod common;

use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use serde_json::{Value, json};

const CONTENT_TYPE: HeaderName = HeaderName::from_static("content-type");
const ACCEPT: HeaderName = HeaderName::from_static("accept");

fn json_api() -> HeaderValue {
    HeaderValue::from_static("application/vnd.api+json")
}

fn body_bytes(value: &Value) -> Bytes {
    Bytes::from(serde_json::to_vec(value).expect("failed to serialize test body"))
}

mod content_negotiation {
    use super::*;

    #[tokio::test]
    async fn test_jsonapi_accept_yields_jsonapi_content_type() {
        let (server, _) = common::create_test_server().await;

        let response = server.get("/articles").add_header(ACCEPT, json_api()).await;

        response.assert_status_ok();
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/vnd.api+json"
        );
    }

    #[tokio::test]
    async fn test_missing_accept_yields_plain_json() {
        let (server, _) = common::create_test_server().await;

        let response = server.get("/articles").await;

        response.assert_status_ok();
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_parameterized_only_jsonapi_accept_is_406() {
        let (server, _) = common::create_test_server().await;

        let response = server
            .get("/articles")
            .add_header(
                ACCEPT,
                HeaderValue::from_static("application/vnd.api+json; profile=\"x\""),
            )
            .await;

        response.assert_status(StatusCode::NOT_ACCEPTABLE);
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["status"], 406);
    }

    #[tokio::test]
    async fn test_unserved_type_is_406() {
        let (server, _) = common::create_test_server().await;

        let response = server
            .get("/articles")
            .add_header(ACCEPT, HeaderValue::from_static("text/html"))
            .await;

        response.assert_status(StatusCode::NOT_ACCEPTABLE);
    }
}

mod request_validation {
    use super::*;

    #[tokio::test]
    async fn test_get_with_body_is_400() {
        let (server, _) = common::create_test_server().await;

        let response = server
            .get("/articles")
            .add_header(CONTENT_TYPE, json_api())
            .bytes(body_bytes(&json!({"data": []})))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_without_body_is_400() {
        let (server, _) = common::create_test_server().await;

        let response = server
            .post("/articles")
            .add_header(CONTENT_TYPE, json_api())
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_content_type_is_415_naming_the_required_type() {
        let (server, _) = common::create_test_server().await;

        let response = server
            .post("/articles")
            .add_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .bytes(body_bytes(&json!({"data": {"type": "articles"}})))
            .await;

        response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body: Value = response.json();
        assert!(
            body["errors"][0]["detail"]
                .as_str()
                .unwrap()
                .contains("application/vnd.api+json")
        );
    }

    #[tokio::test]
    async fn test_unknown_extension_is_415_and_enumerates_supported() {
        let (server, _) = common::create_test_server().await;

        let response = server
            .post("/articles")
            .add_header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/vnd.api+json; ext=bulk,unknown-ext"),
            )
            .bytes(body_bytes(&json!({"data": {"type": "articles"}})))
            .await;

        response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body: Value = response.json();
        let detail = body["errors"][0]["detail"].as_str().unwrap();
        assert!(detail.contains("unknown-ext"));
        assert!(detail.contains("bulk"));
    }

    #[tokio::test]
    async fn test_supported_extension_is_accepted() {
        let (server, _) = common::create_test_server().await;

        let response = server
            .post("/articles")
            .add_header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/vnd.api+json; ext=bulk; charset=utf-8"),
            )
            .bytes(body_bytes(
                &json!({"data": {"type": "articles", "attributes": {"title": "ext"}}}),
            ))
            .await;

        response.assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_malformed_json_body_is_400() {
        let (server, _) = common::create_test_server().await;

        let response = server
            .post("/articles")
            .add_header(CONTENT_TYPE, json_api())
            .bytes(Bytes::from_static(b"{not json"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["title"], "Request contains invalid JSON");
    }
}

mod fetching {
    use super::*;

    #[tokio::test]
    async fn test_collection_fetch_reports_total() {
        let (server, _) = common::create_test_server().await;

        let response = server.get("/articles").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
        assert_eq!(body["meta"]["total"], 3);
    }

    #[tokio::test]
    async fn test_singular_fetch_by_id() {
        let (server, _) = common::create_test_server().await;

        let response = server.get("/articles/1").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["id"], "1");
        assert_eq!(body["data"]["attributes"]["title"], "Criteria trees");
    }

    #[tokio::test]
    async fn test_missing_resource_is_404() {
        let (server, _) = common::create_test_server().await;

        let response = server.get("/articles/99").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_resource_type_is_404() {
        let (server, _) = common::create_test_server().await;

        let response = server.get("/robots").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert!(body["errors"][0]["detail"].as_str().unwrap().contains("robots"));
    }

    #[tokio::test]
    async fn test_filter_narrows_the_collection() {
        let (server, _) = common::create_test_server().await;

        let response = server.get("/articles?filter%5Bpublished%5D=true").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_operator_filter() {
        let (server, _) = common::create_test_server().await;

        let response = server.get("/articles?filter%5Bviews%5D%5Bgte%5D=100").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["id"], "2");
    }

    #[tokio::test]
    async fn test_path_id_and_filter_conjoin() {
        let (server, _) = common::create_test_server().await;

        // Article 2 exists but is unpublished; the filters narrow each other.
        let response = server.get("/articles/2?filter%5Bpublished%5D=true").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sort_orders_results() {
        let (server, _) = common::create_test_server().await;

        let response = server.get("/articles?sort=-views").await;

        response.assert_status_ok();
        let body: Value = response.json();
        let ids: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["2", "1", "3"]);
    }

    #[tokio::test]
    async fn test_offset_pagination_with_total() {
        let (server, _) = common::create_test_server().await;

        let response = server
            .get("/articles?sort=views&page%5Boffset%5D=1&page%5Blimit%5D=1")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["id"], "1");
        // Total reflects the whole collection, not the page.
        assert_eq!(body["meta"]["total"], 3);
    }

    #[tokio::test]
    async fn test_include_sideloads_related_resources() {
        let (server, _) = common::create_test_server().await;

        let response = server.get("/articles/1?include=author").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["included"][0]["type"], "people");
        assert_eq!(body["included"][0]["id"], "9");
    }

    #[tokio::test]
    async fn test_fetch_relationship_linkage() {
        let (server, _) = common::create_test_server().await;

        let response = server.get("/articles/1/relationships/comments").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"], json!([{"type": "comments", "id": "5"}]));
    }

    #[tokio::test]
    async fn test_fetch_unknown_relationship_is_404() {
        let (server, _) = common::create_test_server().await;

        let response = server.get("/articles/1/relationships/tags").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}

mod writing {
    use super::*;

    #[tokio::test]
    async fn test_create_returns_201() {
        let (server, adapter) = common::create_test_server().await;

        let response = server
            .post("/articles")
            .add_header(CONTENT_TYPE, json_api())
            .bytes(body_bytes(
                &json!({"data": {"type": "articles", "attributes": {"title": "New"}}}),
            ))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let id = body["data"]["id"].as_str().unwrap();
        assert!(adapter.record("articles", id).is_some());
    }

    #[tokio::test]
    async fn test_create_with_existing_id_is_409() {
        let (server, _) = common::create_test_server().await;

        let response = server
            .post("/articles")
            .add_header(CONTENT_TYPE, json_api())
            .bytes(body_bytes(
                &json!({"data": {"type": "articles", "id": "1", "attributes": {}}}),
            ))
            .await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_bulk_create_aggregates_member_failures() {
        let (server, adapter) = common::create_test_server().await;
        let before = adapter.record_count();

        let response = server
            .post("/articles")
            .add_header(CONTENT_TYPE, json_api())
            .bytes(body_bytes(&json!({"data": [
                {"attributes": {"title": "no type"}},
                {"type": "people", "attributes": {}},
                {"type": "articles", "attributes": {"title": "fine"}}
            ]})))
            .await;

        // Both failures are reported; the response status is the first
        // error's, not the numeric extreme.
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
        assert_eq!(body["errors"][0]["status"], 400);
        assert_eq!(body["errors"][1]["status"], 409);
        // Nothing was written.
        assert_eq!(adapter.record_count(), before);
    }

    #[tokio::test]
    async fn test_bulk_create_succeeds() {
        let (server, adapter) = common::create_test_server().await;
        let before = adapter.record_count();

        let response = server
            .post("/articles")
            .add_header(CONTENT_TYPE, json_api())
            .bytes(body_bytes(&json!({"data": [
                {"type": "articles", "attributes": {"title": "a"}},
                {"type": "articles", "attributes": {"title": "b"}}
            ]})))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert_eq!(adapter.record_count(), before + 2);
    }

    #[tokio::test]
    async fn test_update_patches_attributes() {
        let (server, adapter) = common::create_test_server().await;

        let response = server
            .patch("/articles/1")
            .add_header(CONTENT_TYPE, json_api())
            .bytes(body_bytes(&json!({
                "data": {"type": "articles", "id": "1", "attributes": {"title": "Renamed"}}
            })))
            .await;

        response.assert_status_ok();
        let record = adapter.record("articles", "1").unwrap();
        assert_eq!(record.attributes["title"], json!("Renamed"));
        // Untouched attributes survive.
        assert_eq!(record.attributes["views"], json!(90));
    }

    #[tokio::test]
    async fn test_bulk_update_member_without_id_is_400() {
        let (server, _) = common::create_test_server().await;

        let response = server
            .patch("/articles")
            .add_header(CONTENT_TYPE, json_api())
            .bytes(body_bytes(&json!({"data": [
                {"type": "articles", "attributes": {"title": "a"}}
            ]})))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_id_mismatch_is_409() {
        let (server, _) = common::create_test_server().await;

        let response = server
            .patch("/articles/1")
            .add_header(CONTENT_TYPE, json_api())
            .bytes(body_bytes(&json!({
                "data": {"type": "articles", "id": "2", "attributes": {}}
            })))
            .await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_delete_returns_204() {
        let (server, adapter) = common::create_test_server().await;
        let before = adapter.record_count();

        let response = server.delete("/articles/1").await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(adapter.record_count(), before - 1);
        assert!(adapter.record("articles", "1").is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_resource_is_404() {
        let (server, _) = common::create_test_server().await;

        let response = server.delete("/articles/99").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bulk_delete_by_id_list() {
        let (server, adapter) = common::create_test_server().await;
        let before = adapter.record_count();

        let response = server.delete("/articles/2,3").await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(adapter.record_count(), before - 2);
    }

    #[tokio::test]
    async fn test_unbounded_collection_delete_is_400() {
        let (server, adapter) = common::create_test_server().await;
        let before = adapter.record_count();

        let response = server.delete("/articles").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(adapter.record_count(), before);
    }

    #[tokio::test]
    async fn test_unsupported_method_is_405_with_citation() {
        let (server, _) = common::create_test_server().await;

        let response = server
            .put("/articles/1")
            .add_header(CONTENT_TYPE, json_api())
            .bytes(body_bytes(&json!({"data": {"type": "articles", "id": "1"}})))
            .await;

        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        let body: Value = response.json();
        let detail = body["errors"][0]["detail"].as_str().unwrap();
        assert!(detail.contains("GET, PATCH, DELETE"));
        assert!(detail.contains("jsonapi.org"));
    }
}

mod relationships {
    use super::*;

    #[tokio::test]
    async fn test_add_linkage() {
        let (server, _) = common::create_test_server().await;

        let response = server
            .post("/articles/1/relationships/comments")
            .add_header(CONTENT_TYPE, json_api())
            .bytes(body_bytes(&json!({"data": [{"type": "comments", "id": "6"}]})))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(
            body["data"],
            json!([
                {"type": "comments", "id": "5"},
                {"type": "comments", "id": "6"}
            ])
        );
    }

    #[tokio::test]
    async fn test_remove_linkage() {
        let (server, _) = common::create_test_server().await;

        let response = server
            .delete("/articles/1/relationships/comments")
            .add_header(CONTENT_TYPE, json_api())
            .bytes(body_bytes(&json!({"data": [{"type": "comments", "id": "5"}]})))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn test_relationship_delete_requires_a_body() {
        let (server, _) = common::create_test_server().await;

        let response = server.delete("/articles/1/relationships/comments").await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_patch_on_relationship_is_405() {
        let (server, _) = common::create_test_server().await;

        let response = server
            .patch("/articles/1/relationships/comments")
            .add_header(CONTENT_TYPE, json_api())
            .bytes(body_bytes(&json!({"data": []})))
            .await;

        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        let body: Value = response.json();
        assert!(
            body["errors"][0]["detail"]
                .as_str()
                .unwrap()
                .contains("GET, POST, DELETE")
        );
    }

    #[tokio::test]
    async fn test_invalid_linkage_members_are_aggregated() {
        let (server, _) = common::create_test_server().await;

        let response = server
            .post("/articles/1/relationships/comments")
            .add_header(CONTENT_TYPE, json_api())
            .bytes(body_bytes(&json!({"data": [
                {"type": "comments"},
                {"id": "6"}
            ]})))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }
}
