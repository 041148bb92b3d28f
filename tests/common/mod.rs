//! Common test utilities for immich-helper integration tests
#![allow(dead_code)]

use immich_helper::{Config, Credentials, ImmichClient};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// API key every mocked endpoint expects
pub const TEST_KEY: &str = "integration-key";

/// Client for the mock server's `/api/` base
pub fn client_for(server: &MockServer) -> ImmichClient {
    let creds = Credentials::new(format!("{}/api/", server.uri()), TEST_KEY);
    ImmichClient::new(&creds, &Config::default()).expect("client for mock server")
}

/// `GET tags` answering with `(id, name)` pairs in the given order
pub async fn mount_tags(server: &MockServer, tags: &[(&str, &str)]) {
    let body: Vec<Value> = tags
        .iter()
        .map(|(id, name)| json!({"id": id, "name": name, "value": name}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// `POST search/metadata` for `tag_id`, split into pages of the given ids
///
/// Pages are numbered from 1; every page but the last names its successor as
/// a string, the way the server does.
pub async fn mount_tag_pages(server: &MockServer, tag_id: &str, pages: &[Vec<String>]) {
    for (i, ids) in pages.iter().enumerate() {
        let page = i + 1;
        let next = (page < pages.len()).then(|| (page + 1).to_string());
        let items: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
        Mock::given(method("POST"))
            .and(path("/api/search/metadata"))
            .and(body_partial_json(json!({"tagIds": [tag_id], "page": page})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "albums": {"items": [], "nextPage": null},
                "assets": {"items": items, "nextPage": next}
            })))
            .expect(1)
            .mount(server)
            .await;
    }
}

/// `DELETE tags/{id}` answering with `status`
pub async fn mount_delete(server: &MockServer, tag_id: &str, status: u16) {
    let response = if status == 204 {
        ResponseTemplate::new(204)
    } else {
        ResponseTemplate::new(status).set_body_json(json!({
            "message": "Not found or no tag.delete access",
            "error": "Bad Request",
            "statusCode": status
        }))
    };
    Mock::given(method("DELETE"))
        .and(path(format!("/api/tags/{tag_id}")))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

/// One album member in the server's shape
pub fn asset_json(id: &str, file_name: &str, kind: &str, size: u64) -> Value {
    json!({
        "id": id,
        "originalFileName": file_name,
        "createdAt": "2024-05-01T08:00:00.000Z",
        "type": kind,
        "isFavorite": false,
        "exifInfo": {"fileSizeInByte": size}
    })
}

/// `GET albums/{id}` answering with the given members
pub async fn mount_album(server: &MockServer, album_id: &str, name: &str, assets: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(format!("/api/albums/{album_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": album_id,
            "albumName": name,
            "assets": assets
        })))
        .mount(server)
        .await;
}
