// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::credentials::{CredentialStore, Credentials, StoredCredentials};
use crate::types::ApiKeyInfo;
use serde_json::json;
use std::io::Cursor;
use std::path::Path;
use tempfile::tempdir;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type ScriptedConsole = Console<Cursor<Vec<u8>>, Vec<u8>>;

const VIDEO_ALBUM: &str = "0c2a5d5e-8d62-4f43-9b1c-0a3c2f8e9d10";

fn console(input: &str) -> ScriptedConsole {
    Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

fn output(console: ScriptedConsole) -> String {
    String::from_utf8(console.into_output()).unwrap()
}

fn config(dir: &Path) -> Config {
    Config {
        credentials_file: dir.join("api_key.json"),
        output_dir: dir.to_path_buf(),
        ..Default::default()
    }
}

fn instance(server: &MockServer) -> String {
    format!("{}/api/", server.uri())
}

fn session(server: &MockServer, config: &Config) -> Session {
    let credentials = Credentials::new(instance(server), "key");
    Session {
        client: ImmichClient::new(&credentials, config).unwrap(),
        credentials,
        key: ApiKeyInfo {
            name: None,
            permissions: vec!["all".into()],
        },
    }
}

fn files_with_prefix(dir: &Path, prefix: &str) -> Vec<std::path::PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix))
        })
        .collect()
}

async fn mock_tags(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "id1", "name": "trip2019"},
            {"id": "id2", "name": "trip2020"},
            {"id": "id3", "name": "beach"}
        ])))
        .mount(server)
        .await;
}

async fn mock_tag_assets(server: &MockServer, tag_id: &str, ids: &[&str]) {
    let items: Vec<_> = ids.iter().map(|id| json!({"id": id})).collect();
    Mock::given(method("POST"))
        .and(path("/api/search/metadata"))
        .and(body_partial_json(json!({"tagIds": [tag_id]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assets": {"items": items, "nextPage": null}
        })))
        .mount(server)
        .await;
}

fn asset(id: &str, name: &str, kind: &str, size: u64) -> serde_json::Value {
    json!({
        "id": id,
        "originalFileName": name,
        "createdAt": "2024-05-01T08:00:00.000Z",
        "type": kind,
        "exifInfo": {"fileSizeInByte": size}
    })
}

async fn mock_album(server: &MockServer, id: &str, assets: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path(format!("/api/albums/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "albumName": "Mixed",
            "assets": assets
        })))
        .mount(server)
        .await;
}

async fn mock_key(server: &MockServer, key: &str, status: u16, permissions: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/api/api-keys/me"))
        .and(header("x-api-key", key))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "name": "helper",
            "permissions": permissions
        })))
        .mount(server)
        .await;
}

#[test]
fn menu_numbers_map_to_processes() {
    assert_eq!(Process::from_choice(0), None);
    assert_eq!(Process::from_choice(1), Some(Process::TagDeletion));
    assert_eq!(Process::from_choice(2), Some(Process::Retime));
    assert_eq!(Process::from_choice(3), Some(Process::VideoSeparation));
    assert_eq!(Process::from_choice(4), None);
}

#[test]
fn processes_require_their_permissions() {
    assert_eq!(
        Process::TagDeletion.required_permissions(),
        &["asset.read", "tag.read", "tag.delete"]
    );
    assert_eq!(
        Process::Retime.required_permissions(),
        &["album.read", "asset.update"]
    );
    assert_eq!(
        Process::VideoSeparation.required_permissions(),
        &["album.read", "album.create"]
    );
}

#[tokio::test]
async fn tag_deletion_writes_rollback_then_reports_failures() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    mock_tags(&server).await;
    mock_tag_assets(&server, "id1", &["a1", "a2"]).await;
    mock_tag_assets(&server, "id2", &[]).await;
    Mock::given(method("DELETE"))
        .and(path("/api/tags/id1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/tags/id2"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Tag not found",
            "error": "Bad Request",
            "statusCode": 400
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/tags/id3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    // pattern, confirm delete, review errors, ENTER
    let mut c = console("trip\n1\n1\n\n");
    let outcome = tag_delete::run(&mut c, &session(&server, &config), &config)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Done);
    let out = output(c);
    assert!(out.contains("0 - trip2019 [id1]"));
    assert!(out.contains("1 - trip2020 [id2]"));
    assert!(!out.contains("beach [id3]"));
    assert!(out.contains("1 tags deleted, 1 errors (of 2 entries in total)."));
    assert!(out.contains("0 - trip2020 [id2] - 400 - Tag not found"));

    let rollbacks = files_with_prefix(dir.path(), "TagRollback");
    assert_eq!(rollbacks.len(), 1);
    let record = crate::rollback::RollbackRecord::load(&rollbacks[0]).unwrap();
    assert_eq!(record.tags["trip2019"], vec!["a1", "a2"]);
    assert!(record.tags["trip2020"].is_empty());
}

#[tokio::test]
async fn tag_deletion_retries_empty_results_and_can_abort() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    mock_tags(&server).await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    // no hit, malformed pattern, one hit, abort
    let mut c = console("zzz\n(\nbeach\n3\n");
    let outcome = tag_delete::run(&mut c, &session(&server, &config), &config)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Aborted);
    let out = output(c);
    assert!(out.contains("Not a single hit"));
    assert!(out.contains("Pattern: [zzz] "));
    assert!(out.contains("Pattern seems to be malformed"));
    assert!(files_with_prefix(dir.path(), "TagRollback").is_empty());
}

#[tokio::test]
async fn tag_deletion_asks_before_listing_long_results() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let mut config = config(dir.path());
    config.tags.review_threshold = 1;
    mock_tags(&server).await;

    // two hits exceed the threshold: enter a different pattern, then abort there too
    let mut c = console("trip\n3\ntrip2019\n3\n");
    let outcome = tag_delete::run(&mut c, &session(&server, &config), &config)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Aborted);
    let out = output(c);
    assert!(out.contains("There are more than 1 hits"));
    assert!(out.contains("Display the result set anyway (2 lines)"));
    assert!(out.contains("Pattern: [trip] "));
    assert!(out.contains("0 - trip2019 [id1]"));
}

#[tokio::test]
async fn tag_deletion_stops_when_rollback_fails() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    mock_tags(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/search/metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nope": []})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let mut c = console("beach\n1\n");
    let err = tag_delete::run(&mut c, &session(&server, &config), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Snapshot { ref tag, .. } if tag == "beach"));
    assert!(files_with_prefix(dir.path(), "TagRollback").is_empty());
}

#[tokio::test]
async fn retime_logs_undatable_names_and_updates_the_rest() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    mock_album(
        &server,
        "al1",
        vec![
            asset("p1", "IMG-20150112-WA0017.jpg", "IMAGE", 10),
            asset("p2", "holiday.png", "IMAGE", 10),
            asset("p3", "IMG-20191231-WA0002.jpg", "IMAGE", 10),
        ],
    )
    .await;
    Mock::given(method("PUT"))
        .and(path("/api/assets"))
        .and(body_json(json!({"ids": ["p1"], "dateTimeOriginal": "2015-01-12T12:04:06.000"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/assets"))
        .and(body_json(json!({"ids": ["p3"], "dateTimeOriginal": "2019-12-31T12:04:06.000"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    // album id, write log, continue, ENTER
    let mut c = console("al1\n2\n1\n\n");
    let outcome = retime::run(&mut c, &session(&server, &config), &config)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Done);
    let out = output(c);
    assert!(out.contains("Found 3 entries in album Mixed, 2 of them"));
    assert!(out.contains("2 assets retimed with no errors."));

    let logs = files_with_prefix(dir.path(), "WA-Errors_");
    assert_eq!(logs.len(), 1);
    assert_eq!(std::fs::read_to_string(&logs[0]).unwrap(), "holiday.png\n");
}

#[tokio::test]
async fn retime_unknown_album_can_be_abandoned() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = config(dir.path());

    let mut c = console("missing\n2\n");
    let outcome = retime::run(&mut c, &session(&server, &config), &config)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Aborted);
    assert!(output(c).contains("came back without an album"));
}

#[tokio::test]
async fn video_split_creates_album_of_videos() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    mock_album(
        &server,
        VIDEO_ALBUM,
        vec![
            asset("v1", "clip.mp4", "VIDEO", 1024),
            asset("p1", "photo.jpg", "IMAGE", 4096),
            asset("v2", "clip2.mov", "VIDEO", 512),
        ],
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/albums"))
        .and(body_json(json!({
            "albumName": "Videos",
            "assetIds": ["v1", "v2"],
            "description": "Album of only videos"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "new"})))
        .expect(1)
        .mount(&server)
        .await;

    // too short id, id, list, continue, too short name, name
    let script = format!("short\n{VIDEO_ALBUM}\n1\n1\nVi\nVideos\n");
    let mut c = console(&script);
    let outcome = video_split::run(&mut c, &session(&server, &config), &config)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Done);
    let out = output(c);
    assert!(out.contains("at least 35 characters"));
    assert!(out.contains("Found 2 videos in album Mixed, with a total size of 1.5 KiB."));
    assert!(out.contains("0 - clip.mp4, 1.0 KiB"));
    assert!(out.contains("at least 3 characters"));
    assert!(out.contains("Created album Videos (new) with 2 videos."));
}

#[tokio::test]
async fn video_split_without_videos_creates_nothing() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    mock_album(&server, VIDEO_ALBUM, vec![asset("p1", "photo.jpg", "IMAGE", 1)]).await;
    Mock::given(method("POST"))
        .and(path("/api/albums"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut c = console(&format!("{VIDEO_ALBUM}\n"));
    let outcome = video_split::run(&mut c, &session(&server, &config), &config)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Done);
    assert!(output(c).contains("No videos"));
}

#[tokio::test]
async fn video_split_refused_creation_is_an_error() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    mock_album(&server, VIDEO_ALBUM, vec![asset("v1", "clip.mp4", "VIDEO", 1)]).await;
    Mock::given(method("POST"))
        .and(path("/api/albums"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "Missing required permission: album.create"
        })))
        .mount(&server)
        .await;

    let mut c = console(&format!("{VIDEO_ALBUM}\n2\nVideos\n"));
    let err = video_split::run(&mut c, &session(&server, &config), &config)
        .await
        .unwrap_err();

    assert_eq!(
        err.item_message(),
        "403 - Missing required permission: album.create"
    );
}

#[tokio::test]
async fn session_reenters_rejected_key_and_saves() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    mock_key(&server, "bad", 401, &[]).await;
    mock_key(&server, "good", 200, &["tag.read"]).await;

    // instance, key, re-enter key, key, save
    let script = format!("{}\nbad\n1\ngood\n1\n", instance(&server));
    let mut c = console(&script);
    let session = session::establish(&mut c, &config).await.unwrap().unwrap();

    assert_eq!(session.credentials.api_key, "good");
    assert!(session.key.grants("tag.read"));
    let out = output(c);
    assert!(out.contains("No key file located"));
    assert!(out.contains("key is not accepted"));

    match CredentialStore::new(&config.credentials_file).load() {
        StoredCredentials::Found(creds) => assert_eq!(creds, session.credentials),
        other => panic!("expected saved credentials, got {other:?}"),
    }
}

#[tokio::test]
async fn session_unreachable_endpoint_can_be_abandoned() {
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    CredentialStore::new(&config.credentials_file)
        .save(&Credentials::new("http://127.0.0.1:9/api/", "k"))
        .unwrap();

    let mut c = console("2\n");
    let session = session::establish(&mut c, &config).await.unwrap();

    assert!(session.is_none());
    assert!(output(c).contains("seems not to work"));
}

#[tokio::test]
async fn session_keeps_old_file_when_operator_declines() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    let old = Credentials::new("http://127.0.0.1:9/api/", "old");
    let store = CredentialStore::new(&config.credentials_file);
    store.save(&old).unwrap();
    mock_key(&server, "new", 200, &["all"]).await;

    // re-enter endpoint and key, keep the old file
    let script = format!("1\n{}\nnew\n2\n", instance(&server));
    let mut c = console(&script);
    let session = session::establish(&mut c, &config).await.unwrap().unwrap();

    assert_eq!(session.credentials.api_key, "new");
    assert!(output(c).contains("differ from the stored ones"));
    match store.load() {
        StoredCredentials::Found(creds) => assert_eq!(creds, old),
        other => panic!("expected old credentials, got {other:?}"),
    }
}

#[tokio::test]
async fn run_refuses_process_without_permissions() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    CredentialStore::new(&config.credentials_file)
        .save(&Credentials::new(instance(&server), "key"))
        .unwrap();
    mock_key(&server, "key", 200, &["tag.read"]).await;

    let mut c = console("1\n0\n");
    let exit = run(&mut c, &config).await.unwrap();

    assert_eq!(exit, Exit::Finished);
    let out = output(c);
    assert!(out.contains("lacks permissions for Delete tags by pattern: asset.read, tag.delete"));
    assert!(!out.contains("save the credentials"));
}

#[tokio::test]
async fn run_reports_failed_process_and_shows_menu_again() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    CredentialStore::new(&config.credentials_file)
        .save(&Credentials::new(instance(&server), "key"))
        .unwrap();
    mock_key(&server, "key", 200, &["all"]).await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let mut c = console("1\n0\n");
    let exit = run(&mut c, &config).await.unwrap();

    assert_eq!(exit, Exit::Finished);
    let out = output(c);
    assert!(out.contains("Delete tags by pattern failed: tags returned HTTP 500: boom"));
    assert_eq!(out.matches("0 - Exit").count(), 2);
}

#[tokio::test]
async fn run_without_credentials_does_nothing() {
    let dir = tempdir().unwrap();
    let config = config(dir.path());

    // manual entry of an unusable endpoint, then abort
    let mut c = console("http://127.0.0.1:9/api/\nk\n2\n");
    let exit = run(&mut c, &config).await.unwrap();

    assert_eq!(exit, Exit::NoCredentials);
    assert!(output(c).contains("No work possible without API key"));
}

#[tokio::test]
async fn closed_input_ends_the_run() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    CredentialStore::new(&config.credentials_file)
        .save(&Credentials::new(instance(&server), "key"))
        .unwrap();
    mock_key(&server, "key", 200, &["all"]).await;

    let mut c = console("");
    assert!(matches!(run(&mut c, &config).await, Err(Error::InputClosed)));
}

async fn mock_tags_for_key(server: &MockServer, key: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .and(header("x-api-key", key))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn run_reenters_key_refused_during_a_process() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    let stored = Credentials::new(instance(&server), "key");
    let store = CredentialStore::new(&config.credentials_file);
    store.save(&stored).unwrap();
    mock_key(&server, "key", 200, &["all"]).await;
    mock_key(&server, "fresh", 200, &["all"]).await;
    mock_tags_for_key(
        &server,
        "key",
        ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid API key",
            "error": "Unauthorized",
            "statusCode": 401
        })),
    )
    .await;
    mock_tags_for_key(&server, "fresh", ResponseTemplate::new(500).set_body_string("boom")).await;

    // process, re-enter key, new key, keep file, process again, exit
    let mut c = console("1\n1\nfresh\n2\n1\n0\n");
    let exit = run(&mut c, &config).await.unwrap();

    assert_eq!(exit, Exit::Finished);
    let out = output(c);
    assert!(out.contains("Delete tags by pattern failed: tags returned HTTP 401: Invalid API key"));
    assert!(out.contains("key is not accepted"));
    assert!(out.contains("API key: "));
    // the second attempt runs with the new key
    assert!(out.contains("Delete tags by pattern failed: tags returned HTTP 500: boom"));
    match store.load() {
        StoredCredentials::Found(creds) => assert_eq!(creds, stored),
        other => panic!("expected old credentials, got {other:?}"),
    }
}

#[tokio::test]
async fn run_ends_when_refused_key_is_not_replaced() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    CredentialStore::new(&config.credentials_file)
        .save(&Credentials::new(instance(&server), "key"))
        .unwrap();
    mock_key(&server, "key", 200, &["all"]).await;
    mock_tags_for_key(&server, "key", ResponseTemplate::new(401)).await;

    let mut c = console("1\n2\n");
    let exit = run(&mut c, &config).await.unwrap();

    assert_eq!(exit, Exit::NoCredentials);
    assert!(output(c).contains("No work possible without API key"));
}

#[tokio::test]
async fn reconnect_takes_new_endpoint_and_key() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    mock_key(&server, "new", 200, &["album.read"]).await;

    // re-enter endpoint and key, save
    let script = format!("1\n{}\nnew\n1\n", instance(&server));
    let mut c = console(&script);
    let session = session::reconnect(&mut c, &config, "connection refused")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(session.credentials.instance, instance(&server));
    assert_eq!(session.credentials.api_key, "new");
    assert!(session.key.grants("album.read"));
    assert!(output(c).contains("seems not to work (connection refused)"));
    assert!(matches!(
        CredentialStore::new(&config.credentials_file).load(),
        StoredCredentials::Found(_)
    ));
}
