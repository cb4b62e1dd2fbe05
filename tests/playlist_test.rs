mod common;

use common::{Harness, config_for, request_count};
use jammcli::{error::Error, spotify::playlist};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_partial_json, method, path},
};

fn uris(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("spotify:track:{i}")).collect()
}

async fn mount_user_and_create(api: &MockServer, playlist_id: &str) {
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user-1",
            "display_name": "Test User"
        })))
        .expect(1)
        .mount(api)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/user-1/playlists"))
        .and(body_partial_json(json!({ "name": "Road Trip", "public": false })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": playlist_id,
            "name": "Road Trip"
        })))
        .expect(1)
        .mount(api)
        .await;
}

#[tokio::test]
async fn test_empty_name_is_rejected_before_any_request() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    let h = Harness::new(config_for(&api, &accounts));

    let result = playlist::save(&h.client, "", &uris(1)).await;

    assert!(matches!(result, Err(Error::ValidationError(_))));
    assert_eq!(request_count(&api).await, 0);
    assert_eq!(request_count(&accounts).await, 0);
    // validation happens before credential resolution
    assert!(h.navigator.urls().is_empty());
}

#[tokio::test]
async fn test_empty_track_list_is_rejected_before_any_request() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    let h = Harness::new(config_for(&api, &accounts))
        .with_token("cached")
        .await;

    let result = playlist::save(&h.client, "Road Trip", &[]).await;

    assert!(matches!(result, Err(Error::ValidationError(_))));
    assert_eq!(request_count(&api).await, 0);
}

#[tokio::test]
async fn test_save_creates_playlist_and_attaches_tracks_in_order() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    mount_user_and_create(&api, "pl-1").await;
    Mock::given(method("POST"))
        .and(path("/playlists/pl-1/tracks"))
        .and(body_json(json!({ "uris": ["spotify:track:b", "spotify:track:a"] })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "snapshot_id": "snap" })),
        )
        .expect(1)
        .mount(&api)
        .await;

    let h = Harness::new(config_for(&api, &accounts))
        .with_token("cached")
        .await;

    let id = playlist::save(
        &h.client,
        "Road Trip",
        &["spotify:track:b".to_string(), "spotify:track:a".to_string()],
    )
    .await
    .unwrap();

    assert_eq!(id, "pl-1");
    assert_eq!(request_count(&api).await, 3);
}

#[tokio::test]
async fn test_large_track_lists_are_attached_in_batches_of_100() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    mount_user_and_create(&api, "pl-big").await;
    let all = uris(150);
    Mock::given(method("POST"))
        .and(path("/playlists/pl-big/tracks"))
        .and(body_json(json!({ "uris": &all[..100] })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "snapshot_id": "s1" })))
        .expect(1)
        .mount(&api)
        .await;
    Mock::given(method("POST"))
        .and(path("/playlists/pl-big/tracks"))
        .and(body_json(json!({ "uris": &all[100..] })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "snapshot_id": "s2" })))
        .expect(1)
        .mount(&api)
        .await;

    let h = Harness::new(config_for(&api, &accounts))
        .with_token("cached")
        .await;

    let id = playlist::save(&h.client, "Road Trip", &all).await.unwrap();

    assert_eq!(id, "pl-big");
    assert_eq!(request_count(&api).await, 4);
}

#[tokio::test]
async fn test_attach_failure_reports_partially_created_playlist() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    mount_user_and_create(&api, "pl-orphan").await;
    Mock::given(method("POST"))
        .and(path("/playlists/pl-orphan/tracks"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&api)
        .await;

    let h = Harness::new(config_for(&api, &accounts))
        .with_token("cached")
        .await;

    let result = playlist::save(
        &h.client,
        "Road Trip",
        &["spotify:track:1".to_string(), "spotify:track:2".to_string()],
    )
    .await;

    match result {
        Err(Error::PartiallyCreated {
            playlist_id,
            attached,
            source,
        }) => {
            assert_eq!(playlist_id, "pl-orphan");
            assert_eq!(attached, 0);
            assert!(matches!(*source, Error::RequestFailed { status: 500, .. }));
        }
        other => panic!("expected PartiallyCreated, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failure_in_later_batch_reports_attached_count() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    mount_user_and_create(&api, "pl-half").await;
    let all = uris(150);
    Mock::given(method("POST"))
        .and(path("/playlists/pl-half/tracks"))
        .and(body_json(json!({ "uris": &all[..100] })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "snapshot_id": "s1" })))
        .expect(1)
        .mount(&api)
        .await;
    Mock::given(method("POST"))
        .and(path("/playlists/pl-half/tracks"))
        .and(body_json(json!({ "uris": &all[100..] })))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&api)
        .await;

    let h = Harness::new(config_for(&api, &accounts))
        .with_token("cached")
        .await;

    let err = playlist::save(&h.client, "Road Trip", &all)
        .await
        .unwrap_err();

    match err {
        Error::PartiallyCreated {
            playlist_id,
            attached,
            ..
        } => {
            assert_eq!(playlist_id, "pl-half");
            assert_eq!(attached, 100);
        }
        other => panic!("expected PartiallyCreated, got {other:?}"),
    }
}

#[tokio::test]
async fn test_user_id_is_percent_encoded_in_path() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "jane doe/+1" })))
        .mount(&api)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/jane%20doe%2F%2B1/playlists"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "pl-enc" })))
        .expect(1)
        .mount(&api)
        .await;
    Mock::given(method("POST"))
        .and(path("/playlists/pl-enc/tracks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "snapshot_id": "s1" })))
        .expect(1)
        .mount(&api)
        .await;

    let h = Harness::new(config_for(&api, &accounts))
        .with_token("cached")
        .await;

    let id = playlist::save(&h.client, "Road Trip", &uris(1)).await.unwrap();

    assert_eq!(id, "pl-enc");
}

#[tokio::test]
async fn test_create_failure_is_not_partial() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "user-1" })))
        .mount(&api)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/user-1/playlists"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "status": 403, "message": "Insufficient client scope" }
        })))
        .mount(&api)
        .await;

    let h = Harness::new(config_for(&api, &accounts))
        .with_token("cached")
        .await;

    let result = playlist::save(&h.client, "Road Trip", &uris(2)).await;

    match result {
        Err(Error::RequestFailed { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "Insufficient client scope");
        }
        other => panic!("expected RequestFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_user_lookup_failure_creates_nothing() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&api)
        .await;

    let h = Harness::new(config_for(&api, &accounts))
        .with_token("cached")
        .await;

    let result = playlist::save(&h.client, "Road Trip", &uris(1)).await;

    match result {
        Err(e) => assert!(e.is_retryable()),
        Ok(id) => panic!("expected failure, got playlist {id}"),
    }
    assert_eq!(request_count(&api).await, 1);
}
