mod common;

use common::{Harness, config_for, request_count};
use jammcli::{
    error::Error,
    spotify::search::search,
    types::{UNKNOWN_ALBUM, UNKNOWN_ARTIST},
};
use reqwest::Method;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path, query_param},
};

fn search_results() -> serde_json::Value {
    json!({
        "tracks": {
            "items": [
                {
                    "id": "t1",
                    "name": "Nightcall",
                    "uri": "spotify:track:t1",
                    "artists": [{ "name": "Kavinsky" }, { "name": "Lovefoxxx" }],
                    "album": { "name": "OutRun" },
                    "preview_url": "https://p.scdn.co/mp3-preview/t1",
                    "external_urls": { "spotify": "https://open.spotify.com/track/t1" }
                },
                {
                    "id": "t2",
                    "name": "Untitled",
                    "uri": "spotify:track:t2",
                    "artists": []
                }
            ]
        }
    })
}

async fn mount_token_endpoint(accounts: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("code=retry-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "playlist-modify-private"
        })))
        .expect(1)
        .mount(accounts)
        .await;
}

#[tokio::test]
async fn test_search_maps_tracks_with_placeholders() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("type", "track"))
        .and(query_param("q", "kavinsky & friends"))
        .and(query_param("market", "US"))
        .and(query_param("limit", "20"))
        .and(header("authorization", "Bearer cached"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_results()))
        .expect(1)
        .mount(&api)
        .await;

    let h = Harness::new(config_for(&api, &accounts))
        .with_token("cached")
        .await;

    let tracks = search(&h.client, "kavinsky & friends").await.unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].id, "t1");
    assert_eq!(tracks[0].artist, "Kavinsky");
    assert_eq!(tracks[0].album, "OutRun");
    assert_eq!(
        tracks[0].preview_url.as_deref(),
        Some("https://p.scdn.co/mp3-preview/t1")
    );
    assert_eq!(
        tracks[0].external_urls.get("spotify").map(String::as_str),
        Some("https://open.spotify.com/track/t1")
    );
    assert_eq!(tracks[1].artist, UNKNOWN_ARTIST);
    assert_eq!(tracks[1].album, UNKNOWN_ALBUM);
}

#[tokio::test]
async fn test_empty_search_term_returns_empty_without_request() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    let h = Harness::new(config_for(&api, &accounts))
        .with_token("cached")
        .await;

    assert!(search(&h.client, "").await.unwrap().is_empty());
    assert!(search(&h.client, "   ").await.unwrap().is_empty());
    assert_eq!(request_count(&api).await, 0);
}

#[tokio::test]
async fn test_search_without_matches_is_not_an_error() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "zz_no_match_xyz"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "tracks": { "items": [] } })),
        )
        .mount(&api)
        .await;

    let h = Harness::new(config_for(&api, &accounts))
        .with_token("cached")
        .await;

    let tracks = search(&h.client, "zz_no_match_xyz").await.unwrap();
    assert!(tracks.is_empty());
}

#[tokio::test]
async fn test_single_401_is_retried_once_with_new_token() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    mount_token_endpoint(&accounts, "fresh").await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "status": 401, "message": "The access token expired" }
        })))
        .expect(1)
        .mount(&api)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_results()))
        .expect(1)
        .mount(&api)
        .await;

    let h = Harness::new(config_for(&api, &accounts))
        .with_token("stale")
        .await
        .with_return_redirect("retry-code", "state-r", "verifier-r")
        .await;

    let tracks = search(&h.client, "nightcall").await.unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(request_count(&api).await, 2);
    assert!(h.navigator.urls().is_empty());
}

#[tokio::test]
async fn test_second_401_is_authentication_expired() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    mount_token_endpoint(&accounts, "fresh").await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&api)
        .await;

    let h = Harness::new(config_for(&api, &accounts))
        .with_token("stale")
        .await
        .with_return_redirect("retry-code", "state-r", "verifier-r")
        .await;

    let result = search(&h.client, "nightcall").await;

    assert!(matches!(result, Err(Error::AuthenticationExpired)));
    assert_eq!(request_count(&api).await, 2);
    assert!(h.tokens.get().await.is_none());
}

#[tokio::test]
async fn test_401_without_return_redirect_hands_over_to_authorization() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&api)
        .await;

    let h = Harness::new(config_for(&api, &accounts))
        .with_token("stale")
        .await;

    let result = h.client.request(Method::GET, "/me", None).await;

    assert!(matches!(result, Err(Error::RedirectIssued)));
    assert_eq!(h.navigator.urls().len(), 1);
    assert_eq!(request_count(&api).await, 1);
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": { "status": 503, "message": "Service unavailable" }
        })))
        .expect(1)
        .mount(&api)
        .await;

    let h = Harness::new(config_for(&api, &accounts))
        .with_token("cached")
        .await;

    let result = h.client.request(Method::GET, "/me", None).await;

    match result {
        Err(e @ Error::RequestFailed { .. }) => {
            assert!(e.is_retryable());
            let Error::RequestFailed { status, message } = e else {
                unreachable!()
            };
            assert_eq!(status, 503);
            assert_eq!(message, "Service unavailable");
        }
        other => panic!("expected RequestFailed, got {other:?}"),
    }
    assert_eq!(request_count(&api).await, 1);
}

#[tokio::test]
async fn test_client_error_keeps_status_and_reason() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&api)
        .await;

    let h = Harness::new(config_for(&api, &accounts))
        .with_token("cached")
        .await;

    let result = h.client.request(Method::GET, "/me", None).await;

    match result {
        Err(Error::RequestFailed { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "Forbidden");
        }
        other => panic!("expected RequestFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_service_is_network_unavailable() {
    let api = MockServer::start().await;
    let accounts = MockServer::start().await;
    let mut config = config_for(&api, &accounts);
    // nothing listens on the discard port
    config.api_url = "http://127.0.0.1:9".to_string();

    let h = Harness::new(config).with_token("cached").await;

    let result = h.client.request(Method::GET, "/me", None).await;

    match result {
        Err(e @ Error::NetworkUnavailable(_)) => assert!(e.is_retryable()),
        other => panic!("expected NetworkUnavailable, got {other:?}"),
    }
}
