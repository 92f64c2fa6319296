use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use tower::ServiceExt;
use trendix_core::{Environment, TrendBounds};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn test_config(api_base_url: Option<String>) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().expect("socket addr"),
        log_level: "debug".to_string(),
        api_base_url,
        backend_timeout_secs: 5,
        user_agent: "trendix-test".to_string(),
        platforms: vec!["youtube".to_string()],
        history_limit: 30,
        bounds: TrendBounds::default(),
    }
}

fn test_app(api_base_url: Option<String>) -> Router {
    build_app(AppState::from_config(Arc::new(test_config(api_base_url))))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

fn trend_item(id: &str, score: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "video_id": id,
        "title": format!("Video {id}"),
        "channel_id": "UC1",
        "channel_username": "channel",
        "platform": "youtube",
        "category": "Music",
        "category_id": "10",
        "view_count": 1000,
        "like_count": 10,
        "comment_count": 1,
        "published_at": "2025-03-01T00:00:00Z",
        "thumbnail_url": "https://i.ytimg.com/x.jpg",
        "crawled_at": "2025-03-02T00:00:00Z",
        "surge_score": score,
        "internal_notes": "not for clients"
    })
}

// -------------------------------------------------------------------------
// Trend proxy
// -------------------------------------------------------------------------

#[tokio::test]
async fn trends_are_reranked_limited_and_projected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trends/videos"))
        .and(query_param("limit", "2"))
        .and(query_param("days", "3"))
        .and(query_param("velocity_days", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                trend_item("a", serde_json::json!(5)),
                trend_item("b", serde_json::json!(9)),
                trend_item("c", serde_json::Value::Null),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = get_json(
        test_app(Some(server.uri())),
        "/api/trends/videos?limit=2&velocity_days=5",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let items = json["items"].as_array().expect("items array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["video_id"], "b");
    assert_eq!(items[1]["video_id"], "a");
    assert!(items[0].get("internal_notes").is_none());
    assert_eq!(items[0]["category_id"], "10");

    assert_eq!(json["meta"]["platform"], "youtube");
    assert_eq!(json["meta"]["limit"], 2);
    assert_eq!(json["meta"]["requested_limit"], 2);
    assert_eq!(json["meta"]["days"], 3);
    assert_eq!(json["meta"]["velocity_days"], 1);
    assert!(json["meta"].get("message").is_none());
}

#[tokio::test]
async fn meta_limit_reports_actual_item_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trends/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [trend_item("only", serde_json::json!(1))]
        })))
        .mount(&server)
        .await;

    let (status, json) = get_json(test_app(Some(server.uri())), "/api/trends/videos?limit=25").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["meta"]["limit"], 1);
    assert_eq!(json["meta"]["requested_limit"], 25);
}

#[tokio::test]
async fn unsupported_platform_is_rejected_without_backend_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (status, json) = get_json(
        test_app(Some(server.uri())),
        "/api/trends/videos?platform=TikTok&limit=99&days=0&velocity_days=3",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["items"], serde_json::json!([]));
    assert_eq!(json["meta"]["platform"], "tiktok");
    assert_eq!(json["meta"]["limit"], 0);
    assert_eq!(json["meta"]["requested_limit"], 50);
    assert_eq!(json["meta"]["days"], 1);
    assert_eq!(json["meta"]["velocity_days"], 3);
    assert!(json["meta"]["message"].is_string());
}

#[tokio::test]
async fn missing_base_url_is_a_server_error() {
    let (status, json) = get_json(test_app(None), "/api/trends/videos").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["items"], serde_json::json!([]));
    assert_eq!(json["meta"]["limit"], 0);
    assert_eq!(json["meta"]["requested_limit"], 10);
    assert!(json["meta"]["message"]
        .as_str()
        .is_some_and(|m| m.contains("TRENDIX_API_BASE_URL")));
}

#[tokio::test]
async fn repeated_query_key_uses_first_value() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trends/videos"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                trend_item("a", serde_json::json!(1)),
                trend_item("b", serde_json::json!(2)),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = get_json(
        test_app(Some(server.uri())),
        "/api/trends/videos?limit=1&limit=2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["meta"]["requested_limit"], 1);
    assert_eq!(json["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["items"][0]["video_id"], "b");
}

#[tokio::test]
async fn invalid_base_url_is_a_server_error_per_request() {
    let app = test_app(Some("ftp://files.example".to_string()));

    let (status, json) = get_json(app.clone(), "/api/trends/videos").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["items"], serde_json::json!([]));
    assert_eq!(json["meta"]["limit"], 0);
    assert!(json["meta"]["message"]
        .as_str()
        .is_some_and(|m| m.contains("invalid")));

    let (status, json) = get_json(app.clone(), "/api/trends/videos/vid-9/history").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["series"]["points"], serde_json::json!([]));

    let (status, json) = get_json(app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["backend_configured"], false);
}

#[tokio::test]
async fn backend_failure_is_bad_gateway_with_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trends/videos"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db connection reset"))
        .mount(&server)
        .await;

    let (status, json) = get_json(test_app(Some(server.uri())), "/api/trends/videos").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["items"], serde_json::json!([]));
    assert_eq!(json["meta"]["backend_error"], "db connection reset");
    assert_eq!(json["meta"]["message"], "backend request failed: 500");
}

#[tokio::test]
async fn unparseable_backend_body_is_a_generic_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trends/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let (status, json) = get_json(test_app(Some(server.uri())), "/api/trends/videos").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["items"], serde_json::json!([]));
    assert!(json["meta"].get("backend_error").is_none());
}

// -------------------------------------------------------------------------
// Video history
// -------------------------------------------------------------------------

#[tokio::test]
async fn history_returns_sorted_delta_series() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trends/videos/vid-9/view_history"))
        .and(query_param("platform", "youtube"))
        .and(query_param("limit", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "history": [
                { "snapshot_date": "2025-03-03", "view_count": 120, "like_count": 3, "comment_count": 0 },
                { "snapshot_date": "2025-03-01", "view_count": 100, "like_count": 1, "comment_count": 0 },
                { "snapshot_date": "2025-03-02", "view_count": 150, "like_count": 2, "comment_count": 0 }
            ]
        })))
        .mount(&server)
        .await;

    let (status, json) = get_json(
        test_app(Some(server.uri())),
        "/api/trends/videos/vid-9/history?metric=views",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["video_id"], "vid-9");
    assert_eq!(json["metric"], "views");
    let series = &json["series"];
    assert_eq!(series["min"], 100);
    assert_eq!(series["maxDelta"], 50);
    assert_eq!(series["netChange"], 20);
    assert_eq!(series["isConstant"], false);
    let deltas: Vec<i64> = series["points"]
        .as_array()
        .expect("points")
        .iter()
        .filter_map(|p| p["delta"].as_i64())
        .collect();
    assert_eq!(deltas, vec![0, 50, 20]);
}

#[tokio::test]
async fn history_repeated_metric_uses_first_value() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trends/videos/vid-9/view_history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "history": [
                { "snapshot_date": "2025-03-01", "view_count": 100, "like_count": null },
                { "snapshot_date": "2025-03-02", "view_count": 150, "like_count": 4 }
            ]
        })))
        .mount(&server)
        .await;

    let (status, json) = get_json(
        test_app(Some(server.uri())),
        "/api/trends/videos/vid-9/history?metric=likes&metric=views",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["metric"], "likes");
    assert_eq!(json["series"]["points"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["series"]["netChange"], 4);
}

#[tokio::test]
async fn history_rejects_unknown_metric() {
    let (status, json) = get_json(
        test_app(Some("http://127.0.0.1:1".to_string())),
        "/api/trends/videos/vid-9/history?metric=shares",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["series"]["points"], serde_json::json!([]));
    assert_eq!(json["series"]["isConstant"], true);
}

#[tokio::test]
async fn history_backend_failure_still_returns_empty_series() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trends/videos/vid-9/view_history"))
        .respond_with(ResponseTemplate::new(404).set_body_string("unknown video"))
        .mount(&server)
        .await;

    let (status, json) = get_json(
        test_app(Some(server.uri())),
        "/api/trends/videos/vid-9/history?metric=likes",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["backend_error"], "unknown video");
    assert_eq!(json["series"]["points"], serde_json::json!([]));
    assert_eq!(json["series"]["min"], 0);
}

#[tokio::test]
async fn history_without_base_url_is_a_server_error() {
    let (status, json) = get_json(test_app(None), "/api/trends/videos/vid-9/history").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["metric"], "views");
    assert_eq!(json["series"]["isConstant"], true);
}

// -------------------------------------------------------------------------
// Health
// -------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_backend_configuration() {
    let (status, json) = get_json(test_app(None), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["backend_configured"], false);
    assert!(json["meta"]["request_id"].is_string());
}

#[test]
fn proxy_failure_status_mapping() {
    assert_eq!(
        ProxyFailure::UnsupportedPlatform("x".to_string()).status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        ProxyFailure::MissingBaseUrl.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        ProxyFailure::BadGateway {
            status: 503,
            body: String::new()
        }
        .status(),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        ProxyFailure::Transport.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        ProxyFailure::BadQuery("x".to_string()).status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        ProxyFailure::InvalidBaseUrl("x".to_string()).status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
