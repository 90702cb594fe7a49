use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::Duration;
use eventdesk::{EventDesk, JwtConfig, TokenIssuer};
use eventdesk_axum::{event_routes, routes};
use eventdesk_storage_sqlite::SqliteRepositoryProvider;
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

async fn setup() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let issuer = TokenIssuer::new(
        JwtConfig::new_hs256(b"eventdesk_axum_event_routes_test_secret")
            .unwrap()
            .with_issuer("eventdesk-test"),
        Duration::minutes(15),
    )
    .unwrap();

    let desk = Arc::new(EventDesk::new(
        Arc::new(SqliteRepositoryProvider::new(pool)),
        issuer,
    ));
    desk.migrate().await.unwrap();

    Router::new()
        .nest("/event", event_routes(desk.clone()).build())
        .nest("/user", routes(desk).build())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn signed_in(app: &Router) -> String {
    let credentials = json!({"username": "alice", "password": "correct-horse"});
    let (status, _) = send(app, post("/user/register", None, credentials.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app, post("/user/login", None, credentials)).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

fn open_day() -> Value {
    json!({
        "title": "Open Day",
        "description": "Campus tours",
        "start_date": "2025-06-15T09:00:00Z",
        "end_date": "2025-06-15T13:00:00Z",
        "estimated_budget": 12000
    })
}

#[tokio::test]
async fn test_list_starts_empty() {
    let app = setup().await;

    let (status, body) = send(&app, get("/event")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"events": []}));
}

#[tokio::test]
async fn test_create_requires_auth() {
    let app = setup().await;

    let (status, body) = send(&app, post("/event/add_event", None, open_day())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Unauthorized", "code": 401}));

    let (status, _) = send(&app, post("/event/add_event", Some("garbage"), open_day())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = send(&app, get("/event")).await;
    assert_eq!(body["events"], json!([]));
}

#[tokio::test]
async fn test_create_and_read_events() {
    let app = setup().await;
    let token = signed_in(&app).await;

    let (status, body) = send(&app, post("/event/add_event", Some(&token), open_day())).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let event = body["event"].clone();
    assert_eq!(event["title"], "Open Day");
    assert_eq!(event["status"], "planned");
    assert_eq!(event["estimated_budget"], 12000);
    assert_eq!(event["notes"], Value::Null);
    assert!(event["created_by"].is_i64());

    let id = event["id"].as_i64().unwrap();
    let (status, body) = send(&app, get(&format!("/event/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"], event);

    let mut graduation = open_day();
    graduation["title"] = json!("Graduation");
    graduation["status"] = json!("In Progress");
    let (status, body) = send(&app, post("/event/add_event", Some(&token), graduation)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["event"]["status"], "in progress");

    let (_, body) = send(&app, get("/event/name/Open%20Day")).await;
    assert_eq!(body["events"], json!([event]));

    let (_, body) = send(&app, get("/event/name/Open")).await;
    assert_eq!(body["events"], json!([]));

    let (_, body) = send(&app, get("/event")).await;
    assert_eq!(body["events"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_event_is_not_found() {
    let app = setup().await;

    let (status, body) = send(&app, get("/event/404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Event not found", "code": 404}));
}

#[tokio::test]
async fn test_invalid_events_are_bad_requests() {
    let app = setup().await;
    let token = signed_in(&app).await;

    let mut unknown_status = open_day();
    unknown_status["status"] = json!("postponed");

    let mut backwards = open_day();
    backwards["end_date"] = json!("2025-06-14T09:00:00Z");

    let mut blank_title = open_day();
    blank_title["title"] = json!("   ");

    let mut negative_budget = open_day();
    negative_budget["estimated_budget"] = json!(-1);

    for body in [unknown_status, backwards, blank_title, negative_budget] {
        let (status, response) =
            send(&app, post("/event/add_event", Some(&token), body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body} -> {response}");
        assert_eq!(response["code"], 400);
    }

    let (_, body) = send(&app, get("/event")).await;
    assert_eq!(body["events"], json!([]));
}
