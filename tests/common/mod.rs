#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use course_library::{api::router, db, state::AppState};
use serde_json::{Value, json};
use tower::ServiceExt;

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Last path segment of the Location header.
    pub fn location_id(&self) -> String {
        let location = self.header("location").expect("Location header missing");
        location
            .rsplit('/')
            .next()
            .expect("Location has no path")
            .to_string()
    }
}

pub async fn test_app() -> Router {
    let pool = db::connect_in_memory()
        .await
        .expect("Failed to create test db");
    router(AppState { db: pool })
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    send_with_type(app, method, uri, body, "application/json").await
}

pub async fn send_with_type(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    content_type: &str,
) -> TestResponse {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "localhost:3000");

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed");

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Body is not JSON")
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn author_json(first: &str, last: &str, category: &str) -> Value {
    json!({
        "firstName": first,
        "lastName": last,
        "dateOfBirth": "1668-05-21T00:00:00+00:00",
        "mainCategory": category
    })
}

pub async fn create_author(app: &Router, first: &str, last: &str, category: &str) -> String {
    let response = send(
        app,
        Method::POST,
        "/api/authors",
        Some(author_json(first, last, category)),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.body["id"].as_str().expect("id missing").to_string()
}
