mod common;

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

use common::{create_author, send, send_with_type, test_app};

const JSON_PATCH: &str = "application/json-patch+json";

#[tokio::test]
async fn test_courses_require_existing_author() {
    let app = test_app().await;
    let missing = Uuid::new_v4();
    let course_id = Uuid::new_v4();
    let body = json!({ "title": "Title", "description": "Description" });

    let list = send(&app, Method::GET, &format!("/api/authors/{missing}/courses"), None).await;
    assert_eq!(list.status, StatusCode::NOT_FOUND);

    let create = send(
        &app,
        Method::POST,
        &format!("/api/authors/{missing}/courses"),
        Some(body.clone()),
    )
    .await;
    assert_eq!(create.status, StatusCode::NOT_FOUND);

    let put = send(
        &app,
        Method::PUT,
        &format!("/api/authors/{missing}/courses/{course_id}"),
        Some(body),
    )
    .await;
    assert_eq!(put.status, StatusCode::NOT_FOUND);

    let patch = send_with_type(
        &app,
        Method::PATCH,
        &format!("/api/authors/{missing}/courses/{course_id}"),
        Some(json!([{ "op": "replace", "path": "/title", "value": "T" }])),
        JSON_PATCH,
    )
    .await;
    assert_eq!(patch.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_and_fetch_course() {
    let app = test_app().await;
    let author_id = create_author(&app, "Jack", "Sparrow", "Singing").await;

    let created = send(
        &app,
        Method::POST,
        &format!("/api/authors/{author_id}/courses"),
        Some(json!({ "title": "Commandeering a Ship", "description": "Without a crew" })),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["authorId"], author_id.as_str());
    assert_eq!(created.location_id(), created.body["id"].as_str().unwrap());

    let fetched = send(
        &app,
        Method::GET,
        &format!("/api/authors/{author_id}/courses/{}", created.location_id()),
        None,
    )
    .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, created.body);

    let other = send(
        &app,
        Method::GET,
        &format!("/api/authors/{author_id}/courses/{}", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(other.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_course_under_another_author_is_not_found() {
    let app = test_app().await;
    let owner = create_author(&app, "Anne", "Bonny", "Rum").await;
    let stranger = create_author(&app, "Mary", "Read", "Navigation").await;

    let created = send(
        &app,
        Method::POST,
        &format!("/api/authors/{owner}/courses"),
        Some(json!({ "title": "Rum Tasting" })),
    )
    .await;

    let response = send(
        &app,
        Method::GET,
        &format!("/api/authors/{stranger}/courses/{}", created.location_id()),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_course_rejects_matching_title_and_description() {
    let app = test_app().await;
    let author_id = create_author(&app, "Jack", "Sparrow", "Singing").await;

    let response = send(
        &app,
        Method::POST,
        &format!("/api/authors/{author_id}/courses"),
        Some(json!({ "title": "Same", "description": "Same" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body["errors"]["$"][0],
        "The provided description should be different from the title."
    );
}

#[tokio::test]
async fn test_create_course_rejects_blank_title() {
    let app = test_app().await;
    let author_id = create_author(&app, "Jack", "Sparrow", "Singing").await;

    let response = send(
        &app,
        Method::POST,
        &format!("/api/authors/{author_id}/courses"),
        Some(json!({ "title": "   " })),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["errors"]["title"][0], "You should fill out a title.");

    let list = send(&app, Method::GET, &format!("/api/authors/{author_id}/courses"), None).await;
    assert_eq!(list.body, Value::Array(vec![]));
}

#[tokio::test]
async fn test_put_upserts_with_route_id_and_is_idempotent() {
    let app = test_app().await;
    let author_id = create_author(&app, "Edward", "Teach", "Rum").await;
    let course_id = Uuid::new_v4();
    let uri = format!("/api/authors/{author_id}/courses/{course_id}");
    let body = json!({ "title": "Beard Care", "description": "Lighting fuses safely" });

    let first = send(&app, Method::PUT, &uri, Some(body.clone())).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["id"], course_id.to_string());
    assert_eq!(first.location_id(), course_id.to_string());

    let second = send(&app, Method::PUT, &uri, Some(body)).await;
    assert_eq!(second.status, StatusCode::NO_CONTENT);

    let fetched = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched.body, first.body);
}

#[tokio::test]
async fn test_put_replaces_existing_course() {
    let app = test_app().await;
    let author_id = create_author(&app, "Edward", "Teach", "Rum").await;
    let created = send(
        &app,
        Method::POST,
        &format!("/api/authors/{author_id}/courses"),
        Some(json!({ "title": "Old", "description": "Old description" })),
    )
    .await;
    let uri = format!("/api/authors/{author_id}/courses/{}", created.location_id());

    let missing_description = send(&app, Method::PUT, &uri, Some(json!({ "title": "New" }))).await;
    assert_eq!(missing_description.status, StatusCode::UNPROCESSABLE_ENTITY);

    let replaced = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "title": "New", "description": "New description" })),
    )
    .await;
    assert_eq!(replaced.status, StatusCode::NO_CONTENT);

    let fetched = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched.body["title"], "New");
    assert_eq!(fetched.body["description"], "New description");
}

#[tokio::test]
async fn test_patch_updates_existing_course() {
    let app = test_app().await;
    let author_id = create_author(&app, "Henry", "Morgan", "Raids").await;
    let created = send(
        &app,
        Method::POST,
        &format!("/api/authors/{author_id}/courses"),
        Some(json!({ "title": "Sacking Panama", "description": "A history" })),
    )
    .await;
    let uri = format!("/api/authors/{author_id}/courses/{}", created.location_id());

    let patched = send_with_type(
        &app,
        Method::PATCH,
        &uri,
        Some(json!([{ "op": "replace", "path": "/title", "value": "Sacking Portobelo" }])),
        JSON_PATCH,
    )
    .await;
    assert_eq!(patched.status, StatusCode::NO_CONTENT);

    let fetched = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched.body["title"], "Sacking Portobelo");
    assert_eq!(fetched.body["description"], "A history");
}

#[tokio::test]
async fn test_invalid_patch_leaves_existing_course_unchanged() {
    let app = test_app().await;
    let author_id = create_author(&app, "Henry", "Morgan", "Raids").await;
    let created = send(
        &app,
        Method::POST,
        &format!("/api/authors/{author_id}/courses"),
        Some(json!({ "title": "Sacking Panama", "description": "A history" })),
    )
    .await;
    let uri = format!("/api/authors/{author_id}/courses/{}", created.location_id());

    let response = send_with_type(
        &app,
        Method::PATCH,
        &uri,
        Some(json!([{ "op": "remove", "path": "/title" }])),
        JSON_PATCH,
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["instance"], uri);

    let fetched = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched.body, created.body);
}

#[tokio::test]
async fn test_patch_upserts_missing_course() {
    let app = test_app().await;
    let author_id = create_author(&app, "Bart", "Roberts", "Flags").await;
    let course_id = Uuid::new_v4();
    let uri = format!("/api/authors/{author_id}/courses/{course_id}");

    let response = send_with_type(
        &app,
        Method::PATCH,
        &uri,
        Some(json!([
            { "op": "replace", "path": "/title", "value": "Designing a Jolly Roger" },
            { "op": "replace", "path": "/description", "value": "Skulls, bones and hourglasses" }
        ])),
        JSON_PATCH,
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["id"], course_id.to_string());

    let fetched = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["title"], "Designing a Jolly Roger");
}

#[tokio::test]
async fn test_invalid_patch_on_missing_course_creates_nothing() {
    let app = test_app().await;
    let author_id = create_author(&app, "Bart", "Roberts", "Flags").await;
    let course_id = Uuid::new_v4();
    let uri = format!("/api/authors/{author_id}/courses/{course_id}");

    let response = send_with_type(
        &app,
        Method::PATCH,
        &uri,
        Some(json!([{ "op": "replace", "path": "/description", "value": "No title" }])),
        JSON_PATCH,
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["errors"]["title"].is_array());

    let fetched = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);

    let list = send(&app, Method::GET, &format!("/api/authors/{author_id}/courses"), None).await;
    assert_eq!(list.body, Value::Array(vec![]));
}

#[tokio::test]
async fn test_patch_to_unknown_member_creates_nothing() {
    let app = test_app().await;
    let author_id = create_author(&app, "Mary", "Read", "Disguise").await;
    let course_id = Uuid::new_v4();
    let uri = format!("/api/authors/{author_id}/courses/{course_id}");

    let response = send_with_type(
        &app,
        Method::PATCH,
        &uri,
        Some(json!([
            { "op": "replace", "path": "/title", "value": "T" },
            { "op": "add", "path": "/description", "value": "D" },
            { "op": "add", "path": "/bogus", "value": 1 }
        ])),
        JSON_PATCH,
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["errors"]["$"][0].as_str().unwrap().contains("bogus"));

    let fetched = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_course() {
    let app = test_app().await;
    let author_id = create_author(&app, "William", "Kidd", "Treasure").await;
    let created = send(
        &app,
        Method::POST,
        &format!("/api/authors/{author_id}/courses"),
        Some(json!({ "title": "Burying Gold" })),
    )
    .await;
    let uri = format!("/api/authors/{author_id}/courses/{}", created.location_id());

    let deleted = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let again = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}
