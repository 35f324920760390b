use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use json_patch::Patch;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use sqlx::SqliteConnection;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::api::extract::{Json, Links, Path, ValidatedJson};
use crate::db::repository;
use crate::error::{AppError, DOCUMENT_KEY};
use crate::models::*;
use crate::state::AppState;

async fn ensure_author_exists(conn: &mut SqliteConnection, author_id: Uuid) -> Result<(), AppError> {
    if repository::author_exists(conn, author_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

fn created(links: &Links, course: &Course) -> Response {
    (
        StatusCode::CREATED,
        [(
            header::LOCATION,
            links.course_for_author(course.author_id, course.id),
        )],
        Json(CourseDto::from(course)),
    )
        .into_response()
}

/// Runs a JSON Patch against the serialized form of `target`.
///
/// Failures are reported as validation problems: the document parsed, but
/// the operations do not fit it. Operations may only touch members that
/// `target` already serializes.
pub fn apply_patch<T>(target: &T, patch: &Patch) -> Result<T, AppError>
where
    T: Serialize + DeserializeOwned,
{
    let mut doc = serde_json::to_value(target)
        .map_err(|e| AppError::validation(DOCUMENT_KEY, e.to_string()))?;
    let known: Vec<String> = match &doc {
        Value::Object(members) => members.keys().cloned().collect(),
        _ => Vec::new(),
    };

    json_patch::patch(&mut doc, &patch.0)
        .map_err(|e| AppError::validation(DOCUMENT_KEY, e.to_string()))?;

    if let Value::Object(members) = &doc {
        if let Some(unknown) = members.keys().find(|key| !known.contains(key)) {
            return Err(AppError::validation(
                DOCUMENT_KEY,
                format!("The target location specified by path segment '{unknown}' was not found."),
            ));
        }
    }

    serde_json::from_value(doc).map_err(|e| AppError::validation(DOCUMENT_KEY, e.to_string()))
}

pub async fn list_courses_for_author(
    State(state): State<AppState>,
    Path(author_id): Path<Uuid>,
) -> Result<Json<Vec<CourseDto>>, AppError> {
    let mut conn = state.db.acquire().await?;
    ensure_author_exists(&mut conn, author_id).await?;

    let courses = repository::fetch_courses(&mut conn, author_id).await?;
    Ok(Json(courses.iter().map(CourseDto::from).collect()))
}

pub async fn get_course_for_author(
    State(state): State<AppState>,
    Path((author_id, course_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CourseDto>, AppError> {
    let mut conn = state.db.acquire().await?;
    ensure_author_exists(&mut conn, author_id).await?;

    let course = repository::find_course(&mut conn, author_id, course_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(CourseDto::from(&course)))
}

pub async fn create_course_for_author(
    State(state): State<AppState>,
    Path(author_id): Path<Uuid>,
    links: Links,
    ValidatedJson(req): ValidatedJson<CourseForCreationDto>,
) -> Result<Response, AppError> {
    let mut tx = state.db.begin().await?;
    ensure_author_exists(&mut tx, author_id).await?;

    let course = Course::from_creation(req, author_id);
    repository::insert_course(&mut tx, &course).await?;
    tx.commit().await?;

    info!("created course {} for author {}", course.id, author_id);
    Ok(created(&links, &course))
}

/// Full replace; creates the course under the route id when it does not exist.
pub async fn update_course_for_author(
    State(state): State<AppState>,
    Path((author_id, course_id)): Path<(Uuid, Uuid)>,
    links: Links,
    ValidatedJson(req): ValidatedJson<CourseForUpdateDto>,
) -> Result<Response, AppError> {
    let mut tx = state.db.begin().await?;
    ensure_author_exists(&mut tx, author_id).await?;

    let Some(mut course) = repository::find_course(&mut tx, author_id, course_id).await? else {
        let course = Course::from_update(req, course_id, author_id);
        repository::insert_course(&mut tx, &course).await?;
        tx.commit().await?;

        info!("upserted course {} for author {}", course_id, author_id);
        return Ok(created(&links, &course));
    };

    course.merge(req);
    repository::update_course(&mut tx, &course).await?;
    tx.commit().await?;

    info!("replaced course {} for author {}", course_id, author_id);
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// JSON Patch; creates the course from an empty document when it does not exist.
pub async fn partially_update_course_for_author(
    State(state): State<AppState>,
    Path((author_id, course_id)): Path<(Uuid, Uuid)>,
    links: Links,
    Json(patch): Json<Patch>,
) -> Result<Response, AppError> {
    let mut tx = state.db.begin().await?;
    ensure_author_exists(&mut tx, author_id).await?;

    let Some(mut course) = repository::find_course(&mut tx, author_id, course_id).await? else {
        let dto = apply_patch(&CourseForUpdateDto::default(), &patch)?;
        dto.validate()?;

        let course = Course::from_update(dto, course_id, author_id);
        repository::insert_course(&mut tx, &course).await?;
        tx.commit().await?;

        info!("upserted course {} for author {} from patch", course_id, author_id);
        return Ok(created(&links, &course));
    };

    let dto = apply_patch(&CourseForUpdateDto::from(&course), &patch)?;
    dto.validate()?;

    course.merge(dto);
    repository::update_course(&mut tx, &course).await?;
    tx.commit().await?;

    info!("patched course {} for author {}", course_id, author_id);
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn delete_course_for_author(
    State(state): State<AppState>,
    Path((author_id, course_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let mut tx = state.db.begin().await?;
    ensure_author_exists(&mut tx, author_id).await?;

    if !repository::delete_course(&mut tx, author_id, course_id).await? {
        return Err(AppError::NotFound);
    }
    tx.commit().await?;

    info!("deleted course {} for author {}", course_id, author_id);
    Ok(StatusCode::NO_CONTENT)
}
