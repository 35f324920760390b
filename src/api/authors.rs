use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::extract::{Json, Links, Path, Query, ValidatedJson};
use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

pub const PAGINATION_HEADER: &str = "x-pagination";
pub const ALLOWED_METHODS: &str = "GET,OPTIONS,POST";

pub async fn list_authors(
    State(state): State<AppState>,
    links: Links,
    Query(params): Query<AuthorsResourceParameters>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = state.db.acquire().await?;
    let page = repository::fetch_authors(&mut conn, &params).await?;

    let metadata = PaginationMetadata {
        total_count: page.total_count,
        page_size: page.page_size,
        current_page: page.current_page,
        total_pages: page.total_pages,
        previous_page_link: page
            .has_previous()
            .then(|| links.authors_page(&params, page.current_page - 1)),
        next_page_link: page
            .has_next()
            .then(|| links.authors_page(&params, page.current_page + 1)),
    };

    let mut headers = HeaderMap::new();
    match serde_json::to_string(&metadata)
        .ok()
        .and_then(|json| HeaderValue::from_str(&json).ok())
    {
        Some(value) => {
            headers.insert(PAGINATION_HEADER, value);
        }
        None => error!("could not encode pagination header: {:?}", metadata),
    }

    let authors: Vec<AuthorDto> = page.items.iter().map(AuthorDto::from).collect();
    Ok((headers, Json(authors)))
}

pub async fn get_author(
    State(state): State<AppState>,
    Path(author_id): Path<Uuid>,
) -> Result<Json<AuthorDto>, AppError> {
    let mut conn = state.db.acquire().await?;
    let author = repository::find_author(&mut conn, author_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(AuthorDto::from(&author)))
}

pub async fn create_author(
    State(state): State<AppState>,
    links: Links,
    ValidatedJson(req): ValidatedJson<AuthorForCreationDto>,
) -> Result<impl IntoResponse, AppError> {
    let author = Author::from(req);

    let mut tx = state.db.begin().await?;
    repository::insert_author(&mut tx, &author).await?;
    tx.commit().await?;

    info!(
        "created author {} with {} courses",
        author.id,
        author.courses.len()
    );
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, links.author(author.id))],
        Json(AuthorDto::from(&author)),
    ))
}

pub async fn delete_author(
    State(state): State<AppState>,
    Path(author_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut tx = state.db.begin().await?;
    if !repository::delete_author(&mut tx, author_id).await? {
        return Err(AppError::NotFound);
    }
    tx.commit().await?;

    info!("deleted author {}", author_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn authors_options() -> impl IntoResponse {
    (StatusCode::OK, [(header::ALLOW, ALLOWED_METHODS)])
}
