use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::{debug, info};

use crate::api::extract::{IdList, Json, Links, ValidatedJsonArray};
use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

/// All requested authors or nothing.
pub async fn get_author_collection(
    State(state): State<AppState>,
    IdList(ids): IdList,
) -> Result<Json<Vec<AuthorDto>>, AppError> {
    let mut conn = state.db.acquire().await?;
    let authors = repository::fetch_authors_by_ids(&mut conn, &ids).await?;

    if authors.len() != ids.len() {
        debug!(
            "author collection incomplete: requested {}, found {}",
            ids.len(),
            authors.len()
        );
        return Err(AppError::NotFound);
    }

    Ok(Json(authors.iter().map(AuthorDto::from).collect()))
}

pub async fn create_author_collection(
    State(state): State<AppState>,
    links: Links,
    ValidatedJsonArray(req): ValidatedJsonArray<AuthorForCreationDto>,
) -> Result<impl IntoResponse, AppError> {
    let authors: Vec<Author> = req.into_iter().map(Author::from).collect();

    let mut tx = state.db.begin().await?;
    for author in &authors {
        repository::insert_author(&mut tx, author).await?;
    }
    tx.commit().await?;

    let ids: Vec<_> = authors.iter().map(|a| a.id).collect();
    info!("created author collection of {}", ids.len());

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, links.author_collection(&ids))],
        Json(authors.iter().map(AuthorDto::from).collect::<Vec<_>>()),
    ))
}
