pub mod author_collections;
pub mod authors;
pub mod courses;
pub mod extract;
pub mod problem;

use axum::{Router, extract::State, http::StatusCode, middleware, routing::get, routing::post};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/authors",
            get(authors::list_authors)
                .post(authors::create_author)
                .options(authors::authors_options),
        )
        .route(
            "/api/authors/{author_id}",
            get(authors::get_author).delete(authors::delete_author),
        )
        .route(
            "/api/authorcollections",
            post(author_collections::create_author_collection),
        )
        .route(
            "/api/authorcollections/{ids}",
            get(author_collections::get_author_collection),
        )
        .route(
            "/api/authors/{author_id}/courses",
            get(courses::list_courses_for_author).post(courses::create_course_for_author),
        )
        .route(
            "/api/authors/{author_id}/courses/{course_id}",
            get(courses::get_course_for_author)
                .put(courses::update_course_for_author)
                .patch(courses::partially_update_course_for_author)
                .delete(courses::delete_course_for_author),
        )
        .layer(middleware::from_fn(problem::stamp_instance))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}
