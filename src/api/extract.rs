//! Request extractors whose rejections render as problem details.

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, FieldErrors, collect_validation_errors};
use crate::models::AuthorsResourceParameters;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        let Self(value) = self;
        axum::Json(value).into_response()
    }
}

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

/// JSON body that has passed its `validator` rules.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// JSON array body whose elements have all passed their `validator` rules.
///
/// Errors are keyed by element index, e.g. `[1].lastName`.
pub struct ValidatedJsonArray<T>(pub Vec<T>);

impl<S, T> FromRequest<S> for ValidatedJsonArray<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(items) = Json::<Vec<T>>::from_request(req, state).await?;

        let mut errors = FieldErrors::new();
        for (index, item) in items.iter().enumerate() {
            if let Err(item_errors) = item.validate() {
                collect_validation_errors(&format!("[{index}]"), &item_errors, &mut errors);
            }
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(Self(items))
    }
}

/// Comma separated ids from a single path segment, e.g. `(id1,id2)`.
///
/// Duplicates are dropped, first occurrence wins.
#[derive(Debug, Clone, PartialEq)]
pub struct IdList(pub Vec<Uuid>);

impl<S> FromRequestParts<S> for IdList
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;
        parse_id_list(&raw).map(IdList)
    }
}

pub fn parse_id_list(raw: &str) -> Result<Vec<Uuid>, AppError> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(trimmed);

    let mut ids = Vec::new();
    for part in inner.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = Uuid::parse_str(part)
            .map_err(|_| AppError::bad_request("ids", format!("'{part}' is not a valid id.")))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    if ids.is_empty() {
        return Err(AppError::bad_request("ids", "At least one id is required."));
    }
    Ok(ids)
}

/// Absolute links back into the API, rooted at the request's host.
#[derive(Debug, Clone)]
pub struct Links {
    base: Url,
}

impl<S> FromRequestParts<S> for Links
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| parts.uri.authority().map(|a| a.as_str()))
            .unwrap_or("localhost");
        let scheme = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("http");

        Links::new(&format!("{scheme}://{host}"))
    }
}

impl Links {
    pub fn new(base: &str) -> Result<Self, AppError> {
        let base = Url::parse(base).map_err(|e| AppError::bad_request("host", e.to_string()))?;
        Ok(Self { base })
    }

    fn at(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(path);
        url.set_query(None);
        url
    }

    pub fn author(&self, author_id: Uuid) -> String {
        self.at(&format!("/api/authors/{author_id}")).to_string()
    }

    pub fn author_collection(&self, ids: &[Uuid]) -> String {
        let joined = ids
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.at(&format!("/api/authorcollections/({joined})")).to_string()
    }

    pub fn course_for_author(&self, author_id: Uuid, course_id: Uuid) -> String {
        self.at(&format!("/api/authors/{author_id}/courses/{course_id}"))
            .to_string()
    }

    /// Same author query, pointed at another page.
    pub fn authors_page(&self, params: &AuthorsResourceParameters, page_number: u32) -> String {
        let mut url = self.at("/api/authors");
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("pageNumber", &page_number.to_string())
                .append_pair("pageSize", &params.page_size().to_string());
            if let Some(main_category) = params.main_category() {
                query.append_pair("mainCategory", main_category);
            }
            if let Some(search_query) = params.search_query() {
                query.append_pair("searchQuery", search_query);
            }
        }
        url.to_string()
    }
}
