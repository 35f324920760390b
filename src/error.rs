use std::collections::BTreeMap;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use validator::{ValidationErrors, ValidationErrorsKind};

pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// Key used for errors that belong to the whole document rather than a field.
pub const DOCUMENT_KEY: &str = "$";

const VALIDATION_PROBLEM_TYPE: &str = "https://courselibrary.com/modelvalidationproblem";
const ERROR_FIELD_DETAIL: &str = "See the error field for details.";

pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0:?}")]
    BadRequest(FieldErrors),

    #[error("Validation failed: {0:?}")]
    Validation(FieldErrors),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    pub fn bad_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::BadRequest(single_error(field, message))
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(single_error(field, message))
    }
}

fn single_error(field: impl Into<String>, message: impl Into<String>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field.into(), vec![message.into()]);
    errors
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(db.message().to_string())
            }
            _ => AppError::Database(err),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        collect_validation_errors("", &errors, &mut fields);
        AppError::Validation(fields)
    }
}

/// Flattens `errors` into `out`, keyed by the camelCase wire name of each
/// field, e.g. `courses[0].title`.
pub(crate) fn collect_validation_errors(
    prefix: &str,
    errors: &ValidationErrors,
    out: &mut FieldErrors,
) {
    for (field, kind) in errors.errors() {
        let key = match (prefix.is_empty(), *field == "__all__") {
            (true, true) => DOCUMENT_KEY.to_string(),
            (false, true) => prefix.to_string(),
            (true, false) => camel_case(field),
            (false, false) => format!("{prefix}.{}", camel_case(field)),
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                let messages = out.entry(key).or_default();
                for err in list {
                    messages.push(
                        err.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("The field is invalid ({}).", err.code)),
                    );
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_validation_errors(&key, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validation_errors(&format!("{key}[{index}]"), inner, out);
                }
            }
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(DOCUMENT_KEY, rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::bad_request("path", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request("query", rejection.body_text())
    }
}

/// Problem document returned for every failed request.
///
/// The response also carries a copy of this value in its extensions so the
/// `instance` can be filled in once the request path is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: FieldErrors,
}

impl ProblemDetails {
    fn new(status: StatusCode, problem_type: &str, title: &str) -> Self {
        Self {
            problem_type: problem_type.to_string(),
            title: title.to_string(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            errors: FieldErrors::new(),
        }
    }

    fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.detail = Some(ERROR_FIELD_DETAIL.to_string());
        self.errors = errors;
        self
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, Json(self.clone())).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(PROBLEM_CONTENT_TYPE),
        );
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let problem = match self {
            AppError::NotFound => ProblemDetails::new(
                StatusCode::NOT_FOUND,
                "https://tools.ietf.org/html/rfc7231#section-6.5.4",
                "Not Found",
            ),
            AppError::BadRequest(errors) => {
                warn!("rejected input: {:?}", errors);
                ProblemDetails::new(
                    StatusCode::BAD_REQUEST,
                    "https://tools.ietf.org/html/rfc7231#section-6.5.1",
                    "One or more errors on input occured.",
                )
                .with_errors(errors)
            }
            AppError::Validation(errors) => ProblemDetails::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                VALIDATION_PROBLEM_TYPE,
                "One or more validation errors occured.",
            )
            .with_errors(errors),
            AppError::Conflict(msg) => {
                warn!("conflict: {}", msg);
                let mut problem = ProblemDetails::new(
                    StatusCode::CONFLICT,
                    "https://tools.ietf.org/html/rfc7231#section-6.5.8",
                    "Conflict",
                );
                problem.detail = Some("The resource conflicts with an existing one.".to_string());
                problem
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                ProblemDetails::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "https://tools.ietf.org/html/rfc7231#section-6.6.1",
                    "An error occurred while processing your request.",
                )
            }
        };

        problem.into_response()
    }
}
