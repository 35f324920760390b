use axum::{
    body::Body,
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::error;

use crate::error::ProblemDetails;

/// Stamps the request path into the `instance` of any problem response.
pub async fn stamp_instance(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let mut response = next.run(req).await;

    let Some(mut problem) = response.extensions_mut().remove::<ProblemDetails>() else {
        return response;
    };
    problem.instance = Some(path);

    match serde_json::to_vec(&problem) {
        Ok(bytes) => {
            let (mut parts, _) = response.into_parts();
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            error!("failed to serialize problem details: {}", e);
            response
        }
    }
}
