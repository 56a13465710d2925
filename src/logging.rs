//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{request, response},
    middleware::Next,
    response::Response,
};

/// The number of characters of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body_text) = read_request(request).await;
    log_body("Received request", &format!("{parts:#?}"), &body_text);

    let request = Request::from_parts(parts, Body::from(body_text));
    let response = next.run(request).await;

    let (parts, body_text) = read_response(response).await;
    log_body("Sending response", &format!("{parts:#?}"), &body_text);

    Response::from_parts(parts, Body::from(body_text))
}

async fn read_request(request: Request) -> (request::Parts, String) {
    let (parts, body) = request.into_parts();

    (parts, read_body(body).await)
}

async fn read_response(response: Response) -> (response::Parts, String) {
    let (parts, body) = response.into_parts();

    (parts, read_body(body).await)
}

async fn read_body(body: Body) -> String {
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
        Err(error) => {
            tracing::error!("Could not read body: {error}");
            String::new()
        }
    }
}

fn log_body(prefix: &str, parts: &str, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("{prefix}: {parts}\nbody: {truncated}...");
            tracing::debug!("Full body: {body:?}");
        }
        None => tracing::info!("{prefix}: {parts}\nbody: {body:?}"),
    }
}

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None` if it
/// is short enough to log in full.
fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}
