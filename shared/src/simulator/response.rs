use lambda_http::{
    http::{header, HeaderValue, StatusCode},
    Body, Error, Response,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::envelope::ApiEnvelope;
use crate::error::{ApiError, INTERNAL_ERROR_MESSAGE};

pub(crate) fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(body)?.into())
        .map_err(Box::new)?)
}

pub(crate) fn error_response(error: ApiError) -> Result<Response<Body>, Error> {
    let status = error.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_response(status, &error.into_envelope::<()>())
}

/// Turn a handler outcome into a 200 success envelope or the matching error response
pub(crate) fn respond<T: Serialize>(
    result: Result<T, ApiError>,
    message: Option<&str>,
) -> Result<Response<Body>, Error> {
    match result {
        Ok(payload) => {
            let envelope = match message {
                Some(message) => ApiEnvelope::success_with_message(message, payload),
                None => ApiEnvelope::success(payload),
            };
            json_response(StatusCode::OK, &envelope)
        }
        Err(error) => error_response(error),
    }
}

/// 500 envelope that cannot itself fail to build
pub(crate) fn internal_error() -> Response<Body> {
    let body = serde_json::json!({"success": false, "message": INTERNAL_ERROR_MESSAGE});
    let mut response = Response::new(Body::from(body.to_string()));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

pub(crate) fn body_text(body: &Body) -> &str {
    match body {
        Body::Text(text) => text,
        Body::Binary(bytes) => std::str::from_utf8(bytes).unwrap_or(""),
        Body::Empty => "",
    }
}

/// Parse a JSON request body. Unreadable bodies are an internal error, as a
/// handler that threw while reading its input would be.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Body) -> Result<T, ApiError> {
    serde_json::from_str(body_text(body)).map_err(|e| {
        tracing::error!("Failed to parse request body: {}", e);
        ApiError::internal()
    })
}
