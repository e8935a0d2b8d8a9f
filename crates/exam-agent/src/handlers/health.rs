//! Liveness probe.

use crate::error::ApiError;
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

pub async fn healthz_handler(method: Method) -> Response {
    if method != Method::GET {
        return ApiError::MethodNotAllowed.into_response();
    }

    (StatusCode::OK, "OK").into_response()
}
