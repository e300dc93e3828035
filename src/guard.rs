//! Failure guard: the outermost backstop.
//!
//! Anything that was not classified by the repository (a body that is not the
//! expected JSON, a panic inside a handler) ends up here and is answered with
//! a 500 `{"Unknown error": ...}` instead of tearing down the connection.

use std::any::Any;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::error;

use crate::error::ApiError;

/// JSON request body.
///
/// Parsed regardless of `Content-Type`; every read or parse failure is
/// reported as [`ApiError::Unclassified`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::unclassified(rejection.body_text()))?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|err| ApiError::unclassified(err.to_string()))
    }
}

/// Layer turning handler panics into `{"Unknown error": <panic message>}`.
pub fn catch_panic_layer() -> CatchPanicLayer<fn(Box<dyn Any + Send + 'static>) -> Response> {
    CatchPanicLayer::custom(panic_response as fn(Box<dyn Any + Send + 'static>) -> Response)
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    };

    error!(panic = %message, "Request handler panicked");
    ApiError::unclassified(message).into_response()
}
