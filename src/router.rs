//! Router setup for the category service.

use axum::Router;
use axum::http::HeaderName;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::error::ApiError;
use crate::guard::catch_panic_layer;
use crate::handler::{
    AppState, create_category, delete_category, get_category, list_categories, update_category,
};
use crate::openapi::{ApiDoc, openapi_json};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Creates the category service router.
pub fn category_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}/",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/openapi.json", get(openapi_json))
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(catch_panic_layer()),
        )
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}
