//! HTTP handlers for the category routes.

use axum::Json;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, CATEGORY_NOT_FOUND, CategoryError, ErrorBody, UnknownErrorBody};
use crate::guard::JsonBody;
use crate::model::{Category, CategoryPayload};
use crate::repository::CategoryRepository;

pub const CATEGORY_CREATED: &str = "Category created.";
pub const CATEGORY_UPDATED: &str = "Category updated.";

/// Shared state for the category handlers.
#[derive(Clone)]
pub struct AppState {
    pub repository: CategoryRepository,
}

impl AppState {
    pub fn new(repository: CategoryRepository) -> Self {
        Self { repository }
    }
}

/// `{"message": ...}`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

/// `{"message": "Category created.", "id": ...}`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedBody {
    pub message: String,
    pub id: Uuid,
}

/// The `{id}` path segment.
///
/// Anything that is not a UUID cannot name a category, so it is answered as
/// not found before the repository is involved.
#[derive(Debug, Clone, Copy)]
pub struct CategoryPath(pub Uuid);

impl<S> FromRequestParts<S> for CategoryPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| CategoryPath(id))
            .map_err(|_| CategoryError::not_found(CATEGORY_NOT_FOUND).into())
    }
}

/// `GET /`
#[utoipa::path(
    get,
    path = "/",
    tag = "Categories",
    responses(
        (status = 200, description = "Every category", body = [Category]),
        (status = 404, description = "No categories exist", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state.repository.list().await?;
    Ok(Json(categories))
}

/// `POST /`
#[utoipa::path(
    post,
    path = "/",
    tag = "Categories",
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Category created", body = CreatedBody),
        (status = 500, description = "Storage failure or malformed body", body = UnknownErrorBody),
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CategoryPayload>,
) -> Result<(StatusCode, Json<CreatedBody>), ApiError> {
    let id = state.repository.create(&payload.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedBody {
            message: CATEGORY_CREATED.to_string(),
            id,
        }),
    ))
}

/// `GET /{id}/`
#[utoipa::path(
    get,
    path = "/{id}/",
    tag = "Categories",
    params(
        ("id" = Uuid, Path, description = "Category id"),
    ),
    responses(
        (status = 200, description = "The category", body = Category),
        (status = 404, description = "Category not found", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    CategoryPath(id): CategoryPath,
) -> Result<Json<Category>, ApiError> {
    let category = state.repository.get(id).await?;
    Ok(Json(category))
}

/// `PUT /{id}/`
#[utoipa::path(
    put,
    path = "/{id}/",
    tag = "Categories",
    params(
        ("id" = Uuid, Path, description = "Category id"),
    ),
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Category updated", body = MessageBody),
        (status = 404, description = "Category not found", body = ErrorBody),
        (status = 500, description = "Storage failure or malformed body", body = UnknownErrorBody),
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    CategoryPath(id): CategoryPath,
    JsonBody(payload): JsonBody<CategoryPayload>,
) -> Result<(StatusCode, Json<MessageBody>), ApiError> {
    state.repository.update(id, &payload.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageBody {
            message: CATEGORY_UPDATED.to_string(),
        }),
    ))
}

/// `DELETE /{id}/`
#[utoipa::path(
    delete,
    path = "/{id}/",
    tag = "Categories",
    params(
        ("id" = Uuid, Path, description = "Category id"),
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    CategoryPath(id): CategoryPath,
) -> Result<StatusCode, ApiError> {
    state.repository.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
