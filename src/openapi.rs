use axum::Json;
use utoipa::OpenApi;

use crate::error::{ErrorBody, UnknownErrorBody};
use crate::handler::{self, CreatedBody, MessageBody};
use crate::model::{Category, CategoryPayload};

#[derive(OpenApi)]
#[openapi(
    info(title = "Category Service", description = "CRUD over the categories table"),
    paths(
        handler::list_categories,
        handler::create_category,
        handler::get_category,
        handler::update_category,
        handler::delete_category,
    ),
    components(schemas(
        Category,
        CategoryPayload,
        CreatedBody,
        MessageBody,
        ErrorBody,
        UnknownErrorBody,
    )),
    tags((name = "Categories", description = "Category CRUD"))
)]
pub struct ApiDoc;

/// `GET /openapi.json`
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_both_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/"));
        assert!(doc.paths.paths.contains_key("/{id}/"));
    }
}
