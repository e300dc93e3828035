use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A persisted category.
///
/// `id` is assigned by the store on insert and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Category {
    #[sqlx(rename = "id_category")]
    pub id: Uuid,
    pub name: String,
}

/// Body of create and update requests.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CategoryPayload {
    pub name: String,
}
