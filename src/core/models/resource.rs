use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An item a user offers for lending. Visible to other users only through
/// group shares; the owner always sees their own gear.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub owner_id: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
