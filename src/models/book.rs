//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book model from database.
///
/// `quantity` is the number of physical copies currently available for
/// issue, not the total owned; the loan ledger is the only writer that
/// moves it in response to loan events.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub quantity: i32,
    pub publisher: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update book payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "isbn must not be empty"))]
    pub isbn: String,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i32,
    pub publisher: Option<String>,
    pub image_url: Option<String>,
}
