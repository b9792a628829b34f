//! Member model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Member model from database.
///
/// `outstanding_debt` accumulates unpaid rent fees. Only the loan ledger
/// (returns flagged `add_to_debt`) and the pay/clear debt operations may
/// move it, and it never goes negative.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    #[schema(value_type = f64)]
    pub outstanding_debt: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update member payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMember {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    pub address: Option<String>,
}
