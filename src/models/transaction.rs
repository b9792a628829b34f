//! Ledger transaction model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{Book, Member};

/// Kind of ledger entry.
///
/// An ISSUE records one copy going out on loan; a RETURN is the closing
/// event for exactly one ISSUE, linked via `related_transaction_id`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "transaction_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Issue,
    Return,
}

/// Transaction row from database.
///
/// An ISSUE is open while no RETURN references it; the closing RETURN is
/// found by reverse lookup on `related_transaction_id`, never stored on
/// the ISSUE itself.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub book_id: i32,
    pub member_id: i32,
    pub issue_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    #[schema(value_type = Option<f64>)]
    pub rent_fee: Option<Decimal>,
    pub add_to_debt: bool,
    pub related_transaction_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_issue(&self) -> bool {
        self.kind == TransactionType::Issue
    }
}

/// Transaction with book and member joined for display.
///
/// `returned_by` is the back-reference from an ISSUE to the RETURN that
/// closed it, if any.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub book: Book,
    pub member: Member,
    pub returned_by: Option<i32>,
}

/// Issue-book request payload
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub book_id: i32,
    pub member_id: i32,
    pub issue_date: DateTime<Utc>,
}

/// Return-book request payload
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub return_date: DateTime<Utc>,
    #[schema(value_type = f64)]
    pub rent_fee: Decimal,
    #[serde(default)]
    pub add_to_debt: bool,
}

/// Fields for a transaction row to be inserted by the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionType,
    pub book_id: i32,
    pub member_id: i32,
    pub issue_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub rent_fee: Option<Decimal>,
    pub add_to_debt: bool,
    pub related_transaction_id: Option<i32>,
}
