//! Ledger transaction endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{
        transaction::{IssueRequest, ReturnRequest},
        ListQuery, Paginated, TransactionDetails,
    },
};

/// Loan and return counts for one reporting bucket
#[derive(Serialize, ToSchema)]
pub struct MonthlyData {
    /// Bucket label, the month abbreviation of its start date
    pub name: String,
    /// ISSUE entries created in the bucket
    pub loans: i64,
    /// RETURN entries created in the bucket
    pub returns: i64,
}

#[derive(Deserialize, IntoParams)]
pub struct RecentParams {
    /// Number of transactions to return (default: 5)
    pub limit: Option<i64>,
}

/// List transactions with search and pagination
#[utoipa::path(
    get,
    path = "/transactions",
    tag = "transactions",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated list of transactions", body = Paginated<TransactionDetails>)
    )
)]
pub async fn list_transactions(
    State(state): State<crate::AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Paginated<TransactionDetails>>> {
    let (items, total) = state.services.reports.search_transactions(&query).await?;
    Ok(Json(Paginated::new(items, total, query.page(), query.limit())))
}

/// Issue a book to a member
#[utoipa::path(
    post,
    path = "/transactions",
    tag = "transactions",
    request_body = IssueRequest,
    responses(
        (status = 201, description = "Loan recorded", body = TransactionDetails),
        (status = 400, description = "Book out of stock or member at loan limit"),
        (status = 404, description = "Book or member not found"),
        (status = 409, description = "Concurrent update, retry")
    )
)]
pub async fn issue_book(
    State(state): State<crate::AppState>,
    Json(request): Json<IssueRequest>,
) -> AppResult<(StatusCode, Json<TransactionDetails>)> {
    let details = state.services.ledger.issue_book(request).await?;
    Ok((StatusCode::CREATED, Json(details)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/transactions/{id}/return",
    tag = "transactions",
    params(("id" = i32, Path, description = "ISSUE transaction ID")),
    request_body = ReturnRequest,
    responses(
        (status = 201, description = "Return recorded", body = TransactionDetails),
        (status = 400, description = "Not an open loan or invalid fee"),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Concurrent update, retry")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(request): Json<ReturnRequest>,
) -> AppResult<(StatusCode, Json<TransactionDetails>)> {
    let details = state.services.ledger.return_book(id, request).await?;
    Ok((StatusCode::CREATED, Json(details)))
}

/// Loan and return counts per 30-day bucket for the current year
#[utoipa::path(
    get,
    path = "/transactions/monthly-data",
    tag = "transactions",
    responses(
        (status = 200, description = "Twelve reporting buckets", body = Vec<MonthlyData>)
    )
)]
pub async fn monthly_data(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<MonthlyData>>> {
    let data = state.services.reports.monthly_data().await?;
    Ok(Json(data))
}

/// Most recent transactions
#[utoipa::path(
    get,
    path = "/transactions/recent",
    tag = "transactions",
    params(RecentParams),
    responses(
        (status = 200, description = "Recent transactions", body = Vec<TransactionDetails>)
    )
)]
pub async fn recent_transactions(
    State(state): State<crate::AppState>,
    Query(params): Query<RecentParams>,
) -> AppResult<Json<Vec<TransactionDetails>>> {
    let recent = state
        .services
        .reports
        .recent_transactions(params.limit.unwrap_or(5))
        .await?;
    Ok(Json(recent))
}

/// Delete a transaction and roll back its side effects
#[utoipa::path(
    delete,
    path = "/transactions/{id}",
    tag = "transactions",
    params(("id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Deleted transaction", body = TransactionDetails),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Rollback would violate an invariant")
    )
)]
pub async fn delete_transaction(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<TransactionDetails>> {
    let deleted = state.services.ledger.delete_transaction(id).await?;
    Ok(Json(deleted))
}
