//! Member management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{CreateMember, ListQuery, Member, Paginated},
};

#[derive(Deserialize, IntoParams)]
pub struct PayDebtParams {
    /// Amount to pay off, must be positive
    #[param(value_type = f64)]
    pub amount: Decimal,
}

/// List members with search and pagination
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated list of members", body = Paginated<Member>)
    )
)]
pub async fn list_members(
    State(state): State<crate::AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Paginated<Member>>> {
    let (items, total) = state.services.members.search(&query).await?;
    Ok(Json(Paginated::new(items, total, query.page(), query.limit())))
}

/// Create a new member
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    request_body = CreateMember,
    responses(
        (status = 201, description = "Member created", body = Member),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_member(
    State(state): State<crate::AppState>,
    Json(member): Json<CreateMember>,
) -> AppResult<(StatusCode, Json<Member>)> {
    member
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = state.services.members.create(member).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get member by ID
#[utoipa::path(
    get,
    path = "/members/{id}",
    tag = "members",
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member details", body = Member),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Member>> {
    let member = state.services.members.get(id).await?;
    Ok(Json(member))
}

/// Update an existing member
#[utoipa::path(
    put,
    path = "/members/{id}",
    tag = "members",
    params(("id" = i32, Path, description = "Member ID")),
    request_body = CreateMember,
    responses(
        (status = 200, description = "Member updated", body = Member),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Member not found")
    )
)]
pub async fn update_member(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(member): Json<CreateMember>,
) -> AppResult<Json<Member>> {
    member
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = state.services.members.update(id, member).await?;
    Ok(Json(updated))
}

/// Delete a member
#[utoipa::path(
    delete,
    path = "/members/{id}",
    tag = "members",
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member deleted", body = Member),
        (status = 400, description = "Member has active loans or outstanding debt"),
        (status = 404, description = "Member not found")
    )
)]
pub async fn delete_member(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Member>> {
    let deleted = state.services.members.delete(id).await?;
    Ok(Json(deleted))
}

/// Pay off part of a member's outstanding debt
#[utoipa::path(
    post,
    path = "/members/{id}/pay-debt",
    tag = "members",
    params(
        ("id" = i32, Path, description = "Member ID"),
        PayDebtParams
    ),
    responses(
        (status = 200, description = "Updated member", body = Member),
        (status = 400, description = "Invalid amount"),
        (status = 404, description = "Member not found")
    )
)]
pub async fn pay_debt(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Query(params): Query<PayDebtParams>,
) -> AppResult<Json<Member>> {
    let member = state.services.members.pay_debt(id, params.amount).await?;
    Ok(Json(member))
}

/// Wipe a member's outstanding debt
#[utoipa::path(
    post,
    path = "/members/{id}/clear-debt",
    tag = "members",
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Updated member", body = Member),
        (status = 404, description = "Member not found")
    )
)]
pub async fn clear_debt(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Member>> {
    let member = state.services.members.clear_debt(id).await?;
    Ok(Json(member))
}
