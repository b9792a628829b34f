//! Member management service

use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::{CreateMember, ListQuery, Member},
    repository::Repository,
    rules::debt,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search members with pagination
    pub async fn search(&self, query: &ListQuery) -> AppResult<(Vec<Member>, i64)> {
        self.repository.members.search(query).await
    }

    /// Get member by ID
    pub async fn get(&self, id: i32) -> AppResult<Member> {
        self.repository.members.get_by_id(id).await
    }

    /// Create a new member
    pub async fn create(&self, member: CreateMember) -> AppResult<Member> {
        self.repository.members.create(&member).await
    }

    /// Update an existing member
    pub async fn update(&self, id: i32, member: CreateMember) -> AppResult<Member> {
        self.repository.members.update(id, &member).await
    }

    /// Delete a member. Fails while the member holds an open loan or
    /// carries outstanding debt.
    pub async fn delete(&self, id: i32) -> AppResult<Member> {
        let member = self.repository.members.get_by_id(id).await?;
        let open_loans = self
            .repository
            .transactions
            .open_issue_count_for_member(id)
            .await?;

        if open_loans > 0 || member.outstanding_debt > Decimal::ZERO {
            return Err(AppError::InvalidOperation(
                "Cannot delete member with active loans or outstanding debt".to_string(),
            ));
        }

        self.repository.members.delete(id).await
    }

    /// Pay off part of the member's outstanding debt
    pub async fn pay_debt(&self, id: i32, amount: Decimal) -> AppResult<Member> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Payment amount must be positive".to_string(),
            ));
        }

        let member = self.repository.members.get_by_id(id).await?;
        let updated = debt::apply_payment(member, amount)?;
        self.repository
            .members
            .set_debt(id, updated.outstanding_debt)
            .await
    }

    /// Wipe the member's outstanding debt
    pub async fn clear_debt(&self, id: i32) -> AppResult<Member> {
        let member = self.repository.members.get_by_id(id).await?;
        let cleared = debt::clear(member);
        self.repository
            .members
            .set_debt(id, cleared.outstanding_debt)
            .await
    }
}
