//! Members repository for database operations

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{CreateMember, ListQuery, Member},
};

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Postgres>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Member> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Paginated member list, newest first, with case-insensitive substring
    /// search over name/email.
    pub async fn search(&self, query: &ListQuery) -> AppResult<(Vec<Member>, i64)> {
        let pattern = query.search.as_ref().map(|s| format!("%{}%", s));

        let total: i64 = if let Some(ref pattern) = pattern {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM members WHERE name ILIKE $1 OR email ILIKE $1",
            )
            .bind(pattern)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT COUNT(*) FROM members")
                .fetch_one(&self.pool)
                .await?
        };

        let members = if let Some(ref pattern) = pattern {
            sqlx::query_as::<_, Member>(
                r#"
                SELECT * FROM members
                WHERE name ILIKE $1 OR email ILIKE $1
                ORDER BY created_at DESC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(pattern)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Member>(
                "SELECT * FROM members ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            )
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?
        };

        Ok((members, total))
    }

    /// Create a new member with zero debt
    pub async fn create(&self, member: &CreateMember) -> AppResult<Member> {
        let created = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (name, email, address, outstanding_debt)
            VALUES ($1, $2, $3, 0)
            RETURNING *
            "#,
        )
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.address)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update an existing member (debt is untouched; it moves only through
    /// the ledger and the pay/clear operations)
    pub async fn update(&self, id: i32, member: &CreateMember) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(
            r#"
            UPDATE members
            SET name = $2, email = $3, address = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.address)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Delete a member
    pub async fn delete(&self, id: i32) -> AppResult<Member> {
        sqlx::query_as::<_, Member>("DELETE FROM members WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Set the member's outstanding debt to an absolute value
    pub async fn set_debt(&self, id: i32, debt: Decimal) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(
            r#"
            UPDATE members
            SET outstanding_debt = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(debt)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Count all members
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count members created since the given instant
    pub async fn count_created_since(&self, since: DateTime<Utc>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE created_at >= $1")
            .bind(since)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
