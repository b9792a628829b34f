//! Transactions repository for database operations

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::AppResult,
    models::{Book, ListQuery, Member, Transaction, TransactionDetails},
};

/// Joined select used by every detail query; the LEFT JOIN resolves the
/// ISSUE's closing-RETURN back-reference.
const DETAILS_SELECT: &str = r#"
    SELECT t.id, t.type, t.book_id, t.member_id, t.issue_date, t.return_date,
           t.rent_fee, t.add_to_debt, t.related_transaction_id,
           t.created_at, t.updated_at,
           b.title AS book_title, b.author AS book_author, b.isbn AS book_isbn,
           b.quantity AS book_quantity, b.publisher AS book_publisher,
           b.image_url AS book_image_url, b.created_at AS book_created_at,
           b.updated_at AS book_updated_at,
           m.name AS member_name, m.email AS member_email,
           m.address AS member_address, m.outstanding_debt AS member_debt,
           m.created_at AS member_created_at, m.updated_at AS member_updated_at,
           r.id AS returned_by
    FROM transactions t
    JOIN books b ON t.book_id = b.id
    JOIN members m ON t.member_id = m.id
    LEFT JOIN transactions r ON r.related_transaction_id = t.id
"#;

#[derive(Clone)]
pub struct TransactionsRepository {
    pool: Pool<Postgres>,
}

impl TransactionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn details_from_row(row: &PgRow) -> TransactionDetails {
        TransactionDetails {
            transaction: Transaction {
                id: row.get("id"),
                kind: row.get("type"),
                book_id: row.get("book_id"),
                member_id: row.get("member_id"),
                issue_date: row.get("issue_date"),
                return_date: row.get("return_date"),
                rent_fee: row.get("rent_fee"),
                add_to_debt: row.get("add_to_debt"),
                related_transaction_id: row.get("related_transaction_id"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            },
            book: Book {
                id: row.get("book_id"),
                title: row.get("book_title"),
                author: row.get("book_author"),
                isbn: row.get("book_isbn"),
                quantity: row.get("book_quantity"),
                publisher: row.get("book_publisher"),
                image_url: row.get("book_image_url"),
                created_at: row.get("book_created_at"),
                updated_at: row.get("book_updated_at"),
            },
            member: Member {
                id: row.get("member_id"),
                name: row.get("member_name"),
                email: row.get("member_email"),
                address: row.get("member_address"),
                outstanding_debt: row.get("member_debt"),
                created_at: row.get("member_created_at"),
                updated_at: row.get("member_updated_at"),
            },
            returned_by: row.get("returned_by"),
        }
    }

    /// Paginated transaction list, newest first, with case-insensitive
    /// substring search over the joined book title / member name.
    pub async fn search(&self, query: &ListQuery) -> AppResult<(Vec<TransactionDetails>, i64)> {
        let pattern = query.search.as_ref().map(|s| format!("%{}%", s));

        let total: i64 = if let Some(ref pattern) = pattern {
            sqlx::query_scalar(
                r#"
                SELECT COUNT(*)
                FROM transactions t
                JOIN books b ON t.book_id = b.id
                JOIN members m ON t.member_id = m.id
                WHERE b.title ILIKE $1 OR m.name ILIKE $1
                "#,
            )
            .bind(pattern)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
                .fetch_one(&self.pool)
                .await?
        };

        let rows = if let Some(ref pattern) = pattern {
            let select = format!(
                "{} WHERE b.title ILIKE $1 OR m.name ILIKE $1 ORDER BY t.created_at DESC LIMIT $2 OFFSET $3",
                DETAILS_SELECT
            );
            sqlx::query(&select)
                .bind(pattern)
                .bind(query.limit())
                .bind(query.offset())
                .fetch_all(&self.pool)
                .await?
        } else {
            let select = format!(
                "{} ORDER BY t.created_at DESC LIMIT $1 OFFSET $2",
                DETAILS_SELECT
            );
            sqlx::query(&select)
                .bind(query.limit())
                .bind(query.offset())
                .fetch_all(&self.pool)
                .await?
        };

        let items = rows.iter().map(Self::details_from_row).collect();
        Ok((items, total))
    }

    /// Most recent transactions, newest first
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<TransactionDetails>> {
        let select = format!("{} ORDER BY t.created_at DESC LIMIT $1", DETAILS_SELECT);
        let rows = sqlx::query(&select)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(Self::details_from_row).collect())
    }

    /// ISSUE and RETURN counts created within [start, end]
    pub async fn counts_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<(i64, i64)> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) FILTER (WHERE type = 'ISSUE') AS loans,
                   COUNT(*) FILTER (WHERE type = 'RETURN') AS returns
            FROM transactions
            WHERE created_at >= $1 AND created_at <= $2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok((row.get("loans"), row.get("returns")))
    }

    /// Count of currently open ISSUE transactions ("active loans")
    pub async fn open_issue_count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM transactions t
            WHERE t.type = 'ISSUE'
              AND NOT EXISTS (
                  SELECT 1 FROM transactions r
                  WHERE r.related_transaction_id = t.id
              )
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Count of open ISSUE transactions held by one member
    pub async fn open_issue_count_for_member(&self, member_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM transactions t
            WHERE t.member_id = $1
              AND t.type = 'ISSUE'
              AND NOT EXISTS (
                  SELECT 1 FROM transactions r
                  WHERE r.related_transaction_id = t.id
              )
            "#,
        )
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Count of open ISSUE transactions issued since the given instant
    pub async fn open_issue_count_since(&self, since: DateTime<Utc>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM transactions t
            WHERE t.type = 'ISSUE'
              AND t.issue_date >= $1
              AND NOT EXISTS (
                  SELECT 1 FROM transactions r
                  WHERE r.related_transaction_id = t.id
              )
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
