//! Postgres implementation of the ledger store

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{transaction::NewTransaction, Book, Member, Transaction},
};

use super::{LedgerStore, LedgerWrite};

#[derive(Clone)]
pub struct PgLedgerStore {
    pool: Pool<Postgres>,
}

impl PgLedgerStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn insert_transaction(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        record: &NewTransaction,
    ) -> AppResult<Transaction> {
        let inserted = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions
                (type, book_id, member_id, issue_date, return_date, rent_fee,
                 add_to_debt, related_transaction_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(record.kind)
        .bind(record.book_id)
        .bind(record.member_id)
        .bind(record.issue_date)
        .bind(record.return_date)
        .bind(record.rent_fee)
        .bind(record.add_to_debt)
        .bind(record.related_transaction_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(inserted)
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn book(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn member(&self, id: i32) -> AppResult<Member> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    async fn transaction(&self, id: i32) -> AppResult<Transaction> {
        sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction with id {} not found", id)))
    }

    async fn return_of(&self, issue_id: i32) -> AppResult<Option<Transaction>> {
        let record = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE related_transaction_id = $1",
        )
        .bind(issue_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn open_issue_count(&self, member_id: i32) -> AppResult<i64> {
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

    async fn commit(&self, writes: Vec<LedgerWrite>) -> AppResult<Option<Transaction>> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = None;

        for write in writes {
            match write {
                LedgerWrite::Insert(record) => {
                    inserted = Some(Self::insert_transaction(&mut tx, &record).await?);
                }
                LedgerWrite::AdjustQuantity { book_id, delta } => {
                    // The guarded conditional UPDATE both serializes
                    // concurrent issues on the book row and keeps quantity
                    // non-negative; zero rows affected aborts the batch.
                    let result = sqlx::query(
                        r#"
                        UPDATE books
                        SET quantity = quantity + $2, updated_at = NOW()
                        WHERE id = $1 AND quantity + $2 >= 0
                        "#,
                    )
                    .bind(book_id)
                    .bind(delta)
                    .execute(&mut *tx)
                    .await?;

                    if result.rows_affected() == 0 {
                        return Err(AppError::Conflict(format!(
                            "Quantity update for book {} conflicted",
                            book_id
                        )));
                    }
                }
                LedgerWrite::AdjustDebt { member_id, delta } => {
                    let result = sqlx::query(
                        r#"
                        UPDATE members
                        SET outstanding_debt = outstanding_debt + $2, updated_at = NOW()
                        WHERE id = $1 AND outstanding_debt + $2 >= 0
                        "#,
                    )
                    .bind(member_id)
                    .bind(delta)
                    .execute(&mut *tx)
                    .await?;

                    if result.rows_affected() == 0 {
                        return Err(AppError::Conflict(format!(
                            "Debt update for member {} conflicted",
                            member_id
                        )));
                    }
                }
                LedgerWrite::Delete { id } => {
                    sqlx::query("DELETE FROM transactions WHERE id = $1")
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
