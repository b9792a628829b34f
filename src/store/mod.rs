//! Ledger store: transactional persistence abstraction for the loan ledger.
//!
//! The loan ledger reads current state through the lookup methods and
//! applies all side effects of one operation through [`LedgerStore::commit`],
//! an all-or-nothing batch. The store is constructed once at startup and
//! injected; the in-memory implementation stands in for Postgres in unit
//! tests.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::{
    error::AppResult,
    models::{transaction::NewTransaction, Book, Member, Transaction},
};

pub use postgres::PgLedgerStore;

/// A single write within an atomic ledger batch.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerWrite {
    /// Insert a new transaction row.
    Insert(NewTransaction),
    /// Adjust a book's available quantity. The store must reject the whole
    /// batch when the result would go negative.
    AdjustQuantity { book_id: i32, delta: i32 },
    /// Adjust a member's outstanding debt. The store must reject the whole
    /// batch when the result would go negative.
    AdjustDebt { member_id: i32, delta: Decimal },
    /// Delete a transaction row.
    Delete { id: i32 },
}

/// Transactional persistence for books, members, and ledger transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Book by id, or `NotFound`.
    async fn book(&self, id: i32) -> AppResult<Book>;

    /// Member by id, or `NotFound`.
    async fn member(&self, id: i32) -> AppResult<Member>;

    /// Transaction by id, or `NotFound`.
    async fn transaction(&self, id: i32) -> AppResult<Transaction>;

    /// The RETURN that closed the given ISSUE, if any.
    async fn return_of(&self, issue_id: i32) -> AppResult<Option<Transaction>>;

    /// Number of open ISSUE transactions held by a member.
    async fn open_issue_count(&self, member_id: i32) -> AppResult<i64>;

    /// Apply a batch of writes as one atomic unit: either every write
    /// applies or none do. Returns the inserted transaction when the batch
    /// contains an [`LedgerWrite::Insert`].
    async fn commit(&self, writes: Vec<LedgerWrite>) -> AppResult<Option<Transaction>>;
}
