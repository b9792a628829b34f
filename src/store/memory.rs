//! In-memory ledger store used as a test double

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::{transaction::NewTransaction, Book, CreateBook, CreateMember, Member, Transaction, TransactionType},
};

use super::{LedgerStore, LedgerWrite};

#[derive(Default)]
struct Inner {
    books: BTreeMap<i32, Book>,
    members: BTreeMap<i32, Member>,
    transactions: BTreeMap<i32, Transaction>,
    next_id: i32,
}

impl Inner {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Ledger store over plain maps. Batches mutate a scratch copy of the
/// state and swap it in only when every write succeeds, mirroring the
/// all-or-nothing contract of the Postgres implementation.
#[derive(Default)]
pub struct MemoryLedgerStore {
    inner: Mutex<Inner>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_book(&self, book: CreateBook) -> Book {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let id = inner.next_id();
        let book = Book {
            id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            quantity: book.quantity,
            publisher: book.publisher,
            image_url: book.image_url,
            created_at: now,
            updated_at: now,
        };
        inner.books.insert(id, book.clone());
        book
    }

    pub fn seed_member(&self, member: CreateMember) -> Member {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let id = inner.next_id();
        let member = Member {
            id,
            name: member.name,
            email: member.email,
            address: member.address,
            outstanding_debt: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        };
        inner.members.insert(id, member.clone());
        member
    }

    pub fn transaction_count(&self) -> usize {
        self.inner.lock().unwrap().transactions.len()
    }
}

fn apply_writes(inner: &mut Inner, writes: Vec<LedgerWrite>) -> AppResult<Option<Transaction>> {
    let mut inserted = None;
    for write in writes {
        match write {
            LedgerWrite::Insert(record) => {
                let now = Utc::now();
                let id = inner.next_id();
                let NewTransaction {
                    kind,
                    book_id,
                    member_id,
                    issue_date,
                    return_date,
                    rent_fee,
                    add_to_debt,
                    related_transaction_id,
                } = record;
                let row = Transaction {
                    id,
                    kind,
                    book_id,
                    member_id,
                    issue_date,
                    return_date,
                    rent_fee,
                    add_to_debt,
                    related_transaction_id,
                    created_at: now,
                    updated_at: now,
                };
                inner.transactions.insert(id, row.clone());
                inserted = Some(row);
            }
            LedgerWrite::AdjustQuantity { book_id, delta } => {
                let book = inner
                    .books
                    .get_mut(&book_id)
                    .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;
                if book.quantity + delta < 0 {
                    return Err(AppError::Conflict(format!(
                        "Quantity update for book {} conflicted",
                        book_id
                    )));
                }
                book.quantity += delta;
                book.updated_at = Utc::now();
            }
            LedgerWrite::AdjustDebt { member_id, delta } => {
                let member = inner.members.get_mut(&member_id).ok_or_else(|| {
                    AppError::NotFound(format!("Member with id {} not found", member_id))
                })?;
                if member.outstanding_debt + delta < Decimal::ZERO {
                    return Err(AppError::Conflict(format!(
                        "Debt update for member {} conflicted",
                        member_id
                    )));
                }
                member.outstanding_debt += delta;
                member.updated_at = Utc::now();
            }
            LedgerWrite::Delete { id } => {
                inner.transactions.remove(&id);
            }
        }
    }
    Ok(inserted)
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn book(&self, id: i32) -> AppResult<Book> {
        self.inner
            .lock()
            .unwrap()
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn member(&self, id: i32) -> AppResult<Member> {
        self.inner
            .lock()
            .unwrap()
            .members
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    async fn transaction(&self, id: i32) -> AppResult<Transaction> {
        self.inner
            .lock()
            .unwrap()
            .transactions
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Transaction with id {} not found", id)))
    }

    async fn return_of(&self, issue_id: i32) -> AppResult<Option<Transaction>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .transactions
            .values()
            .find(|t| t.related_transaction_id == Some(issue_id))
            .cloned())
    }

    async fn open_issue_count(&self, member_id: i32) -> AppResult<i64> {
        let inner = self.inner.lock().unwrap();
        let count = inner
            .transactions
            .values()
            .filter(|t| {
                t.member_id == member_id
                    && t.kind == TransactionType::Issue
                    && !inner
                        .transactions
                        .values()
                        .any(|r| r.related_transaction_id == Some(t.id))
            })
            .count();
        Ok(count as i64)
    }

    async fn commit(&self, writes: Vec<LedgerWrite>) -> AppResult<Option<Transaction>> {
        let mut inner = self.inner.lock().unwrap();
        // Apply against a scratch copy so a failing write leaves no
        // partial effects.
        let mut scratch = Inner {
            books: inner.books.clone(),
            members: inner.members.clone(),
            transactions: inner.transactions.clone(),
            next_id: inner.next_id,
        };
        let inserted = apply_writes(&mut scratch, writes)?;
        *inner = scratch;
        Ok(inserted)
    }
}
