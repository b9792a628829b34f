//! Loan ledger: the state machine tying book inventory, member debt, and
//! the ISSUE/RETURN transaction ledger together.
//!
//! Every operation is one atomic unit of work against the store: the
//! preconditions are checked against a fresh read, the side effects are
//! committed as a single batch, and a failing precondition leaves no
//! partial state behind.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::{
        transaction::{IssueRequest, NewTransaction, ReturnRequest},
        Member, Transaction, TransactionDetails, TransactionType,
    },
    rules::inventory,
    store::{LedgerStore, LedgerWrite},
};

#[derive(Clone)]
pub struct LoanLedger {
    store: Arc<dyn LedgerStore>,
    max_open_loans: i64,
}

impl LoanLedger {
    pub fn new(store: Arc<dyn LedgerStore>, max_open_loans: i64) -> Self {
        Self {
            store,
            max_open_loans,
        }
    }

    /// Issue one copy of a book to a member: creates an open ISSUE entry
    /// and takes one copy off the shelf.
    pub async fn issue_book(&self, request: IssueRequest) -> AppResult<TransactionDetails> {
        let book = self.store.book(request.book_id).await?;
        let member = self.store.member(request.member_id).await?;

        if !inventory::can_issue(&book) {
            return Err(AppError::InvalidOperation("Book is out of stock".to_string()));
        }

        let open = self.store.open_issue_count(member.id).await?;
        if open >= self.max_open_loans {
            return Err(AppError::InvalidOperation(
                "Member has reached maximum number of active loans".to_string(),
            ));
        }

        let record = self
            .store
            .commit(vec![
                LedgerWrite::Insert(NewTransaction {
                    kind: TransactionType::Issue,
                    book_id: book.id,
                    member_id: member.id,
                    issue_date: request.issue_date,
                    return_date: None,
                    rent_fee: None,
                    add_to_debt: false,
                    related_transaction_id: None,
                }),
                LedgerWrite::AdjustQuantity {
                    book_id: book.id,
                    delta: -1,
                },
            ])
            .await?
            .ok_or_else(|| AppError::Internal("Issue batch returned no record".to_string()))?;

        self.details(record).await
    }

    /// Close an open ISSUE with a RETURN entry: puts the copy back on the
    /// shelf and, when requested, charges the rent fee to the member.
    pub async fn return_book(
        &self,
        issue_id: i32,
        request: ReturnRequest,
    ) -> AppResult<TransactionDetails> {
        if request.rent_fee < Decimal::ZERO {
            return Err(AppError::InvalidOperation(
                "Rent fee must not be negative".to_string(),
            ));
        }

        let issue = self.store.transaction(issue_id).await?;
        if !issue.is_issue() {
            return Err(AppError::InvalidOperation(
                "Can only return books from ISSUE transactions".to_string(),
            ));
        }
        if self.store.return_of(issue.id).await?.is_some() {
            return Err(AppError::InvalidOperation("Book already returned".to_string()));
        }

        let mut writes = vec![
            LedgerWrite::Insert(NewTransaction {
                kind: TransactionType::Return,
                book_id: issue.book_id,
                member_id: issue.member_id,
                issue_date: issue.issue_date,
                return_date: Some(request.return_date),
                rent_fee: Some(request.rent_fee),
                add_to_debt: request.add_to_debt,
                related_transaction_id: Some(issue.id),
            }),
            LedgerWrite::AdjustQuantity {
                book_id: issue.book_id,
                delta: 1,
            },
        ];
        if request.add_to_debt && request.rent_fee > Decimal::ZERO {
            writes.push(LedgerWrite::AdjustDebt {
                member_id: issue.member_id,
                delta: request.rent_fee,
            });
        }

        let record = self
            .store
            .commit(writes)
            .await?
            .ok_or_else(|| AppError::Internal("Return batch returned no record".to_string()))?;

        self.details(record).await
    }

    /// Delete a ledger entry, rolling back the book/member side effects it
    /// caused. Returns a snapshot of the deleted entry.
    pub async fn delete_transaction(&self, id: i32) -> AppResult<TransactionDetails> {
        let record = self.store.transaction(id).await?;
        let snapshot = self.details(record.clone()).await?;
        let member = self.store.member(record.member_id).await?;

        let writes = match record.kind {
            TransactionType::Issue => match self.store.return_of(record.id).await? {
                // Closed pair: the issue's decrement and the return's
                // increment cancel, so removing both leaves quantity
                // untouched. The return's debt charge is reversed while
                // enough debt remains.
                Some(closing) => {
                    let mut writes = vec![LedgerWrite::Delete { id: closing.id }];
                    writes.extend(debt_reversal(&closing, &member));
                    writes.push(LedgerWrite::Delete { id: record.id });
                    writes
                }
                // Open loan: the copy goes back on the shelf.
                None => vec![
                    LedgerWrite::Delete { id: record.id },
                    LedgerWrite::AdjustQuantity {
                        book_id: record.book_id,
                        delta: 1,
                    },
                ],
            },
            // Deleting a RETURN reopens its ISSUE: undo the increment and
            // the debt charge, when one was made and enough debt remains.
            TransactionType::Return => {
                let mut writes = vec![LedgerWrite::AdjustQuantity {
                    book_id: record.book_id,
                    delta: -1,
                }];
                writes.extend(debt_reversal(&record, &member));
                writes.push(LedgerWrite::Delete { id: record.id });
                writes
            }
        };

        self.store.commit(writes).await?;
        Ok(snapshot)
    }

    async fn details(&self, record: Transaction) -> AppResult<TransactionDetails> {
        let book = self.store.book(record.book_id).await?;
        let member = self.store.member(record.member_id).await?;
        let returned_by = if record.is_issue() {
            self.store.return_of(record.id).await?.map(|r| r.id)
        } else {
            None
        };
        Ok(TransactionDetails {
            transaction: record,
            book,
            member,
            returned_by,
        })
    }
}

/// Debt write undoing a RETURN's charge, when it made one and the member
/// still carries enough debt. Debt is never driven negative.
fn debt_reversal(closing: &Transaction, member: &Member) -> Option<LedgerWrite> {
    let fee = closing.rent_fee?;
    if !closing.add_to_debt || fee <= Decimal::ZERO || member.outstanding_debt < fee {
        return None;
    }
    Some(LedgerWrite::AdjustDebt {
        member_id: member.id,
        delta: -fee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateBook, CreateMember};
    use crate::store::memory::MemoryLedgerStore;
    use crate::store::MockLedgerStore;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn store_with(quantity: i32) -> (Arc<MemoryLedgerStore>, i32, i32) {
        let store = Arc::new(MemoryLedgerStore::new());
        let book = store.seed_book(CreateBook {
            title: "Too Loud a Solitude".into(),
            author: "Bohumil Hrabal".into(),
            isbn: "9780156904582".into(),
            quantity,
            publisher: None,
            image_url: None,
        });
        let member = store.seed_member(CreateMember {
            name: "Nadia".into(),
            email: "nadia@example.org".into(),
            address: None,
        });
        (store, book.id, member.id)
    }

    fn ledger(store: Arc<MemoryLedgerStore>) -> LoanLedger {
        LoanLedger::new(store, 5)
    }

    fn issue_req(book_id: i32, member_id: i32) -> IssueRequest {
        IssueRequest {
            book_id,
            member_id,
            issue_date: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        }
    }

    fn return_req(fee: Decimal, add_to_debt: bool) -> ReturnRequest {
        ReturnRequest {
            return_date: Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(),
            rent_fee: fee,
            add_to_debt,
        }
    }

    #[tokio::test]
    async fn issue_decrements_quantity_and_opens_loan() {
        let (store, book_id, member_id) = store_with(2);
        let ledger = ledger(store.clone());

        let details = ledger.issue_book(issue_req(book_id, member_id)).await.unwrap();

        assert_eq!(details.transaction.kind, TransactionType::Issue);
        assert_eq!(details.returned_by, None);
        assert_eq!(store.book(book_id).await.unwrap().quantity, 1);
        assert_eq!(store.open_issue_count(member_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn issue_out_of_stock_fails_and_creates_nothing() {
        let (store, book_id, member_id) = store_with(0);
        let ledger = ledger(store.clone());

        let err = ledger.issue_book(issue_req(book_id, member_id)).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidOperation(_)));
        assert_eq!(store.transaction_count(), 0);
    }

    #[tokio::test]
    async fn issue_unknown_book_is_not_found() {
        let (store, _, member_id) = store_with(1);
        let err = ledger(store)
            .issue_book(issue_req(999, member_id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn sixth_open_loan_is_rejected() {
        let (store, book_id, member_id) = store_with(10);
        let ledger = ledger(store.clone());

        for _ in 0..5 {
            ledger.issue_book(issue_req(book_id, member_id)).await.unwrap();
        }
        let err = ledger.issue_book(issue_req(book_id, member_id)).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidOperation(_)));
        assert_eq!(store.open_issue_count(member_id).await.unwrap(), 5);
        assert_eq!(store.book(book_id).await.unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn return_links_back_to_issue_and_restores_quantity() {
        let (store, book_id, member_id) = store_with(1);
        let ledger = ledger(store.clone());

        let issue = ledger.issue_book(issue_req(book_id, member_id)).await.unwrap();
        let ret = ledger
            .return_book(issue.transaction.id, return_req(dec!(5), true))
            .await
            .unwrap();

        assert_eq!(ret.transaction.kind, TransactionType::Return);
        assert_eq!(
            ret.transaction.related_transaction_id,
            Some(issue.transaction.id)
        );
        assert_eq!(store.book(book_id).await.unwrap().quantity, 1);
        assert_eq!(
            store.member(member_id).await.unwrap().outstanding_debt,
            dec!(5)
        );

        // The issue's back-reference now points at the return.
        let reread = store.return_of(issue.transaction.id).await.unwrap().unwrap();
        assert_eq!(reread.id, ret.transaction.id);
        assert_eq!(store.open_issue_count(member_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn return_without_debt_flag_leaves_debt_untouched() {
        let (store, book_id, member_id) = store_with(1);
        let ledger = ledger(store.clone());

        let issue = ledger.issue_book(issue_req(book_id, member_id)).await.unwrap();
        ledger
            .return_book(issue.transaction.id, return_req(dec!(5), false))
            .await
            .unwrap();

        assert_eq!(
            store.member(member_id).await.unwrap().outstanding_debt,
            Decimal::ZERO
        );
    }

    #[tokio::test]
    async fn double_return_fails_and_mutates_nothing() {
        let (store, book_id, member_id) = store_with(1);
        let ledger = ledger(store.clone());

        let issue = ledger.issue_book(issue_req(book_id, member_id)).await.unwrap();
        ledger
            .return_book(issue.transaction.id, return_req(dec!(5), true))
            .await
            .unwrap();
        let err = ledger
            .return_book(issue.transaction.id, return_req(dec!(5), true))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidOperation(_)));
        assert_eq!(store.book(book_id).await.unwrap().quantity, 1);
        assert_eq!(
            store.member(member_id).await.unwrap().outstanding_debt,
            dec!(5)
        );
        assert_eq!(store.transaction_count(), 2);
    }

    #[tokio::test]
    async fn returning_a_return_is_rejected() {
        let (store, book_id, member_id) = store_with(1);
        let ledger = ledger(store.clone());

        let issue = ledger.issue_book(issue_req(book_id, member_id)).await.unwrap();
        let ret = ledger
            .return_book(issue.transaction.id, return_req(dec!(0), false))
            .await
            .unwrap();
        let err = ledger
            .return_book(ret.transaction.id, return_req(dec!(0), false))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn delete_open_issue_restores_stock_and_history() {
        let (store, book_id, member_id) = store_with(1);
        let ledger = ledger(store.clone());

        let issue = ledger.issue_book(issue_req(book_id, member_id)).await.unwrap();
        assert_eq!(store.book(book_id).await.unwrap().quantity, 0);

        ledger.delete_transaction(issue.transaction.id).await.unwrap();

        assert_eq!(store.book(book_id).await.unwrap().quantity, 1);
        assert_eq!(store.transaction_count(), 0);
    }

    #[tokio::test]
    async fn delete_return_reopens_issue_and_reverses_side_effects() {
        let (store, book_id, member_id) = store_with(1);
        let ledger = ledger(store.clone());

        let issue = ledger.issue_book(issue_req(book_id, member_id)).await.unwrap();
        let ret = ledger
            .return_book(issue.transaction.id, return_req(dec!(5), true))
            .await
            .unwrap();

        ledger.delete_transaction(ret.transaction.id).await.unwrap();

        assert_eq!(store.book(book_id).await.unwrap().quantity, 0);
        assert_eq!(
            store.member(member_id).await.unwrap().outstanding_debt,
            Decimal::ZERO
        );
        assert_eq!(store.open_issue_count(member_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_return_keeps_debt_when_already_paid_down() {
        let (store, book_id, member_id) = store_with(1);
        let ledger = ledger(store.clone());

        let issue = ledger.issue_book(issue_req(book_id, member_id)).await.unwrap();
        let ret = ledger
            .return_book(issue.transaction.id, return_req(dec!(5), true))
            .await
            .unwrap();

        // The member paid part of the fee; the remaining debt is below the
        // fee, so the reversal is skipped rather than driving debt negative.
        store
            .commit(vec![LedgerWrite::AdjustDebt {
                member_id,
                delta: dec!(-3),
            }])
            .await
            .unwrap();

        ledger.delete_transaction(ret.transaction.id).await.unwrap();

        assert_eq!(
            store.member(member_id).await.unwrap().outstanding_debt,
            dec!(2)
        );
    }

    #[tokio::test]
    async fn delete_closed_issue_removes_pair_with_no_net_quantity_change() {
        let (store, book_id, member_id) = store_with(1);
        let ledger = ledger(store.clone());

        let issue = ledger.issue_book(issue_req(book_id, member_id)).await.unwrap();
        ledger
            .return_book(issue.transaction.id, return_req(dec!(5), true))
            .await
            .unwrap();

        ledger.delete_transaction(issue.transaction.id).await.unwrap();

        assert_eq!(store.book(book_id).await.unwrap().quantity, 1);
        assert_eq!(
            store.member(member_id).await.unwrap().outstanding_debt,
            Decimal::ZERO
        );
        assert_eq!(store.transaction_count(), 0);
    }

    #[tokio::test]
    async fn issue_then_delete_is_exact_inverse() {
        let (store, book_id, member_id) = store_with(3);
        let ledger = ledger(store.clone());

        let issue = ledger.issue_book(issue_req(book_id, member_id)).await.unwrap();
        ledger.delete_transaction(issue.transaction.id).await.unwrap();

        assert_eq!(store.book(book_id).await.unwrap().quantity, 3);
        assert_eq!(store.transaction_count(), 0);
    }

    #[tokio::test]
    async fn store_errors_propagate_unchanged() {
        let mut mock = MockLedgerStore::new();
        mock.expect_book()
            .returning(|id| Err(AppError::NotFound(format!("Book with id {} not found", id))));

        let ledger = LoanLedger::new(Arc::new(mock), 5);
        let err = ledger.issue_book(issue_req(7, 1)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
