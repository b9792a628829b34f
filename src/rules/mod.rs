//! Pure business rules used by the loan ledger.
//!
//! These functions never perform I/O; the ledger service applies their
//! results through the store as atomic batches.

pub mod debt;
pub mod inventory;
