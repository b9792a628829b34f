//! API handlers for the loan-ledger REST endpoints

pub mod books;
pub mod health;
pub mod members;
pub mod openapi;
pub mod transactions;
