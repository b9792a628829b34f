//! Loan Ledger Server
//!
//! A library management backend built around an append-and-rollback
//! transaction ledger: book loans and returns are linked ledger entries,
//! and inventory and member debt follow from them.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod rules;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
