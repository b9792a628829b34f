//! Business logic services

pub mod books;
pub mod ledger;
pub mod lookup;
pub mod members;
pub mod reports;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::Repository, store::LedgerStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub members: members::MembersService,
    pub ledger: ledger::LoanLedger,
    pub reports: reports::ReportsService,
    pub lookup: lookup::LookupService,
}

impl Services {
    /// Create all services with the given repository and ledger store
    pub fn new(
        repository: Repository,
        store: Arc<dyn LedgerStore>,
        config: &AppConfig,
    ) -> AppResult<Self> {
        Ok(Self {
            books: books::BooksService::new(repository.clone()),
            members: members::MembersService::new(repository.clone()),
            ledger: ledger::LoanLedger::new(store, config.loans.max_open_loans),
            reports: reports::ReportsService::new(repository),
            lookup: lookup::LookupService::new(&config.lookup)?,
        })
    }
}
