//! Data models for the loan-ledger server

pub mod book;
pub mod member;
pub mod remote_book;
pub mod transaction;

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

// Re-export commonly used types
pub use book::{Book, CreateBook};
pub use member::{CreateMember, Member};
pub use remote_book::RemoteBook;
pub use transaction::{Transaction, TransactionDetails, TransactionType};

/// Common query parameters for paginated list endpoints
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Case-insensitive substring search over the entity's designated fields
    pub search: Option<String>,
    /// Page number (1-based)
    pub page: Option<i64>,
    /// Items per page
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).max(1)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Paginated response wrapper
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct Paginated<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Page of items
    pub items: Vec<T>,
    /// Total number of matching items
    pub total: i64,
    /// Current page number (1-based)
    pub page: i64,
    /// Items per page
    pub size: i64,
    /// Total number of pages (0 when there are no items)
    pub pages: i64,
}

impl<T> Paginated<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(items: Vec<T>, total: i64, page: i64, size: i64) -> Self {
        let pages = if size > 0 { (total + size - 1) / size } else { 0 };
        Self {
            items,
            total,
            page,
            size,
            pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, ToSchema)]
    struct Row;

    #[test]
    fn pages_is_ceil_of_total_over_size() {
        let p = Paginated::<Row>::new(vec![], 41, 1, 20);
        assert_eq!(p.pages, 3);
        let p = Paginated::<Row>::new(vec![], 40, 1, 20);
        assert_eq!(p.pages, 2);
        let p = Paginated::<Row>::new(vec![], 1, 1, 20);
        assert_eq!(p.pages, 1);
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let p = Paginated::<Row>::new(vec![], 0, 1, 20);
        assert_eq!(p.pages, 0);
        assert!(p.items.is_empty());
    }

    #[test]
    fn list_query_clamps_page_and_limit() {
        let q = ListQuery {
            search: None,
            page: Some(0),
            limit: Some(-5),
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 1);
        assert_eq!(q.offset(), 0);

        let q = ListQuery {
            search: None,
            page: Some(3),
            limit: Some(10),
        };
        assert_eq!(q.offset(), 20);
    }
}
