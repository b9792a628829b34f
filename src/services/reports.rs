//! Read-only aggregate reports over the ledger

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

use crate::{
    api::{books::Overview, transactions::MonthlyData},
    error::AppResult,
    models::{ListQuery, TransactionDetails},
    repository::Repository,
};

/// A reporting bucket: 12 fixed 30-day windows starting Jan 1.
struct Bucket {
    name: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// The 12 fixed 30-day buckets for the year containing `now`.
fn year_buckets(now: DateTime<Utc>) -> Vec<Bucket> {
    let start_of_year = Utc
        .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(now);

    (0..12)
        .map(|i| {
            let start = start_of_year + Duration::days(30 * i);
            Bucket {
                name: start.format("%b").to_string(),
                start,
                end: start_of_year + Duration::days(30 * (i + 1) - 1),
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
}

impl ReportsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Dashboard overview: entity totals, 30-day growth, active loans and
    /// their week-over-week change.
    pub async fn overview(&self) -> AppResult<Overview> {
        let now = Utc::now();
        let last_month = now - Duration::days(30);
        let last_week = now - Duration::days(7);

        let total_books = self.repository.books.count().await?;
        let total_members = self.repository.members.count().await?;
        let new_books = self.repository.books.count_created_since(last_month).await?;
        let new_members = self
            .repository
            .members
            .count_created_since(last_month)
            .await?;
        let active_loans = self.repository.transactions.open_issue_count().await?;
        let last_week_loans = self
            .repository
            .transactions
            .open_issue_count_since(last_week)
            .await?;

        // Guard the percentage against an empty ledger.
        let loan_increase = if active_loans > 0 {
            (last_week_loans - active_loans) as f64 / active_loans as f64 * 100.0
        } else {
            0.0
        };

        Ok(Overview {
            total_books,
            total_members,
            new_books,
            new_members,
            active_loans,
            loan_increase,
        })
    }

    /// ISSUE/RETURN counts per 30-day bucket for the current year
    pub async fn monthly_data(&self) -> AppResult<Vec<MonthlyData>> {
        let mut data = Vec::with_capacity(12);
        for bucket in year_buckets(Utc::now()) {
            let (loans, returns) = self
                .repository
                .transactions
                .counts_in_range(bucket.start, bucket.end)
                .await?;
            data.push(MonthlyData {
                name: bucket.name,
                loans,
                returns,
            });
        }
        Ok(data)
    }

    /// Most recent transactions with book/member joined
    pub async fn recent_transactions(&self, limit: i64) -> AppResult<Vec<TransactionDetails>> {
        self.repository.transactions.recent(limit).await
    }

    /// Search the transaction ledger with pagination
    pub async fn search_transactions(
        &self,
        query: &ListQuery,
    ) -> AppResult<(Vec<TransactionDetails>, i64)> {
        self.repository.transactions.search(query).await
    }
}
