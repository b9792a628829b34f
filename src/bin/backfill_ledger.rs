//! One-off backfill converting flat loan rows to linked ledger entries.
//!
//! Legacy rows recorded a return as an inline `return_date` on the ISSUE
//! itself. This job creates the missing RETURN entry for each such row,
//! linked back via `related_transaction_id`. Safe to re-run: rows that
//! already have a linked RETURN are skipped.

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use loan_ledger_server::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "backfill_ledger=info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.database.url)
        .await?;

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO transactions
            (type, book_id, member_id, issue_date, return_date, rent_fee, related_transaction_id)
        SELECT 'RETURN'::transaction_type,
               t.book_id, t.member_id, t.issue_date, t.return_date, t.rent_fee, t.id
        FROM transactions t
        WHERE t.type = 'ISSUE'
          AND t.return_date IS NOT NULL
          AND NOT EXISTS (
              SELECT 1 FROM transactions r WHERE r.related_transaction_id = t.id
          )
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Backfilled {} return entries", result.rows_affected());

    Ok(())
}
