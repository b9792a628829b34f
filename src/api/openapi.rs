//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, members, transactions};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Loan Ledger API",
        version = "1.0.0",
        description = "Library management REST API with a transaction-ledger loan model",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API root")
    ),
    paths(
        // Health
        health::health_check,
        // Books
        books::list_books,
        books::get_overview,
        books::search_frappe,
        books::import_multiple,
        books::create_book,
        books::get_book,
        books::update_book,
        books::delete_book,
        // Members
        members::list_members,
        members::create_member,
        members::get_member,
        members::update_member,
        members::delete_member,
        members::pay_debt,
        members::clear_debt,
        // Transactions
        transactions::list_transactions,
        transactions::issue_book,
        transactions::return_book,
        transactions::monthly_data,
        transactions::recent_transactions,
        transactions::delete_transaction,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::remote_book::RemoteBook,
            books::Overview,
            books::ImportSummary,
            // Members
            crate::models::member::Member,
            crate::models::member::CreateMember,
            // Transactions
            crate::models::transaction::Transaction,
            crate::models::transaction::TransactionDetails,
            crate::models::transaction::TransactionType,
            crate::models::transaction::IssueRequest,
            crate::models::transaction::ReturnRequest,
            transactions::MonthlyData,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "members", description = "Member management"),
        (name = "transactions", description = "Loan ledger operations")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
