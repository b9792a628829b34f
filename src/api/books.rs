//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{Book, CreateBook, ListQuery, Paginated, RemoteBook},
};

/// Dashboard overview figures
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    /// Total number of books in the catalog
    pub total_books: i64,
    /// Total number of registered members
    pub total_members: i64,
    /// Books added in the last 30 days
    pub new_books: i64,
    /// Members registered in the last 30 days
    pub new_members: i64,
    /// Currently open loans
    pub active_loans: i64,
    /// Week-over-week change in open loans, in percent
    pub loan_increase: f64,
}

/// Query parameters for the remote catalog search
#[derive(Deserialize, IntoParams)]
pub struct LookupQuery {
    pub title: Option<String>,
    pub authors: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    /// Remote page number (default: 1)
    pub page: Option<i64>,
}

/// Outcome of a batch import
#[derive(Serialize, ToSchema)]
pub struct ImportSummary {
    /// Number of books actually created
    pub imported: usize,
    /// Number of books in the request
    pub total: usize,
}

/// List books with search and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated list of books", body = Paginated<Book>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Paginated<Book>>> {
    let (items, total) = state.services.books.search(&query).await?;
    Ok(Json(Paginated::new(items, total, query.page(), query.limit())))
}

/// Dashboard overview
#[utoipa::path(
    get,
    path = "/books/overview",
    tag = "books",
    responses(
        (status = 200, description = "Overview figures", body = Overview)
    )
)]
pub async fn get_overview(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Overview>> {
    let overview = state.services.reports.overview().await?;
    Ok(Json(overview))
}

/// Search the remote Frappe catalog
#[utoipa::path(
    get,
    path = "/books/search/frappe",
    tag = "books",
    params(LookupQuery),
    responses(
        (status = 200, description = "Remote search results", body = Vec<RemoteBook>),
        (status = 400, description = "Remote lookup failed")
    )
)]
pub async fn search_frappe(
    State(state): State<crate::AppState>,
    Query(query): Query<LookupQuery>,
) -> AppResult<Json<Vec<RemoteBook>>> {
    let books = state
        .services
        .lookup
        .search(
            query.title.as_deref(),
            query.authors.as_deref(),
            query.isbn.as_deref(),
            query.publisher.as_deref(),
            query.page.unwrap_or(1),
        )
        .await?;
    Ok(Json(books))
}

/// Import a batch of books, skipping rows that fail
#[utoipa::path(
    post,
    path = "/books/import-multiple",
    tag = "books",
    request_body = Vec<CreateBook>,
    responses(
        (status = 201, description = "Import summary", body = ImportSummary)
    )
)]
pub async fn import_multiple(
    State(state): State<crate::AppState>,
    Json(books): Json<Vec<CreateBook>>,
) -> AppResult<(StatusCode, Json<ImportSummary>)> {
    let (imported, total) = state.services.books.import_many(books).await?;
    Ok((StatusCode::CREATED, Json(ImportSummary { imported, total })))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    book.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = state.services.books.create(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get(id).await?;
    Ok(Json(book))
}

/// Update an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = CreateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(book): Json<CreateBook>,
) -> AppResult<Json<Book>> {
    book.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = state.services.books.update(id, book).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let deleted = state.services.books.delete(id).await?;
    Ok(Json(deleted))
}
