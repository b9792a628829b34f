//! Book catalog service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{Book, CreateBook, ListQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books with pagination
    pub async fn search(&self, query: &ListQuery) -> AppResult<(Vec<Book>, i64)> {
        self.repository.books.search(query).await
    }

    /// Get book by ID
    pub async fn get(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a new book
    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        self.repository.books.create(&book).await
    }

    /// Update an existing book
    pub async fn update(&self, id: i32, book: CreateBook) -> AppResult<Book> {
        self.repository.books.update(id, &book).await
    }

    /// Delete a book
    pub async fn delete(&self, id: i32) -> AppResult<Book> {
        self.repository.books.delete(id).await
    }

    /// Import a batch of books, best effort. Returns (imported, total);
    /// rows that fail to insert are skipped rather than aborting the batch.
    pub async fn import_many(&self, books: Vec<CreateBook>) -> AppResult<(usize, usize)> {
        let total = books.len();
        let mut imported = 0;

        for book in books {
            if let Err(e) = book.validate() {
                tracing::warn!("Skipping book '{}' during import: {}", book.title, e);
                continue;
            }
            match self.repository.books.create(&book).await {
                Ok(_) => imported += 1,
                Err(e) => {
                    tracing::warn!("Skipping book '{}' during import: {}", book.title, e);
                }
            }
        }

        Ok((imported, total))
    }
}
