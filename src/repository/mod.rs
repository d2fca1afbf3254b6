//! Repository layer for database operations

pub mod books;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        book::{Book, NewBook},
        listing::{BookFilter, OrderBy, Slice},
    },
};

/// Relational store of book records.
///
/// Filters are conjunctive. `list` with no slice returns every match.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Count records matching all filters
    async fn count(&self, filters: &[BookFilter]) -> AppResult<i64>;

    /// Fetch matching records in the given order, ties broken by ascending id
    async fn list(
        &self,
        filters: &[BookFilter],
        order_by: OrderBy,
        slice: Option<Slice>,
    ) -> AppResult<Vec<Book>>;

    async fn get_by_id(&self, id: i64) -> AppResult<Option<Book>>;

    /// Insert a record, returning it with its assigned identifier
    async fn create(&self, book: &NewBook) -> AppResult<Book>;

    /// Check that the store answers
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding the stores
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self::with_books(Arc::new(books::BooksRepository::new(pool)))
    }

    /// Create a repository over an arbitrary book store
    pub fn with_books(books: Arc<dyn BookStore>) -> Self {
        Self { books }
    }
}
