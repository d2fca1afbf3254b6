//! Catalog service: book listings and details

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookJson},
        listing::{BookListResponse, ListQuery, PageWindow},
    },
    repository::Repository,
};

use super::media::MediaService;

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    media: MediaService,
}

impl CatalogService {
    pub fn new(repository: Repository, media: MediaService) -> Self {
        Self { repository, media }
    }

    /// One page (or all) of the books matching the query
    pub async fn list_books(&self, query: &ListQuery) -> AppResult<BookListResponse> {
        tracing::debug!(
            "Listing books: all={} page={} page_size={} order_by={} filters={:?}",
            query.all,
            query.page,
            query.page_size,
            query.order_by,
            query.filters
        );

        let store = &self.repository.books;
        let total = store.count(&query.filters).await?;

        let (window, books) = if query.all {
            let books = store.list(&query.filters, query.order_by, None).await?;
            (PageWindow::unpaginated(total), books)
        } else {
            let window = PageWindow::paginate(total, query.page, query.page_size);
            let books = match window.slice {
                Some(slice) => store.list(&query.filters, query.order_by, Some(slice)).await?,
                None => Vec::new(),
            };
            (window, books)
        };

        Ok(BookListResponse {
            data: books.iter().map(|book| self.project(book)).collect(),
            start_index: window.start_index,
            end_index: window.end_index,
            total,
            num_pages: window.num_pages,
        })
    }

    /// Get a book by ID
    pub async fn get_book(&self, id: i64) -> AppResult<BookJson> {
        self.repository
            .books
            .get_by_id(id)
            .await?
            .map(|book| self.project(&book))
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Check the store is reachable
    pub async fn ready(&self) -> AppResult<()> {
        self.repository.books.ping().await
    }

    fn project(&self, book: &Book) -> BookJson {
        book.to_json(self.media.picture_url(&book.picture))
    }
}
