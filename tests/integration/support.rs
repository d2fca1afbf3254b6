//! In-memory book store and request helpers for API tests

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use tower::ServiceExt;

use bookstore_server::{
    api::create_router,
    models::{
        book::{Book, NewBook},
        listing::{BookField, BookFilter, FilterOperand, FilterValue, Lookup, OrderBy, Slice},
    },
    repository::{BookStore, Repository},
    AppConfig, AppResult, AppState,
};

/// Book store backed by a vector, with the same filter and ordering
/// semantics as the PostgreSQL repository
#[derive(Default)]
pub struct MemoryBookStore {
    books: Mutex<Vec<Book>>,
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn count(&self, filters: &[BookFilter]) -> AppResult<i64> {
        let books = self.books.lock().unwrap();
        Ok(books.iter().filter(|book| matches_all(book, filters)).count() as i64)
    }

    async fn list(
        &self,
        filters: &[BookFilter],
        order_by: OrderBy,
        slice: Option<Slice>,
    ) -> AppResult<Vec<Book>> {
        let books = self.books.lock().unwrap();
        let mut matching: Vec<Book> = books
            .iter()
            .filter(|book| matches_all(book, filters))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ordering = compare_values(
                &field_value(a, order_by.field),
                &field_value(b, order_by.field),
            );
            let ordering = if order_by.descending {
                ordering.reverse()
            } else {
                ordering
            };
            ordering.then(a.id.cmp(&b.id))
        });

        Ok(match slice {
            Some(slice) => matching
                .into_iter()
                .skip(slice.offset as usize)
                .take(slice.limit as usize)
                .collect(),
            None => matching,
        })
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        let books = self.books.lock().unwrap();
        Ok(books.iter().find(|book| book.id == id).cloned())
    }

    async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let mut books = self.books.lock().unwrap();
        let id = books.iter().map(|book| book.id).max().unwrap_or(0) + 1;
        let created = Book {
            id,
            title: book.title.clone(),
            author: book.author.clone(),
            description: book.description.clone(),
            picture: book.picture.clone(),
            date_published: book.date_published,
            checked_out: book.checked_out,
            date_checked_out: book.date_checked_out,
        };
        books.push(created.clone());
        Ok(created)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

fn matches_all(book: &Book, filters: &[BookFilter]) -> bool {
    filters.iter().all(|filter| matches(book, filter))
}

fn matches(book: &Book, filter: &BookFilter) -> bool {
    let value = field_value(book, filter.field);
    match &filter.operand {
        FilterOperand::IsNull(is_null) => value.is_none() == *is_null,
        FilterOperand::List(items) => value.map_or(false, |value| items.contains(&value)),
        FilterOperand::Value(operand) => match value {
            Some(value) => apply_lookup(filter.lookup, &value, operand),
            None => false,
        },
    }
}

fn apply_lookup(lookup: Lookup, value: &FilterValue, operand: &FilterValue) -> bool {
    if let (FilterValue::Text(text), FilterValue::Text(term)) = (value, operand) {
        let (text_lower, term_lower) = (text.to_lowercase(), term.to_lowercase());
        match lookup {
            Lookup::IExact => return text_lower == term_lower,
            Lookup::Contains => return text.contains(term.as_str()),
            Lookup::IContains => return text_lower.contains(&term_lower),
            Lookup::StartsWith => return text.starts_with(term.as_str()),
            Lookup::IStartsWith => return text_lower.starts_with(&term_lower),
            Lookup::EndsWith => return text.ends_with(term.as_str()),
            Lookup::IEndsWith => return text_lower.ends_with(&term_lower),
            _ => {}
        }
    }

    let ordering = compare_values(&Some(value.clone()), &Some(operand.clone()));
    match lookup {
        Lookup::Gt => ordering == Ordering::Greater,
        Lookup::Gte => ordering != Ordering::Less,
        Lookup::Lt => ordering == Ordering::Less,
        Lookup::Lte => ordering != Ordering::Greater,
        _ => value == operand,
    }
}

fn field_value(book: &Book, field: BookField) -> Option<FilterValue> {
    match field {
        BookField::Id => Some(FilterValue::Integer(book.id)),
        BookField::Title => Some(FilterValue::Text(book.title.clone())),
        BookField::Author => Some(FilterValue::Text(book.author.clone())),
        BookField::Description => Some(FilterValue::Text(book.description.clone())),
        BookField::Picture => Some(FilterValue::Text(book.picture.clone())),
        BookField::DatePublished => Some(FilterValue::Date(book.date_published)),
        BookField::CheckedOut => Some(FilterValue::Boolean(book.checked_out)),
        BookField::DateCheckedOut => book.date_checked_out.map(FilterValue::Date),
    }
}

/// Nulls sort last ascending, as in PostgreSQL
fn compare_values(a: &Option<FilterValue>, b: &Option<FilterValue>) -> Ordering {
    match (a, b) {
        (Some(FilterValue::Integer(a)), Some(FilterValue::Integer(b))) => a.cmp(b),
        (Some(FilterValue::Text(a)), Some(FilterValue::Text(b))) => a.cmp(b),
        (Some(FilterValue::Date(a)), Some(FilterValue::Date(b))) => a.cmp(b),
        (Some(FilterValue::Boolean(a)), Some(FilterValue::Boolean(b))) => a.cmp(b),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Router over a fresh in-memory store
pub struct TestApp {
    pub store: Arc<MemoryBookStore>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryBookStore::default());
        let repository = Repository::with_books(store.clone());
        let router = create_router(AppState::new(AppConfig::default(), repository));
        Self { store, router }
    }

    /// App holding `count` books with ids 1..=count
    pub async fn with_books(count: usize) -> Self {
        let app = Self::new();
        for n in 1..=count {
            app.create(new_book(n)).await;
        }
        app
    }

    pub async fn create(&self, book: NewBook) -> Book {
        self.store.create(&book).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri).await
    }

    pub async fn send(&self, method: Method, uri: &str) -> TestResponse {
        self.send_with_headers(method, uri, &[]).await
    }

    pub async fn send_with_headers(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let request = request.body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }
}

/// Book number `n`: authors alternate, titles sort in reverse id order
pub fn new_book(n: usize) -> NewBook {
    NewBook {
        title: format!("Title {:03}", 1000 - n),
        author: if n % 2 == 0 {
            "Ursula K. Le Guin"
        } else {
            "Frank Herbert"
        }
        .to_string(),
        description: format!("Description of book {}", n),
        picture: format!("covers/{}.jpg", n),
        date_published: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
            + chrono::Duration::days(n as i64),
        checked_out: false,
        date_checked_out: None,
    }
}
