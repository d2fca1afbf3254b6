//! Books repository for PostgreSQL.
//!
//! Lookup filters come from the parsed listing query, so every column name
//! is one of [`BookField::column`]; values are always bound.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};

use super::BookStore;
use crate::{
    error::AppResult,
    models::{
        book::{Book, NewBook},
        listing::{BookField, BookFilter, FilterOperand, FilterValue, Lookup, OrderBy, Slice},
    },
};

const BOOK_COLUMNS: &str = "id, title, author, description, picture, date_published, \
                            checked_out, date_checked_out";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn count(&self, filters: &[BookFilter]) -> AppResult<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM books");
        push_filters(&mut builder, filters);

        let total: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn list(
        &self,
        filters: &[BookFilter],
        order_by: OrderBy,
        slice: Option<Slice>,
    ) -> AppResult<Vec<Book>> {
        let mut builder = select_books(filters, order_by, slice);
        let books = builder
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE id = $1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (title, author, description, picture, date_published,
                               checked_out, date_checked_out)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(&book.picture)
        .bind(book.date_published)
        .bind(book.checked_out)
        .bind(book.date_checked_out)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Created book id={} ({})", created.id, created);
        Ok(created)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Build the SELECT for one listing: filters, ordering and optional slice
fn select_books(
    filters: &[BookFilter],
    order_by: OrderBy,
    slice: Option<Slice>,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM books", BOOK_COLUMNS));
    push_filters(&mut builder, filters);

    builder
        .push(" ORDER BY ")
        .push(order_by.field.column())
        .push(if order_by.descending { " DESC" } else { " ASC" });
    if order_by.field != BookField::Id {
        builder.push(", id ASC");
    }

    if let Some(slice) = slice {
        builder.push(" LIMIT ").push_bind(slice.limit);
        builder.push(" OFFSET ").push_bind(slice.offset);
    }
    builder
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &[BookFilter]) {
    for (i, filter) in filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        push_filter(builder, filter);
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &BookFilter) {
    let column = filter.field.column();

    match &filter.operand {
        FilterOperand::IsNull(true) => {
            builder.push(column).push(" IS NULL");
        }
        FilterOperand::IsNull(false) => {
            builder.push(column).push(" IS NOT NULL");
        }
        FilterOperand::List(values) if values.is_empty() => {
            builder.push("FALSE");
        }
        FilterOperand::List(values) => {
            builder.push(column).push(" IN (");
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    builder.push(", ");
                }
                push_value(builder, value);
            }
            builder.push(")");
        }
        FilterOperand::Value(value) => match filter.lookup {
            Lookup::IExact => {
                builder.push("UPPER(").push(column).push(") = UPPER(");
                push_value(builder, value);
                builder.push(")");
            }
            Lookup::Contains | Lookup::StartsWith | Lookup::EndsWith => {
                builder.push(column).push(" LIKE ");
                push_pattern(builder, filter.lookup, value);
            }
            Lookup::IContains | Lookup::IStartsWith | Lookup::IEndsWith => {
                builder.push(column).push(" ILIKE ");
                push_pattern(builder, filter.lookup, value);
            }
            lookup => {
                builder.push(column).push(comparison(lookup));
                push_value(builder, value);
            }
        },
    }
}

fn comparison(lookup: Lookup) -> &'static str {
    match lookup {
        Lookup::Gt => " > ",
        Lookup::Gte => " >= ",
        Lookup::Lt => " < ",
        Lookup::Lte => " <= ",
        _ => " = ",
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: &FilterValue) {
    match value {
        FilterValue::Integer(v) => builder.push_bind(*v),
        FilterValue::Text(v) => builder.push_bind(v.clone()),
        FilterValue::Date(v) => builder.push_bind(*v),
        FilterValue::Boolean(v) => builder.push_bind(*v),
    };
}

fn push_pattern(builder: &mut QueryBuilder<'_, Postgres>, lookup: Lookup, value: &FilterValue) {
    let term = match value {
        FilterValue::Text(text) => escape_like(text),
        other => {
            push_value(builder, other);
            return;
        }
    };
    let pattern = match lookup {
        Lookup::StartsWith | Lookup::IStartsWith => format!("{}%", term),
        Lookup::EndsWith | Lookup::IEndsWith => format!("%{}", term),
        _ => format!("%{}%", term),
    };
    builder.push_bind(pattern);
}

/// Escape LIKE wildcards so the term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
