//! Book endpoints, mounted under both `/api/stable` and `/api/v1`

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookJson,
        listing::{BookListResponse, ListQuery},
    },
    AppState,
};

/// Methods advertised by `OPTIONS` on the book endpoints
pub const ALLOWED_METHODS: &str = "get,options";

/// List books with filters, ordering and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(
        ("all" = Option<String>, Query, description = "Present to disable pagination"),
        ("pageSize" = Option<i64>, Query, description = "Books per page (default: 25)"),
        ("page" = Option<i64>, Query, description = "1-based page number (default: 1)"),
        ("orderBy" = Option<String>, Query, description = "Sort column, '-' prefix descends"),
        ("title__icontains" = Option<String>, Query, description = "Sample lookup filter")
    ),
    responses(
        (status = 200, description = "Page of books", body = BookListResponse),
        (status = 400, description = "Malformed request", body = String,
            content_type = "text/plain")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> AppResult<Json<BookListResponse>> {
    let Query(params) = params.map_err(|e| AppError::MalformedRequest(e.body_text()))?;
    let query = ListQuery::from_params(params, state.config.catalog.default_page_size)?;

    let page = state.services.catalog.list_books(&query).await?;
    Ok(Json(page))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/book/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookJson),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookJson>> {
    let id = parse_book_id(&id)?;
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Capabilities of the book endpoints
pub async fn options() -> impl IntoResponse {
    (StatusCode::OK, [(header::ALLOW, ALLOWED_METHODS)])
}

/// Book IDs in paths are plain digit runs; anything else matches no book
pub fn parse_book_id(raw: &str) -> AppResult<i64> {
    let not_found = || AppError::NotFound(format!("Book {} not found", raw));
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_found());
    }
    raw.parse().map_err(|_| not_found())
}
