//! API handlers and routing for the bookstore

pub mod books;
pub mod health;
pub mod openapi;
pub mod pages;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::AppState;

/// Book API routes, shared by every API version
fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(books::list_books).options(books::options))
        .route("/book/:id", get(books::get_book).options(books::options))
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes: books plus health checks
    let api_v1 = book_routes()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check));

    let mut app = Router::new()
        .route("/", get(pages::storefront))
        .route("/book/:id", get(pages::details))
        .nest("/api/stable", book_routes())
        .nest("/api/v1", api_v1)
        .with_state(state.clone())
        .merge(openapi::create_openapi_router());

    if let Some(mount) = state.services.media.mount_path() {
        app = app.nest_service(mount, ServeDir::new(&state.config.media.root));
    }

    app.layer(TraceLayer::new_for_http()).layer(cors)
}
