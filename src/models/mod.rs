//! Data models for the bookstore

pub mod book;
pub mod listing;

// Re-export commonly used types
pub use book::{Book, BookJson, NewBook};
pub use listing::{BookFilter, BookListResponse, ListQuery, OrderBy, PageWindow, Slice};
