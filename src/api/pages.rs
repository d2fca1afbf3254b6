//! Server-rendered page shells hydrated by the frontend script

use axum::{extract::Path, response::Html};

use super::books::parse_book_id;
use crate::error::AppResult;

const STOREFRONT_TEMPLATE: &str = include_str!("../../templates/storefront.html");
const DETAILS_TEMPLATE: &str = include_str!("../../templates/details.html");

/// Storefront page
pub async fn storefront() -> Html<&'static str> {
    Html(STOREFRONT_TEMPLATE)
}

/// Book details page. The ID is not looked up here; the page script
/// fetches the book and handles a missing one.
pub async fn details(Path(id): Path<String>) -> AppResult<Html<String>> {
    let id = parse_book_id(&id)?;
    Ok(Html(render_details(id)))
}

fn render_details(id: i64) -> String {
    DETAILS_TEMPLATE.replace("{{ pk }}", &id.to_string())
}
