//! Book catalog API handlers.
//!
//! REST endpoints for the book catalog. Reads are public; creation and
//! updates require an authenticated caller and deletion requires the admin
//! role, enforced at the routing layer.
//!
//! # Examples
//!
//! List books with filters:
//! ```bash
//! curl "http://localhost:3000/books?search=dune&page=1&limit=10&sort_by=published_year&sort_order=asc"
//! ```

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use bookvault::books::{Book, BookListParams, BookPage, BookSort, BookUpdate, NewBook};
use serde::Deserialize;

use super::AppState;
use super::error::ApiError;
use super::middleware::AuthPrincipal;

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
pub struct BookListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub search: Option<String>,
    pub author: Option<String>,
    pub published_year: Option<i32>,
    #[serde(alias = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(alias = "order")]
    pub sort_order: Option<String>,
}

impl From<BookListQuery> for BookListParams {
    fn from(query: BookListQuery) -> Self {
        BookListParams {
            page: query.page,
            limit: query.limit,
            search: query.search,
            author: query.author,
            published_year: query.published_year,
            sort: query
                .sort_by
                .as_deref()
                .map(BookSort::parse)
                .unwrap_or_default(),
            descending: query
                .sort_order
                .as_deref()
                .is_some_and(|o| o.eq_ignore_ascii_case("desc")),
        }
    }
}

/// List one page of the catalog.
///
/// Supports pagination (`page`, `limit`), filtering (`search` across title,
/// author, and ISBN, plus `author` and `published_year`), and sorting
/// (`sort_by`, `sort_order`, default id ascending). The response carries the
/// page plus a `meta` envelope with `page`, `limit`, `total`, and
/// `totalPages`.
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookListQuery>,
) -> Result<Json<BookPage>, ApiError> {
    let page = state.book_manager.list(query.into()).await?;
    Ok(Json(page))
}

/// Fetch a single book.
///
/// # Errors
///
/// - `404 Not Found`: No book with this id
pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> Result<Json<Book>, ApiError> {
    let book = state.book_manager.get(book_id).await?;
    Ok(Json(book))
}

/// Create a book owned by the caller.
///
/// # Response
///
/// On success, returns `201 Created` with the new record; `user_id` is the
/// caller's id.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failures as `{"errors": [...]}`
pub async fn create_book(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Json(payload): Json<NewBook>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let book = state
        .book_manager
        .create(principal.user_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Apply a partial update to a book.
///
/// Only the owner of the record or an admin may update it.
///
/// # Errors
///
/// - `400 Bad Request`: Empty update or validation failures
/// - `403 Forbidden`: Caller is neither the owner nor an admin
/// - `404 Not Found`: No book with this id
pub async fn update_book(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(book_id): Path<i64>,
    Json(payload): Json<BookUpdate>,
) -> Result<Json<Book>, ApiError> {
    let book = state
        .book_manager
        .update(principal.user_id, principal.role, book_id, payload)
        .await?;
    Ok(Json(book))
}

/// Delete a book. Admin-only, enforced by the route's authorization layer.
///
/// # Response
///
/// On success, returns `200 OK` with the removed record:
/// ```json
/// { "message": "Book deleted successfully", "data": { "id": 7, "title": "Dune", ... } }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: No book with this id
pub async fn delete_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let book = state.book_manager.delete(book_id).await?;
    Ok(Json(serde_json::json!({
        "message": "Book deleted successfully",
        "data": book,
    })))
}
