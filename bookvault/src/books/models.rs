//! Book catalog data models.

use crate::auth::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Book ID type
pub type BookId = i64;

/// A catalog entry. `user_id` is the owner, the user who created the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub published_year: Option<i32>,
    pub isbn: Option<String>,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a book. The owner comes from the access token, never
/// from the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub published_year: Option<i32>,
    #[serde(default)]
    pub isbn: Option<String>,
}

/// Partial update for a book; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_year: Option<i32>,
    #[serde(default)]
    pub isbn: Option<String>,
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.published_year.is_none()
            && self.isbn.is_none()
    }
}

/// Sortable columns for the book listing. An enum instead of a raw string so
/// user input can never reach the ORDER BY clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookSort {
    #[default]
    Id,
    Title,
    Author,
    PublishedYear,
}

impl BookSort {
    pub fn column(&self) -> &'static str {
        match self {
            BookSort::Id => "id",
            BookSort::Title => "title",
            BookSort::Author => "author",
            BookSort::PublishedYear => "published_year",
        }
    }

    /// Parse a query-string value; unknown values fall back to the default.
    pub fn parse(value: &str) -> Self {
        match value {
            "title" => BookSort::Title,
            "author" => BookSort::Author,
            "published_year" => BookSort::PublishedYear,
            _ => BookSort::Id,
        }
    }
}

/// Listing parameters: pagination, filters, and sort order. Defaults to the
/// first page of ten, sorted by id ascending.
#[derive(Debug, Clone)]
pub struct BookListParams {
    /// 1-based page number
    pub page: u32,
    /// Page size, clamped to [1, 100]
    pub limit: u32,
    /// Case-insensitive substring match across title, author, and isbn
    pub search: Option<String>,
    /// Case-insensitive substring match on the author
    pub author: Option<String>,
    /// Exact match on the published year
    pub published_year: Option<i32>,
    pub sort: BookSort,
    pub descending: bool,
}

impl Default for BookListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
            author: None,
            published_year: None,
            sort: BookSort::default(),
            descending: false,
        }
    }
}

impl BookListParams {
    /// Clamp page/limit into their valid ranges.
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.limit = self.limit.clamp(1, 100);
        self
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

/// Pagination envelope attached to every listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl PageMeta {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + i64::from(limit) - 1) / i64::from(limit)
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// One page of books plus its pagination envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookPage {
    pub data: Vec<Book>,
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_meta_rounds_up() {
        let meta = PageMeta::new(1, 10, 25);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn test_page_meta_empty_catalog() {
        let meta = PageMeta::new(1, 10, 0);
        assert_eq!(meta.total_pages, 0);
    }

    #[test]
    fn test_page_meta_exact_fit() {
        let meta = PageMeta::new(2, 10, 20);
        assert_eq!(meta.total_pages, 2);
    }

    #[test]
    fn test_page_meta_wire_name() {
        let json = serde_json::to_string(&PageMeta::new(1, 10, 5)).unwrap();
        assert!(json.contains("\"totalPages\":1"));
    }

    #[test]
    fn test_params_normalization() {
        let params = BookListParams {
            page: 0,
            limit: 5000,
            ..Default::default()
        }
        .normalized();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 100);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_sort_parse_whitelist() {
        assert_eq!(BookSort::parse("title"), BookSort::Title);
        assert_eq!(BookSort::parse("id; DROP TABLE books"), BookSort::Id);
    }

    #[test]
    fn test_update_emptiness() {
        assert!(BookUpdate::default().is_empty());
        assert!(
            !BookUpdate {
                title: Some("x".to_string()),
                ..Default::default()
            }
            .is_empty()
        );
    }
}
