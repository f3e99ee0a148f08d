//! Book catalog manager implementation.

use super::errors::{BookError, BookResult};
use super::models::{Book, BookId, BookListParams, BookPage, BookUpdate, NewBook, PageMeta};
use crate::auth::{Role, UserId};
use crate::db::BookRepository;
use crate::validation::{FieldError, Validator, is_valid_year};
use log::debug;
use std::sync::Arc;

/// Orchestrates catalog reads and writes on top of the book repository.
///
/// Reads are open to any authenticated user. Creation assigns the caller as
/// owner. Updates require the caller to be the owner or an admin; deletion is
/// gated to admins at the routing layer.
#[derive(Clone)]
pub struct BookManager {
    books: Arc<dyn BookRepository>,
}

impl BookManager {
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self { books }
    }

    /// List one page of the catalog
    ///
    /// Page and limit are clamped into their valid ranges before they reach
    /// the repository, so an out-of-range request degrades instead of failing.
    pub async fn list(&self, params: BookListParams) -> BookResult<BookPage> {
        let params = params.normalized();
        let (data, total) = self.books.list(&params).await?;
        let meta = PageMeta::new(params.page, params.limit, total);
        Ok(BookPage { data, meta })
    }

    /// Fetch a single book
    ///
    /// # Errors
    ///
    /// * `BookError::NotFound` - No book with this id
    pub async fn get(&self, book_id: BookId) -> BookResult<Book> {
        self.books
            .find_by_id(book_id)
            .await?
            .ok_or(BookError::NotFound)
    }

    /// Create a book owned by the caller
    ///
    /// # Errors
    ///
    /// * `BookError::Validation` - Malformed fields or duplicate ISBN
    pub async fn create(&self, owner: UserId, book: NewBook) -> BookResult<Book> {
        let mut validator = Validator::new();
        validator.require_min_len("title", &book.title, 3);
        validator.require_min_len("author", &book.author, 3);
        if let Some(year) = book.published_year {
            if !is_valid_year(year) {
                validator.reject("published_year", "published_year must be a 4-digit year");
            }
        }
        if let Some(isbn) = &book.isbn {
            validator.require_len_between("isbn", isbn, 3, 13);
        }
        validator.finish().map_err(BookError::Validation)?;

        self.check_isbn_unique(book.isbn.as_deref(), None).await?;

        let created = self.books.create(owner, &book).await?;
        debug!("book {} created by user {owner}", created.id);
        Ok(created)
    }

    /// Apply a partial update to a book
    ///
    /// # Errors
    ///
    /// * `BookError::NoFieldsToUpdate` - Every updatable field was absent
    /// * `BookError::NotFound` - No book with this id
    /// * `BookError::NotOwner` - Caller is neither the owner nor an admin
    /// * `BookError::Validation` - Malformed fields
    pub async fn update(
        &self,
        actor: UserId,
        actor_role: Role,
        book_id: BookId,
        update: BookUpdate,
    ) -> BookResult<Book> {
        if update.is_empty() {
            return Err(BookError::NoFieldsToUpdate);
        }

        let existing = self
            .books
            .find_by_id(book_id)
            .await?
            .ok_or(BookError::NotFound)?;
        if existing.user_id != actor && actor_role != Role::Admin {
            return Err(BookError::NotOwner);
        }

        let mut validator = Validator::new();
        if let Some(title) = &update.title {
            validator.require_min_len("title", title, 3);
        }
        if let Some(author) = &update.author {
            validator.require_min_len("author", author, 3);
        }
        if let Some(year) = update.published_year {
            if !is_valid_year(year) {
                validator.reject("published_year", "published_year must be a 4-digit year");
            }
        }
        if let Some(isbn) = &update.isbn {
            validator.require_len_between("isbn", isbn, 3, 13);
        }
        validator.finish().map_err(BookError::Validation)?;

        self.check_isbn_unique(update.isbn.as_deref(), Some(book_id))
            .await?;

        // The row can vanish between the ownership check and the write.
        self.books
            .update(book_id, &update)
            .await?
            .ok_or(BookError::NotFound)
    }

    /// Reject an ISBN already carried by another book.
    async fn check_isbn_unique(
        &self,
        isbn: Option<&str>,
        exclude: Option<BookId>,
    ) -> BookResult<()> {
        let Some(isbn) = isbn else {
            return Ok(());
        };
        if self.books.find_by_isbn(isbn, exclude).await?.is_some() {
            return Err(BookError::Validation(vec![FieldError::new(
                "isbn",
                "A book with this ISBN already exists",
            )]));
        }
        Ok(())
    }

    /// Delete a book and return the removed record
    ///
    /// # Errors
    ///
    /// * `BookError::NotFound` - No book with this id
    pub async fn delete(&self, book_id: BookId) -> BookResult<Book> {
        let removed = self
            .books
            .delete(book_id)
            .await?
            .ok_or(BookError::NotFound)?;
        debug!("book {book_id} deleted");
        Ok(removed)
    }
}
