//! In-memory repository implementations.
//!
//! Back the same traits as the PostgreSQL repositories with plain hash maps.
//! Used by the test suites and by ad-hoc deployments that run without a
//! database server; the listing applies the same filter, sort, and pagination
//! semantics as the SQL queries.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

use super::repository::{BookRepository, UserRepository};
use crate::auth::{AuthResult, Role, User, UserCredentials, UserId};
use crate::books::{Book, BookId, BookListParams, BookResult, BookSort, BookUpdate, NewBook};
use crate::users::UserPatch;

struct UserTable {
    rows: HashMap<UserId, UserCredentials>,
    next_id: UserId,
}

/// Hash-map backed `UserRepository`.
pub struct MemoryUserRepository {
    table: Mutex<UserTable>,
}

impl Default for MemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(UserTable {
                rows: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> AuthResult<User> {
        let mut table = self.table.lock().unwrap();
        let id = table.next_id;
        table.next_id += 1;

        let user = User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role,
            created_at: Utc::now(),
        };
        table.rows.insert(
            id,
            UserCredentials {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<UserCredentials>> {
        let table = self.table.lock().unwrap();
        Ok(table
            .rows
            .values()
            .find(|c| c.user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let table = self.table.lock().unwrap();
        Ok(table.rows.get(&user_id).map(|c| c.user.clone()))
    }

    async fn list_users(&self) -> AuthResult<Vec<User>> {
        let table = self.table.lock().unwrap();
        let mut users: Vec<User> = table.rows.values().map(|c| c.user.clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn update_user(&self, user_id: UserId, patch: &UserPatch) -> AuthResult<Option<User>> {
        let mut table = self.table.lock().unwrap();
        let Some(credentials) = table.rows.get_mut(&user_id) else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            credentials.user.name = name.clone();
        }
        if let Some(email) = &patch.email {
            credentials.user.email = email.clone();
        }
        if let Some(hash) = &patch.password_hash {
            credentials.password_hash = hash.clone();
        }
        Ok(Some(credentials.user.clone()))
    }

    async fn delete_user(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let mut table = self.table.lock().unwrap();
        Ok(table.rows.remove(&user_id).map(|c| c.user))
    }
}

struct BookTable {
    rows: HashMap<BookId, Book>,
    next_id: BookId,
}

/// Hash-map backed `BookRepository`.
pub struct MemoryBookRepository {
    table: Mutex<BookTable>,
}

impl Default for MemoryBookRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBookRepository {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(BookTable {
                rows: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    fn matches(book: &Book, params: &BookListParams) -> bool {
        let search_ok = params.search.as_ref().is_none_or(|s| {
            let needle = s.to_lowercase();
            book.title.to_lowercase().contains(&needle)
                || book.author.to_lowercase().contains(&needle)
                || book
                    .isbn
                    .as_ref()
                    .is_some_and(|i| i.to_lowercase().contains(&needle))
        });
        let author_ok = params
            .author
            .as_ref()
            .is_none_or(|a| book.author.to_lowercase().contains(&a.to_lowercase()));
        let year_ok = params
            .published_year
            .is_none_or(|y| book.published_year == Some(y));
        search_ok && author_ok && year_ok
    }
}

#[async_trait]
impl BookRepository for MemoryBookRepository {
    async fn list(&self, params: &BookListParams) -> BookResult<(Vec<Book>, i64)> {
        let table = self.table.lock().unwrap();
        let mut matches: Vec<Book> = table
            .rows
            .values()
            .filter(|b| Self::matches(b, params))
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            let ordering = match params.sort {
                BookSort::Id => a.id.cmp(&b.id),
                BookSort::Title => a.title.cmp(&b.title),
                BookSort::Author => a.author.cmp(&b.author),
                BookSort::PublishedYear => a.published_year.cmp(&b.published_year),
            };
            let ordering = if params.descending {
                ordering.reverse()
            } else {
                ordering
            };
            ordering.then(b.id.cmp(&a.id))
        });

        let total = matches.len() as i64;
        let page = matches
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn find_by_id(&self, book_id: BookId) -> BookResult<Option<Book>> {
        let table = self.table.lock().unwrap();
        Ok(table.rows.get(&book_id).cloned())
    }

    async fn find_by_isbn(
        &self,
        isbn: &str,
        exclude: Option<BookId>,
    ) -> BookResult<Option<Book>> {
        let table = self.table.lock().unwrap();
        Ok(table
            .rows
            .values()
            .find(|b| b.isbn.as_deref() == Some(isbn) && exclude != Some(b.id))
            .cloned())
    }

    async fn create(&self, owner: UserId, book: &NewBook) -> BookResult<Book> {
        let mut table = self.table.lock().unwrap();
        let id = table.next_id;
        table.next_id += 1;

        let book = Book {
            id,
            title: book.title.clone(),
            author: book.author.clone(),
            published_year: book.published_year,
            isbn: book.isbn.clone(),
            user_id: owner,
            created_at: Utc::now(),
        };
        table.rows.insert(id, book.clone());
        Ok(book)
    }

    async fn update(&self, book_id: BookId, update: &BookUpdate) -> BookResult<Option<Book>> {
        let mut table = self.table.lock().unwrap();
        let Some(book) = table.rows.get_mut(&book_id) else {
            return Ok(None);
        };

        if let Some(title) = &update.title {
            book.title = title.clone();
        }
        if let Some(author) = &update.author {
            book.author = author.clone();
        }
        if let Some(year) = update.published_year {
            book.published_year = Some(year);
        }
        if let Some(isbn) = &update.isbn {
            book.isbn = Some(isbn.clone());
        }
        Ok(Some(book.clone()))
    }

    async fn delete(&self, book_id: BookId) -> BookResult<Option<Book>> {
        let mut table = self.table.lock().unwrap();
        Ok(table.rows.remove(&book_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_book(title: &str, author: &str, year: i32) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: author.to_string(),
            published_year: Some(year),
            isbn: None,
        }
    }

    #[tokio::test]
    async fn test_user_crud_round_trip() {
        let repo = MemoryUserRepository::new();
        let user = repo
            .create_user("Alice", "a@x.com", "hash", Role::User)
            .await
            .unwrap();

        let by_email = repo.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.user.id, user.id);
        assert_eq!(by_email.password_hash, "hash");

        let patched = repo
            .update_user(
                user.id,
                &UserPatch {
                    name: Some("Alicia".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(patched.name, "Alicia");
        assert_eq!(patched.email, "a@x.com");

        let removed = repo.delete_user(user.id).await.unwrap().unwrap();
        assert_eq!(removed.name, "Alicia");
        assert!(repo.delete_user(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_user_returns_none() {
        let repo = MemoryUserRepository::new();
        let patch = UserPatch {
            name: Some("x".to_string()),
            ..Default::default()
        };
        assert!(repo.update_user(99, &patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_book_list_filters_and_paginates() {
        let repo = MemoryBookRepository::new();
        repo.create(1, &new_book("Dune", "Herbert", 1965)).await.unwrap();
        repo.create(1, &new_book("Dune Messiah", "Herbert", 1969))
            .await
            .unwrap();
        repo.create(2, &new_book("Neuromancer", "Gibson", 1984))
            .await
            .unwrap();

        let params = BookListParams {
            search: Some("dune".to_string()),
            ..Default::default()
        }
        .normalized();
        let (page, total) = repo.list(&params).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(page.len(), 2);

        let params = BookListParams {
            limit: 2,
            page: 2,
            sort: BookSort::Title,
            descending: false,
            ..Default::default()
        }
        .normalized();
        let (page, total) = repo.list(&params).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "Neuromancer");
    }

    #[tokio::test]
    async fn test_book_search_covers_author_and_isbn() {
        let repo = MemoryBookRepository::new();
        repo.create(1, &new_book("Dune", "Herbert", 1965)).await.unwrap();
        repo.create(
            1,
            &NewBook {
                isbn: Some("9780441569595".to_string()),
                ..new_book("Neuromancer", "Gibson", 1984)
            },
        )
        .await
        .unwrap();

        let params = BookListParams {
            search: Some("gibson".to_string()),
            ..Default::default()
        };
        let (page, total) = repo.list(&params).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].title, "Neuromancer");

        let params = BookListParams {
            search: Some("0441569595".to_string()),
            ..Default::default()
        };
        let (_, total) = repo.list(&params).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_find_by_isbn_honors_exclusion() {
        let repo = MemoryBookRepository::new();
        let book = repo
            .create(
                1,
                &NewBook {
                    isbn: Some("9780441013593".to_string()),
                    ..new_book("Dune", "Herbert", 1965)
                },
            )
            .await
            .unwrap();

        let hit = repo.find_by_isbn("9780441013593", None).await.unwrap();
        assert_eq!(hit.map(|b| b.id), Some(book.id));

        let excluded = repo
            .find_by_isbn("9780441013593", Some(book.id))
            .await
            .unwrap();
        assert!(excluded.is_none());
    }

    #[tokio::test]
    async fn test_book_year_filter_is_exact() {
        let repo = MemoryBookRepository::new();
        repo.create(1, &new_book("Dune", "Herbert", 1965)).await.unwrap();
        repo.create(1, &new_book("Neuromancer", "Gibson", 1984))
            .await
            .unwrap();

        let params = BookListParams {
            published_year: Some(1984),
            ..Default::default()
        };
        let (page, total) = repo.list(&params).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].title, "Neuromancer");
    }

    #[tokio::test]
    async fn test_book_partial_update() {
        let repo = MemoryBookRepository::new();
        let book = repo.create(1, &new_book("Dune", "Herbert", 1965)).await.unwrap();

        let updated = repo
            .update(
                book.id,
                &BookUpdate {
                    isbn: Some("9780441013593".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.isbn.as_deref(), Some("9780441013593"));
        assert_eq!(updated.title, "Dune");
        assert_eq!(updated.user_id, 1);
    }
}
