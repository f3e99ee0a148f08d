//! Repository trait definitions for testability and dependency injection.
//!
//! This module provides trait-based abstractions over database operations,
//! enabling better testing through mock implementations and dependency
//! injection.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use std::str::FromStr;

use crate::auth::{AuthResult, Role, User, UserCredentials, UserId};
use crate::books::{Book, BookId, BookListParams, BookResult, BookUpdate, NewBook};
use crate::users::UserPatch;

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> AuthResult<User>;

    /// Find a user together with their password hash, for login
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<UserCredentials>>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    /// List all users, newest first
    async fn list_users(&self) -> AuthResult<Vec<User>>;

    /// Apply a partial update; returns `None` when the user does not exist
    async fn update_user(&self, user_id: UserId, patch: &UserPatch) -> AuthResult<Option<User>>;

    /// Delete a user; returns the removed record, `None` when absent
    async fn delete_user(&self, user_id: UserId) -> AuthResult<Option<User>>;
}

/// Trait for book repository operations
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// List one page of books matching the filters, plus the total match count
    async fn list(&self, params: &BookListParams) -> BookResult<(Vec<Book>, i64)>;

    /// Find book by ID
    async fn find_by_id(&self, book_id: BookId) -> BookResult<Option<Book>>;

    /// Find the book carrying this ISBN, ignoring `exclude` (the record being
    /// updated, if any). Used for the uniqueness check.
    async fn find_by_isbn(&self, isbn: &str, exclude: Option<BookId>)
    -> BookResult<Option<Book>>;

    /// Create a book owned by the given user
    async fn create(&self, owner: UserId, book: &NewBook) -> BookResult<Book>;

    /// Apply a partial update; returns `None` when the book does not exist
    async fn update(&self, book_id: BookId, update: &BookUpdate) -> BookResult<Option<Book>>;

    /// Delete a book; returns the removed record, `None` when absent
    async fn delete(&self, book_id: BookId) -> BookResult<Option<Book>>;
}

const USER_COLUMNS: &str = "id, name, email, role, created_at";
const BOOK_COLUMNS: &str = "id, title, author, published_year, isbn, user_id, created_at";

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    let role: String = row.get("role");
    let role = Role::from_str(&role).map_err(|err| sqlx::Error::ColumnDecode {
        index: "role".to_string(),
        source: err.into(),
    })?;

    Ok(User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        role,
        created_at: row.get("created_at"),
    })
}

fn book_from_row(row: &PgRow) -> Book {
    Book {
        id: row.get("id"),
        title: row.get("title"),
        author: row.get("author"),
        published_year: row.get("published_year"),
        isbn: row.get("isbn"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
    }
}

/// Default PostgreSQL implementation of `UserRepository`
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> AuthResult<User> {
        let row = sqlx::query(
            "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4)
             RETURNING id, name, email, role, created_at",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(user_from_row(&row)?)
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<UserCredentials>> {
        let row = sqlx::query(
            "SELECT id, name, email, role, created_at, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            Ok::<_, sqlx::Error>(UserCredentials {
                user: user_from_row(&r)?,
                password_hash: r.get("password_hash"),
            })
        })
        .transpose()
        .map_err(Into::into)
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| user_from_row(&r)).transpose().map_err(Into::into)
    }

    async fn list_users(&self) -> AuthResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| user_from_row(r).map_err(Into::into))
            .collect()
    }

    async fn update_user(&self, user_id: UserId, patch: &UserPatch) -> AuthResult<Option<User>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET ");
        let mut fields = builder.separated(", ");
        if let Some(name) = &patch.name {
            fields.push("name = ").push_bind_unseparated(name);
        }
        if let Some(email) = &patch.email {
            fields.push("email = ").push_bind_unseparated(email);
        }
        if let Some(hash) = &patch.password_hash {
            fields.push("password_hash = ").push_bind_unseparated(hash);
        }
        builder.push(" WHERE id = ");
        builder.push_bind(user_id);
        builder.push(" RETURNING id, name, email, role, created_at");

        let row = builder.build().fetch_optional(&self.pool).await?;
        row.map(|r| user_from_row(&r)).transpose().map_err(Into::into)
    }

    async fn delete_user(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query(
            "DELETE FROM users WHERE id = $1
             RETURNING id, name, email, role, created_at",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| user_from_row(&r)).transpose().map_err(Into::into)
    }
}

/// Default PostgreSQL implementation of `BookRepository`
pub struct PgBookRepository {
    pool: PgPool,
}

impl PgBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append the filter conditions shared by the page and count queries.
    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, params: &BookListParams) {
        builder.push(" WHERE TRUE");
        if let Some(search) = &params.search {
            let pattern = format!("%{search}%");
            builder.push(" AND (title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR author ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR isbn ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
        if let Some(author) = &params.author {
            builder.push(" AND author ILIKE ");
            builder.push_bind(format!("%{author}%"));
        }
        if let Some(year) = params.published_year {
            builder.push(" AND published_year = ");
            builder.push_bind(year);
        }
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn list(&self, params: &BookListParams) -> BookResult<(Vec<Book>, i64)> {
        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) AS total FROM books");
        Self::push_filters(&mut count_builder, params);
        let total: i64 = count_builder
            .build()
            .fetch_one(&self.pool)
            .await?
            .get("total");

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {BOOK_COLUMNS} FROM books"));
        Self::push_filters(&mut builder, params);
        // Sort column comes from the whitelist enum, not from user input.
        builder.push(" ORDER BY ");
        builder.push(params.sort.column());
        builder.push(if params.descending { " DESC" } else { " ASC" });
        builder.push(", id DESC LIMIT ");
        builder.push_bind(i64::from(params.limit));
        builder.push(" OFFSET ");
        builder.push_bind(params.offset());

        let rows = builder.build().fetch_all(&self.pool).await?;
        Ok((rows.iter().map(book_from_row).collect(), total))
    }

    async fn find_by_id(&self, book_id: BookId) -> BookResult<Option<Book>> {
        let row = sqlx::query(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"
        ))
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| book_from_row(&r)))
    }

    async fn find_by_isbn(
        &self,
        isbn: &str,
        exclude: Option<BookId>,
    ) -> BookResult<Option<Book>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {BOOK_COLUMNS} FROM books WHERE isbn = "));
        builder.push_bind(isbn);
        if let Some(book_id) = exclude {
            builder.push(" AND id <> ");
            builder.push_bind(book_id);
        }

        let row = builder.build().fetch_optional(&self.pool).await?;
        Ok(row.map(|r| book_from_row(&r)))
    }

    async fn create(&self, owner: UserId, book: &NewBook) -> BookResult<Book> {
        let row = sqlx::query(
            "INSERT INTO books (title, author, published_year, isbn, user_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, title, author, published_year, isbn, user_id, created_at",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.published_year)
        .bind(&book.isbn)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        Ok(book_from_row(&row))
    }

    async fn update(&self, book_id: BookId, update: &BookUpdate) -> BookResult<Option<Book>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE books SET ");
        let mut fields = builder.separated(", ");
        if let Some(title) = &update.title {
            fields.push("title = ").push_bind_unseparated(title);
        }
        if let Some(author) = &update.author {
            fields.push("author = ").push_bind_unseparated(author);
        }
        if let Some(year) = update.published_year {
            fields
                .push("published_year = ")
                .push_bind_unseparated(year);
        }
        if let Some(isbn) = &update.isbn {
            fields.push("isbn = ").push_bind_unseparated(isbn);
        }
        builder.push(" WHERE id = ");
        builder.push_bind(book_id);
        builder.push(" RETURNING id, title, author, published_year, isbn, user_id, created_at");

        let row = builder.build().fetch_optional(&self.pool).await?;
        Ok(row.map(|r| book_from_row(&r)))
    }

    async fn delete(&self, book_id: BookId) -> BookResult<Option<Book>> {
        let row = sqlx::query(
            "DELETE FROM books WHERE id = $1
             RETURNING id, title, author, published_year, isbn, user_id, created_at",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| book_from_row(&r)))
    }
}
