//! Book catalog: models, validation, and the manager coordinating access to
//! the repository.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{BookError, BookResult};
pub use manager::BookManager;
pub use models::{
    Book, BookId, BookListParams, BookPage, BookSort, BookUpdate, NewBook, PageMeta,
};
