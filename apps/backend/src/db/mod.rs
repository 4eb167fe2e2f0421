//! SQLite storage for review items and session history.

pub mod error;
pub mod repository;
pub mod schema;

pub use error::DbError;
pub use repository::{ItemRepository, SessionLogRepository, SessionRecord, SqliteRepository};
