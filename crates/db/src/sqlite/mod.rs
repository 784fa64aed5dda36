//! SQLite-Backend (sqlx)

pub mod pool;
pub mod users;

pub use pool::SqliteDb;
