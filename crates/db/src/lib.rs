//! pfoertner-db – Datenbank-Abstraktion
//!
//! Dieses Crate stellt das Repository-Pattern fuer den Kontodienst bereit:
//! das Benutzer-Modell, den `UserRepository`-Trait und die
//! SQLite-Implementierung (sqlx). Die Geschaeftslogik in `pfoertner-auth`
//! kennt nur den Trait; die konkrete Datenbank bleibt austauschbar.

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::{DbError, DbResult};
pub use models::{BenutzerRecord, NeuerBenutzer};
pub use repository::UserRepository;
pub use sqlite::pool::DatenbankConfig;
pub use sqlite::SqliteDb;
