//! Repository-Trait fuer Benutzer-Datenzugriffe
//!
//! Das Repository-Pattern entkoppelt die Geschaeftslogik von der konkreten
//! Datenbank-Implementierung. Alle Aufrufe gelten aus Sicht der Aufrufer
//! als atomar; die Datenbank ist der einzige Serialisierungspunkt.

use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{BenutzerRecord, NeuerBenutzer};

/// Repository fuer Benutzer-Datenzugriffe
#[allow(async_fn_in_trait)]
pub trait UserRepository: Send + Sync {
    /// Einen Benutzer anhand seiner E-Mail-Adresse laden
    async fn get_by_email(&self, email: &str) -> DbResult<Option<BenutzerRecord>>;

    /// Einen neuen Benutzer anlegen (confirmed=false, kein Refresh-Token)
    ///
    /// Gibt `DbError::Eindeutigkeit` zurueck wenn die E-Mail bereits
    /// registriert ist.
    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord>;

    /// Setzt oder loescht den gespeicherten Refresh-Token eines Benutzers
    ///
    /// `None` invalidiert die aktive Session (erzwingt neuen Login).
    async fn update_refresh_token(&self, id: Uuid, token: Option<&str>) -> DbResult<()>;

    /// Markiert einen Benutzer als bestaetigt (irreversibel)
    async fn set_confirmed(&self, email: &str) -> DbResult<()>;
}
