//! Datenbankmodelle fuer Pfoertner
//!
//! Diese Typen repraesentieren Datensaetze aus der Datenbank.
//! Sie sind reine Datenuebertragungsobjekte ohne Geschaeftslogik.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Benutzer-Datensatz aus der Datenbank
///
/// `refresh_token` haelt den EINEN aktuell autorisierten Refresh-Token des
/// Benutzers (oder None). `confirmed` startet bei false und wechselt genau
/// einmal auf true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenutzerRecord {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub confirmed: bool,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Daten zum Erstellen eines neuen Benutzers
#[derive(Debug, Clone)]
pub struct NeuerBenutzer<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
}
