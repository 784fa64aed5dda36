//! Fehlertypen fuer den Auth-Kern

use thiserror::Error;

/// Alle moeglichen Fehler im Auth-Kern
///
/// Jeder Fehler ist terminal fuer die laufende Operation; der Routing-Layer
/// bildet ihn auf einen HTTP-Status ab. Token-Dekodierfehler werden bewusst
/// in `TokenUngueltig` zusammengefasst, damit kein Signatur-/Ablauf-Orakel
/// entsteht.
#[derive(Debug, Error)]
pub enum AuthError {
    // --- Passwort ---
    #[error("Passwort-Hashing fehlgeschlagen: {0}")]
    PasswortHashing(String),

    // --- Registrierung ---
    #[error("E-Mail bereits registriert: {0}")]
    EmailVergeben(String),

    // --- Anmeldung ---
    #[error("Ungueltige E-Mail")]
    EmailUnbekannt,

    #[error("E-Mail nicht bestaetigt")]
    EmailNichtBestaetigt,

    #[error("Ungueltiges Passwort")]
    UngueltigesPasswort,

    // --- Tokens ---
    #[error("Token ungueltig oder abgelaufen")]
    TokenUngueltig,

    // --- Bestaetigung ---
    #[error("Verifikationsfehler")]
    VerifikationsFehler,

    // --- Datenbank ---
    #[error("Datenbankfehler: {0}")]
    Datenbank(#[from] pfoertner_db::DbError),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl AuthError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// HTTP-Status fuer den Routing-Layer
    pub fn http_status(&self) -> u16 {
        match self {
            Self::EmailVergeben(_) => 409,
            Self::EmailUnbekannt
            | Self::EmailNichtBestaetigt
            | Self::UngueltigesPasswort
            | Self::TokenUngueltig => 401,
            Self::VerifikationsFehler => 400,
            Self::PasswortHashing(_) | Self::Datenbank(_) | Self::Intern(_) => 500,
        }
    }
}

/// Result-Alias fuer den Auth-Kern
pub type AuthResult<T> = Result<T, AuthError>;
