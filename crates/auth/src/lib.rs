//! pfoertner-auth – Auth-Kern des Kontodienstes
//!
//! Dieses Crate implementiert:
//! - Passwort-Hashing mit Argon2id
//! - Token-Codec fuer drei signierte Token-Arten (Access, Refresh,
//!   E-Mail-Bestaetigung) mit getrennten Lebensdauern
//! - AuthService (Registrierung, Login, Token-Rotation, Logout)
//! - BestaetigungsService (Konto-Bestaetigung per E-Mail, idempotent)
//!
//! Der Kern haelt keinen eigenen Zustand: alle Koordination laeuft ueber
//! das `UserRepository` aus pfoertner-db.

pub mod bestaetigung;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

// Bequeme Re-Exporte
pub use bestaetigung::{BestaetigungsAntwort, BestaetigungsService};
pub use error::{AuthError, AuthResult};
pub use password::{passwort_hashen, passwort_verifizieren};
pub use service::{AuthService, TokenPaar};
pub use token::{TokenArt, TokenConfig, TokenDienst};
