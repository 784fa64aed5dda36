//! pfoertner-mail – E-Mail-Versand
//!
//! Dieses Crate implementiert:
//! - `BestaetigungsVersand`: Trait fuer den Versand von Bestaetigungsmails
//! - `SmtpVersand`: SMTP-Implementierung via lettre
//! - `LogVersand`: Entwicklungs-Implementierung, die nur loggt
//!
//! Der Versand ist best-effort: die Aufrufer (pfoertner-auth) stossen ihn
//! per `tokio::spawn` an und werten Fehler nicht aus.

pub mod smtp;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub use smtp::SmtpVersand;

/// Fehlertypen fuer den E-Mail-Versand
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Ungueltige E-Mail-Adresse: {0}")]
    Adresse(String),

    #[error("Nachricht konnte nicht gebaut werden: {0}")]
    Aufbau(String),

    #[error("SMTP-Fehler: {0}")]
    Smtp(String),
}

/// Result-Alias fuer das Mail-Crate
pub type MailResult<T> = Result<T, MailError>;

/// SMTP-Konfiguration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// SMTP-Host (leer = kein Versand, LogVersand verwenden)
    pub smtp_host: String,
    /// SMTP-Port (Standard: 587, STARTTLS)
    pub smtp_port: u16,
    /// SMTP-Benutzername
    pub benutzername: String,
    /// SMTP-Passwort
    pub passwort: String,
    /// Absender-Adresse
    pub absender: String,
    /// Absender-Anzeigename
    pub absender_name: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: 587,
            benutzername: String::new(),
            passwort: String::new(),
            absender: "noreply@pfoertner.dev".into(),
            absender_name: "Pfoertner".into(),
        }
    }
}

/// Versand von Konto-Bestaetigungsmails
///
/// Die Implementierung erhaelt Empfaenger, Anzeigename, Basis-URL des
/// Dienstes und den frisch ausgestellten Bestaetigungs-Token. Der Link in
/// der Mail lautet `{basis_url}/auth/confirmed_email/{token}`.
#[async_trait]
pub trait BestaetigungsVersand: Send + Sync {
    async fn bestaetigung_senden(
        &self,
        empfaenger: &str,
        anzeigename: &str,
        basis_url: &str,
        token: &str,
    ) -> MailResult<()>;
}

/// Entwicklungs-Versand: loggt den Bestaetigungslink statt zu senden
#[derive(Debug, Default)]
pub struct LogVersand;

#[async_trait]
impl BestaetigungsVersand for LogVersand {
    async fn bestaetigung_senden(
        &self,
        empfaenger: &str,
        _anzeigename: &str,
        basis_url: &str,
        token: &str,
    ) -> MailResult<()> {
        tracing::info!(
            empfaenger = %empfaenger,
            link = %format!("{basis_url}/auth/confirmed_email/{token}"),
            "Bestaetigungsmail (LogVersand, kein SMTP konfiguriert)"
        );
        Ok(())
    }
}
