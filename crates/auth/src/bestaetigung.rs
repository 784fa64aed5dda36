//! Konto-Bestaetigung per E-Mail
//!
//! Treibt den Zustandsuebergang unbestaetigt -> bestaetigt. Der Uebergang
//! ist irreversibel; wiederholtes Bestaetigen ist idempotent und KEIN
//! Fehler. Der Bestaetigungs-Token traegt ausser dem Ablauf keinen
//! Einmal-Marker.

use std::sync::Arc;

use pfoertner_db::UserRepository;
use pfoertner_mail::BestaetigungsVersand;

use crate::{
    error::{AuthError, AuthResult},
    service::bestaetigungs_mail_anstossen,
    token::{TokenArt, TokenDienst},
};

/// Ergebnis einer Bestaetigungs-Operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestaetigungsAntwort {
    /// Der Uebergang wurde gerade angewendet
    Bestaetigt,
    /// Das Konto war bereits bestaetigt (idempotente Antwort)
    BereitsBestaetigt,
    /// Generische Antwort auf eine Bestaetigungs-Anforderung; verraet
    /// nicht, ob die E-Mail registriert ist
    PostfachPruefen,
}

impl BestaetigungsAntwort {
    /// Meldung fuer den Client
    pub fn nachricht(&self) -> &'static str {
        match self {
            Self::Bestaetigt => "E-Mail bestaetigt",
            Self::BereitsBestaetigt => "E-Mail ist bereits bestaetigt",
            Self::PostfachPruefen => "Bitte Postfach fuer die Bestaetigung pruefen",
        }
    }
}

/// Service fuer den Bestaetigungs-Workflow
pub struct BestaetigungsService<U: UserRepository> {
    user_repo: Arc<U>,
    tokens: Arc<TokenDienst>,
    versand: Arc<dyn BestaetigungsVersand>,
    basis_url: String,
}

impl<U: UserRepository> BestaetigungsService<U> {
    /// Erstellt einen neuen BestaetigungsService
    pub fn neu(
        user_repo: Arc<U>,
        tokens: Arc<TokenDienst>,
        versand: Arc<dyn BestaetigungsVersand>,
        basis_url: impl Into<String>,
    ) -> Self {
        Self {
            user_repo,
            tokens,
            versand,
            basis_url: basis_url.into(),
        }
    }

    /// Fordert eine (neue) Bestaetigungsmail an
    ///
    /// Unbekannte E-Mail-Adressen sind ein No-Op mit derselben generischen
    /// Antwort, damit die Existenz von Konten nicht abfragbar ist. Bereits
    /// bestaetigte Konten bekommen die idempotente Antwort.
    pub async fn anfordern(&self, email: &str) -> AuthResult<BestaetigungsAntwort> {
        let benutzer = match self.user_repo.get_by_email(email).await? {
            None => return Ok(BestaetigungsAntwort::PostfachPruefen),
            Some(b) => b,
        };

        if benutzer.confirmed {
            return Ok(BestaetigungsAntwort::BereitsBestaetigt);
        }

        bestaetigungs_mail_anstossen(
            &self.tokens,
            &self.versand,
            &self.basis_url,
            &benutzer.email,
            &benutzer.username,
        );

        Ok(BestaetigungsAntwort::PostfachPruefen)
    }

    /// Wendet einen Bestaetigungs-Token an
    ///
    /// Ungueltige/abgelaufene Tokens und unbekannte Subjekte schlagen als
    /// `VerifikationsFehler` fehl. Ein gueltiger Token auf einem bereits
    /// bestaetigten Konto ist idempotent erfolgreich.
    pub async fn bestaetigen(&self, token: &str) -> AuthResult<BestaetigungsAntwort> {
        let email = self
            .tokens
            .dekodieren(token, TokenArt::EmailBestaetigung)
            .map_err(|_| AuthError::VerifikationsFehler)?;

        let benutzer = self
            .user_repo
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::VerifikationsFehler)?;

        if benutzer.confirmed {
            return Ok(BestaetigungsAntwort::BereitsBestaetigt);
        }

        self.user_repo.set_confirmed(&benutzer.email).await?;
        tracing::info!(user_id = %benutzer.id, email = %benutzer.email, "Konto bestaetigt");

        Ok(BestaetigungsAntwort::Bestaetigt)
    }
}
