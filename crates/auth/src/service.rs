//! Auth-Service fuer Pfoertner
//!
//! Zentraler Service fuer Registrierung, Login, Token-Rotation und Logout.
//! Durables Zustandswissen (der eine gespeicherte Refresh-Token, das
//! confirmed-Flag) liegt ausschliesslich im Repository; der Service selbst
//! ist zustandslos.

use std::sync::Arc;

use serde::Serialize;

use pfoertner_db::{models::NeuerBenutzer, BenutzerRecord, UserRepository};
use pfoertner_mail::BestaetigungsVersand;

use crate::{
    error::{AuthError, AuthResult},
    password::{passwort_hashen, passwort_verifizieren},
    token::{TokenArt, TokenDienst},
};

/// Ein frisch ausgestelltes Access/Refresh-Paar
#[derive(Debug, Clone, Serialize)]
pub struct TokenPaar {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(rename = "token_type")]
    pub token_typ: &'static str,
}

/// Auth-Service – zentraler Einstiegspunkt fuer Konto- und Session-Vorgaenge
pub struct AuthService<U: UserRepository> {
    user_repo: Arc<U>,
    tokens: Arc<TokenDienst>,
    versand: Arc<dyn BestaetigungsVersand>,
    basis_url: String,
}

impl<U: UserRepository> AuthService<U> {
    /// Erstellt einen neuen AuthService
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

    /// Registriert einen neuen Benutzer
    ///
    /// Prueft ob die E-Mail bereits registriert ist, hasht das Passwort und
    /// stoesst (nicht blockierend) den Versand der Bestaetigungsmail an.
    pub async fn registrieren(
        &self,
        email: &str,
        username: &str,
        passwort: &str,
    ) -> AuthResult<BenutzerRecord> {
        if self.user_repo.get_by_email(email).await?.is_some() {
            return Err(AuthError::EmailVergeben(email.to_string()));
        }

        let passwort_hash = passwort_hashen(passwort)?;

        let benutzer = self
            .user_repo
            .create(NeuerBenutzer {
                email,
                username,
                password_hash: &passwort_hash,
            })
            .await
            .map_err(|e| {
                if e.ist_eindeutigkeit() {
                    AuthError::EmailVergeben(email.to_string())
                } else {
                    AuthError::Datenbank(e)
                }
            })?;

        bestaetigungs_mail_anstossen(
            &self.tokens,
            &self.versand,
            &self.basis_url,
            &benutzer.email,
            &benutzer.username,
        );

        tracing::info!(
            user_id = %benutzer.id,
            email = %benutzer.email,
            "Neuer Benutzer registriert"
        );

        Ok(benutzer)
    }

    /// Meldet einen Benutzer an und stellt ein frisches Token-Paar aus
    ///
    /// Der neue Refresh-Token UEBERSCHREIBT den gespeicherten Wert: ein
    /// zweiter Login invalidiert damit jede vorher ausgegebene Session.
    pub async fn anmelden(&self, email: &str, passwort: &str) -> AuthResult<TokenPaar> {
        let benutzer = self
            .user_repo
            .get_by_email(email)
            .await?
            .ok_or(AuthError::EmailUnbekannt)?;

        if !benutzer.confirmed {
            return Err(AuthError::EmailNichtBestaetigt);
        }

        let korrekt = passwort_verifizieren(passwort, &benutzer.password_hash)?;
        if !korrekt {
            tracing::warn!(email = %email, "Fehlgeschlagener Login-Versuch");
            return Err(AuthError::UngueltigesPasswort);
        }

        let paar = self.token_paar_ausstellen(&benutzer.email)?;
        self.user_repo
            .update_refresh_token(benutzer.id, Some(&paar.refresh_token))
            .await?;

        tracing::info!(user_id = %benutzer.id, "Benutzer angemeldet");

        Ok(paar)
    }

    /// Tauscht einen Refresh-Token gegen ein frisches Token-Paar (Rotation)
    ///
    /// Der vorgelegte Token muss EXAKT dem gespeicherten Wert entsprechen.
    /// Ein abweichender (bereits rotierter) Token gilt als Replay: der
    /// gespeicherte Wert wird geloescht, sodass nur ein neuer Login hilft.
    pub async fn erneuern(&self, refresh_token: &str) -> AuthResult<TokenPaar> {
        let email = self.tokens.dekodieren(refresh_token, TokenArt::Erneuerung)?;

        let benutzer = self
            .user_repo
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::TokenUngueltig)?;

        if benutzer.refresh_token.as_deref() != Some(refresh_token) {
            // Replay erkannt: aktive Session widerrufen, dann ablehnen
            self.user_repo.update_refresh_token(benutzer.id, None).await?;
            tracing::warn!(
                user_id = %benutzer.id,
                "Veralteter Refresh-Token vorgelegt, gespeicherter Token geloescht"
            );
            return Err(AuthError::TokenUngueltig);
        }

        let paar = self.token_paar_ausstellen(&benutzer.email)?;
        self.user_repo
            .update_refresh_token(benutzer.id, Some(&paar.refresh_token))
            .await?;

        tracing::debug!(user_id = %benutzer.id, "Refresh-Token rotiert");

        Ok(paar)
    }

    /// Meldet einen Benutzer ab: loescht den gespeicherten Refresh-Token
    pub async fn abmelden(&self, access_token: &str) -> AuthResult<()> {
        let email = self.tokens.dekodieren(access_token, TokenArt::Zugriff)?;

        let benutzer = self
            .user_repo
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::TokenUngueltig)?;

        self.user_repo.update_refresh_token(benutzer.id, None).await?;
        tracing::info!(user_id = %benutzer.id, "Benutzer abgemeldet, Session invalidiert");
        Ok(())
    }

    fn token_paar_ausstellen(&self, email: &str) -> AuthResult<TokenPaar> {
        Ok(TokenPaar {
            access_token: self.tokens.ausstellen(TokenArt::Zugriff, email)?,
            refresh_token: self.tokens.ausstellen(TokenArt::Erneuerung, email)?,
            token_typ: "bearer",
        })
    }
}

/// Stoesst den Versand einer Bestaetigungsmail an (fire-and-forget)
///
/// Blockiert den Aufrufer nicht; Fehler beim Ausstellen oder Senden werden
/// geloggt und nie als Fehler der ausloesenden Operation sichtbar.
pub(crate) fn bestaetigungs_mail_anstossen(
    tokens: &TokenDienst,
    versand: &Arc<dyn BestaetigungsVersand>,
    basis_url: &str,
    email: &str,
    username: &str,
) {
    let token = match tokens.ausstellen(TokenArt::EmailBestaetigung, email) {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(email = %email, fehler = %e, "Bestaetigungs-Token nicht ausstellbar");
            return;
        }
    };

    let versand = Arc::clone(versand);
    let email = email.to_string();
    let username = username.to_string();
    let basis_url = basis_url.to_string();

    tokio::spawn(async move {
        if let Err(e) = versand
            .bestaetigung_senden(&email, &username, &basis_url, &token)
            .await
        {
            tracing::warn!(email = %email, fehler = %e, "Bestaetigungsmail fehlgeschlagen");
        }
    });
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use pfoertner_db::{DbError, DbResult};
    use pfoertner_mail::MailResult;

    use crate::token::TokenConfig;

    // Minimales In-Memory UserRepository fuer Tests
    #[derive(Default)]
    pub(crate) struct TestUserRepo {
        pub(crate) benutzer: Mutex<Vec<BenutzerRecord>>,
    }

    impl UserRepository for TestUserRepo {
        async fn get_by_email(&self, email: &str) -> DbResult<Option<BenutzerRecord>> {
            Ok(self
                .benutzer
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord> {
            let mut benutzer = self.benutzer.lock().unwrap();
            if benutzer.iter().any(|u| u.email == data.email) {
                return Err(DbError::Eindeutigkeit(data.email.to_string()));
            }
            let record = BenutzerRecord {
                id: Uuid::new_v4(),
                email: data.email.to_string(),
                username: data.username.to_string(),
                password_hash: data.password_hash.to_string(),
                confirmed: false,
                refresh_token: None,
                created_at: Utc::now(),
            };
            benutzer.push(record.clone());
            Ok(record)
        }

        async fn update_refresh_token(&self, id: Uuid, token: Option<&str>) -> DbResult<()> {
            let mut benutzer = self.benutzer.lock().unwrap();
            let user = benutzer
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or_else(|| DbError::nicht_gefunden(id.to_string()))?;
            user.refresh_token = token.map(str::to_string);
            Ok(())
        }

        async fn set_confirmed(&self, email: &str) -> DbResult<()> {
            let mut benutzer = self.benutzer.lock().unwrap();
            let user = benutzer
                .iter_mut()
                .find(|u| u.email == email)
                .ok_or_else(|| DbError::nicht_gefunden(email.to_string()))?;
            user.confirmed = true;
            Ok(())
        }
    }

    // Versand-Attrappe, zeichnet Empfaenger auf
    #[derive(Default)]
    pub(crate) struct TestVersand {
        pub(crate) gesendet: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BestaetigungsVersand for TestVersand {
        async fn bestaetigung_senden(
            &self,
            empfaenger: &str,
            _anzeigename: &str,
            _basis_url: &str,
            _token: &str,
        ) -> MailResult<()> {
            self.gesendet.lock().unwrap().push(empfaenger.to_string());
            Ok(())
        }
    }

    pub(crate) fn test_token_dienst() -> Arc<TokenDienst> {
        Arc::new(TokenDienst::neu(&TokenConfig {
            geheimnis: "test-geheimnis".into(),
            zugriff_ttl_sekunden: 900,
            erneuerung_ttl_sekunden: 7 * 24 * 3600,
            bestaetigung_ttl_sekunden: 7 * 24 * 3600,
        }))
    }

    fn test_service() -> (AuthService<TestUserRepo>, Arc<TestUserRepo>, Arc<TestVersand>) {
        let repo = Arc::new(TestUserRepo::default());
        let versand = Arc::new(TestVersand::default());
        let service = AuthService::neu(
            Arc::clone(&repo),
            test_token_dienst(),
            versand.clone() as Arc<dyn BestaetigungsVersand>,
            "http://localhost:8080",
        );
        (service, repo, versand)
    }

    async fn bestaetigt_registrieren(
        service: &AuthService<TestUserRepo>,
        repo: &TestUserRepo,
        email: &str,
        passwort: &str,
    ) {
        service.registrieren(email, "testuser", passwort).await.unwrap();
        repo.set_confirmed(email).await.unwrap();
    }

    #[tokio::test]
    async fn registrieren_und_anmelden() {
        let (service, repo, _) = test_service();

        let user = service
            .registrieren("a@x.com", "alice", "sicheres_passwort!")
            .await
            .expect("Registrierung fehlgeschlagen");

        assert_eq!(user.email, "a@x.com");
        assert!(!user.confirmed, "Neue Konten starten unbestaetigt");

        repo.set_confirmed("a@x.com").await.unwrap();

        let paar = service
            .anmelden("a@x.com", "sicheres_passwort!")
            .await
            .expect("Anmeldung fehlgeschlagen");

        assert_eq!(paar.token_typ, "bearer");
        assert!(!paar.access_token.is_empty());

        // Der ausgegebene Refresh-Token ist jetzt der gespeicherte
        let gespeichert = repo.get_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(gespeichert.refresh_token.as_deref(), Some(paar.refresh_token.as_str()));
    }

    #[tokio::test]
    async fn doppelte_registrierung_gibt_konflikt() {
        let (service, _, _) = test_service();
        service.registrieren("dup@x.com", "a", "pw").await.unwrap();

        let ergebnis = service.registrieren("dup@x.com", "b", "anderes").await;
        assert!(matches!(ergebnis, Err(AuthError::EmailVergeben(_))));
    }

    #[tokio::test]
    async fn registrierung_stoesst_bestaetigungsmail_an() {
        let (service, _, versand) = test_service();
        service.registrieren("mail@x.com", "m", "pw").await.unwrap();

        // Versand laeuft als Hintergrund-Task
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(versand.gesendet.lock().unwrap().as_slice(), ["mail@x.com"]);
    }

    #[tokio::test]
    async fn anmelden_unbekannte_email() {
        let (service, _, _) = test_service();
        let ergebnis = service.anmelden("niemand@x.com", "pw").await;
        assert!(matches!(ergebnis, Err(AuthError::EmailUnbekannt)));
    }

    #[tokio::test]
    async fn anmelden_unbestaetigt_schlaegt_fehl() {
        let (service, _, _) = test_service();
        service.registrieren("u@x.com", "u", "richtig").await.unwrap();

        // Auch mit korrektem Passwort
        let ergebnis = service.anmelden("u@x.com", "richtig").await;
        assert!(matches!(ergebnis, Err(AuthError::EmailNichtBestaetigt)));
    }

    #[tokio::test]
    async fn falsches_passwort_abgelehnt() {
        let (service, repo, _) = test_service();
        bestaetigt_registrieren(&service, &repo, "u@x.com", "richtig").await;

        let ergebnis = service.anmelden("u@x.com", "falsch").await;
        assert!(matches!(ergebnis, Err(AuthError::UngueltigesPasswort)));
    }

    #[tokio::test]
    async fn erneuern_rotiert_den_token() {
        let (service, repo, _) = test_service();
        bestaetigt_registrieren(&service, &repo, "r@x.com", "pw").await;

        let erstes = service.anmelden("r@x.com", "pw").await.unwrap();
        let zweites = service.erneuern(&erstes.refresh_token).await.unwrap();

        // Neues Paar wurde gespeichert
        let gespeichert = repo.get_by_email("r@x.com").await.unwrap().unwrap();
        assert_eq!(
            gespeichert.refresh_token.as_deref(),
            Some(zweites.refresh_token.as_str())
        );
    }

    #[tokio::test]
    async fn erneuern_mit_rotiertem_token_ist_replay() {
        let (service, repo, _) = test_service();
        bestaetigt_registrieren(&service, &repo, "r@x.com", "pw").await;

        let erstes = service.anmelden("r@x.com", "pw").await.unwrap();
        service.erneuern(&erstes.refresh_token).await.unwrap();

        // Derselbe Token nochmal: Replay, gespeicherter Wert wird geloescht
        let ergebnis = service.erneuern(&erstes.refresh_token).await;
        assert!(matches!(ergebnis, Err(AuthError::TokenUngueltig)));

        let gespeichert = repo.get_by_email("r@x.com").await.unwrap().unwrap();
        assert!(gespeichert.refresh_token.is_none(), "Replay muss die Session widerrufen");
    }

    #[tokio::test]
    async fn zweiter_login_invalidiert_ersten_refresh_token() {
        let (service, repo, _) = test_service();
        bestaetigt_registrieren(&service, &repo, "z@x.com", "pw").await;

        let erstes = service.anmelden("z@x.com", "pw").await.unwrap();
        let _zweites = service.anmelden("z@x.com", "pw").await.unwrap();

        let ergebnis = service.erneuern(&erstes.refresh_token).await;
        assert!(matches!(ergebnis, Err(AuthError::TokenUngueltig)));

        let gespeichert = repo.get_by_email("z@x.com").await.unwrap().unwrap();
        assert!(gespeichert.refresh_token.is_none());
    }

    #[tokio::test]
    async fn erneuern_nach_widerruf_braucht_neuen_login() {
        let (service, repo, _) = test_service();
        bestaetigt_registrieren(&service, &repo, "w@x.com", "pw").await;

        let erstes = service.anmelden("w@x.com", "pw").await.unwrap();
        let zweites = service.anmelden("w@x.com", "pw").await.unwrap();

        // Replay loescht den gespeicherten Token; danach scheitert sogar
        // der an sich aktuelle Token, bis neu angemeldet wird
        let _ = service.erneuern(&erstes.refresh_token).await;
        let ergebnis = service.erneuern(&zweites.refresh_token).await;
        assert!(matches!(ergebnis, Err(AuthError::TokenUngueltig)));

        let drittes = service.anmelden("w@x.com", "pw").await.unwrap();
        service.erneuern(&drittes.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn access_token_ist_kein_refresh_token() {
        let (service, repo, _) = test_service();
        bestaetigt_registrieren(&service, &repo, "k@x.com", "pw").await;

        let paar = service.anmelden("k@x.com", "pw").await.unwrap();
        let ergebnis = service.erneuern(&paar.access_token).await;
        assert!(matches!(ergebnis, Err(AuthError::TokenUngueltig)));
    }

    #[tokio::test]
    async fn abmelden_loescht_gespeicherten_token() {
        let (service, repo, _) = test_service();
        bestaetigt_registrieren(&service, &repo, "l@x.com", "pw").await;

        let paar = service.anmelden("l@x.com", "pw").await.unwrap();
        service.abmelden(&paar.access_token).await.unwrap();

        let gespeichert = repo.get_by_email("l@x.com").await.unwrap().unwrap();
        assert!(gespeichert.refresh_token.is_none());

        let ergebnis = service.erneuern(&paar.refresh_token).await;
        assert!(matches!(ergebnis, Err(AuthError::TokenUngueltig)));
    }
}
