//! Token-Codec fuer signierte, zeitlich begrenzte Tokens (JWT, HS256)
//!
//! Drei Token-Arten teilen sich einen prozessweiten Schluessel, tragen aber
//! getrennte `scope`-Claims und getrennte Lebensdauern. Beim Dekodieren
//! werden Signatur, Ablauf und Art geprueft; jeder Fehlschlag wird zu
//! `AuthError::TokenUngueltig` zusammengefasst.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

/// Die drei Token-Arten des Kontodienstes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenArt {
    /// Kurzlebig, autorisiert API-Zugriffe
    Zugriff,
    /// Langlebig, tauschbar gegen ein neues Token-Paar; genau ein aktiver
    /// Wert pro Benutzer (in der Datenbank gespeichert)
    Erneuerung,
    /// Langlebig, beweist Kontrolle ueber eine E-Mail-Adresse
    EmailBestaetigung,
}

impl TokenArt {
    /// Wert des `scope`-Claims fuer diese Art
    pub fn scope(&self) -> &'static str {
        match self {
            Self::Zugriff => "access",
            Self::Erneuerung => "refresh",
            Self::EmailBestaetigung => "email_confirm",
        }
    }
}

/// Signierte Token-Nutzlast
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subjekt: die E-Mail-Adresse des Benutzers
    sub: String,
    /// Art-Diskriminator, Teil der signierten Nutzlast
    scope: String,
    /// Ausgestellt am (Unix-Sekunden)
    iat: i64,
    /// Laeuft ab am (Unix-Sekunden)
    exp: i64,
    /// Eindeutige Token-Kennung; macht auch zwei in derselben Sekunde
    /// ausgestellte Tokens unterscheidbar (Rotation vergleicht exakt)
    jti: String,
}

/// Prozessweite Token-Konfiguration (einmal geladen, danach unveraenderlich)
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Signatur-Geheimnis (HS256)
    pub geheimnis: String,
    /// Lebensdauer von Access-Tokens in Sekunden
    pub zugriff_ttl_sekunden: i64,
    /// Lebensdauer von Refresh-Tokens in Sekunden
    pub erneuerung_ttl_sekunden: i64,
    /// Lebensdauer von Bestaetigungs-Tokens in Sekunden
    pub bestaetigung_ttl_sekunden: i64,
}

/// Token-Codec: stellt Tokens aus und dekodiert sie
///
/// Ausstellen und Dekodieren sind frei von Seiteneffekten und damit ohne
/// Einschraenkung nebenlaeufig nutzbar.
pub struct TokenDienst {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    zugriff_ttl: i64,
    erneuerung_ttl: i64,
    bestaetigung_ttl: i64,
}

impl TokenDienst {
    /// Erstellt den Codec aus der Konfiguration
    pub fn neu(config: &TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.geheimnis.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.geheimnis.as_bytes()),
            zugriff_ttl: config.zugriff_ttl_sekunden,
            erneuerung_ttl: config.erneuerung_ttl_sekunden,
            bestaetigung_ttl: config.bestaetigung_ttl_sekunden,
        }
    }

    fn ttl_sekunden(&self, art: TokenArt) -> i64 {
        match art {
            TokenArt::Zugriff => self.zugriff_ttl,
            TokenArt::Erneuerung => self.erneuerung_ttl,
            TokenArt::EmailBestaetigung => self.bestaetigung_ttl,
        }
    }

    /// Stellt einen signierten Token der angegebenen Art aus
    pub fn ausstellen(&self, art: TokenArt, subjekt: &str) -> AuthResult<String> {
        let jetzt = Utc::now();
        let claims = Claims {
            sub: subjekt.to_string(),
            scope: art.scope().to_string(),
            iat: jetzt.timestamp(),
            exp: (jetzt + Duration::seconds(self.ttl_sekunden(art))).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::intern(format!("Token-Erstellung fehlgeschlagen: {e}")))
    }

    /// Dekodiert einen Token und gibt das Subjekt (die E-Mail) zurueck
    ///
    /// Prueft Signatur, Ablauf und den Art-Claim. Schlaegt mit dem EINEN
    /// generischen `TokenUngueltig` fehl, egal ob Signatur, Format, Ablauf
    /// oder Art nicht passen.
    pub fn dekodieren(&self, token: &str, erwartet: TokenArt) -> AuthResult<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let daten = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AuthError::TokenUngueltig)?;

        if daten.claims.scope != erwartet.scope() {
            return Err(AuthError::TokenUngueltig);
        }

        Ok(daten.claims.sub)
    }
}
