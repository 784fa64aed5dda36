//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist. Geheimnis und TTLs sind nach dem Laden unveraenderlich.

use serde::Deserialize;

use pfoertner_auth::TokenConfig;
use pfoertner_mail::MailConfig;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Allgemeine Dienst-Einstellungen
    pub dienst: DienstEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Datenbank-Einstellungen
    pub datenbank: DatenbankEinstellungen,
    /// Token-Einstellungen (Geheimnis + Lebensdauern)
    pub token: TokenEinstellungen,
    /// SMTP-Einstellungen fuer Bestaetigungsmails
    pub mail: MailConfig,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Allgemeine Dienst-Einstellungen
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DienstEinstellungen {
    /// Anzeigename des Dienstes
    pub name: String,
    /// Oeffentliche Basis-URL (fuer Links in Bestaetigungsmails)
    pub basis_url: String,
}

impl Default for DienstEinstellungen {
    fn default() -> Self {
        Self {
            name: "Pfoertner".into(),
            basis_url: "http://localhost:8080".into(),
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer die REST-API
    pub bind_adresse: String,
    /// Port fuer die REST-API
    pub api_port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            api_port: 8080,
        }
    }
}

/// Datenbank-Einstellungen
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    /// Verbindungs-URL
    pub url: String,
    /// Maximale Verbindungspool-Groesse
    pub max_verbindungen: u32,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        Self {
            url: "sqlite://pfoertner.db".into(),
            max_verbindungen: 5,
        }
    }
}

/// Standard-Geheimnis fuer Entwicklungsbetrieb; beim Start wird gewarnt
pub const ENTWICKLUNGS_GEHEIMNIS: &str = "entwicklungs-geheimnis-bitte-aendern";

/// Token-Einstellungen
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenEinstellungen {
    /// Prozessweites Signatur-Geheimnis (HS256)
    pub geheimnis: String,
    /// Lebensdauer von Access-Tokens in Minuten (kurz)
    pub zugriff_ttl_minuten: i64,
    /// Lebensdauer von Refresh-Tokens in Tagen (lang)
    pub erneuerung_ttl_tage: i64,
    /// Lebensdauer von Bestaetigungs-Tokens in Tagen (lang)
    pub bestaetigung_ttl_tage: i64,
}

impl Default for TokenEinstellungen {
    fn default() -> Self {
        Self {
            geheimnis: ENTWICKLUNGS_GEHEIMNIS.into(),
            zugriff_ttl_minuten: 15,
            erneuerung_ttl_tage: 7,
            bestaetigung_ttl_tage: 7,
        }
    }
}

impl TokenEinstellungen {
    /// Konvertiert in die TokenConfig des Auth-Kerns (Sekunden)
    pub fn als_token_config(&self) -> TokenConfig {
        TokenConfig {
            geheimnis: self.geheimnis.clone(),
            zugriff_ttl_sekunden: self.zugriff_ttl_minuten * 60,
            erneuerung_ttl_sekunden: self.erneuerung_ttl_tage * 24 * 3600,
            bestaetigung_ttl_sekunden: self.bestaetigung_ttl_tage * 24 * 3600,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Gibt die vollstaendige Bind-Adresse fuer die REST-API zurueck
    pub fn api_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.api_port)
    }
}
