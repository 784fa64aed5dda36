//! pfoertner-server – Bibliotheks-Root
//!
//! Deklariert die Server-Module und stellt den Zusammenbau des Routers
//! fuer Integrationstests bereit.

pub mod config;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use pfoertner_auth::{AuthService, BestaetigungsService, TokenDienst};
use pfoertner_db::{DatenbankConfig, SqliteDb};
use pfoertner_mail::{BestaetigungsVersand, LogVersand, SmtpVersand};

use config::ServerConfig;
use handlers::AppState;

/// Haelt die geladene Konfiguration des laufenden Servers
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet den Server und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Datenbankverbindung herstellen, Migrationen ausfuehren
    /// 2. Kern-Services zusammenbauen (Token-Codec, Versand, Auth)
    /// 3. REST-API starten
    /// 4. Auf Ctrl-C warten
    pub async fn starten(self) -> Result<()> {
        tracing::info!(
            dienst = %self.config.dienst.name,
            api = %self.config.api_bind_adresse(),
            "Server startet"
        );

        if self.config.token.geheimnis == config::ENTWICKLUNGS_GEHEIMNIS {
            tracing::warn!(
                "token.geheimnis ist das Entwicklungs-Geheimnis; fuer den Betrieb ein eigenes setzen"
            );
        }

        let db = SqliteDb::oeffnen(&DatenbankConfig {
            url: self.config.datenbank.url.clone(),
            max_verbindungen: self.config.datenbank.max_verbindungen,
        })
        .await?;

        let app = router_bauen(db, &self.config)?;

        let adresse = self.config.api_bind_adresse();
        let listener = tokio::net::TcpListener::bind(&adresse).await?;
        tracing::info!(adresse = %adresse, "REST-API bereit");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server beendet");
        Ok(())
    }
}

/// Baut den vollstaendigen Axum-Router ueber einer geoeffneten Datenbank
///
/// Getrennt vom Serverstart, damit Integrationstests denselben Router
/// gegen eine In-Memory-Datenbank fahren koennen.
pub fn router_bauen(db: SqliteDb, config: &ServerConfig) -> Result<Router> {
    let tokens = Arc::new(TokenDienst::neu(&config.token.als_token_config()));

    let versand: Arc<dyn BestaetigungsVersand> = if config.mail.smtp_host.is_empty() {
        tracing::info!("Kein SMTP-Host konfiguriert, Bestaetigungslinks werden nur geloggt");
        Arc::new(LogVersand)
    } else {
        Arc::new(SmtpVersand::neu(config.mail.clone())?)
    };

    let repo = Arc::new(db);
    let basis_url = config.dienst.basis_url.clone();

    let state = AppState {
        auth: Arc::new(AuthService::neu(
            Arc::clone(&repo),
            Arc::clone(&tokens),
            Arc::clone(&versand),
            basis_url.clone(),
        )),
        bestaetigung: Arc::new(BestaetigungsService::neu(
            repo,
            tokens,
            versand,
            basis_url,
        )),
    };

    Ok(routes::auth_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state))
}

/// Wartet auf Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(fehler = %e, "Shutdown-Signal nicht verfuegbar");
        return;
    }
    tracing::info!("Shutdown-Signal empfangen");
}
