//! REST-Handler fuer die Auth-Endpunkte
//!
//! Duenner Routing-Layer: bildet HTTP-Requests auf die Kern-Services ab
//! und AuthError-Werte auf HTTP-Statuscodes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;

use pfoertner_auth::{AuthError, AuthService, BestaetigungsService};
use pfoertner_db::SqliteDb;

/// Axum-State: die beiden Kern-Services
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService<SqliteDb>>,
    pub bestaetigung: Arc<BestaetigungsService<SqliteDb>>,
}

/// Bildet einen AuthError auf eine HTTP-Fehlerantwort ab
fn fehler_antwort(e: &AuthError) -> Response {
    (
        StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "error": e.to_string() })),
    )
        .into_response()
}

/// Extrahiert einen Bearer-Token aus den Request-Headern
fn token_aus_headers(headers: &HeaderMap) -> Result<&str, Response> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Authorization-Header fehlt" })),
            )
                .into_response()
        })
}

#[derive(Debug, Deserialize)]
pub struct RegistrierungsBody {
    pub email: String,
    pub username: String,
    pub password: String,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<RegistrierungsBody>,
) -> Response {
    match state
        .auth
        .registrieren(&body.email, &body.username, &body.password)
        .await
    {
        Ok(benutzer) => (
            StatusCode::CREATED,
            Json(json!({
                "user": {
                    "id": benutzer.id,
                    "email": benutzer.email,
                    "username": benutzer.username,
                },
                "detail": "Benutzer erfolgreich erstellt, bitte E-Mail bestaetigen",
            })),
        )
            .into_response(),
        Err(e) => fehler_antwort(&e),
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

pub async fn login(State(state): State<AppState>, Json(body): Json<LoginBody>) -> Response {
    match state.auth.anmelden(&body.email, &body.password).await {
        Ok(paar) => (StatusCode::OK, Json(paar)).into_response(),
        Err(e) => fehler_antwort(&e),
    }
}

pub async fn confirmed_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Response {
    match state.bestaetigung.bestaetigen(&token).await {
        Ok(antwort) => {
            (StatusCode::OK, Json(json!({ "message": antwort.nachricht() }))).into_response()
        }
        Err(e) => fehler_antwort(&e),
    }
}

#[derive(Debug, Deserialize)]
pub struct EmailBody {
    pub email: String,
}

pub async fn request_email(
    State(state): State<AppState>,
    Json(body): Json<EmailBody>,
) -> Response {
    match state.bestaetigung.anfordern(&body.email).await {
        Ok(antwort) => {
            (StatusCode::OK, Json(json!({ "message": antwort.nachricht() }))).into_response()
        }
        Err(e) => fehler_antwort(&e),
    }
}

pub async fn refresh_token(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = match token_aus_headers(&headers) {
        Ok(t) => t,
        Err(r) => return r,
    };
    match state.auth.erneuern(token).await {
        Ok(paar) => (StatusCode::OK, Json(paar)).into_response(),
        Err(e) => fehler_antwort(&e),
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = match token_aus_headers(&headers) {
        Ok(t) => t,
        Err(r) => return r,
    };
    match state.auth.abmelden(token).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => fehler_antwort(&e),
    }
}

pub async fn health() -> Response {
    (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
}
