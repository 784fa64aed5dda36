//! Route-Definitionen fuer die REST-API (/auth/...)

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{self, AppState};

/// Erstellt den vollstaendigen Auth-Router
pub fn auth_router() -> Router<AppState> {
    Router::new()
        // Konto
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        // Bestaetigung
        .route("/auth/confirmed_email/:token", get(handlers::confirmed_email))
        .route("/auth/request_email", post(handlers::request_email))
        // Token-Rotation
        .route("/auth/refresh_token", get(handlers::refresh_token))
        // Health
        .route("/health", get(handlers::health))
}
