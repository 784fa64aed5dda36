//! SQLite-Implementierung des UserRepository

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{BenutzerRecord, NeuerBenutzer};
use crate::repository::UserRepository;
use crate::sqlite::pool::SqliteDb;

impl UserRepository for SqliteDb {
    async fn get_by_email(&self, email: &str) -> DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(
            "SELECT id, email, username, password_hash, confirmed, refresh_token, created_at
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO users (id, email, username, password_hash, confirmed, created_at)
             VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(id.to_string())
        .bind(data.email)
        .bind(data.username)
        .bind(data.password_hash)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE") || msg.contains("unique") {
                DbError::Eindeutigkeit(format!("E-Mail '{}' bereits registriert", data.email))
            } else {
                DbError::Sqlx(e)
            }
        })?;

        Ok(BenutzerRecord {
            id,
            email: data.email.to_string(),
            username: data.username.to_string(),
            password_hash: data.password_hash.to_string(),
            confirmed: false,
            refresh_token: None,
            created_at: now,
        })
    }

    async fn update_refresh_token(&self, id: Uuid, token: Option<&str>) -> DbResult<()> {
        let ergebnis = sqlx::query("UPDATE users SET refresh_token = ? WHERE id = ?")
            .bind(token)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if ergebnis.rows_affected() == 0 {
            return Err(DbError::nicht_gefunden(id.to_string()));
        }
        Ok(())
    }

    async fn set_confirmed(&self, email: &str) -> DbResult<()> {
        let ergebnis = sqlx::query("UPDATE users SET confirmed = 1 WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await?;

        if ergebnis.rows_affected() == 0 {
            return Err(DbError::nicht_gefunden(email.to_string()));
        }
        Ok(())
    }
}

/// Konvertiert eine SQLite-Zeile in einen BenutzerRecord
fn row_to_benutzer(row: &sqlx::sqlite::SqliteRow) -> DbResult<BenutzerRecord> {
    let id_str: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DbError::UngueltigeDaten(format!("Ungueltige UUID '{id_str}': {e}")))?;

    let created_str: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_str)
        .map_err(|e| DbError::UngueltigeDaten(format!("Ungueltiges Datum '{created_str}': {e}")))?
        .with_timezone(&Utc);

    Ok(BenutzerRecord {
        id,
        email: row.try_get("email")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        confirmed: row.try_get::<i64, _>("confirmed")? != 0,
        refresh_token: row.try_get("refresh_token")?,
        created_at,
    })
}
