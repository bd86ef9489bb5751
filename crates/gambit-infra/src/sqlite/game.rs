//! SQLite game session repository implementation.
//!
//! Implements `SessionRepository` from `gambit-core` using sqlx with split
//! read/write pools: raw queries, a private Row struct, RFC3339 datetime
//! columns, full-replace writes.

use chrono::{DateTime, Utc};
use sqlx::Row;

use gambit_core::game::repository::SessionRepository;
use gambit_types::error::RepositoryError;
use gambit_types::game::GameSession;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `SessionRepository`.
pub struct SqliteGameRepository {
    pool: DatabasePool,
}

impl SqliteGameRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain GameSession.
struct GameRow {
    session_id: String,
    fen: String,
    record: String,
    started_at: String,
    updated_at: String,
}

impl GameRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            session_id: row.try_get("session_id")?,
            fen: row.try_get("fen")?,
            record: row.try_get("record")?,
            started_at: row.try_get("started_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_session(self) -> Result<GameSession, RepositoryError> {
        Ok(GameSession {
            session_id: self.session_id,
            fen: self.fen,
            record: self.record,
            started_at: parse_datetime(&self.started_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

impl SessionRepository for SqliteGameRepository {
    async fn load(&self, session_id: &str) -> Result<Option<GameSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM games WHERE session_id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let game_row =
                    GameRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(game_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, session: &GameSession) -> Result<(), RepositoryError> {
        // Full replace of any prior row under the id, never a partial update.
        sqlx::query(
            r#"INSERT INTO games (session_id, fen, record, started_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(session_id) DO UPDATE SET
                   fen = excluded.fen,
                   record = excluded.record,
                   started_at = excluded.started_at,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&session.session_id)
        .bind(&session.fen)
        .bind(&session.record)
        .bind(format_datetime(&session.started_at))
        .bind(format_datetime(&session.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}
