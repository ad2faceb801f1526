use std::{sync::Arc, time::Duration};

use anyhow::Result;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rand_core::{OsRng, RngCore};
use rusqlite::{OptionalExtension, params};
use tokio::task;

use super::Session;

/// Server-side admin sessions. The cookie only carries the token.
pub struct Repository {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl Repository {
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn init_schema(&self) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS admin_sessions (
                token       TEXT PRIMARY KEY,
                created_at  INTEGER NOT NULL,
                expires_at  INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_admin_sessions_expires_at
                ON admin_sessions (expires_at);
            "#,
        )?;
        Ok(())
    }

    pub async fn create_session(&self, ttl: Duration) -> Result<Session> {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let conn = pool.get()?;

            let now = chrono::Utc::now().timestamp_millis();
            let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
            let session = Session {
                token: Self::generate_token(),
                created_at: now,
                expires_at: now.saturating_add(ttl_ms),
            };

            conn.execute(
                r#"
                INSERT INTO admin_sessions (token, created_at, expires_at)
                VALUES (?1, ?2, ?3)
                "#,
                params![session.token, session.created_at, session.expires_at],
            )?;
            Ok(session)
        })
        .await?
    }

    /// Returns the session only while it has not expired.
    pub async fn find_session(&self, token: &str) -> Result<Option<Session>> {
        let pool = self.pool.clone();
        let token = token.to_owned();
        task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.query_row(
                r#"
                SELECT token, created_at, expires_at
                FROM admin_sessions
                WHERE token = ?1 AND expires_at > ?2
                "#,
                params![token, chrono::Utc::now().timestamp_millis()],
                |row| {
                    Ok(Session {
                        token: row.get(0)?,
                        created_at: row.get(1)?,
                        expires_at: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
        })
        .await?
    }

    pub async fn delete_session(&self, token: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let token = token.to_owned();
        task::spawn_blocking(move || {
            let conn = pool.get()?;
            let n = conn.execute("DELETE FROM admin_sessions WHERE token = ?1", params![token])?;
            Ok(n == 1)
        })
        .await?
    }

    pub async fn purge_expired_sessions(&self) -> Result<usize> {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let conn = pool.get()?;
            let n = conn.execute(
                "DELETE FROM admin_sessions WHERE expires_at <= ?1",
                params![chrono::Utc::now().timestamp_millis()],
            )?;
            Ok(n)
        })
        .await?
    }

    pub async fn count_active_sessions(&self) -> Result<usize> {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let conn = pool.get()?;
            let n: usize = conn.query_row(
                "SELECT COUNT(*) FROM admin_sessions WHERE expires_at > ?1",
                params![chrono::Utc::now().timestamp_millis()],
                |r| r.get(0),
            )?;
            Ok(n)
        })
        .await?
    }

    /// 32 bytes from the OS RNG, hex encoded.
    fn generate_token() -> String {
        let mut raw = [0u8; 32];
        OsRng.fill_bytes(&mut raw);
        hex::encode(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(dir: &tempfile::TempDir) -> Repository {
        let manager = SqliteConnectionManager::file(dir.path().join("sessions.db"));
        let pool = Pool::builder().max_size(2).build(manager).unwrap();
        let repo = Repository::new(pool);
        repo.init_schema().unwrap();
        repo
    }

    #[tokio::test]
    async fn created_session_can_be_found_until_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);

        let session = repo.create_session(Duration::from_secs(60)).await.unwrap();
        assert_eq!(session.token.len(), 64);
        assert!(session.expires_at > session.created_at);

        let found = repo.find_session(&session.token).await.unwrap();
        assert_eq!(found, Some(session.clone()));
        assert_eq!(repo.count_active_sessions().await.unwrap(), 1);

        assert!(repo.delete_session(&session.token).await.unwrap());
        assert!(!repo.delete_session(&session.token).await.unwrap());
        assert_eq!(repo.find_session(&session.token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_sessions_are_invisible_and_purged() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);

        let stale = repo.create_session(Duration::ZERO).await.unwrap();
        let live = repo.create_session(Duration::from_secs(60)).await.unwrap();

        assert_eq!(repo.find_session(&stale.token).await.unwrap(), None);
        assert_eq!(repo.count_active_sessions().await.unwrap(), 1);

        assert_eq!(repo.purge_expired_sessions().await.unwrap(), 1);
        assert!(repo.find_session(&live.token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn huge_ttl_saturates_instead_of_expiring() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);

        let session = repo.create_session(Duration::MAX).await.unwrap();

        assert_eq!(session.expires_at, i64::MAX);
        assert!(repo.find_session(&session.token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn tokens_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);

        let a = repo.create_session(Duration::from_secs(60)).await.unwrap();
        let b = repo.create_session(Duration::from_secs(60)).await.unwrap();
        assert_ne!(a.token, b.token);
        assert_eq!(repo.find_session("unknown").await.unwrap(), None);
    }
}
