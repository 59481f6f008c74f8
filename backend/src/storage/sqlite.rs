use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::pending::{mint_token, token_digest};
use crate::models::account::AdapterAccount;
use crate::models::interval::TimeInterval;
use crate::models::session::{AdapterSession, SessionAndUser};
use crate::models::user::{AdapterUser, UserProfile};

/// SQLite-backed store for users, accounts, sessions, availability intervals
/// and pending-signup tokens.
///
/// Correctness under concurrent writers relies on the schema's uniqueness
/// constraints (session-token primary key, composite account key), not on
/// application-level locking.
pub struct Store {
    conn: Mutex<Connection>,
    pending_ttl: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Record not found")]
    NotFound,
    #[error("Pending signup identity missing or already consumed")]
    MissingPendingIdentity,
    #[error("Uniqueness constraint violated")]
    UniquenessViolation,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::UniquenessViolation
            }
            _ => StoreError::Database(e.to_string()),
        }
    }
}

impl Store {
    pub fn new(database_url: &str, pending_ttl: Duration) -> Result<Self, StoreError> {
        // Parse sqlite: prefix if present
        let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);

        // Create parent directories if needed
        if path != ":memory:" {
            if let Some(parent) = Path::new(path).parent() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                username TEXT NOT NULL UNIQUE,
                email TEXT UNIQUE,
                avatar_url TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                type TEXT NOT NULL,
                provider TEXT NOT NULL,
                provider_account_id TEXT NOT NULL,
                refresh_token TEXT,
                access_token TEXT,
                expires_at INTEGER,
                token_type TEXT,
                scope TEXT,
                id_token TEXT,
                session_state TEXT,
                FOREIGN KEY (user_id) REFERENCES users(id),
                UNIQUE (provider, provider_account_id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                session_token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                expires TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS user_time_intervals (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                week_day INTEGER NOT NULL,
                time_start_in_minutes INTEGER NOT NULL,
                time_end_in_minutes INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS pending_signups (
                token_hash TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_intervals_user_id
             ON user_time_intervals(user_id)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_accounts_user_id ON accounts(user_id)",
            [],
        )?;

        tracing::info!("Store initialized with database: {}", path);

        Ok(Self {
            conn: Mutex::new(conn),
            pending_ttl,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Create the pre-signup user row claimed from the public username form.
    ///
    /// The profile fields stay empty until the identity provider confirms
    /// them through `create_user`.
    pub fn create_pre_signup_user(
        &self,
        name: &str,
        username: &str,
    ) -> Result<AdapterUser, StoreError> {
        let conn = self.conn()?;
        let id = uuid::Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO users (id, name, username, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, name, username, Utc::now().to_rfc3339()],
        )?;

        tracing::info!("Claimed username: {} ({})", username, id);

        Ok(AdapterUser {
            id,
            name: name.to_string(),
            username: username.to_string(),
            email: None,
            avatar_url: None,
        })
    }

    pub fn find_user_by_username(&self, username: &str) -> Result<Option<AdapterUser>, StoreError> {
        let conn = self.conn()?;
        query_user(
            &conn,
            "SELECT id, name, username, email, avatar_url FROM users WHERE username = ?1",
            params![username],
        )
    }

    /// Mint a single-use pending-signup token for a pre-created user.
    ///
    /// Only the SHA-256 digest is stored; the raw token goes to the client.
    pub fn issue_pending_signup(&self, user_id: &str) -> Result<String, StoreError> {
        let conn = self.conn()?;
        let token = mint_token();

        conn.execute(
            "INSERT INTO pending_signups (token_hash, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![token_digest(&token), user_id, Utc::now().to_rfc3339()],
        )?;

        Ok(token)
    }

    /// Resolve a pending-signup token and delete it in one step. Absent,
    /// already-consumed and expired tokens all behave identically.
    fn consume_pending_signup(&self, conn: &Connection, token: &str) -> Result<String, StoreError> {
        let digest = token_digest(token);

        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT user_id, created_at FROM pending_signups WHERE token_hash = ?1",
                params![digest],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((user_id, created_at)) = row else {
            return Err(StoreError::MissingPendingIdentity);
        };

        conn.execute(
            "DELETE FROM pending_signups WHERE token_hash = ?1",
            params![digest],
        )?;

        let created = parse_instant(&created_at)?;
        if created + self.pending_ttl < Utc::now() {
            return Err(StoreError::MissingPendingIdentity);
        }

        Ok(user_id)
    }

    /// Store one availability window row per interval.
    pub fn insert_time_intervals(
        &self,
        user_id: &str,
        intervals: &[TimeInterval],
    ) -> Result<(), StoreError> {
        let conn = self.conn()?;

        for interval in intervals {
            conn.execute(
                "INSERT INTO user_time_intervals
                 (id, user_id, week_day, time_start_in_minutes, time_end_in_minutes)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    uuid::Uuid::new_v4().to_string(),
                    user_id,
                    interval.week_day,
                    interval.start_time_in_minutes,
                    interval.end_time_in_minutes,
                ],
            )?;
        }

        tracing::debug!("Stored {} time intervals for user {}", intervals.len(), user_id);
        Ok(())
    }

    /// Weekdays with no availability interval at all for `username`.
    ///
    /// Returns `None` when the username is unknown: callers must distinguish
    /// a missing user from a user with every weekday available.
    pub fn blocked_week_days(&self, username: &str) -> Result<Option<BTreeSet<u32>>, StoreError> {
        let conn = self.conn()?;

        let user_id: Option<String> = conn
            .query_row(
                "SELECT id FROM users WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()?;

        let Some(user_id) = user_id else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT DISTINCT week_day FROM user_time_intervals WHERE user_id = ?1",
        )?;
        let available: BTreeSet<u32> = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<Result<_, _>>()?;

        Ok(Some((0..7).filter(|d| !available.contains(d)).collect()))
    }

    // Identity-adapter operations, sync internals. The async trait in
    // auth::adapter wraps these.

    pub(crate) fn create_user_sync(
        &self,
        pending_token: Option<&str>,
        profile: &UserProfile,
    ) -> Result<AdapterUser, StoreError> {
        let Some(token) = pending_token else {
            return Err(StoreError::MissingPendingIdentity);
        };

        let conn = self.conn()?;
        let user_id = self.consume_pending_signup(&conn, token)?;

        let changed = conn.execute(
            "UPDATE users SET name = ?1, email = ?2, avatar_url = ?3 WHERE id = ?4",
            params![profile.name, profile.email, profile.avatar_url, user_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::info!("Finalized signup for user {}", user_id);

        query_user(
            &conn,
            "SELECT id, name, username, email, avatar_url FROM users WHERE id = ?1",
            params![user_id],
        )?
        .ok_or(StoreError::NotFound)
    }

    pub(crate) fn get_user_sync(&self, id: &str) -> Result<Option<AdapterUser>, StoreError> {
        let conn = self.conn()?;
        query_user(
            &conn,
            "SELECT id, name, username, email, avatar_url FROM users WHERE id = ?1",
            params![id],
        )
    }

    pub(crate) fn get_user_by_email_sync(
        &self,
        email: &str,
    ) -> Result<Option<AdapterUser>, StoreError> {
        let conn = self.conn()?;
        query_user(
            &conn,
            "SELECT id, name, username, email, avatar_url FROM users WHERE email = ?1",
            params![email],
        )
    }

    pub(crate) fn get_user_by_account_sync(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<AdapterUser>, StoreError> {
        let conn = self.conn()?;
        query_user(
            &conn,
            "SELECT u.id, u.name, u.username, u.email, u.avatar_url
             FROM accounts a JOIN users u ON u.id = a.user_id
             WHERE a.provider = ?1 AND a.provider_account_id = ?2",
            params![provider, provider_account_id],
        )
    }

    pub(crate) fn update_user_sync(
        &self,
        id: &str,
        profile: &UserProfile,
    ) -> Result<AdapterUser, StoreError> {
        let conn = self.conn()?;

        let changed = conn.execute(
            "UPDATE users SET name = ?1, email = ?2, avatar_url = ?3 WHERE id = ?4",
            params![profile.name, profile.email, profile.avatar_url, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }

        query_user(
            &conn,
            "SELECT id, name, username, email, avatar_url FROM users WHERE id = ?1",
            params![id],
        )?
        .ok_or(StoreError::NotFound)
    }

    pub(crate) fn link_account_sync(&self, account: &AdapterAccount) -> Result<(), StoreError> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO accounts
             (id, user_id, type, provider, provider_account_id, refresh_token,
              access_token, expires_at, token_type, scope, id_token, session_state)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                uuid::Uuid::new_v4().to_string(),
                account.user_id,
                account.account_type,
                account.provider,
                account.provider_account_id,
                account.refresh_token,
                account.access_token,
                account.expires_at,
                account.token_type,
                account.scope,
                account.id_token,
                account.session_state,
            ],
        )?;

        Ok(())
    }

    pub(crate) fn create_session_sync(
        &self,
        session: &AdapterSession,
    ) -> Result<AdapterSession, StoreError> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO sessions (session_token, user_id, expires) VALUES (?1, ?2, ?3)",
            params![
                session.session_token,
                session.user_id,
                session.expires.to_rfc3339(),
            ],
        )?;

        Ok(session.clone())
    }

    pub(crate) fn get_session_and_user_sync(
        &self,
        session_token: &str,
    ) -> Result<Option<SessionAndUser>, StoreError> {
        let conn = self.conn()?;

        let row: Option<(String, String, String, String, Option<String>, Option<String>)> = conn
            .query_row(
                "SELECT s.user_id, s.expires, u.name, u.username, u.email, u.avatar_url
                 FROM sessions s JOIN users u ON u.id = s.user_id
                 WHERE s.session_token = ?1",
                params![session_token],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((user_id, expires, name, username, email, avatar_url)) = row else {
            return Ok(None);
        };

        Ok(Some(SessionAndUser {
            session: AdapterSession {
                session_token: session_token.to_string(),
                user_id: user_id.clone(),
                expires: parse_instant(&expires)?,
            },
            user: AdapterUser {
                id: user_id,
                name,
                username,
                email,
                avatar_url,
            },
        }))
    }

    pub(crate) fn update_session_sync(
        &self,
        session: &AdapterSession,
    ) -> Result<AdapterSession, StoreError> {
        let conn = self.conn()?;

        let changed = conn.execute(
            "UPDATE sessions SET user_id = ?1, expires = ?2 WHERE session_token = ?3",
            params![
                session.user_id,
                session.expires.to_rfc3339(),
                session.session_token,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(session.clone())
    }

    pub(crate) fn delete_session_sync(&self, session_token: &str) -> Result<(), StoreError> {
        let conn = self.conn()?;

        // Deleting an absent session is not an error.
        conn.execute(
            "DELETE FROM sessions WHERE session_token = ?1",
            params![session_token],
        )?;

        Ok(())
    }
}

fn query_user(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Option<AdapterUser>, StoreError> {
    let user = conn
        .query_row(sql, params, |row| {
            Ok(AdapterUser {
                id: row.get(0)?,
                name: row.get(1)?,
                username: row.get(2)?,
                email: row.get(3)?,
                avatar_url: row.get(4)?,
            })
        })
        .optional()?;
    Ok(user)
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Database(e.to_string()))
}
