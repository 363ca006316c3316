use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::Database;

const SESSION_KEY: &str = "session";
const SESSION_DAYS: i64 = 30;

// Demo account only; there is no user database behind the login.
pub const DEMO_EMAIL: &str = "admin@demo.com";
pub const DEMO_PASSWORD: &str = "password123";

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Not logged in. Run 'staffdeck login' first.")]
    NotLoggedIn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

pub fn authorize(email: &str, password: &str, now: DateTime<Utc>) -> Result<Session, AuthError> {
    if email.trim() == DEMO_EMAIL && password == DEMO_PASSWORD {
        Ok(Session {
            user_id: "1".to_string(),
            name: "Admin User".to_string(),
            email: DEMO_EMAIL.to_string(),
            expires_at: now + Duration::days(SESSION_DAYS),
        })
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

pub fn login(db: &Database, email: &str, password: &str) -> Result<Session> {
    let session = authorize(email, password, Utc::now())?;
    db.set_item(SESSION_KEY, &serde_json::to_string(&session)?)?;
    log::info!("Signed in as {}", session.email);
    Ok(session)
}

pub fn logout(db: &Database) -> Result<()> {
    db.remove_item(SESSION_KEY)
}

/// The stored session, if any and still valid at `now`.
pub fn current_session(db: &Database, now: DateTime<Utc>) -> Option<Session> {
    let raw = db.get_item(SESSION_KEY).ok().flatten()?;
    match serde_json::from_str::<Session>(&raw) {
        Ok(session) if !session.is_expired(now) => Some(session),
        Ok(_) => {
            log::info!("Stored session has expired");
            None
        }
        Err(e) => {
            log::warn!("Ignoring malformed session: {}", e);
            None
        }
    }
}

pub fn require_session(db: &Database) -> Result<Session, AuthError> {
    current_session(db, Utc::now()).ok_or(AuthError::NotLoggedIn)
}
