//! Session holder: the bearer token in memory plus its persisted copy.
//!
//! The session is an explicit object owned by the application and lent to
//! whatever needs the token. "Token present" means "authenticated"; no
//! expiry check happens client-side beyond the storage lifetime, so an
//! expired token is only discovered when an API call is rejected.

use crate::storage::Database;
use anyhow::{Context, Result};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

/// Name of the persisted row holding the token.
pub const TOKEN_COOKIE: &str = "token";

/// How long a persisted token survives (one week).
pub const SESSION_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24 * 7);

pub struct Session {
    token: Option<SecretString>,
    store: Database,
}

impl Session {
    /// Initialize from the persisted store, if a live token is there.
    pub async fn restore(store: Database) -> Result<Self> {
        let now = Utc::now().timestamp();
        let token = store
            .get_cookie(TOKEN_COOKIE, now)
            .await
            .context("Failed to read persisted session")?
            .map(|cookie| SecretString::from(cookie.value));

        if token.is_some() {
            tracing::info!("Restored persisted session");
        } else {
            tracing::debug!("No persisted session");
        }
        Ok(Self { token, store })
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Hold `token` in memory and persist it for [`SESSION_LIFETIME`].
    ///
    /// The in-memory token is set even if persisting fails; the error is
    /// returned so the caller can tell the user the login won't survive a restart.
    pub async fn login(&mut self, token: SecretString) -> Result<()> {
        let expires_at = Utc::now().timestamp() + SESSION_LIFETIME.as_secs() as i64;
        let persisted = self
            .store
            .set_cookie(TOKEN_COOKIE, token.expose_secret(), expires_at)
            .await
            .context("Failed to persist session");
        self.token = Some(token);
        tracing::info!(expires_at, "Session started");
        persisted
    }

    /// Drop the token from memory and from the store.
    pub async fn logout(&mut self) -> Result<()> {
        self.token = None;
        self.store
            .remove_cookie(TOKEN_COOKIE)
            .await
            .context("Failed to clear persisted session")?;
        tracing::info!("Session ended");
        Ok(())
    }
}

/// Never print the token.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_session() -> Session {
        let db = Database::open(":memory:").await.unwrap();
        Session::restore(db).await.unwrap()
    }

    #[tokio::test]
    async fn test_fresh_session_is_anonymous() {
        let session = test_session().await;
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }

    #[tokio::test]
    async fn test_login_sets_token_and_persists() {
        let mut session = test_session().await;
        session
            .login(SecretString::from("tok".to_string()))
            .await
            .unwrap();

        assert!(session.is_authenticated());
        assert_eq!(session.token().unwrap().expose_secret(), "tok");

        let cookie = session
            .store
            .get_cookie(TOKEN_COOKIE, Utc::now().timestamp())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cookie.value, "tok");
        let week = SESSION_LIFETIME.as_secs() as i64;
        let remaining = cookie.expires_at - Utc::now().timestamp();
        assert!(remaining > week - 60 && remaining <= week);
    }

    #[tokio::test]
    async fn test_logout_clears_memory_and_store() {
        let mut session = test_session().await;
        session
            .login(SecretString::from("tok".to_string()))
            .await
            .unwrap();
        session.logout().await.unwrap();

        assert!(!session.is_authenticated());
        assert!(session
            .store
            .get_cookie(TOKEN_COOKIE, 0)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_restore_ignores_expired_cookie() {
        let db = Database::open(":memory:").await.unwrap();
        db.set_cookie(TOKEN_COOKIE, "stale", Utc::now().timestamp() - 1)
            .await
            .unwrap();

        let session = Session::restore(db).await.unwrap();
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_debug_masks_token() {
        let mut session = test_session().await;
        session
            .login(SecretString::from("super-secret-token".to_string()))
            .await
            .unwrap();

        let debug_output = format!("{:?}", session);
        assert!(!debug_output.contains("super-secret-token"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
