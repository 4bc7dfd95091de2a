//! Cookie-backed session state for the web UI.
//!
//! Sessions live in an [`ExpiringMemoryStore`]; the browser only holds a
//! signed session id cookie. A session expires after the configured idle
//! time, and expired records are purged from the store.
//!
//! Only requests that put something into a session create a record. The
//! login form keeps its CSRF token in a cookie (see [`crate::web::csrf`]), so
//! anonymous visitors never occupy the store.
//!
//! # Stored Keys
//!
//! - `user` - [`SessionUser`] of the logged-in user
//! - `_flashes` - one-shot messages shown on the next rendered page

use axum::Router;
use sha2::{Digest, Sha512};
use std::time::Duration;
use tower_sessions::cookie::time::Duration as CookieDuration;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, Session, SessionManagerLayer};

use crate::domain::entities::SessionUser;
use crate::error::AppError;
use crate::infrastructure::ExpiringMemoryStore;

/// Name of the session id cookie.
pub const SESSION_COOKIE: &str = "tempus_session";

const USER_KEY: &str = "user";
const FLASH_KEY: &str = "_flashes";

/// Cookie settings for the session layer.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Key material; stretched to a 64-byte signing key.
    pub secret: String,
    /// Sets the `Secure` cookie attribute.
    pub secure: bool,
    /// Sessions expire after this long without a request.
    pub idle_timeout: Duration,
    /// Backing store; the caller owns the purge task (see
    /// [`ExpiringMemoryStore::spawn_reaper`]).
    pub store: ExpiringMemoryStore,
}

impl SessionSettings {
    /// Cookie signing key derived from the secret.
    pub fn signing_key(&self) -> Key {
        signing_key(&self.secret)
    }
}

/// Derives the cookie signing key from `secret`.
///
/// The key is the SHA-512 digest of the secret, which gives the 64 bytes the
/// cookie signer requires for any secret length.
pub fn signing_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

/// Wraps `router` with the session manager.
///
/// Sessions are saved on every request so the idle timeout counts from the
/// last request, not the last change.
pub fn with_sessions<S>(router: Router<S>, settings: &SessionSettings) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let idle = CookieDuration::try_from(settings.idle_timeout).unwrap_or(CookieDuration::WEEK);

    let layer = SessionManagerLayer::new(settings.store.clone())
        .with_name(SESSION_COOKIE)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(settings.secure)
        .with_expiry(Expiry::OnInactivity(idle))
        .with_always_save(true)
        .with_signed(settings.signing_key());

    router.layer(layer)
}

/// Returns the logged-in user, if any.
pub async fn current_user(session: &Session) -> Result<Option<SessionUser>, AppError> {
    Ok(session.get::<SessionUser>(USER_KEY).await?)
}

/// Stores `user` as the session record.
///
/// The session id is rotated first so an id issued before login cannot be
/// reused afterwards.
pub async fn sign_in(session: &Session, user: SessionUser) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(USER_KEY, user).await?;
    Ok(())
}

/// Clears all session state, whether or not anyone was logged in.
pub async fn sign_out(session: &Session) -> Result<(), AppError> {
    session.flush().await?;
    Ok(())
}

/// Queues a message for the next page that renders flashes.
pub async fn flash(session: &Session, message: impl Into<String>) -> Result<(), AppError> {
    let mut messages: Vec<String> = session.get(FLASH_KEY).await?.unwrap_or_default();
    messages.push(message.into());
    session.insert(FLASH_KEY, messages).await?;
    Ok(())
}

/// Removes and returns all pending flash messages.
pub async fn take_flashes(session: &Session) -> Result<Vec<String>, AppError> {
    Ok(session
        .remove::<Vec<String>>(FLASH_KEY)
        .await?
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn session() -> Session {
        Session::new(None, Arc::new(ExpiringMemoryStore::new()), None)
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let session = session();
        assert_eq!(current_user(&session).await.unwrap(), None);

        sign_in(&session, SessionUser::new("alice")).await.unwrap();
        assert_eq!(
            current_user(&session).await.unwrap(),
            Some(SessionUser::new("alice"))
        );

        sign_out(&session).await.unwrap();
        assert_eq!(current_user(&session).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_out_without_user() {
        let session = session();

        sign_out(&session).await.unwrap();
        assert_eq!(current_user(&session).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_flashes_are_taken_once() {
        let session = session();

        flash(&session, "first").await.unwrap();
        flash(&session, "second").await.unwrap();

        assert_eq!(take_flashes(&session).await.unwrap(), vec!["first", "second"]);
        assert!(take_flashes(&session).await.unwrap().is_empty());
    }
}
