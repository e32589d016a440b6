//! Application state shared across request handlers.

use std::sync::Arc;

use pawscue_admin_session::{CookiePolicy, SessionAuthenticator, SessionError};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::db::{ReportStore, StoryStore};
use crate::geocode::Geocoder;

/// Admin sign-in material.
pub struct AdminAuth {
    sessions: SessionAuthenticator,
    cookies: CookiePolicy,
    password_digest: [u8; 32],
}

impl AdminAuth {
    pub fn new(cookie_secret: &str, password: &str, secure_cookies: bool) -> Result<Self, SessionError> {
        Ok(Self {
            sessions: SessionAuthenticator::new(cookie_secret)?,
            cookies: CookiePolicy::new(secure_cookies),
            password_digest: Sha256::digest(password.as_bytes()).into(),
        })
    }

    /// Constant-time comparison of SHA-256 digests.
    pub fn check_password(&self, candidate: &str) -> bool {
        let digest: [u8; 32] = Sha256::digest(candidate.as_bytes()).into();
        digest[..].ct_eq(&self.password_digest[..]).into()
    }

    pub fn sessions(&self) -> &SessionAuthenticator {
        &self.sessions
    }

    pub fn cookies(&self) -> &CookiePolicy {
        &self.cookies
    }
}

/// Shared application state.
///
/// This is passed to all request handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn ReportStore>,
    stories: Arc<dyn StoryStore>,
    admin: AdminAuth,
    geocoder: Option<Arc<dyn Geocoder>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ReportStore>,
        stories: Arc<dyn StoryStore>,
        admin: AdminAuth,
        geocoder: Option<Arc<dyn Geocoder>>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                stories,
                admin,
                geocoder,
            }),
        }
    }

    pub fn store(&self) -> &dyn ReportStore {
        self.inner.store.as_ref()
    }

    pub fn stories(&self) -> &dyn StoryStore {
        self.inner.stories.as_ref()
    }

    pub fn admin(&self) -> &AdminAuth {
        &self.inner.admin
    }

    /// `None` when no geocoding provider is configured.
    pub fn geocoder(&self) -> Option<&dyn Geocoder> {
        self.inner.geocoder.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_password() {
        let admin = AdminAuth::new("secret", "correct horse", false).unwrap();
        assert!(admin.check_password("correct horse"));
        assert!(!admin.check_password("correct horse "));
        assert!(!admin.check_password(""));
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(AdminAuth::new("", "pw", false).is_err());
    }
}
