//! The `admin_session` cookie contract.

use std::fmt;

use crate::MAX_AGE_SECONDS;

/// Name of the session cookie.
pub const COOKIE_NAME: &str = "admin_session";

/// A `Set-Cookie` instruction for the session cookie.
///
/// Always `HttpOnly`, `SameSite=Lax` and `Path=/`. `Secure` is added when the
/// policy says so (production deployments).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub value: String,
    pub max_age_seconds: i64,
    pub secure: bool,
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{COOKIE_NAME}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.value, self.max_age_seconds
        )?;
        if self.secure {
            f.write_str("; Secure")?;
        }
        Ok(())
    }
}

/// Cookie attributes that depend on the deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Cookie carrying a freshly issued token, valid for the full session window.
    pub fn session(&self, token: impl Into<String>) -> SetCookie {
        SetCookie {
            value: token.into(),
            max_age_seconds: MAX_AGE_SECONDS,
            secure: self.secure,
        }
    }

    /// Overwrite instruction that makes the client drop the cookie.
    ///
    /// This does not invalidate the token itself; a copy of it remains valid
    /// until it ages out.
    pub fn revoke(&self) -> SetCookie {
        SetCookie {
            value: String::new(),
            max_age_seconds: 0,
            secure: self.secure,
        }
    }
}

/// Extracts the session token from a `Cookie` request header value.
///
/// Returns `None` when the cookie is absent or empty.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = CookiePolicy::new(false).session("abc.def");
        assert_eq!(
            cookie.to_string(),
            "admin_session=abc.def; Path=/; Max-Age=604800; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn test_secure_flag_in_production() {
        let cookie = CookiePolicy::new(true).session("abc.def");
        assert!(cookie.to_string().ends_with("; Secure"));
    }

    #[test]
    fn test_revoke_cookie() {
        let cookie = CookiePolicy::new(true).revoke();
        assert_eq!(cookie.value, "");
        assert_eq!(cookie.max_age_seconds, 0);
        assert_eq!(
            cookie.to_string(),
            "admin_session=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax; Secure"
        );
    }

    #[test]
    fn test_token_from_cookie_header() {
        assert_eq!(
            token_from_cookie_header("theme=dark; admin_session=abc.def; lang=en"),
            Some("abc.def")
        );
        assert_eq!(token_from_cookie_header("admin_session=abc.def"), Some("abc.def"));
        assert_eq!(token_from_cookie_header("admin_session="), None);
        assert_eq!(token_from_cookie_header("theme=dark"), None);
        assert_eq!(token_from_cookie_header(""), None);
        assert_eq!(token_from_cookie_header("xadmin_session=abc"), None);
    }
}
