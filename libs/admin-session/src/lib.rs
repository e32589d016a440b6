//! Admin session tokens.
//!
//! Stateless proof that a request comes from a signed-in admin. The token
//! lives in the `admin_session` cookie and is verified with an HMAC-SHA256
//! signature and a 7 day age window; there is no server-side session table.
//!
//! # Lifecycle
//!
//! ```text
//! issue() -> Valid --(age > 7 days)--> Expired
//!              \----(logout cookie)--> Revoked
//! ```
//!
//! Neither terminal state leads back to `Valid`; signing in again issues a
//! new token.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use pawscue_admin_session::SessionAuthenticator;
//!
//! let auth = SessionAuthenticator::new("s3cret").unwrap();
//! let token = auth.issue(Utc::now());
//! assert!(auth.verify(&token, Utc::now()));
//! assert!(!auth.verify("garbage", Utc::now()));
//! ```

mod cookie;
mod error;
mod token;

pub use cookie::{token_from_cookie_header, CookiePolicy, SetCookie, COOKIE_NAME};
pub use error::SessionError;
pub use token::{SessionAuthenticator, MAX_AGE_MILLIS, MAX_AGE_SECONDS, SECRET_ENV_VAR};
