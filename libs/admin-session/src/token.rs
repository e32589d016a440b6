//! Signed session token issue and verification.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::SessionError;

type HmacSha256 = Hmac<Sha256>;

/// Environment variable holding the signing secret.
pub const SECRET_ENV_VAR: &str = "ADMIN_COOKIE_SECRET";

/// Validity window of a session, in seconds (7 days).
pub const MAX_AGE_SECONDS: i64 = 60 * 60 * 24 * 7;

/// Validity window of a session, in milliseconds.
pub const MAX_AGE_MILLIS: i64 = MAX_AGE_SECONDS * 1000;

const SEPARATOR: char = '.';

#[derive(Debug, Serialize, Deserialize)]
struct SessionPayload {
    admin: bool,
    ts: i64,
}

/// Issues and verifies admin session tokens.
///
/// A token is `base64url(json) + "." + hex(hmac_sha256(secret, base64url(json)))`.
/// Nothing is stored server-side; a token stays valid until its age exceeds
/// [`MAX_AGE_MILLIS`] or the client drops the cookie.
#[derive(Clone)]
pub struct SessionAuthenticator {
    mac: HmacSha256,
}

impl SessionAuthenticator {
    /// Creates an authenticator keyed with `secret`.
    pub fn new(secret: &str) -> Result<Self, SessionError> {
        if secret.is_empty() {
            return Err(SessionError::MissingSecret(SECRET_ENV_VAR));
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| SessionError::InvalidSecret)?;
        Ok(Self { mac })
    }

    /// Issues a token stamped with `now`.
    pub fn issue(&self, now: DateTime<Utc>) -> String {
        let payload = SessionPayload {
            admin: true,
            ts: now.timestamp_millis(),
        };
        // A struct of a bool and an i64 always serializes.
        let json = serde_json::to_vec(&payload).unwrap_or_default();
        let encoded = URL_SAFE_NO_PAD.encode(json);
        let signature = self.sign(&encoded);
        format!("{encoded}{SEPARATOR}{signature}")
    }

    /// Returns true iff `token` is well formed, correctly signed, grants
    /// admin, and was issued no more than [`MAX_AGE_MILLIS`] before `now`.
    ///
    /// Fails closed: every malformed or expired token is simply `false`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> bool {
        let Some((payload, signature)) = token.split_once(SEPARATOR) else {
            return false;
        };
        if payload.is_empty() || signature.is_empty() {
            return false;
        }

        let expected = self.sign(payload);
        if !constant_time_eq(signature.as_bytes(), expected.as_bytes()) {
            return false;
        }

        let Some(decoded) = decode_payload(payload) else {
            return false;
        };
        if !decoded.admin {
            return false;
        }

        match now.timestamp_millis().checked_sub(decoded.ts) {
            Some(age) => (0..=MAX_AGE_MILLIS).contains(&age),
            None => false,
        }
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl std::fmt::Debug for SessionAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuthenticator")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

fn decode_payload(payload: &str) -> Option<SessionPayload> {
    let raw = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&raw).ok()
}

/// Length mismatch returns early; equal-length inputs are compared without
/// data-dependent branches.
fn constant_time_eq(provided: &[u8], expected: &[u8]) -> bool {
    if provided.len() != expected.len() {
        return false;
    }
    provided.ct_eq(expected).into()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    use super::*;

    fn authenticator() -> SessionAuthenticator {
        SessionAuthenticator::new("test-secret").unwrap()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    fn signed(auth: &SessionAuthenticator, json: &str) -> String {
        let encoded = URL_SAFE_NO_PAD.encode(json);
        format!("{encoded}.{}", auth.sign(&encoded))
    }

    #[test]
    fn test_issue_then_verify() {
        let auth = authenticator();
        let now = fixed_now();
        let token = auth.issue(now);
        assert!(auth.verify(&token, now));
    }

    #[test]
    fn test_token_shape() {
        let auth = authenticator();
        let token = auth.issue(fixed_now());
        let (payload, signature) = token.split_once('.').unwrap();

        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));

        let json: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
        assert_eq!(json["admin"], true);
        assert_eq!(json["ts"], fixed_now().timestamp_millis());
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        assert_eq!(
            SessionAuthenticator::new("").unwrap_err(),
            SessionError::MissingSecret(SECRET_ENV_VAR)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = authenticator().issue(fixed_now());
        let other = SessionAuthenticator::new("another-secret").unwrap();
        assert!(!other.verify(&token, fixed_now()));
    }

    #[test]
    fn test_every_signature_mutation_rejected() {
        let auth = authenticator();
        let now = fixed_now();
        let token = auth.issue(now);
        let split = token.find('.').unwrap() + 1;

        for i in split..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'0' { b'1' } else { b'0' };
            let mutated = String::from_utf8(bytes).unwrap();
            assert!(!auth.verify(&mutated, now), "mutation at {i} accepted");
        }
    }

    #[test]
    fn test_payload_mutation_rejected() {
        let auth = authenticator();
        let now = fixed_now();
        let token = auth.issue(now);
        let forged = token.replacen('e', "f", 1);
        assert!(!auth.verify(&forged, now));
    }

    #[test]
    fn test_age_boundary() {
        let auth = authenticator();
        let now = fixed_now();

        let at_limit = auth.issue(now - Duration::milliseconds(MAX_AGE_MILLIS));
        assert!(auth.verify(&at_limit, now));

        let past_limit = auth.issue(now - Duration::milliseconds(MAX_AGE_MILLIS + 1));
        assert!(!auth.verify(&past_limit, now));
    }

    #[test]
    fn test_future_timestamp_rejected() {
        let auth = authenticator();
        let now = fixed_now();
        let token = auth.issue(now + Duration::milliseconds(1));
        assert!(!auth.verify(&token, now));
    }

    #[test]
    fn test_admin_false_rejected() {
        let auth = authenticator();
        let now = fixed_now();
        let token = signed(
            &auth,
            &format!(r#"{{"admin":false,"ts":{}}}"#, now.timestamp_millis()),
        );
        assert!(!auth.verify(&token, now));
    }

    #[rstest]
    #[case("not json")]
    #[case("{}")]
    #[case(r#"{"admin":true}"#)]
    #[case(r#"{"admin":"true","ts":0}"#)]
    #[case(r#"{"admin":true,"ts":"soon"}"#)]
    fn test_signed_but_malformed_payload_rejected(#[case] json: &str) {
        let auth = authenticator();
        assert!(!auth.verify(&signed(&auth, json), fixed_now()));
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("no-separator-here")]
    #[case("payload.")]
    #[case(".signature")]
    #[case("!!!not-base64!!!.deadbeef")]
    fn test_malformed_tokens_rejected(#[case] token: &str) {
        assert!(!authenticator().verify(token, fixed_now()));
    }

    #[test]
    fn test_signature_length_mismatch_rejected() {
        let auth = authenticator();
        let now = fixed_now();
        let token = auth.issue(now);
        assert!(!auth.verify(&format!("{token}0"), now));
        assert!(!auth.verify(&token[..token.len() - 1], now));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", authenticator());
        assert!(!rendered.contains("test-secret"));
    }
}
