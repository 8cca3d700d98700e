//! Signed identity tokens: issued at login, verified on every request.
//!
//! A token is an HS256 JWT whose claims are `{username, exp, roles}`.
//! Verification is strict: bad signature, malformed payload, and expiry
//! all collapse to "no identity" — the caller never sees why.

use axum::http::{header, HeaderMap};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Cookie that carries the identity token.
pub const IDENTITY_COOKIE: &str = "identity_jwt";

/// Role required to mint new tokens via /token.
pub const TOKEN_CREATOR_ROLE: &str = "token_creator";

/// Lifetime of a minted (narrowed) token, in seconds.
pub const FIFTEEN_MINUTES: u64 = 15 * 60;

/// Decoded contents of a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaim {
    pub username: String,
    /// Expiry as a unix timestamp (seconds).
    pub exp: u64,
    /// Capability tags. Order carries no meaning.
    pub roles: Vec<String>,
}

impl IdentityClaim {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Issues and verifies identity tokens with the process-wide secret.
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenAuthority {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // A token is dead the second `exp` passes.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a claim for `username` expiring `ttl_secs` from now.
    pub fn issue(
        &self,
        username: &str,
        ttl_secs: u64,
        roles: Vec<String>,
    ) -> anyhow::Result<String> {
        self.issue_at(username, unix_now(), ttl_secs, roles)
    }

    pub(crate) fn issue_at(
        &self,
        username: &str,
        now: u64,
        ttl_secs: u64,
        roles: Vec<String>,
    ) -> anyhow::Result<String> {
        let claim = IdentityClaim {
            username: username.to_owned(),
            exp: now + ttl_secs,
            roles,
        };
        Ok(encode(&Header::default(), &claim, &self.encoding)?)
    }

    /// Verify signature and expiry. Every failure mode — tampered,
    /// malformed, expired, signed with another secret — yields `None`.
    pub fn verify(&self, token: &str) -> Option<IdentityClaim> {
        decode::<IdentityClaim>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .ok()
    }
}

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Pull the raw token out of a request: the `identity_jwt` cookie wins,
/// the `Authorization` header (with or without a `Bearer ` prefix) is the
/// fallback.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, IDENTITY_COOKIE).or_else(|| authorization_value(headers))
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
        .filter(|value| !value.is_empty())
}

fn authorization_value(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw);
    (!token.is_empty()).then(|| token.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn authority() -> TokenAuthority {
        TokenAuthority::new("some kind of secret")
    }

    #[test]
    fn issue_then_verify_round_trips() {
        let authority = authority();
        let issued_at = unix_now();
        let token = authority
            .issue("henrik", 3600, vec![TOKEN_CREATOR_ROLE.to_owned()])
            .unwrap();

        let claim = authority.verify(&token).expect("token should verify");
        assert_eq!(claim.username, "henrik");
        assert_eq!(claim.roles, vec![TOKEN_CREATOR_ROLE.to_owned()]);
        assert!(claim.exp.abs_diff(issued_at + 3600) <= 2);
    }

    #[test]
    fn empty_role_set_round_trips() {
        let authority = authority();
        let token = authority.issue("henrik", 900, Vec::new()).unwrap();
        let claim = authority.verify(&token).unwrap();
        assert!(claim.roles.is_empty());
        assert!(!claim.has_role(TOKEN_CREATOR_ROLE));
    }

    #[test]
    fn expired_token_yields_no_claim_every_time() {
        let authority = authority();
        let past = unix_now().saturating_sub(7200);
        let token = authority.issue_at("henrik", past, 3600, Vec::new()).unwrap();

        for _ in 0..3 {
            assert!(authority.verify(&token).is_none());
        }
    }

    #[test]
    fn tampered_token_yields_no_claim() {
        let authority = authority();
        let token = authority.issue("henrik", 3600, Vec::new()).unwrap();

        let mut tampered = token.clone();
        // Flip a character in the signature segment.
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(authority.verify(&tampered).is_none());
    }

    #[test]
    fn garbage_token_yields_no_claim() {
        assert!(authority().verify("not-a-token").is_none());
        assert!(authority().verify("").is_none());
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let other = TokenAuthority::new("a different secret");
        let token = other.issue("henrik", 3600, Vec::new()).unwrap();
        assert!(authority().verify(&token).is_none());
    }

    #[test]
    fn cookie_takes_precedence_over_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("identity_jwt=from-cookie"),
        );
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("from-header"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn authorization_header_is_the_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; identity_jwt=tok; lang=en"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("tok"));
    }

    #[test]
    fn empty_cookie_value_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("identity_jwt="));
        assert_eq!(token_from_headers(&headers), None);
    }
}
