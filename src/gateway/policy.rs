//! The access gate: transport, authentication, and authorization policies
//! composed in a fixed order in front of every protected handler.
//!
//! Pipeline per request: transport check → identity check (where the route
//! demands it) → role check (token minting only) → handler. Each policy is
//! a plain method so it can be tested without a running server.

use std::sync::Arc;

use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};

use crate::auth::{token::token_from_headers, IdentityClaim, TokenAuthority};

use super::pages;

/// Certificate-authority verification path, always reachable over plain
/// HTTP so certificate renewal cannot lock itself out.
pub const ACME_CHALLENGE_PREFIX: &str = "/.well-known/acme-challenge/";

/// Outcome of the transport policy for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportDecision {
    Proceed,
    /// GET over plain HTTP: send the client to the HTTPS equivalent.
    RedirectTo(String),
    /// POST over plain HTTP: bodies cannot be replayed across a redirect,
    /// so the request is terminal.
    Reject,
}

/// Composed request-time policy. Owns no data; reads the verifier and the
/// transport flag from immutable configuration.
pub struct AccessGate {
    https_required: bool,
    tokens: Option<Arc<TokenAuthority>>,
}

impl AccessGate {
    pub fn new(https_required: bool, tokens: Option<Arc<TokenAuthority>>) -> Self {
        Self {
            https_required,
            tokens,
        }
    }

    /// Transport policy. Trusts the `X-Forwarded-Proto` header set by the
    /// fronting proxy.
    pub fn check_transport(
        &self,
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
    ) -> TransportDecision {
        if !self.https_required || uri.path().starts_with(ACME_CHALLENGE_PREFIX) {
            return TransportDecision::Proceed;
        }

        let proto = headers
            .get("X-Forwarded-Proto")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if proto == "https" {
            return TransportDecision::Proceed;
        }

        if *method == Method::GET || *method == Method::HEAD {
            let Some(host) = headers.get(header::HOST).and_then(|v| v.to_str().ok()) else {
                return TransportDecision::Reject;
            };
            let path_and_query = uri
                .path_and_query()
                .map_or_else(|| uri.path(), |pq| pq.as_str());
            return TransportDecision::RedirectTo(format!("https://{host}{path_and_query}"));
        }

        TransportDecision::Reject
    }

    /// The request's identity claim, if it carries a valid token.
    pub fn identity(&self, headers: &HeaderMap) -> Option<IdentityClaim> {
        let tokens = self.tokens.as_ref()?;
        let token = token_from_headers(headers)?;
        tokens.verify(&token)
    }

    /// Authentication policy: a protected route needs a verified claim;
    /// without one the client is sent to the login form, carrying the
    /// original URL so it lands back here afterwards.
    pub fn require_identity(
        &self,
        headers: &HeaderMap,
        original_uri: &Uri,
    ) -> Result<IdentityClaim, Response> {
        self.identity(headers)
            .ok_or_else(|| login_redirect(original_uri))
    }

    /// Authorization policy: the caller is known but must also hold
    /// `role`. Failure is a 401, not a redirect — logging in again would
    /// not help.
    pub fn require_role(&self, claim: &IdentityClaim, role: &str) -> Result<(), Response> {
        if claim.has_role(role) {
            return Ok(());
        }
        tracing::warn!(username = %claim.username, role, "role check failed");
        Err((
            StatusCode::UNAUTHORIZED,
            Html(pages::render_error_page(
                "Unauthorized",
                "You do not have permission to perform this action.",
            )),
        )
            .into_response())
    }
}

/// 302 to the login form with the original URL as the return target.
pub fn login_redirect(original_uri: &Uri) -> Response {
    let original = original_uri
        .path_and_query()
        .map_or_else(|| original_uri.path(), |pq| pq.as_str());
    found(&format!(
        "/login/?redirect={}",
        urlencoding::encode(original)
    ))
}

/// Plain 302 Found.
pub fn found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_owned())],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn gate(https_required: bool) -> AccessGate {
        let tokens = Arc::new(TokenAuthority::new("some kind of secret"));
        AccessGate::new(https_required, Some(tokens))
    }

    fn host_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("example.com"));
        headers
    }

    #[test]
    fn plain_http_get_redirects_to_https() {
        let uri: Uri = "/bookmarks?tag=rust".parse().unwrap();
        let decision = gate(true).check_transport(&Method::GET, &uri, &host_headers());
        assert_eq!(
            decision,
            TransportDecision::RedirectTo("https://example.com/bookmarks?tag=rust".into())
        );
    }

    #[test]
    fn plain_http_post_is_rejected() {
        let uri: Uri = "/login/".parse().unwrap();
        let decision = gate(true).check_transport(&Method::POST, &uri, &host_headers());
        assert_eq!(decision, TransportDecision::Reject);
    }

    #[test]
    fn forwarded_https_proceeds() {
        let uri: Uri = "/bookmarks".parse().unwrap();
        let mut headers = host_headers();
        headers.insert("X-Forwarded-Proto", HeaderValue::from_static("https"));
        let decision = gate(true).check_transport(&Method::POST, &uri, &headers);
        assert_eq!(decision, TransportDecision::Proceed);
    }

    #[test]
    fn acme_challenge_is_always_exempt() {
        let uri: Uri = "/.well-known/acme-challenge/abc123".parse().unwrap();
        let decision = gate(true).check_transport(&Method::GET, &uri, &HeaderMap::new());
        assert_eq!(decision, TransportDecision::Proceed);
    }

    #[test]
    fn disabled_transport_policy_lets_everything_through() {
        let uri: Uri = "/login/".parse().unwrap();
        let decision = gate(false).check_transport(&Method::POST, &uri, &HeaderMap::new());
        assert_eq!(decision, TransportDecision::Proceed);
    }

    #[test]
    fn missing_host_header_is_rejected_rather_than_guessed() {
        let uri: Uri = "/bookmarks".parse().unwrap();
        let decision = gate(true).check_transport(&Method::GET, &uri, &HeaderMap::new());
        assert_eq!(decision, TransportDecision::Reject);
    }

    #[test]
    fn missing_identity_redirects_to_login_with_return_target() {
        let uri: Uri = "/notes/work/".parse().unwrap();
        let err = gate(false)
            .require_identity(&HeaderMap::new(), &uri)
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FOUND);
        assert_eq!(
            err.headers().get(header::LOCATION).unwrap(),
            "/login/?redirect=%2Fnotes%2Fwork%2F"
        );
    }

    #[test]
    fn valid_cookie_produces_a_claim() {
        let gate = gate(false);
        let tokens = TokenAuthority::new("some kind of secret");
        let token = tokens.issue("henrik", 3600, Vec::new()).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("identity_jwt={token}")).unwrap(),
        );

        let claim = gate.identity(&headers).expect("claim expected");
        assert_eq!(claim.username, "henrik");
    }

    #[test]
    fn unverifiable_gate_yields_no_identity() {
        let gate = AccessGate::new(false, None);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("identity_jwt=whatever"),
        );
        assert!(gate.identity(&headers).is_none());
    }

    #[test]
    fn missing_role_is_a_401() {
        let gate = gate(false);
        let claim = IdentityClaim {
            username: "henrik".into(),
            exp: 0,
            roles: Vec::new(),
        };
        let err = gate.require_role(&claim, "token_creator").unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn present_role_passes() {
        let gate = gate(false);
        let claim = IdentityClaim {
            username: "henrik".into(),
            exp: 0,
            roles: vec!["token_creator".into()],
        };
        assert!(gate.require_role(&claim, "token_creator").is_ok());
    }
}
