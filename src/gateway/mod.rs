//! Axum-based HTTP gateway for the whole site.
//!
//! Public pages (index, work, bookmarks, photos) go straight to their
//! handlers; protected pages (notes, files, token minting) pass through
//! the access gate first. The transport policy wraps everything as a
//! middleware layer, with body limits and timeouts on the outside.

pub mod pages;
pub mod policy;
pub mod vault;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    middleware::Next,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use parking_lot::Mutex;
use serde::Deserialize;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::auth::{
    CredentialValidator, TokenAuthority, FIFTEEN_MINUTES, IDENTITY_COOKIE, TOKEN_CREATOR_ROLE,
};
use crate::config::Config;
use crate::storage::{FsStore, ObjectStore};
use crate::{bookmarks, photos};

use policy::{found, AccessGate, TransportDecision};

/// Maximum request body size (16 MB) — bounds file uploads.
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;
/// Request timeout (30s).
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared state for all axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Credential validator (when the account is provisioned).
    pub credentials: Option<Arc<CredentialValidator>>,
    /// Token issuer/verifier (when a signing secret is provisioned).
    pub tokens: Option<Arc<TokenAuthority>>,
    pub gate: Arc<AccessGate>,
    pub notes: Option<Arc<dyn ObjectStore>>,
    pub files: Option<Arc<dyn ObjectStore>>,
    /// Toy demo value, last writer wins. Not identity-bearing state.
    pub scratch: Arc<Mutex<String>>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let credentials = CredentialValidator::from_config(&config).map(Arc::new);
        let tokens = config
            .identity_jwt_secret
            .as_deref()
            .map(|secret| Arc::new(TokenAuthority::new(secret)));
        let gate = Arc::new(AccessGate::new(config.https_required, tokens.clone()));
        let notes = config
            .notes_root
            .clone()
            .map(|root| Arc::new(FsStore::new(root)) as Arc<dyn ObjectStore>);
        let files = config
            .files_root
            .clone()
            .map(|root| Arc::new(FsStore::new(root)) as Arc<dyn ObjectStore>);

        Self {
            config: Arc::new(config),
            credentials,
            tokens,
            gate,
            notes,
            files,
            scratch: Arc::new(Mutex::new(String::new())),
        }
    }
}

/// Run the HTTP gateway.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    let https_required = config.https_required;
    if config.identity_jwt_secret.is_none() {
        tracing::warn!("IDENTITY_JWT_SECRET is not set — login and protected pages are disabled");
    }

    let state = AppState::from_config(config);
    let app = build_router(state);

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, https_required, "redwood listening");

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/work", get(handle_work))
        .route("/bookmarks", get(handle_bookmarks))
        .route("/bookmarks/{slug}", get(handle_bookmark_collection))
        .route("/photos", get(handle_photos))
        .route("/photos/{slug}", get(handle_photo_collection))
        .route("/photos/{slug}/{image}", get(handle_photo))
        .route("/login/", get(handle_login_page))
        .route("/login/", post(handle_login_submit))
        .route("/logout/", get(handle_logout))
        .route("/token", get(handle_token))
        .route("/notes/", get(vault::handle_notes_root))
        .route("/notes/{*path}", get(vault::handle_notes))
        .route("/files/", get(vault::handle_files_index))
        .route("/files/upload", post(vault::handle_file_upload))
        .route("/files/download/{*key}", get(vault::handle_file_download))
        .route("/files/delete", post(vault::handle_file_delete))
        .route("/scratch", get(handle_scratch))
        .route("/scratch", post(handle_scratch_update))
        .route(
            "/.well-known/acme-challenge/{token}",
            get(handle_acme_challenge),
        )
        .with_state(state.clone())
        .layer(axum::middleware::from_fn_with_state(
            state,
            transport_policy,
        ))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
}

/// Transport policy as a middleware layer: every route passes through
/// here before anything else runs.
async fn transport_policy(State(state): State<AppState>, request: Request, next: Next) -> Response {
    match state
        .gate
        .check_transport(request.method(), request.uri(), request.headers())
    {
        TransportDecision::Proceed => next.run(request).await,
        TransportDecision::RedirectTo(url) => found(&url),
        TransportDecision::Reject => (
            StatusCode::BAD_REQUEST,
            Html(pages::render_error_page(
                "HTTPS required",
                "This site requires HTTPS. Resubmit the request over a secure connection.",
            )),
        )
            .into_response(),
    }
}

// ── Public pages ──────────────────────────────────────────────────────

async fn handle_index() -> Html<String> {
    Html(pages::render_index())
}

async fn handle_work() -> Html<String> {
    Html(pages::render_work())
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn handle_bookmarks(State(state): State<AppState>) -> Response {
    match bookmarks::load_bookmarks(&state.config.bookmarks_filename) {
        Ok(collections) => Html(pages::render_bookmarks_page(&collections)).into_response(),
        Err(e) => content_load_error("bookmarks", &e),
    }
}

async fn handle_bookmark_collection(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Response {
    let collections = match bookmarks::load_bookmarks(&state.config.bookmarks_filename) {
        Ok(collections) => collections,
        Err(e) => return content_load_error("bookmarks", &e),
    };
    match bookmarks::find_collection(&collections, &slug) {
        Some(collection) => {
            Html(pages::render_bookmark_collection_page(collection)).into_response()
        }
        None => not_found_page(&slug),
    }
}

async fn handle_photos(State(state): State<AppState>) -> Response {
    match photos::load_collection_list(
        &state.config.photo_collection_filename,
        &state.config.photo_base_url,
    ) {
        Ok(collections) => Html(pages::render_photos_page(&collections)).into_response(),
        Err(e) => content_load_error("photos", &e),
    }
}

async fn handle_photo_collection(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Response {
    match photos::load_collection(
        &state.config.photo_collection_filename,
        &state.config.photo_base_url,
        &slug,
    ) {
        Ok(Some(collection)) => {
            Html(pages::render_photo_collection_page(&collection)).into_response()
        }
        Ok(None) => not_found_page(&slug),
        Err(e) => content_load_error("photos", &e),
    }
}

async fn handle_photo(
    State(state): State<AppState>,
    Path((slug, image)): Path<(String, String)>,
) -> Response {
    let collection = match photos::load_collection(
        &state.config.photo_collection_filename,
        &state.config.photo_base_url,
        &slug,
    ) {
        Ok(Some(collection)) => collection,
        Ok(None) => return not_found_page(&slug),
        Err(e) => return content_load_error("photos", &e),
    };
    match collection.images.iter().find(|i| i.name == image) {
        Some(found_image) => Html(pages::render_photo_page(found_image)).into_response(),
        None => not_found_page(&image),
    }
}

fn content_load_error(what: &str, err: &anyhow::Error) -> Response {
    tracing::warn!(what, error = %err, "content load failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(pages::render_error_page(
            "Error",
            &format!("Could not load the {what} content."),
        )),
    )
        .into_response()
}

fn not_found_page(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(pages::render_error_page(
            "Not found",
            &format!("No such page: {what}"),
        )),
    )
        .into_response()
}

// ── Login / logout / token ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub redirect: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// The redirect target round-trips through the form's action URL so a
/// POST lands back here with the same query string.
fn login_action_url(redirect: Option<&str>) -> String {
    match redirect {
        Some(target) if !target.is_empty() => {
            format!("/login/?redirect={}", urlencoding::encode(target))
        }
        _ => "/login/".to_owned(),
    }
}

async fn handle_login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    Html(pages::render_login_page(
        &login_action_url(query.redirect.as_deref()),
        None,
    ))
}

async fn handle_login_submit(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    Form(form): Form<LoginForm>,
) -> Response {
    let action_url = login_action_url(query.redirect.as_deref());
    let login_error =
        |message: &str| Html(pages::render_login_page(&action_url, Some(message))).into_response();

    // Missing fields get specific messages; wrong values never do.
    let username = form.username.as_deref().unwrap_or("");
    let password = form.password.as_deref().unwrap_or("");
    if username.is_empty() {
        return login_error("You need to specify a username.");
    }
    if password.is_empty() {
        return login_error("You need to specify a password.");
    }

    let (Some(credentials), Some(tokens)) = (state.credentials.as_ref(), state.tokens.as_ref())
    else {
        tracing::warn!("login attempted but the identity layer is not configured");
        return login_error("Incorrect username or password.");
    };

    if !credentials.validate(username, password) {
        tracing::info!(username, "failed login");
        return login_error("Incorrect username or password.");
    }

    let token = match tokens.issue(
        username,
        state.config.jwt_expiration_secs,
        vec![TOKEN_CREATOR_ROLE.to_owned()],
    ) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "token issuance failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::render_error_page(
                    "Error",
                    "Could not complete the login.",
                )),
            )
                .into_response();
        }
    };

    let target = query
        .redirect
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| "/".to_owned());
    tracing::info!(username, "successful login");

    let mut response = found(&target);
    match HeaderValue::try_from(format!("{IDENTITY_COOKIE}={token}; Path=/; HttpOnly")) {
        Ok(cookie) => {
            response.headers_mut().insert(header::SET_COOKIE, cookie);
        }
        Err(e) => tracing::error!(error = %e, "could not set identity cookie"),
    }
    response
}

async fn handle_logout() -> Response {
    let mut response = found("/");
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_static(
            "identity_jwt=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly",
        ),
    );
    response
}

/// GET /token — mint a short-lived token for the logged-in user.
///
/// The minted token carries no roles at all, so it cannot be used to
/// mint further tokens.
async fn handle_token(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let claim = match state.gate.require_identity(&headers, &uri) {
        Ok(claim) => claim,
        Err(response) => return response,
    };
    if let Err(response) = state.gate.require_role(&claim, TOKEN_CREATOR_ROLE) {
        return response;
    }
    let Some(tokens) = state.tokens.as_ref() else {
        // Unreachable while require_identity needs a verifier; covered anyway.
        return not_found_page("token");
    };

    match tokens.issue(&claim.username, FIFTEEN_MINUTES, Vec::new()) {
        Ok(minted) => {
            tracing::info!(username = %claim.username, "minted narrowed token");
            Html(pages::render_token_page(&minted)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "token minting failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::render_error_page("Error", "Could not mint a token.")),
            )
                .into_response()
        }
    }
}

// ── Demo scratch value ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScratchForm {
    pub value: String,
}

async fn handle_scratch(State(state): State<AppState>) -> Html<String> {
    let value = state.scratch.lock().clone();
    Html(pages::render_scratch_page(&value))
}

async fn handle_scratch_update(
    State(state): State<AppState>,
    Form(form): Form<ScratchForm>,
) -> Response {
    // Last writer wins; this is a toy endpoint, not identity state.
    *state.scratch.lock() = form.value;
    found("/scratch")
}

// ── ACME challenge ────────────────────────────────────────────────────

/// Serves certificate-authority challenge files. Exempt from the
/// transport policy so renewal works before HTTPS does.
async fn handle_acme_challenge(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Response {
    let Some(dir) = state.config.acme_challenge_dir.as_ref() else {
        return not_found_page(&token);
    };
    if token.contains("..") || token.contains('/') || token.contains('\\') {
        return not_found_page(&token);
    }
    match tokio::fs::read_to_string(dir.join(&token)).await {
        Ok(contents) => contents.into_response(),
        Err(_) => not_found_page(&token),
    }
}
