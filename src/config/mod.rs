//! Process-wide configuration resolved once from the environment.
//!
//! Everything the request path needs is captured in an immutable [`Config`]
//! at startup and handed to the gateway by `Arc` — business logic never
//! reads the environment directly. Identity settings are optional on
//! purpose: a box without `IDENTITY_JWT_SECRET` still serves the public
//! pages, and the protected features degrade to "unavailable" at request
//! time instead of refusing to boot.

use std::path::PathBuf;

/// Default lifetime of a login token: 12 hours, in seconds.
pub const TWELVE_HOURS: u64 = 12 * 60 * 60;

/// Immutable application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// The single configured account name.
    pub username: Option<String>,
    /// Hex-encoded SHA-256 of `salt || password`.
    pub password_hash: Option<String>,
    /// Salt prepended to the password before hashing.
    ///
    /// Generate with e.g. `cat /dev/urandom | head -c 1024 | sha256sum`.
    pub password_salt: Option<String>,
    /// Symmetric secret used to sign and verify identity tokens.
    /// Rotating it invalidates every outstanding token at once.
    pub identity_jwt_secret: Option<String>,
    /// When set, plain-HTTP requests are redirected (GET) or rejected (POST).
    pub https_required: bool,
    /// Lifetime of a token minted by a successful login, in seconds.
    pub jwt_expiration_secs: u64,
    pub bookmarks_filename: PathBuf,
    pub photo_collection_filename: PathBuf,
    /// Base URL of the bucket that hosts photo originals and thumbnails.
    pub photo_base_url: String,
    /// Root directory backing the notes tree. `None` disables /notes/.
    pub notes_root: Option<PathBuf>,
    /// Root directory backing the file vault. `None` disables /files/.
    pub files_root: Option<PathBuf>,
    /// Directory served under /.well-known/acme-challenge/.
    pub acme_challenge_dir: Option<PathBuf>,
}

impl Config {
    /// Build the configuration from environment variables.
    ///
    /// Missing identity variables are not an error here; the original
    /// deployment provisions them out-of-band and the gateway copes with
    /// their absence per-request.
    pub fn from_env() -> Self {
        Self {
            username: load_env("USERNAME"),
            password_hash: load_env("PASSWORD_HASH"),
            password_salt: load_env("PASSWORD_SALT"),
            identity_jwt_secret: load_env("IDENTITY_JWT_SECRET"),
            https_required: parse_bool(
                std::env::var("HTTPS_REQUIRED").ok().as_deref(),
                true,
            ),
            jwt_expiration_secs: load_env("JWT_EXPIRATION_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(TWELVE_HOURS),
            bookmarks_filename: load_env("BOOKMARKS_FILENAME")
                .map_or_else(|| PathBuf::from("data/bookmarks.json"), PathBuf::from),
            photo_collection_filename: load_env("PHOTO_COLLECTION_FILENAME")
                .map_or_else(
                    || PathBuf::from("photos/photo_collections.json"),
                    PathBuf::from,
                ),
            photo_base_url: load_env("PHOTO_BASE_URL")
                .unwrap_or_else(|| "https://rainforestphotos.s3.amazonaws.com".into()),
            notes_root: load_env("NOTES_ROOT").map(PathBuf::from),
            files_root: load_env("FILES_ROOT").map(PathBuf::from),
            acme_challenge_dir: load_env("ACME_CHALLENGE_DIR").map(PathBuf::from),
        }
    }

    /// A configuration with nothing provisioned — public pages only.
    #[cfg(test)]
    pub fn empty() -> Self {
        Self {
            username: None,
            password_hash: None,
            password_salt: None,
            identity_jwt_secret: None,
            https_required: false,
            jwt_expiration_secs: TWELVE_HOURS,
            bookmarks_filename: PathBuf::from("data/bookmarks.json"),
            photo_collection_filename: PathBuf::from("photos/photo_collections.json"),
            photo_base_url: "https://rainforestphotos.s3.amazonaws.com".into(),
            notes_root: None,
            files_root: None,
            acme_challenge_dir: None,
        }
    }
}

fn load_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Boolean environment values are the literal strings `True` / `False`;
/// anything else falls back to the default.
fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value {
        Some("True") => true,
        Some("False") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_literal_true_and_false() {
        assert!(parse_bool(Some("True"), false));
        assert!(!parse_bool(Some("False"), true));
    }

    #[test]
    fn parse_bool_falls_back_on_anything_else() {
        assert!(parse_bool(None, true));
        assert!(!parse_bool(None, false));
        assert!(parse_bool(Some("true"), true));
        assert!(parse_bool(Some("1"), true));
        assert!(!parse_bool(Some(""), false));
    }

    #[test]
    fn defaults_cover_content_paths() {
        let config = Config::empty();
        assert_eq!(config.bookmarks_filename, PathBuf::from("data/bookmarks.json"));
        assert_eq!(config.jwt_expiration_secs, TWELVE_HOURS);
        assert!(config.notes_root.is_none());
    }
}
