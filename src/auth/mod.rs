//! Stateless identity layer for the protected parts of the site.
//!
//! Provides:
//! - Single-account credential validation (salted SHA-256 against an
//!   out-of-band provisioned hash)
//! - Signed, time-limited identity tokens (HS256) carried in a cookie or
//!   the `Authorization` header
//! - Capability roles inside the token; `token_creator` gates minting
//!
//! ## Design Decisions
//! - Tokens are the only session record — nothing is stored server-side,
//!   so there is no revocation list. A password change or logout does not
//!   invalidate tokens already in the wild; they die at their natural
//!   expiry. Rotating `IDENTITY_JWT_SECRET` kills everything at once.
//! - Wrong-credential failures are deliberately generic ("Incorrect
//!   username or password.") so the login form cannot be used to enumerate
//!   the account name.

pub mod credentials;
pub mod token;

pub use credentials::CredentialValidator;
pub use token::{
    IdentityClaim, TokenAuthority, FIFTEEN_MINUTES, IDENTITY_COOKIE, TOKEN_CREATOR_ROLE,
};
