//! `consign-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it validates
//! tokens, models the per-request [`Session`] and decides whether a session
//! may perform an action.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod profile;
pub mod session;

pub use authorize::{authorize, Action, AuthzError};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use consign_core::PrincipalId;
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
pub use profile::UserProfile;
pub use session::Session;
