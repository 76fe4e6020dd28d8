//! Credential verification seam.

use thiserror::Error;

use super::identity::{Identity, IdentityError};

/// Why a credential was refused. Always terminal for the connection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authentication error: missing credential")]
    MissingCredential,
    #[error("authentication error: invalid credential ({0})")]
    InvalidCredential(String),
    #[error("authentication error: credential has expired")]
    Expired,
    #[error("authentication error: credential carries no user or admin claim")]
    MissingIdentity,
    #[error("authentication error: credential carries both a user and an admin claim")]
    ConflictingIdentity,
    #[error("authentication error: {0}")]
    InvalidIdentity(#[from] IdentityError),
}

/// Validates a bearer credential and extracts the identity it was issued for.
///
/// Implementations must be pure: no I/O, no state changes.
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> Result<Identity, AuthError>;
}
