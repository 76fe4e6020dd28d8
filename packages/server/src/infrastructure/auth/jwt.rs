//! HS256 token verification and issuance.
//!
//! A token carries exactly one of two identity claims:
//!
//! ```text
//! {"user":{"id":"<id>"},"exp":...}
//! {"admin":{"id":"<id>","isDefault":true},"exp":...}
//! ```

use std::fmt;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hirewire_shared::time::now_secs;

use crate::domain::{AuthError, Identity, IdentityId, TokenVerifier};

/// Clock skew tolerated on `exp`
const LEEWAY_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaim {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminClaim {
    pub id: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserClaim>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminClaim>,
    /// Expiration (Unix seconds)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// Resolve the identity the token was issued for.
    pub fn into_identity(self) -> Result<Identity, AuthError> {
        match (self.user, self.admin) {
            (Some(user), None) => Ok(Identity::user(IdentityId::new(user.id)?)),
            (None, Some(admin)) => Ok(Identity::admin(
                IdentityId::new(admin.id)?,
                admin.is_default,
            )),
            (Some(_), Some(_)) => Err(AuthError::ConflictingIdentity),
            (None, None) => Err(AuthError::MissingIdentity),
        }
    }
}

pub struct JwtTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for JwtTokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenVerifier")
            .field("algorithm", &Algorithm::HS256)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

impl JwtTokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = LEEWAY_SECS;
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, credential: &str) -> Result<Identity, AuthError> {
        let token = decode::<Claims>(credential, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidCredential(e.to_string()),
            },
        )?;
        token.claims.into_identity()
    }
}

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("token lifetime must be positive")]
    NonPositiveTtl,
    #[error("invalid identity id: {0}")]
    InvalidIdentity(#[from] crate::domain::IdentityError),
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Mints tokens in the format `JwtTokenVerifier` accepts.
///
/// Production tokens come from the REST layer. This is for the `issue-token`
/// subcommand and tests.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl_secs: i64,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn issue_user(&self, id: &str) -> Result<String, IssueError> {
        let id = IdentityId::new(id)?;
        self.issue(Some(UserClaim { id: id.into_string() }), None)
    }

    pub fn issue_admin(&self, id: &str, is_default: bool) -> Result<String, IssueError> {
        let id = IdentityId::new(id)?;
        self.issue(
            None,
            Some(AdminClaim {
                id: id.into_string(),
                is_default,
            }),
        )
    }

    /// Sign an arbitrary claim combination. The verifier decides whether it is usable.
    pub fn issue(
        &self,
        user: Option<UserClaim>,
        admin: Option<AdminClaim>,
    ) -> Result<String, IssueError> {
        if self.ttl_secs <= 0 {
            return Err(IssueError::NonPositiveTtl);
        }
        let issued_at = now_secs();
        let claims = Claims {
            user,
            admin,
            exp: issued_at + self.ttl_secs,
            iat: Some(issued_at),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }
}
