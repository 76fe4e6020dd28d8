//! Identity resolved from a verified credential.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const IDENTITY_ID_MAX_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("identity id must not be empty")]
    Empty,
    #[error("identity id is too long ({0} characters, max 128)")]
    TooLong(usize),
    #[error("identity id contains control characters")]
    ControlCharacter,
}

/// Which collection the identity comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    User,
    Admin,
}

impl IdentityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityKind::User => "user",
            IdentityKind::Admin => "admin",
        }
    }
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a user or an admin (value object)
///
/// Surrounding whitespace is trimmed. Ids are opaque otherwise: document ids
/// from the job service are accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityId(String);

impl IdentityId {
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(IdentityError::Empty);
        }
        let len = trimmed.chars().count();
        if len > IDENTITY_ID_MAX_LEN {
            return Err(IdentityError::TooLong(len));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(IdentityError::ControlCharacter);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for IdentityId {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for IdentityId {
    type Error = IdentityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address of one identity: kind plus id.
///
/// User and admin ids come from different collections and may collide, so
/// the kind is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    pub kind: IdentityKind,
    pub id: IdentityId,
}

impl IdentityKey {
    pub fn user(id: IdentityId) -> Self {
        Self {
            kind: IdentityKind::User,
            id,
        }
    }

    pub fn admin(id: IdentityId) -> Self {
        Self {
            kind: IdentityKind::Admin,
            id,
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Identity attached to a connection after authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    key: IdentityKey,
    is_privileged: bool,
}

impl Identity {
    /// Users are never privileged.
    pub fn user(id: IdentityId) -> Self {
        Self {
            key: IdentityKey::user(id),
            is_privileged: false,
        }
    }

    /// `is_privileged` marks the default (super) admin account.
    pub fn admin(id: IdentityId, is_privileged: bool) -> Self {
        Self {
            key: IdentityKey::admin(id),
            is_privileged,
        }
    }

    pub fn key(&self) -> &IdentityKey {
        &self.key
    }

    pub fn kind(&self) -> IdentityKind {
        self.key.kind
    }

    pub fn id(&self) -> &IdentityId {
        &self.key.id
    }

    pub fn is_privileged(&self) -> bool {
        self.is_privileged
    }
}
