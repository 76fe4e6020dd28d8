//! Who the client is logged in as.

use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}' (expected 'user' or 'admin')")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Identity plus the bearer token it was issued.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential {
    pub role: Role,
    pub id: String,
    pub token: String,
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("role", &self.role)
            .field("id", &self.id)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl SessionCredential {
    pub fn new(role: Role, id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            role,
            id: id.into(),
            token: token.into(),
        }
    }

    /// Same person, regardless of which token they currently hold.
    pub fn same_identity(&self, other: &SessionCredential) -> bool {
        self.role == other.role && self.id == other.id
    }
}

impl fmt::Display for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role, self.id)
    }
}
