//! Credential handling backed by signed JWTs.

pub mod jwt;

pub use jwt::{Claims, IssueError, JwtTokenVerifier, TokenIssuer};
