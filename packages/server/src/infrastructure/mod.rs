//! Infrastructure layer: concrete implementations of the domain traits.
//!
//! - `auth`: JWT verification and issuance
//! - `broker`: in-process group broker
//! - `dto`: HTTP and handshake data transfer objects

pub mod auth;
pub mod broker;
pub mod dto;
