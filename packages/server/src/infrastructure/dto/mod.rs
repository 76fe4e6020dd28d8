//! Data Transfer Objects (DTOs) for the notification gateway.
//!
//! DTOs are organized by protocol:
//! - `handshake`: WebSocket handshake credential extraction
//! - `http`: HTTP API request and response DTOs

pub mod handshake;
pub mod http;
