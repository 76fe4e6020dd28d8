//! Request handlers.

pub mod http;
pub mod websocket;

pub use http::{health_check, notify, stats};
pub use websocket::websocket_handler;
