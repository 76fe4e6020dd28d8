//! UI layer: HTTP/WebSocket entry points of the gateway.

pub mod handler;
pub mod server;
pub mod signal;
pub mod state;

pub use server::Server;
