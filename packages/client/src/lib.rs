//! HireWire notification client.
//!
//! - `subscriber`: one live session per logged-in identity, with a local
//!   notification buffer
//! - `transport`: the WebSocket handshake
//! - `reconcile`: keeps REST-fetched lists consistent with pushed events
//! - `runner`: the interactive CLI

pub mod command;
pub mod domain;
pub mod error;
pub mod formatter;
pub mod reconcile;
pub mod runner;
pub mod subscriber;
pub mod transport;
pub mod ui;
