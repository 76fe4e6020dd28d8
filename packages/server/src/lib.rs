//! Real-time notification gateway for the job portal.
//!
//! Layers, from the inside out:
//! - `domain`: identities, groups, connections and the broker/verifier traits
//! - `usecase`: admission, disconnection, stats and the event emitter
//! - `infrastructure`: in-process broker, JWT auth, DTOs
//! - `ui`: axum router, WebSocket and HTTP handlers

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
