//! Code shared by the HireWire notification server and client.
//!
//! - `event`: wire format of the notification frames pushed to subscribers
//! - `logger`: tracing subscriber setup for the binaries
//! - `time`: clock abstraction and timestamp helpers

pub mod event;
pub mod logger;
pub mod time;
