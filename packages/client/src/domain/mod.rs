//! Client-side domain: session credential, connection state, the local
//! notification buffer and the reconnect policy.
//!
//! Pure types and functions without I/O, so they are easy to test.

pub mod notification;
pub mod reconnect;
pub mod session;
pub mod state;

pub use notification::{Notification, NotificationBuffer};
pub use reconnect::ReconnectPolicy;
pub use session::{Role, SessionCredential, UnknownRole};
pub use state::ConnectionState;
