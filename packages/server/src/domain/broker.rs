//! Broker interface: connection registry plus group fan-out.
//!
//! The broker owns every admitted connection and its outbound channel. The
//! use cases only talk to this trait; `infrastructure::broker` provides the
//! in-process implementation.

use thiserror::Error;
use tokio::sync::mpsc;

use super::{
    connection::{Connection, ConnectionId},
    group::GroupName,
};

/// Outbound channel of one connection. Frames are serialized JSON text.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("connection '{0}' is already registered")]
    DuplicateConnection(ConnectionId),
    #[error("broker state is unavailable: {0}")]
    Unavailable(String),
}

#[cfg_attr(test, mockall::automock)]
pub trait GroupBroker: Send + Sync {
    /// Register an admitted connection and join it to `connection.groups()`.
    fn register(&self, connection: Connection, channel: PusherChannel) -> Result<(), BrokerError>;

    /// Drop a connection and every membership it holds.
    ///
    /// Returns the removed connection, or `None` if it was not registered.
    fn unregister(&self, connection_id: &ConnectionId) -> Option<Connection>;

    /// Enqueue `frame` on every connection joined to `group`.
    ///
    /// Returns the number of connections the frame was enqueued to. An empty
    /// or unknown group is not an error.
    fn publish(&self, group: &GroupName, frame: &str) -> Result<usize, BrokerError>;

    /// Number of connections currently joined to `group`
    fn member_count(&self, group: &GroupName) -> usize;

    /// Number of registered connections
    fn connection_count(&self) -> usize;
}
