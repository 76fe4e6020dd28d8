//! Use cases of the notification gateway.

mod admit_connection;
mod broker_stats;
mod disconnect_connection;
pub mod error;
mod notify;

pub use admit_connection::AdmitConnectionUseCase;
pub use broker_stats::{BrokerStats, GetBrokerStatsUseCase};
pub use disconnect_connection::DisconnectConnectionUseCase;
pub use error::{AdmitError, DeliveryError, DispatchError};
pub use notify::NotificationEmitter;
